//! Mail transport configuration

use serde::{Deserialize, Serialize};

use super::{env_opt, env_or};

/// SMTP credentials and the optional HTTP mail relay
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// SMTP relay host; SMTP delivery is disabled when absent
    pub host: Option<String>,

    /// SMTP port
    pub port: u16,

    /// SMTP username
    pub username: Option<String>,

    /// SMTP password
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Sender address
    pub from: String,

    /// Upper bound on a single delivery attempt, in seconds
    pub timeout_seconds: u64,

    /// Base URL of an external mail service used when SMTP is not configured
    pub service_url: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 587,
            username: None,
            password: None,
            from: String::from("Takip <no-reply@takip.app>"),
            timeout_seconds: 15,
            service_url: None,
        }
    }
}

impl MailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_opt("MAIL_HOST"),
            port: env_or("MAIL_PORT", defaults.port),
            username: env_opt("MAIL_USER"),
            password: env_opt("MAIL_PASS"),
            from: env_opt("MAIL_FROM").unwrap_or(defaults.from),
            timeout_seconds: env_or("MAIL_TIMEOUT_SEC", defaults.timeout_seconds),
            service_url: env_opt("EMAIL_SERVICE_URL"),
        }
    }

    /// Whether SMTP delivery is configured
    pub fn smtp_enabled(&self) -> bool {
        self.host.is_some()
    }
}
