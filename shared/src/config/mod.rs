//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical business areas:
//! - `auth` - Pre-auth token and password policy configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection
//! - `mail` - Mail transport configuration
//! - `otp` - One-time code lifetime, resend and lockout limits
//! - `server` - HTTP server and housekeeping configuration

pub mod auth;
pub mod database;
pub mod environment;
pub mod mail;
pub mod otp;
pub mod server;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::ConfigError;

pub use auth::{PasswordConfig, PreAuthConfig};
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use mail::MailConfig;
pub use otp::OtpConfig;
pub use server::{CleanupConfig, ServerConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// One-time code configuration
    pub otp: OtpConfig,

    /// Pre-auth token configuration
    pub pre_auth: PreAuthConfig,

    /// Password policy configuration
    pub password: PasswordConfig,

    /// Mail transport configuration
    pub mail: MailConfig,

    /// Background cleanup configuration
    pub cleanup: CleanupConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            otp: OtpConfig::default(),
            pre_auth: PreAuthConfig::default(),
            password: PasswordConfig::default(),
            mail: MailConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment, reading `.env` first when present
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            otp: OtpConfig::from_env(),
            pre_auth: PreAuthConfig::from_env(),
            password: PasswordConfig::from_env(),
            mail: MailConfig::from_env(),
            cleanup: CleanupConfig::from_env(),
        }
    }

    /// Reject configurations that must never reach production
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pre_auth.secret.trim().is_empty() {
            return Err(ConfigError::new("PRE_AUTH_SECRET must not be empty"));
        }

        if self.environment.is_production() {
            if self.pre_auth.is_using_default_secret() {
                return Err(ConfigError::new("PRE_AUTH_SECRET must be set in production"));
            }
            if self.otp.dev_return_code {
                return Err(ConfigError::new(
                    "DEV_RETURN_CODE cannot be enabled in production",
                ));
            }
        }

        if self.otp.daily_limit == 0 {
            return Err(ConfigError::new("OTP_DAILY_LIMIT must be at least 1"));
        }
        if self.otp.max_attempts == 0 {
            return Err(ConfigError::new("OTP_MAX_ATTEMPTS must be at least 1"));
        }

        Ok(())
    }

    /// Whether raw codes may be echoed back in responses
    pub fn dev_code_echo_enabled(&self) -> bool {
        self.otp.dev_return_code && !self.environment.is_production()
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read an optional, non-empty environment variable
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a boolean flag (`1`, `true`, `yes`, `on`)
pub(crate) fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
