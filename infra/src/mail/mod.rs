//! Mail delivery module
//!
//! Provides implementations of the core `Mailer` trait:
//! - `SmtpMailer`: direct SMTP delivery through lettre
//! - `HttpMailRelay`: posts codes to an external mail microservice
//! - `LogMailer`: development fallback that only logs deliveries

mod http_relay;
mod log_mailer;
mod smtp;


pub use http_relay::HttpMailRelay;
pub use log_mailer::LogMailer;
pub use smtp::SmtpMailer;

use std::sync::Arc;

use takip_core::services::verification::Mailer;
use takip_shared::config::MailConfig;

use crate::InfrastructureError;

/// Pick the mail transport from configuration
///
/// SMTP wins when `MAIL_HOST` is set, then the HTTP relay when
/// `EMAIL_SERVICE_URL` is set; otherwise codes are only logged.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, InfrastructureError> {
    if config.smtp_enabled() {
        let mailer = SmtpMailer::new(config)?;
        tracing::info!(transport = "smtp", "Mail transport configured");
        return Ok(Arc::new(mailer));
    }

    if let Some(url) = config.service_url.as_deref() {
        let relay = HttpMailRelay::new(url, config.timeout_seconds)?;
        tracing::info!(transport = "http-relay", url = %url, "Mail transport configured");
        return Ok(Arc::new(relay));
    }

    tracing::warn!(
        transport = "log",
        "No mail transport configured; verification codes will only be logged"
    );
    Ok(Arc::new(LogMailer::new()))
}
