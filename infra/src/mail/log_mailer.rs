//! Development mailer that only records deliveries in the log

use async_trait::async_trait;

use takip_core::services::verification::{CodeMessage, Mailer};
use takip_shared::email::mask_email;

/// Logs each delivery instead of sending it
///
/// The code itself is logged at debug level only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_code(&self, message: &CodeMessage) -> Result<(), String> {
        tracing::info!(
            email = %mask_email(&message.email),
            purpose = %message.purpose,
            subject = message.subject(),
            event = "mail_logged",
            "Mail transport disabled, delivery logged only"
        );
        tracing::debug!(code = %message.code, "Logged verification code");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
