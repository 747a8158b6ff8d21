//! Fire-and-forget mail dispatch with a bounded timeout.

use std::sync::Arc;
use std::time::Duration;

use takip_shared::email::mask_email;

use super::traits::{CodeMessage, Mailer};

/// Hands code deliveries to a background task
#[derive(Clone)]
pub struct MailDispatcher {
    mailer: Arc<dyn Mailer>,
    timeout: Duration,
}

impl MailDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, timeout: Duration) -> Self {
        Self { mailer, timeout }
    }

    /// Spawn delivery and return immediately
    ///
    /// Delivery failures and timeouts are logged; the issued code stays valid
    /// either way.
    pub fn dispatch(&self, message: CodeMessage) -> tokio::task::JoinHandle<()> {
        let mailer = Arc::clone(&self.mailer);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let masked = mask_email(&message.email);
            match tokio::time::timeout(timeout, mailer.send_code(&message)).await {
                Ok(Ok(())) => tracing::info!(
                    email = %masked,
                    purpose = %message.purpose,
                    transport = mailer.name(),
                    event = "mail_dispatched",
                    "Verification code delivered to mail transport"
                ),
                Ok(Err(e)) => tracing::error!(
                    email = %masked,
                    purpose = %message.purpose,
                    transport = mailer.name(),
                    error = %e,
                    event = "mail_dispatch_failed",
                    "Failed to deliver verification code"
                ),
                Err(_) => tracing::error!(
                    email = %masked,
                    purpose = %message.purpose,
                    transport = mailer.name(),
                    timeout_secs = timeout.as_secs(),
                    event = "mail_dispatch_timeout",
                    "Verification code delivery timed out"
                ),
            }
        })
    }
}
