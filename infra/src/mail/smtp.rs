//! SMTP delivery using lettre's tokio transport

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use takip_core::services::verification::{CodeMessage, Mailer};
use takip_shared::config::MailConfig;

use crate::InfrastructureError;

/// Port that expects TLS from the first byte instead of STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;

/// Mailer sending plain-text code emails over SMTP
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("from", &self.from).finish()
    }
}

impl SmtpMailer {
    /// Build the transport from `MAIL_*` settings
    ///
    /// Credentials are attached only when both user and password are set.
    pub fn new(config: &MailConfig) -> Result<Self, InfrastructureError> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| InfrastructureError::Config("MAIL_HOST is not set".to_string()))?;

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| InfrastructureError::Config(format!("Invalid MAIL_FROM address: {}", e)))?;

        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| InfrastructureError::Mail(format!("Failed to create SMTP transport: {}", e)))?
        .port(config.port)
        .timeout(Some(Duration::from_secs(config.timeout_seconds)));

        let builder = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, message: &CodeMessage) -> Result<Message, String> {
        let to: Mailbox = message
            .email
            .parse()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(message.text_body())
            .map_err(|e| format!("Failed to build message: {}", e))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_code(&self, message: &CodeMessage) -> Result<(), String> {
        let email = self.build_message(message)?;
        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| format!("SMTP delivery failed: {}", e))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
