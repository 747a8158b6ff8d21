//! Traits for mail delivery integration

use async_trait::async_trait;

use crate::domain::entities::verification_code::CodePurpose;

/// Content of a code delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMessage {
    /// Recipient (normalized email)
    pub email: String,
    /// The raw code
    pub code: String,
    /// Flow the code belongs to, selects the template
    pub purpose: CodePurpose,
    /// Minutes until the code expires, shown to the recipient
    pub expires_in_minutes: i64,
}

impl CodeMessage {
    pub fn subject(&self) -> &'static str {
        match self.purpose {
            CodePurpose::VerifyEmail => "Verify your email",
            CodePurpose::ResetPassword => "Your password reset code",
            CodePurpose::PreRegistration => "Your sign-up verification code",
        }
    }

    pub fn text_body(&self) -> String {
        format!(
            "Your verification code is {}.\n\nIt expires in {} minutes. If you did not request it, you can ignore this email.",
            self.code, self.expires_in_minutes
        )
    }
}

/// Trait for mail transport integration
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a code; errors are logged by the caller and never surfaced to clients
    async fn send_code(&self, message: &CodeMessage) -> Result<(), String>;

    /// Transport name for logs
    fn name(&self) -> &'static str;
}
