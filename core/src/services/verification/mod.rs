//! Verification service module for email one-time codes
//!
//! This module provides the complete code workflow:
//! - Code generation from the OS CSPRNG
//! - Resend cooldown and daily quota per identity
//! - Attempt tracking with temporary lockout
//! - Background mail dispatch with a bounded timeout
//! - Password reset completion and pre-registration tokens

mod attempt_guard;
mod cleanup;
mod code_generator;
mod config;
mod dispatch;
mod resend_guard;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use attempt_guard::{AttemptGuard, LockStatus};
pub use cleanup::{CleanupResult, CodeCleanupService};
pub use code_generator::{CodeGenerator, SecureCodeGenerator};
pub use config::VerificationServiceConfig;
pub use dispatch::MailDispatcher;
pub use resend_guard::{ResendDenial, ResendGuard};
pub use service::VerificationService;
pub use traits::{CodeMessage, Mailer};
pub use types::{PreVerifyOutcome, RequestCodeOutcome, VerifyCodeOutcome};
