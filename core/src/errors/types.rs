//! Domain-specific error types for verification and related operations
//!
//! This module provides error type definitions for the code issuance and
//! verification flows, pre-auth token handling, and input validation. HTTP
//! status codes and wire error codes are assigned in the presentation layer.

use thiserror::Error;

/// Verification and account errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please wait {retry_after_seconds} seconds before requesting a new code")]
    CooldownActive { retry_after_seconds: i64 },

    #[error("Daily code limit reached, try again in {retry_after_seconds} seconds")]
    DailyLimitExceeded { retry_after_seconds: i64 },

    #[error("Too many failed attempts, try again in {retry_after_seconds} seconds")]
    TooManyAttempts { retry_after_seconds: i64 },

    // One message for wrong, expired, used and missing codes
    #[error("Invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered")]
    EmailAlreadyRegistered,
}

impl AuthError {
    /// Seconds until the request may be retried, for throttling errors
    pub fn retry_after_seconds(&self) -> Option<i64> {
        match self {
            AuthError::CooldownActive { retry_after_seconds }
            | AuthError::DailyLimitExceeded { retry_after_seconds }
            | AuthError::TooManyAttempts { retry_after_seconds } => Some(*retry_after_seconds),
            _ => None,
        }
    }
}

/// Pre-auth token errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid claims")]
    InvalidClaims,

    #[error("Token was not issued for this purpose")]
    InvalidPurpose,

    #[error("Token does not belong to this email")]
    EmailMismatch,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Weak password: {reason}")]
    WeakPassword { reason: String },
}
