//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the Takip verification
//! backend. It provides concrete implementations of the core traits:
//!
//! - **Database**: MySQL verification store and user repository using SQLx
//! - **Mail**: SMTP delivery via lettre, an HTTP mail relay via reqwest, and a
//!   log-only mailer for development
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use takip_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Mail module - code delivery transports
pub mod mail;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Mail transport error
    #[error("Mail error: {0}")]
    Mail(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
