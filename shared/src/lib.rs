//! Shared utilities and common types for the Takip server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error codes and response structures
//! - Utility functions (email normalization, masking)

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CleanupConfig, DatabaseConfig, Environment, MailConfig, OtpConfig,
    PasswordConfig, PreAuthConfig, ServerConfig,
};
pub use errors::{error_codes, ConfigError, ErrorResponse};
pub use types::{OkResponse, HealthResponse};
pub use utils::email;
