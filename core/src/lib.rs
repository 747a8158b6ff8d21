//! # Takip Core
//!
//! Core business logic for the Takip email verification backend.
//! This crate contains domain entities, business services, repository interfaces,
//! and error types that form the foundation of the application architecture.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AttemptMeta, CodePurpose, PreAuthClaims, ResendMeta, User, VerificationCode,
};
pub use errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
pub use repositories::{InMemoryStore, UserRepository, VerificationStore, VerificationTransaction};
pub use services::{
    Clock, CodeCleanupService, Mailer, PasswordPolicy, PreAuthTokenIssuer, RegistrationService,
    SystemClock, VerificationService, VerificationServiceConfig,
};
