//! Authentication route handlers
//!
//! This module contains the email verification endpoints:
//! - Email verification codes (resend and verify)
//! - Password reset (request and apply)
//! - Pre-registration verification and registration

pub mod password_reset;
pub mod pre_verify;
pub mod register;
pub mod resend_code;
pub mod verify_code;

use std::sync::Arc;

use takip_core::repositories::{UserRepository, VerificationStore};
use takip_core::services::{RegistrationService, VerificationService};

/// Application state that holds shared services
pub struct AppState<S, U>
where
    S: VerificationStore,
    U: UserRepository,
{
    pub verification_service: Arc<VerificationService<S>>,
    pub registration_service: Arc<RegistrationService<U>>,
    /// Backend reported by `/health`
    pub store_backend: &'static str,
}

impl<S, U> AppState<S, U>
where
    S: VerificationStore,
    U: UserRepository,
{
    pub fn new(
        verification_service: Arc<VerificationService<S>>,
        registration_service: Arc<RegistrationService<U>>,
        store_backend: &'static str,
    ) -> Self {
        Self {
            verification_service,
            registration_service,
            store_backend,
        }
    }
}
