//! User repository trait defining the interface for account persistence.
//!
//! Only the operations the registration step needs live here. Verification
//! flows read and update users through a `VerificationTransaction` so that
//! those writes commit together with the code and counter updates.

use async_trait::async_trait;

use crate::domain::entities::user::User;
use crate::errors::DomainResult;

/// Repository trait for User entity persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by normalized email
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with this email
    /// * `Err(DomainError)` - Storage failure
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Create a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user
    /// * `Err(DomainError::Auth(AuthError::EmailAlreadyRegistered))` - Email taken
    /// * `Err(DomainError)` - Storage failure
    async fn create(&self, user: User) -> DomainResult<User>;
}
