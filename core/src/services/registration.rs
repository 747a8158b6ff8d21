//! Account creation, optionally backed by a pre-auth token.

use std::sync::Arc;

use takip_shared::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainResult, ValidationError};
use crate::repositories::user::UserRepository;
use crate::services::clock::Clock;
use crate::services::password::PasswordPolicy;
use crate::services::token::PreAuthTokenIssuer;

/// Creates accounts for the registration endpoint
///
/// A valid pre-auth token for the same email creates the account already
/// verified. Without a token the account starts unverified and the
/// verify-email flow applies.
pub struct RegistrationService<U: UserRepository> {
    users: Arc<U>,
    pre_auth: Arc<PreAuthTokenIssuer>,
    password_policy: PasswordPolicy,
    clock: Arc<dyn Clock>,
}

impl<U: UserRepository> RegistrationService<U> {
    pub fn new(
        users: Arc<U>,
        pre_auth: Arc<PreAuthTokenIssuer>,
        password_policy: PasswordPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            pre_auth,
            password_policy,
            clock,
        }
    }

    /// Register a new account
    ///
    /// # Returns
    /// * `Ok(User)` - The stored account
    /// * `Err(DomainError::ValidationErr)` - Bad email or weak password
    /// * `Err(DomainError::Token)` - `pre_token` present but not valid for `email`
    /// * `Err(DomainError::Auth(EmailAlreadyRegistered))` - Email taken
    pub async fn register(&self, email: &str, password: &str, pre_token: Option<&str>) -> DomainResult<User> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        self.password_policy.validate(password)?;

        let pre_verified = match pre_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => {
                self.pre_auth.verify(token, &email).map_err(|e| {
                    tracing::warn!(
                        email = %mask_email(&email),
                        reason = %e,
                        event = "pre_token_rejected",
                        "Registration presented an invalid pre-auth token"
                    );
                    e
                })?;
                true
            }
            None => false,
        };

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let hash = self.password_policy.hash(password).await?;
        let now = self.clock.now();
        let mut user = User::new(email, Some(hash), now);
        if pre_verified {
            user.verify(now);
        }
        let user = self.users.create(user).await?;

        tracing::info!(
            email = %mask_email(&user.email),
            user_id = %user.id,
            email_verified = user.is_verified,
            event = "user_registered",
            "Account created"
        );
        Ok(user)
    }
}
