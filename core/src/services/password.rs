//! Password acceptance rules and bcrypt hashing.

use takip_shared::config::PasswordConfig;

use crate::errors::{DomainError, DomainResult, ValidationError};

/// bcrypt ignores input past this many bytes
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Cost range accepted by the bcrypt crate
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Policy checked before any password is hashed
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    bcrypt_cost: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::from_config(&PasswordConfig::default())
    }
}

impl PasswordPolicy {
    pub fn new(min_length: usize, bcrypt_cost: u32) -> Self {
        Self {
            min_length,
            bcrypt_cost: bcrypt_cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub fn from_config(config: &PasswordConfig) -> Self {
        Self::new(config.min_length, config.bcrypt_cost)
    }

    /// Reject passwords that are too short, too long, or lack a letter and a digit
    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        let weak = |reason: String| Err(ValidationError::WeakPassword { reason });

        if password.chars().count() < self.min_length {
            return weak(format!(
                "must be at least {} characters long",
                self.min_length
            ));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return weak(format!("must be at most {} bytes long", MAX_PASSWORD_BYTES));
        }
        if !password.chars().any(|c| c.is_alphabetic()) {
            return weak("must contain at least one letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return weak("must contain at least one digit".to_string());
        }
        Ok(())
    }

    /// Hash on the blocking pool so slow bcrypt rounds never stall the runtime
    pub async fn hash(&self, password: &str) -> DomainResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }
}
