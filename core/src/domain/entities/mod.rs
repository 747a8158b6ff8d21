//! Domain entities representing core business objects.

pub mod pre_auth;
pub mod user;
pub mod verification_code;
pub mod verification_meta;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use pre_auth::{PreAuthClaims, PRE_AUTH_PURPOSE};
pub use user::User;
pub use verification_code::{CodePurpose, VerificationCode, CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES};
pub use verification_meta::{day_key, AttemptMeta, ResendMeta, DAY_KEY_FORMAT};
