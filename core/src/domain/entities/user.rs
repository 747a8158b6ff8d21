//! User entity: the minimal account row the verification flows touch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Normalized (trimmed, lower-cased) email, unique across users
    pub email: String,

    /// bcrypt hash of the password, if one has been set
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Whether the email has been verified
    pub is_verified: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, unverified user
    pub fn new(email: impl Into<String>, password_hash: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the user's email as verified
    pub fn verify(&mut self, now: DateTime<Utc>) {
        self.is_verified = true;
        self.updated_at = now;
    }

    /// Replaces the stored credential
    pub fn set_password_hash(&mut self, hash: String, now: DateTime<Utc>) {
        self.password_hash = Some(hash);
        self.updated_at = now;
    }
}
