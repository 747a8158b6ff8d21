//! Transactional storage abstraction for issued codes and their counters.
//!
//! All state belonging to one email (codes, resend and attempt metadata, and
//! the user's verification flag and credential) is read and written through a
//! `VerificationTransaction`. Implementations must guarantee two things:
//!
//! 1. Transactions for the same email are serialized, whatever the purpose of
//!    the request. A second `begin` waits until the first transaction commits
//!    or is dropped.
//! 2. Writes become visible only on `commit`. Dropping a transaction without
//!    committing discards every staged write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{AttemptMeta, CodePurpose, ResendMeta, User, VerificationCode};
use crate::errors::DomainResult;

/// Entry point to the verification store
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Open a transaction over everything stored for `email`
    async fn begin(&self, email: &str) -> DomainResult<Box<dyn VerificationTransaction>>;

    /// Delete codes that were used or expired before `before`
    ///
    /// Returns the number of deleted records.
    async fn purge_stale(&self, before: DateTime<Utc>) -> DomainResult<u64>;

    /// Short backend name for health output and logs
    fn backend_name(&self) -> &'static str;
}

/// A unit of work over one email
///
/// Resend and attempt metadata are shared by every purpose of the email;
/// codes keep their purpose so one flow's code never satisfies another.
#[async_trait]
pub trait VerificationTransaction: Send {
    /// Most recently issued code for `purpose`, used or not
    async fn latest_code(&mut self, purpose: CodePurpose) -> DomainResult<Option<VerificationCode>>;

    /// Resend metadata for the email (default when none was stored)
    async fn resend_meta(&mut self) -> DomainResult<ResendMeta>;

    /// Attempt metadata for the email (default when none was stored)
    async fn attempt_meta(&mut self) -> DomainResult<AttemptMeta>;

    /// The account owning the email, if any
    async fn user(&mut self) -> DomainResult<Option<User>>;

    /// Mark every unused code of the email, for any purpose, as used at `now`
    ///
    /// Returns the number of codes invalidated.
    async fn invalidate_unused(&mut self, now: DateTime<Utc>) -> DomainResult<u64>;

    /// Persist a newly issued code
    async fn insert_code(&mut self, code: &VerificationCode) -> DomainResult<()>;

    /// Mark a single code as consumed
    async fn mark_used(&mut self, code_id: Uuid, now: DateTime<Utc>) -> DomainResult<()>;

    async fn put_resend_meta(&mut self, meta: &ResendMeta) -> DomainResult<()>;

    async fn put_attempt_meta(&mut self, meta: &AttemptMeta) -> DomainResult<()>;

    /// Flag the user's email as verified
    async fn mark_user_verified(&mut self, user_id: Uuid, now: DateTime<Utc>) -> DomainResult<()>;

    /// Replace the user's password hash
    async fn set_user_password(
        &mut self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()>;

    /// Apply every staged write atomically and release the email
    async fn commit(self: Box<Self>) -> DomainResult<()>;
}
