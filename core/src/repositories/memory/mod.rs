//! In-memory implementation of the verification store and user repository.
//!
//! Used by tests and by the server when no `DATABASE_URL` is configured.
//! Every transaction holds a per-email async mutex for its whole lifetime and
//! works on a private copy of that email's state; `commit` writes the copy back
//! under the state lock, so a dropped transaction leaves no trace.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::domain::entities::{AttemptMeta, CodePurpose, ResendMeta, User, VerificationCode};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::user::UserRepository;
use crate::repositories::verification::{VerificationStore, VerificationTransaction};


#[derive(Default)]
struct MemoryState {
    codes: HashMap<String, Vec<VerificationCode>>,
    resend: HashMap<String, ResendMeta>,
    attempts: HashMap<String, AttemptMeta>,
    users: HashMap<String, User>,
}

/// Process-local store backed by hash maps
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All codes ever issued for `email` and `purpose`, oldest first
    pub async fn codes(&self, email: &str, purpose: CodePurpose) -> Vec<VerificationCode> {
        let state = self.state.read().await;
        state
            .codes
            .get(email)
            .map(|codes| codes.iter().filter(|c| c.purpose == purpose).cloned().collect())
            .unwrap_or_default()
    }

    async fn key_lock(&self, email: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(email.to_string()).or_default().clone()
    }
}

#[async_trait]
impl VerificationStore for InMemoryStore {
    async fn begin(&self, email: &str) -> DomainResult<Box<dyn VerificationTransaction>> {
        let guard = self.key_lock(email).await.lock_owned().await;

        let state = self.state.read().await;
        let scope = Scope {
            codes: state.codes.get(email).cloned().unwrap_or_default(),
            resend: state.resend.get(email).cloned().unwrap_or_default(),
            attempts: state.attempts.get(email).cloned().unwrap_or_default(),
            user: state.users.get(email).cloned(),
        };
        drop(state);

        Ok(Box::new(MemoryTransaction {
            email: email.to_string(),
            state: Arc::clone(&self.state),
            scope,
            dirty: Dirty::default(),
            user_writes: Vec::new(),
            _guard: guard,
        }))
    }

    async fn purge_stale(&self, before: DateTime<Utc>) -> DomainResult<u64> {
        let mut state = self.state.write().await;
        let mut deleted = 0u64;

        for codes in state.codes.values_mut() {
            let len = codes.len();
            codes.retain(|c| {
                let used_long_ago = c.used_at.map_or(false, |used| used < before);
                !(used_long_ago || c.expires_at < before)
            });
            deleted += (len - codes.len()) as u64;
        }
        state.codes.retain(|_, codes| !codes.is_empty());
        state
            .resend
            .retain(|_, meta| meta.last_sent_at.map_or(false, |sent| sent >= before));
        state
            .attempts
            .retain(|_, meta| meta.count > 0 || meta.locked_until.map_or(false, |t| t >= before));
        drop(state);

        // Locks nobody is waiting on can go
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);

        Ok(deleted)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(email).cloned())
    }

    async fn create(&self, user: User) -> DomainResult<User> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.email) {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }
        state.users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}

struct Scope {
    codes: Vec<VerificationCode>,
    resend: ResendMeta,
    attempts: AttemptMeta,
    user: Option<User>,
}

#[derive(Default)]
struct Dirty {
    codes: bool,
    resend: bool,
    attempts: bool,
}

enum UserWrite {
    Verified(Uuid, DateTime<Utc>),
    Password(Uuid, String, DateTime<Utc>),
}

struct MemoryTransaction {
    email: String,
    state: Arc<RwLock<MemoryState>>,
    scope: Scope,
    dirty: Dirty,
    user_writes: Vec<UserWrite>,
    _guard: OwnedMutexGuard<()>,
}

impl MemoryTransaction {
    fn scoped_user(&mut self, user_id: Uuid) -> DomainResult<&mut User> {
        self.scope
            .user
            .as_mut()
            .filter(|u| u.id == user_id)
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("user {}", user_id),
            })
    }
}

#[async_trait]
impl VerificationTransaction for MemoryTransaction {
    async fn latest_code(&mut self, purpose: CodePurpose) -> DomainResult<Option<VerificationCode>> {
        Ok(self
            .scope
            .codes
            .iter()
            .filter(|c| c.purpose == purpose)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn resend_meta(&mut self) -> DomainResult<ResendMeta> {
        Ok(self.scope.resend.clone())
    }

    async fn attempt_meta(&mut self) -> DomainResult<AttemptMeta> {
        Ok(self.scope.attempts.clone())
    }

    async fn user(&mut self) -> DomainResult<Option<User>> {
        Ok(self.scope.user.clone())
    }

    async fn invalidate_unused(&mut self, now: DateTime<Utc>) -> DomainResult<u64> {
        let mut count = 0;
        for code in self.scope.codes.iter_mut().filter(|c| !c.is_used()) {
            code.mark_used(now);
            count += 1;
        }
        self.dirty.codes |= count > 0;
        Ok(count)
    }

    async fn insert_code(&mut self, code: &VerificationCode) -> DomainResult<()> {
        self.scope.codes.push(code.clone());
        self.dirty.codes = true;
        Ok(())
    }

    async fn mark_used(&mut self, code_id: Uuid, now: DateTime<Utc>) -> DomainResult<()> {
        let code = self
            .scope
            .codes
            .iter_mut()
            .find(|c| c.id == code_id)
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("verification code {}", code_id),
            })?;
        code.mark_used(now);
        self.dirty.codes = true;
        Ok(())
    }

    async fn put_resend_meta(&mut self, meta: &ResendMeta) -> DomainResult<()> {
        self.scope.resend = meta.clone();
        self.dirty.resend = true;
        Ok(())
    }

    async fn put_attempt_meta(&mut self, meta: &AttemptMeta) -> DomainResult<()> {
        self.scope.attempts = meta.clone();
        self.dirty.attempts = true;
        Ok(())
    }

    async fn mark_user_verified(&mut self, user_id: Uuid, now: DateTime<Utc>) -> DomainResult<()> {
        self.scoped_user(user_id)?.verify(now);
        self.user_writes.push(UserWrite::Verified(user_id, now));
        Ok(())
    }

    async fn set_user_password(
        &mut self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.scoped_user(user_id)?
            .set_password_hash(password_hash.to_string(), now);
        self.user_writes
            .push(UserWrite::Password(user_id, password_hash.to_string(), now));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        let this = *self;
        let mut state = this.state.write().await;

        if this.dirty.codes {
            state.codes.insert(this.email.clone(), this.scope.codes);
        }
        if this.dirty.resend {
            state.resend.insert(this.email.clone(), this.scope.resend);
        }
        if this.dirty.attempts {
            state.attempts.insert(this.email.clone(), this.scope.attempts);
        }

        if let Some(user) = state.users.get_mut(&this.email) {
            for write in this.user_writes {
                match write {
                    UserWrite::Verified(id, now) if id == user.id => user.verify(now),
                    UserWrite::Password(id, hash, now) if id == user.id => {
                        user.set_password_hash(hash, now)
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
