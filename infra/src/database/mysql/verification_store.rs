//! MySQL implementation of the VerificationStore trait.
//!
//! `begin` opens a database transaction and takes a row lock on the email's
//! `verification_meta` row (`INSERT IGNORE` followed by `SELECT ... FOR
//! UPDATE`), which serializes concurrent transactions for the same email
//! across all purposes. All later statements run on that transaction, so a
//! dropped transaction is rolled back by the driver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use std::str::FromStr;
use uuid::Uuid;

use takip_core::domain::entities::{AttemptMeta, CodePurpose, ResendMeta, User, VerificationCode};
use takip_core::errors::{DomainError, DomainResult};
use takip_core::repositories::{VerificationStore, VerificationTransaction};

use super::{db_error, parse_uuid, row_to_user};

/// MySQL implementation of VerificationStore
#[derive(Clone)]
pub struct MySqlVerificationStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Map a `verification_codes` row
    fn row_to_code(row: &MySqlRow) -> Result<VerificationCode, DomainError> {
        let column = |name: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", name, e),
        };

        let id: String = row.try_get("id").map_err(|e| column("id", e))?;
        let purpose: String = row.try_get("purpose").map_err(|e| column("purpose", e))?;

        Ok(VerificationCode {
            id: parse_uuid(&id)?,
            email: row.try_get("email").map_err(|e| column("email", e))?,
            purpose: CodePurpose::from_str(&purpose).map_err(|message| DomainError::Internal { message })?,
            code: row.try_get("code").map_err(|e| column("code", e))?,
            created_at: row.try_get("created_at").map_err(|e| column("created_at", e))?,
            expires_at: row.try_get("expires_at").map_err(|e| column("expires_at", e))?,
            used_at: row.try_get("used_at").map_err(|e| column("used_at", e))?,
        })
    }

    /// Map a locked `verification_meta` row
    fn row_to_meta(row: &MySqlRow) -> Result<(ResendMeta, AttemptMeta), DomainError> {
        let column = |name: &str, e: sqlx::Error| DomainError::Internal {
            message: format!("Failed to get {}: {}", name, e),
        };

        let resend = ResendMeta {
            last_sent_at: row.try_get("last_sent_at").map_err(|e| column("last_sent_at", e))?,
            sent_count: row.try_get("sent_count").map_err(|e| column("sent_count", e))?,
            day_key: row.try_get("day_key").map_err(|e| column("day_key", e))?,
        };
        let attempts = AttemptMeta {
            count: row.try_get("attempt_count").map_err(|e| column("attempt_count", e))?,
            locked_until: row.try_get("locked_until").map_err(|e| column("locked_until", e))?,
        };
        Ok((resend, attempts))
    }
}

#[async_trait]
impl VerificationStore for MySqlVerificationStore {
    async fn begin(&self, email: &str) -> DomainResult<Box<dyn VerificationTransaction>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin verification transaction"))?;

        sqlx::query(
            "INSERT IGNORE INTO verification_meta (email, sent_count, day_key, attempt_count) VALUES (?, 0, '', 0)",
        )
        .bind(email)
        .execute(&mut *tx)
        .await
        .map_err(db_error("create verification meta"))?;

        let row = sqlx::query(
            r#"
            SELECT last_sent_at, sent_count, day_key, attempt_count, locked_until
            FROM verification_meta
            WHERE email = ?
            FOR UPDATE
            "#,
        )
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("lock verification meta"))?;

        let (resend, attempts) = Self::row_to_meta(&row)?;

        Ok(Box::new(MySqlVerificationTransaction {
            tx,
            email: email.to_string(),
            resend,
            attempts,
        }))
    }

    async fn purge_stale(&self, before: DateTime<Utc>) -> DomainResult<u64> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM verification_codes
            WHERE (used_at IS NOT NULL AND used_at < ?) OR expires_at < ?
            "#,
        )
        .bind(before)
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(db_error("purge stale codes"))?
        .rows_affected();

        sqlx::query(
            r#"
            DELETE FROM verification_meta
            WHERE (last_sent_at IS NULL OR last_sent_at < ?)
              AND attempt_count = 0
              AND (locked_until IS NULL OR locked_until < ?)
            "#,
        )
        .bind(before)
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(db_error("purge stale verification meta"))?;

        Ok(deleted)
    }

    fn backend_name(&self) -> &'static str {
        "mysql"
    }
}

/// One locked email
struct MySqlVerificationTransaction {
    tx: Transaction<'static, MySql>,
    email: String,
    resend: ResendMeta,
    attempts: AttemptMeta,
}

#[async_trait]
impl VerificationTransaction for MySqlVerificationTransaction {
    async fn latest_code(&mut self, purpose: CodePurpose) -> DomainResult<Option<VerificationCode>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, purpose, code, created_at, expires_at, used_at
            FROM verification_codes
            WHERE email = ? AND purpose = ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(&self.email)
        .bind(purpose.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("load latest code"))?;

        row.as_ref()
            .map(MySqlVerificationStore::row_to_code)
            .transpose()
    }

    async fn resend_meta(&mut self) -> DomainResult<ResendMeta> {
        Ok(self.resend.clone())
    }

    async fn attempt_meta(&mut self) -> DomainResult<AttemptMeta> {
        Ok(self.attempts.clone())
    }

    async fn user(&mut self) -> DomainResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, is_verified, created_at, updated_at
            FROM users
            WHERE email = ?
            LIMIT 1
            "#,
        )
        .bind(&self.email)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error("load user"))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn invalidate_unused(&mut self, now: DateTime<Utc>) -> DomainResult<u64> {
        let result = sqlx::query(
            "UPDATE verification_codes SET used_at = ? WHERE email = ? AND used_at IS NULL",
        )
        .bind(now)
        .bind(&self.email)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("invalidate unused codes"))?;

        Ok(result.rows_affected())
    }

    async fn insert_code(&mut self, code: &VerificationCode) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_codes (id, email, purpose, code, created_at, expires_at, used_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(code.id.to_string())
        .bind(&code.email)
        .bind(code.purpose.as_str())
        .bind(&code.code)
        .bind(code.created_at)
        .bind(code.expires_at)
        .bind(code.used_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("insert verification code"))?;

        Ok(())
    }

    async fn mark_used(&mut self, code_id: Uuid, now: DateTime<Utc>) -> DomainResult<()> {
        sqlx::query("UPDATE verification_codes SET used_at = ? WHERE id = ? AND used_at IS NULL")
            .bind(now)
            .bind(code_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("mark code used"))?;

        Ok(())
    }

    async fn put_resend_meta(&mut self, meta: &ResendMeta) -> DomainResult<()> {
        sqlx::query(
            "UPDATE verification_meta SET last_sent_at = ?, sent_count = ?, day_key = ? WHERE email = ?",
        )
        .bind(meta.last_sent_at)
        .bind(meta.sent_count)
        .bind(&meta.day_key)
        .bind(&self.email)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("store resend meta"))?;

        self.resend = meta.clone();
        Ok(())
    }

    async fn put_attempt_meta(&mut self, meta: &AttemptMeta) -> DomainResult<()> {
        sqlx::query(
            "UPDATE verification_meta SET attempt_count = ?, locked_until = ? WHERE email = ?",
        )
        .bind(meta.count)
        .bind(meta.locked_until)
        .bind(&self.email)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("store attempt meta"))?;

        self.attempts = meta.clone();
        Ok(())
    }

    async fn mark_user_verified(&mut self, user_id: Uuid, now: DateTime<Utc>) -> DomainResult<()> {
        sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(user_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("mark user verified"))?;

        Ok(())
    }

    async fn set_user_password(
        &mut self,
        user_id: Uuid,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(now)
            .bind(user_id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("update user password"))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> DomainResult<()> {
        self.tx
            .commit()
            .await
            .map_err(db_error("commit verification transaction"))
    }
}
