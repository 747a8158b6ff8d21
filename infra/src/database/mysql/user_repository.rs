//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use sqlx::MySqlPool;

use takip_core::domain::entities::User;
use takip_core::errors::{AuthError, DomainResult};
use takip_core::repositories::UserRepository;

use super::{db_error, row_to_user};

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let query = r#"
            SELECT id, email, password_hash, is_verified, created_at, updated_at
            FROM users
            WHERE email = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find user by email"))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: User) -> DomainResult<User> {
        let query = r#"
            INSERT INTO users (id, email, password_hash, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.is_verified)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::EmailAlreadyRegistered.into())
            }
            Err(e) => Err(db_error("create user")(e)),
        }
    }
}
