//! MySQL implementations of the core repository traits

mod user_repository;
mod verification_store;

pub use user_repository::MySqlUserRepository;
pub use verification_store::MySqlVerificationStore;

use sqlx::mysql::MySqlRow;
use sqlx::Row;
use uuid::Uuid;

use takip_core::domain::entities::User;
use takip_core::errors::DomainError;

/// Wrap a driver error with the operation that failed
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        tracing::error!(error = %e, operation = context, event = "database_error", "Database operation failed");
        DomainError::Internal {
            message: format!("Failed to {}: {}", context, e),
        }
    }
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in database: {}", e),
    })
}

/// Map a `users` row
pub(crate) fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
    let column = |name: &str, e: sqlx::Error| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    };

    let id: String = row.try_get("id").map_err(|e| column("id", e))?;

    Ok(User {
        id: parse_uuid(&id)?,
        email: row.try_get("email").map_err(|e| column("email", e))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| column("password_hash", e))?,
        is_verified: row.try_get("is_verified").map_err(|e| column("is_verified", e))?,
        created_at: row.try_get("created_at").map_err(|e| column("created_at", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| column("updated_at", e))?,
    })
}
