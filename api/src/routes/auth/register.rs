use actix_web::{web, HttpResponse};
use validator::Validate;

use takip_core::repositories::{UserRepository, VerificationStore};

use crate::dto::auth::{RegisterRequest, RegisterResponse};
use crate::handlers::ApiError;

use super::AppState;

/// Handler for POST /api/v1/auth/register
///
/// With a `pre_token` from `pre-verify-email/verify` the account is created
/// verified; without one it starts unverified.
///
/// ## Errors
/// - 400 Bad Request: `INVALID_EMAIL`, `WEAK_PASSWORD` or `INVALID_PRE_TOKEN`
/// - 409 Conflict: Email already registered
pub async fn register<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request.validate()?;

    let user = state
        .registration_service
        .register(&request.email, &request.password, request.pre_token.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(RegisterResponse {
        ok: true,
        user_id: user.id,
        email_verified: user.is_verified,
    }))
}
