//! Password reset: request a code, then trade it for a new password.

use actix_web::{web, HttpResponse};
use validator::Validate;

use takip_core::domain::entities::CodePurpose;
use takip_core::repositories::{UserRepository, VerificationStore};
use takip_shared::types::OkResponse;

use crate::dto::auth::{EmailRequest, ResetPasswordRequest};
use crate::handlers::ApiError;

use super::resend_code::request_code;
use super::AppState;

/// Handler for POST /api/v1/auth/forgot-password
///
/// Same contract as `resend-code` with the `reset-password` purpose. Unknown
/// emails get the same `{ok:true}` unless the deployment opts into 404s.
pub async fn forgot_password<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request_code(&state, request.into_inner(), CodePurpose::ResetPassword).await
}

/// Handler for POST /api/v1/auth/reset-password
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com", "code": "123456", "password": "n3w-Secret" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `WEAK_PASSWORD` (code untouched) or `INVALID_OR_EXPIRED_CODE`
/// - 429 Too Many Requests: Identity locked
pub async fn reset_password<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request.validate()?;

    state
        .verification_service
        .apply_reset(&request.email, &request.code, &request.password)
        .await?;

    Ok(HttpResponse::Ok().json(OkResponse::new()))
}
