//! Email ownership proof before an account exists.

use actix_web::{web, HttpResponse};
use validator::Validate;

use takip_core::domain::entities::CodePurpose;
use takip_core::repositories::{UserRepository, VerificationStore};

use crate::dto::auth::{EmailRequest, PreVerifyResponse, VerifyCodeRequest};
use crate::handlers::ApiError;

use super::resend_code::request_code;
use super::AppState;

/// Handler for POST /api/v1/auth/pre-verify-email
///
/// Sends a `pre-registration` code. Returns 409 when the email already
/// belongs to an account.
pub async fn pre_verify_email<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request_code(&state, request.into_inner(), CodePurpose::PreRegistration).await
}

/// Handler for POST /api/v1/auth/pre-verify-email/verify
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "ok": true, "pre_token": "eyJhbGciOiJIUzI1NiIs...", "expires_in": 1800 }
/// ```
pub async fn confirm_pre_verify<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request.validate()?;

    let outcome = state
        .verification_service
        .verify_pre_registration(&request.email, &request.code)
        .await?;

    Ok(HttpResponse::Ok().json(PreVerifyResponse {
        ok: true,
        pre_token: outcome.pre_token,
        expires_in: outcome.expires_in,
    }))
}
