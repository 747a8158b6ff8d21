use actix_web::{web, HttpResponse};
use validator::Validate;

use takip_core::domain::entities::CodePurpose;
use takip_core::repositories::{UserRepository, VerificationStore};

use crate::dto::auth::{CodeSentResponse, EmailRequest};
use crate::handlers::ApiError;

use super::AppState;

/// Issue a code for `purpose` and answer `{ok:true[, dev_code]}`
///
/// Shared by every "send me a code" endpoint. The body is identical whether
/// or not a code was actually issued.
pub(crate) async fn request_code<S, U>(
    state: &AppState<S, U>,
    request: EmailRequest,
    purpose: CodePurpose,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request.validate()?;

    let outcome = state
        .verification_service
        .request_code(&request.email, purpose)
        .await?;

    Ok(HttpResponse::Ok().json(CodeSentResponse {
        ok: true,
        dev_code: outcome.dev_code,
    }))
}

/// Handler for POST /api/v1/auth/resend-code
///
/// Sends an email verification code to an existing, unverified account.
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "ok": true }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing or malformed email
/// - 429 Too Many Requests: Cooldown active or daily limit reached
/// - 500 Internal Server Error: Storage failure
pub async fn resend_code<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request_code(&state, request.into_inner(), CodePurpose::VerifyEmail).await
}
