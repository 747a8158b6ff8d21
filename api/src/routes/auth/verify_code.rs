use actix_web::{web, HttpResponse};
use validator::Validate;

use takip_core::domain::entities::CodePurpose;
use takip_core::repositories::{UserRepository, VerificationStore};
use takip_shared::types::OkResponse;

use crate::dto::auth::VerifyCodeRequest;
use crate::handlers::ApiError;

use super::AppState;

/// Handler for POST /api/v1/auth/verify-code
///
/// Consumes an email verification code and marks the account verified.
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com", "code": "123456" }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Invalid request data, or wrong, expired or used code
/// - 429 Too Many Requests: Identity locked after too many failed attempts
pub async fn verify_code<S, U>(
    state: web::Data<AppState<S, U>>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse, ApiError>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    request.validate()?;

    state
        .verification_service
        .verify_code(&request.email, &request.code, CodePurpose::VerifyEmail)
        .await?;

    Ok(HttpResponse::Ok().json(OkResponse::new()))
}
