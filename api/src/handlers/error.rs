//! Conversion of domain errors into HTTP responses
//!
//! Every failure leaves the API as an [`ErrorResponse`] body. Throttling
//! errors also carry a `Retry-After` header. Storage failures are logged here
//! and reach the client only as a generic `INTERNAL_ERROR`.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::{header, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use std::fmt;
use validator::ValidationErrors;

use takip_core::errors::{AuthError, DomainError, TokenError, ValidationError};
use takip_shared::errors::{error_codes, ErrorResponse};

/// Error returned by route handlers
#[derive(Debug)]
pub enum ApiError {
    /// Error raised by a core service
    Domain(DomainError),
    /// Request body rejected before reaching a service
    InvalidRequest(String),
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        ApiError::Domain(error)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
            .collect();
        fields.sort();
        ApiError::InvalidRequest(fields.join(", "))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Domain(error) => write!(f, "{}", error),
            ApiError::InvalidRequest(message) => write!(f, "Invalid request: {}", message),
        }
    }
}

impl ApiError {
    /// Wire code, status and client-facing message
    fn parts(&self) -> (&'static str, StatusCode, String) {
        let error = match self {
            ApiError::InvalidRequest(message) => {
                return (
                    error_codes::VALIDATION_ERROR,
                    StatusCode::BAD_REQUEST,
                    message.clone(),
                )
            }
            ApiError::Domain(error) => error,
        };

        match error {
            DomainError::Validation { message } => (
                error_codes::VALIDATION_ERROR,
                StatusCode::BAD_REQUEST,
                message.clone(),
            ),
            DomainError::ValidationErr(validation) => {
                let code = match validation {
                    ValidationError::InvalidEmail => error_codes::INVALID_EMAIL,
                    ValidationError::WeakPassword { .. } => error_codes::WEAK_PASSWORD,
                    ValidationError::RequiredField { .. } | ValidationError::InvalidFormat { .. } => {
                        error_codes::VALIDATION_ERROR
                    }
                };
                (code, StatusCode::BAD_REQUEST, validation.to_string())
            }
            DomainError::Auth(auth) => {
                let (code, status) = match auth {
                    AuthError::CooldownActive { .. } => {
                        (error_codes::COOLDOWN_ACTIVE, StatusCode::TOO_MANY_REQUESTS)
                    }
                    AuthError::DailyLimitExceeded { .. } => {
                        (error_codes::DAILY_LIMIT_EXCEEDED, StatusCode::TOO_MANY_REQUESTS)
                    }
                    AuthError::TooManyAttempts { .. } => {
                        (error_codes::TOO_MANY_ATTEMPTS, StatusCode::TOO_MANY_REQUESTS)
                    }
                    AuthError::InvalidOrExpiredCode => {
                        (error_codes::INVALID_OR_EXPIRED_CODE, StatusCode::BAD_REQUEST)
                    }
                    AuthError::UserNotFound => (error_codes::NOT_FOUND, StatusCode::NOT_FOUND),
                    AuthError::EmailAlreadyRegistered => {
                        (error_codes::EMAIL_ALREADY_REGISTERED, StatusCode::CONFLICT)
                    }
                };
                (code, status, auth.to_string())
            }
            DomainError::NotFound { resource } => (
                error_codes::NOT_FOUND,
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
            ),
            DomainError::Token(TokenError::TokenGenerationFailed) | DomainError::Internal { .. } => (
                error_codes::INTERNAL_ERROR,
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            ),
            // The failing check is never disclosed
            DomainError::Token(_) => (
                error_codes::INVALID_PRE_TOKEN,
                StatusCode::BAD_REQUEST,
                "Invalid or expired pre-auth token".to_string(),
            ),
        }
    }

    fn retry_after(&self) -> Option<i64> {
        match self {
            ApiError::Domain(DomainError::Auth(auth)) => auth.retry_after_seconds(),
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.parts().1
    }

    fn error_response(&self) -> HttpResponse {
        let (code, status, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, code = code, "Request failed");
        } else {
            tracing::debug!(error = %self, code = code, status = status.as_u16(), "Request rejected");
        }

        let mut body = ErrorResponse::new(code, message, status.as_u16());
        let mut response = HttpResponse::build(status);
        if let Some(seconds) = self.retry_after() {
            body = body.with_retry_after(seconds);
            response.insert_header((header::RETRY_AFTER, seconds.max(0).to_string()));
        }

        response.json(body)
    }
}

/// `JsonConfig` error handler: malformed or incomplete bodies become 400 `VALIDATION_ERROR`
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let api_error = ApiError::InvalidRequest(format!("Malformed request body: {}", err));
    let response = api_error.error_response();
    InternalError::from_response(err, response).into()
}

/// Body for unmatched routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
        StatusCode::NOT_FOUND.as_u16(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, Option<String>, ErrorResponse) {
        let response = error.error_response();
        let status = response.status();
        let retry = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, retry, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn cooldown_carries_retry_after() {
        let (status, header, body) = body_of(
            DomainError::from(AuthError::CooldownActive {
                retry_after_seconds: 42,
            })
            .into(),
        )
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(header.as_deref(), Some("42"));
        assert_eq!(body.error, "COOLDOWN_ACTIVE");
        assert_eq!(body.retry_after, Some(42));
        assert!(!body.ok);
        assert_eq!(body.status, 429);
    }

    #[actix_web::test]
    async fn internal_errors_do_not_leak_details() {
        let (status, header, body) =
            body_of(DomainError::internal("Database error: connection refused to 10.0.0.7").into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(header.is_none());
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert!(!body.message.contains("10.0.0.7"));
    }

    #[actix_web::test]
    async fn token_errors_share_one_code() {
        for token_error in [TokenError::EmailMismatch, TokenError::TokenExpired, TokenError::InvalidSignature] {
            let (status, _, body) = body_of(DomainError::from(token_error).into()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body.error, "INVALID_PRE_TOKEN");
        }
    }

    #[test]
    fn status_codes_follow_error_kinds() {
        let cases: Vec<(DomainError, u16)> = vec![
            (ValidationError::InvalidEmail.into(), 400),
            (ValidationError::WeakPassword { reason: "short".into() }.into(), 400),
            (AuthError::InvalidOrExpiredCode.into(), 400),
            (AuthError::UserNotFound.into(), 404),
            (AuthError::EmailAlreadyRegistered.into(), 409),
            (AuthError::TooManyAttempts { retry_after_seconds: 60 }.into(), 429),
            (AuthError::DailyLimitExceeded { retry_after_seconds: 60 }.into(), 429),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status_code().as_u16(), expected);
        }
    }
}
