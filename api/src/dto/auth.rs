use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body of every endpoint that only needs an address
/// (`resend-code`, `forgot-password`, `pre-verify-email`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(length(min = 1, max = 320, message = "email is required"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 1, max = 320, message = "email is required"))]
    pub email: String,

    /// 6-digit code; surrounding whitespace is ignored
    #[validate(length(min = 1, max = 32, message = "code is required"))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 320, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, max = 32, message = "code is required"))]
    pub code: String,

    /// New password; strength rules are applied by the service
    #[validate(length(max = 256, message = "password is too long"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 320, message = "email is required"))]
    pub email: String,

    #[validate(length(max = 256, message = "password is too long"))]
    pub password: String,

    /// Token from `pre-verify-email/verify`; creates the account verified
    #[serde(default)]
    pub pre_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSentResponse {
    pub ok: bool,
    /// Raw code, only when dev echo is enabled outside production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreVerifyResponse {
    pub ok: bool,
    pub pre_token: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub user_id: Uuid,
    pub email_verified: bool,
}
