//! Pre-auth token issuance and validation

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use takip_shared::config::PreAuthConfig;
use takip_shared::email::{mask_email, normalize_email};

use crate::domain::entities::pre_auth::{PreAuthClaims, PRE_AUTH_PURPOSE};
use crate::errors::{DomainError, TokenError};
use crate::services::clock::Clock;

/// A freshly signed pre-auth token
#[derive(Debug, Clone)]
pub struct IssuedPreAuthToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Signs and checks stateless "this email was just verified" tokens
///
/// The secret is read once at construction. Expiry is checked against the
/// injected clock with zero leeway rather than by the JWT library, so the
/// same clock drives code expiry and token expiry.
pub struct PreAuthTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PreAuthTokenIssuer {
    pub fn new(config: &PreAuthConfig, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            ttl: Duration::minutes(config.ttl_minutes),
            clock,
        }
    }

    /// Issue a token for an already-normalized email
    pub fn issue(&self, email: &str) -> Result<IssuedPreAuthToken, DomainError> {
        let now = self.clock.now();
        let claims = PreAuthClaims::new(email, &self.issuer, now, self.ttl);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, event = "pre_auth_issue_failed", "Failed to sign pre-auth token");
            DomainError::Token(TokenError::TokenGenerationFailed)
        })?;

        tracing::info!(
            email = %mask_email(email),
            jti = %claims.jti,
            event = "pre_auth_issued",
            "Issued pre-auth token"
        );

        Ok(IssuedPreAuthToken {
            token,
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or(now + self.ttl),
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Decode and check a token against the email presented with it
    ///
    /// Signature, issuer, expiry, purpose and exact email equality must all
    /// hold; anything else fails closed.
    pub fn verify(&self, token: &str, expected_email: &str) -> Result<PreAuthClaims, TokenError> {
        let data = decode::<PreAuthClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::TokenExpired,
                ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
                    TokenError::InvalidClaims
                }
                _ => TokenError::InvalidTokenFormat,
            },
        )?;
        let claims = data.claims;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::TokenExpired);
        }
        if claims.purpose != PRE_AUTH_PURPOSE {
            return Err(TokenError::InvalidPurpose);
        }
        if claims.email != normalize_email(expected_email) {
            return Err(TokenError::EmailMismatch);
        }

        Ok(claims)
    }

    /// Boolean form of [`verify`](Self::verify)
    pub fn validate(&self, token: &str, expected_email: &str) -> bool {
        self.verify(token, expected_email).is_ok()
    }
}
