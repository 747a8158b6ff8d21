//! Tests for pre-auth token issuance and validation

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use takip_shared::config::PreAuthConfig;

use crate::domain::entities::pre_auth::PreAuthClaims;
use crate::errors::TokenError;
use crate::services::clock::{Clock, ManualClock};
use crate::services::token::PreAuthTokenIssuer;

const SECRET: &str = "test-pre-auth-secret";

fn setup() -> (PreAuthTokenIssuer, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let issuer = PreAuthTokenIssuer::new(&PreAuthConfig::new(SECRET), Arc::new(clock.clone()));
    (issuer, clock)
}

#[test]
fn test_issued_token_validates_for_same_email() {
    let (issuer, _) = setup();
    let issued = issuer.issue("alice@example.com").unwrap();

    assert_eq!(issued.expires_in, 30 * 60);
    let claims = issuer.verify(&issued.token, "alice@example.com").unwrap();
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.purpose, "email-verified");
    assert!(issuer.validate(&issued.token, "alice@example.com"));
}

#[test]
fn test_email_comparison_uses_normalized_form() {
    let (issuer, _) = setup();
    let issued = issuer.issue("alice@example.com").unwrap();

    assert!(issuer.validate(&issued.token, "  Alice@Example.com "));
}

#[test]
fn test_mismatched_email_fails_closed() {
    let (issuer, _) = setup();
    let issued = issuer.issue("alice@example.com").unwrap();

    assert_eq!(
        issuer.verify(&issued.token, "bob@example.com"),
        Err(TokenError::EmailMismatch)
    );
    assert!(!issuer.validate(&issued.token, "bob@example.com"));
}

#[test]
fn test_token_expires_without_leeway() {
    let (issuer, clock) = setup();
    let issued = issuer.issue("alice@example.com").unwrap();

    clock.advance(Duration::minutes(30) - Duration::seconds(1));
    assert!(issuer.validate(&issued.token, "alice@example.com"));

    clock.advance(Duration::seconds(1));
    assert_eq!(
        issuer.verify(&issued.token, "alice@example.com"),
        Err(TokenError::TokenExpired)
    );
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let (issuer, clock) = setup();
    let other = PreAuthTokenIssuer::new(
        &PreAuthConfig::new("some-other-secret"),
        Arc::new(clock.clone()),
    );
    let forged = other.issue("alice@example.com").unwrap();

    assert_eq!(
        issuer.verify(&forged.token, "alice@example.com"),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_wrong_purpose_is_rejected() {
    let (issuer, clock) = setup();
    let mut claims = PreAuthClaims::new("alice@example.com", "takip", clock.now(), Duration::minutes(30));
    claims.purpose = "password-reset".to_string();
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    assert_eq!(
        issuer.verify(&token, "alice@example.com"),
        Err(TokenError::InvalidPurpose)
    );
}

#[test]
fn test_garbage_is_rejected() {
    let (issuer, _) = setup();
    assert_eq!(
        issuer.verify("not-a-jwt", "alice@example.com"),
        Err(TokenError::InvalidTokenFormat)
    );
    assert!(!issuer.validate("", "alice@example.com"));
}
