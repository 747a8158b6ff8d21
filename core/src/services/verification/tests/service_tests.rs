//! Tests for the verification service flows

use chrono::{Duration, TimeZone, Utc};
use std::time::Duration as StdDuration;

use crate::domain::entities::{CodePurpose, User};
use crate::errors::{AuthError, DomainError, ValidationError};
use crate::repositories::user::UserRepository;
use crate::services::clock::Clock;
use crate::services::verification::VerificationServiceConfig;

use super::mocks::{harness, harness_with_mailer, Harness, RecordingMailer};

const EMAIL: &str = "a@x.com";

async fn add_user(h: &Harness, email: &str, verified: bool) -> User {
    let mut user = User::new(email, Some("old-hash".to_string()), h.clock.now());
    if verified {
        user.verify(h.clock.now());
    }
    h.store.create(user).await.unwrap()
}

async fn wait_for_mail(mailer: &RecordingMailer, count: usize) {
    for _ in 0..100 {
        if mailer.sent().len() >= count {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    panic!("expected {} mails, got {}", count, mailer.sent().len());
}

fn is_invalid_code(err: &DomainError) -> bool {
    matches!(err, DomainError::Auth(AuthError::InvalidOrExpiredCode))
}

#[tokio::test]
async fn test_request_verify_and_replay() {
    let h = harness(VerificationServiceConfig::default(), &["123456"]);
    add_user(&h, EMAIL, false).await;

    let outcome = h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    assert!(outcome.issued);
    assert_eq!(outcome.dev_code, None);
    assert_eq!(outcome.next_resend_at, Some(h.clock.now() + Duration::seconds(60)));

    wait_for_mail(&h.mailer, 1).await;
    let mail = &h.mailer.sent()[0];
    assert_eq!(mail.email, EMAIL);
    assert_eq!(mail.code, "123456");
    assert_eq!(mail.purpose, CodePurpose::VerifyEmail);

    h.service
        .verify_code(EMAIL, "123456", CodePurpose::VerifyEmail)
        .await
        .unwrap();
    let user = h.store.find_by_email(EMAIL).await.unwrap().unwrap();
    assert!(user.is_verified);

    let replay = h
        .service
        .verify_code(EMAIL, "123456", CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(is_invalid_code(&replay));
}

#[tokio::test]
async fn test_new_code_supersedes_previous() {
    let h = harness(VerificationServiceConfig::default(), &["111111", "222222"]);
    add_user(&h, EMAIL, false).await;

    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    h.clock.advance(Duration::seconds(60));
    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();

    let codes = h.store.codes(EMAIL, CodePurpose::VerifyEmail).await;
    assert_eq!(codes.len(), 2);
    assert!(codes[0].is_used());
    assert!(!codes[1].is_used());

    let err = h
        .service
        .verify_code(EMAIL, "111111", CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(is_invalid_code(&err));

    h.service
        .verify_code(EMAIL, "222222", CodePurpose::VerifyEmail)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_code_rejected_at_expiry() {
    let h = harness(VerificationServiceConfig::default(), &["123456"]);
    add_user(&h, EMAIL, false).await;

    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    h.clock.advance(Duration::minutes(15));

    let err = h
        .service
        .verify_code(EMAIL, "123456", CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(is_invalid_code(&err));
}

#[tokio::test]
async fn test_code_accepted_just_before_expiry() {
    let h = harness(VerificationServiceConfig::default(), &["123456"]);
    add_user(&h, EMAIL, false).await;

    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    h.clock.advance(Duration::minutes(15) - Duration::seconds(1));

    assert!(h
        .service
        .verify_code(EMAIL, " 123456 ", CodePurpose::VerifyEmail)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_rapid_resends_hit_cooldown_first() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, false).await;

    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    for _ in 2..=6 {
        let err = h
            .service
            .request_code(EMAIL, CodePurpose::VerifyEmail)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Auth(AuthError::CooldownActive { retry_after_seconds: 60 })
        ));
    }
    assert_eq!(h.store.codes(EMAIL, CodePurpose::VerifyEmail).await.len(), 1);
}

#[tokio::test]
async fn test_cooldown_boundary_passes() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, false).await;

    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    h.clock.advance(Duration::seconds(59));
    assert!(h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.is_err());

    h.clock.advance(Duration::seconds(1));
    assert!(h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.is_ok());
}

#[tokio::test]
async fn test_daily_limit_and_roll_over() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, false).await;

    for _ in 0..5 {
        h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
        h.clock.advance(Duration::seconds(60));
    }

    let err = h
        .service
        .request_code(EMAIL, CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::DailyLimitExceeded { .. })
    ));

    h.clock.set(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
    let outcome = h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    assert!(outcome.issued);
}

#[tokio::test]
async fn test_lockout_after_max_failures_even_with_correct_code() {
    let config = VerificationServiceConfig {
        lock_minutes: 10,
        ..Default::default()
    };
    let h = harness(config, &["123456"]);
    add_user(&h, EMAIL, false).await;
    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();

    for _ in 0..5 {
        let err = h
            .service
            .verify_code(EMAIL, "000000", CodePurpose::VerifyEmail)
            .await
            .unwrap_err();
        assert!(is_invalid_code(&err));
    }

    let err = h
        .service
        .verify_code(EMAIL, "123456", CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::TooManyAttempts { retry_after_seconds: 600 })
    ));

    h.clock.advance(Duration::minutes(10));
    h.service
        .verify_code(EMAIL, "123456", CodePurpose::VerifyEmail)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_success_resets_failure_count() {
    let h = harness(VerificationServiceConfig::default(), &["111111", "222222"]);
    add_user(&h, EMAIL, false).await;
    h.service.request_code(EMAIL, CodePurpose::ResetPassword).await.unwrap();

    for _ in 0..4 {
        assert!(h
            .service
            .verify_code(EMAIL, "999999", CodePurpose::ResetPassword)
            .await
            .is_err());
    }
    h.service
        .verify_code(EMAIL, "111111", CodePurpose::ResetPassword)
        .await
        .unwrap();

    h.clock.advance(Duration::seconds(60));
    h.service.request_code(EMAIL, CodePurpose::ResetPassword).await.unwrap();
    for _ in 0..4 {
        assert!(h
            .service
            .verify_code(EMAIL, "999999", CodePurpose::ResetPassword)
            .await
            .is_err());
    }
    // Four fresh failures are below the threshold
    h.service
        .verify_code(EMAIL, "222222", CodePurpose::ResetPassword)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_email_is_indistinguishable() {
    let h = harness(VerificationServiceConfig::default(), &[]);

    let outcome = h
        .service
        .request_code("ghost@x.com", CodePurpose::ResetPassword)
        .await
        .unwrap();
    assert!(!outcome.issued);
    assert!(outcome.next_resend_at.is_some());
    assert!(h.store.codes("ghost@x.com", CodePurpose::ResetPassword).await.is_empty());

    // Throttling still applies
    let err = h
        .service
        .request_code("ghost@x.com", CodePurpose::ResetPassword)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::CooldownActive { .. })));

    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_email_revealed_when_enabled() {
    let config = VerificationServiceConfig {
        reveal_unknown_accounts: true,
        ..Default::default()
    };
    let h = harness(config, &[]);

    let err = h
        .service
        .request_code("ghost@x.com", CodePurpose::ResetPassword)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::UserNotFound)));
}

#[tokio::test]
async fn test_already_verified_is_a_noop() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, true).await;

    let outcome = h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    assert!(!outcome.issued);
    assert!(h.store.codes(EMAIL, CodePurpose::VerifyEmail).await.is_empty());

    // No resend state recorded, so a repeat is not throttled
    assert!(h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.is_ok());
}

#[tokio::test]
async fn test_pre_registration_rejects_existing_account() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, false).await;

    let err = h
        .service
        .request_code(EMAIL, CodePurpose::PreRegistration)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Auth(AuthError::EmailAlreadyRegistered)));
}

#[tokio::test]
async fn test_pre_registration_issues_token_bound_to_email() {
    let h = harness(VerificationServiceConfig::default(), &["654321"]);

    let outcome = h
        .service
        .request_code("alice@example.com", CodePurpose::PreRegistration)
        .await
        .unwrap();
    assert!(outcome.issued);

    let verified = h
        .service
        .verify_pre_registration("Alice@Example.com", "654321")
        .await
        .unwrap();
    assert_eq!(verified.expires_in, 30 * 60);
    assert!(h.pre_auth.validate(&verified.pre_token, "alice@example.com"));
    assert!(!h.pre_auth.validate(&verified.pre_token, "bob@example.com"));
}

#[tokio::test]
async fn test_apply_reset_replaces_password() {
    let h = harness(VerificationServiceConfig::default(), &["246810"]);
    add_user(&h, EMAIL, true).await;
    h.service.request_code(EMAIL, CodePurpose::ResetPassword).await.unwrap();

    h.service.apply_reset(EMAIL, "246810", "newpass123").await.unwrap();

    let user = h.store.find_by_email(EMAIL).await.unwrap().unwrap();
    let hash = user.password_hash.unwrap();
    assert!(bcrypt::verify("newpass123", &hash).unwrap());

    let replay = h
        .service
        .apply_reset(EMAIL, "246810", "another456")
        .await
        .unwrap_err();
    assert!(is_invalid_code(&replay));
}

#[tokio::test]
async fn test_apply_reset_weak_password_keeps_code() {
    let h = harness(VerificationServiceConfig::default(), &["246810"]);
    add_user(&h, EMAIL, true).await;
    h.service.request_code(EMAIL, CodePurpose::ResetPassword).await.unwrap();

    for _ in 0..6 {
        let err = h.service.apply_reset(EMAIL, "246810", "short").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ValidationErr(ValidationError::WeakPassword { .. })
        ));
    }

    // Weak passwords neither consume the code nor count as failures
    h.service.apply_reset(EMAIL, "246810", "longenough1").await.unwrap();
    let user = h.store.find_by_email(EMAIL).await.unwrap().unwrap();
    assert_ne!(user.password_hash.as_deref(), Some("old-hash"));
}

#[tokio::test]
async fn test_code_only_redeems_its_own_purpose() {
    let h = harness(VerificationServiceConfig::default(), &["135790"]);
    add_user(&h, EMAIL, false).await;
    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();

    let err = h.service.apply_reset(EMAIL, "135790", "newpass123").await.unwrap_err();
    assert!(is_invalid_code(&err));

    h.service
        .verify_code(EMAIL, "135790", CodePurpose::VerifyEmail)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cooldown_is_shared_across_purposes() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, false).await;
    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();

    let err = h
        .service
        .request_code(EMAIL, CodePurpose::ResetPassword)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::CooldownActive { retry_after_seconds: 60 })
    ));
    assert!(h.store.codes(EMAIL, CodePurpose::ResetPassword).await.is_empty());
}

#[tokio::test]
async fn test_daily_limit_is_shared_across_purposes() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, false).await;

    let purposes = [CodePurpose::VerifyEmail, CodePurpose::ResetPassword];
    for purpose in purposes.iter().cycle().take(5) {
        h.service.request_code(EMAIL, *purpose).await.unwrap();
        h.clock.advance(Duration::seconds(60));
    }

    for purpose in purposes {
        let err = h.service.request_code(EMAIL, purpose).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Auth(AuthError::DailyLimitExceeded { .. })
        ));
    }
}

#[tokio::test]
async fn test_new_code_supersedes_other_purposes() {
    let h = harness(VerificationServiceConfig::default(), &["111111", "222222"]);
    add_user(&h, EMAIL, false).await;

    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    h.clock.advance(Duration::seconds(60));
    h.service.request_code(EMAIL, CodePurpose::ResetPassword).await.unwrap();

    let err = h
        .service
        .verify_code(EMAIL, "111111", CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(is_invalid_code(&err));
    h.service.apply_reset(EMAIL, "222222", "newpass123").await.unwrap();
}

#[tokio::test]
async fn test_lockout_is_shared_across_purposes() {
    let h = harness(VerificationServiceConfig::default(), &["246810"]);
    add_user(&h, EMAIL, true).await;
    h.service.request_code(EMAIL, CodePurpose::ResetPassword).await.unwrap();

    for _ in 0..5 {
        let err = h
            .service
            .verify_code(EMAIL, "000000", CodePurpose::VerifyEmail)
            .await
            .unwrap_err();
        assert!(is_invalid_code(&err));
    }

    let err = h.service.apply_reset(EMAIL, "246810", "newpass123").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Auth(AuthError::TooManyAttempts { .. })
    ));
    let user = h.store.find_by_email(EMAIL).await.unwrap().unwrap();
    assert_eq!(user.password_hash.as_deref(), Some("old-hash"));
}

#[tokio::test]
async fn test_dev_code_echo() {
    let config = VerificationServiceConfig {
        dev_return_code: true,
        ..Default::default()
    };
    let h = harness(config, &["424242"]);
    add_user(&h, EMAIL, false).await;

    let outcome = h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    assert_eq!(outcome.dev_code.as_deref(), Some("424242"));
}

#[tokio::test]
async fn test_email_is_normalized() {
    let h = harness(VerificationServiceConfig::default(), &["123456"]);
    add_user(&h, EMAIL, false).await;

    h.service
        .request_code("  A@X.COM ", CodePurpose::VerifyEmail)
        .await
        .unwrap();
    assert_eq!(h.store.codes(EMAIL, CodePurpose::VerifyEmail).await.len(), 1);
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let h = harness(VerificationServiceConfig::default(), &[]);

    let err = h
        .service
        .request_code("not-an-email", CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ValidationErr(ValidationError::InvalidEmail)));

    let err = h
        .service
        .verify_code("   ", "123456", CodePurpose::VerifyEmail)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ValidationErr(ValidationError::RequiredField { .. })
    ));
}

#[tokio::test]
async fn test_mail_failure_does_not_roll_back_issuance() {
    let h = harness_with_mailer(
        VerificationServiceConfig::default(),
        &["123456"],
        RecordingMailer::failing(),
    );
    add_user(&h, EMAIL, false).await;

    assert!(h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap().issued);
    tokio::time::sleep(StdDuration::from_millis(50)).await;

    h.service
        .verify_code(EMAIL, "123456", CodePurpose::VerifyEmail)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_slow_mail_does_not_block_request() {
    let config = VerificationServiceConfig {
        mail_timeout_seconds: 1,
        ..Default::default()
    };
    let h = harness_with_mailer(config, &["123456"], RecordingMailer::slow(StdDuration::from_secs(5)));
    add_user(&h, EMAIL, false).await;

    let started = std::time::Instant::now();
    h.service.request_code(EMAIL, CodePurpose::VerifyEmail).await.unwrap();
    assert!(started.elapsed() < StdDuration::from_secs(1));
}

#[tokio::test]
async fn test_concurrent_requests_pass_guard_once() {
    let h = harness(VerificationServiceConfig::default(), &[]);
    add_user(&h, EMAIL, false).await;

    let (first, second) = tokio::join!(
        h.service.request_code(EMAIL, CodePurpose::VerifyEmail),
        h.service.request_code(EMAIL, CodePurpose::VerifyEmail),
    );

    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(h.store.codes(EMAIL, CodePurpose::VerifyEmail).await.len(), 1);
}
