//! Main verification service implementation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use takip_shared::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::verification_code::{CodePurpose, VerificationCode};
use crate::domain::entities::verification_meta::AttemptMeta;
use crate::errors::{AuthError, DomainError, DomainResult, ValidationError};
use crate::repositories::verification::{VerificationStore, VerificationTransaction};
use crate::services::clock::Clock;
use crate::services::password::PasswordPolicy;
use crate::services::token::PreAuthTokenIssuer;

use super::attempt_guard::{AttemptGuard, LockStatus};
use super::code_generator::{CodeGenerator, SecureCodeGenerator};
use super::config::VerificationServiceConfig;
use super::dispatch::MailDispatcher;
use super::resend_guard::ResendGuard;
use super::traits::{CodeMessage, Mailer};
use super::types::{PreVerifyOutcome, RequestCodeOutcome, VerifyCodeOutcome};

/// Outcome of checking a submitted code inside a transaction
enum Redemption {
    /// Code consumed and attempts reset (staged, not yet committed)
    Accepted,
    /// Rejected; any attempt-counter change is staged
    Rejected(AuthError),
}

/// What the caller learns about the account behind a code request
enum Recipient {
    Issue,
    /// Run the resend guard but issue nothing
    Silent,
    /// Nothing to do at all
    AlreadyDone,
}

/// Verification service for email one-time codes
///
/// Every operation runs inside a single store transaction over the email, so
/// concurrent requests for the same address are serialized whichever flow they
/// belong to, and each call commits all of its writes or none of them. The
/// resend quota, cooldown and attempt lock are shared by all purposes.
pub struct VerificationService<S: VerificationStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn CodeGenerator>,
    dispatcher: MailDispatcher,
    resend_guard: ResendGuard,
    attempt_guard: AttemptGuard,
    password_policy: PasswordPolicy,
    pre_auth: Arc<PreAuthTokenIssuer>,
    config: VerificationServiceConfig,
}

impl<S: VerificationStore> VerificationService<S> {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `store` - Transactional code storage
    /// * `mailer` - Transport used by the background dispatcher
    /// * `clock` - Time source for expiry, cooldown and day roll-over
    /// * `pre_auth` - Issuer for pre-registration tokens
    /// * `password_policy` - Rules applied before a reset password is hashed
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<S>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        pre_auth: Arc<PreAuthTokenIssuer>,
        password_policy: PasswordPolicy,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            store,
            clock,
            generator: Arc::new(SecureCodeGenerator),
            dispatcher: MailDispatcher::new(mailer, config.mail_timeout()),
            resend_guard: ResendGuard::new(config.resend_cooldown_seconds, config.daily_limit),
            attempt_guard: AttemptGuard::new(config.max_attempts, config.lock_minutes),
            password_policy,
            pre_auth,
            config,
        }
    }

    /// Replace the CSPRNG generator, for deterministic tests
    pub fn with_code_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a code for `purpose` to `email` and hand it to the mailer
    ///
    /// This method:
    /// 1. Resolves the account behind the email for the purpose
    /// 2. Applies the resend cooldown and daily quota
    /// 3. Supersedes every unused code for the email, whatever its purpose
    /// 4. Persists the new code and commits
    /// 5. Dispatches mail in the background
    ///
    /// Unknown emails on `verify-email` and `reset-password` pass through the
    /// resend guard and return an outcome with `issued == false`, unless
    /// `reveal_unknown_accounts` turns the reset case into `UserNotFound`.
    ///
    /// # Returns
    ///
    /// * `Ok(RequestCodeOutcome)` - Request accepted
    /// * `Err(DomainError)` - Invalid email, throttled, conflict or storage failure
    pub async fn request_code(&self, email: &str, purpose: CodePurpose) -> DomainResult<RequestCodeOutcome> {
        let email = normalize_checked(email)?;
        let masked = mask_email(&email);
        let mut tx = self.store.begin(&email).await?;
        let now = self.clock.now();

        let recipient = match (purpose, tx.user().await?) {
            (CodePurpose::VerifyEmail, Some(user)) if user.is_verified => Recipient::AlreadyDone,
            (CodePurpose::VerifyEmail, Some(_)) | (CodePurpose::ResetPassword, Some(_)) => {
                Recipient::Issue
            }
            (CodePurpose::ResetPassword, None) if self.config.reveal_unknown_accounts => {
                return Err(AuthError::UserNotFound.into());
            }
            (CodePurpose::VerifyEmail, None) | (CodePurpose::ResetPassword, None) => Recipient::Silent,
            (CodePurpose::PreRegistration, Some(_)) => {
                tracing::info!(
                    email = %masked,
                    event = "pre_registration_conflict",
                    "Pre-registration requested for an existing account"
                );
                return Err(AuthError::EmailAlreadyRegistered.into());
            }
            (CodePurpose::PreRegistration, None) => Recipient::Issue,
        };

        if let Recipient::AlreadyDone = recipient {
            tracing::info!(
                email = %masked,
                purpose = %purpose,
                event = "otp_skipped_already_verified",
                "Email already verified, no code issued"
            );
            return Ok(RequestCodeOutcome::noop());
        }

        let mut resend = tx.resend_meta().await?;
        if let Err(denial) = self.resend_guard.check_and_record(&mut resend, now, self.clock.as_ref()) {
            let error = AuthError::from(denial);
            tracing::warn!(
                email = %masked,
                purpose = %purpose,
                retry_after = error.retry_after_seconds().unwrap_or_default(),
                reason = %error,
                event = "rate_limit_exceeded",
                "Verification code request throttled"
            );
            return Err(error.into());
        }
        tx.put_resend_meta(&resend).await?;
        let next_resend_at = self.resend_guard.next_allowed_at(&resend);

        if let Recipient::Silent = recipient {
            tx.commit().await?;
            tracing::info!(
                email = %masked,
                purpose = %purpose,
                event = "otp_unknown_account",
                "Code requested for unknown account, nothing issued"
            );
            return Ok(RequestCodeOutcome {
                issued: false,
                dev_code: None,
                next_resend_at,
            });
        }

        let superseded = tx.invalidate_unused(now).await?;
        let code = VerificationCode::issue(
            email.as_str(),
            purpose,
            self.generator.generate(),
            now,
            self.config.code_ttl(),
        );
        tx.insert_code(&code).await?;
        tx.commit().await?;

        tracing::info!(
            email = %masked,
            purpose = %purpose,
            session_id = %code.id,
            superseded = superseded,
            daily_count = resend.sent_count,
            event = "otp_generated",
            "Generated new verification code"
        );

        self.dispatcher.dispatch(CodeMessage {
            email: email.clone(),
            code: code.code.clone(),
            purpose,
            expires_in_minutes: self.config.code_expiration_minutes,
        });

        Ok(RequestCodeOutcome {
            issued: true,
            dev_code: self.config.dev_return_code.then(|| code.code.clone()),
            next_resend_at,
        })
    }

    /// Check and consume a code
    ///
    /// For `verify-email` the account is flagged verified in the same commit.
    /// Other purposes only consume the code; password resets and
    /// pre-registration have dedicated entry points that attach their effect
    /// to the same transaction.
    pub async fn verify_code(
        &self,
        email: &str,
        code: &str,
        purpose: CodePurpose,
    ) -> DomainResult<VerifyCodeOutcome> {
        let email = normalize_checked(email)?;
        let mut tx = self.store.begin(&email).await?;
        let now = self.clock.now();

        match self.redeem(tx.as_mut(), &email, code, purpose, now).await? {
            Redemption::Rejected(error) => {
                tx.commit().await?;
                return Err(error.into());
            }
            Redemption::Accepted => {}
        }

        if purpose == CodePurpose::VerifyEmail {
            if let Some(user) = tx.user().await? {
                tx.mark_user_verified(user.id, now).await?;
            }
        }
        tx.commit().await?;

        tracing::info!(
            email = %mask_email(&email),
            purpose = %purpose,
            event = "otp_verified_success",
            "Verification code accepted"
        );

        Ok(VerifyCodeOutcome {
            email,
            verified_at: now,
        })
    }

    /// Verify a pre-registration code and issue a pre-auth token for the email
    pub async fn verify_pre_registration(&self, email: &str, code: &str) -> DomainResult<PreVerifyOutcome> {
        let outcome = self
            .verify_code(email, code, CodePurpose::PreRegistration)
            .await?;
        let issued = self.pre_auth.issue(&outcome.email)?;

        Ok(PreVerifyOutcome {
            pre_token: issued.token,
            expires_in: issued.expires_in,
        })
    }

    /// Complete a password reset with a `reset-password` code
    ///
    /// The password policy is enforced before the code is looked at, so a weak
    /// password neither consumes the code nor counts as a failed attempt. The
    /// new hash and the code consumption commit together. The hash is computed
    /// before the transaction opens so bcrypt never runs under the email lock.
    pub async fn apply_reset(&self, email: &str, code: &str, new_password: &str) -> DomainResult<()> {
        self.password_policy.validate(new_password)?;

        let email = normalize_checked(email)?;
        let masked = mask_email(&email);
        let purpose = CodePurpose::ResetPassword;
        let hash = self.password_policy.hash(new_password).await?;
        let mut tx = self.store.begin(&email).await?;
        let now = self.clock.now();

        match self.redeem(tx.as_mut(), &email, code, purpose, now).await? {
            Redemption::Rejected(error) => {
                tx.commit().await?;
                return Err(error.into());
            }
            Redemption::Accepted => {}
        }

        let user = tx.user().await?.ok_or_else(|| {
            tracing::warn!(
                email = %masked,
                event = "password_reset_missing_user",
                "Reset code accepted but account no longer exists"
            );
            DomainError::Auth(AuthError::InvalidOrExpiredCode)
        })?;

        tx.set_user_password(user.id, &hash, now).await?;
        tx.commit().await?;

        tracing::info!(
            email = %masked,
            user_id = %user.id,
            event = "password_reset_completed",
            "Password replaced using reset code"
        );
        Ok(())
    }

    /// Attempt guard and code check, staged on `tx`
    async fn redeem(
        &self,
        tx: &mut dyn VerificationTransaction,
        email: &str,
        submitted: &str,
        purpose: CodePurpose,
        now: DateTime<Utc>,
    ) -> DomainResult<Redemption> {
        let masked = mask_email(email);
        let mut attempts = tx.attempt_meta().await?;

        if let LockStatus::Locked { until } = self.attempt_guard.check_lock(&attempts, now) {
            let retry_after_seconds = (until - now).num_seconds().max(1);
            tracing::warn!(
                email = %masked,
                purpose = %purpose,
                locked_until = %until,
                event = "verification_locked",
                "Verification attempt rejected while locked"
            );
            return Ok(Redemption::Rejected(AuthError::TooManyAttempts { retry_after_seconds }));
        }

        let latest = tx.latest_code(purpose).await?;
        let accepted = match latest {
            Some(record) if record.accepts(submitted.trim(), now) => Some(record),
            _ => None,
        };

        let Some(record) = accepted else {
            let locked_until = self.attempt_guard.record_failure(&mut attempts, now);
            tx.put_attempt_meta(&attempts).await?;

            match locked_until {
                Some(until) => tracing::warn!(
                    email = %masked,
                    purpose = %purpose,
                    locked_until = %until,
                    event = "account_locked",
                    "Verification locked after repeated failures"
                ),
                None => tracing::warn!(
                    email = %masked,
                    purpose = %purpose,
                    remaining_attempts = self.attempt_guard.remaining_attempts(&attempts),
                    event = "otp_verification_failed",
                    "Invalid or expired verification code"
                ),
            }
            return Ok(Redemption::Rejected(AuthError::InvalidOrExpiredCode));
        };

        tx.mark_used(record.id, now).await?;
        if attempts != AttemptMeta::default() {
            self.attempt_guard.reset(&mut attempts);
            tx.put_attempt_meta(&attempts).await?;
        }
        Ok(Redemption::Accepted)
    }
}

/// Trim, lower-case and syntax-check an email
fn normalize_checked(email: &str) -> DomainResult<String> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "email".to_string(),
        }
        .into());
    }
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail.into());
    }
    Ok(email)
}
