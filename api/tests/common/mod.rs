//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

/// POST a JSON body and return `(status, retry_after, body)`
macro_rules! call {
    ($app:expr, $path:expr, $body:tt) => {
        $crate::common::read(
            actix_web::test::call_service(
                &$app,
                $crate::common::post($path, serde_json::json!($body)).to_request(),
            )
            .await,
        )
        .await
    };
}

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use takip_api::AppState;
use takip_core::repositories::InMemoryStore;
use takip_core::services::verification::{CodeGenerator, CodeMessage, Mailer};
use takip_core::services::{
    ManualClock, PasswordPolicy, PreAuthTokenIssuer, RegistrationService, VerificationService,
    VerificationServiceConfig,
};
use takip_shared::config::PreAuthConfig;

pub const SECRET: &str = "integration-test-secret";

/// Mailer that keeps every message in memory
#[derive(Clone, Default)]
pub struct InboxMailer {
    pub sent: Arc<Mutex<Vec<CodeMessage>>>,
}

#[async_trait]
impl Mailer for InboxMailer {
    async fn send_code(&self, message: &CodeMessage) -> Result<(), String> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "inbox"
    }
}

/// Hands out the given codes in order, then repeats the last one
pub struct ScriptedCodes(Mutex<VecDeque<String>>);

impl ScriptedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self(Mutex::new(codes.iter().map(|c| c.to_string()).collect()))
    }
}

impl CodeGenerator for ScriptedCodes {
    fn generate(&self) -> String {
        let mut codes = self.0.lock().unwrap();
        if codes.len() > 1 {
            codes.pop_front().unwrap()
        } else {
            codes.front().cloned().unwrap_or_else(|| "000000".to_string())
        }
    }
}

pub struct TestContext {
    pub clock: ManualClock,
    pub store: Arc<InMemoryStore>,
    pub mailer: InboxMailer,
    pub state: web::Data<AppState<InMemoryStore, InMemoryStore>>,
}

pub fn context(codes: &[&str]) -> TestContext {
    context_with(VerificationServiceConfig::default(), codes)
}

pub fn context_with(config: VerificationServiceConfig, codes: &[&str]) -> TestContext {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
    let store = Arc::new(InMemoryStore::new());
    let mailer = InboxMailer::default();
    let pre_auth = Arc::new(PreAuthTokenIssuer::new(
        &PreAuthConfig::new(SECRET),
        Arc::new(clock.clone()),
    ));
    let policy = PasswordPolicy::new(8, 4);

    let verification = VerificationService::new(
        store.clone(),
        Arc::new(mailer.clone()),
        Arc::new(clock.clone()),
        pre_auth.clone(),
        policy.clone(),
        config,
    )
    .with_code_generator(Arc::new(ScriptedCodes::new(codes)));
    let registration =
        RegistrationService::new(store.clone(), pre_auth, policy, Arc::new(clock.clone()));

    let state = web::Data::new(AppState::new(
        Arc::new(verification),
        Arc::new(registration),
        "memory",
    ));

    TestContext {
        clock,
        store,
        mailer,
        state,
    }
}

pub fn post(path: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(path).set_json(body)
}

/// Status, `Retry-After` header and JSON body of a response
pub async fn read<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Option<String>, Value) {
    let status = resp.status();
    let retry_after = resp
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body: Value = test::read_body_json(resp).await;
    (status, retry_after, body)
}
