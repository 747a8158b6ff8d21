//! Delivery through an external mail microservice over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use takip_core::services::verification::{CodeMessage, Mailer};

use crate::InfrastructureError;

/// JSON body accepted by the relay's `/send-verification` endpoint
#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    email: &'a str,
    code: &'a str,
    purpose: &'a str,
}

/// Mailer that hands codes to a relay service
pub struct HttpMailRelay {
    client: Client,
    endpoint: String,
}

impl HttpMailRelay {
    /// `base_url` is the relay root, e.g. `http://localhost:5001`
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/send-verification", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Mailer for HttpMailRelay {
    async fn send_code(&self, message: &CodeMessage) -> Result<(), String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayRequest {
                email: &message.email,
                code: &message.code,
                purpose: message.purpose.as_str(),
            })
            .send()
            .await
            .map_err(|e| format!("Mail relay request failed: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!(
                "Mail relay responded with status: {}",
                response.status()
            ))
        }
    }

    fn name(&self) -> &'static str {
        "http-relay"
    }
}
