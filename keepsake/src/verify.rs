use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::VerificationConfig;
use crate::error::{KeepsakeError, Result};

#[derive(Debug, Deserialize)]
struct VerifyOutcome {
    success: bool,
}

/// Server-side anti-bot token verification.
///
/// When no secret is configured, verification passes open. This is
/// intentional: local and staging environments run without the secret.
#[derive(Clone, Debug)]
pub struct VerificationClient {
    client: Client,
    secret: Option<String>,
    verify_url: String,
}

impl VerificationClient {
    pub fn new(config: &VerificationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                KeepsakeError::Verification(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            secret: config.secret.clone(),
            verify_url: config.verify_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Check a client-submitted token. `Ok(false)` is a definitive
    /// rejection; an unreachable or erroring verifier is an error, not a
    /// rejection.
    pub async fn verify(&self, token: &str) -> Result<bool> {
        let Some(secret) = self.secret.as_deref() else {
            tracing::debug!("No verification secret configured, passing open");
            return Ok(true);
        };

        if token.trim().is_empty() {
            return Ok(false);
        }

        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(KeepsakeError::Verification(format!(
                "Verifier returned {}",
                response.status()
            )));
        }

        let outcome: VerifyOutcome = response.json().await?;
        Ok(outcome.success)
    }
}
