// Safety checker client - talks to the remote image classification service.
//
// Wire format:
// - request:  POST { "image": "<base64>" }
// - response: { "concept_scores": [<one float per category>] }
//
// The endpoint differs per deployment, so it is injected from validated
// configuration rather than baked in here.

use crate::core::censor::{CensorError, SafetyClassifier};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Request body for the classification endpoint.
#[derive(Debug, Serialize)]
struct SafetyCheckRequest<'a> {
    /// The base64-encoded image data.
    image: &'a str,
}

/// Response body from the classification endpoint.
///
/// `concept_scores` is optional so a malformed answer surfaces as a typed
/// error instead of a deserialization failure with no context.
#[derive(Debug, Deserialize)]
struct SafetyCheckResponse {
    concept_scores: Option<Vec<f64>>,
}

/// Client for the safety checker service.
pub struct SafetyCheckerClient {
    client: Client,
    endpoint: String,
}

impl SafetyCheckerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SafetyClassifier for SafetyCheckerClient {
    /// One POST per image, no retries. Non-2xx and missing-field responses
    /// are errors; the caller decides what failure means (it fails open).
    async fn concept_scores(&self, image_base64: &str) -> Result<Vec<f64>, CensorError> {
        let request = SafetyCheckRequest {
            image: image_base64,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| CensorError::Classify(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CensorError::Classify(format!("{} - {}", status, body)));
        }

        let parsed: SafetyCheckResponse = response
            .json()
            .await
            .map_err(|e| CensorError::Classify(e.to_string()))?;

        parsed.concept_scores.ok_or(CensorError::MissingScores)
    }
}

// ============================================================================
// TESTS
// ============================================================================
