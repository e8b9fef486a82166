use crate::domain::ports::{ConfigProvider, SemanticScorer};
use crate::utils::error::{EvalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL_TYPE: &str = "microsoft/deberta-xlarge-mnli";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    model_type: &'a str,
    predictions: &'a [String],
    references: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    f1: Vec<f64>,
}

/// Delegates BERTScore-style scoring to an HTTP service.
///
/// The service receives `{"model_type", "predictions", "references"}` and
/// answers `{"f1": [...]}` with one value per pair.
pub struct HttpSemanticScorer {
    client: Client,
    endpoint: String,
    model_type: String,
    timeout: Duration,
}

impl HttpSemanticScorer {
    pub fn new(endpoint: String, model_type: String, timeout_seconds: u64) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model_type,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait]
impl SemanticScorer for HttpSemanticScorer {
    async fn score(
        &self,
        predictions: &[String],
        references: &[String],
    ) -> Result<Option<Vec<f64>>> {
        if predictions.is_empty() {
            return Ok(Some(Vec::new()));
        }

        tracing::debug!(
            "Requesting semantic scores for {} pairs from {}",
            predictions.len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&ScoreRequest {
                model_type: &self.model_type,
                predictions,
                references,
            })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Scorer response status: {}", status);
        if !status.is_success() {
            return Err(EvalError::ScorerError {
                message: format!("{} returned HTTP {}", self.endpoint, status),
            });
        }

        let body: ScoreResponse = response.json().await?;
        if body.f1.len() != predictions.len() {
            return Err(EvalError::ScorerError {
                message: format!(
                    "expected {} scores, got {}",
                    predictions.len(),
                    body.f1.len()
                ),
            });
        }

        Ok(Some(body.f1))
    }
}

/// Used when no scorer endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSemanticScorer;

#[async_trait]
impl SemanticScorer for NoopSemanticScorer {
    async fn score(
        &self,
        _predictions: &[String],
        _references: &[String],
    ) -> Result<Option<Vec<f64>>> {
        Ok(None)
    }
}

/// HTTP scorer when an endpoint is configured, otherwise the no-op scorer.
pub fn build_scorer<C: ConfigProvider>(config: &C) -> Box<dyn SemanticScorer> {
    match config.scorer_endpoint() {
        Some(endpoint) => {
            tracing::info!("🧠 Semantic scoring via {} ({})", endpoint, config.model_type());
            Box::new(HttpSemanticScorer::new(
                endpoint.to_string(),
                config.model_type().to_string(),
                config.scorer_timeout_seconds(),
            ))
        }
        None => {
            tracing::info!("Semantic scorer not configured, BERTScore will be reported as n/a");
            Box::new(NoopSemanticScorer)
        }
    }
}

pub fn average(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}
