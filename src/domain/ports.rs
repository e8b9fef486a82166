use crate::domain::model::{EvaluationInput, EvaluationSummary};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn directory(&self) -> &str;
    fn output_path(&self) -> &str;
    fn concurrent_files(&self) -> usize;
    fn write_archive(&self) -> bool;
    fn archive_filename(&self) -> &str {
        "evaluation_report.zip"
    }
    fn scorer_endpoint(&self) -> Option<&str>;
    fn model_type(&self) -> &str;
    fn scorer_timeout_seconds(&self) -> u64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<EvaluationInput>>;
    async fn transform(&self, data: Vec<EvaluationInput>) -> Result<EvaluationSummary>;
    /// Persist the reports; returns where they were written, if anywhere.
    async fn load(&self, result: &EvaluationSummary) -> Result<Option<String>>;
}

/// Embedding-based similarity (BERTScore F1 or similar) for aligned pairs.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    /// One F1 per pair, or `None` when the scorer is not configured.
    async fn score(&self, predictions: &[String], references: &[String])
        -> Result<Option<Vec<f64>>>;
}
