use crate::core::semantic::{DEFAULT_MODEL_TYPE, DEFAULT_TIMEOUT_SECONDS};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "mq-eval")]
#[command(about = "Evaluate multi-query LLM summary outputs stored as CSV files")]
pub struct CliConfig {
    /// Directory holding the CSV files to evaluate
    #[arg(long, default_value = "outputs")]
    pub directory: String,

    #[arg(long, default_value = "./reports")]
    pub output_path: String,

    #[arg(long, default_value_t = 4)]
    pub concurrent_files: usize,

    /// HTTP endpoint of a BERTScore-compatible scoring service
    #[arg(long)]
    pub scorer_endpoint: Option<String>,

    #[arg(long, default_value = DEFAULT_MODEL_TYPE)]
    pub model_type: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub scorer_timeout_seconds: u64,

    /// Only print results, do not write the report archive
    #[arg(long)]
    pub no_archive: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn directory(&self) -> &str {
        &self.directory
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn concurrent_files(&self) -> usize {
        self.concurrent_files
    }

    fn write_archive(&self) -> bool {
        !self.no_archive
    }

    fn scorer_endpoint(&self) -> Option<&str> {
        self.scorer_endpoint.as_deref()
    }

    fn model_type(&self) -> &str {
        &self.model_type
    }

    fn scorer_timeout_seconds(&self) -> u64 {
        self.scorer_timeout_seconds
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_directory("directory", &self.directory)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("concurrent_files", self.concurrent_files, 1)?;
        if let Some(endpoint) = &self.scorer_endpoint {
            validation::validate_url("scorer_endpoint", endpoint)?;
        }
        validation::validate_non_empty_string("model_type", &self.model_type)?;
        validation::validate_range("scorer_timeout_seconds", self.scorer_timeout_seconds, 1, 3600)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["mq-eval"]);
        assert_eq!(config.directory, "outputs");
        assert_eq!(config.output_path, "./reports");
        assert_eq!(config.concurrent_files, 4);
        assert_eq!(config.model_type, DEFAULT_MODEL_TYPE);
        assert!(config.write_archive());
        assert!(config.scorer_endpoint().is_none());
    }

    #[test]
    fn test_validation_rejects_bad_scorer_endpoint() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CliConfig::parse_from([
            "mq-eval",
            "--directory",
            dir.path().to_str().unwrap(),
            "--scorer-endpoint",
            "not a url",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_existing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = CliConfig::parse_from([
            "mq-eval",
            "--directory",
            dir.path().to_str().unwrap(),
            "--scorer-endpoint",
            "http://localhost:8000/score",
            "--no-archive",
        ]);
        assert!(config.validate().is_ok());
        assert!(!config.write_archive());
    }
}
