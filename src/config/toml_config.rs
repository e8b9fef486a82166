use crate::core::semantic::{DEFAULT_MODEL_TYPE, DEFAULT_TIMEOUT_SECONDS};
use crate::core::ConfigProvider;
use crate::utils::error::{EvalError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub evaluation: EvaluationConfig,
    pub scorer: Option<ScorerConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub name: Option<String>,
    pub directory: String,
    pub concurrent_files: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub endpoint: Option<String>,
    pub model_type: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub archive: Option<bool>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EvalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EvalError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SCORER_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn name(&self) -> &str {
        self.evaluation.name.as_deref().unwrap_or("evaluation")
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_json)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn directory(&self) -> &str {
        &self.evaluation.directory
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn concurrent_files(&self) -> usize {
        self.evaluation.concurrent_files.unwrap_or(4)
    }

    fn write_archive(&self) -> bool {
        self.output.archive.unwrap_or(true)
    }

    fn archive_filename(&self) -> &str {
        self.output
            .filename
            .as_deref()
            .unwrap_or("evaluation_report.zip")
    }

    fn scorer_endpoint(&self) -> Option<&str> {
        self.scorer.as_ref().and_then(|s| s.endpoint.as_deref())
    }

    fn model_type(&self) -> &str {
        self.scorer
            .as_ref()
            .and_then(|s| s.model_type.as_deref())
            .unwrap_or(DEFAULT_MODEL_TYPE)
    }

    fn scorer_timeout_seconds(&self) -> u64 {
        self.scorer
            .as_ref()
            .and_then(|s| s.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_directory("evaluation.directory", &self.evaluation.directory)?;
        validation::validate_path("output.path", &self.output.path)?;

        if let Some(concurrent) = self.evaluation.concurrent_files {
            validation::validate_positive_number("evaluation.concurrent_files", concurrent, 1)?;
        }

        // [scorer] 區段存在時必須有 endpoint
        if let Some(scorer) = &self.scorer {
            let endpoint =
                validation::validate_required_field("scorer.endpoint", &scorer.endpoint)?;
            validation::validate_url("scorer.endpoint", endpoint)?;
        }
        validation::validate_non_empty_string("scorer.model_type", self.model_type())?;
        validation::validate_range(
            "scorer.timeout_seconds",
            self.scorer_timeout_seconds(),
            1,
            3600,
        )?;

        let filename = self.archive_filename();
        if !filename.ends_with(".zip") {
            return Err(EvalError::InvalidConfigValueError {
                field: "output.filename".to_string(),
                value: filename.to_string(),
                reason: "Archive filename must end with .zip".to_string(),
            });
        }

        Ok(())
    }
}
