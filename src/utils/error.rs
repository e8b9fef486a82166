use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Scorer request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Row {row}: invalid reference column: {message}")]
    ReferenceError { row: usize, message: String },

    #[error("Semantic scorer error: {message}")]
    ScorerError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EvalError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EvalError::ConfigError { .. }
            | EvalError::MissingConfigError { .. }
            | EvalError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EvalError::CsvError(_) | EvalError::ReferenceError { .. } => ErrorCategory::Input,
            EvalError::ApiError(_) | EvalError::ScorerError { .. } => ErrorCategory::Network,
            EvalError::IoError(_) | EvalError::ZipError(_) => ErrorCategory::Storage,
            EvalError::SerializationError(_) | EvalError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EvalError::ConfigError { .. }
            | EvalError::MissingConfigError { .. }
            | EvalError::InvalidConfigValueError { .. } => {
                "Check the command line flags or the TOML configuration file"
            }
            EvalError::CsvError(_) => {
                "Make sure every CSV file has a header row with 'reference' and 'summary' columns"
            }
            EvalError::ReferenceError { .. } => {
                "The 'reference' column must be a JSON array of {\"query\", \"summary\"} objects"
            }
            EvalError::ApiError(_) | EvalError::ScorerError { .. } => {
                "Check that the semantic scorer endpoint is reachable, or run without --scorer-endpoint"
            }
            EvalError::IoError(_) | EvalError::ZipError(_) => {
                "Check that the input directory exists and the output path is writable"
            }
            EvalError::SerializationError(_) | EvalError::ProcessingError { .. } => {
                "Re-run with --verbose to see which file failed"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read evaluation input: {}", self),
            ErrorCategory::Network => format!("Semantic scoring failed: {}", self),
            ErrorCategory::Storage => format!("File system error: {}", self),
            ErrorCategory::Processing => format!("Evaluation failed: {}", self),
        }
    }

    /// 依嚴重程度決定 CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_error_is_input_category() {
        let err = EvalError::ReferenceError {
            row: 3,
            message: "expected array".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Row 3"));
    }

    #[test]
    fn test_scorer_error_maps_to_retry_exit_code() {
        let err = EvalError::ScorerError {
            message: "503".to_string(),
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_friendly_message().starts_with("Semantic scoring failed"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: EvalError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
