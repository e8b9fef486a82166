pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{toml_config::TomlConfig, LocalStorage};

pub use core::{
    engine::{EvalEngine, EvaluationRun},
    pipeline::EvaluationPipeline,
};
pub use utils::error::{EvalError, Result};
