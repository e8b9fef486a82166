pub mod cleaner;
pub mod engine;
pub mod pipeline;
pub mod rouge;
pub mod rows;
pub mod semantic;

pub use crate::domain::model::{EvaluationInput, EvaluationSummary, FileReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SemanticScorer, Storage};
pub use crate::utils::error::Result;
