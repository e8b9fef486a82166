use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gold answer for one query batched into a multi-query instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReference {
    pub query: String,
    pub summary: String,
}

/// One row of an evaluation CSV. Other columns are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub reference: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub query: String,
    pub prediction: String,
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub parsed: bool,
    pub pairs: Vec<ScoredPair>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RougeScores {
    pub rouge1: f64,
    pub rouge2: f64,
    #[serde(rename = "rougeL")]
    pub rouge_l: f64,
    #[serde(rename = "rougeLsum")]
    pub rouge_lsum: f64,
}

impl std::fmt::Display for RougeScores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{'rouge1': {:.4}, 'rouge2': {:.4}, 'rougeL': {:.4}, 'rougeLsum': {:.4}}}",
            self.rouge1, self.rouge2, self.rouge_l, self.rouge_lsum
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairDetail {
    pub file: String,
    #[serde(flatten)]
    pub pair: ScoredPair,
    pub rouge: RougeScores,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub rows: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// None when the file has no rows.
    pub accuracy: Option<f64>,
    pub rouge: Option<RougeScores>,
    pub semantic_f1: Option<f64>,
    pub pairs: Vec<PairDetail>,
}

impl FileReport {
    pub fn empty(file: String) -> Self {
        Self {
            file,
            rows: 0,
            matched: 0,
            unmatched: 0,
            accuracy: None,
            rouge: None,
            semantic_f1: None,
            pairs: Vec::new(),
        }
    }

    pub fn has_rows(&self) -> bool {
        self.matched + self.unmatched > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub reports: Vec<FileReport>,
    pub generated_at: DateTime<Utc>,
}

/// Rows read from one CSV file, before scoring.
#[derive(Debug, Clone)]
pub struct EvaluationInput {
    pub file: String,
    pub rows: Vec<EvaluationRow>,
}
