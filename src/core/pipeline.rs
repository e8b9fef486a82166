use crate::core::rows::process_row;
use crate::core::semantic::{self, build_scorer};
use crate::core::{
    rouge, ConfigProvider, EvaluationInput, EvaluationSummary, FileReport, Pipeline,
    SemanticScorer, Storage,
};
use crate::domain::model::{EvaluationRow, PairDetail, RougeScores, ScoredPair};
use crate::utils::error::{EvalError, Result};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::{FileOptions, ZipWriter};

const SUMMARY_HEADER: [&str; 10] = [
    "file",
    "rows",
    "matched",
    "unmatched",
    "accuracy",
    "rouge1",
    "rouge2",
    "rougeL",
    "rougeLsum",
    "semantic_f1",
];

/// Regular `.csv` files directly under `directory`, sorted by path.
pub fn collect_csv_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        let is_csv = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(".csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_rows(path: &Path) -> Result<Vec<EvaluationRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// The console line printed for each evaluated file.
pub fn format_report_line(report: &FileReport) -> String {
    match (report.accuracy, report.rouge) {
        (Some(accuracy), Some(rouge)) => {
            let semantic = report
                .semantic_f1
                .map(|f1| format!("{:.4}", f1))
                .unwrap_or_else(|| "n/a".to_string());
            format!(
                "{} Format Following Accuracy: {:.2}% ROUGE: {} BERTScore: {}",
                report.file, accuracy, rouge, semantic
            )
        }
        _ => format!("{}: No rows to evaluate.", report.file),
    }
}

fn summary_record(report: &FileReport) -> Vec<String> {
    let fmt = |value: Option<f64>| value.map(|v| format!("{:.6}", v)).unwrap_or_default();
    vec![
        report.file.clone(),
        report.rows.to_string(),
        report.matched.to_string(),
        report.unmatched.to_string(),
        fmt(report.accuracy),
        fmt(report.rouge.map(|r| r.rouge1)),
        fmt(report.rouge.map(|r| r.rouge2)),
        fmt(report.rouge.map(|r| r.rouge_l)),
        fmt(report.rouge.map(|r| r.rouge_lsum)),
        fmt(report.semantic_f1),
    ]
}

fn render_summary(reports: &[FileReport], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(SUMMARY_HEADER)?;
    for report in reports {
        writer.write_record(summary_record(report))?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

struct ScoredRows {
    matched: usize,
    unmatched: usize,
    pairs: Vec<ScoredPair>,
    rouge: Vec<RougeScores>,
}

/// Row processing plus per-pair ROUGE for one file. CPU bound.
fn score_rows(rows: &[EvaluationRow]) -> Result<ScoredRows> {
    let mut scored = ScoredRows {
        matched: 0,
        unmatched: 0,
        pairs: Vec::new(),
        rouge: Vec::new(),
    };
    for (index, row) in rows.iter().enumerate() {
        let outcome = process_row(index, row)?;
        if outcome.parsed {
            scored.matched += 1;
        } else {
            scored.unmatched += 1;
        }
        scored.pairs.extend(outcome.pairs);
    }
    scored.rouge = scored
        .pairs
        .iter()
        .map(|pair| rouge::score(&pair.prediction, &pair.reference))
        .collect();
    Ok(scored)
}

pub struct EvaluationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    scorer: Box<dyn SemanticScorer>,
}

impl<S: Storage, C: ConfigProvider> EvaluationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let scorer = build_scorer(&config);
        Self {
            storage,
            config,
            scorer,
        }
    }

    pub fn with_scorer(storage: S, config: C, scorer: Box<dyn SemanticScorer>) -> Self {
        Self {
            storage,
            config,
            scorer,
        }
    }

    /// 評估單一檔案的所有列
    ///
    /// Cleaning and ROUGE run on the blocking pool so that files buffered by
    /// `transform` are scored in parallel, not only while awaiting the scorer.
    pub async fn evaluate_input(&self, input: EvaluationInput) -> Result<FileReport> {
        let mut report = FileReport::empty(input.file);
        report.rows = input.rows.len();

        let rows = input.rows;
        let scored = tokio::task::spawn_blocking(move || score_rows(&rows))
            .await
            .map_err(|e| EvalError::ProcessingError {
                message: format!("{}: scoring task failed: {}", report.file, e),
            })??;
        report.matched = scored.matched;
        report.unmatched = scored.unmatched;

        if !report.has_rows() {
            tracing::warn!("{}: No rows to evaluate.", report.file);
            return Ok(report);
        }

        let predictions: Vec<String> = scored.pairs.iter().map(|p| p.prediction.clone()).collect();
        let references: Vec<String> = scored.pairs.iter().map(|p| p.reference.clone()).collect();
        let semantic_scores = self.scorer.score(&predictions, &references).await?;

        report.accuracy =
            Some(100.0 * report.matched as f64 / (report.matched + report.unmatched) as f64);
        report.rouge = Some(rouge::aggregate(&scored.rouge));
        report.semantic_f1 = semantic_scores.as_deref().map(semantic::average);
        report.pairs = scored
            .pairs
            .into_iter()
            .zip(scored.rouge)
            .map(|(pair, rouge)| PairDetail {
                file: report.file.clone(),
                pair,
                rouge,
            })
            .collect();

        tracing::debug!(
            "{}: {} matched, {} unmatched, {} pairs",
            report.file,
            report.matched,
            report.unmatched,
            report.pairs.len()
        );
        Ok(report)
    }

    fn build_archive(&self, result: &EvaluationSummary) -> Result<Vec<u8>> {
        let pairs: Vec<&PairDetail> = result.reports.iter().flat_map(|r| &r.pairs).collect();

        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>("summary.csv", FileOptions::default())?;
        zip.write_all(render_summary(&result.reports, b',')?.as_bytes())?;

        zip.start_file::<_, ()>("summary.tsv", FileOptions::default())?;
        zip.write_all(render_summary(&result.reports, b'\t')?.as_bytes())?;

        if !pairs.is_empty() {
            zip.start_file::<_, ()>("pairs.json", FileOptions::default())?;
            let json_data = serde_json::to_string_pretty(&pairs)?;
            zip.write_all(json_data.as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for EvaluationPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<EvaluationInput>> {
        let directory = Path::new(self.config.directory());
        tracing::debug!("Collecting CSV files from: {}", directory.display());

        let files = collect_csv_files(directory)?;
        if files.is_empty() {
            tracing::warn!("No CSV files found in {}", directory.display());
        }

        let mut inputs = Vec::with_capacity(files.len());
        for path in files {
            let rows = read_rows(&path)?;
            tracing::debug!("Read {} rows from {}", rows.len(), path.display());
            inputs.push(EvaluationInput {
                file: path.display().to_string(),
                rows,
            });
        }

        Ok(inputs)
    }

    async fn transform(&self, data: Vec<EvaluationInput>) -> Result<EvaluationSummary> {
        let concurrency = self.config.concurrent_files().max(1);
        tracing::info!(
            "🔧 Evaluating {} files ({} at a time)",
            data.len(),
            concurrency
        );

        let results: Vec<Result<FileReport>> = stream::iter(data)
            .map(|input| self.evaluate_input(input))
            .buffered(concurrency)
            .collect()
            .await;

        let reports = results.into_iter().collect::<Result<Vec<_>>>()?;

        Ok(EvaluationSummary {
            reports,
            generated_at: chrono::Utc::now(),
        })
    }

    async fn load(&self, result: &EvaluationSummary) -> Result<Option<String>> {
        if !self.config.write_archive() {
            tracing::debug!("Report archive disabled");
            return Ok(None);
        }

        let filename = self.config.archive_filename();
        let output_path = format!("{}/{}", self.config.output_path(), filename);

        let zip_data = self.build_archive(result)?;
        tracing::debug!("Writing report archive ({} bytes) to storage", zip_data.len());
        self.storage.write_file(filename, &zip_data).await?;

        Ok(Some(output_path))
    }
}
