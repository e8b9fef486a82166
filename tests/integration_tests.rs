use mq_eval::core::pipeline::format_report_line;
use mq_eval::{CliConfig, EvalEngine, EvalError, EvaluationPipeline, LocalStorage};
use std::path::Path;
use tempfile::TempDir;

fn write_csv(path: &Path, rows: &[(&str, &str)]) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(["id", "reference", "summary"]).unwrap();
    for (index, &(reference, summary)) in rows.iter().enumerate() {
        writer
            .write_record([index.to_string().as_str(), reference, summary])
            .unwrap();
    }
    writer.flush().unwrap();
}

fn cli_config(directory: &Path, output: &Path) -> CliConfig {
    CliConfig {
        directory: directory.to_str().unwrap().to_string(),
        output_path: output.to_str().unwrap().to_string(),
        concurrent_files: 2,
        scorer_endpoint: None,
        model_type: "microsoft/deberta-xlarge-mnli".to_string(),
        scorer_timeout_seconds: 30,
        no_archive: false,
        verbose: false,
        monitor: false,
        log_json: false,
    }
}

const REFERENCE: &str = r#"[
    {"query": "What did the team decide about the remote control?", "summary": "The team decided to use a rubber case and a simple button layout."},
    {"query": "Who presented the market research?", "summary": "The marketing expert presented the market research findings."}
]"#;

#[tokio::test]
async fn test_end_to_end_evaluation() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    write_csv(
        &input_dir.path().join("multi_query.csv"),
        &[
            (
                REFERENCE,
                r#"<s>[INST] Answer each query about the meeting. [/INST] Here are the answers:
```json
[
  {"query": "What did the team decide about the remote control?", "summary": "The team decided to use a rubber case and a simple button layout."}
  {"query": "Who presented the market research?", "summary": "The marketing expert presented findings."}
]
```"#,
            ),
            (REFERENCE, "I am sorry, the transcript is too long to summarize."),
        ],
    );
    write_csv(&input_dir.path().join("empty.csv"), &[]);
    std::fs::write(input_dir.path().join("README.txt"), "not evaluated").unwrap();

    let config = cli_config(input_dir.path(), output_dir.path());
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = EvaluationPipeline::new(storage, config);
    let engine = EvalEngine::new_with_monitoring(pipeline, false);

    let run = engine.run().await.unwrap();

    assert_eq!(run.summary.reports.len(), 2);
    let empty = &run.summary.reports[0];
    assert!(empty.file.ends_with("empty.csv"));
    assert!(format_report_line(empty).ends_with("No rows to evaluate."));

    let report = &run.summary.reports[1];
    assert!(report.file.ends_with("multi_query.csv"));
    assert_eq!(report.rows, 2);
    assert_eq!(report.matched, 1);
    assert_eq!(report.unmatched, 1);
    assert_eq!(report.accuracy, Some(50.0));
    assert_eq!(report.pairs.len(), 4);
    assert!(report.semantic_f1.is_none());

    let rouge = report.rouge.unwrap();
    assert!(rouge.rouge1 > 0.25 && rouge.rouge1 < 0.5);
    assert!(rouge.rouge_l <= rouge.rouge1);

    let line = format_report_line(report);
    assert!(line.contains("Format Following Accuracy: 50.00%"));
    assert!(line.ends_with("BERTScore: n/a"));

    let output_file = run.output_path.unwrap();
    assert!(output_file.ends_with("evaluation_report.zip"));
    let full_path = output_dir.path().join("evaluation_report.zip");
    assert!(full_path.exists());

    let zip_data = std::fs::read(&full_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 3);

    let mut tsv_file = archive.by_name("summary.tsv").unwrap();
    let mut tsv_content = String::new();
    std::io::Read::read_to_string(&mut tsv_file, &mut tsv_content).unwrap();
    assert!(tsv_content.starts_with("file\trows\tmatched\tunmatched\taccuracy"));
    assert_eq!(tsv_content.lines().count(), 3);
}

#[tokio::test]
async fn test_end_to_end_with_invalid_reference() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_csv(
        &input_dir.path().join("broken.csv"),
        &[("{\"query\": \"not an array\"}", "[]")],
    );

    let config = cli_config(input_dir.path(), output_dir.path());
    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EvalEngine::new(EvaluationPipeline::new(storage, config));

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EvalError::ReferenceError { row: 0, .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(!output_dir.path().join("evaluation_report.zip").exists());
}

#[tokio::test]
async fn test_end_to_end_without_archive() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_csv(
        &input_dir.path().join("run.csv"),
        &[(
            REFERENCE,
            r#"[{"query": "remote control decision", "summary": "A rubber case was chosen."}]"#,
        )],
    );

    let mut config = cli_config(input_dir.path(), output_dir.path());
    config.no_archive = true;
    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EvalEngine::new(EvaluationPipeline::new(storage, config));

    let run = engine.run().await.unwrap();
    assert!(run.output_path.is_none());
    assert_eq!(run.summary.reports[0].matched, 1);
    assert_eq!(run.summary.reports[0].pairs[1].pair.prediction, "");
    assert!(!output_dir.path().join("evaluation_report.zip").exists());
}

#[tokio::test]
async fn test_missing_input_directory_is_io_error() {
    let output_dir = TempDir::new().unwrap();
    let config = cli_config(Path::new("/nonexistent/mq-eval-input"), output_dir.path());
    let storage = LocalStorage::new(config.output_path.clone());
    let engine = EvalEngine::new(EvaluationPipeline::new(storage, config));

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, EvalError::IoError(_)));
    assert_eq!(err.exit_code(), 3);
}
