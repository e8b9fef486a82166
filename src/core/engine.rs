use crate::core::{EvaluationSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug)]
pub struct EvaluationRun {
    pub summary: EvaluationSummary,
    pub output_path: Option<String>,
}

pub struct EvalEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EvalEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<EvaluationRun> {
        tracing::info!("Starting evaluation...");
        self.monitor.log_stats("Start");

        // Extract
        let inputs = self.pipeline.extract().await?;
        let total_rows: usize = inputs.iter().map(|i| i.rows.len()).sum();
        tracing::info!("📥 Read {} files ({} rows)", inputs.len(), total_rows);
        self.monitor.log_stats("Extract");

        // Transform
        let summary = self.pipeline.transform(inputs).await?;
        tracing::info!("🔧 Evaluated {} files", summary.reports.len());
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(&summary).await?;
        if let Some(path) = &output_path {
            tracing::info!("📁 Report saved to: {}", path);
        }
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(EvaluationRun {
            summary,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EvaluationInput, FileReport};
    use crate::utils::error::EvalError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockPipeline {
        fail_transform: bool,
        loaded: AtomicBool,
    }

    impl MockPipeline {
        fn new(fail_transform: bool) -> Self {
            Self {
                fail_transform,
                loaded: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        async fn extract(&self) -> Result<Vec<EvaluationInput>> {
            Ok(vec![EvaluationInput {
                file: "mock.csv".to_string(),
                rows: vec![],
            }])
        }

        async fn transform(&self, data: Vec<EvaluationInput>) -> Result<EvaluationSummary> {
            if self.fail_transform {
                return Err(EvalError::ProcessingError {
                    message: "boom".to_string(),
                });
            }
            Ok(EvaluationSummary {
                reports: data.into_iter().map(|i| FileReport::empty(i.file)).collect(),
                generated_at: chrono::Utc::now(),
            })
        }

        async fn load(&self, _result: &EvaluationSummary) -> Result<Option<String>> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok(Some("mock/evaluation_report.zip".to_string()))
        }
    }

    #[tokio::test]
    async fn test_run_executes_all_phases() {
        let engine = EvalEngine::new(MockPipeline::new(false));
        let run = engine.run().await.unwrap();

        assert_eq!(run.summary.reports.len(), 1);
        assert_eq!(run.output_path.as_deref(), Some("mock/evaluation_report.zip"));
        assert!(engine.pipeline.loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_stops_on_transform_error() {
        let engine = EvalEngine::new(MockPipeline::new(true));
        assert!(engine.run().await.is_err());
        assert!(!engine.pipeline.loaded.load(Ordering::SeqCst));
    }
}
