use clap::Parser;
use mq_eval::core::pipeline::{collect_csv_files, format_report_line};
use mq_eval::core::ConfigProvider;
use mq_eval::utils::{logger, validation::Validate};
use mq_eval::{EvalEngine, EvaluationPipeline, LocalStorage, TomlConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-eval")]
#[command(about = "Evaluate multi-query LLM outputs using a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "eval-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - list the files that would be evaluated
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 先讀配置，才知道日誌格式
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_logger(args.verbose, config.log_json());
    tracing::info!("🚀 Starting TOML-based evaluation '{}'", config.name());
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No evaluation will occur");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = EvaluationPipeline::new(storage, config);
    let engine = EvalEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            for report in &run.summary.reports {
                println!("{}", format_report_line(report));
            }
            if let Some(path) = run.output_path {
                println!("📁 Report saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Evaluation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Evaluation: {}", config.name());
    println!("  Input directory: {}", config.directory());
    println!("  Concurrent files: {}", config.concurrent_files());
    println!(
        "  Semantic scorer: {}",
        config.scorer_endpoint().unwrap_or("not configured")
    );
    println!("  Model type: {}", config.model_type());

    if config.write_archive() {
        println!(
            "  Report: {}/{}",
            config.output_path(),
            config.archive_filename()
        );
    } else {
        println!("  Report: console only");
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> mq_eval::Result<()> {
    println!("🔍 Dry Run Analysis:");

    let files = collect_csv_files(Path::new(config.directory()))?;
    if files.is_empty() {
        println!("  No CSV files found in {}", config.directory());
    }
    for file in &files {
        println!("  📄 {}", file.display());
    }

    println!();
    println!(
        "✅ {} files would be evaluated. Use --verbose for more details during actual run.",
        files.len()
    );
    Ok(())
}
