use clap::Parser;
use user_etl::utils::error::EtlError;
use user_etl::utils::{logger, validation::Validate};
use user_etl::{CliConfig, EtlEngine, LocalStorage, UserPipeline};

fn report_failure(stage: &str, e: &EtlError) -> ! {
    tracing::error!(
        "❌ {}: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting user-etl CLI");
    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置，失敗時不發出任何請求
    if let Err(e) = config.validate() {
        report_failure("Configuration validation failed", &e);
    }

    let output_path = config.output_path.clone();
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = UserPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline, output_path);

    match engine.run().await {
        Ok(report) => {
            let failures = report.failures().count();
            tracing::info!(
                "✅ ETL process completed: {} raw rows, {} clean rows, {}/{} outputs written",
                report.raw_rows,
                report.clean_rows,
                report.artifacts.len() - failures,
                report.artifacts.len()
            );
        }
        Err(e) => report_failure("ETL process failed", &e),
    }
}
