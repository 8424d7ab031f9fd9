use clap::Parser;
use user_etl::core::charts::{
    AGE_HISTOGRAM_FILENAME, AGE_RANGE_BARS_FILENAME, COUNTRY_BARS_FILENAME,
};
use user_etl::core::report::{CLEAN_FILENAME, RAW_FILENAME, STATISTICS_FILENAME};
use user_etl::core::ConfigProvider;
use user_etl::utils::{logger, validation::Validate};
use user_etl::{EtlEngine, LocalStorage, TomlConfig, UserPipeline};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "User ETL driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "etl-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines instead of the compact format
    #[arg(long)]
    json_logs: bool,

    /// Override the seed from the config file
    #[arg(long)]
    seed: Option<String>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 載入 TOML 配置（日誌尚未初始化，錯誤直接輸出）
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌：命令列 > 設定檔 > 預設
    match (args.json_logs, config.log_level(), args.verbose) {
        (true, _, verbose) => logger::init_json_logger(verbose),
        (false, Some(level), false) => logger::init_cli_logger_with_level(level),
        (false, _, verbose) => logger::init_cli_logger(verbose),
    }

    tracing::info!("🚀 Starting TOML-based user ETL");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(seed) = args.seed.clone() {
        tracing::info!("🔧 Seed overridden to: {}", seed);
        config.source.seed = seed;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, args.dry_run);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be sent");
        perform_dry_run(&config);
        return;
    }

    let output_path = config.output_path().to_string();
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = UserPipeline::new(storage, config);
    let engine = EtlEngine::new(pipeline, output_path);

    match engine.run().await {
        Ok(report) => {
            tracing::info!(
                "✅ ETL process completed: {} of {} outputs written",
                report.artifacts.len() - report.failures().count(),
                report.artifacts.len()
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}

fn display_config_summary(config: &TomlConfig, dry_run: bool) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Source: {}", config.api_endpoint());
    println!("  Output: {}", config.output_path());
    println!("  Results: {} (seed {})", config.results(), config.seed());

    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Data Source:");
    println!(
        "  GET {}?results={}&seed={}&format={}",
        config.api_endpoint(),
        config.results(),
        config.seed(),
        config.format()
    );
    let headers = config.headers();
    if !headers.is_empty() {
        println!("  Headers: {} custom headers", headers.len());
    }
    match config.timeout_seconds() {
        Some(timeout) => println!("  Timeout: {}s", timeout),
        None => println!("  Timeout: client default"),
    }

    println!();
    println!("💾 Outputs in {}:", config.output_path());
    println!("  {}", RAW_FILENAME);
    println!("  {}", CLEAN_FILENAME);
    if config.write_statistics() {
        println!("  {}", STATISTICS_FILENAME);
    }
    for chart in [
        AGE_HISTOGRAM_FILENAME,
        COUNTRY_BARS_FILENAME,
        AGE_RANGE_BARS_FILENAME,
    ] {
        println!("  {}", chart);
    }

    println!();
    println!("✅ Dry run analysis complete.");
}
