use clap::Parser;
use open_house_etl::adapters::render::renderer_for;
use open_house_etl::config::toml_config::{DashboardConfig, TomlConfig};
use open_house_etl::core::{ConfigProvider, Pipeline, TransformResult};
use open_house_etl::utils::{logger, validation::Validate};
use open_house_etl::{Dashboard, EtlEngine, LocalStorage, OpenHousePipeline};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Open house processing driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "open-house.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the dashboard setting from config
    #[arg(long)]
    dashboard: Option<bool>,

    /// Dry run - validate the configuration and input without writing output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // [environment] 需在初始化日誌前匯出，RUST_LOG 等變數才會生效
    config.apply_environment();

    // 初始化日誌
    let level = if args.verbose {
        "debug"
    } else {
        config.log_level().unwrap_or("info")
    };
    logger::init_logger(config.log_format(), level);

    tracing::info!("Loaded configuration from: {}", args.config);

    if let Some(enabled) = args.dashboard {
        let dashboard = config.dashboard.get_or_insert(DashboardConfig {
            enabled,
            format: None,
        });
        dashboard.enabled = enabled;
        tracing::info!("Dashboard overridden to: {}", enabled);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let storage = LocalStorage::default();
    let render_dashboard = config.dashboard_enabled();
    let format = config.dashboard_format();

    if args.dry_run {
        tracing::info!("DRY RUN MODE - no output will be written");
        perform_dry_run(storage, config).await;
        return;
    }

    let pipeline = OpenHousePipeline::new(storage.clone(), config);
    let engine = EtlEngine::new(pipeline);

    let summary = match engine.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(
                "Processing failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    println!(
        "✅ Cleaned {} of {} records",
        summary.report.cleaned_records, summary.report.raw_records
    );
    println!("📁 Output saved to: {}", summary.output_path);

    if render_dashboard {
        let dashboard = Dashboard::new(storage, summary.output_path);
        match dashboard.display(&renderer_for(format)).await {
            Ok(rendered) => println!("\n{}", rendered),
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(e.exit_code());
            }
        }
    }
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("Pipeline: {}", config.pipeline.name);
    if let Some(description) = &config.pipeline.description {
        tracing::info!("Description: {}", description);
    }
    tracing::info!("Input: {}", config.input_path());
    tracing::info!("Output: {}/{}", config.output_path(), config.output_filename());
    tracing::info!("Dashboard: {}", config.dashboard_enabled());
}

async fn perform_dry_run(storage: LocalStorage, config: TomlConfig) {
    let pipeline = OpenHousePipeline::new(storage, config);

    match extract_and_clean(&pipeline).await {
        Ok(result) => {
            println!(
                "Dry run: {} raw records would produce {} cleaned records ({} dropped)",
                result.report.raw_records,
                result.report.cleaned_records,
                result.report.dropped()
            );
            println!("Dry run: would write {}", pipeline.output_file());
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}

async fn extract_and_clean(
    pipeline: &OpenHousePipeline<LocalStorage, TomlConfig>,
) -> open_house_etl::Result<TransformResult> {
    let records = pipeline.extract().await?;
    pipeline.transform(records).await
}
