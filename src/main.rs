use clap::Parser;
use open_house_etl::adapters::render::renderer_for;
use open_house_etl::utils::{logger, validation::Validate};
use open_house_etl::{CliConfig, Dashboard, EtlEngine, EtlError, LocalStorage, OpenHousePipeline};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting open-house-etl");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        report_failure(&e);
    }
}

async fn run(config: CliConfig) -> Result<(), EtlError> {
    let render_dashboard = config.dashboard;
    let format = config.format;

    let storage = LocalStorage::default();
    let pipeline = OpenHousePipeline::new(storage.clone(), config);
    let engine = EtlEngine::new(pipeline);

    let summary = engine.run().await?;
    println!(
        "Processed {} raw records into {} cleaned records ({} dropped, {} superseded duplicates).",
        summary.report.raw_records,
        summary.report.cleaned_records,
        summary.report.dropped(),
        summary.report.duplicates_superseded
    );
    println!("📁 Output saved to: {}", summary.output_path);

    if render_dashboard {
        let dashboard = Dashboard::new(storage, summary.output_path);
        let rendered = dashboard.display(&renderer_for(format)).await?;
        println!("\n{}", rendered);
    }

    Ok(())
}

fn report_failure(e: &EtlError) {
    tracing::error!(
        "Processing failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
