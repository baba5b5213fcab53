use clap::Parser;
use open_house_etl::adapters::render::renderer_for;
use open_house_etl::utils::{logger, validation};
use open_house_etl::{Dashboard, LocalStorage, OutputFormat};

#[derive(Parser)]
#[command(name = "open-house-dashboard")]
#[command(about = "Render the open house dashboard from a cleaned dataset")]
struct DashboardArgs {
    /// Cleaned dataset written by open-house-etl
    #[arg(short, long, default_value = "data/output/processed_openhouses.columns.json")]
    data: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = DashboardArgs::parse();

    logger::init_cli_logger(args.verbose);

    if let Err(e) = validation::validate_file_extension("data", &args.data, &["json"]) {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let dashboard = Dashboard::new(LocalStorage::default(), args.data.clone());
    match dashboard.display(&renderer_for(args.format)).await {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            tracing::error!(
                "Dashboard failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
