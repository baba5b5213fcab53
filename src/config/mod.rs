pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::render::OutputFormat;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_OUTPUT_FILENAME: &str = "processed_openhouses.columns.json";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "open-house-etl")]
#[command(about = "Clean raw open house listings into a deduplicated dataset")]
pub struct CliConfig {
    /// Raw open house feed (JSON array of records)
    #[arg(long, default_value = "data/openhouses.json")]
    pub input_path: String,

    /// Directory the cleaned dataset is written to
    #[arg(long, default_value = "data/output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILENAME)]
    pub output_filename: String,

    /// Render the dashboard from the freshly written dataset
    #[arg(long)]
    pub dashboard: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> &str {
        &self.output_filename
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input_path", &self.input_path)?;
        validation::validate_file_extension("input_path", &self.input_path, &["json"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("output_filename", &self.output_filename)?;
        validation::validate_file_extension("output_filename", &self.output_filename, &["json"])?;
        Ok(())
    }
}
