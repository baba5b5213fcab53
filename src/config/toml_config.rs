use crate::adapters::render::OutputFormat;
use crate::config::DEFAULT_OUTPUT_FILENAME;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub load: LoadConfig,
    pub dashboard: Option<DashboardConfig>,
    pub monitoring: Option<MonitoringConfig>,
    pub environment: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    ///
    /// `[environment]` 內定義的變數優先於行程環境變數參與 `${VAR}` 替換
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let declared = Self::declared_environment(content);
        let processed_content = Self::substitute_env_vars(content, &declared)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 讀取 [environment] 區塊；無法預先解析時視為空
    fn declared_environment(content: &str) -> HashMap<String, String> {
        toml::from_str::<toml::Table>(content)
            .ok()
            .and_then(|table| table.get("environment").and_then(|v| v.as_table()).cloned())
            .map(|vars| {
                vars.into_iter()
                    .filter_map(|(key, value)| value.as_str().map(|v| (key, v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 替換環境變數 (例如 ${DATA_DIR})
    fn substitute_env_vars(content: &str, declared: &HashMap<String, String>) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            declared
                .get(var_name)
                .cloned()
                .or_else(|| std::env::var(var_name).ok())
                .unwrap_or_else(|| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_non_empty_string("pipeline.name", &self.pipeline.name)?;

        validate_path("source.input_path", &self.source.input_path)?;
        validate_file_extension("source.input_path", &self.source.input_path, &["json"])?;

        validate_path("load.output_path", &self.load.output_path)?;
        validate_file_extension("load.output_filename", &self.load.output_filename, &["json"])?;

        if let Some(format) = self.dashboard.as_ref().and_then(|d| d.format.as_deref()) {
            validate_one_of("dashboard.format", format, &OutputFormat::NAMES)?;
        }

        if let Some(log_format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            validate_one_of("monitoring.log_format", log_format, &["compact", "json"])?;
        }

        Ok(())
    }

    pub fn dashboard_enabled(&self) -> bool {
        self.dashboard.as_ref().map(|d| d.enabled).unwrap_or(false)
    }

    pub fn dashboard_format(&self) -> OutputFormat {
        self.dashboard
            .as_ref()
            .and_then(|d| d.format.as_deref())
            .and_then(OutputFormat::parse)
            .unwrap_or_default()
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_name(self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()))
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    /// 將 [environment] 區塊匯出為行程環境變數，需在初始化日誌前呼叫
    pub fn apply_environment(&self) {
        if let Some(vars) = &self.environment {
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.input_path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_filename(&self) -> &str {
        &self.load.output_filename
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
