use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Schema error on field `{field}`: {message}")]
    SchemaError { field: String, message: String },

    #[error("CSV rendering error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in `{field}`: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value `{value}` for `{field}`: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Schema,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn schema(field: &str, message: impl Into<String>) -> Self {
        Self::SchemaError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::SchemaError { .. } => ErrorCategory::Schema,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ValidationError { .. } => {
                ErrorCategory::Data
            }
            Self::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Schema | ErrorCategory::Data => {
                ErrorSeverity::High
            }
            ErrorCategory::Storage => match self {
                Self::IoError(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    ErrorSeverity::Medium
                }
                _ => ErrorSeverity::Critical,
            },
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::SchemaError { field, .. } => format!(
                "Make sure the input records carry a `{}` field",
                field
            ),
            Self::CsvError(_) => "Try the text or json dashboard format instead".to_string(),
            Self::IoError(_) => "Check that the path exists and is readable/writable".to_string(),
            Self::SerializationError(_) => {
                "Check that the input is a JSON array of objects and the dataset was written by this tool"
                    .to_string()
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Review the configuration file or command-line flags".to_string()
            }
            Self::ValidationError { .. } => {
                "The cleaned dataset looks corrupted; regenerate it from the raw input".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Schema => format!("Input does not match the expected schema: {}", self),
            ErrorCategory::Data => format!("Could not process data: {}", self),
            ErrorCategory::Storage => format!("Could not access storage: {}", self),
        }
    }

    /// Process exit code for a failed run; always non-zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
