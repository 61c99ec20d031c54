use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid input: {message}")]
    InvalidInputError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Export,
    System,
}

impl ConvertError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInputError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::JsonError(_) | Self::InvalidInputError { .. } | Self::DecodeError(_) => {
                ErrorCategory::Input
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ZipError(_) | Self::CsvError(_) => ErrorCategory::Export,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check that the input is valid JSON text or a path to a readable JSON file"
            }
            ErrorCategory::Configuration => {
                "Review the conversion options (output_format, filename, locale)"
            }
            ErrorCategory::Export => "Retry the export; the table content could not be encoded",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("The input could not be read: {}", self),
            ErrorCategory::Configuration => format!("The configuration is invalid: {}", self),
            ErrorCategory::Export => format!("The export failed: {}", self),
            ErrorCategory::System => format!("A system error occurred: {}", self),
        }
    }

    /// CLI 退出碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 1,
            ErrorCategory::Configuration => 2,
            ErrorCategory::Export => 3,
            ErrorCategory::System => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
