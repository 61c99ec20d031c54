#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::Locale;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_stem, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Excel,
    Csv,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Excel => "excel",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options recognized by a single conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub output_format: OutputFormat,
    /// Only applies to Excel output.
    pub include_styling: bool,
    /// File name without extension.
    pub filename: String,
    pub locale: Locale,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Excel,
            include_styling: true,
            filename: "test_cases".to_string(),
            locale: Locale::En,
        }
    }
}

impl Validate for ConvertOptions {
    fn validate(&self) -> Result<()> {
        validate_file_stem("filename", &self.filename)
    }
}
