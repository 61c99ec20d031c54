pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::storage::LocalStorage;
pub use config::{toml_config::TomlConfig, ConvertOptions, OutputFormat};
pub use crate::core::converter::{convert, Converter};
pub use domain::model::{ConversionResult, ExportPayload, Locale};
pub use utils::error::{ConvertError, Result};
