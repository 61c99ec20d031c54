use crate::config::toml_config::TomlConfig;
use crate::config::OutputFormat;
use crate::domain::model::Locale;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "testcase-export")]
#[command(about = "Convert JSON test cases into Excel or CSV tables")]
pub struct CliArgs {
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a JSON document into a spreadsheet
    Convert(ConvertArgs),
    /// Print the tool descriptor as JSON
    Manifest,
    /// Sum token usage over a JSON-lines file of API responses
    Usage(UsageArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// JSON text, or a path to a JSON file
    pub input: String,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Write a plain workbook without header styling")]
    pub no_styling: bool,

    /// Output file name without extension
    #[arg(long)]
    pub filename: Option<String>,

    #[arg(long, value_enum)]
    pub locale: Option<Locale>,

    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Print the full conversion result as JSON")]
    pub print_result: bool,
}

impl ConvertArgs {
    /// Loads the configuration file (if any) and applies command-line overrides.
    pub fn resolve_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(format) = self.format {
            config.convert.output_format = format;
        }
        if self.no_styling {
            config.convert.include_styling = false;
        }
        if let Some(filename) = &self.filename {
            config.convert.filename = filename.clone();
        }
        if let Some(locale) = self.locale {
            config.convert.locale = locale;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Args)]
pub struct UsageArgs {
    /// JSON-lines file, one API response per line
    pub responses: String,
}
