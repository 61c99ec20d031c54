use crate::adapters::exporter_for;
use crate::config::ConvertOptions;
use crate::core::extract::extract_test_cases;
use crate::core::projection::project_table;
use crate::domain::model::{
    ConversionMetadata, ConversionResult, ConversionSuccess, ExportPayload,
};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use serde_json::Value;
use std::path::Path;

/// Output of a conversion that completed without error.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub payload: ExportPayload,
    pub test_case_count: usize,
}

pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Reads `json_input` as a file when such a path exists, otherwise parses it as JSON text.
    pub fn load_document(&self, json_input: &str) -> Result<Value> {
        let path = Path::new(json_input);
        let text = if path.exists() {
            tracing::debug!("Reading JSON document from file: {}", path.display());
            std::fs::read_to_string(path)?
        } else {
            json_input.to_string()
        };

        Ok(serde_json::from_str(text.trim_start_matches('\u{feff}'))?)
    }

    pub fn convert(&self, json_input: &str) -> Result<ConversionOutput> {
        self.options.validate()?;

        let document = self.load_document(json_input)?;
        let extraction = extract_test_cases(&document)?;
        tracing::info!(
            "Extracted {} test cases from {}",
            extraction.test_cases.len(),
            extraction.source.describe()
        );

        let table = project_table(&extraction.test_cases, self.options.locale);

        let exporter = exporter_for(self.options.output_format, self.options.include_styling);
        let payload = exporter.export(&table, &self.options.filename)?;
        tracing::info!(
            "Generated {} ({} rows)",
            payload.filename,
            table.len()
        );

        Ok(ConversionOutput {
            payload,
            test_case_count: extraction.test_cases.len(),
        })
    }

    /// Runs the conversion and reports any failure in the result instead of returning an error.
    pub fn run(&self, json_input: &str) -> ConversionResult {
        match self.convert(json_input) {
            Ok(output) => self.success(output),
            Err(e) => {
                tracing::error!("❌ Conversion failed: {}", e);
                ConversionResult::failure(&e, self.options.locale)
            }
        }
    }

    pub fn success(&self, output: ConversionOutput) -> ConversionResult {
        let locale = self.options.locale;
        ConversionResult::Success(ConversionSuccess {
            success: true,
            message: locale.success_message(output.test_case_count),
            metadata: ConversionMetadata {
                test_case_count: output.test_case_count,
                output_format: self.options.output_format.to_string(),
                generated_at: chrono::Local::now()
                    .naive_local()
                    .format("%Y-%m-%dT%H:%M:%S%.6f")
                    .to_string(),
            },
            data: output.payload,
        })
    }
}

pub fn convert(json_input: &str, options: &ConvertOptions) -> ConversionResult {
    Converter::new(options.clone()).run(json_input)
}
