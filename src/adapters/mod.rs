// Adapters layer: concrete exporters and storage backends.

pub mod csv;
pub mod storage;
pub mod xlsx;

use crate::config::OutputFormat;
use crate::domain::ports::Exporter;

pub fn exporter_for(format: OutputFormat, include_styling: bool) -> Box<dyn Exporter> {
    match format {
        OutputFormat::Excel => Box::new(xlsx::ExcelExporter::new(include_styling)),
        OutputFormat::Csv => Box::new(csv::CsvExporter::new()),
    }
}
