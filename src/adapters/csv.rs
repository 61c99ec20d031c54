use crate::domain::model::{CaseTable, ExportPayload, CSV_MIME};
use crate::domain::ports::Exporter;
use crate::utils::error::{ConvertError, Result};

pub const UTF8_BOM: &str = "\u{feff}";

const PREVIEW_ROWS: usize = 5;

/// UTF-8 CSV with a byte-order mark so spreadsheet tools pick the right encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_csv(&self, table: &CaseTable) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(UTF8_BOM.as_bytes().to_vec());

        writer.write_record(table.headers())?;
        for row in &table.rows {
            writer.write_record(row.cells())?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ConvertError::IoError(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| ConvertError::invalid_input(format!("CSV output is not UTF-8: {}", e)))
    }
}

impl Exporter for CsvExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn file_type(&self) -> &'static str {
        CSV_MIME
    }

    fn export(&self, table: &CaseTable, file_stem: &str) -> Result<ExportPayload> {
        let content = self.write_csv(table)?;
        tracing::debug!("CSV written ({} bytes)", content.len());

        Ok(ExportPayload {
            file_content: content,
            filename: format!("{}.{}", file_stem, self.extension()),
            file_type: self.file_type().to_string(),
            preview: csv_preview(table),
        })
    }
}

/// Fixed-width rendering of the first rows with a row index column.
pub fn csv_preview(table: &CaseTable) -> String {
    let headers = table.headers();

    if table.is_empty() {
        return format!(
            "{}\n{}: [{}]",
            table.locale.preview_labels().empty,
            table.locale.preview_labels().columns,
            headers.join(", ")
        );
    }

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(|row| {
            row.cells()
                .iter()
                .map(|cell| cell.replace('\n', "\\n"))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .map(|cells| cells[index].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let index_width = (rows.len() - 1).to_string().len();

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header_line = " ".repeat(index_width);
    for (header, width) in headers.iter().zip(&widths) {
        header_line.push_str(&format!("  {:>width$}", header, width = *width));
    }
    lines.push(header_line);

    for (index, cells) in rows.iter().enumerate() {
        let mut line = format!("{:<width$}", index, width = index_width);
        for (cell, width) in cells.iter().zip(&widths) {
            line.push_str(&format!("  {:>width$}", cell, width = *width));
        }
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExportedRow, Locale};

    fn row(id: &str, steps: &str) -> ExportedRow {
        let mut cells: [String; 12] = Default::default();
        cells[0] = id.to_string();
        cells[5] = steps.to_string();
        ExportedRow::new(cells)
    }

    #[test]
    fn test_csv_has_bom_and_quotes_multiline_cells() {
        let table = CaseTable::new(Locale::En, vec![row("TC1", "1. open\n2. submit, then wait")]);
        let content = CsvExporter::new().write_csv(&table).unwrap();

        assert!(content.starts_with(UTF8_BOM));
        let mut lines = content.trim_start_matches(UTF8_BOM).splitn(2, '\n');
        assert_eq!(
            lines.next().unwrap(),
            "ID,Name,Module,Priority,Preconditions,Steps,Expected,Test Data,Status,Author,Created,Remarks"
        );
        assert_eq!(
            lines.next().unwrap(),
            "TC1,,,,,\"1. open\n2. submit, then wait\",,,,,,\n"
        );
    }

    #[test]
    fn test_csv_reads_back_with_csv_reader() {
        let table = CaseTable::new(Locale::Zh, vec![row("TC1", "a\nb"), row("TC2", "\"quoted\"")]);
        let content = CsvExporter::new().write_csv(&table).unwrap();

        let mut reader = csv::Reader::from_reader(content.trim_start_matches(UTF8_BOM).as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "用例ID");

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][5], "a\nb");
        assert_eq!(&records[1][5], "\"quoted\"");
    }

    #[test]
    fn test_export_payload() {
        let table = CaseTable::new(Locale::En, vec![]);
        let payload = CsvExporter::new().export(&table, "empty").unwrap();

        assert_eq!(payload.filename, "empty.csv");
        assert_eq!(payload.file_type, "text/csv");
        assert_eq!(payload.decoded_bytes().unwrap(), payload.file_content.as_bytes());
        assert!(payload.preview.starts_with("Empty table\nColumns: [ID, Name,"));
    }

    #[test]
    fn test_csv_preview_layout() {
        let rows = (0..7).map(|i| row(&format!("TC{}", i), "x\ny")).collect();
        let preview = csv_preview(&CaseTable::new(Locale::En, rows));
        let lines: Vec<&str> = preview.lines().collect();

        // header + 5 rows
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("    ID  Name"));
        assert!(lines[1].starts_with("0  TC0"));
        assert!(lines[1].contains("x\\ny"));
        assert!(lines[5].starts_with("4  TC4"));
    }
}
