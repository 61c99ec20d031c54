use crate::domain::model::{CaseTable, ExportPayload, XLSX_MIME};
use crate::domain::ports::Exporter;
use crate::utils::error::{ConvertError, Result};
use base64::Engine as _;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const MAX_COLUMN_WIDTH: usize = 50;
const PREVIEW_ROWS: usize = 3;

const HEADER_STYLE: u32 = 1;
const BODY_STYLE: u32 = 2;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// cellXfs: 0 = default, 1 = header (bold white 12pt on 4F81BD, centered), 2 = body (wrap, top)
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="12"/><color rgb="FFFFFFFF"/><name val="Calibri"/></font></fonts><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FF4F81BD"/><bgColor rgb="FF4F81BD"/></patternFill></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="3"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1" applyAlignment="1"><alignment horizontal="center" vertical="center"/></xf><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0" applyAlignment="1"><alignment vertical="top" wrapText="1"/></xf></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Writes the table as a single-sheet Office Open XML workbook.
#[derive(Debug, Clone, Copy)]
pub struct ExcelExporter {
    include_styling: bool,
}

impl ExcelExporter {
    pub fn new(include_styling: bool) -> Self {
        Self { include_styling }
    }

    pub fn write_workbook(&self, table: &CaseTable) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("xl/workbook.xml", workbook_xml(table.locale.sheet_name())?),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/styles.xml", STYLES.to_string()),
            ("xl/worksheets/sheet1.xml", self.sheet_xml(table)?),
        ];

        for (name, content) in parts {
            zip.start_file::<_, ()>(name, FileOptions::default())?;
            zip.write_all(content.as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn sheet_xml(&self, table: &CaseTable) -> Result<String> {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if self.include_styling {
            xml.push_str("<cols>");
            for (index, width) in column_widths(table).iter().enumerate() {
                xml.push_str(&format!(
                    r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                    index + 1,
                    width
                ));
            }
            xml.push_str("</cols>");
        }

        xml.push_str("<sheetData>");

        let header_style = if self.include_styling { HEADER_STYLE } else { 0 };
        push_row(&mut xml, 1, table.headers().iter().copied(), header_style)?;

        let body_style = if self.include_styling { BODY_STYLE } else { 0 };
        for (index, row) in table.rows.iter().enumerate() {
            push_row(
                &mut xml,
                index + 2,
                row.cells().iter().map(String::as_str),
                body_style,
            )?;
        }

        xml.push_str("</sheetData></worksheet>");
        Ok(xml)
    }
}

impl Exporter for ExcelExporter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn file_type(&self) -> &'static str {
        XLSX_MIME
    }

    fn export(&self, table: &CaseTable, file_stem: &str) -> Result<ExportPayload> {
        let workbook = self.write_workbook(table)?;
        tracing::debug!("Workbook written ({} bytes)", workbook.len());

        Ok(ExportPayload {
            file_content: base64::engine::general_purpose::STANDARD.encode(&workbook),
            filename: format!("{}.{}", file_stem, self.extension()),
            file_type: self.file_type().to_string(),
            preview: excel_preview(table),
        })
    }
}

fn workbook_xml(sheet_name: &str) -> Result<String> {
    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(sheet_name)?
    ))
}

fn push_row<'a>(
    xml: &mut String,
    row_number: usize,
    cells: impl Iterator<Item = &'a str>,
    style: u32,
) -> Result<()> {
    xml.push_str(&format!(r#"<row r="{}">"#, row_number));
    for (index, text) in cells.enumerate() {
        if text.is_empty() {
            continue;
        }
        let style_attr = if style > 0 {
            format!(r#" s="{}""#, style)
        } else {
            String::new()
        };
        xml.push_str(&format!(
            r#"<c r="{}{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
            column_letter(index),
            row_number,
            style_attr,
            escape_xml(text)?
        ));
    }
    xml.push_str("</row>");
    Ok(())
}

/// Width per column: longest cell (header included) plus 2, capped at 50.
pub fn column_widths(table: &CaseTable) -> Vec<usize> {
    table
        .headers()
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let longest = table
                .rows
                .iter()
                .map(|row| row.cells()[index].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            (longest + 2).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Spreadsheet column name for a zero-based index (0 -> A, 26 -> AA).
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        let offset = (remaining - 1) % 26;
        letters.push(char::from(b'A' + offset as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// XML 1.0 `Char` production. Surrogates cannot occur in a `char`.
fn is_xml_char(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r' | '\u{20}'..='\u{fffd}' | '\u{10000}'..)
}

/// Escapes cell text. Characters XML 1.0 cannot carry fail the export.
fn escape_xml(text: &str) -> Result<String> {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c if is_xml_char(c) => escaped.push(c),
            c => {
                return Err(ConvertError::invalid_input(format!(
                    "character U+{:04X} cannot be stored in an Excel cell",
                    c as u32
                )))
            }
        }
    }
    Ok(escaped)
}

pub fn excel_preview(table: &CaseTable) -> String {
    let labels = table.locale.preview_labels();
    let headers = table.headers();

    let mut lines = vec![
        labels.overview.to_string(),
        format!("{}: {}", labels.rows, table.len()),
        format!("{}: {}", labels.columns, headers.len()),
        format!("\n{}", labels.column_list),
    ];
    lines.extend(headers.iter().map(|header| format!("  - {}", header)));

    if !table.is_empty() {
        lines.push(format!("\n{}", labels.first_rows));
        for (index, row) in table.rows.iter().take(PREVIEW_ROWS).enumerate() {
            let fields = headers
                .iter()
                .zip(row.cells())
                .map(|(header, cell)| format!("{:?}: {:?}", header, cell))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("{} {}: {{{}}}", labels.row, index + 1, fields));
        }
    }

    lines.join("\n")
}
