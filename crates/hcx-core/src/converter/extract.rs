//! Text extraction from source documents.
//!
//! PDFs are reduced to their raw text. Workbooks are read sheet by sheet into row objects
//! keyed by the header row, and each sheet is described to the model by name, row count,
//! column names and a handful of sample rows.

use crate::error::{ConverterError, ConverterResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use hcx_files::{DocumentKind, SourceDocument};
use serde_json::{Map, Value};
use std::io::Cursor;

/// Rows of one worksheet keyed by column header.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRows {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

fn header_name(cell: &Data, index: usize) -> String {
    let name = cell.to_string().trim().to_string();
    if name.is_empty() {
        format!("column_{}", index + 1)
    } else {
        name
    }
}

fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
        }
        other => Some(Value::String(other.to_string())),
    }
}

/// Turns raw worksheet rows into objects keyed by the first row.
///
/// Blank header cells become `column_N`. Empty cells are left out of each object and rows
/// with no values at all are skipped.
pub fn sheet_rows<'a>(name: &str, rows: impl IntoIterator<Item = &'a [Data]>) -> SheetRows {
    let mut rows = rows.into_iter();
    let columns: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(i, cell)| header_name(cell, i))
                .collect()
        })
        .unwrap_or_default();

    let objects = rows
        .map(|row| {
            row.iter()
                .enumerate()
                .filter_map(|(i, cell)| {
                    let value = cell_value(cell)?;
                    let key = columns
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("column_{}", i + 1));
                    Some((key, value))
                })
                .collect::<Map<String, Value>>()
        })
        .filter(|object| !object.is_empty())
        .collect();

    SheetRows {
        name: name.to_string(),
        columns,
        rows: objects,
    }
}

/// Describes one sheet for the prompt, embedding at most `sample_rows` rows.
pub fn describe_sheet(sheet: &SheetRows, sample_rows: usize) -> String {
    let sample: Vec<&Map<String, Value>> = sheet.rows.iter().take(sample_rows).collect();
    let sample_json = serde_json::to_string_pretty(&sample).unwrap_or_else(|_| "[]".into());

    format!(
        "Sheet: {}\nTotal rows: {}\nColumns: {}\nSample data (first {} rows):\n{}",
        sheet.name,
        sheet.rows.len(),
        sheet.columns.join(", "),
        sample.len(),
        sample_json
    )
}

/// Reads every worksheet of an `.xlsx` / `.xls` workbook.
pub fn read_workbook(bytes: &[u8]) -> ConverterResult<Vec<SheetRows>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ConverterError::Workbook(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ConverterError::Workbook(format!("sheet '{name}': {e}")))?;
        let sheet = sheet_rows(&name, range.rows());
        tracing::debug!(
            "sheet '{}': {} columns, {} rows",
            sheet.name,
            sheet.columns.len(),
            sheet.rows.len()
        );
        sheets.push(sheet);
    }
    Ok(sheets)
}

/// Text description of a workbook: one block per non-empty sheet.
pub fn describe_workbook(bytes: &[u8], sample_rows: usize) -> ConverterResult<String> {
    let sheets = read_workbook(bytes)?;
    Ok(sheets
        .iter()
        .filter(|sheet| !sheet.columns.is_empty())
        .map(|sheet| describe_sheet(sheet, sample_rows))
        .collect::<Vec<_>>()
        .join("\n\n"))
}

pub fn pdf_text(bytes: &[u8]) -> ConverterResult<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ConverterError::PdfExtraction(e.to_string()))
}

/// Cuts `text` to at most `max_chars` characters.
pub fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            tracing::warn!(
                "source text truncated to {max_chars} characters ({} bytes dropped)",
                text.len() - byte_index
            );
            text[..byte_index].to_string()
        }
        None => text,
    }
}

/// Extracts the prompt text for a document.
///
/// Runs on the blocking pool since both parsers are CPU-bound.
pub async fn extract_text(
    document: &SourceDocument,
    sample_rows: usize,
    max_chars: usize,
) -> ConverterResult<String> {
    let kind = document.kind();
    let bytes = document.bytes().to_vec();

    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf_text(&bytes),
        DocumentKind::Excel => describe_workbook(&bytes, sample_rows),
    })
    .await
    .map_err(|e| ConverterError::Internal(format!("extraction task failed: {e}")))??;

    if text.trim().is_empty() {
        return Err(ConverterError::NoContent);
    }

    Ok(truncate_chars(text, max_chars))
}
