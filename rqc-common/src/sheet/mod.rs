//! Spreadsheet row extraction
//!
//! Turns an uploaded CSV or XLSX file into [`RequirementRow`]s, one per data
//! row, in sheet order. The requirement text is read from the column whose
//! header matches the configured name.

mod delimited;
mod workbook;

use serde::Serialize;
use std::fmt;

use crate::{Error, Result};

/// Header name looked up when none is configured
pub const DEFAULT_REQUIREMENT_COLUMN: &str = "requirement";

/// One requirement statement taken from a spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementRow {
    /// Position among extracted rows (0-based)
    pub index: usize,
    /// Row number in the source sheet (1-based, header included)
    pub source_row: usize,
    /// Requirement statement, trimmed
    pub text: String,
}

/// Supported spreadsheet formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    Csv,
    Xlsx,
}

impl SheetFormat {
    /// Determine the format from an upload's file name (extension only)
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| {
                Error::UnsupportedFile(format!("'{}' has no file extension", filename))
            })?;

        match extension.as_str() {
            "csv" => Ok(SheetFormat::Csv),
            "xlsx" => Ok(SheetFormat::Xlsx),
            other => Err(Error::UnsupportedFile(format!(
                "'.{}' files are not supported (expected .csv or .xlsx)",
                other
            ))),
        }
    }

    /// Reject content that does not match the claimed format
    ///
    /// XLSX workbooks are ZIP containers. CSV must be UTF-8 text without
    /// NUL bytes; a header that merely starts with a known magic number
    /// (`BM`, `MZ`, `ID3`) is still text.
    pub fn check_content(&self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        match self {
            SheetFormat::Xlsx => {
                if !infer::archive::is_zip(bytes) {
                    return Err(Error::UnsupportedFile(
                        "File content is not an XLSX workbook".to_string(),
                    ));
                }
            }
            SheetFormat::Csv => {
                let text = bytes.strip_prefix(delimited::UTF8_BOM).unwrap_or(bytes);
                if text.contains(&0) || std::str::from_utf8(text).is_err() {
                    let kind = infer::get(bytes)
                        .map(|kind| kind.mime_type())
                        .unwrap_or("binary data");
                    return Err(Error::UnsupportedFile(format!(
                        "File content looks like {}, not CSV",
                        kind
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetFormat::Csv => f.write_str("csv"),
            SheetFormat::Xlsx => f.write_str("xlsx"),
        }
    }
}

/// Raw cell grid read from a sheet: header plus data records
#[derive(Debug, Default)]
pub(crate) struct Table {
    pub header: Vec<String>,
    /// (source row number, cells)
    pub records: Vec<(usize, Vec<String>)>,
}

/// Extracts requirement rows from uploaded spreadsheets
#[derive(Debug, Clone)]
pub struct RowExtractor {
    column: String,
}

impl Default for RowExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIREMENT_COLUMN)
    }
}

impl RowExtractor {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Header name this extractor reads
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Validate and parse an upload
    ///
    /// An empty file yields no rows. A file with a header but no
    /// requirement column is a parse error.
    pub fn extract(&self, filename: &str, bytes: &[u8]) -> Result<Vec<RequirementRow>> {
        let format = SheetFormat::from_filename(filename)?;
        format.check_content(bytes)?;
        self.extract_format(format, bytes)
    }

    /// Parse bytes already known to be in `format`
    pub fn extract_format(&self, format: SheetFormat, bytes: &[u8]) -> Result<Vec<RequirementRow>> {
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let table = match format {
            SheetFormat::Csv => delimited::read_table(bytes)?,
            SheetFormat::Xlsx => workbook::read_table(bytes)?,
        };

        match table {
            Some(table) => self.rows_from_table(table),
            None => Ok(Vec::new()),
        }
    }

    fn rows_from_table(&self, table: Table) -> Result<Vec<RequirementRow>> {
        let wanted = self.column.trim();
        let column = table
            .header
            .iter()
            .position(|name| name.trim().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Parse(format!("Column '{}' not found", wanted)))?;

        let rows = table
            .records
            .into_iter()
            .filter(|(_, cells)| !is_blank(cells))
            .enumerate()
            .map(|(index, (source_row, cells))| RequirementRow {
                index,
                source_row,
                text: cells
                    .get(column)
                    .map(|cell| cell.trim().to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Ok(rows)
    }
}

pub(crate) fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|cell| cell.trim().is_empty())
}
