//! CSV reading

use super::{is_blank, Table};
use crate::{Error, Result};

pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read a CSV file into a [`Table`]
///
/// Returns `None` when the file holds no non-blank record at all. Records may
/// have differing lengths; short records simply lack trailing cells.
pub(crate) fn read_table(bytes: &[u8]) -> Result<Option<Table>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut header: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for (ordinal, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::Parse(format!("Invalid CSV: {}", e)))?;
        let source_row = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(ordinal + 1);
        let cells: Vec<String> = record.iter().map(str::to_string).collect();

        if header.is_none() {
            if !is_blank(&cells) {
                header = Some(cells);
            }
            continue;
        }
        records.push((source_row, cells));
    }

    Ok(header.map(|header| Table { header, records }))
}
