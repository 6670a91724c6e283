//! XLSX reading (first worksheet only)

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;

use super::{is_blank, Table};
use crate::{Error, Result};

/// Read the first worksheet of an XLSX workbook into a [`Table`]
pub(crate) fn read_table(bytes: &[u8]) -> Result<Option<Table>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::Parse(format!("Cannot open workbook: {}", e)))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| Error::Parse(format!("Cannot read worksheet: {}", e)))?,
        None => return Ok(None),
    };

    // Range starts at the first used cell, not necessarily A1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

    let mut header: Option<Vec<String>> = None;
    let mut records = Vec::new();

    for (offset, row) in range.rows().enumerate() {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if header.is_none() {
            if !is_blank(&cells) {
                header = Some(cells);
            }
            continue;
        }
        records.push((first_row + offset + 1, cells));
    }

    Ok(header.map(|header| Table { header, records }))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
