//! Parsing of uploaded `.xlsx` bytes into a [`Table`].
//!
//! The first worksheet is read; its first row is the header. Columns keep their
//! absolute sheet position so that column B is always index 1, even when
//! column A is entirely empty.
use calamine::{DataType, Reader, Xlsx};
use chrono::NaiveDateTime;
use std::io::Cursor;

use crate::error::ParseError;
use crate::types::{Cell, Table, TableSchema};

/// Parse with the default planning-file schema.
pub fn load_table(filename: &str, bytes: &[u8]) -> Result<Table, ParseError> {
    load_table_with_schema(filename, bytes, &TableSchema::default())
}

pub fn load_table_with_schema(filename: &str, bytes: &[u8], schema: &TableSchema) -> Result<Table, ParseError> {
    let fail = |cause: String| ParseError::new(filename, cause);

    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|err| fail(format!("unable to open the workbook: {err}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| fail("the workbook does not contain any worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| fail(format!("unable to find the worksheet named '{sheet_name}'")))?
        .map_err(|err| fail(format!("unable to read the worksheet data: {err}")))?;

    let leading_columns = range.start().map_or(0, |(_, col)| col as usize);
    let mut rows_iter = range.rows();

    let Some(header_row) = rows_iter.next() else {
        tracing::debug!(filename, "worksheet is empty");
        return Ok(Table::new(Vec::new(), Vec::new(), schema));
    };

    let headers: Vec<String> = std::iter::repeat(String::new())
        .take(leading_columns)
        .chain(header_row.iter().map(|cell| convert_cell(cell).to_string()))
        .collect();

    let rows: Vec<Vec<Cell>> = rows_iter
        .map(|row| {
            std::iter::repeat(Cell::Missing)
                .take(leading_columns)
                .chain(row.iter().map(convert_cell))
                .collect()
        })
        .collect();

    let table = Table::new(headers, rows, schema);
    tracing::debug!(filename, rows = table.len(), columns = table.width(), "parsed worksheet '{}'", sheet_name);
    Ok(table)
}

fn convert_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty | DataType::Error(_) => Cell::Missing,
        DataType::String(s) if s.trim().is_empty() => Cell::Missing,
        DataType::String(s) => Cell::Text(s.clone()),
        #[allow(clippy::cast_precision_loss)]
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Bool(b) => Cell::Bool(*b),
        DataType::DateTime(_) => match cell.as_datetime() {
            Some(dt) => Cell::Text(format_datetime(&dt)),
            None => Cell::Text(cell.to_string()),
        },
        other => Cell::Text(other.to_string()),
    }
}

/// Dates render like a timestamp, e.g. `2021-03-15 00:00:00`.
fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
