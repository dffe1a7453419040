//! Domain types shared by the loader, the embedders and the search pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Dense vector produced by an [`crate::traits::Embedder`].
pub type EmbeddingVector = Vec<f32>;

/// Rendered in place of the site when a table has no site column.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Text form of the cell, `None` when missing.
    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() { None } else { Some(self.to_string()) }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Positional schema of a planning file: where the affair title and the site live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub title_column: usize,
    pub site_column: Option<usize>,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self { title_column: 1, site_column: Some(3) }
    }
}

impl TableSchema {
    /// Resolve the schema against the width of a parsed table.
    pub fn resolve(&self, width: usize) -> ColumnLayout {
        ColumnLayout {
            title: (self.title_column < width).then_some(self.title_column),
            site: self.site_column.filter(|&c| c < width),
        }
    }
}

/// Column positions that actually exist in a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub title: Option<usize>,
    pub site: Option<usize>,
}

/// A parsed worksheet. The header row is kept apart from the data rows and
/// every row is padded to the table width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    width: usize,
    layout: ColumnLayout,
}

impl Table {
    pub fn new(mut headers: Vec<String>, mut rows: Vec<Vec<Cell>>, schema: &TableSchema) -> Self {
        let width = rows.iter().map(Vec::len).chain(std::iter::once(headers.len())).max().unwrap_or(0);
        headers.resize(width, String::new());
        for row in &mut rows {
            row.resize(width, Cell::Missing);
        }
        Self { headers, rows, width, layout: schema.resolve(width) }
    }

    pub fn headers(&self) -> &[String] { &self.headers }
    pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }
    pub fn width(&self) -> usize { self.width }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn layout(&self) -> ColumnLayout { self.layout }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Rows whose title cell holds a value, as `(row index, title text)`.
    /// Empty when the table has no title column.
    pub fn titles(&self) -> Vec<(usize, String)> {
        let Some(col) = self.layout.title else { return Vec::new() };
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(col).and_then(Cell::as_text).map(|t| (i, t)))
            .collect()
    }

    /// Site of a row, or [`NOT_AVAILABLE`] when the table has no site column.
    pub fn site(&self, row: usize) -> String {
        match self.layout.site {
            Some(col) => self.cell(row, col).map(ToString::to_string).unwrap_or_default(),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Accepted tables of one upload batch, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct TableCollection {
    tables: BTreeMap<String, Table>,
}

impl TableCollection {
    pub fn new() -> Self { Self::default() }

    /// Insert a table; a second upload under the same name replaces the first.
    pub fn insert(&mut self, filename: impl Into<String>, table: Table) -> Option<Table> {
        self.tables.insert(filename.into(), table)
    }

    pub fn get(&self, filename: &str) -> Option<&Table> { self.tables.get(filename) }
    pub fn len(&self) -> usize { self.tables.len() }
    pub fn is_empty(&self) -> bool { self.tables.is_empty() }
    pub fn names(&self) -> impl Iterator<Item = &str> { self.tables.keys().map(String::as_str) }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// One row whose affair title is similar to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub filename: String,
    pub row: usize,
    pub score: f32,
    pub text: String,
    pub site: String,
}
