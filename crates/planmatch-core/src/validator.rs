//! Recognition of uploaded planning files by exact name.
use std::collections::HashMap;
use std::ops::Range;

use crate::config::FileSettings;
use crate::types::TableSchema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedFile {
    pub name: String,
    pub year: i32,
    pub schema: TableSchema,
}

/// The canonical file names accepted by the loader, one per year.
///
/// Membership is exact string equality: case, surrounding whitespace and path
/// prefixes all make a name unknown, because the column positions in
/// [`TableSchema`] are only known for these files.
#[derive(Debug, Clone)]
pub struct ExpectedFileSet {
    files: Vec<ExpectedFile>,
    by_name: HashMap<String, usize>,
}

impl ExpectedFileSet {
    /// One file per year in `years` (end exclusive), all sharing `schema`.
    pub fn for_years(prefix: &str, extension: &str, years: Range<i32>, schema: TableSchema) -> Self {
        let files: Vec<ExpectedFile> = years
            .map(|year| ExpectedFile { name: canonical_name(prefix, year, extension), year, schema })
            .collect();
        let by_name = files.iter().enumerate().map(|(i, f)| (f.name.clone(), i)).collect();
        Self { files, by_name }
    }

    pub fn from_settings(files: &FileSettings, schema: TableSchema) -> Self {
        Self::for_years(&files.name_prefix, &files.extension, files.first_year..files.end_year, schema)
    }

    pub fn validate_filename(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ExpectedFile> {
        self.by_name.get(name).map(|&i| &self.files[i])
    }

    pub fn schema_for(&self, name: &str) -> Option<&TableSchema> {
        self.get(name).map(|f| &f.schema)
    }

    /// Canonical names in year order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize { self.files.len() }
    pub fn is_empty(&self) -> bool { self.files.is_empty() }
}

impl Default for ExpectedFileSet {
    fn default() -> Self {
        Self::from_settings(&FileSettings::default(), TableSchema::default())
    }
}

pub fn canonical_name(prefix: &str, year: i32, extension: &str) -> String {
    format!("{prefix}{year}.{extension}")
}
