//! One upload interaction: validate every file, parse the accepted ones.
use crate::error::ParseError;
use crate::loader::load_table_with_schema;
use crate::types::TableCollection;
use crate::validator::ExpectedFileSet;

/// Raw upload as handed over by the presentation layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Accepted { rows: usize },
    /// Name not in the expected set; the file is ignored.
    Rejected,
    ParseFailed(ParseError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub filename: String,
    pub status: FileStatus,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub tables: TableCollection,
    /// One entry per uploaded file, in upload order.
    pub outcomes: Vec<FileOutcome>,
}

impl IngestReport {
    pub fn accepted(&self) -> usize { self.count(|s| matches!(s, FileStatus::Accepted { .. })) }
    pub fn rejected(&self) -> usize { self.count(|s| matches!(s, FileStatus::Rejected)) }
    pub fn failed(&self) -> usize { self.count(|s| matches!(s, FileStatus::ParseFailed(_))) }

    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Build a fresh [`TableCollection`] from one batch of uploads.
///
/// A rejected or unreadable file is recorded in the report and never stops
/// the remaining files from loading.
pub fn ingest_batch<I>(files: I, expected: &ExpectedFileSet) -> IngestReport
where
    I: IntoIterator<Item = UploadedFile>,
{
    let mut report = IngestReport::default();
    for file in files {
        let status = match expected.schema_for(&file.name) {
            None => {
                tracing::warn!(filename = %file.name, "file ignored: name not recognized");
                FileStatus::Rejected
            }
            Some(schema) => match load_table_with_schema(&file.name, &file.bytes, schema) {
                Ok(table) => {
                    let rows = table.len();
                    if table.layout().title.is_none() {
                        tracing::warn!(filename = %file.name, columns = table.width(), "no title column; file will not be searched");
                    }
                    tracing::info!(filename = %file.name, rows, "file loaded");
                    report.tables.insert(file.name.clone(), table);
                    FileStatus::Accepted { rows }
                }
                Err(err) => {
                    tracing::error!(filename = %file.name, cause = %err.cause, "failed to read file");
                    FileStatus::ParseFailed(err)
                }
            },
        };
        report.outcomes.push(FileOutcome { filename: file.name, status });
    }
    report
}
