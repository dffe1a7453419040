//! Input collection and text rendering for the `planmatch` binary.
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use planmatch_core::ingest::{FileStatus, IngestReport, UploadedFile};
use planmatch_core::types::Table;
use planmatch_search::{QueryOutcome, QueryReport, SIMILARITY_THRESHOLD};

/// Expand the given paths into spreadsheet files. Directories are walked for
/// `.xlsx` files (sorted); plain files are taken as given.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_xlsx(e.path()))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }
    Ok(files)
}

fn is_xlsx(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}

/// Read files as uploads. The upload name is the file name alone, never the path.
pub fn read_uploads(files: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| format!("{} has no file name", path.display()))?;
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            Ok(UploadedFile::new(name, bytes))
        })
        .collect()
}

pub fn render_outcomes(report: &IngestReport) -> String {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.status {
            FileStatus::Accepted { rows } => format!("✅ {} loaded ({rows} rows)", outcome.filename),
            FileStatus::Rejected => format!("⚠️  {} ignored (name not recognized)", outcome.filename),
            FileStatus::ParseFailed(err) => format!("❌ {err}"),
        })
        .collect();
    lines.push(format!("{} loaded, {} ignored, {} failed", report.accepted(), report.rejected(), report.failed()));
    join_lines(lines)
}

pub fn render_preview(table: &Table, max_rows: usize) -> String {
    let mut lines = vec![table.headers().join(" | ")];
    for row in table.rows().iter().take(max_rows) {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        lines.push(cells.join(" | "));
    }
    if table.len() > max_rows {
        lines.push(format!("… {} more rows", table.len() - max_rows));
    }
    join_lines(lines)
}

pub fn render_query(report: &QueryReport) -> String {
    let mut lines: Vec<String> =
        report.skipped.iter().map(|s| format!("⚠️  {} skipped: {}", s.filename, s.reason)).collect();
    match &report.outcome {
        QueryOutcome::NoFilesLoaded => lines.push("No planning file loaded.".to_string()),
        QueryOutcome::NoMatches => lines.push(format!("⚠️  No similarity above {SIMILARITY_THRESHOLD} found.")),
        QueryOutcome::Matches(by_file) => {
            for (filename, records) in by_file {
                lines.push(format!("📁 Results for {filename}"));
                for record in records {
                    lines.push(format!("🔹 Similarity: {:.4}", record.score));
                    lines.push(format!("📌 Matching title: {}", record.text));
                    lines.push(format!("📍 Site: {}", record.site));
                    lines.push("---".to_string());
                }
            }
        }
    }
    join_lines(lines)
}

/// One line per entry, each newline-terminated.
fn join_lines(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}
