use planmatch_core::types::{MatchRecord, Table};

/// Scores must exceed this value to count as a match.
pub const SIMILARITY_THRESHOLD: f32 = 0.7;

/// Keep every candidate whose score is strictly above `threshold`.
///
/// `candidates[i]` is the `(row index, title)` that produced `scores[i]`.
/// Records come out in row order; no score sort is applied.
pub fn select_matches(
    filename: &str,
    table: &Table,
    candidates: &[(usize, String)],
    scores: &[f32],
    threshold: f32,
) -> Vec<MatchRecord> {
    candidates
        .iter()
        .zip(scores)
        .filter(|&(_, score)| *score > threshold)
        .map(|((row, text), &score)| MatchRecord {
            filename: filename.to_string(),
            row: *row,
            score,
            text: text.clone(),
            site: table.site(*row),
        })
        .collect()
}
