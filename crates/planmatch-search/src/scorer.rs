use planmatch_core::types::EmbeddingVector;

/// Cosine similarity of every candidate against `query`, index-aligned with
/// `candidates`. A zero-norm vector scores 0.0; so does a candidate whose
/// dimension differs from the query's.
pub fn score(query: &[f32], candidates: &[EmbeddingVector]) -> Vec<f32> {
    let query_norm = norm(query);
    candidates.iter().map(|c| similarity(query, query_norm, c)).collect()
}

fn similarity(query: &[f32], query_norm: f32, candidate: &[f32]) -> f32 {
    if candidate.len() != query.len() {
        tracing::warn!(expected = query.len(), got = candidate.len(), "embedding dimension mismatch");
        return 0.0;
    }
    let denom = query_norm * norm(candidate);
    if denom == 0.0 { 0.0 } else { (dot(query, candidate) / denom).clamp(-1.0, 1.0) }
}

fn dot(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }
fn norm(v: &[f32]) -> f32 { dot(v, v).sqrt() }
