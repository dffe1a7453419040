use crate::types::EmbeddingVector;

/// Maps text to fixed-length vectors.
///
/// Implementations return exactly one vector per input, in input order, and an
/// empty result for empty input. They are read-only once constructed.
pub trait Embedder: Send + Sync {
    /// Stable identifier of the model behind this embedder.
    fn model_id(&self) -> &str;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<EmbeddingVector>>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn model_id(&self) -> &str { (**self).model_id() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<EmbeddingVector>> { (**self).embed_batch(texts) }
}
