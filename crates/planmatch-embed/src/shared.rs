//! Lazily-constructed embedder handle.
//!
//! The application builds one `SharedEmbedder` at startup and passes it to
//! every query. The model is loaded on the first non-empty `embed_batch` call
//! and reused afterwards; concurrent first calls run the loader at most once.
//! A failed load is returned to the caller and attempted again next time.
use anyhow::Result;
use once_cell::sync::OnceCell;
use std::time::Instant;

use planmatch_core::config::EmbeddingSettings;
use planmatch_core::traits::Embedder;
use planmatch_core::types::EmbeddingVector;

type Loader = Box<dyn Fn() -> Result<Box<dyn Embedder>> + Send + Sync>;

pub struct SharedEmbedder {
    model_id: String,
    cell: OnceCell<Box<dyn Embedder>>,
    loader: Loader,
}

impl SharedEmbedder {
    pub fn new<F>(model_id: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Embedder>> + Send + Sync + 'static,
    {
        Self { model_id: model_id.into(), cell: OnceCell::new(), loader: Box::new(loader) }
    }

    pub fn from_settings(settings: EmbeddingSettings) -> Self {
        let model_id = crate::default_model_id(&settings);
        Self::new(model_id, move || crate::get_default_embedder(&settings))
    }

    /// The loaded embedder, constructing it on first use.
    pub fn get(&self) -> Result<&dyn Embedder> {
        let embedder = self.cell.get_or_try_init(|| {
            let start = Instant::now();
            let embedder = (self.loader)()?;
            tracing::info!(model = embedder.model_id(), elapsed_ms = start.elapsed().as_millis() as u64, "embedder ready");
            Ok::<_, anyhow::Error>(embedder)
        })?;
        Ok(&**embedder)
    }

    pub fn is_loaded(&self) -> bool { self.cell.get().is_some() }
}

impl Embedder for SharedEmbedder {
    fn model_id(&self) -> &str {
        self.cell.get().map_or(self.model_id.as_str(), |e| e.model_id())
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.get()?.embed_batch(texts)
    }
}
