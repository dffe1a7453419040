use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::{Tokenizer, TruncationParams};

use planmatch_core::config::{expand_path, EmbeddingBackend, EmbeddingSettings};
use planmatch_core::traits::Embedder;
use planmatch_core::types::EmbeddingVector;

pub mod device;
pub mod pool;
pub mod shared;
pub mod tokenize;

pub use pool::masked_mean_l2;
pub use shared::SharedEmbedder;

pub const MINILM_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const MINILM_DIM: usize = 384;
const MODEL_DIR_NAME: &str = "all-MiniLM-L6-v2";

/// Sentence embedder for all-MiniLM-L6-v2: BERT encoder, mean pooling, L2 norm.
pub struct MiniLmEmbedder { model: BertModel, tokenizer: Tokenizer, device: Device, pad_id: u32, dim: usize, batch_size: usize }

impl MiniLmEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let model_dir = resolve_model_dir(settings.model_dir.as_deref())?;
        Self::from_dir(&model_dir, settings)
    }

    pub fn from_dir(model_dir: &Path, settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        tracing::info!(dir = %model_dir.display(), "loading {}", MINILM_MODEL_ID);

        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        tokenizer
            .with_truncation(Some(TruncationParams { max_length: settings.max_len, ..Default::default() }))
            .map_err(|e| anyhow!("Invalid truncation settings: {}", e))?;
        tokenizer.with_padding(None);
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        let config_path = model_dir.join("config.json");
        let raw: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?,
        )?;
        let dim = raw.get("hidden_size").and_then(serde_json::Value::as_u64).map_or(MINILM_DIM, |d| d as usize);
        let config: BertConfig = serde_json::from_value(raw)?;

        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DTYPE, &device);
        let model = BertModel::load(vb, &config)?;
        tracing::info!(dim, "model loaded");
        Ok(Self { model, tokenizer, device, pad_id, dim, batch_size: settings.batch_size.max(1) })
    }

    pub fn dim(&self) -> usize { self.dim }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let inputs = tokenize::tokenize_batch(&self.tokenizer, texts, self.pad_id, &self.device)?;
        let hidden = self.model.forward(&inputs.input_ids, &inputs.token_type_ids, Some(&inputs.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &inputs.attention_mask)?;
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for MiniLmEmbedder {
    fn model_id(&self) -> &str { MINILM_MODEL_ID }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk)?);
        }
        tracing::debug!(texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let tensors = candle_core::pickle::read_all(&pickle)?;
        return tensors
            .into_iter()
            .map(|(name, t)| -> Result<(String, Tensor)> { Ok((name, t.to_device(device)?)) })
            .collect();
    }
    Err(anyhow!("No model.safetensors or pytorch_model.bin in {}", model_dir.display()))
}

/// Hashed bag-of-words vectors. Deterministic and model-free; identical texts
/// map to identical vectors and texts without shared words are orthogonal
/// barring hash collisions.
pub struct FakeEmbedder { dim: usize, id: String }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("fake:xxh64:d{dim}") } }

    fn embed_text(&self, text: &str) -> EmbeddingVector {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            v[idx] += 0.5 + ((h >> 32) as u32 as f32) / (u32::MAX as f32);
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.id }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn fake_requested(settings: &EmbeddingSettings) -> bool {
    let env_flag = std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    env_flag || settings.backend == EmbeddingBackend::Fake
}

/// Identifier of the model `get_default_embedder` would build, without loading it.
pub fn default_model_id(settings: &EmbeddingSettings) -> String {
    if fake_requested(settings) { FakeEmbedder::new(MINILM_DIM).id } else { MINILM_MODEL_ID.to_string() }
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if fake_requested(settings) {
        tracing::info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(MINILM_DIM)));
    }
    Ok(Box::new(MiniLmEmbedder::new(settings)?))
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = configured { candidates.push(expand_path(dir)); }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { candidates.push(expand_path(dir)); }
    }
    candidates.push(Path::new("models").join(MODEL_DIR_NAME));
    candidates.push(Path::new("../models").join(MODEL_DIR_NAME));

    if let Some(found) = candidates.iter().find(|p| p.exists()) {
        tracing::debug!(dir = %found.display(), "using model dir");
        return Ok(found.clone());
    }
    let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    Err(anyhow!("Could not locate the {} model directory (tried: {})", MODEL_DIR_NAME, tried.join(", ")))
}
