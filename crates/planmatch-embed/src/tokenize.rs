use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Model inputs for one batch, padded to the longest sequence.
pub struct BatchInputs {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

/// Tokenize `texts` and right-pad every sequence with `pad_id` to the batch
/// maximum. Truncation is configured on the tokenizer itself.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], pad_id: u32, device: &Device) -> Result<BatchInputs> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let batch = encodings.len();
    let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);

    let mut ids = Vec::with_capacity(batch * seq_len);
    let mut type_ids = Vec::with_capacity(batch * seq_len);
    let mut mask = Vec::with_capacity(batch * seq_len);
    for enc in &encodings {
        let pad = seq_len - enc.get_ids().len();
        ids.extend(enc.get_ids().iter().copied().chain(std::iter::repeat(pad_id).take(pad)));
        type_ids.extend(enc.get_type_ids().iter().copied().chain(std::iter::repeat(0).take(pad)));
        mask.extend(enc.get_attention_mask().iter().copied().chain(std::iter::repeat(0).take(pad)));
    }

    Ok(BatchInputs {
        input_ids: Tensor::from_vec(ids, (batch, seq_len), device)?,
        token_type_ids: Tensor::from_vec(type_ids, (batch, seq_len), device)?,
        attention_mask: Tensor::from_vec(mask, (batch, seq_len), device)?,
    })
}
