use planmatch_core::config::{EmbeddingBackend, EmbeddingSettings};
use planmatch_core::traits::Embedder;
use planmatch_embed::{get_default_embedder, FakeEmbedder, MINILM_DIM};

fn fake_settings() -> EmbeddingSettings {
    EmbeddingSettings { backend: EmbeddingBackend::Fake, ..EmbeddingSettings::default() }
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    let texts = vec!["Build server".to_string(), "Paint wall".to_string(), "Build server".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");

    assert_eq!(embs.len(), 3, "one vector per input");
    assert_eq!(embs[0].len(), MINILM_DIM);

    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    assert_eq!(embs[0], embs[2], "identical text gives identical vector");
    assert_ne!(embs[0], embs[1]);
}

#[test]
fn empty_input_gives_empty_output() {
    let embedder = FakeEmbedder::new(16);
    assert!(embedder.embed_batch(&[]).expect("embed").is_empty());
}

#[test]
fn blank_text_embeds_to_zero_vector() {
    let embedder = FakeEmbedder::new(8);
    let embs = embedder.embed_batch(&["   ".to_string()]).expect("embed");
    assert!(embs[0].iter().all(|&x| x == 0.0));
}

#[test]
fn order_is_preserved() {
    let embedder = FakeEmbedder::new(64);
    let texts: Vec<String> = ["alpha", "bravo", "charlie"].iter().map(|s| s.to_string()).collect();
    let together = embedder.embed_batch(&texts).expect("embed");
    for (i, text) in texts.iter().enumerate() {
        let alone = embedder.embed_batch(std::slice::from_ref(text)).expect("embed");
        assert_eq!(alone[0], together[i]);
    }
}
