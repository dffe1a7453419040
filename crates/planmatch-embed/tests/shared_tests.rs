use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use planmatch_core::traits::Embedder;
use planmatch_embed::{FakeEmbedder, SharedEmbedder};

fn counting_handle(count: Arc<AtomicUsize>) -> SharedEmbedder {
    SharedEmbedder::new("fake:test", move || {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeEmbedder::new(32)) as Box<dyn Embedder>)
    })
}

#[test]
fn empty_input_does_not_load_model() {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = counting_handle(count.clone());
    assert!(handle.embed_batch(&[]).unwrap().is_empty());
    assert!(!handle.is_loaded());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn model_is_loaded_once_across_threads() {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::new(counting_handle(count.clone()));
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let handle = handle.clone();
            std::thread::spawn(move || handle.embed_batch(&[format!("text {i}")]).unwrap())
        })
        .collect();
    for t in threads {
        assert_eq!(t.join().unwrap().len(), 1);
    }
    handle.embed_batch(&["again".to_string()]).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(handle.is_loaded());
    assert_eq!(handle.model_id(), "fake:xxh64:d32");
}

#[test]
fn failed_load_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = attempts.clone();
    let handle = SharedEmbedder::new("flaky", move || {
        if seen.fetch_add(1, Ordering::SeqCst) == 0 {
            anyhow::bail!("weights not found");
        }
        Ok(Box::new(FakeEmbedder::new(8)) as Box<dyn Embedder>)
    });
    assert!(handle.embed_batch(&["x".to_string()]).is_err());
    assert_eq!(handle.model_id(), "flaky");
    assert!(handle.embed_batch(&["x".to_string()]).is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}
