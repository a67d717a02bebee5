//! Real local inference via `fastembed` (ONNX), feature-gated behind
//! `embeddings`. Mirrors the teacher's `OnceLock<Mutex<TextEmbedding>>`
//! pattern for the one-time model load.

use std::sync::{Mutex, OnceLock};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::error::{NoesisError, Result};

use super::provider::EmbeddingProvider;
use super::EMBEDDING_DIMENSIONS;

static MODEL: OnceLock<Mutex<TextEmbedding>> = OnceLock::new();

fn model() -> Result<&'static Mutex<TextEmbedding>> {
    if let Some(m) = MODEL.get() {
        return Ok(m);
    }
    let init = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
        .map_err(|e| NoesisError::Embedding(format!("failed to load embedding model: {e}")))?;
    Ok(MODEL.get_or_init(|| Mutex::new(init)))
}

/// Embedding provider backed by a locally-loaded ONNX model. Output vectors
/// are truncated to [`EMBEDDING_DIMENSIONS`] (Matryoshka-style) when the
/// underlying model produces a wider vector, then re-normalized, the same
/// truncate-then-renormalize sequence the teacher applies for its 256-dim
/// target.
pub struct FastEmbedProvider {
    model_id: String,
}

impl FastEmbedProvider {
    pub fn new() -> Self {
        Self {
            model_id: "fastembed-all-MiniLM-L6-v2".to_string(),
        }
    }
}

impl Default for FastEmbedProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(NoesisError::Validation("cannot embed empty text".into()));
        }
        let model = model()?;
        let guard = model.lock().expect("embedding model lock poisoned");
        let mut embeddings = guard
            .embed(vec![text.to_string()], None)
            .map_err(|e| NoesisError::Embedding(format!("embedding inference failed: {e}")))?;
        let vector = embeddings.pop().ok_or_else(|| NoesisError::Embedding("embedder returned no vectors".into()))?;
        Ok(matryoshka_truncate(vector, EMBEDDING_DIMENSIONS))
    }
}

fn matryoshka_truncate(vector: Vec<f32>, target_dims: usize) -> Vec<f32> {
    let mut truncated: Vec<f32> = vector.into_iter().take(target_dims).collect();
    let norm = truncated.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in truncated.iter_mut() {
            *x /= norm;
        }
    }
    truncated
}
