//! Embedding providers (spec §4.5). `HashingEmbedder` is deterministic and
//! dependency-free, used for tests and for deployments that skip the model
//! download; the optional `fastembed`-backed provider does real ONNX
//! inference behind the `embeddings` feature.

use crate::cache::EmbeddingCache;
use crate::error::{NoesisError, Result};
use crate::hash::id_of;

use super::EMBEDDING_DIMENSIONS;

/// Produces a unit-L2-normalized vector for a piece of text. Implementations
/// must be deterministic for a given `(model_id(), text)` pair — the store
/// and the cache both rely on this to avoid re-embedding unchanged content.
pub trait EmbeddingProvider: Send + Sync {
    fn model_id(&self) -> &str;

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Deterministic, model-free embedder. Expands each text into
/// [`EMBEDDING_DIMENSIONS`] floats via a seeded xorshift stream keyed on the
/// FNV hash of the text, then L2-normalizes. Not semantically meaningful,
/// but stable and fast — suitable for tests and offline deployments.
pub struct HashingEmbedder {
    model_id: String,
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self {
            model_id: "hashing-v1".to_string(),
            dimensions: EMBEDDING_DIMENSIONS,
        }
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            model_id: "hashing-v1".to_string(),
            dimensions,
        }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(NoesisError::Validation("cannot embed empty text".into()));
        }

        let seed = id_of(&format!("{}|{}", self.model_id, text));
        let mut state = (seed as u64) | 1;
        let mut vector = Vec::with_capacity(self.dimensions);
        for _ in 0..self.dimensions {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            vector.push((unit * 2.0 - 1.0) as f32);
        }
        Ok(normalize(vector))
    }
}

fn normalize(vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm <= f32::EPSILON {
        vector
    } else {
        vector.into_iter().map(|x| x / norm).collect()
    }
}

/// Cosine similarity between two equal-length vectors; assumes both are
/// already unit-normalized, matching every vector the store persists.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "cosine_similarity requires equal-length vectors");
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Wraps any [`EmbeddingProvider`] with a cache keyed on `(model, text)`,
/// avoiding repeat inference for unchanged chunk text across re-seeds.
pub struct CachedEmbedder<P: EmbeddingProvider> {
    inner: P,
    cache: EmbeddingCache,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    pub fn new(inner: P, cache: EmbeddingCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let key = id_of(&format!("{}|{}", self.inner.model_id(), text));
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let vector = self.inner.embed(text)?;
        self.cache.put(key, vector.clone());
        Ok(vector)
    }
}
