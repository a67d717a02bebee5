mod lru;

pub use lru::{BoundedCache, CacheSnapshot};

/// Cache keyed on `(model_id, text_hash)` for embedding vectors (spec §4.5):
/// no TTL, since a given model+text pair never changes its vector.
pub type EmbeddingCache = BoundedCache<u32, Vec<f32>>;

/// Cache keyed on the serialized query for a retrieval operation (spec §4.8):
/// bounded TTL, since the underlying corpus can change between seeds.
pub type SearchResultCache = BoundedCache<String, Vec<u8>>;

pub fn embedding_cache(capacity: usize) -> EmbeddingCache {
    BoundedCache::new(capacity, None)
}

pub fn search_result_cache(capacity: usize, ttl: std::time::Duration) -> SearchResultCache {
    BoundedCache::new(capacity, Some(ttl))
}
