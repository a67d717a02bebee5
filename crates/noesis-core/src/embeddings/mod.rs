mod provider;

#[cfg(feature = "embeddings")]
mod fastembed_provider;

pub use provider::{cosine_similarity, CachedEmbedder, EmbeddingProvider, HashingEmbedder};

#[cfg(feature = "embeddings")]
pub use fastembed_provider::FastEmbedProvider;

/// Fixed embedding width carried through the store and scoring layers
/// (spec §4.5). A provider that produces a different width cannot be used
/// without also migrating every stored vector.
pub const EMBEDDING_DIMENSIONS: usize = 384;
