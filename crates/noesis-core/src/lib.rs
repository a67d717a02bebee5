//! # Noesis Core
//!
//! A local conceptual retrieval engine for personal document libraries.
//! Combines dense vector search, BM25, title matching, and lexical query
//! expansion into a single hybrid scoring pipeline over a four-table
//! normalized store (catalog, chunks, concepts, categories), fed by a
//! resumable, content-addressed seeding pipeline.

pub mod cache;
pub mod concepts;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod hash;
pub mod observability;
pub mod query_expander;
pub mod resilience;
pub mod retrieval;
pub mod scoring;
pub mod seeder;
pub mod store;

pub use config::Config;
pub use error::{ErrorCode, NoesisError, Result};
pub use hash::{chunk_id, id_of, id_of_bytes};
pub use observability::Logger;
pub use retrieval::{
    CatalogSearchInput, CatalogSearchResult, CategorySort, ChunkSearchResult, ConceptProjection,
    ConceptSearchResult, ExtractConceptsInput, ExtractConceptsResult, RetrievalEngine, TaggedSource,
};
pub use store::{Catalog, Category, Chunk, Concept, Store};

/// Crate version, as reported by Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient imports for callers wiring up a full engine instance.
pub mod prelude {
    pub use crate::cache::{embedding_cache, search_result_cache, CacheSnapshot};
    pub use crate::concepts::ConceptIndexBuilder;
    pub use crate::embeddings::{CachedEmbedder, EmbeddingProvider, HashingEmbedder};
    pub use crate::query_expander::{LexicalRelatives, LexicalSource};
    pub use crate::resilience::{
        Bulkhead, CircuitBreaker, EnvelopeError, ResilientExecutor, ResilientExecutorConfig, RetryConfig,
    };
    pub use crate::seeder::{Seeder, SeederConfig, SeedingSummary};
    pub use crate::{
        Catalog, Category, Chunk, Concept, Config, ErrorCode, Logger, NoesisError, Result,
        RetrievalEngine, Store,
    };
}
