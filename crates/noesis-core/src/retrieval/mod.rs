mod contracts;
mod engine;

pub use contracts::{
    CatalogSearchInput, CatalogSearchResult, CategorySort, ChunkSearchResult, ConceptProjection,
    ConceptSearchResult, ExtractConceptsInput, ExtractConceptsResult, TaggedSource,
};
pub use engine::RetrievalEngine;
