mod checkpoint;
mod pipeline;
mod stage_cache;

pub use checkpoint::{Checkpoint, CHECKPOINT_FILENAME};
pub use pipeline::{collection_key, ChunkText, Chunker, ConceptExtractor, Seeder, SeederConfig, SeedingSummary, TextExtractor};
pub use stage_cache::{ExtractedConcepts, PrimaryConcept, StageCache, StageCacheEntry, StageCacheMetadata};
