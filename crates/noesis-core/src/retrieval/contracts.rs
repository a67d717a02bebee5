//! Input/output shapes for the ten retrieval operations (spec §4.8, §6.1).
//! Each operation models its input as an explicit struct rather than a
//! freeform dictionary, per the design notes in spec §9.

use crate::scoring::ScoreBreakdown;

#[derive(Debug, Clone)]
pub struct CatalogSearchInput {
    pub text: String,
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogSearchResult {
    pub id: u32,
    pub title: String,
    pub source: String,
    pub score: f32,
    pub breakdown: Option<ScoreBreakdown>,
}

#[derive(Debug, Clone)]
pub struct ChunkSearchResult {
    pub id: u32,
    pub catalog_id: u32,
    pub catalog_title: String,
    pub text: String,
    pub score: f32,
    pub concept_density: f64,
}

#[derive(Debug, Clone)]
pub struct ConceptSearchResult {
    pub concept_id: u32,
    /// `true` if `concepts.name` matched exactly; `false` for a fuzzy match.
    pub exact_match: bool,
    pub chunks: Vec<ChunkSearchResult>,
    pub source_catalog_ids: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct ExtractConceptsInput {
    pub document_query: String,
    pub format: Option<String>,
    pub include_summary: bool,
}

#[derive(Debug, Clone)]
pub struct ConceptProjection {
    pub id: u32,
    pub name: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractConceptsResult {
    pub catalog_id: u32,
    pub concepts: Vec<ConceptProjection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySort {
    Name,
    Popularity,
    DocumentCount,
}

/// One document tagged with which positions in the input concept-name
/// array matched it (spec §4.8 "concept→sources", union variant).
#[derive(Debug, Clone)]
pub struct TaggedSource {
    pub catalog_id: u32,
    pub matched_concept_indices: Vec<usize>,
}
