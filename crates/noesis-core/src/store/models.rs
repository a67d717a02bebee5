//! The four-table normalized data model (spec §3).

use serde::{Deserialize, Serialize};

/// A document-level record ("catalog entry"). `id = hash(source)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: u32,
    pub source: String,
    pub title: String,
    pub author: String,
    pub year: Option<u32>,
    pub publisher: String,
    pub isbn: String,
    pub summary: String,
    pub content_hash: String,
    pub vector: Vec<f32>,
    pub concept_ids: Vec<u32>,
    pub category_ids: Vec<u32>,
    /// Derived: name projection of `concept_ids`, same order (invariant 4).
    pub concept_names: Vec<String>,
    /// Derived: name projection of `category_ids`.
    pub category_names: Vec<String>,
}

/// A text segment of a document. `id = hash(source_hash || index)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: u32,
    pub catalog_id: u32,
    pub text: String,
    pub content_hash: String,
    pub vector: Vec<f32>,
    pub page_number: Option<u32>,
    pub concept_ids: Vec<u32>,
    pub concept_density: f64,
    /// Derived: equal to `catalog(catalog_id).title` (invariant 1).
    pub catalog_title: String,
    /// Derived: name projection of `concept_ids` (invariant 2).
    pub concept_names: Vec<String>,
}

impl Chunk {
    /// `|concept_ids| / max(1, floor(word_count/10))`, per spec §3.1.
    pub fn concept_density_for(concept_count: usize, word_count: usize) -> f64 {
        let denom = (word_count / 10).max(1);
        concept_count as f64 / denom as f64
    }
}

/// A normalized lowercase phrase identifying a unit of meaning.
/// `id = hash(lower(name))`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: u32,
    pub name: String,
    pub summary: String,
    pub catalog_ids: Vec<u32>,
    pub chunk_ids: Vec<u32>,
    pub adjacent_ids: Vec<u32>,
    pub related_ids: Vec<u32>,
    pub synonyms: Vec<String>,
    pub broader_terms: Vec<String>,
    pub narrower_terms: Vec<String>,
    pub weight: f64,
    pub vector: Vec<f32>,
    /// Derived: title projection of `catalog_ids`.
    pub catalog_titles: Vec<String>,
}

/// A grouping entity over documents. `id = hash(lower(name))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub summary: String,
    /// `None` is root; 0 is never used as a sentinel on the Rust side.
    pub parent_category_id: Option<u32>,
    pub aliases: Vec<String>,
    pub related_category_ids: Vec<u32>,
    pub document_count: u32,
    pub chunk_count: u32,
    pub concept_count: u32,
    pub vector: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_density_floors_word_count_divided_by_ten() {
        assert_eq!(Chunk::concept_density_for(3, 25), 3.0 / 2.0);
        assert_eq!(Chunk::concept_density_for(1, 5), 1.0); // floor(5/10) = 0 -> denom 1
        assert_eq!(Chunk::concept_density_for(0, 100), 0.0);
    }
}
