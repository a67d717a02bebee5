//! Fixtures and fake external collaborators for exercising noesis-core's
//! end-to-end scenarios (spec §8) without a real LLM, chunker, or document
//! parser — those are explicitly out of core scope.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use noesis_core::observability::{Level, Logger};
use noesis_core::query_expander::{LexicalRelatives, LexicalSource};
use noesis_core::seeder::{ChunkText, Chunker, ConceptExtractor, ExtractedConcepts, PrimaryConcept, TextExtractor};
use noesis_core::store::{Catalog, Category, Chunk, Concept};

/// A [`TextExtractor`] that reads the file as UTF-8, ignoring format.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> noesis_core::Result<String> {
        std::fs::read_to_string(path).map_err(noesis_core::NoesisError::Io)
    }
}

/// A [`Chunker`] that splits on blank lines, falling back to one chunk.
pub struct ParagraphChunker;

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Vec<ChunkText> {
        let paragraphs: Vec<&str> = text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).collect();
        if paragraphs.is_empty() {
            return vec![ChunkText { text: text.to_string(), page_number: None }];
        }
        paragraphs.into_iter().map(|p| ChunkText { text: p.to_string(), page_number: None }).collect()
    }
}

/// A [`ConceptExtractor`] returning a fixed set of concepts per call count,
/// or failing a configured number of times first (for resilience scenarios).
pub struct ScriptedConceptExtractor {
    responses: Vec<Result<ExtractedConcepts, String>>,
    calls: Mutex<usize>,
}

impl ScriptedConceptExtractor {
    pub fn always(response: ExtractedConcepts) -> Self {
        Self { responses: vec![Ok(response)], calls: Mutex::new(0) }
    }

    pub fn scripted(responses: Vec<Result<ExtractedConcepts, String>>) -> Self {
        Self { responses, calls: Mutex::new(0) }
    }
}

#[async_trait]
impl ConceptExtractor for ScriptedConceptExtractor {
    async fn extract(&self, _document_text: &str) -> Result<ExtractedConcepts, String> {
        let mut calls = self.calls.lock().expect("calls lock poisoned");
        let index = (*calls).min(self.responses.len() - 1);
        *calls += 1;
        self.responses[index].clone()
    }
}

pub fn single_concept_extraction(concept_name: &str) -> ExtractedConcepts {
    ExtractedConcepts {
        primary_concepts: vec![PrimaryConcept { name: concept_name.to_string(), summary: format!("{concept_name} summary") }],
        categories: vec!["software design".to_string()],
        technical_terms: vec![],
        related_concepts: vec![],
    }
}

/// A [`LexicalSource`] backed by a fixed synonym table, for query expansion.
pub struct FixedLexicalSource {
    table: HashMap<String, LexicalRelatives>,
}

impl FixedLexicalSource {
    pub fn new(table: HashMap<String, LexicalRelatives>) -> Self {
        Self { table }
    }

    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }
}

impl LexicalSource for FixedLexicalSource {
    fn related(&self, term: &str) -> Result<LexicalRelatives, String> {
        Ok(self.table.get(term).cloned().unwrap_or_default())
    }
}

pub fn test_logger() -> Logger {
    Logger::new("test", Level::Debug)
}

pub fn sample_catalog(id: u32, source: &str, title: &str, vector: Vec<f32>) -> Catalog {
    Catalog {
        id,
        source: source.to_string(),
        title: title.to_string(),
        author: String::new(),
        year: None,
        publisher: String::new(),
        isbn: String::new(),
        summary: title.to_string(),
        content_hash: "deadbeef".to_string(),
        vector,
        concept_ids: vec![],
        category_ids: vec![],
        concept_names: vec![],
        category_names: vec![],
    }
}

pub fn sample_chunk(id: u32, catalog_id: u32, text: &str, vector: Vec<f32>) -> Chunk {
    Chunk {
        id,
        catalog_id,
        text: text.to_string(),
        content_hash: "deadbeef".to_string(),
        vector,
        page_number: None,
        concept_ids: vec![],
        concept_density: 0.0,
        catalog_title: String::new(),
        concept_names: vec![],
    }
}

pub fn sample_concept(id: u32, name: &str, vector: Vec<f32>) -> Concept {
    Concept {
        id,
        name: name.to_string(),
        summary: format!("{name} summary"),
        catalog_ids: vec![],
        chunk_ids: vec![],
        adjacent_ids: vec![],
        related_ids: vec![],
        synonyms: vec![],
        broader_terms: vec![],
        narrower_terms: vec![],
        weight: 0.5,
        vector,
        catalog_titles: vec![],
    }
}

pub fn sample_category(id: u32, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        description: String::new(),
        summary: String::new(),
        parent_category_id: None,
        aliases: vec![],
        related_category_ids: vec![],
        document_count: 0,
        chunk_count: 0,
        concept_count: 0,
        vector: vec![0.0; 384],
    }
}
