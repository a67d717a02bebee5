//! Concept extraction and indexing pipeline (spec §4.7): normalize,
//! deduplicate/merge, adjacency (co-occurrence) linking, lexical
//! relatedness linking, and weight computation.

use std::collections::{HashMap, HashSet};

use crate::hash::id_of;
use crate::store::{Category, Concept};

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "this", "that", "have", "has", "are", "was", "were",
    "their", "about", "into", "than", "then", "also", "such", "each", "more", "most", "some",
    "other", "which", "where", "when", "what", "there", "these", "those", "been", "being",
];

const MIN_RELATED_WORD_LEN: usize = 5;
const DEFAULT_ADJACENCY_CAP: usize = 64;
const DEFAULT_RELATED_CAP: usize = 32;

/// One (name, per-document-summary) pair surfaced by the LLM extractor.
#[derive(Debug, Clone)]
pub struct ExtractedConcept {
    pub name: String,
    pub summary: String,
}

/// One document's extraction result, as consumed from the seeder.
#[derive(Debug, Clone)]
pub struct SeededDocument {
    pub catalog_id: u32,
    pub concepts: Vec<ExtractedConcept>,
    pub categories: Vec<String>,
}

/// Lowercase, collapse internal whitespace, strip leading/trailing
/// punctuation (spec §4.7 step 1).
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

#[derive(Default)]
struct Accumulator {
    concept: Concept,
    chunk_ids: HashSet<u32>,
    catalog_ids: HashSet<u32>,
    adjacency_counts: HashMap<u32, u32>,
}

/// Accumulates concepts across an entire seeding run, then finalizes
/// adjacency/relatedness/weight in one pass.
pub struct ConceptIndexBuilder {
    accumulators: HashMap<u32, Accumulator>,
    adjacency_cap: usize,
    related_cap: usize,
}

impl Default for ConceptIndexBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ADJACENCY_CAP, DEFAULT_RELATED_CAP)
    }
}

impl ConceptIndexBuilder {
    pub fn new(adjacency_cap: usize, related_cap: usize) -> Self {
        Self {
            accumulators: HashMap::new(),
            adjacency_cap,
            related_cap,
        }
    }

    fn entry(&mut self, name: &str) -> &mut Accumulator {
        let id = id_of(name);
        self.accumulators.entry(id).or_insert_with(|| Accumulator {
            concept: Concept {
                id,
                name: name.to_string(),
                summary: String::new(),
                catalog_ids: vec![],
                chunk_ids: vec![],
                adjacent_ids: vec![],
                related_ids: vec![],
                synonyms: vec![],
                broader_terms: vec![],
                narrower_terms: vec![],
                weight: 0.0,
                vector: vec![],
                catalog_titles: vec![],
            },
            chunk_ids: HashSet::new(),
            catalog_ids: HashSet::new(),
            adjacency_counts: HashMap::new(),
        })
    }

    /// Ingest one document's extraction, deduplicating concept names,
    /// unioning `catalog_ids`, keeping the earliest non-empty summary, and
    /// recording co-occurrence between every pair of its concepts.
    pub fn ingest(&mut self, doc: &SeededDocument) {
        let mut ids_in_doc = Vec::with_capacity(doc.concepts.len());
        for extracted in &doc.concepts {
            let name = normalize_name(&extracted.name);
            if name.is_empty() {
                continue;
            }
            let id = id_of(&name);
            ids_in_doc.push(id);

            let acc = self.entry(&name);
            if acc.catalog_ids.insert(doc.catalog_id) {
                acc.concept.catalog_ids.push(doc.catalog_id);
            }
            if acc.concept.summary.is_empty() && !extracted.summary.is_empty() {
                acc.concept.summary = extracted.summary.clone();
            }
        }

        for i in 0..ids_in_doc.len() {
            for j in 0..ids_in_doc.len() {
                if i == j {
                    continue;
                }
                let (a, b) = (ids_in_doc[i], ids_in_doc[j]);
                if let Some(acc) = self.accumulators.get_mut(&a) {
                    *acc.adjacency_counts.entry(b).or_insert(0) += 1;
                }
            }
        }
    }

    /// Attach a chunk to a concept once chunks have been embedded.
    pub fn attach_chunk(&mut self, concept_id: u32, chunk_id: u32) {
        if let Some(acc) = self.accumulators.get_mut(&concept_id) {
            if acc.chunk_ids.insert(chunk_id) {
                acc.concept.chunk_ids.push(chunk_id);
            }
        }
    }

    /// Apply adjacency capping, lexical relatedness linking, and weight
    /// computation, returning the finalized concepts (spec §4.7 steps 3-5).
    pub fn finalize(mut self) -> Vec<Concept> {
        for acc in self.accumulators.values_mut() {
            let mut pairs: Vec<(u32, u32)> = acc.adjacency_counts.iter().map(|(id, count)| (*id, *count)).collect();
            pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            pairs.truncate(self.adjacency_cap);
            acc.concept.adjacent_ids = pairs.into_iter().map(|(id, _)| id).collect();
        }

        let word_sets: HashMap<u32, HashSet<String>> = self
            .accumulators
            .iter()
            .map(|(id, acc)| {
                let words = tokenize(&acc.concept.name)
                    .into_iter()
                    .filter(|w| w.len() >= MIN_RELATED_WORD_LEN && !STOPWORDS.contains(&w.as_str()))
                    .collect();
                (*id, words)
            })
            .collect();

        let mut related: HashMap<u32, Vec<(u32, usize)>> = HashMap::new();
        let ids: Vec<u32> = self.accumulators.keys().copied().collect();
        for (i, &a) in ids.iter().enumerate() {
            for &b in ids.iter().skip(i + 1) {
                let shared = word_sets[&a].intersection(&word_sets[&b]).count();
                if shared == 0 {
                    continue;
                }
                related.entry(a).or_default().push((b, shared));
                related.entry(b).or_default().push((a, shared));
            }
        }

        for (id, acc) in self.accumulators.iter_mut() {
            if let Some(mut links) = related.remove(id) {
                links.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));
                links.truncate(self.related_cap);
                acc.concept.related_ids = links.into_iter().map(|(other, _)| other).collect();
            }
        }

        let max_chunk_count = self.accumulators.values().map(|a| a.chunk_ids.len()).max().unwrap_or(0);
        for acc in self.accumulators.values_mut() {
            acc.concept.weight = weight_for(acc.chunk_ids.len(), max_chunk_count);
        }

        self.accumulators.into_values().map(|acc| acc.concept).collect()
    }
}

/// `clamp(log(1 + chunk_count) / log(1 + max_chunk_count), 0, 1)`.
pub fn weight_for(chunk_count: usize, max_chunk_count: usize) -> f64 {
    if max_chunk_count == 0 {
        return 0.0;
    }
    let value = (1.0 + chunk_count as f64).ln() / (1.0 + max_chunk_count as f64).ln();
    value.clamp(0.0, 1.0)
}

/// Accumulates categories across an entire seeding run. Unlike concepts,
/// categories carry no adjacency or relatedness — just dedup-by-name and
/// the catalog ids that named them. Counts are left at zero; they are
/// filled in by `Store::regenerate_derived_columns`.
#[derive(Default)]
pub struct CategoryIndexBuilder {
    names: HashMap<u32, String>,
}

impl CategoryIndexBuilder {
    /// Ingest one document's category labels, deduplicating by normalized
    /// name.
    pub fn ingest(&mut self, doc: &SeededDocument) {
        for raw in &doc.categories {
            let name = normalize_name(raw);
            if name.is_empty() {
                continue;
            }
            self.names.entry(id_of(&name)).or_insert(name);
        }
    }

    pub fn finalize(self) -> Vec<Category> {
        self.names
            .into_iter()
            .map(|(id, name)| Category {
                id,
                name,
                description: String::new(),
                summary: String::new(),
                parent_category_id: None,
                aliases: vec![],
                related_category_ids: vec![],
                document_count: 0,
                chunk_count: 0,
                concept_count: 0,
                vector: vec![],
            })
            .collect()
    }
}
