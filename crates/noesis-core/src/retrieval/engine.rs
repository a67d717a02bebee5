//! The ten retrieval and browsing operations (spec §4.8, §6.1), built on
//! the scoring primitive, the query expander, and the store adapter.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::embeddings::EmbeddingProvider;
use crate::error::{NoesisError, Result};
use crate::hash::id_of;
use crate::observability::Logger;
use crate::query_expander::{self, LexicalSource};
use crate::scoring::{self, CandidateInput, ScoreWeights};
use crate::store::{Catalog, Category, Concept, Store};

use super::contracts::{
    CatalogSearchInput, CatalogSearchResult, CategorySort, ChunkSearchResult, ConceptProjection,
    ConceptSearchResult, ExtractConceptsInput, ExtractConceptsResult, TaggedSource,
};

const CATALOG_POOL_SIZE: usize = 40;
const CATALOG_RESULT_LIMIT: usize = 10;
const SCOPED_CHUNK_RESULT_LIMIT: usize = 5;
const CONCEPT_SEARCH_DEFAULT_LIMIT: usize = 10;
const FUZZY_EDIT_DISTANCE: usize = 2;

pub struct RetrievalEngine {
    store: Arc<Store>,
    embedder: Arc<dyn EmbeddingProvider>,
    lexical_source: Arc<dyn LexicalSource>,
    logger: Logger,
}

impl RetrievalEngine {
    pub fn new(store: Arc<Store>, embedder: Arc<dyn EmbeddingProvider>, lexical_source: Arc<dyn LexicalSource>, logger: Logger) -> Self {
        Self { store, embedder, lexical_source, logger }
    }

    fn expanded_terms(&self, text: &str) -> Vec<String> {
        query_expander::expand(text, self.lexical_source.as_ref(), &self.logger, None).expansions
    }

    // ---- §4.8 catalog search ----

    pub fn catalog_search(&self, input: &CatalogSearchInput) -> Result<Vec<CatalogSearchResult>> {
        let query_vector = self.embedder.embed(&input.text)?;
        let candidates = self.store.catalog_vector_search(&query_vector, CATALOG_POOL_SIZE);
        let rows: Vec<Catalog> = candidates.iter().filter_map(|(id, _)| self.store.get_catalog(*id).ok().flatten()).collect();
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let raw_cosine: HashMap<u32, f32> = candidates.into_iter().collect();
        let expanded = self.expanded_terms(&input.text);
        let query_tokens = scoring::tokenize(&input.text);

        let corpus: Vec<Vec<String>> = rows.iter().map(|r| scoring::tokenize(&format!("{} {}", r.title, r.summary))).collect();
        let bm25 = scoring::bm25_scores(&query_tokens, &corpus);

        let candidate_inputs: Vec<CandidateInput> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| CandidateInput {
                id: row.id,
                vector_score: raw_cosine.get(&row.id).map(|c| (c + 1.0) / 2.0).unwrap_or(0.0),
                bm25_score: bm25[i],
                gamma_score: scoring::title_match_score(&input.text, &format!("{} {}", row.title, row.source)),
                delta_score: scoring::expansion_overlap_score(&expanded, &corpus[i].join(" ")),
                tie_key: row.source.clone(),
            })
            .collect();

        let ranked = scoring::rank(ScoreWeights::CATALOG_SEARCH, candidate_inputs);
        let by_id: HashMap<u32, &Catalog> = rows.iter().map(|r| (r.id, r)).collect();

        Ok(ranked
            .into_iter()
            .take(CATALOG_RESULT_LIMIT)
            .filter_map(|scored| {
                by_id.get(&scored.id).map(|row| CatalogSearchResult {
                    id: row.id,
                    title: row.title.clone(),
                    source: row.source.clone(),
                    score: scored.score,
                    breakdown: input.debug.then_some(scored.breakdown),
                })
            })
            .collect())
    }

    // ---- §4.8 broad chunk search ----

    pub fn broad_chunk_search(&self, text: &str, limit: Option<usize>) -> Result<Vec<ChunkSearchResult>> {
        let limit = limit.unwrap_or(CONCEPT_SEARCH_DEFAULT_LIMIT).max(1);
        let query_vector = self.embedder.embed(text)?;
        let pool_size = 4 * limit;
        let candidates = self.store.chunk_vector_search(&query_vector, pool_size, |_| true);
        self.score_chunk_candidates(text, candidates, ScoreWeights::BROAD_CHUNK_SEARCH, limit)
    }

    // ---- §4.8 scoped chunk search ----

    pub fn scoped_chunk_search(&self, text: &str, source: &str, _debug: bool) -> Result<Vec<ChunkSearchResult>> {
        let catalog_id = id_of(source);
        let mut chunks = self.store.chunks_for_catalog(catalog_id)?;

        if chunks.is_empty() {
            let needle = std::path::Path::new(source).file_stem().and_then(|s| s.to_str()).unwrap_or(source);
            let matches = self.store.find_catalog_title_substring(needle)?;
            if let Some(fallback) = matches.into_iter().next() {
                self.logger.info(&format!("scoped chunk search: no catalog match for '{source}', falling back to title substring match '{}'", fallback.title));
                chunks = self.store.chunks_for_catalog(fallback.id)?;
            }
        }

        let candidates: Vec<(u32, f32)> = {
            let query_vector = self.embedder.embed(text)?;
            chunks.iter().map(|c| (c.id, scoring::vector_score(&query_vector, &c.vector) * 2.0 - 1.0)).collect()
        };

        self.score_chunk_candidates(text, candidates, ScoreWeights::SCOPED_CHUNK_SEARCH, SCOPED_CHUNK_RESULT_LIMIT)
    }

    fn score_chunk_candidates(&self, text: &str, candidates: Vec<(u32, f32)>, weights: ScoreWeights, limit: usize) -> Result<Vec<ChunkSearchResult>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<u32> = candidates.iter().map(|(id, _)| *id).collect();
        let rows = self.store.chunks_by_ids(&ids)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let raw_cosine: HashMap<u32, f32> = candidates.into_iter().collect();

        let expanded = self.expanded_terms(text);
        let query_tokens = scoring::tokenize(text);
        let corpus: Vec<Vec<String>> = rows.iter().map(|r| scoring::tokenize(&r.text)).collect();
        let bm25 = scoring::bm25_scores(&query_tokens, &corpus);

        let candidate_inputs: Vec<CandidateInput> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| CandidateInput {
                id: row.id,
                vector_score: raw_cosine.get(&row.id).map(|c| (c + 1.0) / 2.0).unwrap_or(0.0),
                bm25_score: bm25[i],
                gamma_score: 0.0,
                delta_score: scoring::expansion_overlap_score(&expanded, &row.text),
                tie_key: row.text.clone(),
            })
            .collect();

        let ranked = scoring::rank(weights, candidate_inputs);
        let by_id: HashMap<u32, &crate::store::Chunk> = rows.iter().map(|r| (r.id, r)).collect();

        Ok(ranked
            .into_iter()
            .take(limit)
            .filter_map(|scored| {
                by_id.get(&scored.id).map(|row| ChunkSearchResult {
                    id: row.id,
                    catalog_id: row.catalog_id,
                    catalog_title: row.catalog_title.clone(),
                    text: row.text.clone(),
                    score: scored.score,
                    concept_density: row.concept_density,
                })
            })
            .collect())
    }

    // ---- §4.8 concept search ----

    pub fn concept_search(&self, concept: &str, limit: Option<usize>) -> Result<ConceptSearchResult> {
        let limit = limit.unwrap_or(CONCEPT_SEARCH_DEFAULT_LIMIT).max(1);
        let normalized = crate::concepts::normalize_name(concept);

        let (resolved, exact_match) = match self.store.find_concept_by_name(&normalized)? {
            Some(c) => (Some(c), true),
            None => {
                let all = self.store.all_concepts()?;
                let fuzzy = all
                    .into_iter()
                    .map(|c| (scoring::levenshtein(&normalized, &c.name), c))
                    .filter(|(distance, _)| *distance <= FUZZY_EDIT_DISTANCE)
                    .min_by_key(|(distance, _)| *distance)
                    .map(|(_, c)| c);

                match fuzzy {
                    Some(c) => (Some(c), false),
                    None => {
                        let query_vector = self.embedder.embed(&normalized)?;
                        let nearest = self.store.concept_vector_search(&query_vector, 1);
                        let resolved = nearest.first().and_then(|(id, _)| self.store.get_concept(*id).ok().flatten());
                        (resolved, false)
                    }
                }
            }
        };

        let Some(concept_row) = resolved else {
            return Ok(ConceptSearchResult { concept_id: 0, exact_match: false, chunks: Vec::new(), source_catalog_ids: Vec::new() });
        };

        let mut chunks = self.store.chunks_by_ids(&concept_row.chunk_ids)?;
        let expanded = self.expanded_terms(concept);
        let query_tokens = scoring::tokenize(concept);
        let corpus: Vec<Vec<String>> = chunks.iter().map(|c| scoring::tokenize(&c.text)).collect();
        let bm25 = scoring::bm25_scores(&query_tokens, &corpus);
        let name_match = scoring::name_match_score(concept, &concept_row.name);
        let synonym_overlap = scoring::synonym_overlap_score(&concept_row.synonyms, concept);

        let mut scored: Vec<(f32, f64, &crate::store::Chunk)> = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let vector_score = scoring::vector_score(&concept_row.vector, &c.vector);
                let score = ScoreWeights::CONCEPT_SEARCH.alpha * vector_score
                    + ScoreWeights::CONCEPT_SEARCH.beta * bm25[i]
                    + ScoreWeights::CONCEPT_SEARCH.gamma * name_match
                    + ScoreWeights::CONCEPT_SEARCH.delta * synonym_overlap;
                (score, c.concept_density, c)
            })
            .collect();
        // Spec §4.8: sort by concept_density desc, then score.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.0.total_cmp(&a.0)));

        let results: Vec<ChunkSearchResult> = scored
            .into_iter()
            .take(limit)
            .map(|(score, density, c)| ChunkSearchResult {
                id: c.id,
                catalog_id: c.catalog_id,
                catalog_title: c.catalog_title.clone(),
                text: c.text.clone(),
                score,
                concept_density: density,
            })
            .collect();
        chunks.clear();

        Ok(ConceptSearchResult {
            concept_id: concept_row.id,
            exact_match,
            chunks: results,
            source_catalog_ids: concept_row.catalog_ids,
        })
    }

    // ---- §4.8 extract concepts ----

    pub fn extract_concepts(&self, input: &ExtractConceptsInput) -> Result<ExtractConceptsResult> {
        let top = self.catalog_search(&CatalogSearchInput { text: input.document_query.clone(), debug: false })?;
        let Some(best) = top.into_iter().next() else {
            return Err(NoesisError::NotFound(format!("no document matches '{}'", input.document_query)));
        };
        let catalog = self.store.get_catalog(best.id)?.ok_or_else(|| NoesisError::NotFound(best.id.to_string()))?;

        let concepts = catalog
            .concept_ids
            .iter()
            .zip(catalog.concept_names.iter())
            .map(|(id, name)| {
                let summary = if input.include_summary {
                    self.store.get_concept(*id).ok().flatten().map(|c| c.summary)
                } else {
                    None
                };
                ConceptProjection { id: *id, name: name.clone(), summary }
            })
            .collect();

        Ok(ExtractConceptsResult { catalog_id: catalog.id, concepts })
    }

    // ---- browsing: list categories ----

    pub fn list_categories(&self, substring: Option<&str>, sort: CategorySort) -> Result<Vec<Category>> {
        let mut rows = self.store.all_categories()?;
        if let Some(needle) = substring {
            let needle = needle.to_lowercase();
            rows.retain(|c| c.name.to_lowercase().contains(&needle));
        }
        match sort {
            CategorySort::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            CategorySort::Popularity | CategorySort::DocumentCount => rows.sort_by(|a, b| b.document_count.cmp(&a.document_count)),
        }
        Ok(rows)
    }

    // ---- browsing: category browse ----

    pub fn category_browse(&self, name: &str, include_children: bool, limit: usize) -> Result<Vec<Catalog>> {
        let Some(root) = self.store.find_category_by_name(name)? else {
            return Ok(Vec::new());
        };
        let mut names = vec![root.name.clone()];
        if include_children {
            let all = self.store.all_categories()?;
            names.extend(self.descendant_names(&all, root.id));
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for n in &names {
            for doc in self.store.catalog_with_category_name(n)? {
                if seen.insert(doc.id) {
                    out.push(doc);
                }
                if out.len() >= limit {
                    return Ok(out);
                }
            }
        }
        Ok(out)
    }

    fn descendant_names(&self, all: &[Category], parent_id: u32) -> Vec<String> {
        let mut out = Vec::new();
        for child in all.iter().filter(|c| c.parent_category_id == Some(parent_id)) {
            out.push(child.name.clone());
            out.extend(self.descendant_names(all, child.id));
        }
        out
    }

    // ---- browsing: concepts in category ----

    pub fn concepts_in_category(&self, name: &str) -> Result<Vec<Concept>> {
        let docs = self.store.catalog_with_category_name(name)?;
        let mut concept_ids: HashSet<u32> = HashSet::new();
        for doc in &docs {
            concept_ids.extend(doc.concept_ids.iter().copied());
        }
        let mut out = Vec::with_capacity(concept_ids.len());
        for id in concept_ids {
            if let Some(concept) = self.store.get_concept(id)? {
                out.push(concept);
            }
        }
        Ok(out)
    }

    // ---- browsing: concept -> sources ----

    pub fn concept_to_sources_union(&self, concept_names: &[String]) -> Result<Vec<TaggedSource>> {
        let mut matches: HashMap<u32, Vec<usize>> = HashMap::new();
        for (index, name) in concept_names.iter().enumerate() {
            let normalized = crate::concepts::normalize_name(name);
            if let Some(concept) = self.store.find_concept_by_name(&normalized)? {
                for catalog_id in concept.catalog_ids {
                    matches.entry(catalog_id).or_default().push(index);
                }
            }
        }
        let mut sources: Vec<TaggedSource> = matches
            .into_iter()
            .map(|(catalog_id, matched_concept_indices)| TaggedSource { catalog_id, matched_concept_indices })
            .collect();
        sources.sort_by(|a, b| b.matched_concept_indices.len().cmp(&a.matched_concept_indices.len()).then(a.catalog_id.cmp(&b.catalog_id)));
        Ok(sources)
    }

    pub fn concept_to_sources_per_concept(&self, concept_names: &[String]) -> Result<Vec<Vec<u32>>> {
        let mut out = Vec::with_capacity(concept_names.len());
        for name in concept_names {
            let normalized = crate::concepts::normalize_name(name);
            let ids = self.store.find_concept_by_name(&normalized)?.map(|c| c.catalog_ids).unwrap_or_default();
            out.push(ids);
        }
        Ok(out)
    }
}
