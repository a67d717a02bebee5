//! Weighted fusion of vector, BM25, title/name-match, and expansion
//! signals into a single ranked list (spec §4.8).

use std::collections::HashSet;

use super::tokenize;
use crate::embeddings::cosine_similarity;

/// `(alpha, beta, gamma, delta)` weight vector. For concept search, `gamma`
/// multiplies a name-match score (not title) and `delta` multiplies
/// synonym overlap (not general query expansion) — see §4.8 footnotes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub delta: f32,
}

impl ScoreWeights {
    pub const CATALOG_SEARCH: Self = Self { alpha: 0.30, beta: 0.30, gamma: 0.25, delta: 0.15 };
    pub const BROAD_CHUNK_SEARCH: Self = Self { alpha: 0.40, beta: 0.40, gamma: 0.0, delta: 0.20 };
    pub const SCOPED_CHUNK_SEARCH: Self = Self::BROAD_CHUNK_SEARCH;
    pub const CONCEPT_SEARCH: Self = Self { alpha: 0.30, beta: 0.20, gamma: 0.40, delta: 0.10 };

    pub fn sum(&self) -> f32 {
        self.alpha + self.beta + self.gamma + self.delta
    }
}

/// A candidate row plus its precomputed raw signals, ready to be combined.
#[derive(Debug, Clone)]
pub struct CandidateInput {
    pub id: u32,
    pub vector_score: f32,
    pub bm25_score: f32,
    /// Title/path substring score, or concept name-match score.
    pub gamma_score: f32,
    /// Query-expansion overlap score, or synonym overlap score.
    pub delta_score: f32,
    /// Secondary tie-break key (spec §4.8: "lexicographically smaller
    /// identifier column").
    pub tie_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub vector: f32,
    pub bm25: f32,
    pub gamma: f32,
    pub delta: f32,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub id: u32,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
}

/// `(cosine + 1) / 2`, mapping `[-1, 1]` cosine similarity into `[0, 1]`.
pub fn vector_score(query_vector: &[f32], candidate_vector: &[f32]) -> f32 {
    let cosine = cosine_similarity(query_vector, candidate_vector);
    (cosine + 1.0) / 2.0
}

/// Fraction of query tokens present (as substrings) in `haystack`,
/// 1.0 if all appear, 0.0 if none.
pub fn title_match_score(query: &str, haystack: &str) -> f32 {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return 0.0;
    }
    let haystack_lower = haystack.to_lowercase();
    let matched = query_tokens.iter().filter(|t| haystack_lower.contains(t.as_str())).count();
    matched as f32 / query_tokens.len() as f32
}

/// `|expanded_terms ∩ tokens(text)| / max(1, |expanded_terms|)`.
pub fn expansion_overlap_score(expanded_terms: &[String], text: &str) -> f32 {
    if expanded_terms.is_empty() {
        return 0.0;
    }
    let text_tokens: HashSet<String> = tokenize(text).into_iter().collect();
    let matched = expanded_terms.iter().filter(|t| text_tokens.contains(t.as_str())).count();
    matched as f32 / expanded_terms.len().max(1) as f32
}

/// `1 - levenshtein(query, name) / max(len(query), len(name))`, clamped
/// to `[0, 1]`. Used as the γ signal for concept search.
pub fn name_match_score(query: &str, name: &str) -> f32 {
    let distance = levenshtein(query, name);
    let max_len = query.chars().count().max(name.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (1.0 - distance as f32 / max_len as f32).clamp(0.0, 1.0)
}

/// Fraction of a concept's synonyms present in the tokenized query.
pub fn synonym_overlap_score(synonyms: &[String], query: &str) -> f32 {
    if synonyms.is_empty() {
        return 0.0;
    }
    let query_tokens: HashSet<String> = tokenize(query).into_iter().collect();
    let synonym_tokens: HashSet<String> = synonyms.iter().map(|s| s.to_lowercase()).collect();
    let matched = synonym_tokens.intersection(&query_tokens).count();
    matched as f32 / synonyms.len().max(1) as f32
}

/// Levenshtein edit distance, exposed for fuzzy concept-name resolution
/// (spec §4.8 concept search step c).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j - 1])
            };
            prev_diag = temp;
        }
    }
    row[b.len()]
}

/// Combine every candidate's signals via `weights`, then sort by score
/// descending, smaller id, then smaller tie key (spec §4.8 tie-breaking).
pub fn rank(weights: ScoreWeights, candidates: Vec<CandidateInput>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .map(|c| {
            let score = weights.alpha * c.vector_score
                + weights.beta * c.bm25_score
                + weights.gamma * c.gamma_score
                + weights.delta * c.delta_score;
            ScoredCandidate {
                id: c.id,
                score,
                breakdown: ScoreBreakdown { vector: c.vector_score, bm25: c.bm25_score, gamma: c.gamma_score, delta: c.delta_score },
            }
        })
        .collect();

    let tie_keys: std::collections::HashMap<u32, &str> = candidates.iter().map(|c| (c.id, c.tie_key.as_str())).collect();
    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.id.cmp(&b.id))
            .then(tie_keys[&a.id].cmp(tie_keys[&b.id]))
    });
    scored
}
