mod bm25;
mod hybrid;

pub use bm25::bm25_scores;
pub use hybrid::{
    expansion_overlap_score, levenshtein, name_match_score, rank, synonym_overlap_score,
    title_match_score, vector_score, CandidateInput, ScoreBreakdown, ScoreWeights, ScoredCandidate,
};

pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
