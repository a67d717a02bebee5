//! BM25 over the candidate pool rather than the whole corpus, to keep
//! scoring incremental (spec §4.8).

use std::collections::HashMap;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Score every document in `corpus` against `query_tokens` using standard
/// BM25 with document frequency computed over `corpus` itself, then
/// min-max normalize into `[0, 1]` so the result composes with the other
/// signals in the hybrid sum.
pub fn bm25_scores(query_tokens: &[String], corpus: &[Vec<String>]) -> Vec<f32> {
    if corpus.is_empty() || query_tokens.is_empty() {
        return vec![0.0; corpus.len()];
    }

    let n = corpus.len() as f64;
    let avg_len = corpus.iter().map(|d| d.len() as f64).sum::<f64>() / n;

    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for term in query_tokens {
        let df = corpus.iter().filter(|doc| doc.contains(term)).count();
        doc_freq.insert(term.as_str(), df);
    }

    let mut raw_scores = Vec::with_capacity(corpus.len());
    for doc in corpus {
        let doc_len = doc.len() as f64;
        let mut score = 0.0;
        for term in query_tokens {
            let df = *doc_freq.get(term.as_str()).unwrap_or(&0);
            if df == 0 {
                continue;
            }
            let idf = ((n - df as f64 + 0.5) / (df as f64 + 0.5) + 1.0).ln();
            let tf = doc.iter().filter(|w| *w == term).count() as f64;
            let denom = tf + K1 * (1.0 - B + B * (doc_len / avg_len.max(1.0)));
            if denom > 0.0 {
                score += idf * (tf * (K1 + 1.0)) / denom;
            }
        }
        raw_scores.push(score);
    }

    let max_score = raw_scores.iter().cloned().fold(0.0_f64, f64::max);
    if max_score <= 0.0 {
        return vec![0.0; corpus.len()];
    }
    raw_scores.into_iter().map(|s| (s / max_score) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn document_matching_all_query_terms_scores_highest() {
        let corpus = vec![
            tokens(&["art", "of", "war", "strategy", "strategy"]),
            tokens(&["a", "cookbook", "of", "recipes"]),
        ];
        let scores = bm25_scores(&tokens(&["war", "strategy"]), &corpus);
        assert!(scores[0] > scores[1]);
        assert_eq!(scores[0], 1.0);
    }

    #[test]
    fn no_matches_scores_all_zero() {
        let corpus = vec![tokens(&["alpha", "beta"]), tokens(&["gamma", "delta"])];
        let scores = bm25_scores(&tokens(&["omega"]), &corpus);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn empty_query_scores_all_zero() {
        let corpus = vec![tokens(&["alpha", "beta"])];
        let scores = bm25_scores(&[], &corpus);
        assert_eq!(scores, vec![0.0]);
    }
}
