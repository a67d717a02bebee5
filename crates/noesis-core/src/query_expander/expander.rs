//! Bounded semantic expansion of query terms (spec §4.9). The lexical
//! knowledge source is an external collaborator — failures must degrade
//! to the original terms rather than fail the query.

use crate::observability::Logger;
use crate::scoring::tokenize;

const DEFAULT_CAP: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalRelatives {
    pub synonyms: Vec<String>,
    pub broader: Vec<String>,
    pub narrower: Vec<String>,
}

/// External lexical knowledge source (e.g. WordNet-backed). Implementations
/// may fail (network, missing term); callers must not propagate that
/// failure to the query.
pub trait LexicalSource: Send + Sync {
    fn related(&self, term: &str) -> Result<LexicalRelatives, String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionResult {
    pub original_terms: Vec<String>,
    pub expansions: Vec<String>,
}

/// Expand `text` into its tokenized original terms plus up to `cap`
/// semantic relatives drawn from `source`. On source failure, logs a
/// warning and returns only the original terms.
pub fn expand(text: &str, source: &dyn LexicalSource, logger: &Logger, cap: Option<usize>) -> ExpansionResult {
    let original_terms = tokenize(text);
    let cap = cap.unwrap_or(DEFAULT_CAP);

    let mut expansions = Vec::new();
    for term in &original_terms {
        if expansions.len() >= cap {
            break;
        }
        match source.related(term) {
            Ok(relatives) => {
                for candidate in relatives.synonyms.into_iter().chain(relatives.broader).chain(relatives.narrower) {
                    if expansions.len() >= cap {
                        break;
                    }
                    if !original_terms.contains(&candidate) && !expansions.contains(&candidate) {
                        expansions.push(candidate);
                    }
                }
            }
            Err(reason) => {
                logger.warn(&format!("lexical source failed for term '{term}': {reason}"));
            }
        }
    }

    ExpansionResult { original_terms, expansions }
}
