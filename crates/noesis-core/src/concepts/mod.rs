mod index;

pub use index::{normalize_name, CategoryIndexBuilder, ConceptIndexBuilder, ExtractedConcept, SeededDocument};
