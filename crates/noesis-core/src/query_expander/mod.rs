mod expander;

pub use expander::{expand, ExpansionResult, LexicalRelatives, LexicalSource};
