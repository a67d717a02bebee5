mod models;
mod schema;
mod sqlite;
mod vector_index;

pub use models::{Catalog, Category, Chunk, Concept};
pub use sqlite::Store;
pub use vector_index::{VectorIndex, VectorIndexConfig};
