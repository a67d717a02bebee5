//! The SQLite-backed vector store adapter (spec §4.6).
//!
//! Follows the teacher's `Storage` shape: a single writer connection
//! guarded by a mutex, a separate reader connection for concurrent reads,
//! and an in-memory vector index rebuilt from the table contents.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{NoesisError, Result};

use super::models::{Catalog, Category, Chunk, Concept};
use super::schema::apply_migrations;
use super::vector_index::{VectorIndex, VectorIndexConfig};

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

fn ids_to_json(ids: &[u32]) -> String {
    serde_json::to_string(ids).expect("u32 array serialization cannot fail")
}

fn ids_from_json(text: &str) -> Vec<u32> {
    serde_json::from_str(text).unwrap_or_default()
}

fn names_to_json(names: &[String]) -> String {
    serde_json::to_string(names).expect("string array serialization cannot fail")
}

fn names_from_json(text: &str) -> Vec<String> {
    serde_json::from_str(text).unwrap_or_default()
}

/// Normalized four-table store: catalog, chunks, concepts, categories,
/// plus an in-memory vector index per table rebuilt on open and after
/// batch writes.
pub struct Store {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    catalog_index: Mutex<VectorIndex>,
    chunk_index: Mutex<VectorIndex>,
    concept_index: Mutex<VectorIndex>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let writer = Connection::open(&path)?;
        configure_connection(&writer)?;
        apply_migrations(&writer)?;

        let reader = Connection::open(&path)?;
        configure_connection(&reader)?;

        let store = Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            catalog_index: Mutex::new(VectorIndex::new(VectorIndexConfig::default())),
            chunk_index: Mutex::new(VectorIndex::new(VectorIndexConfig::default())),
            concept_index: Mutex::new(VectorIndex::new(VectorIndexConfig::default())),
        };
        store.rebuild_indices()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let writer = Connection::open_in_memory()?;
        configure_connection(&writer)?;
        apply_migrations(&writer)?;
        let reader = Connection::open_in_memory()?;
        configure_connection(&reader)?;
        apply_migrations(&reader)?;

        Ok(Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
            catalog_index: Mutex::new(VectorIndex::new(VectorIndexConfig::default())),
            chunk_index: Mutex::new(VectorIndex::new(VectorIndexConfig::default())),
            concept_index: Mutex::new(VectorIndex::new(VectorIndexConfig::default())),
        })
    }

    fn writer(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.writer.lock().expect("store writer lock poisoned")
    }

    pub fn rebuild_indices(&self) -> Result<()> {
        let conn = self.writer();
        let mut catalog_entries = Vec::new();
        let mut stmt = conn.prepare("SELECT id, vector FROM catalog")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, blob_to_vector(&row.get::<_, Vec<u8>>(1)?))))?;
        for row in rows {
            catalog_entries.push(row?);
        }
        drop(stmt);
        self.catalog_index.lock().expect("index lock poisoned").build(catalog_entries);

        let mut chunk_entries = Vec::new();
        let mut stmt = conn.prepare("SELECT id, vector FROM chunks")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, blob_to_vector(&row.get::<_, Vec<u8>>(1)?))))?;
        for row in rows {
            chunk_entries.push(row?);
        }
        drop(stmt);
        self.chunk_index.lock().expect("index lock poisoned").build(chunk_entries);

        let mut concept_entries = Vec::new();
        let mut stmt = conn.prepare("SELECT id, vector FROM concepts")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, blob_to_vector(&row.get::<_, Vec<u8>>(1)?))))?;
        for row in rows {
            concept_entries.push(row?);
        }
        drop(stmt);
        self.concept_index.lock().expect("index lock poisoned").build(concept_entries);

        Ok(())
    }

    // ---- catalog ----

    pub fn upsert_catalog_batch(&self, rows: &[Catalog]) -> Result<()> {
        let mut conn = self.writer();
        let tx = conn.transaction()?;
        for row in rows {
            tx.execute(
                "INSERT INTO catalog (id, source, title, author, year, publisher, isbn, summary, content_hash, vector, concept_ids, category_ids, concept_names, category_names)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)
                 ON CONFLICT(id) DO UPDATE SET
                   source=excluded.source, title=excluded.title, author=excluded.author, year=excluded.year,
                   publisher=excluded.publisher, isbn=excluded.isbn, summary=excluded.summary, content_hash=excluded.content_hash,
                   vector=excluded.vector, concept_ids=excluded.concept_ids, category_ids=excluded.category_ids,
                   concept_names=excluded.concept_names, category_names=excluded.category_names",
                params![
                    row.id, row.source, row.title, row.author, row.year, row.publisher, row.isbn, row.summary,
                    row.content_hash, vector_to_blob(&row.vector), ids_to_json(&row.concept_ids), ids_to_json(&row.category_ids),
                    names_to_json(&row.concept_names), names_to_json(&row.category_names),
                ],
            )?;
        }
        tx.commit()?;
        drop(conn);
        self.rebuild_indices()
    }

    pub fn get_catalog(&self, id: u32) -> Result<Option<Catalog>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        conn.query_row("SELECT * FROM catalog WHERE id = ?1", params![id], row_to_catalog)
            .optional()
            .map_err(NoesisError::from)
    }

    pub fn find_catalog_by_source(&self, source: &str) -> Result<Option<Catalog>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        conn.query_row("SELECT * FROM catalog WHERE source = ?1", params![source], row_to_catalog)
            .optional()
            .map_err(NoesisError::from)
    }

    pub fn find_catalog_title_substring(&self, needle: &str) -> Result<Vec<Catalog>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let pattern = format!("%{}%", needle);
        let mut stmt = conn.prepare("SELECT * FROM catalog WHERE title LIKE ?1")?;
        let rows = stmt.query_map(params![pattern], row_to_catalog)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(NoesisError::from)
    }

    pub fn catalog_with_concept_name(&self, name: &str) -> Result<Vec<Catalog>> {
        self.catalog_where_array_contains("concept_names", name)
    }

    pub fn catalog_with_category_name(&self, name: &str) -> Result<Vec<Catalog>> {
        self.catalog_where_array_contains("category_names", name)
    }

    fn catalog_where_array_contains(&self, column: &str, value: &str) -> Result<Vec<Catalog>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let sql = format!("SELECT * FROM catalog WHERE EXISTS (SELECT 1 FROM json_each({column}) WHERE json_each.value = ?1)");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![value], row_to_catalog)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(NoesisError::from)
    }

    pub fn catalog_vector_search(&self, query: &[f32], k: usize) -> Vec<(u32, f32)> {
        self.catalog_index.lock().expect("index lock poisoned").search(query, k, |_| true)
    }

    pub fn all_catalog(&self) -> Result<Vec<Catalog>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let mut stmt = conn.prepare("SELECT * FROM catalog")?;
        let rows = stmt.query_map([], row_to_catalog)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(NoesisError::from)
    }

    // ---- chunks ----

    pub fn upsert_chunk_batch(&self, rows: &[Chunk]) -> Result<()> {
        let mut conn = self.writer();
        let tx = conn.transaction()?;
        for row in rows {
            tx.execute(
                "INSERT INTO chunks (id, catalog_id, text, content_hash, vector, page_number, concept_ids, concept_density, catalog_title, concept_names)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
                 ON CONFLICT(id) DO UPDATE SET
                   catalog_id=excluded.catalog_id, text=excluded.text, content_hash=excluded.content_hash, vector=excluded.vector,
                   page_number=excluded.page_number, concept_ids=excluded.concept_ids, concept_density=excluded.concept_density,
                   catalog_title=excluded.catalog_title, concept_names=excluded.concept_names",
                params![
                    row.id, row.catalog_id, row.text, row.content_hash, vector_to_blob(&row.vector), row.page_number,
                    ids_to_json(&row.concept_ids), row.concept_density, row.catalog_title, names_to_json(&row.concept_names),
                ],
            )?;
        }
        tx.commit()?;
        drop(conn);
        self.rebuild_indices()
    }

    pub fn get_chunk(&self, id: u32) -> Result<Option<Chunk>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        conn.query_row("SELECT * FROM chunks WHERE id = ?1", params![id], row_to_chunk)
            .optional()
            .map_err(NoesisError::from)
    }

    pub fn chunks_for_catalog(&self, catalog_id: u32) -> Result<Vec<Chunk>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let mut stmt = conn.prepare("SELECT * FROM chunks WHERE catalog_id = ?1")?;
        let rows = stmt.query_map(params![catalog_id], row_to_chunk)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(NoesisError::from)
    }

    pub fn chunks_by_ids(&self, ids: &[u32]) -> Result<Vec<Chunk>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(chunk) = conn.query_row("SELECT * FROM chunks WHERE id = ?1", params![id], row_to_chunk).optional()? {
                out.push(chunk);
            }
        }
        Ok(out)
    }

    pub fn chunk_vector_search(&self, query: &[f32], k: usize, predicate: impl Fn(u32) -> bool) -> Vec<(u32, f32)> {
        self.chunk_index.lock().expect("index lock poisoned").search(query, k, predicate)
    }

    pub fn all_chunks(&self) -> Result<Vec<Chunk>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let mut stmt = conn.prepare("SELECT * FROM chunks")?;
        let rows = stmt.query_map([], row_to_chunk)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(NoesisError::from)
    }

    // ---- concepts ----

    pub fn upsert_concept_batch(&self, rows: &[Concept]) -> Result<()> {
        let mut conn = self.writer();
        let tx = conn.transaction()?;
        for row in rows {
            tx.execute(
                "INSERT INTO concepts (id, name, summary, catalog_ids, chunk_ids, adjacent_ids, related_ids, synonyms, broader_terms, narrower_terms, weight, vector, catalog_titles)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)
                 ON CONFLICT(id) DO UPDATE SET
                   name=excluded.name, summary=excluded.summary, catalog_ids=excluded.catalog_ids, chunk_ids=excluded.chunk_ids,
                   adjacent_ids=excluded.adjacent_ids, related_ids=excluded.related_ids, synonyms=excluded.synonyms,
                   broader_terms=excluded.broader_terms, narrower_terms=excluded.narrower_terms, weight=excluded.weight,
                   vector=excluded.vector, catalog_titles=excluded.catalog_titles",
                params![
                    row.id, row.name, row.summary, ids_to_json(&row.catalog_ids), ids_to_json(&row.chunk_ids),
                    ids_to_json(&row.adjacent_ids), ids_to_json(&row.related_ids), names_to_json(&row.synonyms),
                    names_to_json(&row.broader_terms), names_to_json(&row.narrower_terms), row.weight,
                    vector_to_blob(&row.vector), names_to_json(&row.catalog_titles),
                ],
            )?;
        }
        tx.commit()?;
        drop(conn);
        self.rebuild_indices()
    }

    pub fn get_concept(&self, id: u32) -> Result<Option<Concept>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        conn.query_row("SELECT * FROM concepts WHERE id = ?1", params![id], row_to_concept)
            .optional()
            .map_err(NoesisError::from)
    }

    pub fn find_concept_by_name(&self, name: &str) -> Result<Option<Concept>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        conn.query_row("SELECT * FROM concepts WHERE name = ?1", params![name], row_to_concept)
            .optional()
            .map_err(NoesisError::from)
    }

    pub fn all_concepts(&self) -> Result<Vec<Concept>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let mut stmt = conn.prepare("SELECT * FROM concepts")?;
        let rows = stmt.query_map([], row_to_concept)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(NoesisError::from)
    }

    pub fn concept_vector_search(&self, query: &[f32], k: usize) -> Vec<(u32, f32)> {
        self.concept_index.lock().expect("index lock poisoned").search(query, k, |_| true)
    }

    // ---- categories ----

    pub fn upsert_category_batch(&self, rows: &[Category]) -> Result<()> {
        let mut conn = self.writer();
        let tx = conn.transaction()?;
        for row in rows {
            tx.execute(
                "INSERT INTO categories (id, name, description, summary, parent_category_id, aliases, related_category_ids, document_count, chunk_count, concept_count, vector)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
                 ON CONFLICT(id) DO UPDATE SET
                   name=excluded.name, description=excluded.description, summary=excluded.summary, parent_category_id=excluded.parent_category_id,
                   aliases=excluded.aliases, related_category_ids=excluded.related_category_ids, document_count=excluded.document_count,
                   chunk_count=excluded.chunk_count, concept_count=excluded.concept_count, vector=excluded.vector",
                params![
                    row.id, row.name, row.description, row.summary, row.parent_category_id, names_to_json(&row.aliases),
                    ids_to_json(&row.related_category_ids), row.document_count, row.chunk_count, row.concept_count,
                    vector_to_blob(&row.vector),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_category(&self, id: u32) -> Result<Option<Category>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        conn.query_row("SELECT * FROM categories WHERE id = ?1", params![id], row_to_category)
            .optional()
            .map_err(NoesisError::from)
    }

    pub fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        conn.query_row("SELECT * FROM categories WHERE name = ?1", params![name], row_to_category)
            .optional()
            .map_err(NoesisError::from)
    }

    pub fn all_categories(&self) -> Result<Vec<Category>> {
        let conn = self.reader.lock().expect("store reader lock poisoned");
        let mut stmt = conn.prepare("SELECT * FROM categories")?;
        let rows = stmt.query_map([], row_to_category)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(NoesisError::from)
    }

    // ---- maintenance ----

    /// Drop and recreate every table (the `--overwrite` seeding flag).
    pub fn drop_and_recreate_all(&self) -> Result<()> {
        let conn = self.writer();
        conn.execute_batch(
            "DROP TABLE IF EXISTS catalog_fts;
             DROP TABLE IF EXISTS chunks_fts;
             DROP TABLE IF EXISTS catalog;
             DROP TABLE IF EXISTS chunks;
             DROP TABLE IF EXISTS concepts;
             DROP TABLE IF EXISTS categories;
             PRAGMA user_version = 0;",
        )?;
        apply_migrations(&conn)?;
        drop(conn);
        self.rebuild_indices()
    }

    /// Regenerate every derived text column by scanning source tables
    /// (spec §4.6, §3.2 invariant 6). Single-writer operation.
    pub fn regenerate_derived_columns(&self) -> Result<()> {
        let conn = self.writer();

        let concept_names: std::collections::HashMap<u32, String> = {
            let mut stmt = conn.prepare("SELECT id, name FROM concepts")?;
            stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<_, _>>()?
        };
        let category_names: std::collections::HashMap<u32, String> = {
            let mut stmt = conn.prepare("SELECT id, name FROM categories")?;
            stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<_, _>>()?
        };
        let catalog_titles: std::collections::HashMap<u32, String> = {
            let mut stmt = conn.prepare("SELECT id, title FROM catalog")?;
            stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<_, _>>()?
        };

        // catalog.concept_names / category_names
        let catalog_rows: Vec<(u32, Vec<u32>, Vec<u32>)> = {
            let mut stmt = conn.prepare("SELECT id, concept_ids, category_ids FROM catalog")?;
            stmt.query_map([], |row| {
                Ok((row.get::<_, u32>(0)?, ids_from_json(&row.get::<_, String>(1)?), ids_from_json(&row.get::<_, String>(2)?)))
            })?
            .collect::<std::result::Result<_, _>>()?
        };
        for (id, concept_ids, category_ids) in &catalog_rows {
            let cnames: Vec<String> = concept_ids.iter().filter_map(|cid| concept_names.get(cid).cloned()).collect();
            let catnames: Vec<String> = category_ids.iter().filter_map(|cid| category_names.get(cid).cloned()).collect();
            conn.execute(
                "UPDATE catalog SET concept_names = ?1, category_names = ?2 WHERE id = ?3",
                params![names_to_json(&cnames), names_to_json(&catnames), id],
            )?;
        }

        // chunks.catalog_title / concept_names
        let chunk_rows: Vec<(u32, u32, Vec<u32>)> = {
            let mut stmt = conn.prepare("SELECT id, catalog_id, concept_ids FROM chunks")?;
            stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?, ids_from_json(&row.get::<_, String>(2)?))))?
                .collect::<std::result::Result<_, _>>()?
        };
        for (id, catalog_id, concept_ids) in &chunk_rows {
            let title = catalog_titles.get(catalog_id).cloned().unwrap_or_default();
            let cnames: Vec<String> = concept_ids.iter().filter_map(|cid| concept_names.get(cid).cloned()).collect();
            conn.execute(
                "UPDATE chunks SET catalog_title = ?1, concept_names = ?2 WHERE id = ?3",
                params![title, names_to_json(&cnames), id],
            )?;
        }

        // concepts.catalog_titles
        let concept_rows: Vec<(u32, Vec<u32>)> = {
            let mut stmt = conn.prepare("SELECT id, catalog_ids FROM concepts")?;
            stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, ids_from_json(&row.get::<_, String>(1)?))))?
                .collect::<std::result::Result<_, _>>()?
        };
        for (id, catalog_ids) in &concept_rows {
            let titles: Vec<String> = catalog_ids.iter().filter_map(|cid| catalog_titles.get(cid).cloned()).collect();
            conn.execute("UPDATE concepts SET catalog_titles = ?1 WHERE id = ?2", params![names_to_json(&titles), id])?;
        }

        // categories.document_count / chunk_count / concept_count
        for (cat_id, cat_name) in &category_names {
            let document_count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM catalog WHERE EXISTS (SELECT 1 FROM json_each(category_names) WHERE json_each.value = ?1)",
                params![cat_name],
                |row| row.get(0),
            )?;
            let concept_ids_for_category: Vec<u32> = {
                let mut stmt = conn.prepare(
                    "SELECT concept_ids FROM catalog WHERE EXISTS (SELECT 1 FROM json_each(category_names) WHERE json_each.value = ?1)",
                )?;
                let mut acc = std::collections::HashSet::new();
                let rows = stmt.query_map(params![cat_name], |row| Ok(ids_from_json(&row.get::<_, String>(0)?)))?;
                for ids in rows {
                    acc.extend(ids?);
                }
                acc.into_iter().collect()
            };
            let chunk_count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM chunks WHERE catalog_id IN (SELECT id FROM catalog WHERE EXISTS (SELECT 1 FROM json_each(category_names) WHERE json_each.value = ?1))",
                params![cat_name],
                |row| row.get(0),
            )?;
            conn.execute(
                "UPDATE categories SET document_count = ?1, chunk_count = ?2, concept_count = ?3 WHERE id = ?4",
                params![document_count, chunk_count, concept_ids_for_category.len() as u32, cat_id],
            )?;
        }

        Ok(())
    }
}

fn row_to_catalog(row: &rusqlite::Row) -> rusqlite::Result<Catalog> {
    Ok(Catalog {
        id: row.get("id")?,
        source: row.get("source")?,
        title: row.get("title")?,
        author: row.get("author")?,
        year: row.get("year")?,
        publisher: row.get("publisher")?,
        isbn: row.get("isbn")?,
        summary: row.get("summary")?,
        content_hash: row.get("content_hash")?,
        vector: blob_to_vector(&row.get::<_, Vec<u8>>("vector")?),
        concept_ids: ids_from_json(&row.get::<_, String>("concept_ids")?),
        category_ids: ids_from_json(&row.get::<_, String>("category_ids")?),
        concept_names: names_from_json(&row.get::<_, String>("concept_names")?),
        category_names: names_from_json(&row.get::<_, String>("category_names")?),
    })
}

fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<Chunk> {
    Ok(Chunk {
        id: row.get("id")?,
        catalog_id: row.get("catalog_id")?,
        text: row.get("text")?,
        content_hash: row.get("content_hash")?,
        vector: blob_to_vector(&row.get::<_, Vec<u8>>("vector")?),
        page_number: row.get("page_number")?,
        concept_ids: ids_from_json(&row.get::<_, String>("concept_ids")?),
        concept_density: row.get("concept_density")?,
        catalog_title: row.get("catalog_title")?,
        concept_names: names_from_json(&row.get::<_, String>("concept_names")?),
    })
}

fn row_to_concept(row: &rusqlite::Row) -> rusqlite::Result<Concept> {
    Ok(Concept {
        id: row.get("id")?,
        name: row.get("name")?,
        summary: row.get("summary")?,
        catalog_ids: ids_from_json(&row.get::<_, String>("catalog_ids")?),
        chunk_ids: ids_from_json(&row.get::<_, String>("chunk_ids")?),
        adjacent_ids: ids_from_json(&row.get::<_, String>("adjacent_ids")?),
        related_ids: ids_from_json(&row.get::<_, String>("related_ids")?),
        synonyms: names_from_json(&row.get::<_, String>("synonyms")?),
        broader_terms: names_from_json(&row.get::<_, String>("broader_terms")?),
        narrower_terms: names_from_json(&row.get::<_, String>("narrower_terms")?),
        weight: row.get("weight")?,
        vector: blob_to_vector(&row.get::<_, Vec<u8>>("vector")?),
        catalog_titles: names_from_json(&row.get::<_, String>("catalog_titles")?),
    })
}

fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        summary: row.get("summary")?,
        parent_category_id: row.get("parent_category_id")?,
        aliases: names_from_json(&row.get::<_, String>("aliases")?),
        related_category_ids: ids_from_json(&row.get::<_, String>("related_category_ids")?),
        document_count: row.get("document_count")?,
        chunk_count: row.get("chunk_count")?,
        concept_count: row.get("concept_count")?,
        vector: blob_to_vector(&row.get::<_, Vec<u8>>("vector")?),
    })
}
