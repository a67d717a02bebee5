//! Versioned schema migrations, following the teacher's
//! `Migration { version, description, up }` / `MIGRATIONS` array convention.

use rusqlite::Connection;

use crate::error::Result;

pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "catalog, chunks, concepts, categories tables",
        up: r#"
            CREATE TABLE catalog (
                id INTEGER PRIMARY KEY,
                source TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                author TEXT NOT NULL DEFAULT '',
                year INTEGER,
                publisher TEXT NOT NULL DEFAULT '',
                isbn TEXT NOT NULL DEFAULT '',
                summary TEXT NOT NULL DEFAULT '',
                content_hash TEXT NOT NULL,
                vector BLOB NOT NULL,
                concept_ids TEXT NOT NULL DEFAULT '[]',
                category_ids TEXT NOT NULL DEFAULT '[]',
                concept_names TEXT NOT NULL DEFAULT '[]',
                category_names TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE chunks (
                id INTEGER PRIMARY KEY,
                catalog_id INTEGER NOT NULL REFERENCES catalog(id),
                text TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                vector BLOB NOT NULL,
                page_number INTEGER,
                concept_ids TEXT NOT NULL DEFAULT '[]',
                concept_density REAL NOT NULL DEFAULT 0,
                catalog_title TEXT NOT NULL DEFAULT '',
                concept_names TEXT NOT NULL DEFAULT '[]'
            );
            CREATE INDEX idx_chunks_catalog_id ON chunks(catalog_id);

            CREATE TABLE concepts (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                summary TEXT NOT NULL DEFAULT '',
                catalog_ids TEXT NOT NULL DEFAULT '[]',
                chunk_ids TEXT NOT NULL DEFAULT '[]',
                adjacent_ids TEXT NOT NULL DEFAULT '[]',
                related_ids TEXT NOT NULL DEFAULT '[]',
                synonyms TEXT NOT NULL DEFAULT '[]',
                broader_terms TEXT NOT NULL DEFAULT '[]',
                narrower_terms TEXT NOT NULL DEFAULT '[]',
                weight REAL NOT NULL DEFAULT 0,
                vector BLOB NOT NULL,
                catalog_titles TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                summary TEXT NOT NULL DEFAULT '',
                parent_category_id INTEGER,
                aliases TEXT NOT NULL DEFAULT '[]',
                related_category_ids TEXT NOT NULL DEFAULT '[]',
                document_count INTEGER NOT NULL DEFAULT 0,
                chunk_count INTEGER NOT NULL DEFAULT 0,
                concept_count INTEGER NOT NULL DEFAULT 0,
                vector BLOB NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        description: "FTS5 indices over bm25-scored text columns",
        up: r#"
            CREATE VIRTUAL TABLE catalog_fts USING fts5(
                title, summary, content='catalog', content_rowid='id'
            );
            CREATE VIRTUAL TABLE chunks_fts USING fts5(
                text, content='chunks', content_rowid='id'
            );
        "#,
    },
];

pub fn current_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

pub fn apply_migrations(conn: &Connection) -> Result<()> {
    let current = current_version(conn)?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        conn.execute_batch(migration.up)?;
        conn.execute_batch(&format!("PRAGMA user_version = {}", migration.version))?;
        tracing::info!(version = migration.version, description = migration.description, "applied migration");
    }
    Ok(())
}
