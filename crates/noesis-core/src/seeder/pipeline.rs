//! Resumable seeding orchestrator (spec §4.10): file discovery, collection
//! keying, checkpointed bounded-parallelism ingestion, and the post-pass
//! that establishes cross-document concept invariants.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex as AsyncMutex;

use crate::concepts::{CategoryIndexBuilder, ConceptIndexBuilder, ExtractedConcept, SeededDocument};
use crate::embeddings::EmbeddingProvider;
use crate::error::{NoesisError, Result};
use crate::hash::{chunk_id, id_of};
use crate::observability::Logger;
use crate::resilience::{EnvelopeError, ResilientExecutor};
use crate::store::{Catalog, Chunk, Store};

use super::checkpoint::Checkpoint;
use super::stage_cache::{ExtractedConcepts, PrimaryConcept, StageCache, StageCacheEntry, StageCacheMetadata};

/// Extracts text from a supported document format. Out of core scope
/// (spec §1) — implementations live in the binary crate or tests.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ChunkText {
    pub text: String,
    pub page_number: Option<u32>,
}

/// Splits extracted text into chunks. Out of core scope; injected.
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str) -> Vec<ChunkText>;
}

/// The external LLM's concept-extraction contract (spec §6.2). The core
/// specifies only this request/response shape, not the remote call itself.
#[async_trait]
pub trait ConceptExtractor: Send + Sync {
    async fn extract(&self, document_text: &str) -> std::result::Result<ExtractedConcepts, String>;
}

fn content_hash_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Sort content hashes, concatenate, hash again, take the first 16 hex
/// characters (spec §4.10 step 2).
pub fn collection_key(content_hashes: &[String]) -> String {
    let mut sorted = content_hashes.to_vec();
    sorted.sort();
    let digest = Sha256::digest(sorted.concat().as_bytes());
    hex::encode(digest)[..16].to_string()
}

fn discover_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    discover_files_inner(root, extensions, &mut out)?;
    out.sort();
    Ok(out)
}

fn discover_files_inner(dir: &Path, extensions: &[String], out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            discover_files_inner(&path, extensions, out)?;
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                out.push(path);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SeederConfig {
    pub parallel: usize,
    pub overwrite: bool,
    pub resume: bool,
    pub clean_checkpoint: bool,
    pub max_docs: Option<usize>,
    pub no_cache: bool,
    pub clear_cache: bool,
    pub cache_only: bool,
    pub stage_cache_root: PathBuf,
    pub checkpoint_path: PathBuf,
    pub supported_extensions: Vec<String>,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            parallel: 10,
            overwrite: false,
            resume: true,
            clean_checkpoint: false,
            max_docs: None,
            no_cache: false,
            clear_cache: false,
            cache_only: false,
            stage_cache_root: PathBuf::from(".stage-cache"),
            checkpoint_path: PathBuf::from(super::checkpoint::CHECKPOINT_FILENAME),
            supported_extensions: vec!["txt".into(), "md".into(), "pdf".into(), "epub".into()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeedingSummary {
    pub collection_key: String,
    pub processed: usize,
    pub skipped_permanent: usize,
}

/// Orchestrates a full seeding run over a source directory into a [`Store`].
pub struct Seeder {
    store: Arc<Store>,
    text_extractor: Arc<dyn TextExtractor>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    concept_extractor: Arc<dyn ConceptExtractor>,
    llm_envelope: Arc<ResilientExecutor>,
    config: SeederConfig,
    logger: Logger,
}

impl Seeder {
    pub fn new(
        store: Arc<Store>,
        text_extractor: Arc<dyn TextExtractor>,
        chunker: Arc<dyn Chunker>,
        embedder: Arc<dyn EmbeddingProvider>,
        concept_extractor: Arc<dyn ConceptExtractor>,
        llm_envelope: Arc<ResilientExecutor>,
        config: SeederConfig,
        logger: Logger,
    ) -> Self {
        Self { store, text_extractor, chunker, embedder, concept_extractor, llm_envelope, config, logger }
    }

    pub async fn run(self: &Arc<Self>, source_dir: &Path) -> Result<SeedingSummary> {
        let files = discover_files(source_dir, &self.config.supported_extensions)?;
        let mut file_hashes = Vec::with_capacity(files.len());
        for path in &files {
            let bytes = std::fs::read(path)?;
            file_hashes.push((path.clone(), content_hash_hex(&bytes)));
        }
        let key = collection_key(&file_hashes.iter().map(|(_, h)| h.clone()).collect::<Vec<_>>());

        if self.config.overwrite {
            self.store.drop_and_recreate_all()?;
        }

        let checkpoint = if self.config.resume && !self.config.clean_checkpoint {
            Checkpoint::load(&self.config.checkpoint_path, &key)?.unwrap_or_else(|| Checkpoint::new(key.clone()))
        } else {
            Checkpoint::new(key.clone())
        };

        let stage_cache = Arc::new(StageCache::new(&self.config.stage_cache_root, &key));
        if self.config.clear_cache {
            stage_cache.cleanup()?;
        }

        let mut pending: Vec<(PathBuf, String)> =
            file_hashes.iter().filter(|(path, _)| !checkpoint.is_completed(&path.to_string_lossy())).cloned().collect();
        if let Some(max) = self.config.max_docs {
            pending.truncate(max);
        }

        if self.config.cache_only {
            for (path, hash) in &pending {
                if stage_cache.read(hash)?.is_none() {
                    return Err(NoesisError::Validation(format!("cache-only: no cached entry for {}", path.display())));
                }
            }
        }

        let parallel = self.config.parallel.clamp(1, 25);
        let semaphore = Arc::new(tokio::sync::Semaphore::new(parallel));
        let checkpoint = Arc::new(AsyncMutex::new(checkpoint));
        let concept_builder = Arc::new(std::sync::Mutex::new(ConceptIndexBuilder::default()));
        let category_builder = Arc::new(std::sync::Mutex::new(CategoryIndexBuilder::default()));
        let processed = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));

        let mut join_set = tokio::task::JoinSet::new();
        for (path, hash) in pending {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");
            let seeder = self.clone();
            let stage_cache = stage_cache.clone();
            let checkpoint = checkpoint.clone();
            let concept_builder = concept_builder.clone();
            let category_builder = category_builder.clone();
            let processed = processed.clone();
            let skipped = skipped.clone();

            join_set.spawn(async move {
                let _permit = permit;
                let source = path.to_string_lossy().to_string();
                match seeder.process_document(&path, &hash, &stage_cache, &concept_builder, &category_builder).await {
                    Ok(()) => {
                        let mut cp = checkpoint.lock().await;
                        cp.mark_completed(source);
                        if let Err(e) = cp.save(&seeder.config.checkpoint_path) {
                            seeder.logger.error("failed to persist checkpoint", Some(&e));
                        }
                        processed.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => {
                        seeder.logger.error(&format!("permanent failure for {source}"), Some(&e));
                        skipped.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
        while join_set.join_next().await.is_some() {}

        // Post-pass (spec §4.10 step 6): adjacency/relatedness/weight,
        // then persist concepts and categories and regenerate every derived
        // column. Categories must land before regeneration, since derived
        // counts are keyed off rows already present in the categories table.
        let builder = Arc::try_unwrap(concept_builder)
            .unwrap_or_else(|_| panic!("concept builder still shared after all seeding tasks joined"))
            .into_inner()
            .expect("concept builder lock poisoned");
        let concepts = builder.finalize();
        if !concepts.is_empty() {
            self.store.upsert_concept_batch(&concepts)?;
        }

        let category_builder = Arc::try_unwrap(category_builder)
            .unwrap_or_else(|_| panic!("category builder still shared after all seeding tasks joined"))
            .into_inner()
            .expect("category builder lock poisoned");
        let categories = category_builder.finalize();
        if !categories.is_empty() {
            self.store.upsert_category_batch(&categories)?;
        }

        self.store.regenerate_derived_columns()?;

        // Cleanup (spec §4.10 step 7).
        let catalog_sources: HashSet<String> = self.store.all_catalog()?.into_iter().map(|c| c.source).collect();
        let file_sources: HashSet<String> = files.iter().map(|f| f.to_string_lossy().to_string()).collect();
        if catalog_sources == file_sources {
            stage_cache.cleanup()?;
        }

        Ok(SeedingSummary {
            collection_key: key,
            processed: processed.load(Ordering::SeqCst),
            skipped_permanent: skipped.load(Ordering::SeqCst),
        })
    }

    fn process_document<'a>(
        &'a self,
        path: &'a Path,
        content_hash: &'a str,
        stage_cache: &'a StageCache,
        concept_builder: &'a Arc<std::sync::Mutex<ConceptIndexBuilder>>,
        category_builder: &'a Arc<std::sync::Mutex<CategoryIndexBuilder>>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
        let source = path.to_string_lossy().to_string();

        let cached = if self.config.no_cache { None } else { stage_cache.read(content_hash)? };
        let entry = match cached {
            Some(entry) => entry,
            None => {
                let text = self.text_extractor.extract(path)?;
                let extraction = self
                    .llm_envelope
                    .call(|_: &String| true, || async { self.concept_extractor.extract(&text).await })
                    .await
                    .map_err(|e| match e {
                        EnvelopeError::CircuitOpen => NoesisError::CircuitOpen(source.clone()),
                        EnvelopeError::BulkheadRejected => NoesisError::BulkheadRejected(source.clone()),
                        EnvelopeError::Timeout => NoesisError::Timeout(std::time::Duration::from_secs(0)),
                        EnvelopeError::Inner(msg) => NoesisError::Llm(msg),
                    })?;

                let entry = StageCacheEntry {
                    hash: content_hash.to_string(),
                    source: source.clone(),
                    processed_at: chrono::Utc::now().to_rfc3339(),
                    concepts: extraction,
                    content_overview: text.chars().take(500).collect(),
                    metadata: StageCacheMetadata::default(),
                };
                stage_cache.write(content_hash, &entry)?;
                entry
            }
        };

        let catalog_id = id_of(&source);
        let full_text = self.text_extractor.extract(path).unwrap_or_else(|_| entry.content_overview.clone());
        let chunks_text = self.chunker.chunk(&full_text);

        let doc_vector = self.embedder.embed(&entry.content_overview.clone())?;

        let mut chunk_rows = Vec::with_capacity(chunks_text.len());
        for (index, chunk_text) in chunks_text.iter().enumerate() {
            let chunk_vector = self.embedder.embed(&chunk_text.text)?;
            let word_count = chunk_text.text.split_whitespace().count();
            let id = chunk_id(content_hash, index);
            chunk_rows.push(Chunk {
                id,
                catalog_id,
                text: chunk_text.text.clone(),
                content_hash: content_hash.to_string(),
                vector: chunk_vector,
                page_number: chunk_text.page_number,
                concept_ids: vec![],
                concept_density: Chunk::concept_density_for(0, word_count),
                catalog_title: String::new(),
                concept_names: vec![],
            });
        }

        let extracted_concepts: Vec<ExtractedConcept> = entry
            .concepts
            .primary_concepts
            .iter()
            .map(|c| ExtractedConcept { name: c.name.clone(), summary: c.summary.clone() })
            .collect();

        let seeded_doc =
            SeededDocument { catalog_id, concepts: extracted_concepts.clone(), categories: entry.concepts.categories.clone() };
        {
            let mut builder = concept_builder.lock().expect("concept builder lock poisoned");
            builder.ingest(&seeded_doc);
            for chunk in &chunk_rows {
                for concept in &extracted_concepts {
                    let cid = id_of(&crate::concepts::normalize_name(&concept.name));
                    builder.attach_chunk(cid, chunk.id);
                }
            }
        }
        {
            let mut builder = category_builder.lock().expect("category builder lock poisoned");
            builder.ingest(&seeded_doc);
        }

        let concept_ids: Vec<u32> = extracted_concepts.iter().map(|c| id_of(&crate::concepts::normalize_name(&c.name))).collect();
        let category_ids: Vec<u32> = entry
            .concepts
            .categories
            .iter()
            .map(|c| crate::concepts::normalize_name(c))
            .filter(|n| !n.is_empty())
            .map(|n| id_of(&n))
            .collect();
        for chunk in chunk_rows.iter_mut() {
            chunk.concept_ids = concept_ids.clone();
            chunk.concept_density = Chunk::concept_density_for(concept_ids.len(), chunk.text.split_whitespace().count());
        }
        if !chunk_rows.is_empty() {
            self.store.upsert_chunk_batch(&chunk_rows)?;
        }

        let catalog_row = Catalog {
            id: catalog_id,
            source: source.clone(),
            title: entry.metadata.title.clone().unwrap_or_else(|| path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()),
            author: entry.metadata.author.clone().unwrap_or_default(),
            year: entry.metadata.year,
            publisher: String::new(),
            isbn: String::new(),
            summary: entry.content_overview.clone(),
            content_hash: content_hash.to_string(),
            vector: doc_vector,
            concept_ids,
            category_ids,
            concept_names: vec![],
            category_names: vec![],
        };
        self.store.upsert_catalog_batch(&[catalog_row])?;

        Ok(())
        })
    }
}
