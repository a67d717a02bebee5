//! Spec §8 end-to-end scenario 1 (collection key + cleanup) and the
//! checkpoint-determinism law.

use std::fs;
use std::sync::Arc;

use noesis_core::embeddings::HashingEmbedder;
use noesis_core::resilience::{ResilientExecutor, ResilientExecutorConfig};
use noesis_core::seeder::{Seeder, SeederConfig};
use noesis_core::store::Store;

use noesis_e2e_support::{single_concept_extraction, test_logger, ParagraphChunker, PlainTextExtractor, ScriptedConceptExtractor};

fn make_seeder(store: Arc<Store>, config: SeederConfig) -> Arc<Seeder> {
    Arc::new(Seeder::new(
        store,
        Arc::new(PlainTextExtractor),
        Arc::new(ParagraphChunker),
        Arc::new(HashingEmbedder::default()),
        Arc::new(ScriptedConceptExtractor::always(single_concept_extraction("decorator pattern"))),
        Arc::new(ResilientExecutor::new("llm", ResilientExecutorConfig::default())),
        config,
        test_logger(),
    ))
}

#[tokio::test]
async fn seeding_three_files_produces_three_catalog_rows_and_clears_cache() {
    let source_dir = tempfile::tempdir().unwrap();
    for (name, body) in [("a.txt", "Alpha document body."), ("b.txt", "Beta document body."), ("c.txt", "Gamma document body.")] {
        fs::write(source_dir.path().join(name), body).unwrap();
    }

    let store = Arc::new(Store::open_in_memory().unwrap());
    let checkpoint_dir = tempfile::tempdir().unwrap();
    let config = SeederConfig {
        stage_cache_root: checkpoint_dir.path().join(".stage-cache"),
        checkpoint_path: checkpoint_dir.path().join(".seeding-checkpoint.json"),
        ..SeederConfig::default()
    };
    let seeder = make_seeder(store.clone(), config.clone());

    let summary = seeder.run(source_dir.path()).await.unwrap();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.skipped_permanent, 0);
    assert_eq!(summary.collection_key.len(), 16);

    let catalog = store.all_catalog().unwrap();
    assert_eq!(catalog.len(), 3);

    // Cleanup (spec §4.10 step 7): catalog sources equal the file set, so the
    // stage-cache collection directory is removed.
    assert!(!config.stage_cache_root.join(&summary.collection_key).exists());
}

#[tokio::test]
async fn seeding_populates_categories_and_their_derived_counts() {
    let source_dir = tempfile::tempdir().unwrap();
    for (name, body) in [("a.txt", "Alpha document body."), ("b.txt", "Beta document body.")] {
        fs::write(source_dir.path().join(name), body).unwrap();
    }

    let store = Arc::new(Store::open_in_memory().unwrap());
    let checkpoint_dir = tempfile::tempdir().unwrap();
    let config = SeederConfig {
        stage_cache_root: checkpoint_dir.path().join(".stage-cache"),
        checkpoint_path: checkpoint_dir.path().join(".seeding-checkpoint.json"),
        ..SeederConfig::default()
    };
    let seeder = make_seeder(store.clone(), config);
    seeder.run(source_dir.path()).await.unwrap();

    let categories = store.all_categories().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "software design");
    assert_eq!(categories[0].document_count, 2);

    let found = store.find_category_by_name("software design").unwrap().unwrap();
    assert_eq!(found.id, categories[0].id);

    let docs = store.catalog_with_category_name("software design").unwrap();
    assert_eq!(docs.len(), 2);
    for doc in &docs {
        assert!(doc.category_ids.contains(&categories[0].id));
    }
}

#[tokio::test]
async fn resuming_a_completed_run_does_not_reprocess_documents() {
    let source_dir = tempfile::tempdir().unwrap();
    fs::write(source_dir.path().join("a.txt"), "Alpha document body.").unwrap();

    let store = Arc::new(Store::open_in_memory().unwrap());
    let checkpoint_dir = tempfile::tempdir().unwrap();
    let config = SeederConfig {
        stage_cache_root: checkpoint_dir.path().join(".stage-cache"),
        checkpoint_path: checkpoint_dir.path().join(".seeding-checkpoint.json"),
        ..SeederConfig::default()
    };

    let seeder = make_seeder(store.clone(), config.clone());
    let first = seeder.run(source_dir.path()).await.unwrap();
    assert_eq!(first.processed, 1);

    let seeder = make_seeder(store.clone(), config);
    let second = seeder.run(source_dir.path()).await.unwrap();
    assert_eq!(second.processed, 0, "a resumed run must not reprocess an already-completed document");
}

#[tokio::test]
async fn a_permanently_failing_document_is_skipped_and_absent_from_checkpoint() {
    let source_dir = tempfile::tempdir().unwrap();
    fs::write(source_dir.path().join("broken.txt"), "Broken document body.").unwrap();

    let store = Arc::new(Store::open_in_memory().unwrap());
    let checkpoint_dir = tempfile::tempdir().unwrap();
    let config = SeederConfig {
        stage_cache_root: checkpoint_dir.path().join(".stage-cache"),
        checkpoint_path: checkpoint_dir.path().join(".seeding-checkpoint.json"),
        ..SeederConfig::default()
    };

    let seeder = Arc::new(Seeder::new(
        store.clone(),
        Arc::new(PlainTextExtractor),
        Arc::new(ParagraphChunker),
        Arc::new(HashingEmbedder::default()),
        Arc::new(ScriptedConceptExtractor::scripted(vec![Err("malformed json".to_string())])),
        Arc::new(ResilientExecutor::new(
            "llm",
            ResilientExecutorConfig { retry: noesis_core::resilience::RetryConfig { max_attempts: 1, ..Default::default() }, ..Default::default() },
        )),
        config.clone(),
        test_logger(),
    ));

    let summary = seeder.run(source_dir.path()).await.unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped_permanent, 1);
    assert!(store.all_catalog().unwrap().is_empty());

    let checkpoint_text = fs::read_to_string(&config.checkpoint_path).unwrap_or_default();
    assert!(!checkpoint_text.contains("broken.txt"));
}
