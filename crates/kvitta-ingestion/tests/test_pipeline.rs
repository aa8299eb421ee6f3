//! Pipeline behaviour against in-memory fakes: skip semantics, dedup,
//! fail-soft extraction and infrastructure-error propagation.

use std::sync::Arc;

use kvitta_db::{MetadataStore, TagSet};
use kvitta_ingestion::models::UploadedFile;
use kvitta_ingestion::pipeline::IngestionPipeline;
use kvitta_test_utils::{
    pretty_assert_eq, FakeLlmBackend, FakeMetadataStore, FakeObjectStorage, FakeOcrService,
};

fn pipeline_with(
    storage: Arc<FakeObjectStorage>,
    ocr: FakeOcrService,
    backend: FakeLlmBackend,
    store: Arc<FakeMetadataStore>,
) -> IngestionPipeline {
    IngestionPipeline::new(storage, Arc::new(ocr), Arc::new(backend), store)
}

fn jpeg_upload(name: &str) -> UploadedFile {
    UploadedFile::new(name, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
}

#[tokio::test]
async fn unsupported_extension_is_skipped_without_side_effects() {
    let storage = Arc::new(FakeObjectStorage::new());
    let pipeline = pipeline_with(
        storage.clone(),
        FakeOcrService::with_text("anything"),
        FakeLlmBackend::with_response("{}"),
        Arc::new(FakeMetadataStore::new()),
    );

    let result = pipeline
        .process(UploadedFile::new("notes.txt", b"hello".to_vec()), "alice", "alice-dir")
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(storage.put_count(), 0);
}

#[tokio::test]
async fn happy_path_produces_a_tagged_record() {
    let storage = Arc::new(FakeObjectStorage::new());
    let store = Arc::new(FakeMetadataStore::new());
    let pipeline = pipeline_with(
        storage.clone(),
        FakeOcrService::with_text("Coop\n123,45\nkortbetalning\n9999999999"),
        FakeLlmBackend::with_response(
            r#"Sure! {"vendor":"Coop","product_or_service":"Mjölk","price":123.45} thanks"#,
        ),
        store,
    );

    let record = pipeline
        .process(jpeg_upload("kvitto.jpg"), "alice", "alice-dir")
        .await
        .unwrap()
        .expect("record expected");

    assert_eq!(record.user_id, "alice");
    assert_eq!(record.user_directory, "alice-dir");
    assert_eq!(record.original_filename, "kvitto.jpg");
    assert_eq!(record.status, "tagged");
    assert!(record.artifact_path.starts_with("rawdrop/alice-dir/"));
    assert_eq!(record.ingested_url, format!("memory://{}", record.artifact_path));
    pretty_assert_eq!(
        record.tags,
        TagSet {
            vendor: "Coop".to_string(),
            product_or_service: "Mjölk".to_string(),
            price: 123.45,
        }
    );
    assert_eq!(storage.put_count(), 1);
}

#[tokio::test]
async fn path_collision_skips_but_still_stores_raw_bytes() {
    let storage = Arc::new(FakeObjectStorage::new());
    let store = Arc::new(FakeMetadataStore::new());
    let pipeline = pipeline_with(
        storage.clone(),
        FakeOcrService::with_text("Coop\n123,45"),
        FakeLlmBackend::with_response("{}"),
        store.clone(),
    );

    let first = pipeline
        .process(jpeg_upload("kvitto.jpg"), "alice", "alice-dir")
        .await
        .unwrap();
    assert!(first.is_some());
    store.insert(&first.unwrap()).await.unwrap();

    // Simulate the second call landing on an already-recorded path.
    store.mark_everything_processed();

    let second = pipeline
        .process(jpeg_upload("kvitto.jpg"), "alice", "alice-dir")
        .await
        .unwrap();
    assert!(second.is_none());

    // The raw blob write happens before the dedup gate, so both calls stored.
    assert_eq!(storage.put_count(), 2);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn blank_scan_still_yields_unknown_tags() {
    let pipeline = pipeline_with(
        Arc::new(FakeObjectStorage::new()),
        FakeOcrService::blank(),
        FakeLlmBackend::with_response("{}"),
        Arc::new(FakeMetadataStore::new()),
    );

    let record = pipeline
        .process(jpeg_upload("blank.png"), "alice", "alice-dir")
        .await
        .unwrap()
        .expect("blank scans are not failures");

    pretty_assert_eq!(record.tags, TagSet::unknown());
}

#[tokio::test]
async fn extraction_outage_degrades_instead_of_failing() {
    let pipeline = pipeline_with(
        Arc::new(FakeObjectStorage::new()),
        FakeOcrService::with_text("Coop\n123,45"),
        FakeLlmBackend::unavailable(),
        Arc::new(FakeMetadataStore::new()),
    );

    let record = pipeline
        .process(jpeg_upload("kvitto.jpg"), "alice", "alice-dir")
        .await
        .unwrap()
        .expect("extraction outages must not abort the pipeline");

    pretty_assert_eq!(record.tags, TagSet::unknown());
    assert_eq!(record.status, "tagged");
}

#[tokio::test]
async fn storage_outage_propagates_to_the_caller() {
    let pipeline = pipeline_with(
        Arc::new(FakeObjectStorage::failing()),
        FakeOcrService::with_text("Coop"),
        FakeLlmBackend::with_response("{}"),
        Arc::new(FakeMetadataStore::new()),
    );

    let result = pipeline
        .process(jpeg_upload("kvitto.jpg"), "alice", "alice-dir")
        .await;

    assert!(result.is_err());
}
