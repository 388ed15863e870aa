//! Tests for uploads, deduplication and deletion of files.

use std::sync::Arc;

use bytes::Bytes;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    BlobStorageError, CollaboratorError, FixtureMenuImagePipeline, MockBlobStorage,
    MockMenuImagePipeline, StaticReferenceChecker,
};
use crate::outbound::memory::InMemoryRepository;
use crate::outbound::storage::LocalBlobStorage;
use crate::test_support::cap_fs::{count_entries, exists_relative, read_relative};
use crate::test_support::png_bytes;

struct Harness {
    service: FileLibraryService,
    uploader: EntityId,
    root: TempDir,
}

fn harness_with(
    blobs: Option<Arc<dyn BlobStorage>>,
    pipeline: Arc<dyn MenuImagePipeline>,
) -> Harness {
    let root = TempDir::new().expect("temp dir");
    let uploader = EntityId::random();
    let blobs: Arc<dyn BlobStorage> = match blobs {
        Some(blobs) => blobs,
        None => Arc::new(LocalBlobStorage::open(root.path()).expect("open upload root")),
    };
    let service = FileLibraryService::new(
        Arc::new(InMemoryRepository::new(Arc::new(DefaultClock))),
        blobs,
        ReferenceValidator::new(Arc::new(
            StaticReferenceChecker::default().with(EntityKind::User, uploader),
        )),
        pipeline,
    );
    Harness {
        service,
        uploader,
        root,
    }
}

#[fixture]
fn harness() -> Harness {
    harness_with(None, Arc::new(FixtureMenuImagePipeline))
}

fn upload(filename: &str, purpose: &str, content: &[u8]) -> UploadItem {
    UploadItem {
        filename: filename.to_owned(),
        mime_type: mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_owned(),
        purpose: purpose.to_owned(),
        content: Bytes::copy_from_slice(content),
    }
}

fn batch(harness: &Harness, items: Vec<UploadItem>) -> UploadBatch {
    UploadBatch {
        uploader_id: harness.uploader,
        restaurant_id: None,
        is_public: true,
        items,
    }
}

#[rstest]
#[tokio::test]
async fn upload_stores_under_the_purpose_directory(harness: Harness) {
    let png = png_bytes(4, 2);
    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("dish.png", "menu_item_image", &png)]))
        .await
        .expect("batch accepted");

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    let stored = &report.uploaded[0];
    assert!(stored.storage_path.as_str().starts_with("menu_item_images/"));
    assert!(stored.storage_path.as_str().ends_with(".png"));
    assert_eq!(stored.checksum, Checksum::of(&png));
    assert_eq!(
        stored.dimensions,
        Some(ImageDimensions {
            width: 4,
            height: 2
        })
    );
    assert_eq!(
        read_relative(harness.root.path(), stored.storage_path.as_str()).expect("blob"),
        png
    );
}

#[rstest]
#[tokio::test]
async fn identical_content_is_stored_once(harness: Harness) {
    let first = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"same")]))
        .await
        .expect("first");
    let second = harness
        .service
        .upload_files(batch(&harness, vec![upload("b.txt", "restaurant_image", b"same")]))
        .await
        .expect("second");

    assert_eq!(first.uploaded[0].id(), second.uploaded[0].id());
    assert_eq!(count_entries(harness.root.path(), "review_photos"), 1);
    assert_eq!(count_entries(harness.root.path(), "restaurant_images"), 0);
    assert_eq!(
        harness
            .service
            .list_files(FileFilter::default())
            .await
            .expect("list")
            .len(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn bad_items_do_not_sink_the_batch(harness: Harness) {
    let report = harness
        .service
        .upload_files(batch(
            &harness,
            vec![
                upload("ok.txt", "review_photo", b"fine"),
                upload("odd.txt", "avatar", b"other"),
                upload("empty.txt", "review_photo", b""),
                upload("menu.png", "menu_image", b"no restaurant"),
            ],
        ))
        .await
        .expect("batch accepted");

    assert!(report.any_succeeded());
    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(report.errors.len(), 3);
    assert!(report.errors[0].starts_with("odd.txt: purpose must be one of"));
    assert_eq!(report.errors[1], "empty.txt: file is empty");
    assert!(report.errors[2].contains("restaurant_id is required"));
}

#[rstest]
#[tokio::test]
async fn unknown_uploader_rejects_the_whole_batch(harness: Harness) {
    let mut request = batch(&harness, vec![upload("a.txt", "review_photo", b"x")]);
    request.uploader_id = EntityId::random();
    let error = harness
        .service
        .upload_files(request)
        .await
        .expect_err("unknown uploader");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
    assert_eq!(count_entries(harness.root.path(), "review_photos"), 0);
}

#[tokio::test]
async fn menu_images_are_forwarded_with_their_restaurant() {
    let restaurant = EntityId::random();
    let mut pipeline = MockMenuImagePipeline::new();
    pipeline
        .expect_submit_menu_image()
        .withf(move |submission| {
            submission.restaurant_id == restaurant && submission.filename == "menu.png"
        })
        .times(1)
        .returning(|_| Ok(()));
    let harness = harness_with(None, Arc::new(pipeline));

    let mut request = batch(&harness, vec![upload("menu.png", "menu_image", b"menu")]);
    request.restaurant_id = Some(restaurant);
    let report = harness.service.upload_files(request).await.expect("batch");
    assert_eq!(report.uploaded.len(), 1);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn forwarding_failure_is_a_warning() {
    let mut pipeline = MockMenuImagePipeline::new();
    pipeline
        .expect_submit_menu_image()
        .times(1)
        .returning(|_| Err(CollaboratorError::transport("connection refused")));
    let harness = harness_with(None, Arc::new(pipeline));

    let mut request = batch(&harness, vec![upload("menu.png", "menu_image", b"menu")]);
    request.restaurant_id = Some(EntityId::random());
    let report = harness.service.upload_files(request).await.expect("batch");
    assert_eq!(report.uploaded.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("menu.png: uploaded, but failed to forward"));
}

#[tokio::test]
async fn storage_failure_fails_only_that_item() {
    let mut blobs = MockBlobStorage::new();
    blobs
        .expect_put()
        .times(1)
        .returning(|path, _| Err(BlobStorageError::io(path.to_string(), "disk full")));
    let harness = harness_with(Some(Arc::new(blobs)), Arc::new(FixtureMenuImagePipeline));

    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"x")]))
        .await
        .expect("batch");
    assert!(!report.any_succeeded());
    assert!(report.errors[0].starts_with("a.txt: failed to store file"));
}

#[rstest]
#[tokio::test]
async fn delete_removes_metadata_and_blob(harness: Harness) {
    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"bye")]))
        .await
        .expect("batch");
    let stored = report.uploaded[0].clone();

    let outcome = harness.service.delete_file(stored.id()).await.expect("deleted");
    assert!(!outcome.has_warnings());
    assert!(!exists_relative(
        harness.root.path(),
        stored.storage_path.as_str()
    ));
    let visible = harness
        .service
        .list_files(FileFilter::by_id(stored.id()))
        .await
        .expect("list");
    assert!(visible.is_empty());
}

#[tokio::test]
async fn blob_removal_failure_keeps_the_metadata_deletion() {
    let mut blobs = MockBlobStorage::new();
    blobs.expect_put().returning(|_, _| Ok(()));
    blobs
        .expect_remove()
        .times(1)
        .returning(|path| Err(BlobStorageError::io(path.to_string(), "permission denied")));
    let harness = harness_with(Some(Arc::new(blobs)), Arc::new(FixtureMenuImagePipeline));

    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"x")]))
        .await
        .expect("batch");
    let id = report.uploaded[0].id();

    let outcome = harness.service.delete_file(id).await.expect("deleted");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(
        outcome.warnings[0]
            .starts_with("File metadata deleted, but failed to delete physical file:")
    );
    let error = harness.service.delete_file(id).await.expect_err("gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn registering_known_content_returns_the_existing_file(harness: Harness) {
    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"abc")]))
        .await
        .expect("batch");
    let existing = report.uploaded[0].clone();

    let registration = harness
        .service
        .register_file(None, existing.data.clone())
        .await
        .expect("registered");
    assert!(registration.deduplicated);
    assert_eq!(registration.file.id(), existing.id());

    let mut fresh = existing.data.clone();
    fresh.checksum = Checksum::of(b"different");
    fresh.storage_path = StoragePath::allocate(FilePurpose::ReviewPhoto, "b.txt");
    let registration = harness
        .service
        .register_file(None, fresh)
        .await
        .expect("registered");
    assert!(!registration.deduplicated);
}

#[rstest]
#[tokio::test]
async fn registering_a_held_storage_path_is_rejected(harness: Harness) {
    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"abc")]))
        .await
        .expect("batch");
    let existing = report.uploaded[0].clone();

    let mut squatter = existing.data.clone();
    squatter.checksum = Checksum::of(b"other content");
    let error = harness
        .service
        .register_file(None, squatter)
        .await
        .expect_err("path already held");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details().and_then(|details| details.get("field")),
        Some(&serde_json::json!("storage_path"))
    );

    let files = harness
        .service
        .list_files(FileFilter::default())
        .await
        .expect("list");
    assert_eq!(files.len(), 1);
    assert!(exists_relative(
        harness.root.path(),
        existing.storage_path.as_str()
    ));
}

#[rstest]
#[tokio::test]
async fn a_deleted_file_releases_its_storage_path(harness: Harness) {
    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"abc")]))
        .await
        .expect("batch");
    let existing = report.uploaded[0].clone();
    harness.service.delete_file(existing.id()).await.expect("deleted");

    let registration = harness
        .service
        .register_file(None, existing.data.clone())
        .await
        .expect("registered");
    assert!(!registration.deduplicated);
    assert_ne!(registration.file.id(), existing.id());
}

#[rstest]
#[tokio::test]
async fn updating_visibility_keeps_content_fields(harness: Harness) {
    let report = harness
        .service
        .upload_files(batch(&harness, vec![upload("a.txt", "review_photo", b"abc")]))
        .await
        .expect("batch");
    let stored = report.uploaded[0].clone();

    let updated = harness
        .service
        .update_file(
            stored.id(),
            FilePatch {
                is_public: Some(false),
                ..FilePatch::default()
            },
        )
        .await
        .expect("updated");
    assert!(!updated.is_public);
    assert_eq!(updated.checksum, stored.checksum);
    assert_eq!(updated.storage_path, stored.storage_path);
}
