//! Split-write protocol flows: pointer and content move together,
//! photo rules are enforced before any write, and legacy documents
//! still resolve.

use postmap_core::error::CoreError;
use postmap_core::photo;
use postmap_core::spot::{GeoPoint, SpotCategory, SpotView};
use postmap_core::types::SpotAuthor;
use postmap_store::spots::{SpotStore, SpotSubmission};
use postmap_store::{
    DocumentStore, MemoryStore, WriteBatch, WriteOp, SPOTS_COLLECTION, SPOT_CONTENTS_COLLECTION,
};

use assert_matches::assert_matches;
use serde_json::json;

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([180, 60, 20]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn author() -> SpotAuthor {
    SpotAuthor {
        uid: "uid-1".into(),
        display_name: "Tester".into(),
    }
}

fn here() -> GeoPoint {
    GeoPoint {
        lat: 35.6812,
        lng: 139.7671,
    }
}

fn submission() -> SpotSubmission {
    SpotSubmission {
        name: Some("Station west exit".into()),
        category: Some(SpotCategory::Prohibited),
        tags: vec!["管理会社".into()],
        memo: "Front desk asked us to stop".into(),
        new_photos: vec![png_bytes()],
        kept_photo_urls: Vec::new(),
    }
}

#[tokio::test]
async fn create_writes_pointer_and_content_in_one_batch() {
    let store = MemoryStore::new();
    let spot = SpotStore::create(&store, submission(), here(), author())
        .await
        .unwrap();

    assert_eq!(store.commit_count(), 1);
    assert_eq!(store.doc_count(SPOTS_COLLECTION).await, 1);
    assert_eq!(store.doc_count(SPOT_CONTENTS_COLLECTION).await, 1);

    let record = SpotStore::find(&store, &spot.id).await.unwrap().unwrap();
    assert!(!record.is_legacy());
    assert!(record.needs_content_fetch());
    assert!(record.spot().thumbnail_url.as_deref().is_some_and(photo::is_data_uri));

    let content = SpotStore::content(&store, &spot.id).await.unwrap();
    assert_eq!(content.memo, "Front desk asked us to stop");
    assert_eq!(content.photo_urls.len(), 1);
    assert!(photo::is_data_uri(&content.photo_urls[0]));
}

#[tokio::test]
async fn photoless_submission_is_rejected_before_any_write() {
    let store = MemoryStore::new();
    let mut sub = submission();
    sub.new_photos.clear();

    let err = SpotStore::create(&store, sub, here(), author())
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
    assert_eq!(store.commit_count(), 0);
    assert_eq!(store.doc_count(SPOTS_COLLECTION).await, 0);
}

#[tokio::test]
async fn photos_are_capped_at_two() {
    let store = MemoryStore::new();
    let mut sub = submission();
    sub.new_photos = vec![png_bytes(), png_bytes(), png_bytes()];

    let spot = SpotStore::create(&store, sub, here(), author())
        .await
        .unwrap();
    let content = SpotStore::content(&store, &spot.id).await.unwrap();
    assert_eq!(content.photo_urls.len(), 2);
}

#[tokio::test]
async fn new_photos_are_ordered_ahead_of_kept_urls() {
    let store = MemoryStore::new();
    let mut sub = submission();
    sub.kept_photo_urls = vec!["https://photos.example/kept.jpg".into()];

    let spot = SpotStore::create(&store, sub, here(), author())
        .await
        .unwrap();
    let content = SpotStore::content(&store, &spot.id).await.unwrap();
    assert_eq!(content.photo_urls.len(), 2);
    assert!(photo::is_data_uri(&content.photo_urls[0]));
    assert_eq!(content.photo_urls[1], "https://photos.example/kept.jpg");
}

#[tokio::test]
async fn edit_replaces_content_but_preserves_pointer_origin() {
    let store = MemoryStore::new();
    let spot = SpotStore::create(&store, submission(), here(), author())
        .await
        .unwrap();

    let kept = SpotStore::content(&store, &spot.id).await.unwrap().photo_urls;
    SpotStore::edit(
        &store,
        &spot.id,
        SpotSubmission {
            name: Some("Renamed".into()),
            category: Some(SpotCategory::Info),
            tags: vec!["ラベル".into()],
            memo: "updated memo".into(),
            new_photos: Vec::new(),
            kept_photo_urls: kept,
        },
    )
    .await
    .unwrap();

    let record = SpotStore::find(&store, &spot.id).await.unwrap().unwrap();
    let edited = record.spot();
    assert_eq!(edited.name.as_deref(), Some("Renamed"));
    assert_eq!(edited.category, SpotCategory::Info);
    // location and authorship survive the merge write untouched
    assert_eq!(edited.location, spot.location);
    assert_eq!(edited.created_at, spot.created_at);
    assert_eq!(edited.created_by, spot.created_by);

    let content = SpotStore::content(&store, &spot.id).await.unwrap();
    assert_eq!(content.memo, "updated memo");
}

#[tokio::test]
async fn edit_of_missing_spot_is_not_found() {
    let store = MemoryStore::new();
    let err = SpotStore::edit(&store, "nope", submission()).await.unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "spot", .. });
}

#[tokio::test]
async fn delete_removes_both_documents() {
    let store = MemoryStore::new();
    let spot = SpotStore::create(&store, submission(), here(), author())
        .await
        .unwrap();

    assert!(SpotStore::delete(&store, &spot.id).await.unwrap());
    assert_eq!(store.doc_count(SPOTS_COLLECTION).await, 0);
    assert_eq!(store.doc_count(SPOT_CONTENTS_COLLECTION).await, 0);
    assert!(!SpotStore::delete(&store, &spot.id).await.unwrap());
}

#[tokio::test]
async fn legacy_document_resolves_inline_without_content_fetch() {
    let store = MemoryStore::new();
    store
        .commit(WriteBatch::single(WriteOp::set(
            SPOTS_COLLECTION,
            "old-1",
            json!({
                "location": { "lat": 35.0, "lng": 139.0 },
                "category": "caution",
                "tags": [],
                "memo": "written before the split",
                "photoUrls": ["https://photos.example/old-1.jpg"],
            }),
        )))
        .await
        .unwrap();

    let record = SpotStore::find(&store, "old-1").await.unwrap().unwrap();
    assert!(record.is_legacy());
    assert!(!record.needs_content_fetch());

    // a stray content document must not shadow the inline values
    let view = SpotView::resolve(
        &record,
        Some(&postmap_core::spot::SpotContent {
            id: "old-1".into(),
            memo: "imposter".into(),
            photo_urls: vec!["data:image/jpeg;base64,AAAA".into()],
        }),
    );
    assert_eq!(view.memo, "written before the split");
    assert_eq!(view.photo_urls, vec!["https://photos.example/old-1.jpg"]);
    assert!(!view.placeholder);

    // missing content documents read back as empty, never as an error
    let content = SpotStore::content(&store, "old-1").await.unwrap();
    assert!(content.memo.is_empty());
    assert!(content.photo_urls.is_empty());
}
