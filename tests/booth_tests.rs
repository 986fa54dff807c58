// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the photo booth facade
//!
//! These run the full capture path against the synthetic camera and the
//! in-memory store, checking what a user of the booth can observe.

use photobooth::backends::camera::types::FacingMode;
use photobooth::backends::synthetic::SyntheticCamera;
use photobooth::booth::PhotoBooth;
use photobooth::config::Config;
use photobooth::pipelines::photo::CaptureError;
use async_trait::async_trait;
use photobooth::storage::{
    CapturedPhoto, MemoryStore, NewPhoto, PhotoId, PhotoStore, StorageError, StorageResult,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Store whose writes always fail, as if the disk were full
struct FullDiskStore;

#[async_trait]
impl PhotoStore for FullDiskStore {
    async fn add(&self, _photo: NewPhoto) -> StorageResult<PhotoId> {
        Err(StorageError::Write("no space left on device".into()))
    }

    async fn get_all(&self) -> StorageResult<Vec<CapturedPhoto>> {
        Ok(Vec::new())
    }

    async fn attach_preview(&self, id: PhotoId, _preview: Arc<[u8]>) -> StorageResult<()> {
        Err(StorageError::NotFound(id))
    }

    async fn delete(&self, id: PhotoId) -> StorageResult<()> {
        Err(StorageError::NotFound(id))
    }

    async fn delete_all(&self) -> StorageResult<()> {
        Ok(())
    }
}

async fn make_booth(config: Config, camera: SyntheticCamera) -> (PhotoBooth, Arc<dyn PhotoStore>) {
    let store: Arc<dyn PhotoStore> = Arc::new(MemoryStore::new());
    let booth = PhotoBooth::new(&config, Box::new(camera), Arc::clone(&store)).await;
    (booth, store)
}

#[tokio::test]
async fn test_capture_without_session_is_rejected() {
    let (booth, store) = make_booth(Config::default(), SyntheticCamera::new()).await;

    let result = booth.capture().await;
    assert!(matches!(result, Err(CaptureError::NotReady)));
    assert!(store.get_all().await.unwrap().is_empty(), "nothing stored");
    assert!(!booth.is_capturing(), "busy flag must clear after rejection");

    // The failed attempt must not poison later captures
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(180.0, 320.0);
    booth.capture().await.expect("capture after start succeeds");
}

#[tokio::test]
async fn test_capture_reproduces_viewport() {
    let (booth, store) = make_booth(Config::default(), SyntheticCamera::new()).await;
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(360.0, 640.0);

    let photo = booth.capture().await.expect("capture succeeds");
    assert_eq!(photo.width, 360);
    assert_eq!(photo.height, 640);

    let decoded = image::load_from_memory(&photo.data).expect("stored bytes decode");
    assert_eq!(decoded.width(), 360);
    assert_eq!(decoded.height(), 640);

    let photos = store.get_all().await.unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].id, photo.id);
}

#[tokio::test]
async fn test_output_scale_multiplies_dimensions() {
    let config = Config {
        output_scale: 2.0,
        ..Config::default()
    };
    let (booth, _store) = make_booth(config, SyntheticCamera::new()).await;
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(180.0, 320.0);

    let photo = booth.capture().await.unwrap();
    assert_eq!(photo.width, 360);
    assert_eq!(photo.height, 640);
}

#[tokio::test]
async fn test_front_capture_mirrors_back_capture() {
    let (front_booth, _) = make_booth(Config::default(), SyntheticCamera::new()).await;
    front_booth.start_session(FacingMode::Front).await.unwrap();
    front_booth.set_viewport(640.0, 360.0);
    let front = front_booth.capture().await.unwrap();

    let (back_booth, _) = make_booth(Config::default(), SyntheticCamera::new()).await;
    back_booth.start_session(FacingMode::Back).await.unwrap();
    back_booth.set_viewport(640.0, 360.0);
    let back = back_booth.capture().await.unwrap();

    let front_image = image::load_from_memory(&front.data).unwrap().to_rgba8();
    let back_image = image::load_from_memory(&back.data).unwrap().to_rgba8();
    let width = front_image.width();

    for y in (0..front_image.height()).step_by(37) {
        for x in 0..width {
            assert_eq!(
                front_image.get_pixel(x, y),
                back_image.get_pixel(width - 1 - x, y),
                "front pixel ({}, {}) should equal horizontally flipped back pixel",
                x,
                y
            );
        }
    }
}

#[tokio::test]
async fn test_brightness_changes_captured_pixels() {
    let dark_config = Config {
        brightness: 0.0,
        ..Config::default()
    };
    let (dark_booth, _) =
        make_booth(dark_config, SyntheticCamera::new().with_solid_color([128, 128, 128, 255]))
            .await;
    dark_booth.start_session(FacingMode::Front).await.unwrap();
    dark_booth.set_viewport(320.0, 180.0);
    let dark = dark_booth.capture().await.unwrap();

    let bright_config = Config {
        brightness: 1.0,
        ..Config::default()
    };
    let (bright_booth, _) = make_booth(
        bright_config,
        SyntheticCamera::new().with_solid_color([128, 128, 128, 255]),
    )
    .await;
    bright_booth.start_session(FacingMode::Front).await.unwrap();
    bright_booth.set_viewport(320.0, 180.0);
    let bright = bright_booth.capture().await.unwrap();

    let dark_image = image::load_from_memory(&dark.data).unwrap().to_rgba8();
    let bright_image = image::load_from_memory(&bright.data).unwrap().to_rgba8();

    // 128 * 0.85 = 108 and 128 * 1.15 = 147 after truncation
    assert_eq!(dark_image.get_pixel(10, 10)[0], 108);
    assert_eq!(bright_image.get_pixel(10, 10)[0], 147);
}

#[tokio::test]
async fn test_concurrent_capture_is_rejected_as_busy() {
    let (booth, store) = make_booth(Config::default(), SyntheticCamera::new()).await;
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(640.0, 640.0);

    let (first, second) = tokio::join!(booth.capture(), booth.capture());

    let outcomes = [&first, &second];
    let ok_count = outcomes.iter().filter(|r| r.is_ok()).count();
    let busy_count = outcomes
        .iter()
        .filter(|r| matches!(r, Err(CaptureError::Busy)))
        .count();
    assert_eq!(ok_count, 1, "exactly one capture should succeed");
    assert_eq!(busy_count, 1, "the overlapping capture should be rejected");

    assert_eq!(store.get_all().await.unwrap().len(), 1);
    assert!(!booth.is_capturing(), "busy flag must clear after both settle");

    // A later capture goes through normally
    booth.capture().await.expect("sequential capture succeeds");
    assert_eq!(store.get_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_store_write_failure_leaves_no_photo_and_resets_flag() {
    let store: Arc<dyn PhotoStore> = Arc::new(FullDiskStore);
    let booth = PhotoBooth::new(
        &Config::default(),
        Box::new(SyntheticCamera::new()),
        Arc::clone(&store),
    )
    .await;
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(180.0, 320.0);

    let result = booth.capture().await;
    assert!(
        matches!(result, Err(CaptureError::Store(StorageError::Write(_)))),
        "write failure must surface as a store error, got {:?}",
        result.map(|p| p.id)
    );
    assert!(store.get_all().await.unwrap().is_empty(), "nothing stored");
    assert!(
        !booth.is_capturing(),
        "busy flag must clear after a failed capture"
    );

    // The booth is not stuck: a retry runs and fails the same way
    let retry = booth.capture().await;
    assert!(matches!(retry, Err(CaptureError::Store(_))));
    assert!(!booth.is_capturing());
}

#[tokio::test]
async fn test_gallery_lists_newest_first_and_deletes() {
    let (booth, _) = make_booth(Config::default(), SyntheticCamera::new()).await;
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(120.0, 160.0);

    let first = booth.capture().await.unwrap();
    let second = booth.capture().await.unwrap();

    let photos = booth.list_photos().await.unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].id, second.id, "newest photo listed first");
    assert_eq!(photos[1].id, first.id);

    booth.delete_photo(first.id).await.unwrap();
    let photos = booth.list_photos().await.unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].id, second.id);

    assert!(
        booth.delete_photo(first.id).await.is_err(),
        "deleting twice reports an error"
    );

    booth.delete_all_photos().await.unwrap();
    assert!(booth.list_photos().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_preview_is_derived_in_background() {
    let (booth, _) = make_booth(Config::default(), SyntheticCamera::new()).await;
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(360.0, 640.0);

    let photo = booth.capture().await.unwrap();
    assert!(photo.preview.is_none(), "preview arrives later");

    let mut preview = None;
    for _ in 0..250 {
        let photos = booth.list_photos().await.unwrap();
        if let Some(bytes) = photos.first().and_then(|p| p.preview.clone()) {
            preview = Some(bytes);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let preview = preview.expect("preview should be attached in the background");
    let preview_image = image::load_from_memory(&preview).expect("preview decodes");
    assert!(preview_image.width() <= 512);
    assert!(preview_image.height() <= 512);
}

#[tokio::test]
async fn test_missing_overlay_files_never_block_capture() {
    let config = Config {
        frame_overlay: Some(PathBuf::from("/nonexistent/frame.png")),
        logo_overlay: Some(PathBuf::from("/nonexistent/logo.png")),
        ..Config::default()
    };
    let (booth, _) = make_booth(config, SyntheticCamera::new()).await;
    booth.start_session(FacingMode::Front).await.unwrap();
    booth.set_viewport(180.0, 320.0);

    booth
        .capture()
        .await
        .expect("capture works even when overlays fail to load");
}

#[tokio::test]
async fn test_session_stop_prevents_capture() {
    let (booth, _) = make_booth(Config::default(), SyntheticCamera::new()).await;
    booth.start_session(FacingMode::Front).await.unwrap();
    assert!(booth.is_session_active());

    booth.stop_session().await;
    assert!(!booth.is_session_active());

    let result = booth.capture().await;
    assert!(matches!(result, Err(CaptureError::NotReady)));
}
