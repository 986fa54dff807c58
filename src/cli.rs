// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for photo booth operations
//!
//! This module provides command-line functionality for:
//! - Taking photos with the synthetic camera
//! - Listing, deleting, and clearing stored photos

use photobooth::backends::camera::types::FacingMode;
use photobooth::backends::synthetic::SyntheticCamera;
use photobooth::booth::PhotoBooth;
use photobooth::config::Config;
use photobooth::storage::{DiskStore, PhotoId, PhotoStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Take one photo and store it
pub fn capture(
    facing: Option<FacingMode>,
    brightness: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let facing = facing.unwrap_or(config.facing);
    let dir = output.unwrap_or_else(|| config.photo_dir());

    let store: Arc<dyn PhotoStore> = Arc::new(DiskStore::open(&dir)?);
    let backend = Box::new(SyntheticCamera::new());

    let rt = tokio::runtime::Runtime::new()?;
    let photo = rt.block_on(async {
        let booth = PhotoBooth::new(&config, backend, store).await;

        if let Some(value) = brightness {
            booth.set_brightness(value).await;
        }

        booth.start_session(facing).await?;
        if let (Some(width), Some(height)) = (width, height) {
            booth.set_viewport(width, height);
        }

        let result = booth.capture().await;
        booth.stop_session().await;
        Ok::<_, Box<dyn std::error::Error>>(result?)
    })?;

    println!(
        "Saved photo {} ({}x{}, {} bytes) to {}",
        photo.id,
        photo.width,
        photo.height,
        photo.data.len(),
        dir.display()
    );
    Ok(())
}

/// List stored photos, newest first
pub fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let dir = config.photo_dir();
    let store = DiskStore::open(&dir)?;

    let rt = tokio::runtime::Runtime::new()?;
    let photos = rt.block_on(store.get_all())?;

    if photos.is_empty() {
        println!("No photos in {}.", dir.display());
        return Ok(());
    }

    println!("Photos in {}:", dir.display());
    println!();
    for photo in photos {
        println!(
            "  [{}] {}  {}x{}  {}  {} bytes",
            photo.id,
            photo.created_at.format("%Y-%m-%d %H:%M:%S"),
            photo.width,
            photo.height,
            photo.format.extension(),
            photo.data.len()
        );
    }
    Ok(())
}

/// Delete one stored photo by id
pub fn delete(id: PhotoId) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let store = DiskStore::open(config.photo_dir())?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(store.delete(id))?;

    println!("Deleted photo {}", id);
    Ok(())
}

/// Delete every stored photo
pub fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let store = DiskStore::open(config.photo_dir())?;

    let rt = tokio::runtime::Runtime::new()?;
    let count = rt.block_on(async {
        let count = store.get_all().await?.len();
        store.delete_all().await?;
        Ok::<_, Box<dyn std::error::Error>>(count)
    })?;

    println!("Deleted {} photo(s)", count);
    Ok(())
}
