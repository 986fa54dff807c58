// SPDX-License-Identifier: GPL-3.0-only

//! Photobooth - a capture-and-composite photo pipeline
//!
//! This library provides the core functionality of a photo booth: managing a
//! camera stream, compositing captures that reproduce the displayed preview
//! (cover-fit crop, mirroring, brightness, overlays), and storing the
//! results with derived previews.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera backend abstraction and the synthetic camera
//! - [`booth`]: Facade wiring session, pipeline, and store together
//! - [`pipelines`]: Photo capture pipeline (geometry, compositing, encoding)
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo stores (in-memory and on-disk)
//!
//! # Example
//!
//! ```ignore
//! let store: Arc<dyn PhotoStore> = Arc::new(MemoryStore::new());
//! let booth = PhotoBooth::new(&Config::default(), Box::new(SyntheticCamera::new()), store).await;
//! booth.start_session(FacingMode::Front).await?;
//! let photo = booth.capture().await?;
//! ```

pub mod backends;
pub mod booth;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use backends::camera::types::FacingMode;
pub use booth::PhotoBooth;
pub use config::Config;
pub use constants::ResolutionPreset;
pub use errors::{AppError, AppResult};
pub use storage::{CapturedPhoto, PhotoId, PhotoStore};
