// SPDX-License-Identifier: GPL-3.0-only

//! Async photo capture pipeline
//!
//! This pipeline implements the capture workflow:
//!
//! ```text
//! Camera Session → Frame Grab → Composite → Encode → Store
//!       ↓                                              ↓
//! Preview continues uninterrupted          Preview derivation (background)
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Frame grab**: take the most recent frame from the session
//! 2. **Composite**: cover-fit crop, mirror, brightness, overlays (async)
//! 3. **Encode**: convert to PNG/JPEG (async)
//! 4. **Store**: hand off to the photo store
//!
//! A small JPEG preview is derived in a background task after the photo is
//! stored; if derivation fails the original bytes stand in permanently.
//!
//! # Key Invariants
//!
//! - Only one capture runs at a time; overlapping requests get `Busy`
//! - A capture that fails takes no action (nothing partial is stored)
//! - The busy flag clears on every exit path

pub mod compositor;
pub mod encoding;
pub mod geometry;
pub mod overlay;

pub use compositor::{compose, CompositeParams};
pub use encoding::{EncodingFormat, EncodingQuality, PhotoEncoder};
pub use geometry::VisualFrameGeometry;
pub use overlay::{OverlayAsset, OverlayPlacement, OverlaySet};

use crate::backends::camera::session::CameraSession;
use crate::storage::{CapturedPhoto, NewPhoto, PhotoId, PhotoStore, StorageError};
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Error types for capture operations
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// The camera has no usable frame yet, or the viewport is degenerate
    NotReady,
    /// Another capture is still in progress
    Busy,
    /// Compositing or encoding failed
    Encode(String),
    /// The store rejected the photo
    Store(StorageError),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::NotReady => write!(f, "Camera is not ready"),
            CaptureError::Busy => write!(f, "A capture is already in progress"),
            CaptureError::Encode(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::Store(e) => write!(f, "Storing photo failed: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<StorageError> for CaptureError {
    fn from(e: StorageError) -> Self {
        CaptureError::Store(e)
    }
}

/// Viewport parameters for one capture
#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    /// Displayed container size the user framed the shot in
    pub container_width: f32,
    pub container_height: f32,
    /// Display scale factor (device pixel ratio)
    pub output_scale: f32,
}

/// Complete photo capture pipeline
///
/// Orchestrates the frame grab → composite → encode → store workflow.
pub struct PhotoPipeline {
    encoder: PhotoEncoder,
    overlays: Arc<OverlaySet>,
    in_flight: Arc<AtomicBool>,
}

impl PhotoPipeline {
    /// Create a pipeline with loaded overlays and default encoding
    pub fn new(overlays: OverlaySet) -> Self {
        Self {
            encoder: PhotoEncoder::new(),
            overlays: Arc::new(overlays),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a capture is currently in progress
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Capture one photo from the session into the store
    ///
    /// Rejects overlapping invocations with [`CaptureError::Busy`]. On any
    /// outcome the busy flag is cleared before returning.
    pub async fn capture(
        &self,
        session: &CameraSession,
        store: &Arc<dyn PhotoStore>,
        request: &CaptureRequest,
    ) -> CaptureResult<CapturedPhoto> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptureError::Busy);
        }

        let result = self.capture_inner(session, store, request).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn capture_inner(
        &self,
        session: &CameraSession,
        store: &Arc<dyn PhotoStore>,
        request: &CaptureRequest,
    ) -> CaptureResult<CapturedPhoto> {
        let frame = session.current_frame().ok_or(CaptureError::NotReady)?;
        if frame.width == 0 || frame.height == 0 {
            return Err(CaptureError::NotReady);
        }

        let geometry = VisualFrameGeometry::cover_fit(
            request.container_width,
            request.container_height,
            frame.width,
            frame.height,
        )
        .ok_or(CaptureError::NotReady)?;
        let (output_width, output_height) = geometry.output_size(request.output_scale);
        let brightness = session.brightness();
        let mirrored = session.mirrored();

        let overlays = Arc::clone(&self.overlays);
        let composited = tokio::task::spawn_blocking(move || {
            let params = CompositeParams {
                geometry,
                output_width,
                output_height,
                brightness,
                mirrored,
                overlays: &overlays,
            };
            compositor::compose(&frame, &params)
        })
        .await
        .map_err(|e| CaptureError::Encode(format!("compositing task failed: {}", e)))?;

        let encoded = self.encoder.encode(composited).await.map_err(CaptureError::Encode)?;

        let data: Arc<[u8]> = Arc::from(encoded.data);
        let created_at = Local::now();
        let id = store
            .add(NewPhoto {
                data: Arc::clone(&data),
                format: encoded.format,
                width: encoded.width,
                height: encoded.height,
                created_at,
            })
            .await?;

        info!(
            id,
            width = encoded.width,
            height = encoded.height,
            size = data.len(),
            "Photo captured"
        );

        self.spawn_preview_task(store, id, Arc::clone(&data));

        Ok(CapturedPhoto {
            id,
            data,
            format: encoded.format,
            width: encoded.width,
            height: encoded.height,
            created_at,
            preview: None,
        })
    }

    /// Derive and attach the gallery preview in the background
    ///
    /// Failures never surface: a photo whose preview cannot be derived keeps
    /// its original bytes as the preview from then on.
    fn spawn_preview_task(&self, store: &Arc<dyn PhotoStore>, id: PhotoId, original: Arc<[u8]>) {
        let encoder = self.encoder.clone();
        let store = Arc::clone(store);
        tokio::spawn(async move {
            let preview = match encoder.encode_preview(Arc::clone(&original)).await {
                Ok(bytes) => Arc::from(bytes),
                Err(e) => {
                    debug!(id, error = %e, "Preview derivation failed; keeping original bytes");
                    original
                }
            };
            if let Err(e) = store.attach_preview(id, preview).await {
                debug!(id, error = %e, "Preview attach skipped");
            }
        });
    }
}
