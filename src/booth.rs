// SPDX-License-Identifier: GPL-3.0-only

//! Photo booth facade
//!
//! [`PhotoBooth`] wires the camera session, capture pipeline, and photo
//! store together behind the operations a frontend needs: start and stop
//! the camera, adjust brightness and focus, take photos, and manage the
//! gallery.

use crate::backends::camera::types::FacingMode;
use crate::backends::camera::{CameraBackend, CameraSession};
use crate::config::Config;
use crate::constants::ResolutionPreset;
use crate::errors::AppResult;
use crate::pipelines::photo::{CaptureError, CaptureRequest, CaptureResult, OverlaySet, PhotoPipeline};
use crate::storage::{CapturedPhoto, PhotoId, PhotoStore};
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

pub struct PhotoBooth {
    session: CameraSession,
    pipeline: PhotoPipeline,
    store: Arc<dyn PhotoStore>,
    /// Displayed container size, if the frontend reported one
    viewport: Mutex<Option<(f32, f32)>>,
    output_scale: f32,
    resolution: ResolutionPreset,
}

impl PhotoBooth {
    /// Build a booth from configuration, a camera backend, and a store
    ///
    /// Overlay assets referenced by the configuration are loaded here; a
    /// missing asset is skipped, never fatal.
    pub async fn new(
        config: &Config,
        backend: Box<dyn CameraBackend>,
        store: Arc<dyn PhotoStore>,
    ) -> Self {
        let overlays =
            OverlaySet::load(config.frame_overlay.as_ref(), config.logo_overlay.as_ref()).await;

        Self {
            session: CameraSession::new(backend, config.brightness),
            pipeline: PhotoPipeline::new(overlays),
            store,
            viewport: Mutex::new(None),
            output_scale: config.output_scale,
            resolution: config.resolution,
        }
    }

    /// Start the camera for the given facing mode
    ///
    /// Failure here is fatal to the session: no photo can be taken until a
    /// later start succeeds.
    pub async fn start_session(&self, facing: FacingMode) -> AppResult<()> {
        self.session.start(facing, self.resolution).await.map_err(|e| {
            error!(%facing, error = %e, "Failed to start camera session");
            e.into()
        })
    }

    /// Stop the camera and release the device
    pub async fn stop_session(&self) {
        self.session.stop().await;
    }

    /// Whether a camera stream is currently attached
    pub fn is_session_active(&self) -> bool {
        self.session.is_active()
    }

    /// Set brightness in [0, 1]
    pub async fn set_brightness(&self, value: f32) {
        self.session.set_brightness(value).await;
    }

    /// Current brightness value
    pub fn brightness(&self) -> f32 {
        self.session.brightness()
    }

    /// Request focus at a tap position
    pub async fn focus_at(&self, x: f32, y: f32) {
        self.session.focus_at(x, y).await;
    }

    /// Report the displayed container size used for framing
    pub fn set_viewport(&self, width: f32, height: f32) {
        *self.viewport.lock().unwrap() = Some((width, height));
    }

    /// Whether a capture is currently in progress
    pub fn is_capturing(&self) -> bool {
        self.pipeline.is_in_flight()
    }

    /// Take one photo reproducing the displayed preview
    ///
    /// Uses the reported viewport, or the stream resolution when none was
    /// reported (full-frame capture).
    pub async fn capture(&self) -> CaptureResult<CapturedPhoto> {
        let viewport = *self.viewport.lock().unwrap();
        let (container_width, container_height) = viewport.unwrap_or_else(|| {
            let (width, height) = self.resolution.dimensions();
            (width as f32, height as f32)
        });
        let request = CaptureRequest {
            container_width,
            container_height,
            output_scale: self.output_scale,
        };

        match self
            .pipeline
            .capture(&self.session, &self.store, &request)
            .await
        {
            Ok(photo) => Ok(photo),
            Err(e) => {
                match &e {
                    CaptureError::NotReady | CaptureError::Busy => {
                        warn!(error = %e, "Capture rejected")
                    }
                    _ => error!(error = %e, "Capture failed"),
                }
                Err(e)
            }
        }
    }

    /// List stored photos, newest first
    pub async fn list_photos(&self) -> AppResult<Vec<CapturedPhoto>> {
        Ok(self.store.get_all().await?)
    }

    /// Delete one stored photo
    pub async fn delete_photo(&self, id: PhotoId) -> AppResult<()> {
        self.store.delete(id).await.map_err(|e| {
            error!(id, error = %e, "Failed to delete photo");
            e.into()
        })
    }

    /// Delete every stored photo
    pub async fn delete_all_photos(&self) -> AppResult<()> {
        self.store.delete_all().await.map_err(|e| {
            error!(error = %e, "Failed to delete photos");
            e.into()
        })
    }
}
