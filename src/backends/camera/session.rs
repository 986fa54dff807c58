// SPDX-License-Identifier: GPL-3.0-only
// Camera session lifecycle with stop-safe stream acquisition

//! Camera session management
//!
//! [`CameraSession`] owns at most one active camera stream at a time and
//! serializes start/stop ordering. Acquisition can take a while (device
//! negotiation, permission prompts), so the session guards against a stream
//! arriving after the session was already stopped: such a stream is released
//! immediately instead of being attached.

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraCapabilities, CameraControl, CameraFrame, FacingMode,
    StreamConstraints,
};
use crate::backends::camera::CameraBackend;
use crate::constants::ResolutionPreset;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Mutable session state shared between clones
struct SessionState {
    facing: FacingMode,
    brightness: f32,
    capabilities: Option<CameraCapabilities>,
    active: bool,
}

/// Manages the lifecycle of a single camera stream
///
/// Cheap to clone; all clones share the same underlying backend and state.
#[derive(Clone)]
pub struct CameraSession {
    backend: Arc<Mutex<Box<dyn CameraBackend>>>,
    state: Arc<Mutex<SessionState>>,
    /// Bumped on every start and stop. An acquisition that finishes under a
    /// stale epoch belongs to a stopped session and must release its stream.
    epoch: Arc<AtomicU64>,
    /// Set while device acquisition is running. While it is, `stop()` leaves
    /// the release to the epoch guard instead of waiting on the backend.
    acquiring: Arc<AtomicBool>,
}

impl CameraSession {
    /// Create a session around a backend, with an initial brightness value
    pub fn new(backend: Box<dyn CameraBackend>, brightness: f32) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            state: Arc::new(Mutex::new(SessionState {
                facing: FacingMode::default(),
                brightness: brightness.clamp(0.0, 1.0),
                capabilities: None,
                active: false,
            })),
            epoch: Arc::new(AtomicU64::new(0)),
            acquiring: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a camera stream for the given facing mode and resolution hint
    ///
    /// Any previously active stream is stopped first, so at most one stream
    /// exists at any time. Acquisition runs on the blocking pool because the
    /// backend may wait on device negotiation or a permission prompt.
    pub async fn start(
        &self,
        facing: FacingMode,
        resolution: ResolutionPreset,
    ) -> BackendResult<()> {
        self.stop().await;

        let (width, height) = resolution.dimensions();
        let constraints = StreamConstraints {
            facing,
            width,
            height,
        };
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%facing, width, height, "Acquiring camera stream");

        let backend = Arc::clone(&self.backend);
        self.acquiring.store(true, Ordering::SeqCst);
        let acquired = tokio::task::spawn_blocking(move || {
            let mut guard = backend.lock().unwrap();
            guard.acquire(&constraints)?;
            match guard.capabilities() {
                Ok(capabilities) => Ok(capabilities),
                Err(e) => {
                    guard.release();
                    Err(e)
                }
            }
        })
        .await;
        self.acquiring.store(false, Ordering::SeqCst);
        let capabilities = acquired
            .map_err(|e| BackendError::Other(format!("acquisition task failed: {}", e)))??;

        // The epoch check and the attach must happen under one state lock:
        // a stop() landing in between would release the stream but leave
        // `active` set.
        let brightness = {
            let mut state = self.state.lock().unwrap();
            if self.epoch.load(Ordering::SeqCst) != epoch {
                drop(state);
                // The session was stopped while the device was still being
                // negotiated. The late stream must not stay attached.
                info!(%facing, "Releasing stream that arrived after session stop");
                let backend = Arc::clone(&self.backend);
                let _ =
                    tokio::task::spawn_blocking(move || backend.lock().unwrap().release()).await;
                return Err(BackendError::Other(
                    "session stopped during acquisition".into(),
                ));
            }
            state.facing = facing;
            state.capabilities = Some(capabilities);
            state.active = true;
            state.brightness
        };
        info!(%facing, width, height, "Camera session started");

        // Push the persisted brightness now that the capability report is known
        self.push_exposure(brightness, &capabilities).await;

        Ok(())
    }

    /// Stop the active stream, if any
    ///
    /// Idempotent and never blocks on an in-flight acquisition: bumping the
    /// epoch makes a late-arriving stream release itself on arrival.
    pub async fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let was_active = {
            let mut state = self.state.lock().unwrap();
            let was_active = state.active;
            state.active = false;
            state.capabilities = None;
            was_active
        };

        if self.acquiring.load(Ordering::SeqCst) {
            // The backend is blocked inside device negotiation, which may sit
            // behind a permission prompt indefinitely. The epoch bump above
            // makes that stream release itself on arrival.
            debug!("Acquisition in flight; stream will be released on arrival");
            return;
        }

        let backend = Arc::clone(&self.backend);
        let _ = tokio::task::spawn_blocking(move || backend.lock().unwrap().release()).await;

        if was_active {
            info!("Camera session stopped");
        }
    }

    /// Set the brightness value, clamped to [0, 1]
    ///
    /// Local state always updates so preview and capture filtering follow the
    /// slider. Hardware exposure compensation is pushed best-effort on top,
    /// scaled linearly into the device's reported range.
    pub async fn set_brightness(&self, value: f32) {
        if !value.is_finite() {
            warn!(value, "Ignoring non-finite brightness");
            return;
        }
        let value = value.clamp(0.0, 1.0);

        let capabilities = {
            let mut state = self.state.lock().unwrap();
            state.brightness = value;
            if state.active { state.capabilities } else { None }
        };

        if let Some(capabilities) = capabilities {
            self.push_exposure(value, &capabilities).await;
        }
    }

    /// Map brightness onto the device exposure compensation range and apply it
    async fn push_exposure(&self, value: f32, capabilities: &CameraCapabilities) {
        let Some(range) = capabilities.exposure_compensation else {
            debug!("No exposure compensation control; brightness is raster-only");
            return;
        };

        let target = range.min + f64::from(value) * (range.max - range.min);
        debug!(
            brightness = value,
            target,
            min = range.min,
            max = range.max,
            "Applying exposure compensation"
        );

        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || {
            backend
                .lock()
                .unwrap()
                .apply_control(CameraControl::ExposureCompensation(target))
        })
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Exposure compensation rejected"),
            Err(e) => warn!(error = %e, "Exposure compensation task failed"),
        }
    }

    /// Focus in response to a tap at the given viewport coordinates
    ///
    /// Sets a fixed mid-range focus distance (half the device maximum). The
    /// tap point is accepted for API symmetry but does not influence the
    /// focus target. Best-effort: unsupported devices are logged and skipped.
    pub async fn focus_at(&self, x: f32, y: f32) {
        debug!(x, y, "Tap-to-focus requested");

        let capabilities = {
            let state = self.state.lock().unwrap();
            if state.active { state.capabilities } else { None }
        };
        let Some(capabilities) = capabilities else {
            debug!("Focus ignored; no active stream");
            return;
        };
        let Some(range) = capabilities.focus_distance else {
            debug!("Device reports no focus distance range");
            return;
        };
        if !capabilities.manual_focus {
            debug!("Device does not accept manual focus");
            return;
        }

        let target = range.max * 0.5;
        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || {
            backend
                .lock()
                .unwrap()
                .apply_control(CameraControl::ManualFocusDistance(target))
        })
        .await;

        match result {
            Ok(Ok(())) => debug!(target, "Manual focus applied"),
            Ok(Err(e)) => warn!(error = %e, "Manual focus rejected"),
            Err(e) => warn!(error = %e, "Focus task failed"),
        }
    }

    /// Get the most recent frame without blocking
    ///
    /// Returns `None` while the backend is busy (e.g. acquiring) or when no
    /// stream is active.
    pub fn current_frame(&self) -> Option<CameraFrame> {
        if !self.is_active() {
            return None;
        }
        match self.backend.try_lock() {
            Ok(guard) => guard.current_frame(),
            Err(_) => None,
        }
    }

    /// Current brightness value in [0, 1]
    pub fn brightness(&self) -> f32 {
        self.state.lock().unwrap().brightness
    }

    /// Facing mode of the current (or last) stream
    pub fn facing(&self) -> FacingMode {
        self.state.lock().unwrap().facing
    }

    /// Whether capture output should be mirrored horizontally
    pub fn mirrored(&self) -> bool {
        self.facing().is_mirrored()
    }

    /// Whether a stream is currently attached
    pub fn is_active(&self) -> bool {
        self.state.lock().unwrap().active
    }
}
