// SPDX-License-Identifier: GPL-3.0-only
// Synthetic camera backend producing deterministic frames

//! Synthetic camera backend
//!
//! A software camera that renders a deterministic test pattern instead of
//! talking to hardware. It backs the CLI (no real device is assumed) and the
//! test suite, and can be configured to fail, delay acquisition, or produce
//! solid-color frames.

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraCapabilities, CameraControl, CameraFrame, ControlRange,
    FacingMode, StreamConstraints,
};
use crate::backends::camera::CameraBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// An acquired synthetic stream
struct SyntheticStream {
    facing: FacingMode,
    frame: CameraFrame,
}

/// Deterministic software camera
pub struct SyntheticCamera {
    capabilities: CameraCapabilities,
    failure: Option<BackendError>,
    acquire_delay: Duration,
    solid: Option<[u8; 4]>,
    stream: Option<SyntheticStream>,
    /// Every successfully applied control, in order
    controls: Arc<Mutex<Vec<CameraControl>>>,
    /// Mirrors stream attachment; observable after the backend is boxed away
    active_probe: Arc<AtomicBool>,
}

impl SyntheticCamera {
    /// Create a camera with full control support
    pub fn new() -> Self {
        Self {
            capabilities: CameraCapabilities {
                exposure_compensation: Some(ControlRange {
                    min: -2.0,
                    max: 2.0,
                }),
                focus_distance: Some(ControlRange {
                    min: 0.0,
                    max: 10.0,
                }),
                manual_focus: true,
            },
            failure: None,
            acquire_delay: Duration::ZERO,
            solid: None,
            stream: None,
            controls: Arc::new(Mutex::new(Vec::new())),
            active_probe: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Camera reporting no hardware controls at all
    pub fn without_controls(mut self) -> Self {
        self.capabilities = CameraCapabilities::default();
        self
    }

    /// Camera whose acquisition always fails with the given error
    pub fn failing_with(mut self, error: BackendError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Camera whose acquisition blocks for the given duration
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }

    /// Camera producing solid-color frames instead of the gradient pattern
    pub fn with_solid_color(mut self, rgba: [u8; 4]) -> Self {
        self.solid = Some(rgba);
        self
    }

    /// Handle to the log of applied controls
    pub fn control_log(&self) -> Arc<Mutex<Vec<CameraControl>>> {
        Arc::clone(&self.controls)
    }

    /// Handle observing whether a stream is attached
    pub fn active_probe(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active_probe)
    }

    fn render_frame(&self, width: u32, height: u32) -> CameraFrame {
        let data = match self.solid {
            Some(rgba) => solid_pattern(width, height, rgba),
            None => test_pattern(width, height),
        };
        CameraFrame::from_rgba(width, height, data)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SyntheticCamera {
    fn acquire(&mut self, constraints: &StreamConstraints) -> BackendResult<()> {
        if !self.acquire_delay.is_zero() {
            std::thread::sleep(self.acquire_delay);
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let frame = self.render_frame(constraints.width, constraints.height);
        self.stream = Some(SyntheticStream {
            facing: constraints.facing,
            frame,
        });
        self.active_probe.store(true, Ordering::SeqCst);
        info!(
            facing = %constraints.facing,
            width = constraints.width,
            height = constraints.height,
            "Synthetic stream acquired"
        );
        Ok(())
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.active_probe.store(false, Ordering::SeqCst);
            debug!(facing = %stream.facing, "Synthetic stream released");
        }
    }

    fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    fn capabilities(&self) -> BackendResult<CameraCapabilities> {
        if self.stream.is_none() {
            return Err(BackendError::NotInitialized);
        }
        Ok(self.capabilities)
    }

    fn apply_control(&mut self, control: CameraControl) -> BackendResult<()> {
        if self.stream.is_none() {
            return Err(BackendError::NotInitialized);
        }
        match control {
            CameraControl::ExposureCompensation(_)
                if self.capabilities.exposure_compensation.is_none() =>
            {
                return Err(BackendError::Unsupported(
                    "exposure compensation".to_string(),
                ));
            }
            CameraControl::ManualFocusDistance(_) if !self.capabilities.manual_focus => {
                return Err(BackendError::Unsupported("manual focus".to_string()));
            }
            _ => {}
        }
        debug!(?control, "Synthetic control applied");
        self.controls.lock().unwrap().push(control);
        Ok(())
    }

    fn current_frame(&self) -> Option<CameraFrame> {
        self.stream.as_ref().map(|stream| stream.frame.clone())
    }
}

/// Render the deterministic gradient pattern
///
/// Red ramps left to right, green ramps top to bottom, blue is constant.
/// The corners are therefore known values, which capture tests rely on.
fn test_pattern(width: u32, height: u32) -> Vec<u8> {
    let span_x = width.saturating_sub(1).max(1);
    let span_y = height.saturating_sub(1).max(1);
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let r = (x * 255 / span_x) as u8;
            let g = (y * 255 / span_y) as u8;
            data.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    data
}

/// Render a solid-color frame
fn solid_pattern(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&rgba);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(width: u32, height: u32) -> StreamConstraints {
        StreamConstraints {
            facing: FacingMode::Front,
            width,
            height,
        }
    }

    #[test]
    fn test_acquire_release_cycle() {
        let mut camera = SyntheticCamera::new();
        assert!(!camera.is_active());

        camera.acquire(&constraints(64, 48)).unwrap();
        assert!(camera.is_active());
        let frame = camera.current_frame().expect("frame after acquire");
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);

        camera.release();
        assert!(!camera.is_active());
        assert!(camera.current_frame().is_none());

        // Release must be idempotent
        camera.release();
        assert!(!camera.is_active());
    }

    #[test]
    fn test_failure_injection() {
        let mut camera = SyntheticCamera::new()
            .failing_with(BackendError::PermissionDenied("denied by test".into()));
        let result = camera.acquire(&constraints(64, 48));
        assert!(matches!(result, Err(BackendError::PermissionDenied(_))));
        assert!(!camera.is_active());
    }

    #[test]
    fn test_controls_require_active_stream() {
        let mut camera = SyntheticCamera::new();
        let result = camera.apply_control(CameraControl::ExposureCompensation(0.5));
        assert!(matches!(result, Err(BackendError::NotInitialized)));
        assert!(camera.capabilities().is_err());
    }

    #[test]
    fn test_unsupported_controls_rejected() {
        let mut camera = SyntheticCamera::new().without_controls();
        camera.acquire(&constraints(64, 48)).unwrap();
        let result = camera.apply_control(CameraControl::ManualFocusDistance(5.0));
        assert!(matches!(result, Err(BackendError::Unsupported(_))));
    }

    #[test]
    fn test_pattern_corners() {
        let data = test_pattern(4, 4);
        // Top-left pixel: no red, no green
        assert_eq!(&data[0..4], &[0, 0, 128, 255]);
        // Top-right pixel: full red
        assert_eq!(&data[12..16], &[255, 0, 128, 255]);
        // Bottom-left pixel: full green
        assert_eq!(&data[48..52], &[0, 255, 128, 255]);
    }
}
