// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Which way the camera points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FacingMode {
    /// User-facing (selfie) camera
    #[default]
    Front,
    /// World-facing camera
    Back,
}

impl FacingMode {
    pub const ALL: [FacingMode; 2] = [FacingMode::Front, FacingMode::Back];

    /// Get the display name for this facing mode
    pub fn display_name(&self) -> &'static str {
        match self {
            FacingMode::Front => "Front",
            FacingMode::Back => "Back",
        }
    }

    /// Whether preview and capture are mirrored horizontally.
    ///
    /// Front cameras mirror so the user sees themselves as in a mirror,
    /// and captured photos match what was displayed.
    pub fn is_mirrored(&self) -> bool {
        matches!(self, FacingMode::Front)
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Front => write!(f, "front"),
            FacingMode::Back => write!(f, "back"),
        }
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(FacingMode::Front),
            "back" | "environment" => Ok(FacingMode::Back),
            other => Err(format!("unknown facing mode: {}", other)),
        }
    }
}

/// Constraints used when negotiating a camera stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Requested facing direction
    pub facing: FacingMode,
    /// Ideal frame width in pixels
    pub width: u32,
    /// Ideal frame height in pixels
    pub height: u32,
}

/// Inclusive value range for a hardware control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
}

/// Controls a backend may support on its active stream
///
/// Each control is best-effort: a backend rejects values it cannot apply
/// and the session logs and carries on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraControl {
    /// Exposure compensation in the device's native units (usually EV)
    ExposureCompensation(f64),
    /// Fixed lens position in the device's focus distance units
    ManualFocusDistance(f64),
}

/// Hardware control capabilities reported by a backend after acquisition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraCapabilities {
    /// Supported exposure compensation range, if the device exposes one
    pub exposure_compensation: Option<ControlRange>,
    /// Supported focus distance range, if the device exposes one
    pub focus_distance: Option<ControlRange>,
    /// Whether the device accepts manual focus positioning
    pub manual_focus: bool,
}

/// A single frame from the camera
///
/// Pixel data is tightly packed RGBA, 4 bytes per pixel, shared behind an
/// `Arc` so frames can be cloned into background tasks without copying.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when the frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a frame from tightly packed RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// No usable camera device for the requested constraints
    DeviceUnavailable(String),
    /// The user or platform denied camera access
    PermissionDenied(String),
    /// Operation requires an active stream
    NotInitialized,
    /// Requested control or format is not supported by the device
    Unsupported(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::DeviceUnavailable(msg) => write!(f, "Device unavailable: {}", msg),
            BackendError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            BackendError::NotInitialized => write!(f, "No active camera stream"),
            BackendError::Unsupported(msg) => write!(f, "Not supported: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_mode_parsing() {
        assert_eq!("front".parse::<FacingMode>().unwrap(), FacingMode::Front);
        assert_eq!("USER".parse::<FacingMode>().unwrap(), FacingMode::Front);
        assert_eq!("back".parse::<FacingMode>().unwrap(), FacingMode::Back);
        assert_eq!(
            "environment".parse::<FacingMode>().unwrap(),
            FacingMode::Back
        );
        assert!("sideways".parse::<FacingMode>().is_err());
    }

    #[test]
    fn test_mirroring_follows_facing() {
        assert!(FacingMode::Front.is_mirrored(), "Front camera should mirror");
        assert!(!FacingMode::Back.is_mirrored(), "Back camera should not mirror");
    }

    #[test]
    fn test_frame_from_rgba() {
        let frame = CameraFrame::from_rgba(2, 2, vec![0u8; 16]);
        assert_eq!(frame.stride, 8);
        assert_eq!(frame.data.len(), 16);
    }
}
