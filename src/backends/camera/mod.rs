// SPDX-License-Identifier: GPL-3.0-only
// Camera backend with trait-based abstraction

//! Camera backend abstraction
//!
//! This module provides a trait-based abstraction over camera devices.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │     PhotoBooth      │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │    CameraSession    │  ← Lifecycle, controls, frame access
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackend Trait │  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!      ┌───────────┐
//!      │ Synthetic │  ← Concrete implementation
//!      └───────────┘
//! ```

pub mod session;
pub mod types;

pub use session::CameraSession;
pub use types::*;

/// Camera backend trait
///
/// All camera backends implement this trait to provide:
/// - Stream acquisition and release
/// - Control capability reporting
/// - Best-effort hardware control application
/// - Access to the most recent frame
pub trait CameraBackend: Send + Sync {
    /// Acquire a camera stream matching the given constraints
    ///
    /// This may block while the platform negotiates device access, including
    /// any permission prompt shown to the user. On success the backend holds
    /// exactly one active stream until [`release`](Self::release) is called.
    ///
    /// # Returns
    /// * `Ok(())` - Stream acquired and producing frames
    /// * `Err(BackendError)` - No device, permission denied, or other failure
    fn acquire(&mut self, constraints: &StreamConstraints) -> BackendResult<()>;

    /// Release the active stream and its device
    ///
    /// Idempotent: releasing with no active stream is a no-op.
    fn release(&mut self);

    /// Check whether a stream is currently active
    fn is_active(&self) -> bool;

    /// Report hardware control capabilities of the active stream
    ///
    /// # Returns
    /// * `Ok(CameraCapabilities)` - Capability report (fields may be `None`)
    /// * `Err(BackendError::NotInitialized)` - No active stream
    fn capabilities(&self) -> BackendResult<CameraCapabilities>;

    /// Apply a hardware control to the active stream
    ///
    /// # Returns
    /// * `Ok(())` - Control applied
    /// * `Err(BackendError::Unsupported)` - Device lacks this control
    /// * `Err(BackendError::NotInitialized)` - No active stream
    fn apply_control(&mut self, control: CameraControl) -> BackendResult<()>;

    /// Get the most recent frame from the active stream
    ///
    /// # Returns
    /// * `Some(CameraFrame)` - Latest frame, ready for compositing
    /// * `None` - No active stream, or no frame has arrived yet
    fn current_frame(&self) -> Option<CameraFrame>;
}
