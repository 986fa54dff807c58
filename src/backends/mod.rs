// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! This module provides backend implementations behind a common trait:
//! - Camera session management and the backend trait
//! - A synthetic camera producing deterministic test frames
//!
//! # Architecture
//!
//! The backend layer abstracts device access, providing a consistent API
//! regardless of where frames come from:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                Booth Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────────┐  ┌──────────────────┐  │
//! │  │  CameraSession  │──│  CameraBackend   │  │
//! │  │   (lifecycle)   │  │     (trait)      │  │
//! │  └─────────────────┘  └────────┬─────────┘  │
//! │                       ┌────────┴─────────┐  │
//! │                       │ SyntheticCamera  │  │
//! │                       └──────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Session lifecycle, backend trait and shared camera types
//! - [`synthetic`]: Deterministic software camera for tests and the CLI

pub mod camera;
pub mod synthetic;
