// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipeline for photo capture
//!
//! This module provides the async capture pipeline that turns live camera
//! frames into stored photos. Heavy raster and encode work runs on the
//! blocking pool so a live preview is never interrupted.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │ Photo Store  │
//! │   (RGBA)     │     │  - Cover-fit crop │     │  + preview   │
//! │              │     │  - Mirror/gain    │     │              │
//! │              │     │  - Overlays       │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Design Principles
//!
//! 1. **Non-blocking**: frame grab is instantaneous, raster work is offloaded
//! 2. **What you see is what you get**: output reproduces the displayed
//!    preview including crop, mirroring, brightness, and overlays
//! 3. **Single capture at a time**: overlapping requests are rejected
//!
//! # Modules
//!
//! - [`photo`]: Capture orchestration, compositing, and encoding

pub mod photo;
