// SPDX-License-Identifier: GPL-3.0-only
// Cover-fit geometry between a display container and the camera's pixels

//! Capture geometry
//!
//! The preview is displayed with cover fit: the video is scaled uniformly so
//! it fills the container, and whatever overflows is hidden. Capture must
//! reproduce exactly the visible region, so the crop window is computed here
//! in source-intrinsic pixel space from the two aspect ratios.

use crate::constants::capture;

/// Geometry linking the on-screen container to a crop window in the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualFrameGeometry {
    /// Displayed container size in CSS-like units
    pub container_width: f32,
    pub container_height: f32,
    /// Source frame size in pixels
    pub intrinsic_width: u32,
    pub intrinsic_height: u32,
    /// Visible crop window in source pixel space (fractional by design)
    pub crop_x: f32,
    pub crop_y: f32,
    pub crop_width: f32,
    pub crop_height: f32,
}

impl VisualFrameGeometry {
    /// Compute the cover-fit crop window
    ///
    /// Returns `None` when either size is degenerate (zero, negative or
    /// non-finite), in which case no capture should be attempted.
    pub fn cover_fit(
        container_width: f32,
        container_height: f32,
        intrinsic_width: u32,
        intrinsic_height: u32,
    ) -> Option<Self> {
        if !container_width.is_finite()
            || !container_height.is_finite()
            || container_width <= 0.0
            || container_height <= 0.0
            || intrinsic_width == 0
            || intrinsic_height == 0
        {
            return None;
        }

        let container_aspect = container_width / container_height;
        let intrinsic_w = intrinsic_width as f32;
        let intrinsic_h = intrinsic_height as f32;
        let video_aspect = intrinsic_w / intrinsic_h;

        // Container wider than the video: full width is visible, the top and
        // bottom are cropped. Otherwise full height is visible and the sides
        // are cropped. Equal aspects fall through to a full-frame crop.
        let (crop_x, crop_y, crop_width, crop_height) = if container_aspect > video_aspect {
            let crop_height = intrinsic_w / container_aspect;
            (0.0, (intrinsic_h - crop_height) / 2.0, intrinsic_w, crop_height)
        } else {
            let crop_width = intrinsic_h * container_aspect;
            ((intrinsic_w - crop_width) / 2.0, 0.0, crop_width, intrinsic_h)
        };

        Some(Self {
            container_width,
            container_height,
            intrinsic_width,
            intrinsic_height,
            crop_x,
            crop_y,
            crop_width,
            crop_height,
        })
    }

    /// Output raster size for a given display scale factor
    ///
    /// The scale is capped so high-density displays cannot balloon the
    /// output; invalid scales fall back to 1.0. Each dimension is at least
    /// one pixel.
    pub fn output_size(&self, scale: f32) -> (u32, u32) {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale.min(capture::MAX_OUTPUT_SCALE)
        } else {
            1.0
        };
        let width = (self.container_width * scale).round().max(1.0) as u32;
        let height = (self.container_height * scale).round().max(1.0) as u32;
        (width, height)
    }
}
