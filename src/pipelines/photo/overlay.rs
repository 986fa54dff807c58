// SPDX-License-Identifier: GPL-3.0-only
// Decorative overlay assets composited onto captured photos

//! Overlay assets
//!
//! Two kinds of decoration are composited over the captured video layer: a
//! frame stretched across the whole output, and a logo scaled to a fraction
//! of the output width in a corner. Assets load from image files on disk;
//! a missing or unreadable asset is skipped so capture still works.

use crate::constants::capture;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where an overlay is drawn on the output raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayPlacement {
    /// Stretched across the entire output
    FullBleed,
    /// Scaled to a fraction of the output width (aspect preserved) and
    /// anchored at a fixed pixel offset from the top-left corner
    Anchored {
        offset: (f32, f32),
        width_fraction: f32,
    },
}

/// A decoded overlay image with its placement
#[derive(Debug, Clone)]
pub struct OverlayAsset {
    pub placement: OverlayPlacement,
    pub image: RgbaImage,
}

impl OverlayAsset {
    /// Load a full-bleed frame overlay from disk
    pub async fn frame(path: &Path) -> Result<Self, String> {
        let image = load_image(path).await?;
        Ok(Self {
            placement: OverlayPlacement::FullBleed,
            image,
        })
    }

    /// Load an anchored logo overlay from disk
    pub async fn logo(path: &Path) -> Result<Self, String> {
        let image = load_image(path).await?;
        Ok(Self {
            placement: OverlayPlacement::Anchored {
                offset: capture::LOGO_OFFSET,
                width_fraction: capture::LOGO_WIDTH_FRACTION,
            },
            image,
        })
    }

    /// Wrap an already decoded image (used by tests)
    pub fn from_image(image: RgbaImage, placement: OverlayPlacement) -> Self {
        Self { placement, image }
    }
}

/// The overlays applied to every capture
#[derive(Debug, Clone, Default)]
pub struct OverlaySet {
    pub frame: Option<OverlayAsset>,
    pub logo: Option<OverlayAsset>,
}

impl OverlaySet {
    /// Load the configured overlays, skipping any that fail
    pub async fn load(frame_path: Option<&PathBuf>, logo_path: Option<&PathBuf>) -> Self {
        let frame_future = async {
            match frame_path {
                Some(path) => match OverlayAsset::frame(path).await {
                    Ok(asset) => {
                        debug!(path = %path.display(), "Frame overlay loaded");
                        Some(asset)
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping frame overlay");
                        None
                    }
                },
                None => None,
            }
        };
        let logo_future = async {
            match logo_path {
                Some(path) => match OverlayAsset::logo(path).await {
                    Ok(asset) => {
                        debug!(path = %path.display(), "Logo overlay loaded");
                        Some(asset)
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping logo overlay");
                        None
                    }
                },
                None => None,
            }
        };

        let (frame, logo) = futures::join!(frame_future, logo_future);
        Self { frame, logo }
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_none() && self.logo.is_none()
    }
}

/// Read and decode an image file into RGBA
async fn load_image(path: &Path) -> Result<RgbaImage, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes)
            .map(|decoded| decoded.to_rgba8())
            .map_err(|e| format!("cannot decode overlay: {}", e))
    })
    .await
    .map_err(|e| format!("overlay decode task failed: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_overlays_are_skipped() {
        let set = OverlaySet::load(
            Some(&PathBuf::from("/nonexistent/frame.png")),
            Some(&PathBuf::from("/nonexistent/logo.png")),
        )
        .await;
        assert!(set.frame.is_none());
        assert!(set.logo.is_none());
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_overlays() {
        let set = OverlaySet::load(None, None).await;
        assert!(set.is_empty());
    }

    #[test]
    fn test_logo_placement_constants() {
        let asset = OverlayAsset::from_image(
            RgbaImage::new(4, 4),
            OverlayPlacement::Anchored {
                offset: capture::LOGO_OFFSET,
                width_fraction: capture::LOGO_WIDTH_FRACTION,
            },
        );
        match asset.placement {
            OverlayPlacement::Anchored { width_fraction, .. } => {
                assert!(width_fraction > 0.0 && width_fraction < 1.0);
            }
            _ => panic!("logo should be anchored"),
        }
    }
}
