// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};

/// Stream resolution presets
///
/// These presets define the resolution hint passed to the camera backend when
/// a session is started. The device may negotiate something close rather than
/// exact; capture geometry always works from the intrinsic dimensions the
/// stream actually reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionPreset {
    /// 640x480 - low bandwidth, fast startup
    Vga,
    /// 1280x720 - balanced quality and memory (default)
    #[default]
    Hd720,
    /// 1920x1080 - best quality, largest buffers
    FullHd,
}

impl ResolutionPreset {
    /// Get all preset variants for UI iteration
    pub const ALL: [ResolutionPreset; 3] = [
        ResolutionPreset::Vga,
        ResolutionPreset::Hd720,
        ResolutionPreset::FullHd,
    ];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            ResolutionPreset::Vga => "480p",
            ResolutionPreset::Hd720 => "720p",
            ResolutionPreset::FullHd => "1080p",
        }
    }

    /// Get the pixel dimensions for this preset
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ResolutionPreset::Vga => (640, 480),
            ResolutionPreset::Hd720 => (1280, 720),
            ResolutionPreset::FullHd => (1920, 1080),
        }
    }
}

impl std::fmt::Display for ResolutionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for ResolutionPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "480p" | "vga" => Ok(ResolutionPreset::Vga),
            "720p" | "hd" => Ok(ResolutionPreset::Hd720),
            "1080p" | "fullhd" => Ok(ResolutionPreset::FullHd),
            other => Err(format!(
                "unknown resolution preset '{}' (expected 480p, 720p or 1080p)",
                other
            )),
        }
    }
}

/// Capture compositing constants
pub mod capture {
    /// Base of the brightness gain curve: gain = BASE + value * SPAN
    ///
    /// A brightness of 0.5 yields a gain of 1.0, so the midpoint of the
    /// slider reproduces the sensor output unchanged.
    pub const BRIGHTNESS_GAIN_BASE: f32 = 0.85;

    /// Span of the brightness gain curve
    pub const BRIGHTNESS_GAIN_SPAN: f32 = 0.3;

    /// Upper bound for the display scale factor applied to the output raster.
    /// Caps memory use on high-density displays.
    pub const MAX_OUTPUT_SCALE: f32 = 2.0;

    /// Logo overlay width as a fraction of the output width
    pub const LOGO_WIDTH_FRACTION: f32 = 0.18;

    /// Logo overlay anchor offset from the top-left corner, in output pixels
    pub const LOGO_OFFSET: (f32, f32) = (10.0, 10.0);
}

/// Preview derivation constants
pub mod preview {
    /// Longest edge of a derived preview image, in pixels
    pub const MAX_EDGE: u32 = 512;
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_preset_dimensions() {
        assert_eq!(ResolutionPreset::Vga.dimensions(), (640, 480));
        assert_eq!(ResolutionPreset::Hd720.dimensions(), (1280, 720));
        assert_eq!(ResolutionPreset::FullHd.dimensions(), (1920, 1080));
    }

    #[test]
    fn test_resolution_preset_parsing() {
        assert_eq!("720p".parse::<ResolutionPreset>(), Ok(ResolutionPreset::Hd720));
        assert_eq!("VGA".parse::<ResolutionPreset>(), Ok(ResolutionPreset::Vga));
        assert!("4k".parse::<ResolutionPreset>().is_err());
    }

    #[test]
    fn test_brightness_gain_midpoint_is_identity() {
        let gain = capture::BRIGHTNESS_GAIN_BASE + 0.5 * capture::BRIGHTNESS_GAIN_SPAN;
        assert!((gain - 1.0).abs() < f32::EPSILON);
    }
}
