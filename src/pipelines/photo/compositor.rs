// SPDX-License-Identifier: GPL-3.0-only

//! Raster compositing for captured photos
//!
//! Reproduces the displayed preview on a pixel raster:
//! - Cover-fit crop of the source frame, resampled to the output size
//! - Horizontal mirroring for front cameras
//! - Multiplicative brightness gain
//! - Frame and logo overlays alpha-blended on top
//!
//! The video layer is drawn by inverse mapping: each output pixel is mapped
//! back into the crop window and sampled bilinearly, so mirroring and
//! scaling cost nothing extra.

use crate::backends::camera::types::CameraFrame;
use crate::constants::capture;
use crate::pipelines::photo::geometry::VisualFrameGeometry;
use crate::pipelines::photo::overlay::{OverlayPlacement, OverlaySet};
use image::RgbaImage;
use tracing::debug;

/// Everything the compositor needs to draw one capture
pub struct CompositeParams<'a> {
    pub geometry: VisualFrameGeometry,
    pub output_width: u32,
    pub output_height: u32,
    /// Brightness value in [0, 1]; 0.5 is unity gain
    pub brightness: f32,
    /// Mirror the video layer horizontally (front camera)
    pub mirrored: bool,
    pub overlays: &'a OverlaySet,
}

/// Draw the full composite for one capture
pub fn compose(frame: &CameraFrame, params: &CompositeParams) -> RgbaImage {
    debug!(
        output_width = params.output_width,
        output_height = params.output_height,
        brightness = params.brightness,
        mirrored = params.mirrored,
        "Compositing capture"
    );

    let mut output = RgbaImage::new(params.output_width, params.output_height);
    draw_video_layer(&mut output, frame, params);

    if let Some(overlay) = &params.overlays.frame {
        if let OverlayPlacement::FullBleed = overlay.placement {
            draw_full_bleed(&mut output, &overlay.image);
        }
    }
    if let Some(overlay) = &params.overlays.logo {
        if let OverlayPlacement::Anchored {
            offset,
            width_fraction,
        } = overlay.placement
        {
            draw_anchored(&mut output, &overlay.image, offset, width_fraction);
        }
    }

    output
}

/// Resample the crop window into the output, applying mirror and gain
fn draw_video_layer(output: &mut RgbaImage, frame: &CameraFrame, params: &CompositeParams) {
    let geometry = &params.geometry;
    let gain = capture::BRIGHTNESS_GAIN_BASE + params.brightness * capture::BRIGHTNESS_GAIN_SPAN;
    let step_x = geometry.crop_width / params.output_width as f32;
    let step_y = geometry.crop_height / params.output_height as f32;

    for oy in 0..params.output_height {
        let src_y = geometry.crop_y + (oy as f32 + 0.5) * step_y - 0.5;
        for ox in 0..params.output_width {
            let sample_x = if params.mirrored {
                params.output_width - 1 - ox
            } else {
                ox
            };
            let src_x = geometry.crop_x + (sample_x as f32 + 0.5) * step_x - 0.5;

            let [r, g, b] = sample_frame_bilinear(frame, src_x, src_y);
            let pixel = output.get_pixel_mut(ox, oy);
            pixel[0] = (r * gain).clamp(0.0, 255.0) as u8;
            pixel[1] = (g * gain).clamp(0.0, 255.0) as u8;
            pixel[2] = (b * gain).clamp(0.0, 255.0) as u8;
            pixel[3] = 255;
        }
    }
}

/// Stretch an overlay across the whole output and blend it over
fn draw_full_bleed(output: &mut RgbaImage, overlay: &RgbaImage) {
    let (out_w, out_h) = output.dimensions();
    let scale_x = overlay.width() as f32 / out_w as f32;
    let scale_y = overlay.height() as f32 / out_h as f32;

    for oy in 0..out_h {
        let src_y = (oy as f32 + 0.5) * scale_y - 0.5;
        for ox in 0..out_w {
            let src_x = (ox as f32 + 0.5) * scale_x - 0.5;
            let src = sample_image_bilinear(overlay, src_x, src_y);
            blend_over(output.get_pixel_mut(ox, oy), src);
        }
    }
}

/// Scale an overlay to a fraction of the output width and blend it at a
/// fixed offset, preserving its aspect ratio and clipping at the edges
fn draw_anchored(
    output: &mut RgbaImage,
    overlay: &RgbaImage,
    offset: (f32, f32),
    width_fraction: f32,
) {
    let (out_w, out_h) = output.dimensions();
    let target_w = (out_w as f32 * width_fraction).max(1.0);
    let target_h = (target_w * overlay.height() as f32 / overlay.width() as f32).max(1.0);
    let (origin_x, origin_y) = offset;

    let x_start = origin_x.max(0.0).floor() as u32;
    let y_start = origin_y.max(0.0).floor() as u32;
    let x_end = ((origin_x + target_w).ceil().max(0.0) as u32).min(out_w);
    let y_end = ((origin_y + target_h).ceil().max(0.0) as u32).min(out_h);

    let scale_x = overlay.width() as f32 / target_w;
    let scale_y = overlay.height() as f32 / target_h;

    for oy in y_start..y_end {
        let src_y = (oy as f32 - origin_y + 0.5) * scale_y - 0.5;
        for ox in x_start..x_end {
            let src_x = (ox as f32 - origin_x + 0.5) * scale_x - 0.5;
            let src = sample_image_bilinear(overlay, src_x, src_y);
            blend_over(output.get_pixel_mut(ox, oy), src);
        }
    }
}

/// Source-over blend of a premultiplied-free RGBA sample onto a pixel
fn blend_over(dst: &mut image::Rgba<u8>, src: [f32; 4]) {
    let alpha = src[3] / 255.0;
    if alpha <= 0.0 {
        return;
    }
    for c in 0..3 {
        let blended = src[c] * alpha + dst[c] as f32 * (1.0 - alpha);
        dst[c] = blended.round().clamp(0.0, 255.0) as u8;
    }
}

/// Bilinear RGB sample from a camera frame, honoring its row stride
fn sample_frame_bilinear(frame: &CameraFrame, x: f32, y: f32) -> [f32; 3] {
    let max_x = (frame.width - 1) as f32;
    let max_y = (frame.height - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(frame.width - 1);
    let y1 = (y0 + 1).min(frame.height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = frame_pixel(frame, x0, y0);
    let p10 = frame_pixel(frame, x1, y0);
    let p01 = frame_pixel(frame, x0, y1);
    let p11 = frame_pixel(frame, x1, y1);

    let mut out = [0.0f32; 3];
    for c in 0..3 {
        let top = p00[c] + (p10[c] - p00[c]) * fx;
        let bottom = p01[c] + (p11[c] - p01[c]) * fx;
        out[c] = top + (bottom - top) * fy;
    }
    out
}

fn frame_pixel(frame: &CameraFrame, x: u32, y: u32) -> [f32; 3] {
    let offset = (y * frame.stride + x * 4) as usize;
    [
        frame.data[offset] as f32,
        frame.data[offset + 1] as f32,
        frame.data[offset + 2] as f32,
    ]
}

/// Bilinear RGBA sample from an overlay image
fn sample_image_bilinear(image: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let max_x = (image.width() - 1) as f32;
    let max_y = (image.height() - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = image.get_pixel(x0, y0);
    let p10 = image.get_pixel(x1, y0);
    let p01 = image.get_pixel(x0, y1);
    let p11 = image.get_pixel(x1, y1);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] as f32 + (p10[c] as f32 - p00[c] as f32) * fx;
        let bottom = p01[c] as f32 + (p11[c] as f32 - p01[c] as f32) * fx;
        out[c] = top + (bottom - top) * fy;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::photo::overlay::OverlayAsset;
    use image::Rgba;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> CameraFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        CameraFrame::from_rgba(width, height, data)
    }

    fn params<'a>(
        frame: &CameraFrame,
        width: u32,
        height: u32,
        brightness: f32,
        mirrored: bool,
        overlays: &'a OverlaySet,
    ) -> CompositeParams<'a> {
        let geometry = VisualFrameGeometry::cover_fit(
            width as f32,
            height as f32,
            frame.width,
            frame.height,
        )
        .expect("valid geometry");
        CompositeParams {
            geometry,
            output_width: width,
            output_height: height,
            brightness,
            mirrored,
            overlays,
        }
    }

    #[test]
    fn test_mirror_flips_horizontally() {
        // Left pixel black, right pixel white
        let data = vec![0, 0, 0, 255, 255, 255, 255, 255];
        let frame = CameraFrame::from_rgba(2, 1, data);
        let overlays = OverlaySet::default();

        let straight = compose(&frame, &params(&frame, 2, 1, 0.5, false, &overlays));
        assert!(straight.get_pixel(0, 0)[0] < 128);
        assert!(straight.get_pixel(1, 0)[0] > 128);

        let mirrored = compose(&frame, &params(&frame, 2, 1, 0.5, true, &overlays));
        assert!(mirrored.get_pixel(0, 0)[0] > 128);
        assert!(mirrored.get_pixel(1, 0)[0] < 128);
    }

    #[test]
    fn test_brightness_gain_endpoints() {
        let frame = solid_frame(4, 4, [128, 128, 128, 255]);
        let overlays = OverlaySet::default();

        let dark = compose(&frame, &params(&frame, 4, 4, 0.0, false, &overlays));
        let neutral = compose(&frame, &params(&frame, 4, 4, 0.5, false, &overlays));
        let bright = compose(&frame, &params(&frame, 4, 4, 1.0, false, &overlays));

        // 128 * 0.85 and 128 * 1.15, truncated
        assert_eq!(dark.get_pixel(1, 1)[0], 108);
        assert_eq!(neutral.get_pixel(1, 1)[0], 128);
        assert_eq!(bright.get_pixel(1, 1)[0], 147);
        assert!(dark.get_pixel(1, 1)[0] < bright.get_pixel(1, 1)[0]);
    }

    #[test]
    fn test_full_bleed_overlay_covers_output() {
        let frame = solid_frame(4, 4, [0, 0, 0, 255]);
        let mut red = RgbaImage::new(1, 1);
        red.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let overlays = OverlaySet {
            frame: Some(OverlayAsset::from_image(red, OverlayPlacement::FullBleed)),
            logo: None,
        };

        let output = compose(&frame, &params(&frame, 4, 4, 0.5, false, &overlays));
        for pixel in output.pixels() {
            assert_eq!(pixel[0], 255);
            assert_eq!(pixel[1], 0);
        }
    }

    #[test]
    fn test_transparent_overlay_leaves_video_untouched() {
        let frame = solid_frame(4, 4, [10, 20, 30, 255]);
        let clear = RgbaImage::new(2, 2); // all zeroes, alpha 0
        let overlays = OverlaySet {
            frame: Some(OverlayAsset::from_image(clear, OverlayPlacement::FullBleed)),
            logo: None,
        };

        let with_overlay = compose(&frame, &params(&frame, 4, 4, 0.5, false, &overlays));
        let without = compose(&frame, &params(&frame, 4, 4, 0.5, false, &OverlaySet::default()));
        assert_eq!(with_overlay.as_raw(), without.as_raw());
    }

    #[test]
    fn test_anchored_logo_stays_in_bounds() {
        let frame = solid_frame(50, 50, [0, 0, 0, 255]);
        let mut white = RgbaImage::new(2, 2);
        for pixel in white.pixels_mut() {
            *pixel = Rgba([255, 255, 255, 255]);
        }
        let overlays = OverlaySet {
            frame: None,
            logo: Some(OverlayAsset::from_image(
                white,
                OverlayPlacement::Anchored {
                    offset: (10.0, 10.0),
                    width_fraction: 0.2,
                },
            )),
        };

        // 20% of 50 = 10px logo at (10, 10)
        let output = compose(&frame, &params(&frame, 50, 50, 0.5, false, &overlays));
        assert!(output.get_pixel(15, 15)[0] > 200, "logo center should be white");
        assert_eq!(output.get_pixel(5, 5)[0], 0, "outside logo stays video-only");
        assert_eq!(output.get_pixel(40, 40)[0], 0);
    }
}
