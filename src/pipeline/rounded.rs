// Rounded-corner alpha masking

use anyhow::{Result, bail};
use image::{GrayImage, Luma, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use std::path::Path;

use super::image_io::{load_rgba, write_png};

const INSIDE: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, PartialEq)]
pub struct RoundOptions {
    /// Corner radius as a fraction of the shorter side. 0.5 gives a circle on
    /// square input.
    pub radius_ratio: f32,
    pub keep_existing_alpha: bool,
}

impl Default for RoundOptions {
    fn default() -> Self {
        Self {
            radius_ratio: 0.5,
            keep_existing_alpha: false,
        }
    }
}

impl RoundOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius_ratio(mut self, ratio: f32) -> Self {
        self.radius_ratio = ratio;
        self
    }

    pub fn with_existing_alpha(mut self, keep: bool) -> Self {
        self.keep_existing_alpha = keep;
        self
    }
}

pub fn corner_radius(width: u32, height: u32, ratio: f32) -> u32 {
    let shorter = width.min(height);
    // NaN and negatives saturate to 0
    let radius = (shorter as f32 * ratio).floor() as u32;
    radius.min(shorter / 2)
}

/// Single-channel mask with a filled rounded rectangle covering the whole
/// canvas: 255 inside, 0 outside.
pub fn rounded_mask(width: u32, height: u32, radius: u32) -> GrayImage {
    if radius == 0 || width == 0 || height == 0 {
        return GrayImage::from_pixel(width, height, INSIDE);
    }

    let mut mask = GrayImage::new(width, height);
    let r = radius.min(width.min(height) / 2);

    // the two bands between the corner arcs
    if width > 2 * r {
        draw_filled_rect_mut(
            &mut mask,
            Rect::at(r as i32, 0).of_size(width - 2 * r, height),
            INSIDE,
        );
    }
    if height > 2 * r {
        draw_filled_rect_mut(
            &mut mask,
            Rect::at(0, r as i32).of_size(width, height - 2 * r),
            INSIDE,
        );
    }

    let left = r as i32;
    let top = r as i32;
    let right = (width - 1 - r) as i32;
    let bottom = (height - 1 - r) as i32;
    for center in [(left, top), (right, top), (left, bottom), (right, bottom)] {
        draw_filled_circle_mut(&mut mask, center, r as i32, INSIDE);
    }

    mask
}

/// Install `mask` as the alpha channel of `image`. Both must have the same
/// dimensions.
pub fn apply_mask(
    image: &mut RgbaImage,
    mask: &GrayImage,
    keep_existing_alpha: bool,
) -> Result<()> {
    if image.dimensions() != mask.dimensions() {
        bail!(
            "Mask is {}x{} but image is {}x{}",
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        );
    }

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let coverage = mask.get_pixel(x, y)[0];
        pixel[3] = if keep_existing_alpha {
            pixel[3].min(coverage)
        } else {
            coverage
        };
    }
    Ok(())
}

pub fn round_corners(image: &RgbaImage, options: &RoundOptions) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let radius = corner_radius(width, height, options.radius_ratio);
    let mask = rounded_mask(width, height, radius);

    let mut output = image.clone();
    apply_mask(&mut output, &mask, options.keep_existing_alpha)?;
    Ok(output)
}

/// Round the corners of `input` and write the result to `output`.
/// Returns the radius used, in pixels.
pub fn make_rounded<F>(
    input: &Path,
    output: &Path,
    options: &RoundOptions,
    mut log_fn: F,
) -> Result<u32>
where
    F: FnMut(String),
{
    let image = load_rgba(input)?;
    let (width, height) = image.dimensions();
    let radius = corner_radius(width, height, options.radius_ratio);
    log::debug!(
        "Rounding {}x{} image with ratio {}",
        width,
        height,
        options.radius_ratio
    );

    let rounded = round_corners(&image, options)?;
    write_png(&rounded, output)?;

    log_fn(format!(
        "Created rounded icon: {} (Radius: {}px)",
        output.display(),
        radius
    ));
    Ok(radius)
}
