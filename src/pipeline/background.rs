// Background removal by per-channel colour distance

use anyhow::{Result, anyhow};
use image::{Rgba, RgbaImage};
use std::path::Path;

use super::image_io::{load_rgba, write_png};

pub const CLEARED: Rgba<u8> = Rgba([255, 255, 255, 0]);

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundOptions {
    pub tolerance: u8,
    /// Explicit background colour; when unset the pixel at (0,0) is used.
    pub reference: Option<[u8; 3]>,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            tolerance: 30,
            reference: None,
        }
    }
}

impl BackgroundOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_reference(mut self, rgb: [u8; 3]) -> Self {
        self.reference = Some(rgb);
        self
    }
}

pub fn sample_background(image: &RgbaImage) -> Option<Rgba<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    Some(*image.get_pixel(0, 0))
}

/// Every RGB channel must differ from the reference by strictly less than
/// `tolerance`. Alpha is not compared.
pub fn is_background(pixel: &Rgba<u8>, reference: &Rgba<u8>, tolerance: u8) -> bool {
    (0..3).all(|c| pixel[c].abs_diff(reference[c]) < tolerance)
}

/// Clears every pixel close to the background colour, in place.
/// Returns the reference colour and the number of cleared pixels.
pub fn remove_background(
    image: &mut RgbaImage,
    options: &BackgroundOptions,
) -> Result<(Rgba<u8>, usize)> {
    let reference = match options.reference {
        Some([r, g, b]) => Rgba([r, g, b, 255]),
        None => sample_background(image).ok_or_else(|| anyhow!("Image has no pixels"))?,
    };

    let mut cleared = 0;
    for pixel in image.pixels_mut() {
        if is_background(pixel, &reference, options.tolerance) {
            *pixel = CLEARED;
            cleared += 1;
        }
    }

    Ok((reference, cleared))
}

pub fn remove_background_file<F>(
    input: &Path,
    output: &Path,
    options: &BackgroundOptions,
    mut log_fn: F,
) -> Result<usize>
where
    F: FnMut(String),
{
    let mut image = load_rgba(input)?;
    let (reference, cleared) = remove_background(&mut image, options)?;

    log_fn(format!(
        "Detected background color: ({}, {}, {}, {})",
        reference[0], reference[1], reference[2], reference[3]
    ));
    log::debug!(
        "Cleared {} of {} pixels (tolerance {})",
        cleared,
        image.width() as usize * image.height() as usize,
        options.tolerance
    );

    write_png(&image, output)?;
    log_fn(format!("Saved transparent icon to {}", output.display()));

    Ok(cleared)
}
