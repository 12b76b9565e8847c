// Square multi-size icon generation

use anyhow::Result;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::path::{Path, PathBuf};

use super::fs_ops::{ensure_dir, require_file};
use super::image_io::{SvgSource, is_svg, load_rgba, write_png};

pub const DEFAULT_SIZES: [u32; 5] = [16, 32, 48, 128, 256];

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOptions {
    pub sizes: Vec<u32>,
    pub file_prefix: String,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            file_prefix: "icon".to_string(),
        }
    }
}

impl ResizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sizes(mut self, sizes: impl Into<Vec<u32>>) -> Self {
        self.sizes = sizes.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }
}

#[derive(Debug, Default)]
pub struct ResizeReport {
    pub generated: Vec<PathBuf>,
    pub failures: Vec<(u32, String)>,
}

impl ResizeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn icon_file_name(prefix: &str, size: u32) -> String {
    format!("{}{}.png", prefix, size)
}

/// Lanczos3 resample to `size` x `size`. Input that is already that size is
/// returned unchanged.
pub fn resize_square(image: &RgbaImage, size: u32) -> RgbaImage {
    if image.dimensions() == (size, size) {
        return image.clone();
    }
    imageops::resize(image, size, size, FilterType::Lanczos3)
}

enum IconSource {
    Raster(RgbaImage),
    // rendered per size so small icons stay sharp
    Vector(SvgSource),
}

impl IconSource {
    fn open(path: &Path) -> Result<Self> {
        if is_svg(path) {
            Ok(Self::Vector(SvgSource::open(path)?))
        } else {
            Ok(Self::Raster(load_rgba(path)?))
        }
    }

    fn square(&self, size: u32) -> Result<RgbaImage> {
        match self {
            Self::Raster(image) => Ok(resize_square(image, size)),
            Self::Vector(svg) => Ok(resize_square(&svg.render(Some(size))?, size)),
        }
    }
}

pub fn resize_icons<F>(
    input: &Path,
    output_dir: &Path,
    options: &ResizeOptions,
    mut log_fn: F,
) -> Result<ResizeReport>
where
    F: FnMut(String),
{
    require_file(input)?;
    ensure_dir(output_dir)?;

    let source = IconSource::open(input)?;
    let mut report = ResizeReport::default();

    for &size in &options.sizes {
        let path = output_dir.join(icon_file_name(&options.file_prefix, size));
        let written = source
            .square(size)
            .and_then(|resized| write_png(&resized, &path));

        match written {
            Ok(()) => {
                log_fn(format!("Generated {}", path.display()));
                report.generated.push(path);
            }
            Err(e) => {
                log_fn(format!("Error processing size {}: {:#}", size, e));
                report.failures.push((size, format!("{:#}", e)));
            }
        }
    }

    Ok(report)
}
