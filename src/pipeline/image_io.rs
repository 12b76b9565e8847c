// Loading source artwork and writing PNG results

use anyhow::{Context, Result, anyhow};
use image::{ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::Path;

use super::fs_ops::{ensure_parent_dir, require_file};

pub fn is_svg(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

/// Load any supported source as straight-alpha RGBA.
///
/// Raster formats go through `image`; `.svg` files are rendered at their
/// intrinsic size.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    require_file(path)?;

    if is_svg(path) {
        return load_svg(path, None);
    }

    let img = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Render an SVG file. With `longest_side` set, the drawing is scaled so its
/// longer edge is exactly that many pixels.
pub fn load_svg(path: &Path, longest_side: Option<u32>) -> Result<RgbaImage> {
    SvgSource::open(path)?.render(longest_side)
}

/// A parsed SVG that can be rasterised repeatedly at different sizes.
pub struct SvgSource {
    tree: usvg::Tree,
    name: String,
}

impl SvgSource {
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let tree = usvg::Tree::from_data(&data, &usvg::Options::default())
            .with_context(|| format!("Failed to parse SVG {}", path.display()))?;

        Ok(Self {
            tree,
            name: path.display().to_string(),
        })
    }

    pub fn render(&self, longest_side: Option<u32>) -> Result<RgbaImage> {
        let size = self.tree.size();
        let scale = match longest_side {
            Some(side) => side as f32 / size.width().max(size.height()),
            None => 1.0,
        };

        let width = (size.width() * scale).round() as u32;
        let height = (size.height() * scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(anyhow!(
                "Invalid SVG dimensions {}x{} in {}",
                size.width(),
                size.height(),
                self.name
            ));
        }

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("Failed to allocate {}x{} pixmap", width, height))?;
        resvg::render(
            &self.tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        log::debug!("Rendered {} at {}x{}", self.name, width, height);
        Ok(pixmap_to_rgba(&pixmap))
    }
}

// tiny-skia stores premultiplied colour
fn pixmap_to_rgba(pixmap: &tiny_skia::Pixmap) -> RgbaImage {
    let width = pixmap.width();
    let pixels = pixmap.pixels();

    RgbaImage::from_fn(width, pixmap.height(), |x, y| {
        let c = pixels[(y * width + x) as usize].demultiply();
        Rgba([c.red(), c.green(), c.blue(), c.alpha()])
    })
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;

    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
