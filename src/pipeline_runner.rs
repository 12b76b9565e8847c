// Chained icon pipeline: remove background -> round corners -> resize

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::config::{Config, RoundConfig};
use crate::pipeline::{
    ResizeReport, RoundOptions, make_rounded, remove_background_file, resize_icons,
};

pub const TRANSPARENT_NAME: &str = "icon_transparent.png";
pub const ROUNDED_NAME: &str = "icon_rounded.png";

#[derive(Debug)]
pub struct PipelineSummary {
    pub transparent: PathBuf,
    pub rounded: PathBuf,
    pub cleared_pixels: usize,
    pub radius: u32,
    pub icons: ResizeReport,
}

/// Picks the input/output pair for rounding. The fallback pair is used only
/// when it is enabled, the primary input is missing and the fallback input
/// exists.
pub fn resolve_round_paths(config: &RoundConfig) -> Option<(PathBuf, PathBuf, bool)> {
    if config.input.is_file() {
        return Some((config.input.clone(), config.output.clone(), false));
    }

    if !config.fallback || !config.fallback_input.is_file() {
        return None;
    }
    Some((
        config.fallback_input.clone(),
        config.fallback_output.clone(),
        true,
    ))
}

pub fn round_with_fallback<F>(
    config: &RoundConfig,
    options: &RoundOptions,
    mut log_fn: F,
) -> Result<u32>
where
    F: FnMut(String),
{
    match resolve_round_paths(config) {
        Some((input, output, is_fallback)) => {
            if is_fallback {
                log_fn(format!("Input file not found: {}", config.input.display()));
                log_fn(format!("Trying fallback: {}", input.display()));
            }
            make_rounded(&input, &output, options, log_fn)
                .with_context(|| format!("Error processing {}", input.display()))
        }
        None => bail!("Input file not found: {}", config.input.display()),
    }
}

/// Runs all three steps on `source`, keeping the intermediate files in
/// `output_dir` next to the generated icons.
pub fn run_pipeline<F>(
    source: &Path,
    output_dir: &Path,
    config: &Config,
    mut log_fn: F,
) -> Result<PipelineSummary>
where
    F: FnMut(String),
{
    let transparent = output_dir.join(TRANSPARENT_NAME);
    let rounded = output_dir.join(ROUNDED_NAME);

    log_fn(format!("[1/3] Removing background from {}", source.display()));
    let cleared_pixels = remove_background_file(
        source,
        &transparent,
        &config.background_options()?,
        &mut log_fn,
    )
    .context("Background removal failed")?;

    // the mask must not re-fill what the previous step cleared
    log_fn("[2/3] Rounding corners".to_string());
    let round_options = config.round_options().with_existing_alpha(true);
    let radius = make_rounded(&transparent, &rounded, &round_options, &mut log_fn)
        .context("Corner rounding failed")?;

    log_fn("[3/3] Generating icon sizes".to_string());
    let icons = resize_icons(&rounded, output_dir, &config.resize_options(), &mut log_fn)
        .context("Resizing failed")?;

    if !icons.is_complete() {
        log_fn(format!(
            "Completed with {} successes and {} failures",
            icons.generated.len(),
            icons.failures.len()
        ));
    }

    Ok(PipelineSummary {
        transparent,
        rounded,
        cleared_pixels,
        radius,
        icons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::image_io::{load_rgba, write_png};
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn round_config(dir: &Path) -> RoundConfig {
        RoundConfig {
            input: dir.join("assets").join("icon_new.png"),
            output: dir.join("assets").join("icon_rounded.png"),
            fallback: true,
            fallback_input: dir.join("icons").join("icon.png"),
            fallback_output: dir.join("icons").join("icon_rounded.png"),
            ..RoundConfig::default()
        }
    }

    #[test]
    fn test_resolve_prefers_primary() {
        let dir = tempdir().unwrap();
        let config = round_config(dir.path());
        write_png(&RgbaImage::new(4, 4), &config.input).unwrap();
        write_png(&RgbaImage::new(4, 4), &config.fallback_input).unwrap();

        let (input, output, is_fallback) = resolve_round_paths(&config).unwrap();
        assert_eq!(input, config.input);
        assert_eq!(output, config.output);
        assert!(!is_fallback);
    }

    #[test]
    fn test_round_with_fallback_uses_fallback() {
        let dir = tempdir().unwrap();
        let config = round_config(dir.path());
        let fallback = config.fallback_input.clone();
        write_png(&RgbaImage::from_pixel(20, 20, Rgba([9, 9, 9, 255])), &fallback).unwrap();

        let mut logs = Vec::new();
        let radius =
            round_with_fallback(&config, &RoundOptions::default(), |m| logs.push(m)).unwrap();

        assert_eq!(radius, 10);
        assert!(logs.iter().any(|l| l.starts_with("Trying fallback")));
        assert!(config.fallback_output.exists());
        assert!(!config.output.exists());
    }

    #[test]
    fn test_disabled_fallback_is_ignored() {
        let dir = tempdir().unwrap();
        let mut config = round_config(dir.path());
        config.fallback = false;
        write_png(&RgbaImage::new(4, 4), &config.fallback_input).unwrap();

        assert!(resolve_round_paths(&config).is_none());
        assert!(round_with_fallback(&config, &RoundOptions::default(), |_| {}).is_err());
        assert!(!config.fallback_output.exists());
    }

    #[test]
    fn test_round_with_fallback_nothing_available() {
        let dir = tempdir().unwrap();
        let config = round_config(dir.path());

        let err = round_with_fallback(&config, &RoundOptions::default(), |_| {}).unwrap_err();
        assert!(err.to_string().contains("icon_new.png"));
    }

    #[test]
    fn test_run_pipeline_stops_on_missing_source() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("icons");

        let result = run_pipeline(&dir.path().join("none.png"), &out, &Config::default(), |_| {});

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Background removal failed"));
        assert!(!out.join(ROUNDED_NAME).exists());
    }

    #[test]
    fn test_run_pipeline_writes_intermediates() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("logo.png");
        let out = dir.path().join("icons");

        let mut art = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
        for y in 16..48 {
            for x in 16..48 {
                art.put_pixel(x, y, Rgba([30, 90, 200, 255]));
            }
        }
        write_png(&art, &source).unwrap();

        let summary = run_pipeline(&source, &out, &Config::default(), |_| {}).unwrap();

        assert_eq!(summary.cleared_pixels, 64 * 64 - 32 * 32);
        assert_eq!(summary.radius, 32);
        assert!(summary.icons.is_complete());

        let rounded = load_rgba(&summary.rounded).unwrap();
        assert_eq!(*rounded.get_pixel(32, 32), Rgba([30, 90, 200, 255]));
        assert_eq!(rounded.get_pixel(0, 0)[3], 0);
        assert_eq!(rounded.get_pixel(8, 32)[3], 0);
    }
}
