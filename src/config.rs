use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::fs_ops::ensure_parent_dir;
use crate::pipeline::resize::DEFAULT_SIZES;
use crate::pipeline::{BackgroundOptions, ResizeOptions, RoundOptions};

pub const LOCAL_CONFIG_NAME: &str = "iconkit.toml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub round: RoundConfig,
    pub background: BackgroundConfig,
    pub resize: ResizeConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Round `fallback_input` into `fallback_output` when `input` is missing.
    pub fallback: bool,
    pub fallback_input: PathBuf,
    pub fallback_output: PathBuf,
    pub radius_ratio: f32,
    pub keep_existing_alpha: bool,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("assets/icon_new.png"),
            output: PathBuf::from("assets/icon_rounded.png"),
            fallback: true,
            fallback_input: PathBuf::from("icons/icon.png"),
            fallback_output: PathBuf::from("icons/icon_rounded.png"),
            radius_ratio: 0.5,
            keep_existing_alpha: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tolerance: u8,
    /// Hex `RRGGBB`; the top-left pixel is sampled when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("assets/icon_rounded.png"),
            output: PathBuf::from("icons/icon.png"),
            tolerance: 30,
            color: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub sizes: Vec<u32>,
    pub file_prefix: String,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("icons/icon.png"),
            output_dir: PathBuf::from("icons"),
            sizes: DEFAULT_SIZES.to_vec(),
            file_prefix: "icon".to_string(),
        }
    }
}

impl Config {
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        ensure_parent_dir(path)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Write the built-in defaults to `path`. An existing file is only
    /// replaced when `force` is set.
    pub fn write_default_file<P: AsRef<Path>>(path: P, force: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !force {
            bail!(
                "{} already exists, pass --force to overwrite it",
                path.display()
            );
        }
        Self::default().save_to_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load the first config found: `explicit`, then `./iconkit.toml`, then
    /// the per-user config directory. Falls back to built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_from_file(path)?, Some(path.to_path_buf())));
        }

        let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_NAME)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("iconkit").join("config.toml"));
        }

        for candidate in candidates {
            if candidate.is_file() {
                return Ok((Self::load_from_file(&candidate)?, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    pub fn validate(&self) -> Result<()> {
        let ratio = self.round.radius_ratio;
        if !ratio.is_finite() || !(0.0..=0.5).contains(&ratio) {
            bail!("radius_ratio must be between 0.0 and 0.5, got {}", ratio);
        }

        if self.resize.sizes.is_empty() {
            bail!("resize.sizes must not be empty");
        }
        let mut seen = BTreeSet::new();
        for &size in &self.resize.sizes {
            if size == 0 {
                bail!("resize.sizes must not contain 0");
            }
            if !seen.insert(size) {
                bail!("resize.sizes contains {} more than once", size);
            }
        }

        if let Some(color) = &self.background.color {
            parse_hex_color(color)?;
        }
        Ok(())
    }

    pub fn round_options(&self) -> RoundOptions {
        RoundOptions::new()
            .with_radius_ratio(self.round.radius_ratio)
            .with_existing_alpha(self.round.keep_existing_alpha)
    }

    pub fn background_options(&self) -> Result<BackgroundOptions> {
        let mut options = BackgroundOptions::new().with_tolerance(self.background.tolerance);
        if let Some(color) = &self.background.color {
            options = options.with_reference(parse_hex_color(color)?);
        }
        Ok(options)
    }

    pub fn resize_options(&self) -> ResizeOptions {
        ResizeOptions::new()
            .with_sizes(self.resize.sizes.clone())
            .with_prefix(self.resize.file_prefix.clone())
    }
}

/// Parses `RRGGBB`, with or without a leading `#`.
pub fn parse_hex_color(s: &str) -> Result<[u8; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!("Invalid color '{}', expected RRGGBB", s));
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
