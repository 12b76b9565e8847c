use clap::{ArgAction, Parser, Subcommand};
use iconkit::Config;
use std::path::PathBuf;

/// Prepare browser-extension icons: strip backgrounds, round corners and
/// export the standard icon sizes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML file with default paths and parameters
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mask the image with a rounded rectangle
    Round {
        /// Source image
        input: Option<PathBuf>,

        /// Destination PNG
        output: Option<PathBuf>,

        /// Corner radius as a fraction of the shorter side (0.0 - 0.5)
        #[arg(short, long)]
        radius_ratio: Option<f32>,

        /// Keep existing transparency inside the mask instead of replacing it
        #[arg(long)]
        keep_alpha: bool,
    },

    /// Make pixels close to the top-left colour transparent
    RemoveBg {
        /// Source image
        input: Option<PathBuf>,

        /// Destination PNG
        output: Option<PathBuf>,

        /// Per-channel tolerance; channels must differ by less than this
        #[arg(short, long)]
        tolerance: Option<u8>,

        /// Background colour as RRGGBB instead of sampling pixel (0,0)
        #[arg(long)]
        color: Option<String>,
    },

    /// Export square icons at each configured size
    Resize {
        /// Source image
        input: Option<PathBuf>,

        /// Directory receiving icon<size>.png files
        output_dir: Option<PathBuf>,

        /// Comma separated sizes, e.g. 16,32,48
        #[arg(short, long, value_delimiter = ',')]
        sizes: Option<Vec<u32>>,

        /// File name prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Remove background, round corners and resize in one go
    Pipeline {
        /// Source image
        input: Option<PathBuf>,

        /// Directory receiving the intermediates and icons
        output_dir: Option<PathBuf>,
    },

    /// Write the built-in defaults to a config file
    InitConfig {
        #[arg(default_value = iconkit::config::LOCAL_CONFIG_NAME)]
        path: PathBuf,

        /// Replace the file if it already exists
        #[arg(short, long)]
        force: bool,
    },
}

impl Command {
    /// Fold command-line overrides into `config`.
    pub fn apply_to(&self, config: &mut Config) {
        match self {
            Command::Round {
                input,
                output,
                radius_ratio,
                keep_alpha,
            } => {
                if let Some(input) = input {
                    config.round.input = input.clone();
                    // an explicit source never falls back to the default one
                    config.round.fallback = false;
                }
                if let Some(output) = output {
                    config.round.output = output.clone();
                }
                if let Some(ratio) = radius_ratio {
                    config.round.radius_ratio = *ratio;
                }
                if *keep_alpha {
                    config.round.keep_existing_alpha = true;
                }
            }
            Command::RemoveBg {
                input,
                output,
                tolerance,
                color,
            } => {
                if let Some(input) = input {
                    config.background.input = input.clone();
                }
                if let Some(output) = output {
                    config.background.output = output.clone();
                }
                if let Some(tolerance) = tolerance {
                    config.background.tolerance = *tolerance;
                }
                if color.is_some() {
                    config.background.color = color.clone();
                }
            }
            Command::Resize {
                input,
                output_dir,
                sizes,
                prefix,
            } => {
                if let Some(input) = input {
                    config.resize.input = input.clone();
                }
                if let Some(dir) = output_dir {
                    config.resize.output_dir = dir.clone();
                }
                if let Some(sizes) = sizes {
                    config.resize.sizes = sizes.clone();
                }
                if let Some(prefix) = prefix {
                    config.resize.file_prefix = prefix.clone();
                }
            }
            Command::Pipeline { .. } | Command::InitConfig { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resize_sizes() {
        let cli = Cli::parse_from(["iconkit", "resize", "logo.png", "out", "-s", "16,64"]);
        let mut config = Config::default();
        cli.command.apply_to(&mut config);

        assert_eq!(config.resize.input, PathBuf::from("logo.png"));
        assert_eq!(config.resize.output_dir, PathBuf::from("out"));
        assert_eq!(config.resize.sizes, vec![16, 64]);
    }

    #[test]
    fn test_round_input_disables_fallback() {
        let cli = Cli::parse_from(["iconkit", "round", "art.png", "-r", "0.25"]);
        let mut config = Config::default();
        cli.command.apply_to(&mut config);

        assert_eq!(config.round.input, PathBuf::from("art.png"));
        assert!(!config.round.fallback);
        assert_eq!(config.round.radius_ratio, 0.25);
    }

    #[test]
    fn test_round_without_args_keeps_defaults() {
        let cli = Cli::parse_from(["iconkit", "-v", "round"]);
        let mut config = Config::default();
        cli.command.apply_to(&mut config);

        assert_eq!(cli.verbose, 1);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_remove_bg_overrides() {
        let cli = Cli::parse_from(["iconkit", "remove-bg", "--tolerance", "12", "--color", "ffffff"]);
        let mut config = Config::default();
        cli.command.apply_to(&mut config);

        assert_eq!(config.background.tolerance, 12);
        assert_eq!(config.background.color.as_deref(), Some("ffffff"));
    }

    #[test]
    fn test_init_config_force_flag() {
        let cli = Cli::parse_from(["iconkit", "init-config", "conf/icons.toml", "--force"]);
        match cli.command {
            Command::InitConfig { path, force } => {
                assert_eq!(path, PathBuf::from("conf/icons.toml"));
                assert!(force);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["iconkit", "init-config"]);
        assert!(matches!(cli.command, Command::InitConfig { force: false, .. }));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
