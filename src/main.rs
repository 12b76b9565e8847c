mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use crate::cli::{Cli, Command};
use iconkit::Config;
use iconkit::pipeline::{remove_background_file, resize_icons};
use iconkit::pipeline_runner::{round_with_fallback, run_pipeline};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

fn log_line(msg: String) {
    log::info!("{}", msg);
}

fn run(cli: Cli) -> Result<()> {
    if let Command::InitConfig { path, force } = &cli.command {
        Config::write_default_file(path, *force)?;
        log::info!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let (mut config, source) = Config::discover(cli.config.as_deref())?;
    if let Some(source) = source {
        log::debug!("Using config {}", source.display());
    }
    cli.command.apply_to(&mut config);
    config.validate()?;

    match &cli.command {
        Command::Round { .. } => {
            round_with_fallback(&config.round, &config.round_options(), log_line)?;
        }
        Command::RemoveBg { .. } => {
            let bg = &config.background;
            remove_background_file(&bg.input, &bg.output, &config.background_options()?, log_line)
                .with_context(|| format!("Error processing {}", bg.input.display()))?;
        }
        Command::Resize { .. } => {
            let resize = &config.resize;
            let report = resize_icons(
                &resize.input,
                &resize.output_dir,
                &config.resize_options(),
                log_line,
            )
            .with_context(|| format!("Error processing image {}", resize.input.display()))?;

            if !report.is_complete() {
                anyhow::bail!(
                    "{} of {} sizes failed",
                    report.failures.len(),
                    config.resize.sizes.len()
                );
            }
        }
        Command::Pipeline { input, output_dir } => {
            let source = input.clone().unwrap_or_else(|| config.round.input.clone());
            let output_dir = output_dir
                .clone()
                .unwrap_or_else(|| config.resize.output_dir.clone());

            let summary = run_pipeline(&source, &output_dir, &config, log_line)?;
            log::info!(
                "Pipeline finished: {} icons in {}",
                summary.icons.generated.len(),
                output_dir.display()
            );
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
