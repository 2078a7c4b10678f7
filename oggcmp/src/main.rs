//! oggcmp - Main entry point
//!
//! Decodes an Ogg Vorbis file with each selected decoder, one after another,
//! and writes one WAV file per decoder. The first failure ends the process
//! with a non-zero status.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oggcmp::compare::Comparison;
use oggcmp::config::{self, Config, Overrides};
use oggcmp::decoder::DecoderKind;
use oggcmp::pipeline;

/// Command-line arguments for oggcmp
#[derive(Parser, Debug)]
#[command(name = "oggcmp")]
#[command(about = "Decode an Ogg Vorbis file with two decoders and write each result as WAV")]
#[command(version)]
struct Args {
    /// Ogg Vorbis file to decode
    input: PathBuf,

    /// Output WAV for the symphonia decoder
    #[arg(long, env = "OGGCMP_SYMPHONIA_OUT")]
    symphonia_out: Option<PathBuf>,

    /// Output WAV for the lewton decoder
    #[arg(long, env = "OGGCMP_LEWTON_OUT")]
    lewton_out: Option<PathBuf>,

    /// Frames per decoder read
    #[arg(long, env = "OGGCMP_BLOCK_FRAMES")]
    block_frames: Option<usize>,

    /// Decoder to run (repeatable, default: all)
    #[arg(long = "decoder", value_enum)]
    decoders: Vec<DecoderKind>,

    /// TOML configuration file
    #[arg(short, long, env = "OGGCMP_CONFIG")]
    config: Option<PathBuf>,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oggcmp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let file_config = config::load_file_config(args.config.as_deref())
        .context("Failed to load configuration file")?;

    let overrides = Overrides {
        symphonia_out: args.symphonia_out,
        lewton_out: args.lewton_out,
        block_frames: args.block_frames,
        decoders: args.decoders,
    };
    let config = Config::resolve(args.input, overrides, file_config)
        .context("Invalid configuration")?;

    info!("Input: {}", config.input.display());

    let mut reports = Vec::with_capacity(config.decoders.len());
    for &kind in &config.decoders {
        let report = pipeline::run(
            kind,
            &config.input,
            config.output_for(kind),
            config.block_frames,
        )
        .with_context(|| format!("{} decode of {} failed", kind, config.input.display()))?;
        reports.push(report);
    }

    if let [left, right] = reports.as_slice() {
        Comparison::between(left, right).log();
    }

    Ok(())
}
