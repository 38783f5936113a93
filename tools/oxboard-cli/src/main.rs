//! Oxboard CLI: replay, validate, and generate gesture input.
//!
//! Usage:
//!   oxboard-gestures replay <FRAMES> --profile <PROFILE>   Run the engine over recorded frames
//!   oxboard-gestures validate <PROFILE>                    Check a mapping profile
//!   oxboard-gestures synth <POSE> --output <FILE>          Write synthetic frames
//!   oxboard-gestures config [--init]                       Show or write the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oxboard_common::AppConfig;
use oxboard_gesture_core::synthetic::Pose;

mod commands;

#[derive(Parser)]
#[command(
    name = "oxboard-gestures",
    about = "Hand-gesture control mapping for the Oxboard mixer",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gesture engine over a JSONL landmark recording
    Replay {
        /// Path to the frames file (one HandFrame per line)
        frames: PathBuf,

        /// Mapping profile to register
        #[arg(short, long)]
        profile: PathBuf,

        /// Print each frame's output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a mapping profile
    Validate {
        /// Path to the profile JSON
        profile: PathBuf,
    },

    /// Generate synthetic landmark frames
    Synth {
        /// Pose: open-palm, fist, pinch or point
        pose: Pose,

        /// Number of frames
        #[arg(short, long, default_value = "60")]
        frames: usize,

        /// Output JSONL file
        #[arg(short, long)]
        output: PathBuf,

        /// Milliseconds between frames
        #[arg(long, default_value = "33")]
        interval_ms: u64,

        /// Add a mirrored left hand
        #[arg(long)]
        both_hands: bool,

        /// Horizontal wrist movement per frame (normalized)
        #[arg(long, default_value = "0.0")]
        step_x: f64,

        /// Vertical wrist movement per frame (normalized)
        #[arg(long, default_value = "0.0")]
        step_y: f64,
    },

    /// Print the effective configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `config --init` must work before any file exists.
    let config = match cli.command {
        Commands::Config { init: true } => AppConfig::default(),
        _ => commands::load_config(cli.config.as_deref())?,
    };
    oxboard_common::logging::init_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Replay {
            frames,
            profile,
            json,
        } => commands::replay::run(frames, profile, &config, json),
        Commands::Validate { profile } => commands::validate::run(profile),
        Commands::Synth {
            pose,
            frames,
            output,
            interval_ms,
            both_hands,
            step_x,
            step_y,
        } => commands::synth::run(pose, frames, output, interval_ms, both_hands, step_x, step_y),
        Commands::Config { init } => commands::config::run(cli.config, &config, init),
    }
}
