//! Chatreel CLI: record scripted chat conversations as video clips.
//!
//! Usage:
//!   chatreel export [OPTIONS]    Record a conversation into a video clip
//!   chatreel templates           List built-in conversation templates
//!   chatreel formats             List export format presets
//!   chatreel init <PATH>         Write a starter conversation script
//!   chatreel check               Check encoder availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "chatreel",
    about = "Turn scripted chat conversations into social-media video clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a conversation into a video clip
    Export {
        /// Path to a conversation script (JSON)
        #[arg(conflicts_with = "template")]
        input: Option<PathBuf>,

        /// Use a built-in conversation template instead of a file
        #[arg(short, long)]
        template: Option<String>,

        /// Export format preset
        #[arg(short, long, default_value = "instagram-story")]
        format: String,

        /// Output width, overriding the preset
        #[arg(long)]
        width: Option<u32>,

        /// Output height, overriding the preset
        #[arg(long)]
        height: Option<u32>,

        /// Container override: webm or mp4
        #[arg(long)]
        container: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Padding around the conversation, as a fraction of each dimension
        #[arg(long)]
        padding: Option<f64>,

        /// Video bitrate in kbps
        #[arg(long)]
        bitrate: Option<u32>,

        /// Surface supersampling factor
        #[arg(long)]
        scale: Option<u32>,
    },

    /// List built-in conversation templates
    Templates,

    /// List export format presets
    Formats,

    /// Write a starter conversation script
    Init {
        /// Where to write the script
        path: PathBuf,
    },

    /// Check encoder availability
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    chatreel_common::logging::init_logging(&chatreel_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Export {
            input,
            template,
            format,
            width,
            height,
            container,
            output,
            padding,
            bitrate,
            scale,
        } => {
            commands::export::run(
                input, template, format, width, height, container, output, padding, bitrate, scale,
            )
            .await
        }
        Commands::Templates => commands::templates::run(),
        Commands::Formats => commands::formats::run(),
        Commands::Init { path } => commands::init::run(path),
        Commands::Check => commands::check::run(),
    }
}
