//! Root CLI structure for cani2d

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::frames::FramesArgs;
use crate::commands::render::RenderArgs;

#[derive(Parser)]
#[command(name = "cani2d")]
#[command(about = "Inspect and render skeletal 2D mesh models", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display information about a model document
    Info {
        /// Path to the model JSON file
        model: PathBuf,

        /// Show per-bone and per-curve details
        #[arg(short, long)]
        detailed: bool,
    },

    /// Render a single frame to a PNG image
    Render(RenderArgs),

    /// Play an animation and write every frame as a numbered PNG
    Frames(FramesArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
