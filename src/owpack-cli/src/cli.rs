//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "owpack")]
#[command(about = "Extract package records and decode chunks and animations", long_about = None)]
#[command(version)]
pub struct Args {
    /// Log per-record progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract every record of the packages matching the given keys
    ///
    /// Keys are prefixed by kind: p<hex> or P<decimal> for a package key,
    /// i<hex> for a package index content key.
    #[command(after_help = "Examples:\n  owpack extract -r ./storage -o ./out p2C00000000000042 i0123456789ABCDEF0123456789ABCDEF")]
    Extract {
        /// Storage root (encoding.json, packages.json, data/); defaults to the configured root
        #[arg(short, long, env = "OWPACK_ROOT")]
        root: Option<PathBuf>,

        /// Output directory; defaults to the configured directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Query keys
        #[arg(required = true)]
        keys: Vec<String>,

        /// Print record paths without writing files
        #[arg(short, long)]
        list: bool,
    },

    /// Decode a buffer of consecutive chunks and print them as JSON
    Chunk {
        /// Chunk file
        input: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode an animation blob and print it as JSON
    Anim {
        /// Animation file
        input: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit only the keyframe list
        #[arg(short, long)]
        keyframes_only: bool,
    },

    /// Configure default paths
    Configure {
        /// Default storage root for extract
        #[arg(long)]
        storage_root: Option<PathBuf>,

        /// Default output directory for extract
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}
