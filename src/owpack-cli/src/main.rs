//! owpack - package record extractor and chunk/animation dumper

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;

use cli::{Args, Commands};

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "owpack=debug,owpack_cli=debug"
    } else {
        "owpack=info,owpack_cli=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match args.command {
        Commands::Extract {
            root,
            output,
            keys,
            list,
        } => commands::extract::handle(root, output, &keys, list),
        Commands::Chunk { input, output } => commands::chunk::handle(&input, output.as_deref()),
        Commands::Anim {
            input,
            output,
            keyframes_only,
        } => commands::anim::handle(&input, output.as_deref(), keyframes_only),
        Commands::Configure {
            storage_root,
            output_dir,
            show,
        } => commands::configure::handle(storage_root, output_dir, show),
    }
}
