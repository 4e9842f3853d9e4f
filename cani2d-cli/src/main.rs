//! Main entry point for the cani2d CLI

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use std::io;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli);

    // Execute command
    match cli.command {
        Commands::Info { model, detailed } => commands::info::execute(&model, detailed),
        Commands::Render(args) => commands::render::execute(args),
        Commands::Frames(args) => commands::frames::execute(args),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    }
}

/// Start logging at the level picked by `-v`/`-q`; `RUST_LOG` still wins
fn init_logger(cli: &Cli) {
    env_logger::Builder::new()
        .filter_level(level_filter(cli.verbose, cli.quiet))
        .parse_env(env_logger::Env::default())
        .init();
}

fn level_filter(verbose: u8, quiet: bool) -> log::LevelFilter {
    match (verbose, quiet) {
        (0, true) => log::LevelFilter::Error,
        (0, false) => log::LevelFilter::Warn,
        (1, _) => log::LevelFilter::Info,
        (2, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
