mod cli;
mod commands;
mod config;
mod document;
mod engine;
mod progress;
mod resources;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::Config;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() {
    if let Err(e) = run() {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let load_config = || Config::load(cli.config.as_deref());

    match cli.command {
        Command::Facts(args) => commands::facts::run(&ctx, &load_config()?, args),
        Command::Diff(args) => commands::diff::run(&ctx, &load_config()?, args),
        Command::Apply(args) => commands::apply::run(&ctx, &load_config()?, args),
        Command::Resources { name } => commands::resources::run(&ctx, name.as_deref()),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "sonicfg", &mut io::stdout());
            Ok(())
        }
    }
}
