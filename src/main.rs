mod application;
mod cli;
mod cli_handlers;
mod core;
mod modules;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::fs::{File, OpenOptions};

const LOG_FILE_NAME: &str = "shelf-player.log";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.command);

    cli_handlers::from_cli(cli.command).execute()
}

/// stderr for one-off commands. The play screen owns the terminal, so its
/// log goes to a file in the config dir instead (or nowhere if that fails).
fn init_logging(command: &Commands) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    if owns_terminal(command) {
        match open_log_file() {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                builder.filter_level(LevelFilter::Off);
            }
        }
    }

    builder.init();
}

fn owns_terminal(command: &Commands) -> bool {
    matches!(command, Commands::Play { .. })
}

fn open_log_file() -> Result<File> {
    let path = utils::app_config_dir()?.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))
}
