//! Streamtree CLI Binary

use anyhow::Context;
use clap::Parser;
use std::process;
use streamtree::config::ConfigLoader;
use streamtree::logging::init_logging;
use streamtree::tooling::cli::{Cli, CliContext};

fn run(cli: &Cli) -> anyhow::Result<String> {
    let mut config = ConfigLoader::load(cli.config.as_deref()).context("Error loading configuration")?;
    cli.apply_logging_overrides(&mut config);
    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let context = CliContext::from_config(config).context("Error initializing session")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
