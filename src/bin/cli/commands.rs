//! Command execution.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::cli::args::Cli;
use crate::cli::config_layer::load_configuration;
use crate::cli::output::{print_summary, unsafe_fast_warning};
use pkgmove_rs::{RelocationEngine, RelocationOptions};

/// Run the move described by `cli`
pub fn run_move(cli: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot read the working directory")?;
    let config = load_configuration(cli, &cwd)?;

    if cli.unsafe_fast {
        eprintln!("{}", unsafe_fast_warning());
    }

    let options = RelocationOptions::new(cli.from.clone(), cli.to.clone())
        .within(cli.scope.clone())
        .fidelity(config.fidelity)
        .verbose(cli.verbose)
        .dry_run(cli.dry_run);

    let engine = RelocationEngine::new(&config)?;
    let report = engine
        .run(&options)
        .with_context(|| format!("failed to move {} to {}", cli.from, cli.to))?;

    if let Some(path) = &cli.profile {
        write_profile(path, &report.to_profile_json()?)?;
        info!("profile written to {}", path.display());
    }

    print_summary(&report);
    Ok(())
}

fn write_profile(path: &Path, json: &str) -> anyhow::Result<()> {
    std::fs::write(path, json).with_context(|| format!("cannot write profile {}", path.display()))
}
