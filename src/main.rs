//! ts-minbar - minimum TypeScript version check
//!
//! Packs monorepo packages, installs them into a scratch project pinned to the minimum
//! supported TypeScript version, and type-checks a source scaffold against them.

use clap::Parser;
use std::path::PathBuf;

mod cli;
mod config;
mod error;
mod hash;
mod logger;
mod manifest;
mod orchestrator;
mod pack;
mod process;
mod project;
mod report;
mod scaffold;
mod workspace;

#[cfg(test)]
mod test_fixtures;

use cli::Cli;
use config::Scenario;
use error::Result;
use logger::Logger;
use orchestrator::Orchestrator;
use process::ShellRunner;
use project::Monorepo;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .try_init();
}

/// Explicit project root, or the git work tree enclosing the current directory
fn resolve_project_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(root) => Ok(root),
        None => Ok(Monorepo::find_root(&std::env::current_dir()?)),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let setup = Scenario::load(cli.config.as_deref()).and_then(|scenario| {
        resolve_project_root(cli.project_root.clone()).map(|root| (scenario, root))
    });
    let (scenario, project_root) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("{}", report::setup_failure_message(&e));
            std::process::exit(report::FAILURE_EXIT_CODE);
        }
    };

    if let Ok(yaml) = scenario.to_yaml() {
        tracing::debug!(project_root = %project_root.display(), "effective scenario:\n{yaml}");
    }

    let logger = Logger::for_scenario(&scenario.name);
    let runner = ShellRunner::new();

    let result = Orchestrator::new(&scenario, &project_root, &runner, &logger)
        .keep_workspace(cli.keep_workspace)
        .run();

    match result {
        Ok(run) => {
            if let Some(message) = report::success_message(&run) {
                println!("{message}");
            }
        }
        Err(failure) => {
            eprintln!("{}", report::failure_message(&failure, &scenario));
            std::process::exit(report::FAILURE_EXIT_CODE);
        }
    }
}
