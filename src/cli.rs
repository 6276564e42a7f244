//! CLI definitions using clap derive API

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::path::PathBuf;

/// ts-minbar - minimum TypeScript version check for monorepo packages
///
/// Packs internal packages, installs them into a scratch project pinned to the minimum
/// supported TypeScript version, and type-checks a scaffold against them.
#[derive(Parser, Debug)]
#[command(
    name = "ts-minbar",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Type-check monorepo packages against a minimum TypeScript version",
    long_about = "ts-minbar packs the packages under test together with their internal \
                  dependencies, installs the artifacts into a scratch project pinned to the \
                  minimum supported TypeScript version, and type-checks a scaffold against them.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  ts-minbar\n    \
                  ts-minbar --config minbar.yaml\n    \
                  ts-minbar --project-root ../monorepo --keep-workspace\n    \
                  RUST_LOG=ts_minbar=debug ts-minbar"
)]
pub struct Cli {
    /// Scenario configuration file (defaults to the built-in scenario)
    #[arg(long, short = 'c', env = "MINBAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Monorepo root (defaults to the enclosing git work tree)
    #[arg(long, short = 'p', env = "MINBAR_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Leave the scratch workspace on disk after the run
    #[arg(long, short = 'k')]
    pub keep_workspace: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
