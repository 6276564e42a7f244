//! Error types and handling for ts-minbar
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`workspace`]: Scratch workspace provisioning errors
//! - [`process`]: External process errors
//! - [`pack`]: Monorepo discovery and packaging errors
//! - [`manifest`]: Resolution manifest errors
//! - [`scaffold`]: Scaffold copy errors
//! - [`config`]: Scenario configuration errors
//! - [`verify`]: Toolchain and type-check verdict errors

pub mod config;
pub mod manifest;
pub mod pack;
pub mod process;
pub mod scaffold;
pub mod verify;
pub mod workspace;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for harness operations
#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    // Workspace errors
    #[error("Failed to create scratch workspace at {path}: {reason}")]
    #[diagnostic(
        code(minbar::workspace::creation_failed),
        help("Check that the temp directory exists, is writable and has free space")
    )]
    WorkspaceCreationFailed { path: String, reason: String },

    // Process errors
    #[error("Failed to start `{command}`: {reason}")]
    #[diagnostic(
        code(minbar::process::spawn_failed),
        help("Check that the program is installed and on PATH")
    )]
    CommandSpawnFailed { command: String, reason: String },

    #[error("Command `{command}` failed with {}", describe_exit(.exit_code))]
    #[diagnostic(code(minbar::process::command_failed))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    // Project and packaging errors
    #[error("Package '{package}' is not part of the monorepo at {root}")]
    #[diagnostic(
        code(minbar::pack::package_not_found),
        help("Check the package name and the `workspaces` globs of the root package.json")
    )]
    PackageNotFound { package: String, root: String },

    #[error("Failed to discover monorepo packages at {root}: {reason}")]
    #[diagnostic(code(minbar::pack::discovery_failed))]
    ProjectDiscoveryFailed { root: String, reason: String },

    #[error("Failed to pack '{package}': {cause}")]
    #[diagnostic(code(minbar::pack::packaging_failed))]
    PackagingFailed {
        package: String,
        #[source]
        cause: Box<HarnessError>,
    },

    // Manifest errors
    #[error("Failed to rewrite manifest {path}: {reason}")]
    #[diagnostic(code(minbar::manifest::rewrite_failed))]
    ManifestRewriteFailed { path: String, reason: String },

    // Scaffold errors
    #[error("Failed to copy scaffold at {path}: {reason}")]
    #[diagnostic(code(minbar::scaffold::copy_failed))]
    ScaffoldCopyFailed { path: String, reason: String },

    // Verification errors
    #[error("Expected typescript@{expected} in the scratch project, found '{actual}'")]
    #[diagnostic(
        code(minbar::verify::toolchain_mismatch),
        help("A resolution or dependency is pulling in a different TypeScript version")
    )]
    ToolchainMismatch { expected: String, actual: String },

    #[error("Type check failed")]
    #[diagnostic(code(minbar::verify::type_check_failed))]
    TypeCheckFailed { output: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(minbar::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(minbar::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(minbar::config::invalid))]
    ConfigInvalid { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(minbar::fs::io_error))]
    IoError { message: String },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match *exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl HarnessError {
    /// Captured process output carried by this error, if any.
    ///
    /// Looks through `PackagingFailed` to the underlying process failure.
    pub fn output(&self) -> Option<&str> {
        match self {
            HarnessError::CommandFailed { output, .. } | HarnessError::TypeCheckFailed { output } => {
                Some(output)
            }
            HarnessError::PackagingFailed { cause, .. } => cause.output(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for HarnessError {
    fn from(err: serde_yaml::Error) -> Self {
        HarnessError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, HarnessError>;
