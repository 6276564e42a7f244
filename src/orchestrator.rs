//! Scenario orchestration
//!
//! Runs the provisioning pipeline in strict order, one component call per stage:
//!
//! ```text
//! Init → WorkspaceCreated → BaseDepsInstalled → Packed → ResolutionsRewritten
//!      → ArtifactInstalled → Scaffolded → ToolchainVerified → TypeChecked → Done
//! ```
//!
//! The first failing stage ends the run. Failures before the type check are setup
//! failures (the harness or environment broke); a failing type check is the verdict of
//! the test itself.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Scenario;
use crate::error::verify::{toolchain_mismatch, type_check_failed};
use crate::error::{HarnessError, Result};
use crate::logger::Logger;
use crate::manifest;
use crate::pack::{PackedPackages, Packer};
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::project::Monorepo;
use crate::scaffold;
use crate::workspace::{Workspace, temp};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    WorkspaceCreated,
    BaseDepsInstalled,
    Packed,
    ResolutionsRewritten,
    ArtifactInstalled,
    Scaffolded,
    ToolchainVerified,
    TypeChecked,
    Done,
}

impl Stage {
    /// The step that moves the pipeline out of this stage
    pub fn next_step(self) -> &'static str {
        match self {
            Stage::Init => "creating the scratch workspace",
            Stage::WorkspaceCreated => "installing base dependencies",
            Stage::BaseDepsInstalled => "packing internal packages",
            Stage::Packed => "rewriting resolutions",
            Stage::ResolutionsRewritten => "installing packed artifacts",
            Stage::ArtifactInstalled => "copying the scaffold",
            Stage::Scaffolded => "verifying toolchain versions",
            Stage::ToolchainVerified => "type-checking the scaffold",
            Stage::TypeChecked | Stage::Done => "finishing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Which side of the verdict boundary a failure is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The harness could not set the scratch project up
    Setup,
    /// The scratch project does not type-check under the pinned toolchain
    Verification,
}

impl Phase {
    /// Only a type checker that ran and reported errors is a verdict
    pub fn of(error: &HarnessError) -> Self {
        match error {
            HarnessError::TypeCheckFailed { .. } => Phase::Verification,
            _ => Phase::Setup,
        }
    }
}

/// A run that ended in the `Failed` state
#[derive(Debug)]
pub struct RunFailure {
    /// Last stage reached before the failure
    pub stage: Stage,
    pub phase: Phase,
    pub error: HarnessError,
    /// Workspace root, when it was kept for inspection
    pub workspace: Option<PathBuf>,
}

/// A run that reached `Done`
#[derive(Debug)]
pub struct RunReport {
    /// Packed packages installed into the scratch project
    pub packed: PackedPackages,
    /// Type checker version reported inside the scratch project
    pub typescript_version: String,
    /// Workspace root, when it was kept for inspection
    pub workspace: Option<PathBuf>,
}

/// Drives one scenario run
pub struct Orchestrator<'a> {
    scenario: &'a Scenario,
    project_root: &'a Path,
    runner: &'a dyn CommandRunner,
    logger: &'a Logger,
    temp_base: PathBuf,
    keep_workspace: bool,
    stage: Stage,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        scenario: &'a Scenario,
        project_root: &'a Path,
        runner: &'a dyn CommandRunner,
        logger: &'a Logger,
    ) -> Self {
        Self {
            scenario,
            project_root,
            runner,
            logger,
            temp_base: temp::temp_dir_base(),
            keep_workspace: false,
            stage: Stage::Init,
        }
    }

    /// Leave the workspace on disk after the run
    #[must_use]
    pub fn keep_workspace(mut self, keep: bool) -> Self {
        self.keep_workspace = keep;
        self
    }

    /// Create the workspace under `base` instead of the system temp directory
    #[must_use]
    pub fn temp_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.temp_base = base.into();
        self
    }

    /// Run every stage; the workspace is removed afterwards unless it is kept
    pub fn run(mut self) -> std::result::Result<RunReport, RunFailure> {
        let mut workspace = None;
        let result = self.execute(&mut workspace);

        let kept = match workspace {
            Some(workspace) if self.keep_workspace => Some(workspace.keep()),
            _ => None,
        };

        match result {
            Ok((packed, typescript_version)) => Ok(RunReport {
                packed,
                typescript_version,
                workspace: kept,
            }),
            Err(error) => {
                tracing::info!(logger = %self.logger.name(), stage = %self.stage, %error, "scenario failed");
                Err(RunFailure {
                    stage: self.stage,
                    phase: Phase::of(&error),
                    error,
                    workspace: kept,
                })
            }
        }
    }

    fn execute(&mut self, slot: &mut Option<Workspace>) -> Result<(PackedPackages, String)> {
        let workspace = Workspace::provision_in(&self.temp_base, &self.scenario.workspace_prefix())?;
        let workspace = slot.insert(workspace);
        self.advance(Stage::WorkspaceCreated);
        self.logger.success(&format!(
            "Temporary directories created under {}",
            workspace.root().display()
        ));

        let app_root = workspace.app_root().to_path_buf();

        // Minimum TypeScript version supported for consumers goes in with the base deps
        self.package_manager(&app_root)
            .arg("add")
            .args(self.scenario.base_dependencies())
            .run(self.runner)?;
        self.advance(Stage::BaseDepsInstalled);
        self.logger.success("Dependencies were installed");

        let monorepo = Monorepo::discover(self.project_root)?;
        self.logger.info(&format!(
            "Found {} workspace package(s) in {}",
            monorepo.len(),
            monorepo.root().display()
        ));
        let packed = Packer::new(self.runner, &self.scenario.package_manager, self.logger).pack(
            &monorepo,
            &self.scenario.packages,
            workspace.artifacts_dir(),
        )?;
        for package in packed.iter() {
            tracing::debug!(
                package = %package.name,
                version = %package.version,
                digest = %package.digest,
                "artifact ready"
            );
        }
        self.advance(Stage::Packed);

        self.rewrite_resolutions(&app_root, &packed)?;
        self.advance(Stage::ResolutionsRewritten);

        self.install_artifacts(&app_root, &packed)?;
        self.advance(Stage::ArtifactInstalled);
        self.logger.success(&format!(
            "{} were added to dependencies",
            self.scenario.packages.join(", ")
        ));

        let copied = scaffold::generate_files(&self.scenario.scaffold_dir, &app_root)?;
        self.advance(Stage::Scaffolded);
        self.logger
            .success(&format!("Source and configs were copied ({copied} files)"));

        let typescript_version = self.verify_toolchain(&app_root)?;
        self.advance(Stage::ToolchainVerified);

        self.type_check(&app_root)?;
        self.advance(Stage::TypeChecked);
        self.logger.success(&format!(
            "Example project was successfully built with {}",
            self.scenario.typescript_spec()
        ));

        self.advance(Stage::Done);
        Ok((packed, typescript_version))
    }

    fn advance(&mut self, stage: Stage) {
        debug_assert!(stage > self.stage, "stages only move forward");
        tracing::info!(from = %self.stage, to = %stage, "stage complete");
        self.stage = stage;
    }

    fn package_manager(&self, dir: &Path) -> PackageManagerCall {
        PackageManagerCall(
            CommandSpec::new(self.scenario.package_manager.as_str()).current_dir(dir),
        )
    }

    fn rewrite_resolutions(&self, app_root: &Path, packed: &PackedPackages) -> Result<()> {
        let count = manifest::add_resolution_paths(app_root, packed)?;

        for (package, version) in &self.scenario.pinned_resolutions {
            manifest::pin_resolution(app_root, package, version)?;
            self.logger
                .info(&format!("Pinned {package} to {version} in resolutions"));
        }

        self.logger.success(&format!(
            "Resolutions point {count} internal package(s) at packed artifacts"
        ));
        Ok(())
    }

    fn install_artifacts(&self, app_root: &Path, packed: &PackedPackages) -> Result<()> {
        let mut specs = Vec::with_capacity(self.scenario.packages.len());
        for package in &self.scenario.packages {
            let artifact = packed.artifact(package).ok_or_else(|| HarnessError::IoError {
                message: format!("no packed artifact for '{package}'"),
            })?;
            specs.push(manifest::artifact_reference(artifact));
        }

        self.package_manager(app_root)
            .arg("add")
            .args(specs)
            .run(self.runner)?;
        Ok(())
    }

    /// Echo tool versions and check the scratch project resolves the pinned type checker
    fn verify_toolchain(&self, app_root: &Path) -> Result<String> {
        let package_manager = self
            .package_manager(app_root)
            .arg("--version")
            .run(self.runner)?;

        let output = self
            .package_manager(app_root)
            .args(["tsc", "--version"])
            .run(self.runner)?;

        let reported = output.stdout.trim();
        let actual = parse_version(reported).unwrap_or(reported);
        if !version_matches(&self.scenario.typescript_version, actual) {
            return Err(toolchain_mismatch(
                &self.scenario.typescript_version,
                reported,
            ));
        }

        self.logger.success(&format!(
            "Toolchain verified: {} {}, typescript {actual}",
            self.scenario.package_manager,
            package_manager.stdout.trim()
        ));
        Ok(actual.to_string())
    }

    fn type_check(&self, app_root: &Path) -> Result<()> {
        self.package_manager(app_root)
            .args(["tsc", "--noEmit"])
            .run(self.runner)
            .map(|_| ())
            .map_err(|e| match e {
                HarnessError::CommandFailed { output, .. } => type_check_failed(output),
                other => other,
            })
    }
}

/// Builder for one package manager invocation in a fixed directory
struct PackageManagerCall(CommandSpec);

impl PackageManagerCall {
    fn arg(self, arg: impl Into<String>) -> Self {
        Self(self.0.arg(arg))
    }

    fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(self.0.args(args))
    }

    fn run(self, runner: &dyn CommandRunner) -> Result<CommandOutput> {
        runner.run(&self.0)
    }
}

/// Version from tsc's own `Version 3.9.10` line; the package manager's lines are ignored
fn parse_version(reported: &str) -> Option<&str> {
    reported.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some("Version"), Some(version)) => Some(version),
            _ => None,
        }
    })
}

/// `3.9` matches `3.9` and `3.9.10`, but not `3.90.1`
fn version_matches(expected: &str, actual: &str) -> bool {
    actual == expected
        || actual
            .strip_prefix(expected)
            .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('-'))
}
