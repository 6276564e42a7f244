//! Test fixtures shared by the unit tests.
//!
//! - [`ScriptedRunner`]: a [`CommandRunner`] that records every command instead of
//!   spawning it, fakes the package manager's side effects and fails on request.
//! - [`create_monorepo`]: a small monorepo with an internal dependency chain.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::error::Result;
use crate::error::process::{command_failed, spawn_failed};
use crate::process::{CommandOutput, CommandRunner, CommandSpec};

/// Records commands and imitates the package manager
pub struct ScriptedRunner {
    calls: RefCell<Vec<CommandSpec>>,
    failures: Vec<String>,
    spawn_failures: Vec<String>,
    tsc_version: String,
    writes_artifacts: bool,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failures: Vec::new(),
            spawn_failures: Vec::new(),
            tsc_version: "Version 3.9.10".to_string(),
            writes_artifacts: true,
        }
    }

    /// Fail (exit code 1) every command whose rendered line or directory contains `needle`
    #[must_use]
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.failures.push(needle.to_string());
        self
    }

    /// Fail to start every command whose rendered line or directory contains `needle`
    #[must_use]
    pub fn failing_to_spawn(mut self, needle: &str) -> Self {
        self.spawn_failures.push(needle.to_string());
        self
    }

    /// Output of `tsc --version`
    #[must_use]
    pub fn with_tsc_version(mut self, version: &str) -> Self {
        self.tsc_version = version.to_string();
        self
    }

    /// Make `pack` succeed without writing its tarball
    #[must_use]
    pub fn without_artifacts(mut self) -> Self {
        self.writes_artifacts = false;
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Recorded commands rendered as command lines
    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }

    fn describe(command: &CommandSpec) -> String {
        match command.cwd() {
            Some(dir) => format!("{command} (in {})", dir.display()),
            None => command.to_string(),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(command.clone());

        let described = Self::describe(command);
        if self.spawn_failures.iter().any(|needle| described.contains(needle)) {
            return Err(spawn_failed(command.to_string(), "No such file or directory"));
        }
        if self.failures.iter().any(|needle| described.contains(needle)) {
            return Err(command_failed(
                command.to_string(),
                Some(1),
                format!("scripted failure of {described}"),
            ));
        }

        let args: Vec<&str> = command.arguments().iter().map(String::as_str).collect();
        let stdout = match args.as_slice() {
            ["pack", "--filename", artifact] => {
                if self.writes_artifacts {
                    let artifact = Path::new(artifact);
                    fs::create_dir_all(artifact.parent().unwrap()).unwrap();
                    fs::write(artifact, described.as_bytes()).unwrap();
                }
                String::new()
            }
            ["tsc", "--version"] => format!("{}\n", self.tsc_version),
            ["--version"] => "1.22.19\n".to_string(),
            _ => String::new(),
        };

        Ok(CommandOutput {
            exit_code: Some(0),
            stdout,
            stderr: String::new(),
        })
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Monorepo where react-components depends on react-button, which depends on react-theme
pub fn create_monorepo() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let root = temp.path();

    write(
        root,
        "package.json",
        r#"{ "name": "mono", "private": true, "workspaces": ["packages/*", "packages/react-components/*"] }"#,
    );
    write(
        root,
        "packages/react-components/react-components/package.json",
        r#"{ "name": "@fluentui/react-components", "version": "9.1.0",
             "dependencies": { "@fluentui/react-button": "^9.0.3", "tslib": "^2.1.0" } }"#,
    );
    write(
        root,
        "packages/react-components/react-button/package.json",
        r#"{ "name": "@fluentui/react-button", "version": "9.0.3",
             "dependencies": { "@fluentui/react-theme": "^9.0.0" } }"#,
    );
    write(
        root,
        "packages/react-theme/package.json",
        r#"{ "name": "@fluentui/react-theme", "version": "9.0.0" }"#,
    );
    write(
        root,
        "packages/unrelated/package.json",
        r#"{ "name": "@fluentui/unrelated", "version": "1.0.0" }"#,
    );

    temp
}

/// Scaffold template with a tsconfig and one source file
pub fn create_scaffold() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    write(
        temp.path(),
        "tsconfig.json",
        r#"{ "compilerOptions": { "strict": true, "noEmit": true } }"#,
    );
    write(
        temp.path(),
        "src/index.tsx",
        "import { Button } from '@fluentui/react-components';\n",
    );
    temp
}
