//! Common test utilities for ts-minbar integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

/// Stand-in for yarn: logs each call, writes tarballs on `pack`, and fails `tsc --noEmit`
/// when a scaffold source mentions `MISSING_API`.
///
/// Behaviour switches, read from the environment:
/// - `FAKE_YARN_LOG`: file every call is appended to as `<cwd>: <args>`
/// - `FAKE_FAIL_PACK`: fail `pack` for artifacts whose name contains this value
/// - `FAKE_TSC_VERSION`: version reported by `tsc --version` (default 3.9.10)
const FAKE_YARN: &str = r#"#!/bin/sh
if [ -n "$FAKE_YARN_LOG" ]; then
  echo "$PWD: $*" >> "$FAKE_YARN_LOG"
fi

case "$1" in
  pack)
    if [ -n "$FAKE_FAIL_PACK" ]; then
      case "$3" in
        *"$FAKE_FAIL_PACK"*)
          echo "error Couldn't pack $PWD" >&2
          exit 1
          ;;
      esac
    fi
    echo "fake tarball of $PWD" > "$3"
    echo "success Wrote tarball to \"$3\"."
    ;;
  add)
    echo "success Saved lockfile."
    ;;
  --version)
    echo "1.22.19"
    ;;
  tsc)
    case "$2" in
      --version)
        echo "Version ${FAKE_TSC_VERSION:-3.9.10}"
        ;;
      --noEmit)
        if grep -rq "MISSING_API" src; then
          echo "src/index.tsx(1,10): error TS2305: Module '\"@fluentui/react-components\"' has no exported member 'MISSING_API'."
          exit 2
        fi
        ;;
    esac
    ;;
esac
"#;

/// A test workspace holding a fake monorepo, scaffold, scenario file and package manager
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new, empty test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = dunce::canonicalize(temp.path()).expect("Failed to canonicalize temp directory");
        std::fs::create_dir_all(path.join("tmp")).expect("Failed to create tmp directory");
        Self { temp, path }
    }

    /// Workspace with a monorepo, a scaffold, the fake package manager and a scenario file
    pub fn with_scenario() -> Self {
        let workspace = Self::new();
        workspace.create_monorepo();
        workspace.create_scaffold("import { Button } from '@fluentui/react-components';\n");
        workspace.create_fake_yarn();
        workspace.write_scenario(&["@fluentui/react-components"]);
        workspace
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Monorepo with react-components → react-button → react-theme and an unrelated package
    pub fn create_monorepo(&self) {
        self.write_file(
            "monorepo/package.json",
            r#"{ "name": "mono", "private": true, "workspaces": ["packages/*"] }"#,
        );
        self.write_file(
            "monorepo/packages/react-components/package.json",
            r#"{ "name": "@fluentui/react-components", "version": "9.1.0",
                 "dependencies": { "@fluentui/react-button": "^9.0.3", "react": "^17.0.0" } }"#,
        );
        self.write_file(
            "monorepo/packages/react-button/package.json",
            r#"{ "name": "@fluentui/react-button", "version": "9.0.3",
                 "peerDependencies": { "@fluentui/react-theme": "^9.0.0" } }"#,
        );
        self.write_file(
            "monorepo/packages/react-theme/package.json",
            r#"{ "name": "@fluentui/react-theme", "version": "9.0.0" }"#,
        );
        self.write_file(
            "monorepo/packages/unrelated/package.json",
            r#"{ "name": "@fluentui/unrelated", "version": "1.0.0" }"#,
        );
    }

    /// Scaffold with a tsconfig and the given `src/index.tsx`
    pub fn create_scaffold(&self, index: &str) {
        self.write_file(
            "scaffold/tsconfig.json",
            r#"{ "compilerOptions": { "strict": true, "noEmit": true } }"#,
        );
        self.write_file("scaffold/src/index.tsx", index);
    }

    /// Install the fake package manager as `bin/yarn`
    pub fn create_fake_yarn(&self) {
        self.write_file("bin/yarn", FAKE_YARN);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let path = self.fake_yarn();
            let mut permissions = std::fs::metadata(&path)
                .expect("Failed to stat fake yarn")
                .permissions();
            permissions.set_mode(0o755);
            std::fs::set_permissions(&path, permissions).expect("Failed to chmod fake yarn");
        }
    }

    /// Scenario file using the fake package manager and the local scaffold
    pub fn write_scenario(&self, packages: &[&str]) {
        let packages = packages
            .iter()
            .map(|p| format!("\"{p}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.write_file(
            "minbar.yaml",
            &format!(
                "name: ts-minbar-it\n\
                 package_manager: \"{}\"\n\
                 packages: [{packages}]\n\
                 scaffold_dir: scaffold\n",
                self.fake_yarn().display()
            ),
        );
    }

    pub fn fake_yarn(&self) -> PathBuf {
        self.path.join("bin/yarn")
    }

    pub fn monorepo(&self) -> PathBuf {
        self.path.join("monorepo")
    }

    pub fn scenario(&self) -> PathBuf {
        self.path.join("minbar.yaml")
    }

    /// Directory scratch workspaces are created in (passed as `TMPDIR`)
    pub fn tmp(&self) -> PathBuf {
        self.path.join("tmp")
    }

    pub fn call_log(&self) -> PathBuf {
        self.path.join("calls.log")
    }

    /// Calls recorded by the fake package manager, one per line
    pub fn calls(&self) -> Vec<String> {
        if !self.file_exists("calls.log") {
            return Vec::new();
        }
        self.read_file("calls.log")
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// Scratch workspaces left under [`Self::tmp`]
    pub fn scratch_workspaces(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.tmp())
            .expect("Failed to read tmp directory")
            .map(|entry| entry.expect("Failed to read tmp entry").path())
            .collect()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_file_operations() {
        let workspace = TestWorkspace::new();
        workspace.write_file("test/file.txt", "hello");
        assert!(workspace.file_exists("test/file.txt"));
        assert_eq!(workspace.read_file("test/file.txt"), "hello");
    }

    #[test]
    fn test_workspace_with_scenario() {
        let workspace = TestWorkspace::with_scenario();
        assert!(workspace.file_exists("monorepo/packages/react-theme/package.json"));
        assert!(workspace.file_exists("scaffold/src/index.tsx"));
        assert!(workspace.read_file("minbar.yaml").contains("bin/yarn"));
        assert!(workspace.calls().is_empty());
    }
}
