//! Scenario configuration data structures
//!
//! Without a configuration file the built-in scenario runs: `@fluentui/react-components`
//! type-checked with TypeScript 3.9 against React 17 typings. A YAML file may override
//! any field; fields it leaves out keep their built-in values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error::config::{invalid, parse_failed, read_failed};

/// Minimum TypeScript version supported for consumers
const DEFAULT_TYPESCRIPT_VERSION: &str = "3.9";

/// Scaffold template bundled with the crate
const BUNDLED_SCAFFOLD_DIR: &str = "scaffold";

/// A single minimum-toolchain test scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// Scenario name; used for the logger and the workspace prefix
    pub name: String,

    /// Pinned type checker version (`typescript@<version>`)
    pub typescript_version: String,

    /// Package manager executable
    pub package_manager: String,

    /// Registry dependencies installed before the artifacts, besides TypeScript itself
    pub dependencies: Vec<String>,

    /// Internal packages under test
    pub packages: Vec<String>,

    /// Transitive dependencies pinned through `resolutions`
    pub pinned_resolutions: BTreeMap<String, String>,

    /// Template copied into the scratch project
    pub scaffold_dir: PathBuf,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "ts-minbar-react-components".to_string(),
            typescript_version: DEFAULT_TYPESCRIPT_VERSION.to_string(),
            package_manager: "yarn".to_string(),
            dependencies: vec![
                "@types/react@17".to_string(),
                "@types/react-dom@17".to_string(),
                "react@17".to_string(),
                "react-dom@17".to_string(),
            ],
            packages: vec!["@fluentui/react-components".to_string()],
            // keyborg ships declarations that need a newer TypeScript after 2.3.0
            pinned_resolutions: BTreeMap::from([("keyborg".to_string(), "2.3.0".to_string())]),
            scaffold_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(BUNDLED_SCAFFOLD_DIR),
        }
    }
}

impl Scenario {
    /// Load the scenario from `path`, or the built-in scenario when `path` is `None`
    ///
    /// A relative `scaffold_dir` in the file is resolved against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            let scenario = Self::default();
            scenario.validate()?;
            return Ok(scenario);
        };

        let content = fs::read_to_string(path)
            .map_err(|e| read_failed(path.display().to_string(), e.to_string()))?;
        let mut scenario = Self::from_yaml(&content)
            .map_err(|e| parse_failed(path.display().to_string(), e.to_string()))?;

        if scenario.scaffold_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            scenario.scaffold_dir = base.join(&scenario.scaffold_dir);
        }

        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from YAML, filling unset fields with built-in values
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize the scenario to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("scenario name must not be empty"));
        }
        if self.typescript_version.trim().is_empty() {
            return Err(invalid("typescript_version must not be empty"));
        }
        if self.package_manager.trim().is_empty() {
            return Err(invalid("package_manager must not be empty"));
        }
        if self.packages.is_empty() {
            return Err(invalid("packages must list at least one package under test"));
        }
        if let Some(empty) = self.packages.iter().find(|p| p.trim().is_empty()) {
            return Err(invalid(format!("invalid package name '{empty}'")));
        }
        if !self.scaffold_dir.is_dir() {
            return Err(invalid(format!(
                "scaffold_dir {} is not a directory",
                self.scaffold_dir.display()
            )));
        }
        Ok(())
    }

    /// Prefix for the scratch workspace directory
    pub fn workspace_prefix(&self) -> String {
        format!("{}-", self.name)
    }

    /// `typescript@<version>` install spec
    pub fn typescript_spec(&self) -> String {
        format!("typescript@{}", self.typescript_version)
    }

    /// Everything installed from the registry before the artifacts
    pub fn base_dependencies(&self) -> Vec<String> {
        let mut dependencies = self.dependencies.clone();
        dependencies.push(self.typescript_spec());
        dependencies
    }
}
