//! Scratch workspace provisioning
//!
//! This module handles:
//! - Creating a uniquely named temporary workspace per run
//! - Seeding the application root with a minimal manifest
//! - Cleaning the workspace up on drop, or keeping it for inspection
//!
//! ## Workspace Structure
//!
//! ```text
//! <tmp>/<prefix><random>/
//! ├── app/                 # Scratch project (application root)
//! │   └── package.json     # Resolution manifest
//! └── artifacts/           # Packed internal packages
//! ```
//!
//! Uniqueness comes from `tempfile`, which creates the root with `O_EXCL` semantics and a
//! random suffix, so concurrent runs (threads or processes) never share a root.

pub mod temp;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::Result;
use crate::error::workspace::creation_failed;
use crate::manifest;

/// Application root directory name
pub const APP_DIR: &str = "app";

/// Packed artifacts directory name
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Name given to the scratch project in its manifest
const APP_PROJECT_NAME: &str = "ts-minbar-app";

/// A provisioned scratch workspace, owned exclusively by one run
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace
    root: PathBuf,

    /// Scratch project directory
    app_root: PathBuf,

    /// Directory packed artifacts are written to
    artifacts_dir: PathBuf,

    /// Cleanup guard; `None` once the workspace has been kept
    temp: Option<TempDir>,
}

impl Workspace {
    /// Provision a workspace under `base`
    pub fn provision_in(base: &Path, prefix: &str) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(base)
            .map_err(|e| creation_failed(base.display().to_string(), e.to_string()))?;

        // Canonical root keeps `file:` references stable across symlinked temp dirs
        // (e.g. /var -> /private/var on macOS).
        let root = dunce::canonicalize(temp.path())
            .map_err(|e| creation_failed(temp.path().display().to_string(), e.to_string()))?;

        let app_root = root.join(APP_DIR);
        let artifacts_dir = root.join(ARTIFACTS_DIR);

        for dir in [&app_root, &artifacts_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| creation_failed(dir.display().to_string(), e.to_string()))?;
        }

        manifest::seed(&app_root, APP_PROJECT_NAME)
            .map_err(|e| creation_failed(app_root.display().to_string(), e.to_string()))?;

        tracing::debug!(root = %root.display(), "provisioned scratch workspace");

        Ok(Self {
            root,
            app_root,
            artifacts_dir,
            temp: Some(temp),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Disable cleanup and return the root, leaving the tree on disk for inspection
    pub fn keep(mut self) -> PathBuf {
        if let Some(temp) = self.temp.take() {
            let _ = temp.keep();
        }
        tracing::warn!(root = %self.root.display(), "keeping scratch workspace");
        self.root.clone()
    }
}
