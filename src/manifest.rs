//! Scratch project manifest (`package.json`) handling
//!
//! This module handles:
//! - Seeding the scratch project's manifest when the workspace is provisioned
//! - Rewriting the `resolutions` block so internal packages resolve to packed artifacts
//! - Pinning a single transitive dependency to a fixed version
//!
//! The document is kept as an ordered JSON map, so every rewrite preserves the key order
//! of the original file and produces byte-identical output for identical input.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::Result;
use crate::error::manifest::rewrite_failed;
use crate::pack::PackedPackages;

/// Manifest filename of the scratch project
pub const MANIFEST_FILE: &str = "package.json";

const RESOLUTIONS_KEY: &str = "resolutions";

/// The scratch project's manifest and its dependency-resolution block
#[derive(Debug)]
pub struct ResolutionManifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl ResolutionManifest {
    /// Load the manifest from the application root
    pub fn load(app_root: &Path) -> Result<Self> {
        let path = app_root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)
            .map_err(|e| rewrite_failed(path.display().to_string(), e.to_string()))?;

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| rewrite_failed(path.display().to_string(), e.to_string()))?;

        let Value::Object(document) = value else {
            return Err(rewrite_failed(
                path.display().to_string(),
                "manifest root is not a JSON object",
            ));
        };

        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current resolution entries, if the manifest has a resolutions block
    pub fn resolutions(&self) -> Option<&Map<String, Value>> {
        self.document.get(RESOLUTIONS_KEY).and_then(Value::as_object)
    }

    /// Resolution spec for a single package
    pub fn resolution(&self, package: &str) -> Option<&str> {
        self.resolutions()?.get(package)?.as_str()
    }

    /// Insert or overwrite `resolutions[package] = spec`
    ///
    /// An existing entry keeps its position in the block.
    pub fn set_resolution(&mut self, package: &str, spec: impl Into<String>) -> Result<()> {
        let resolutions = self
            .document
            .entry(RESOLUTIONS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));

        let Value::Object(resolutions) = resolutions else {
            return Err(rewrite_failed(
                self.path.display().to_string(),
                "`resolutions` is not a JSON object",
            ));
        };

        resolutions.insert(package.to_string(), Value::String(spec.into()));
        Ok(())
    }

    /// Serialize the manifest the way the package manager writes it
    pub fn render(&self) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(&self.document)
            .map_err(|e| rewrite_failed(self.path.display().to_string(), e.to_string()))?;
        rendered.push('\n');
        Ok(rendered)
    }

    pub fn save(&self) -> Result<()> {
        let rendered = self.render()?;
        fs::write(&self.path, rendered)
            .map_err(|e| rewrite_failed(self.path.display().to_string(), e.to_string()))
    }
}

/// Write the initial manifest of a freshly provisioned scratch project
pub fn seed(app_root: &Path, project_name: &str) -> std::io::Result<()> {
    let mut document = Map::new();
    document.insert("name".to_string(), Value::from(project_name));
    document.insert("version".to_string(), Value::from("1.0.0"));
    document.insert("private".to_string(), Value::Bool(true));
    document.insert("license".to_string(), Value::from("MIT"));
    document.insert(RESOLUTIONS_KEY.to_string(), Value::Object(Map::new()));

    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');
    fs::write(app_root.join(MANIFEST_FILE), rendered)
}

/// Resolution spec pointing the package manager at a local artifact
pub fn artifact_reference(artifact: &Path) -> String {
    let path = artifact.to_string_lossy().replace('\\', "/");
    format!("file:{path}")
}

/// Pin every packed package to its local artifact in the scratch project's resolutions
///
/// Returns the number of entries written. Applying it twice with the same packed
/// packages leaves the manifest byte-identical.
pub fn add_resolution_paths(app_root: &Path, packed: &PackedPackages) -> Result<usize> {
    let mut manifest = ResolutionManifest::load(app_root)?;

    for package in packed.iter() {
        manifest.set_resolution(&package.name, artifact_reference(&package.artifact))?;
    }

    manifest.save()?;
    tracing::debug!(
        manifest = %manifest.path().display(),
        count = packed.len(),
        "rewrote resolutions to packed artifacts"
    );
    Ok(packed.len())
}

/// Pin a transitive dependency to a fixed version
pub fn pin_resolution(app_root: &Path, package: &str, version: &str) -> Result<()> {
    let mut manifest = ResolutionManifest::load(app_root)?;
    manifest.set_resolution(package, version)?;
    manifest.save()?;
    tracing::debug!(package, version, "pinned resolution");
    Ok(())
}
