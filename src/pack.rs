//! Packing internal packages into installable artifacts
//!
//! The packer packs the requested packages together with every internal package they
//! depend on, so the scratch project can resolve the whole internal dependency tree to
//! freshly built artifacts.
//!
//! Artifact names are predicted from manifest metadata and handed to the package manager
//! explicitly (`pack --filename <path>`), then checked on disk. The package manager's
//! console output is never parsed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::pack::packaging_failed;
use crate::error::{HarnessError, Result};
use crate::hash;
use crate::logger::Logger;
use crate::process::{CommandRunner, CommandSpec};
use crate::project::{Monorepo, MonorepoPackage};

/// A packed internal package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPackage {
    pub name: String,
    pub version: String,
    /// Absolute path of the packed tarball
    pub artifact: PathBuf,
    /// BLAKE3 digest of the tarball
    pub digest: String,
}

/// Packed packages keyed by package name; never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPackages {
    packages: BTreeMap<String, PackedPackage>,
}

impl PackedPackages {
    /// Returns `None` for an empty set
    pub fn new(packages: Vec<PackedPackage>) -> Option<Self> {
        if packages.is_empty() {
            return None;
        }
        let packages = packages
            .into_iter()
            .map(|package| (package.name.clone(), package))
            .collect();
        Some(Self { packages })
    }

    pub fn get(&self, name: &str) -> Option<&PackedPackage> {
        self.packages.get(name)
    }

    pub fn artifact(&self, name: &str) -> Option<&Path> {
        self.get(name).map(|package| package.artifact.as_path())
    }

    /// Packed packages in name order
    pub fn iter(&self) -> impl Iterator<Item = &PackedPackage> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }
}

/// Predicted tarball name: scope `@` dropped, `/` replaced by `-`, version appended
pub fn artifact_file_name(name: &str, version: &str) -> String {
    let stem = name.trim_start_matches('@').replace('/', "-");
    format!("{stem}-{version}.tgz")
}

/// Packs monorepo packages with the package manager
pub struct Packer<'a> {
    runner: &'a dyn CommandRunner,
    package_manager: &'a str,
    logger: &'a Logger,
}

impl<'a> Packer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, package_manager: &'a str, logger: &'a Logger) -> Self {
        Self {
            runner,
            package_manager,
            logger,
        }
    }

    /// Pack `requested` and their internal dependencies into `destination`
    ///
    /// Either every package of the closure is packed, or the whole call fails with
    /// `PackagingFailed` for the first package that could not be packed.
    pub fn pack(
        &self,
        monorepo: &Monorepo,
        requested: &[String],
        destination: &Path,
    ) -> Result<PackedPackages> {
        if requested.is_empty() {
            return Err(crate::error::config::invalid("no packages requested for packing"));
        }

        let closure = monorepo.dependency_closure(requested)?;
        self.logger.info(&format!(
            "Packing {} package(s) for {}",
            closure.len(),
            requested.join(", ")
        ));

        let packed = closure
            .into_iter()
            .map(|package| {
                self.pack_one(package, destination)
                    .map_err(|e| packaging_failed(&package.name, e))
            })
            .collect::<Result<Vec<_>>>()?;

        PackedPackages::new(packed)
            .ok_or_else(|| crate::error::config::invalid("no packages requested for packing"))
    }

    fn pack_one(&self, package: &MonorepoPackage, destination: &Path) -> Result<PackedPackage> {
        let artifact = destination.join(artifact_file_name(&package.name, &package.version));

        let command = CommandSpec::new(self.package_manager)
            .args(["pack", "--filename"])
            .arg(artifact.to_string_lossy())
            .current_dir(&package.dir);
        self.runner.run(&command)?;

        let digest = hash::hash_file(&artifact).map_err(|e| HarnessError::IoError {
            message: format!(
                "`{command}` did not produce {}: {e}",
                artifact.display()
            ),
        })?;

        tracing::debug!(
            package = %package.name,
            artifact = %artifact.display(),
            %digest,
            "packed package"
        );
        self.logger.success(&format!(
            "Packed {}@{} ({})",
            package.name,
            package.version,
            hash::short(&digest)
        ));

        Ok(PackedPackage {
            name: package.name.clone(),
            version: package.version.clone(),
            artifact,
            digest,
        })
    }
}
