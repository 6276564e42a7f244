//! Monorepo package discovery
//!
//! Finds the internal packages of the monorepo under test from the root manifest's
//! `workspaces` globs, and computes which internal packages a set of requested packages
//! depends on. Every package in that closure has to be packed; otherwise the scratch
//! project would resolve the library's own internal dependencies from the registry.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::{DirEntry, WalkDir};
use wax::{CandidatePath, Glob, Pattern};

use crate::error::Result;
use crate::error::pack::{discovery_failed, package_not_found};
use crate::manifest::MANIFEST_FILE;

/// Directories never searched for workspace packages, besides dot-directories
const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// Subset of a `package.json` needed for discovery
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    optional_dependencies: BTreeMap<String, serde_json::Value>,
    workspaces: Option<WorkspaceGlobs>,
}

/// The two shapes yarn accepts for `workspaces`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspaceGlobs {
    List(Vec<String>),
    Config {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl WorkspaceGlobs {
    fn patterns(&self) -> &[String] {
        match self {
            WorkspaceGlobs::List(patterns) | WorkspaceGlobs::Config { packages: patterns } => {
                patterns
            }
        }
    }
}

/// An internal package of the monorepo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonorepoPackage {
    pub name: String,
    pub version: String,
    /// Package source root (directory holding its `package.json`)
    pub dir: PathBuf,
    /// Names of all declared runtime, peer and optional dependencies
    pub dependencies: BTreeSet<String>,
}

/// Internal packages of a monorepo, keyed by package name
#[derive(Debug)]
pub struct Monorepo {
    root: PathBuf,
    packages: BTreeMap<String, MonorepoPackage>,
}

impl Monorepo {
    /// Locate the monorepo root: the git work tree containing `start`, or `start` itself
    pub fn find_root(start: &Path) -> PathBuf {
        git2::Repository::discover(start)
            .ok()
            .and_then(|repo| repo.workdir().map(Path::to_path_buf))
            .map_or_else(|| start.to_path_buf(), |dir| dunce::simplified(&dir).to_path_buf())
    }

    /// Discover the packages declared by the root manifest
    ///
    /// Without a `workspaces` field the root package is the only package.
    pub fn discover(root: &Path) -> Result<Self> {
        let root_display = root.display().to_string();
        let mut root_manifest = read_manifest(&root.join(MANIFEST_FILE))
            .map_err(|reason| discovery_failed(&root_display, reason))?;

        let mut packages = BTreeMap::new();

        let Some(workspaces) = root_manifest.workspaces.take() else {
            if let Some(package) = into_package(root_manifest, root) {
                packages.insert(package.name.clone(), package);
            }
            return Ok(Self {
                root: root.to_path_buf(),
                packages,
            });
        };

        let matcher = WorkspaceMatcher::new(workspaces.patterns())
            .map_err(|reason| discovery_failed(&root_display, reason))?;

        let manifests = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.depth() > 0 && entry.file_name() == MANIFEST_FILE);

        for entry in manifests {
            let Some(dir) = entry.path().parent() else {
                continue;
            };
            let relative = dir.strip_prefix(root).unwrap_or(dir);
            if !matcher.matches(relative) {
                continue;
            }

            let manifest = read_manifest(entry.path())
                .map_err(|reason| discovery_failed(&root_display, reason))?;
            let Some(package) = into_package(manifest, dir) else {
                tracing::debug!(dir = %dir.display(), "skipping unnamed workspace package");
                continue;
            };

            if let Some(existing) = packages.get(&package.name) {
                return Err(discovery_failed(
                    &root_display,
                    format!(
                        "package '{}' is declared in both {} and {}",
                        package.name,
                        existing.dir.display(),
                        package.dir.display()
                    ),
                ));
            }
            packages.insert(package.name.clone(), package);
        }

        tracing::debug!(root = %root_display, count = packages.len(), "discovered workspace packages");

        Ok(Self {
            root: root.to_path_buf(),
            packages,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package(&self, name: &str) -> Option<&MonorepoPackage> {
        self.packages.get(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// The requested packages plus every internal package they transitively depend on,
    /// sorted by name
    pub fn dependency_closure<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<Vec<&MonorepoPackage>> {
        let mut selected = BTreeMap::new();
        let mut queue = VecDeque::new();

        for name in requested {
            let name = name.as_ref();
            let package = self
                .package(name)
                .ok_or_else(|| package_not_found(name, self.root.display().to_string()))?;
            queue.push_back(package);
        }

        while let Some(package) = queue.pop_front() {
            if selected.insert(package.name.as_str(), package).is_some() {
                continue;
            }
            queue.extend(
                package
                    .dependencies
                    .iter()
                    .filter_map(|dep| self.package(dep))
                    .filter(|dep| !selected.contains_key(dep.name.as_str())),
            );
        }

        Ok(selected.into_values().collect())
    }
}

/// Compiled `workspaces` globs; `!`-prefixed patterns exclude
struct WorkspaceMatcher<'t> {
    include: Vec<Glob<'t>>,
    exclude: Vec<Glob<'t>>,
}

impl<'t> WorkspaceMatcher<'t> {
    fn new(patterns: &'t [String]) -> std::result::Result<Self, String> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for pattern in patterns {
            let (negated, pattern) = match pattern.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, pattern.as_str()),
            };
            let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
            let glob = Glob::new(pattern)
                .map_err(|e| format!("invalid workspace glob '{pattern}': {e}"))?;
            if negated {
                exclude.push(glob);
            } else {
                include.push(glob);
            }
        }

        Ok(Self { include, exclude })
    }

    fn matches(&self, relative_dir: &Path) -> bool {
        let normalized = relative_dir.to_string_lossy().replace('\\', "/");
        let candidate = CandidatePath::from(normalized.as_str());

        self.include
            .iter()
            .any(|glob| glob.matched(&candidate).is_some())
            && !self
                .exclude
                .iter()
                .any(|glob| glob.matched(&candidate).is_some())
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn read_manifest(path: &Path) -> std::result::Result<PackageManifest, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("cannot parse {}: {e}", path.display()))
}

fn into_package(manifest: PackageManifest, dir: &Path) -> Option<MonorepoPackage> {
    let name = manifest.name?;
    let dependencies = manifest
        .dependencies
        .into_keys()
        .chain(manifest.peer_dependencies.into_keys())
        .chain(manifest.optional_dependencies.into_keys())
        .collect();

    Some(MonorepoPackage {
        name,
        version: manifest.version.unwrap_or_else(|| "0.0.0".to_string()),
        dir: dir.to_path_buf(),
        dependencies,
    })
}
