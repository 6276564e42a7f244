//! Monorepo discovery and packaging errors

use super::HarnessError;

/// Creates a package not found error
pub fn package_not_found(package: impl Into<String>, root: impl Into<String>) -> HarnessError {
    HarnessError::PackageNotFound {
        package: package.into(),
        root: root.into(),
    }
}

/// Creates a project discovery failed error
pub fn discovery_failed(root: impl Into<String>, reason: impl Into<String>) -> HarnessError {
    HarnessError::ProjectDiscoveryFailed {
        root: root.into(),
        reason: reason.into(),
    }
}

/// Wraps the failure of a single package into a packaging error
pub fn packaging_failed(package: impl Into<String>, cause: HarnessError) -> HarnessError {
    HarnessError::PackagingFailed {
        package: package.into(),
        cause: Box::new(cause),
    }
}
