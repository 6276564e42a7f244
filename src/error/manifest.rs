//! Resolution manifest errors

use super::HarnessError;

/// Creates a manifest rewrite failed error
pub fn rewrite_failed(path: impl Into<String>, reason: impl Into<String>) -> HarnessError {
    HarnessError::ManifestRewriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
