//! Scratch workspace errors

use super::HarnessError;

/// Creates a workspace creation failed error
pub fn creation_failed(path: impl Into<String>, reason: impl Into<String>) -> HarnessError {
    HarnessError::WorkspaceCreationFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
