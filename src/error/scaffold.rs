//! Scaffold copy errors

use super::HarnessError;

/// Creates a scaffold copy failed error
pub fn copy_failed(path: impl Into<String>, reason: impl Into<String>) -> HarnessError {
    HarnessError::ScaffoldCopyFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
