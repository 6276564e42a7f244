//! Toolchain and type-check verdict errors

use super::HarnessError;

/// Creates a toolchain mismatch error
pub fn toolchain_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> HarnessError {
    HarnessError::ToolchainMismatch {
        expected: expected.into(),
        actual: actual.into(),
    }
}

/// Creates a type check failed error
pub fn type_check_failed(output: impl Into<String>) -> HarnessError {
    HarnessError::TypeCheckFailed {
        output: output.into(),
    }
}
