//! External process errors

use super::HarnessError;

/// Creates a spawn failed error
pub fn spawn_failed(command: impl Into<String>, reason: impl Into<String>) -> HarnessError {
    HarnessError::CommandSpawnFailed {
        command: command.into(),
        reason: reason.into(),
    }
}

/// Creates a command failed error
pub fn command_failed(
    command: impl Into<String>,
    exit_code: Option<i32>,
    output: impl Into<String>,
) -> HarnessError {
    HarnessError::CommandFailed {
        command: command.into(),
        exit_code,
        output: output.into(),
    }
}
