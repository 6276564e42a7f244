//! Final report for a scenario run
//!
//! A setup failure means the harness could not build the scratch project; a verification
//! failure is the test's verdict on the packages under test. Both exit with status 1, but
//! they are worded differently so a reader can tell them apart at a glance.

use console::Style;

use crate::config::Scenario;
use crate::error::HarnessError;
use crate::orchestrator::{Phase, RunFailure, RunReport};

/// Exit status for any failed run
pub const FAILURE_EXIT_CODE: i32 = 1;

fn heading() -> Style {
    Style::new().red().bold().for_stderr()
}

/// Setup framing for `error`, optionally naming the step that was running
fn setup_lines(error: &HarnessError, step: Option<&str>) -> Vec<String> {
    let mut lines = vec![
        heading()
            .apply_to("Something went wrong setting up the test:")
            .to_string(),
    ];
    match step {
        Some(step) => lines.push(format!("Failed while {step}: {error}")),
        None => lines.push(error.to_string()),
    }

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        lines.push(format!("  caused by: {cause}"));
        source = cause.source();
    }
    if let Some(output) = error.output().map(str::trim).filter(|o| !o.is_empty()) {
        lines.push(output.to_string());
    }
    lines
}

/// Message printed to stderr when the run cannot start (configuration, project root)
pub fn setup_failure_message(error: &HarnessError) -> String {
    setup_lines(error, None).join("\n")
}

/// Message printed to stderr for a failed run
pub fn failure_message(failure: &RunFailure, scenario: &Scenario) -> String {
    let heading = heading();
    let mut lines = Vec::new();

    match failure.phase {
        Phase::Setup => {
            lines.extend(setup_lines(&failure.error, Some(failure.stage.next_step())));
        }
        Phase::Verification => {
            if let Some(output) = failure.error.output().map(str::trim).filter(|o| !o.is_empty()) {
                lines.push(output.to_string());
            }
            lines.push(
                heading
                    .apply_to(format!(
                        "Building a test project referencing {} using {} failed.",
                        scenario.packages.join(", "),
                        scenario.typescript_spec()
                    ))
                    .to_string(),
            );
            lines.push(format!(
                "This is most likely because you added an API in {} or a dependency which uses \
                 typescript features introduced in a version newer than {} (see logs above for \
                 the exact error).",
                scenario.packages.join(", "),
                scenario.typescript_version
            ));
        }
    }

    if let Some(root) = &failure.workspace {
        lines.push(format!("Workspace kept at {}", root.display()));
    }

    lines.join("\n")
}

/// Closing line printed to stdout for a successful run
pub fn success_message(report: &RunReport) -> Option<String> {
    report
        .workspace
        .as_ref()
        .map(|root| format!("Workspace kept at {}", root.display()))
}
