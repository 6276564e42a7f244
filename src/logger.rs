//! Run logger passed explicitly to every pipeline component.
//!
//! Each scenario run owns one `Logger` named `test:<scenario>`. Lines are printed to
//! stdout with the logger name as a dimmed prefix, and mirrored as `tracing` events
//! so `RUST_LOG` captures them alongside the component-level diagnostics.

use console::Style;

/// Named progress logger for a single scenario run
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    quiet: bool,
}

impl Logger {
    /// Create a logger for the scenario with the given name
    pub fn for_scenario(scenario: &str) -> Self {
        Self {
            name: format!("test:{scenario}"),
            quiet: false,
        }
    }

    /// Logger that only emits tracing events (used by unit tests)
    #[cfg(test)]
    pub fn quiet(scenario: &str) -> Self {
        Self {
            quiet: true,
            ..Self::for_scenario(scenario)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Report a completed step
    pub fn success(&self, message: &str) {
        tracing::info!(logger = %self.name, "{message}");
        self.print(&Style::new().green(), "✔️", message);
    }

    /// Report progress that is not a completed step
    pub fn info(&self, message: &str) {
        tracing::info!(logger = %self.name, "{message}");
        self.print(&Style::new().cyan(), "›", message);
    }

    fn print(&self, style: &Style, marker: &str, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = Style::new().dim().apply_to(&self.name);
        println!("{prefix} {} {message}", style.apply_to(marker));
    }
}
