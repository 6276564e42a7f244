//! External process execution
//!
//! Every package manager and type checker invocation goes through a [`CommandRunner`].
//! [`ShellRunner`] is the real implementation: it spawns the child, forwards its output to
//! the console line by line as it arrives, and keeps a copy so failures can be reported
//! with the tool's own diagnostics. Runs block until the child exits; there is no timeout
//! and no retry.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use console::Style;

use crate::error::Result;
use crate::error::process::{command_failed, spawn_failed};

/// A command line plus the directory it runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of a successful process invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Stdout followed by stderr
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Runs external commands to completion
pub trait CommandRunner {
    /// Run `command`, failing with `CommandFailed` on a non-zero exit
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands as child processes, echoing them and their output to the console
#[derive(Debug, Clone)]
pub struct ShellRunner {
    echo: bool,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self { echo: true }
    }

    /// Runner that only captures output
    #[cfg(test)]
    pub fn capturing() -> Self {
        Self { echo: false }
    }

    fn announce(&self, command: &CommandSpec) {
        if !self.echo {
            return;
        }
        let location = command
            .cwd()
            .map(|dir| format!(" (in {})", dir.display()))
            .unwrap_or_default();
        println!(
            "{} {}{}",
            Style::new().cyan().bold().apply_to("$"),
            Style::new().bold().apply_to(command),
            Style::new().dim().apply_to(location)
        );
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.announce(command);
        tracing::debug!(command = %command, cwd = ?command.cwd(), "running command");

        let mut cmd = Command::new(command.program());
        cmd.args(command.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = command.cwd() {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| spawn_failed(command.to_string(), e.to_string()))?;

        let child_stdout = child.stdout.take();
        let child_stderr = child.stderr.take();
        let echo = self.echo;

        let (status, stdout, stderr) = thread::scope(|scope| {
            let out = scope.spawn(move || forward_lines(child_stdout, echo.then(io::stdout)));
            let err = scope.spawn(move || forward_lines(child_stderr, echo.then(io::stderr)));

            let status = child.wait();
            let stdout = out.join().unwrap_or_default();
            let stderr = err.join().unwrap_or_default();
            (status, stdout, stderr)
        });

        let status = status.map_err(|e| spawn_failed(command.to_string(), e.to_string()))?;
        let output = CommandOutput {
            exit_code: status.code(),
            stdout,
            stderr,
        };

        if !status.success() {
            tracing::debug!(command = %command, exit_code = ?output.exit_code, "command failed");
            return Err(command_failed(
                command.to_string(),
                output.exit_code,
                output.combined(),
            ));
        }

        Ok(output)
    }
}

/// Copy `source` line by line into `sink` as lines arrive, returning everything read
fn forward_lines<R: Read, W: Write>(source: Option<R>, mut sink: Option<W>) -> String {
    let Some(source) = source else {
        return String::new();
    };

    let mut reader = BufReader::new(source);
    let mut captured = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if let Some(sink) = sink.as_mut() {
                    let _ = sink.write_all(&line);
                    let _ = sink.flush();
                }
                captured.extend_from_slice(&line);
            }
        }
    }

    String::from_utf8_lossy(&captured).into_owned()
}
