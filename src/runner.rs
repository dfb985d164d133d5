//! Subprocess seam for the external tools provcheck drives
//!
//! Everything non-trivial here happens in external binaries (`gh`,
//! `slsa-verifier`, `git`). The `CommandRunner` trait is the single seam
//! through which they are invoked, so discovery and dispatch can be tested
//! with a scripted runner instead of the real tools. Invocations are strictly
//! sequential and blocking; no retries, no timeouts.

use std::io;
use std::path::Path;
use std::process::Command;

use log::debug;
use thiserror::Error;

/// Errors launching an external tool
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The program was not found on PATH
    #[error("`{0}` not found on PATH (is it installed?)")]
    NotFound(String),

    /// The program could not be launched
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        /// The program that failed to launch
        program: String,
        /// The underlying I/O error
        source: io::Error,
    },
}

/// Captured result of one external invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code (-1 if terminated by signal)
    pub code: i32,
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr, lossily decoded
    pub stderr: String,
}

impl CommandOutput {
    /// Did the process exit zero?
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external commands
pub trait CommandRunner {
    /// Run `program` with `args`, optionally in `cwd`, and capture its output.
    ///
    /// A non-zero exit is not an error at this layer; callers decide what an
    /// exit code means.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, RunnerError>;
}

/// The real runner: blocking `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, RunnerError> {
        debug!("running: {} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                RunnerError::NotFound(program.to_string())
            } else {
                RunnerError::Spawn { program: program.to_string(), source }
            }
        })?;

        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
