use duct::Expression;
use duration_string::DurationString;
use log::{trace, warn};
use std::{
    thread::sleep,
    time::{Duration, Instant},
};
use thiserror::Error;

/// Parsing user-defined commands into runnable expressions.
pub mod parse;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A custom error describing the error cases of running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command string cannot be split into a program and arguments.
    #[error("cannot parse command {0:?}")]
    Unparseable(String),
    /// The underlying process cannot be started or waited on. The parameter contains the error.
    #[error("the command cannot run: {0}")]
    Spawn(#[from] std::io::Error),
    /// The command did not finish in time and was killed.
    #[error("timed out after {0}")]
    TimedOut(DurationString),
}

/// The captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The exit code, or -1 if the process was terminated by a signal.
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Run the expression to completion, killing it after the timeout.
///
/// Non-zero exit codes are not errors, they are returned in the output.
/// The caller decides which streams are captured.
pub fn run_command(
    expression: &Expression,
    timeout: Option<Duration>,
) -> Result<CommandOutput, CommandError> {
    trace!("Running {expression:?}.");
    let handle = expression.unchecked().start()?;

    let output = match timeout {
        None => handle.wait()?,
        Some(timeout) => {
            let deadline = Instant::now() + timeout;
            loop {
                if let Some(output) = handle.try_wait()? {
                    break output;
                }
                if Instant::now() >= deadline {
                    warn!(
                        "Command {expression:?} did not finish in {}, killing it.",
                        DurationString::new(timeout)
                    );
                    handle.kill()?;
                    return Err(CommandError::TimedOut(DurationString::new(timeout)));
                }
                sleep(POLL_INTERVAL);
            }
        }
    };

    Ok(CommandOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
