use super::{TestReport, TestSuite};
use crate::commands::{parse::parse_command, run_command, CommandError, CommandOutput};
use log::{debug, error};
use std::time::Duration;

/// A test suite where every test is a command run in the working tree.
///
/// A test passes if the command exits with zero. Non-zero exit codes are failures,
/// commands that cannot start or run out of time are errors. The combined
/// stdout and stderr of failing commands is kept in the report.
pub struct ScriptTestSuite {
    directory: String,
    commands: Vec<String>,
    runs_in_shell: bool,
    timeout: Option<Duration>,
}

impl ScriptTestSuite {
    /// Creates a new test suite, running the commands in the given directory.
    pub fn new(directory: String, commands: Vec<String>) -> Self {
        ScriptTestSuite {
            directory,
            commands,
            runs_in_shell: false,
            timeout: None,
        }
    }

    /// Run the commands in `/bin/sh` instead of splitting them into arguments.
    pub fn with_shell(mut self, runs_in_shell: bool) -> Self {
        self.runs_in_shell = runs_in_shell;
        self
    }

    /// Kill every command that runs longer than the timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn run_test(&self, command: &str) -> Result<CommandOutput, CommandError> {
        let expression = parse_command(command, self.runs_in_shell)?
            .env("CI", "true")
            .dir(&self.directory)
            .stderr_to_stdout()
            .stdout_capture();

        run_command(&expression, self.timeout)
    }
}

impl TestSuite for ScriptTestSuite {
    fn run(&self) -> TestReport {
        let mut report = TestReport::default();

        for command in &self.commands {
            debug!("Running test: {command} in directory {}.", self.directory);
            report.tests_run += 1;

            match self.run_test(command) {
                Ok(output) if output.success() => {
                    debug!("Test {command} passed.");
                }
                Ok(output) => {
                    error!("Test {command} failed with exit code {}.", output.code);
                    report.failures.push(format!(
                        "{command} (exit code {}): {}",
                        output.code,
                        output.stdout.trim_end()
                    ));
                }
                Err(err) => {
                    error!("Test {command} cannot run: {err}.");
                    report.errors.push(format!("{command}: {err}"));
                }
            }
        }

        report
    }
}
