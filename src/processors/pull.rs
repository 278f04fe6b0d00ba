use super::ProcessingOutcome;
use crate::{
    repository::Repository,
    suites::{TestReport, TestSuite},
};
use log::{debug, error, info};
use std::sync::{Mutex, PoisonError};

/// Everything that happened during one pull-and-test run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullAndTestState {
    /// The exit code of the pull, -1 if it could not run at all.
    pub pull_exit_code: i32,
    /// The standard error of the pull, or the reason it could not run.
    pub pull_stderr: String,
    /// The report of the test suite, if there is one and the pull succeeded.
    pub test_result: Option<TestReport>,
    /// The exit code of the merge abort, if the tests failed.
    pub abort_exit_code: Option<i32>,
}

impl PullAndTestState {
    /// Translate the finished run into the response.
    pub fn outcome(&self) -> ProcessingOutcome {
        if self.pull_exit_code != 0 {
            return ProcessingOutcome::new(500, self.pull_stderr.clone());
        }

        match &self.test_result {
            None => ProcessingOutcome::new(200, "Webhook received successfully"),
            Some(report) if report.was_successful() => {
                ProcessingOutcome::new(200, format!("{} tests passed", report.tests_run))
            }
            Some(report) => ProcessingOutcome::new(
                428,
                format!(
                    "Tests did not pass, Errors: {:?}, Failures: {:?}. Merge abort status: {}",
                    report.errors,
                    report.failures,
                    self.abort_exit_code.unwrap_or(-1)
                ),
            ),
        }
    }
}

/// Pulls the working tree and runs the test suite on the new changes.
/// If the tests fail, the merge is aborted.
///
/// ```ignore
/// pull --(fails)--> 500
///   |
/// tests --(none)--> 200
///   |
///   +--(pass)--> 200
///   +--(fail)--> abort merge --> 428
/// ```
///
/// Only one run can happen at a time, concurrent deliveries wait for the previous
/// one to finish, since they all share the same working tree.
pub struct PullAndTestProcessor {
    repository: Box<dyn Repository>,
    tests: Option<Box<dyn TestSuite>>,
    lock: Mutex<()>,
}

impl PullAndTestProcessor {
    pub fn new(repository: Box<dyn Repository>, tests: Option<Box<dyn TestSuite>>) -> Self {
        PullAndTestProcessor {
            repository,
            tests,
            lock: Mutex::new(()),
        }
    }

    /// Run the pull, the tests and the abort if needed, holding the working tree lock.
    pub fn run(&self) -> PullAndTestState {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut state = PullAndTestState::default();

        debug!("Pulling the repository.");
        match self.repository.pull() {
            Ok(output) => {
                state.pull_exit_code = output.code;
                state.pull_stderr = output.stderr;
            }
            Err(err) => {
                state.pull_exit_code = -1;
                state.pull_stderr = format!("git pull failed: {err}");
            }
        }
        if state.pull_exit_code != 0 {
            error!("Error while pulling: {}", state.pull_stderr.trim_end());
            return state;
        }

        let Some(tests) = &self.tests else {
            debug!("Pulled successfully, there are no tests to run.");
            return state;
        };

        debug!("Running tests.");
        let report = tests.run();
        if report.was_successful() {
            info!("{} tests passed.", report.tests_run);
        } else {
            let abort_exit_code = match self.repository.abort_merge() {
                Ok(output) => output.code,
                Err(err) => {
                    error!("Merge abort failed: {err}.");
                    -1
                }
            };
            error!(
                "Tests did not pass, Errors: {:?}, Failures: {:?}. Merge abort status: {abort_exit_code}.",
                report.errors, report.failures
            );
            state.abort_exit_code = Some(abort_exit_code);
        }
        state.test_result = Some(report);

        state
    }

    pub fn process(&self) -> ProcessingOutcome {
        self.run().outcome()
    }
}
