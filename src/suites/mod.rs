use mockall::automock;

/// A test suite made of commands run in the working tree.
pub mod script;

/// The result of running a test suite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport {
    /// The number of tests that were run.
    pub tests_run: usize,
    /// Tests that could not run properly (e.g. failed to start or timed out).
    pub errors: Vec<String>,
    /// Tests that ran and did not pass.
    pub failures: Vec<String>,
}

impl TestReport {
    pub fn was_successful(&self) -> bool {
        self.errors.is_empty() && self.failures.is_empty()
    }
}

/// A test suite is run after every successful pull, to decide whether the new
/// changes can stay in the working tree.
///
/// Test suites may include:
///   - commands run in the working tree ([script::ScriptTestSuite])
///   - in-process checks implemented by the embedding application
#[automock]
pub trait TestSuite: Send + Sync {
    /// Run every test synchronously and report the results.
    fn run(&self) -> TestReport;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_be_successful_without_errors_and_failures() {
        let report = TestReport {
            tests_run: 3,
            ..TestReport::default()
        };
        assert!(report.was_successful());
    }

    #[test]
    fn it_should_fail_with_any_error_or_failure() {
        let with_error = TestReport {
            tests_run: 1,
            errors: vec![String::from("timed out")],
            failures: vec![],
        };
        assert!(!with_error.was_successful());

        let with_failure = TestReport {
            tests_run: 1,
            errors: vec![],
            failures: vec![String::from("exit code 1")],
        };
        assert!(!with_failure.was_successful());
    }
}
