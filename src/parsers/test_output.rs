// Reading pytest verbose output

use serde::{Deserialize, Serialize};

/// Per-test markers counted in `-v` output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCounts {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

impl TestCounts {
    /// Count every `PASSED`, `FAILED` and `ERROR` occurrence in the output
    pub fn from_output(output: &str) -> Self {
        Self {
            passed: output.matches("PASSED").count(),
            failed: output.matches("FAILED").count(),
            errors: output.matches("ERROR").count(),
        }
    }

    /// Counts for a run that was killed before reporting
    pub fn timed_out() -> Self {
        Self {
            passed: 0,
            failed: 0,
            errors: 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }

    /// Failures and errors together
    pub fn unsuccessful(&self) -> usize {
        self.failed + self.errors
    }

    /// Percentage of passed tests; zero when nothing ran
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.passed as f64 / total as f64 * 100.0
        }
    }
}

/// Grade of a counted test run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    AllPassed,
    SomeFailed,
    ManyFailed,
    NoTests,
}

impl TestStatus {
    pub fn from_counts(counts: &TestCounts) -> Self {
        let rate = counts.success_rate();
        if counts.total() == 0 {
            TestStatus::NoTests
        } else if rate >= 100.0 {
            TestStatus::AllPassed
        } else if rate >= 80.0 {
            TestStatus::SomeFailed
        } else {
            TestStatus::ManyFailed
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TestStatus::AllPassed => "✅",
            TestStatus::SomeFailed => "⚠️",
            TestStatus::ManyFailed => "❌",
            TestStatus::NoTests => "ℹ️",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            TestStatus::AllPassed => "All Tests Passed",
            TestStatus::SomeFailed => "Some Tests Failed",
            TestStatus::ManyFailed => "Many Tests Failed",
            TestStatus::NoTests => "No Tests Generated",
        }
    }
}

/// Coarse verdict from the words "passed" and "failed" in a run's stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunVerdict {
    Passed,
    Failed,
    Completed,
}

impl RunVerdict {
    pub fn from_stdout(stdout: &str) -> Self {
        let lower = stdout.to_lowercase();
        let mentions_failed = lower.contains("failed");
        if lower.contains("passed") && !mentions_failed {
            RunVerdict::Passed
        } else if mentions_failed {
            RunVerdict::Failed
        } else {
            RunVerdict::Completed
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RunVerdict::Passed => "✅",
            RunVerdict::Failed => "❌",
            RunVerdict::Completed => "⚠️",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            RunVerdict::Passed => "All Tests Passed",
            RunVerdict::Failed => "Some Tests Failed",
            RunVerdict::Completed => "Tests Completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
tests/test_qa_automation.py::test_login PASSED                 [ 25%]
tests/test_qa_automation.py::test_logout PASSED                [ 50%]
tests/test_qa_automation.py::test_cart FAILED                  [ 75%]
tests/test_qa_automation.py::test_checkout ERROR               [100%]
";

    #[test]
    fn test_counts_markers() {
        let counts = TestCounts::from_output(SAMPLE);
        assert_eq!(counts.passed, 2);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.unsuccessful(), 2);
        assert_eq!(counts.success_rate(), 50.0);
        assert_eq!(TestStatus::from_counts(&counts), TestStatus::ManyFailed);
    }

    #[test]
    fn test_counts_are_platform_sized() {
        let output = "tests/test_bulk.py::test_case PASSED\n".repeat(10_000);
        let counts = TestCounts::from_output(&output);
        let passed: usize = counts.passed;
        assert_eq!(passed, output.lines().count());
        assert_eq!(counts.total(), 10_000usize);
        assert_eq!(TestStatus::from_counts(&counts), TestStatus::AllPassed);
    }

    #[test]
    fn test_status_thresholds() {
        let all = TestCounts { passed: 3, failed: 0, errors: 0 };
        assert_eq!(TestStatus::from_counts(&all), TestStatus::AllPassed);

        let some = TestCounts { passed: 4, failed: 1, errors: 0 };
        assert_eq!(TestStatus::from_counts(&some), TestStatus::SomeFailed);

        let none = TestCounts::default();
        assert_eq!(none.success_rate(), 0.0);
        assert_eq!(TestStatus::from_counts(&none), TestStatus::NoTests);
    }

    #[test]
    fn test_timed_out_counts_one_error() {
        let counts = TestCounts::timed_out();
        assert_eq!(counts.total(), 1);
        assert_eq!(TestStatus::from_counts(&counts), TestStatus::ManyFailed);
    }

    #[test]
    fn test_verdict_from_stdout() {
        assert_eq!(RunVerdict::from_stdout("3 passed in 0.1s"), RunVerdict::Passed);
        assert_eq!(
            RunVerdict::from_stdout("1 failed, 2 passed in 0.1s"),
            RunVerdict::Failed
        );
        assert_eq!(RunVerdict::from_stdout("no tests ran"), RunVerdict::Completed);
        assert_eq!(RunVerdict::from_stdout("Tests timed out"), RunVerdict::Completed);
    }
}
