//! Directory walker and statistics

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::error::TestResult;
use crate::state_test::{StateTestResults, StateTestRunner};

/// Aggregated test statistics
#[derive(Debug, Default)]
pub struct TestStats {
    /// Files visited
    pub files: usize,
    /// Total tests seen
    pub total: usize,
    /// Tests passed
    pub passed: usize,
    /// Tests failed
    pub failed: usize,
    /// Tests skipped
    pub skipped: usize,
    /// Total execution time
    pub duration: Duration,
    /// Failed test names with reasons
    pub failures: Vec<(String, String)>,
}

impl TestStats {
    /// Create empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the results of one file
    pub fn add_state_results(&mut self, results: &StateTestResults) {
        self.files += 1;
        self.total += results.total();
        self.passed += results.passed.len();
        self.failed += results.failed.len();
        self.skipped += results.skipped.len();
        self.failures.extend(results.failed.iter().cloned());
    }

    /// Count a file that could not be loaded as one failure
    pub fn add_broken_file(&mut self, file: &Path, reason: String) {
        self.files += 1;
        self.total += 1;
        self.failed += 1;
        self.failures.push((file.display().to_string(), reason));
    }

    /// Pass rate as percentage
    pub fn pass_rate(&self) -> f64 {
        let executed = self.passed + self.failed;
        if executed == 0 {
            return 100.0;
        }
        (self.passed as f64 / executed as f64) * 100.0
    }

    /// No failures
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Print summary
    pub fn print_summary(&self) {
        println!("\n========================================");
        println!("State Test Summary");
        println!("========================================");
        println!("Files:   {}", self.files);
        println!("Total:   {}", self.total);
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Skipped: {}", self.skipped);
        println!("Pass Rate: {:.2}%", self.pass_rate());
        println!("Duration: {:.2}s", self.duration.as_secs_f64());

        if !self.failures.is_empty() {
            println!("\nFailed tests:");
            for (name, reason) in &self.failures {
                println!("  - {}: {}", name, reason);
            }
        }
    }
}

/// Runs every `.json` fixture under a path
pub struct TestRunner {
    state_runner: StateTestRunner,
    verbose: bool,
}

impl TestRunner {
    /// Create a runner for `fork`, or the default fork priority
    pub fn new(fork: Option<&str>, verbose: bool) -> TestResult<Self> {
        Ok(Self {
            state_runner: StateTestRunner::new(fork, verbose)?,
            verbose,
        })
    }

    /// Run a single fixture file or every fixture below a directory
    pub fn run_path(&self, path: &Path) -> TestResult<TestStats> {
        let mut stats = TestStats::new();
        let start = Instant::now();

        if path.is_dir() {
            info!(dir = %path.display(), "running state tests");
            self.run_dir(path, &mut stats)?;
        } else {
            self.run_file(path, &mut stats);
        }

        stats.duration = start.elapsed();
        info!(
            passed = stats.passed,
            failed = stats.failed,
            skipped = stats.skipped,
            "state tests finished"
        );
        Ok(stats)
    }

    fn run_dir(&self, dir: &Path, stats: &mut TestStats) -> TestResult<()> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.run_dir(&path, stats)?;
            } else if path.extension().is_some_and(|e| e == "json") {
                self.run_file(&path, stats);
            }
        }
        Ok(())
    }

    fn run_file(&self, path: &Path, stats: &mut TestStats) {
        match self.state_runner.run_file(path) {
            Ok(results) => {
                if self.verbose || !results.failed.is_empty() {
                    info!(
                        file = %path.display(),
                        passed = results.passed.len(),
                        failed = results.failed.len(),
                        skipped = results.skipped.len(),
                        "fixture file done"
                    );
                }
                stats.add_state_results(&results);
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "fixture file unreadable");
                stats.add_broken_file(path, e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_pass_rate() {
        let mut stats = TestStats::new();
        stats.passed = 90;
        stats.failed = 10;
        assert!((stats.pass_rate() - 90.0).abs() < 0.01);
        assert!(!stats.is_success());
    }

    #[test]
    fn test_stats_empty() {
        let stats = TestStats::new();
        assert_eq!(stats.pass_rate(), 100.0);
        assert!(stats.is_success());
    }

    #[test]
    fn test_broken_file_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let stats = TestRunner::new(None, false).unwrap().run_path(dir.path()).unwrap();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.failed, 1);
        assert!(stats.failures[0].1.contains("JSON"));
    }

    #[test]
    fn test_non_json_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "fixtures").unwrap();
        let stats = TestRunner::new(None, false).unwrap().run_path(dir.path()).unwrap();
        assert_eq!(stats.files, 0);
        assert_eq!(stats.total, 0);
    }
}
