use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

/// Runs `recur` inside a temporary working directory, so each test gets its
/// own `config.toml`.
pub struct CliTestHarness {
    temp_dir: TempDir,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self { temp_dir }
    }

    /// A harness whose working directory holds the given `config.toml`.
    pub fn with_config(contents: &str) -> Self {
        let harness = Self::new();
        fs::write(harness.temp_dir.path().join("config.toml"), contents)
            .expect("Failed to write config.toml");
        harness
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("recur").expect("Failed to find recur binary");
        cmd.current_dir(self.temp_dir.path());
        for key in ["RECUR_WEEK_START", "RECUR_ADVANCE_FROM", "RECUR_PREVIEW_COUNT", "RECUR_LOG"] {
            cmd.env_remove(key);
        }
        cmd
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Utility functions for test assertions
pub mod assertions {
    use predicates::prelude::*;

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error")
    }

    pub fn has_preview_table_headers() -> impl Predicate<str> {
        predicate::str::contains("Date")
            .and(predicate::str::contains("Day"))
            .and(predicate::str::contains("When"))
    }
}
