//! Test environment builder for isolated keepsync runs.
//!
//! Provides `TestEnv` - a source directory (mirrored by the `dir` provider),
//! a destination directory, and an isolated home, plus helpers to run the
//! keepsync CLI against them.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

use keepsync::{JsonStateRepository, StateDocument, STATE_FILE_NAME};
use keepsync::domain::ports::StateRepository;

/// Result of running a keepsync CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as newline-delimited JSON events
    pub fn json_events(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad event {l}: {e}")))
            .collect()
    }
}

/// Isolated test environment
pub struct TestEnv {
    pub source: TempDir,
    pub dest: TempDir,
    pub home: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            source: TempDir::new().expect("Failed to create source dir"),
            dest: TempDir::new().expect("Failed to create destination dir"),
            home: TempDir::new().expect("Failed to create home dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_keepsync")),
        }
    }

    /// Environment with a `keepsync.toml` in the destination pointing at the source
    pub fn configured() -> Self {
        let env = Self::new();
        let repo = env.source.path().display().to_string().replace('\\', "/");
        env.write_dest(
            "keepsync.toml",
            &format!("[source]\nprovider = \"dir\"\nrepo = \"{repo}\"\n"),
        );
        env
    }

    pub fn source_path(&self, relative: &str) -> PathBuf {
        self.source.path().join(relative)
    }

    pub fn dest_path(&self, relative: &str) -> PathBuf {
        self.dest.path().join(relative)
    }

    pub fn write_source(&self, relative: &str, content: &str) {
        write_file(&self.source_path(relative), content);
    }

    pub fn remove_source(&self, relative: &str) {
        std::fs::remove_file(self.source_path(relative)).expect("Failed to remove source file");
    }

    pub fn write_dest(&self, relative: &str, content: &str) {
        write_file(&self.dest_path(relative), content);
    }

    pub fn read_dest(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dest_path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {relative}: {e}"))
    }

    pub fn dest_exists(&self, relative: &str) -> bool {
        self.dest_path(relative).exists()
    }

    /// Raw lock file content
    pub fn read_lock_file(&self) -> String {
        std::fs::read_to_string(self.dest_path(STATE_FILE_NAME)).unwrap_or_default()
    }

    pub fn state(&self) -> StateDocument {
        JsonStateRepository::new()
            .load(&self.dest_path(STATE_FILE_NAME))
            .expect("Failed to load state")
    }

    /// Run keepsync with the destination as working directory
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.dest.path())
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env_remove("KEEPSYNC_LOG")
            .env_remove("KEEPSYNC_DESTINATION")
            .env_remove("KEEPSYNC_CONCURRENCY");
        for (key, value) in env_vars {
            cmd.env(key, value);
        }
        let output = cmd.output().expect("Failed to execute keepsync");
        to_result(output)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
