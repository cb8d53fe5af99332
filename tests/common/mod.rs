//! Shared test helpers for integration tests
//!
//! Every command runs against a temp directory with its own score file and
//! home directory, so the real user config and data dir are never read.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Calibrates against the decoder reference (qr-code, 2.1 cm) at 10 px/cm
/// and answers all four built-in questions correctly
pub const FULL_ROUND_SCRIPT: &str = r#"player: Ana
steps:
  - start_camera
  - detect: "https://example.org/marker"
  - tap: [100, 100]
  - tap: [121, 100]
  - calibrate
  - tap: [0, 0]
  - tap: [1000, 0]
  - submit
  - tap: [0, 0]
  - tap: [0, 100]
  - submit
  - tap: [0, 0]
  - tap: [300, 400]
  - submit
  - tap: [0, 0]
  - tap: [100, 100]
  - submit
"#;

/// A temp workspace for one test
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn scores_path(&self) -> PathBuf {
        self.dir.path().join("scores.json")
    }

    /// Write a file into the sandbox and return its path
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// An `mq` command isolated to this sandbox
    pub fn mq(&self) -> Command {
        let mut cmd = mq();
        let home = self.dir.path().join("home");
        cmd.current_dir(self.dir.path())
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("XDG_DATA_HOME", home.join(".local/share"))
            .env("MQ_SCORES_FILE", self.scores_path())
            .env_remove("MQ_CONFIG")
            .env_remove("MQ_PLAYER")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Per-user config dir as seen by commands run through [`Sandbox::mq`]
    pub fn user_config_dir(&self) -> PathBuf {
        self.dir
            .path()
            .join("home")
            .join(".config")
            .join("measure-quest")
    }

    /// Seed the score file with records
    pub fn seed_scores(&self, records: &[(u32, &str)]) {
        let entries: Vec<String> = records
            .iter()
            .map(|(score, player)| {
                format!(
                    r#"{{"score": {}, "label": "measurement", "date": "2024-06-01T12:00:00Z", "playerName": "{}"}}"#,
                    score, player
                )
            })
            .collect();
        fs::write(self.scores_path(), format!("[{}]", entries.join(","))).unwrap();
    }
}

/// Helper to get an mq command
pub fn mq() -> Command {
    Command::new(cargo::cargo_bin!("mq"))
}
