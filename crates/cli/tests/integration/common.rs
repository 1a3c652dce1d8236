//! Shared test helpers for CLI integration tests.

use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated build tree.
///
/// Each test gets its own temporary directory holding a `BUILD.lua`.
pub struct TestEnv {
  pub temp: TempDir,
  pub script: PathBuf,
}

impl TestEnv {
  pub fn with_build(content: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("BUILD.lua");
    std::fs::write(&script, content).unwrap();
    Self { temp, script }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path)).unwrap()
  }

  /// Push a file's modification time into the future.
  pub fn make_newest(&self, relative_path: &str) {
    let file = File::options().write(true).open(self.path(relative_path)).unwrap();
    file
      .set_modified(SystemTime::now() + Duration::from_secs(3600))
      .unwrap();
  }

  /// A `wright` command running from outside the build tree, pointed at
  /// this environment's build file.
  pub fn wright_cmd(&self, subcommand: &str) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("wright");
    cmd.env_remove("RUST_LOG");
    cmd.arg(subcommand).arg("--script").arg(&self.script);
    cmd
  }
}
