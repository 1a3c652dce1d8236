//! Test utilities for wright-lib.
//!
//! Helpers for creating files with controlled modification times and for
//! embedding paths in Lua source.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

/// Create an empty file (and its parent directories) and return its path.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  File::create(&path).unwrap();
  path
}

/// Write a file (creating parent directories) and return its path.
pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, content).unwrap();
  path
}

/// Set a file's modification time to `secs` seconds after the Unix epoch.
pub fn set_mtime(path: &Path, secs: u64) {
  let file = File::options().write(true).open(path).unwrap();
  file.set_modified(UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
}

/// Escape a path for embedding in a Lua string literal.
/// On Windows, backslashes need to be doubled to avoid being interpreted as escape sequences.
pub fn lua_path(path: &Path) -> String {
  path.display().to_string().replace('\\', "\\\\")
}
