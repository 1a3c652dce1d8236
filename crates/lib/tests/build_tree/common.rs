use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary build tree with a canonical root.
pub struct Tree {
  _temp: TempDir,
  pub root: PathBuf,
}

impl Tree {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    Self { _temp: temp, root }
  }

  /// Write a file relative to the root, creating parent directories.
  pub fn write(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.root.join(relative_path);
    std::fs::create_dir_all(path.parent().unwrap_or(Path::new("."))).unwrap();
    std::fs::write(&path, content).unwrap();
    path
  }
}
