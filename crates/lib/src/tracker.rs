//! Timestamp-based staleness tracking.
//!
//! A reference file (usually a build target) is stale when it does not exist,
//! or when any file matched by a set of glob patterns was modified at the same
//! time or later than the reference.
//!
//! # Pattern resolution
//!
//! - Absolute patterns are split into a literal root (every segment before the
//!   first one containing a wildcard) and a wildcard suffix matched beneath it.
//! - Relative patterns are matched against the process's current working
//!   directory, *not* against any build context's working directory. Callers
//!   that want context-relative matching resolve the pattern first (see
//!   `wright.sources`).

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, trace};

/// Characters that turn a path segment into a wildcard segment.
const WILDCARD_CHARS: &[char] = &['*', '?', '['];

/// Errors that can occur while checking staleness.
#[derive(Debug, Error)]
pub enum TrackError {
  #[error("invalid glob pattern '{pattern}': {source}")]
  Pattern {
    pattern: String,
    #[source]
    source: glob::PatternError,
  },

  #[error("cannot read modification time of '{path}': {source}")]
  Metadata {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot determine current directory: {0}")]
  CurrentDir(#[source] io::Error),
}

/// Returns true when `reference` is missing or older than any matched file.
///
/// Patterns are checked in order and the scan stops at the first file whose
/// modification time is greater than or equal to the reference's. A pattern
/// that matches nothing never makes the result true.
pub fn is_stale<S: AsRef<str>>(patterns: &[S], reference: &Path) -> Result<bool, TrackError> {
  if !reference.exists() {
    debug!(reference = %reference.display(), "reference missing, stale");
    return Ok(true);
  }

  let ref_mtime = modified(reference)?;

  for pattern in patterns {
    let pattern = pattern.as_ref();
    for file in expand(pattern)? {
      let mtime = match modified(&file) {
        Ok(mtime) => mtime,
        // Vanished between the directory scan and the stat.
        Err(TrackError::Metadata { source, .. }) if source.kind() == io::ErrorKind::NotFound => continue,
        Err(e) => return Err(e),
      };

      if mtime >= ref_mtime {
        debug!(
          file = %file.display(),
          reference = %reference.display(),
          "source is not older than reference, stale"
        );
        return Ok(true);
      }
    }
  }

  Ok(false)
}

/// Expand a pattern into the paths it currently matches.
pub fn expand(pattern: &str) -> Result<Vec<PathBuf>, TrackError> {
  let full = resolve_pattern(pattern)?;

  let paths = glob::glob(&full).map_err(|source| TrackError::Pattern {
    pattern: pattern.to_string(),
    source,
  })?;

  let mut matched = Vec::new();
  for entry in paths {
    match entry {
      Ok(path) => matched.push(path),
      Err(e) => trace!(error = %e, "skipping unreadable glob entry"),
    }
  }

  trace!(pattern, count = matched.len(), "expanded pattern");
  Ok(matched)
}

/// Turn a watch pattern into the absolute glob expression that is matched.
fn resolve_pattern(pattern: &str) -> Result<String, TrackError> {
  let path = Path::new(pattern);

  if path.is_absolute() {
    let (root, suffix) = split_glob(path);
    let root = glob::Pattern::escape(&root.to_string_lossy());
    return Ok(match suffix {
      Some(suffix) => join_glob(&root, &suffix),
      None => root,
    });
  }

  let cwd = std::env::current_dir().map_err(TrackError::CurrentDir)?;
  let root = glob::Pattern::escape(&cwd.to_string_lossy());
  Ok(join_glob(&root, pattern))
}

fn join_glob(root: &str, suffix: &str) -> String {
  if root.ends_with(std::path::MAIN_SEPARATOR) || root.ends_with('/') {
    format!("{}{}", root, suffix)
  } else {
    format!("{}/{}", root, suffix)
  }
}

/// Split an absolute pattern into its literal root and its wildcard suffix.
///
/// Every segment from the first one containing a wildcard character onwards
/// belongs to the suffix. Returns `None` for the suffix when the pattern has
/// no wildcards at all.
pub fn split_glob(path: &Path) -> (PathBuf, Option<String>) {
  let mut root = PathBuf::new();
  let mut suffix: Vec<String> = Vec::new();

  for component in path.components() {
    let part = component.as_os_str().to_string_lossy();
    let is_wild = matches!(component, Component::Normal(_)) && part.contains(WILDCARD_CHARS);

    if is_wild || !suffix.is_empty() {
      suffix.push(part.into_owned());
    } else {
      root.push(component);
    }
  }

  if suffix.is_empty() {
    (root, None)
  } else {
    (root, Some(suffix.join("/")))
  }
}

fn modified(path: &Path) -> Result<SystemTime, TrackError> {
  fs::metadata(path)
    .and_then(|m| m.modified())
    .map_err(|source| TrackError::Metadata {
      path: path.to_path_buf(),
      source,
    })
}
