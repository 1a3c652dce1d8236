//! Semantic version bumping for build files.
//!
//! A build file may carry its release version as a top-level constant:
//!
//! ```lua
//! VERSION = "1.4.2"
//! ```
//!
//! [`bump_version`] rewrites the first such line in place.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use thiserror::Error;
use tracing::{debug, info};

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^(\s*(?:local\s+|export\s+)?VERSION\s*=\s*)(["'])(\d+\.\d+\.\d+)(["'])"#)
    .expect("version regex is valid")
});

#[derive(Debug, Error)]
pub enum VersionError {
  #[error("cannot read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("cannot write '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid version '{version}': {source}")]
  Parse {
    version: String,
    #[source]
    source: semver::Error,
  },

  #[error("unknown version part '{0}' (expected major, minor or patch)")]
  UnknownPart(String),
}

/// Which part of a semantic version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bump {
  Major,
  Minor,
  #[default]
  Patch,
}

impl Bump {
  /// Increment one part. The other parts are kept as they are.
  pub fn apply(self, version: &Version) -> Version {
    match self {
      Bump::Major => Version::new(version.major + 1, version.minor, version.patch),
      Bump::Minor => Version::new(version.major, version.minor + 1, version.patch),
      Bump::Patch => Version::new(version.major, version.minor, version.patch + 1),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Bump::Major => "major",
      Bump::Minor => "minor",
      Bump::Patch => "patch",
    }
  }
}

impl FromStr for Bump {
  type Err = VersionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "major" => Ok(Bump::Major),
      "minor" => Ok(Bump::Minor),
      "patch" => Ok(Bump::Patch),
      _ => Err(VersionError::UnknownPart(s.to_string())),
    }
  }
}

impl fmt::Display for Bump {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Find the version declared in a build file's source, if any.
pub fn find_version(content: &str) -> Result<Option<Version>, VersionError> {
  for line in content.lines() {
    if let Some(caps) = VERSION_LINE.captures(line) {
      return parse(&caps[3]).map(Some);
    }
  }
  Ok(None)
}

/// Bump the `VERSION` constant in `build_file`.
///
/// Only the first matching line is rewritten; everything else in the file is
/// preserved byte for byte. Returns the new version, or `None` (leaving the
/// file untouched) when the file declares no version.
pub fn bump_version(build_file: &Path, bump: Bump) -> Result<Option<Version>, VersionError> {
  let content = fs::read_to_string(build_file).map_err(|source| VersionError::Read {
    path: build_file.to_path_buf(),
    source,
  })?;

  let mut output = String::with_capacity(content.len() + 2);
  let mut bumped = None;

  for line in content.split_inclusive('\n') {
    if bumped.is_none()
      && let Some(caps) = VERSION_LINE.captures(line)
    {
      let current = parse(&caps[3])?;
      let next = bump.apply(&current);
      let replaced = VERSION_LINE.replace(line, format!("${{1}}${{2}}{}${{4}}", next));
      output.push_str(&replaced);
      bumped = Some((current, next));
      continue;
    }
    output.push_str(line);
  }

  let Some((current, next)) = bumped else {
    debug!(file = %build_file.display(), "no VERSION declared");
    return Ok(None);
  };

  fs::write(build_file, output).map_err(|source| VersionError::Write {
    path: build_file.to_path_buf(),
    source,
  })?;

  info!(file = %build_file.display(), from = %current, to = %next, part = %bump, "bumped version");
  Ok(Some(next))
}

fn parse(version: &str) -> Result<Version, VersionError> {
  Version::parse(version).map_err(|source| VersionError::Parse {
    version: version.to_string(),
    source,
  })
}
