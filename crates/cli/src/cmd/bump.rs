//! Implementation of the `wright bump` command.

use std::path::Path;

use anyhow::{Context, Result, bail};

use wright_lib::util::version::{Bump, bump_version};

use super::build_file;
use crate::output::print_success;

pub fn cmd_bump(part: Bump, script: &Path) -> Result<()> {
  let path = build_file(script)?;

  let Some(version) =
    bump_version(&path, part).with_context(|| format!("Failed to bump version in {}", path.display()))?
  else {
    bail!("no VERSION declared in {}", path.display());
  };

  print_success(&format!("Bumped {} version to {}", part, version));
  Ok(())
}
