mod bump;
mod list;
mod run;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use mlua::Error as LuaError;

pub use bump::cmd_bump;
pub use list::cmd_list;
pub use run::cmd_run;

// mlua errors are not Send + Sync, so carry them into anyhow as text
pub(crate) fn lua_err(e: LuaError) -> anyhow::Error {
  anyhow::anyhow!("{}", e)
}

/// Canonical path of an existing build file.
pub(crate) fn build_file(script: &Path) -> Result<PathBuf> {
  if !script.is_file() {
    bail!("build file not found: {}", script.display());
  }
  Ok(dunce::canonicalize(script)?)
}
