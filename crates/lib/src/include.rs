//! Attaching other build files to a context.

use std::path::{Path, PathBuf};

use mlua::prelude::*;
use tracing::{debug, warn};

use crate::consts::BUILD_FILE;
use crate::context::Context;
use crate::lua::loaders;
use crate::module::Module;

/// A directory means the build file inside it.
pub fn resolve_build_file(path: &Path) -> PathBuf {
  if path.is_dir() {
    path.join(BUILD_FILE)
  } else {
    path.to_path_buf()
  }
}

/// Module name for a build file: the name of the directory holding it.
pub fn derive_name(build_file: &Path) -> String {
  build_file
    .parent()
    .and_then(Path::file_name)
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}

/// Load the build file at `path` and attach it to `ctx`.
///
/// Relative paths resolve against the context's working directory. A
/// missing file is logged and leaves the context untouched. Every call
/// re-executes the file.
pub fn include(lua: &Lua, ctx: &Context, path: &str, name: Option<&str>) -> LuaResult<Option<Module>> {
  let build_file = resolve_build_file(&ctx.resolve(path));
  let build_file = dunce::canonicalize(&build_file).unwrap_or(build_file);
  let name = name.map(str::to_string).unwrap_or_else(|| derive_name(&build_file));

  if name.is_empty() {
    warn!(path = %build_file.display(), "cannot derive a module name");
    return Ok(None);
  }

  debug!(module = %name, path = %build_file.display(), "including build file");
  let Some(module) = loaders::load_module(lua, &build_file, &name)? else {
    return Ok(None);
  };

  ctx.set_module(&name, module.clone());
  Ok(Some(module))
}
