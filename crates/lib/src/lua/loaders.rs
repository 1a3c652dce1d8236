//! Loading build files into the Lua runtime.
//!
//! Two flavors of loading exist:
//!
//! - **Shared** ([`load_file_with_dir`]): the file reads and writes `_G`
//!   directly. Used for the root build file and for `dofile`, `loadfile`
//!   and `require`.
//! - **Isolated** ([`load_module`], [`load_file`]): the file gets a fresh
//!   environment table that reads through to `_G` but keeps its own
//!   assignments. Used for included build files, which must never leak
//!   tasks into their parent or into `package.loaded`.
//!
//! Either way the file sees a `__dir` variable holding its directory, and
//! the registry records the file being evaluated so tasks declared in it
//! remember where they came from (see [`current_file`]).

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;
use tracing::{debug, warn};

use crate::include::derive_name;
use crate::module::Module;
use crate::task::TaskError;

const CURRENT_DIR_KEY: &str = "__wright_current_dir";
const CURRENT_FILE_KEY: &str = "__wright_current_file";

/// Result of [`load_file`].
#[derive(Debug, Default)]
pub struct LoadOutcome {
  /// The loaded module, `None` when the file does not exist.
  pub module: Option<Module>,
  /// Values returned by the entry point, `None` when it was not called.
  pub result: Option<LuaMultiValue>,
}

/// Directory of the build file currently being evaluated.
pub fn current_dir(lua: &Lua) -> LuaResult<Option<PathBuf>> {
  Ok(lua.named_registry_value::<Option<String>>(CURRENT_DIR_KEY)?.map(PathBuf::from))
}

/// Path of the build file currently being evaluated.
pub fn current_file(lua: &Lua) -> LuaResult<Option<PathBuf>> {
  Ok(lua.named_registry_value::<Option<String>>(CURRENT_FILE_KEY)?.map(PathBuf::from))
}

fn read_source(path: &Path) -> LuaResult<(PathBuf, String)> {
  let path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot resolve '{}': {}", path.display(), e)))?;
  let source = fs::read_to_string(&path)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", path.display(), e)))?;
  Ok((path, source))
}

fn parent_dir(path: &Path) -> String {
  path.parent().unwrap_or(Path::new(".")).to_string_lossy().into_owned()
}

/// Environment for one file. Shared environments also write through to `_G`.
fn file_env(lua: &Lua, path: &Path, shared: bool) -> LuaResult<LuaTable> {
  let env = lua.create_table()?;
  env.set("__dir", parent_dir(path))?;

  let mt = lua.create_table()?;
  mt.set("__index", lua.globals())?;
  if shared {
    mt.set("__newindex", lua.globals())?;
  }
  env.set_metatable(Some(mt))?;
  Ok(env)
}

/// Run `f` with `path` recorded as the file being evaluated.
fn with_current_file<R>(lua: &Lua, path: &Path, f: impl FnOnce() -> LuaResult<R>) -> LuaResult<R> {
  let prev_dir: Option<String> = lua.named_registry_value(CURRENT_DIR_KEY)?;
  let prev_file: Option<String> = lua.named_registry_value(CURRENT_FILE_KEY)?;
  lua.set_named_registry_value(CURRENT_DIR_KEY, parent_dir(path))?;
  lua.set_named_registry_value(CURRENT_FILE_KEY, path.to_string_lossy().into_owned())?;

  let result = f();

  // Cleanup errors must not mask the chunk's own error.
  let _ = lua.set_named_registry_value(CURRENT_DIR_KEY, prev_dir);
  let _ = lua.set_named_registry_value(CURRENT_FILE_KEY, prev_file);
  result
}

/// Evaluate a file against the shared globals, with `__dir` injected.
pub fn load_file_with_dir(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let (path, source) = read_source(path)?;
  let env = file_env(lua, &path, true)?;

  with_current_file(lua, &path, || {
    lua
      .load(&source)
      .set_name(format!("@{}", path.display()))
      .set_environment(env)
      .eval::<LuaValue>()
  })
}

/// Compile a file without running it. Running the returned function
/// records the file as current, so tasks declared by it see its directory.
pub fn load_file_as_function(lua: &Lua, path: &Path) -> LuaResult<LuaFunction> {
  let (path, source) = read_source(path)?;
  let env = file_env(lua, &path, true)?;
  let chunk = lua
    .load(&source)
    .set_name(format!("@{}", path.display()))
    .set_environment(env)
    .into_function()?;

  lua.create_function(move |lua, args: LuaMultiValue| {
    with_current_file(lua, &path, || chunk.call::<LuaMultiValue>(args))
  })
}

/// Evaluate a build file in an isolated environment and wrap it as a module.
///
/// Exports are the table the chunk returns, else the chunk's environment.
/// A missing file is logged and yields `None`; evaluation errors propagate.
pub fn load_module(lua: &Lua, path: &Path, name: &str) -> LuaResult<Option<Module>> {
  if !path.is_file() {
    warn!(module = name, path = %path.display(), "build file not found");
    return Ok(None);
  }

  let (path, source) = read_source(path)?;
  let env = file_env(lua, &path, false)?;

  let returned = with_current_file(lua, &path, || {
    lua
      .load(&source)
      .set_name(format!("@{}", path.display()))
      .set_environment(env.clone())
      .eval::<LuaMultiValue>()
  })?;

  let exports = match returned.into_iter().next() {
    Some(LuaValue::Table(table)) => table,
    _ => env,
  };

  debug!(module = name, path = %path.display(), "loaded build file");
  Ok(Some(Module::new(name, path, exports)))
}

/// Load a build file as a module and call its `entry` export with no
/// arguments.
///
/// A missing file or a missing entry point is logged and reported through
/// the `None` fields of [`LoadOutcome`].
pub fn load_file(lua: &Lua, path: &Path, entry: &str) -> LuaResult<LoadOutcome> {
  let Some(module) = load_module(lua, path, &derive_name(path))? else {
    return Ok(LoadOutcome::default());
  };

  let result = match module.task(entry) {
    Ok(_) => Some(module.call(lua, entry, LuaMultiValue::new())?),
    Err(TaskError::NoSuchTask { .. }) => {
      warn!(task = entry, path = %module.path().display(), "entry point not found");
      None
    }
    Err(e) => return Err(LuaError::external(e)),
  };

  Ok(LoadOutcome {
    module: Some(module),
    result,
  })
}

/// Resolve a relative path against the directory of the file being
/// evaluated, falling back to the process cwd.
fn resolve_path(lua: &Lua, path: &str) -> LuaResult<PathBuf> {
  let path = Path::new(path);
  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }

  if let Some(dir) = current_dir(lua)? {
    let resolved = dir.join(path);
    if resolved.exists() {
      return Ok(resolved);
    }
  }

  Ok(path.to_path_buf())
}

/// `package.searchers[2]` replacement: same search path, `__dir`-aware loading.
fn create_lua_searcher(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, modname: String| {
    let package: LuaTable = lua.globals().get("package")?;
    let searchpath: LuaFunction = package.get("searchpath")?;
    let searched = searchpath.call::<LuaMultiValue>((modname.as_str(), package.get::<String>("path")?))?;

    // searchpath returns the file, or nil and an error message
    let Some(LuaValue::String(file)) = searched.into_iter().next() else {
      return Ok((LuaValue::Nil, format!("\n\tno file for module '{}'", modname)));
    };

    let file = file.to_str()?.to_string();
    let target = PathBuf::from(&file);
    let loader = lua.create_function(move |lua, _: LuaMultiValue| load_file_with_dir(lua, &target))?;
    Ok((LuaValue::Function(loader), file))
  })
}

fn create_dofile(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, path: Option<String>| {
    let path = path.ok_or_else(|| LuaError::external("dofile() without path not supported"))?;
    load_file_with_dir(lua, &resolve_path(lua, &path)?)
  })
}

fn create_loadfile(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, (path, mode, env): (String, Option<String>, Option<LuaTable>)| {
    if let Some(mode) = mode.as_deref()
      && mode != "t"
      && mode != "bt"
    {
      return Err(LuaError::external(format!(
        "loadfile mode '{}' not supported (only 't' and 'bt' allowed)",
        mode
      )));
    }
    if env.is_some() {
      return Err(LuaError::external("loadfile with custom environment not supported"));
    }

    load_file_as_function(lua, &resolve_path(lua, &path)?)
  })
}

/// Replace `require`'s Lua searcher, `dofile` and `loadfile` with versions
/// that inject `__dir` and resolve relative paths against the current file.
pub fn install_loaders(lua: &Lua) -> LuaResult<()> {
  let package: LuaTable = lua.globals().get("package")?;
  let searchers: LuaTable = package.get("searchers")?;
  searchers.set(2, create_lua_searcher(lua)?)?;

  lua.globals().set("dofile", create_dofile(lua)?)?;
  lua.globals().set("loadfile", create_loadfile(lua)?)?;
  Ok(())
}
