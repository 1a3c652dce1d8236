//! The `wright` global table.
//!
//! - `wright.task`, `sources`, `target`, `depends`, `include` - task combinators
//! - `wright.context([dir])` - a free-standing build context
//! - `wright.load(path[, name])` - load a build file as a module
//! - `wright.is_env(var[, value])` - compare an environment variable
//! - `wright.bump_version(file[, part])` - bump a `VERSION = "x.y.z"` line
//! - `wright.path` - path helpers
//! - `wright.go`, `wright.docker` - external tool wrappers
//! - `wright.version` - the running wright version

use std::path::{Path, PathBuf};

use mlua::prelude::*;

use super::{helpers, loaders};
use crate::consts::GLOBAL_TABLE;
use crate::context::Context;
use crate::include::{derive_name, resolve_build_file};
use crate::task::{Origin, lua::register_combinators};
use crate::tools;
use crate::util::env::is_env;
use crate::util::version::{Bump, bump_version};

/// Anchor a relative path at the build file being evaluated.
fn resolve_from_origin(lua: &Lua, path: &str) -> LuaResult<PathBuf> {
  let path = Path::new(path);
  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }
  Ok(Origin::current(lua)?.dir.join(path))
}

/// Register `wright` as a global and as `package.loaded.wright`.
pub fn register_globals(lua: &Lua) -> LuaResult<()> {
  let wright = lua.create_table()?;

  register_combinators(lua, &wright)?;

  wright.set(
    "context",
    lua.create_function(|lua, dir: Option<String>| match dir {
      Some(dir) => Ok(Context::new(resolve_from_origin(lua, &dir)?)),
      None => Ok(Origin::current(lua)?.new_context()),
    })?,
  )?;

  wright.set(
    "load",
    lua.create_function(|lua, (path, name): (String, Option<String>)| {
      let path = resolve_build_file(&resolve_from_origin(lua, &path)?);
      let name = name.unwrap_or_else(|| derive_name(&path));
      loaders::load_module(lua, &path, &name)
    })?,
  )?;

  wright.set(
    "is_env",
    lua.create_function(|_, (var, value): (String, Option<String>)| Ok(is_env(&var, value.as_deref())))?,
  )?;

  wright.set(
    "bump_version",
    lua.create_function(|lua, (file, part): (String, Option<String>)| {
      let part = match part {
        Some(part) => part.parse::<Bump>().map_err(LuaError::external)?,
        None => Bump::default(),
      };
      let file = resolve_from_origin(lua, &file)?;
      let bumped = bump_version(&file, part).map_err(LuaError::external)?;
      Ok(bumped.map(|v| v.to_string()))
    })?,
  )?;

  wright.set("path", helpers::path::create_path_helpers(lua)?)?;

  tools::lua::register_tools(lua, &wright)?;

  wright.set("version", env!("CARGO_PKG_VERSION"))?;

  let loaded: LuaTable = lua.globals().get::<LuaTable>("package")?.get("loaded")?;
  loaded.set(GLOBAL_TABLE, wright.clone())?;
  lua.globals().set(GLOBAL_TABLE, wright)?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use std::fs;

  use serial_test::serial;
  use tempfile::TempDir;

  use super::*;
  use crate::lua::runtime::create_runtime;
  use crate::module::Module;
  use crate::util::testutil::{lua_path, write};

  #[test]
  fn table_has_the_full_surface() -> LuaResult<()> {
    let lua = create_runtime()?;
    let wright: LuaTable = lua.globals().get(GLOBAL_TABLE)?;
    for key in [
      "task",
      "sources",
      "target",
      "depends",
      "include",
      "context",
      "load",
      "is_env",
      "bump_version",
      "path",
      "go",
      "docker",
      "version",
    ] {
      assert!(wright.contains_key(key)?, "missing wright.{}", key);
    }
    Ok(())
  }

  #[test]
  fn version_matches_the_crate() -> LuaResult<()> {
    let lua = create_runtime()?;
    let version: String = lua.load("return wright.version").eval()?;
    assert_eq!(version, env!("CARGO_PKG_VERSION"));
    Ok(())
  }

  mod context {
    use super::*;

    #[test]
    fn explicit_dir() -> LuaResult<()> {
      let lua = create_runtime()?;
      let ctx: Context = lua.load(r#"return wright.context("/project")"#).eval()?;
      assert_eq!(ctx.working_dir(), PathBuf::from("/project"));
      Ok(())
    }

    #[test]
    #[serial]
    fn defaults_to_cwd_outside_a_file() -> LuaResult<()> {
      let lua = create_runtime()?;
      let ctx: Context = lua.load("return wright.context()").eval()?;
      assert_eq!(ctx.working_dir(), std::env::current_dir().unwrap());
      Ok(())
    }

    #[test]
    fn defaults_to_the_evaluated_file() -> LuaResult<()> {
      let temp = TempDir::new().unwrap();
      let build = write(temp.path(), "BUILD.lua", "return wright.context()");

      let lua = create_runtime()?;
      let ctx = Context::from_lua(loaders::load_file_with_dir(&lua, &build)?, &lua)?;
      let build = dunce::canonicalize(&build).unwrap();
      assert_eq!(ctx.working_dir(), build.parent().unwrap());
      assert_eq!(ctx.sources(), vec![build.to_string_lossy().into_owned()]);
      Ok(())
    }
  }

  mod load {
    use super::*;

    #[test]
    fn loads_a_directory_as_a_module() -> LuaResult<()> {
      let temp = TempDir::new().unwrap();
      let lib = temp.path().join("lib");
      fs::create_dir(&lib).unwrap();
      write(&lib, "BUILD.lua", "function build() return 'built' end");

      let lua = create_runtime()?;
      let module: Module = lua
        .load(&format!(r#"return wright.load("{}")"#, lua_path(&lib)))
        .eval()?;
      assert_eq!(module.name(), "lib");

      lua.globals().set("lib", module)?;
      let built: String = lua.load("return lib.build()").eval()?;
      assert_eq!(built, "built");
      Ok(())
    }

    #[test]
    fn missing_file_is_nil() -> LuaResult<()> {
      let temp = TempDir::new().unwrap();
      let lua = create_runtime()?;
      let module: Option<Module> = lua
        .load(&format!(
          r#"return wright.load("{}", "x")"#,
          lua_path(&temp.path().join("nope.lua"))
        ))
        .eval()?;
      assert!(module.is_none());
      Ok(())
    }
  }

  mod env_and_version {
    use super::*;

    #[test]
    #[serial]
    fn is_env_compares_case_insensitively() -> LuaResult<()> {
      temp_env::with_var("WRIGHT_TEST_RELEASE", Some("TRUE"), || -> LuaResult<()> {
        let lua = create_runtime()?;
        assert!(lua.load(r#"return wright.is_env("WRIGHT_TEST_RELEASE")"#).eval::<bool>()?);
        assert!(!lua.load(r#"return wright.is_env("WRIGHT_TEST_RELEASE", "no")"#).eval::<bool>()?);
        Ok(())
      })
    }

    #[test]
    fn bump_version_rewrites_the_file() -> LuaResult<()> {
      let temp = TempDir::new().unwrap();
      let build = write(temp.path(), "BUILD.lua", "VERSION = \"1.2.3\"\n");

      let lua = create_runtime()?;
      let bumped: Option<String> = lua
        .load(&format!(r#"return wright.bump_version("{}", "minor")"#, lua_path(&build)))
        .eval()?;
      assert_eq!(bumped.as_deref(), Some("1.3.3"));
      assert_eq!(fs::read_to_string(&build).unwrap(), "VERSION = \"1.3.3\"\n");
      Ok(())
    }

    #[test]
    fn bump_version_rejects_unknown_part() -> LuaResult<()> {
      let temp = TempDir::new().unwrap();
      let build = write(temp.path(), "BUILD.lua", "VERSION = \"1.2.3\"\n");

      let lua = create_runtime()?;
      let err = lua
        .load(&format!(r#"return wright.bump_version("{}", "huge")"#, lua_path(&build)))
        .exec()
        .unwrap_err()
        .to_string();
      assert!(err.contains("huge"), "unexpected error: {}", err);
      Ok(())
    }
  }
}
