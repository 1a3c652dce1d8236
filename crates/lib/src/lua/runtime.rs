use mlua::prelude::*;

use crate::lua::{globals, loaders};

/// Create a Lua runtime ready to evaluate build files.
///
/// Helper scripts under `./lua/` are requireable, the file loaders inject
/// `__dir`, and the `wright` table is registered as a global and as
/// `require("wright")`.
pub fn create_runtime() -> LuaResult<Lua> {
  let lua = Lua::new();

  let package: LuaTable = lua.globals().get("package")?;
  let package_path: String = package.get("path")?;
  package.set("path", format!("./lua/?.lua;./lua/?/init.lua;{}", package_path))?;

  loaders::install_loaders(&lua)?;
  globals::register_globals(&lua)?;

  Ok(lua)
}
