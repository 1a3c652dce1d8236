//! Root build files that include and drive nested ones.

use mlua::prelude::*;

use wright_lib::lua::loaders::load_file;
use wright_lib::lua::runtime::create_runtime;

use super::common::Tree;

const API_BUILD: &str = r#"
  local wright = require("wright")

  LEAKED = true

  build = wright.sources("src/*.c", wright.target("api.bin", wright.task(function(ctx)
    return ctx:should_run(), ctx.working_dir
  end)))
"#;

#[test]
fn nested_module_runs_with_its_own_context() -> LuaResult<()> {
  let tree = Tree::new();
  let root_build = tree.write(
    "BUILD.lua",
    r#"
      local wright = require("wright")

      build = wright.include("services/api", wright.task(function(ctx)
        return ctx.api.build()
      end))
    "#,
  );
  tree.write("services/api/BUILD.lua", API_BUILD);
  tree.write("services/api/src/main.c", "int main() { return 0; }");

  let lua = create_runtime()?;
  let outcome = load_file(&lua, &root_build, "build")?;

  let result = outcome.result.expect("build ran");
  let values: Vec<LuaValue> = result.into_iter().collect();
  assert_eq!(values[0].as_boolean(), Some(true));
  let api_dir = tree.root.join("services/api");
  assert_eq!(values[1].to_string()?, api_dir.to_string_lossy());

  let root = outcome.module.expect("root module loaded");
  assert_eq!(root.context().module_names(), vec!["api".to_string()]);

  let api = root.context().module("api").map_err(LuaError::external)?;
  assert_eq!(api.context().target(), Some(api_dir.join("api.bin")));
  assert!(root.context().target().is_none());
  Ok(())
}

#[test]
fn included_globals_stay_in_their_module() -> LuaResult<()> {
  let tree = Tree::new();
  let root_build = tree.write(
    "BUILD.lua",
    r#"
      local wright = require("wright")

      check = wright.include("api", wright.task(function(ctx)
        return LEAKED == nil, ctx.api.LEAKED
      end))
    "#,
  );
  tree.write("api/BUILD.lua", API_BUILD);

  let lua = create_runtime()?;
  let outcome = load_file(&lua, &root_build, "check")?;

  let (isolated, exported): (bool, bool) = lua.unpack_multi(outcome.result.expect("check ran"))?;
  assert!(isolated);
  assert!(exported);
  assert!(lua.globals().get::<LuaValue>("LEAKED")?.is_nil());
  Ok(())
}

#[test]
fn target_is_up_to_date_after_artifact_is_written() -> LuaResult<()> {
  let tree = Tree::new();
  tree.write("api/BUILD.lua", API_BUILD);
  tree.write("api/src/main.c", "int main() { return 0; }");
  let api_build = tree.root.join("api/BUILD.lua");

  let lua = create_runtime()?;
  let first = load_file(&lua, &api_build, "build")?;
  let (stale, _): (bool, String) = lua.unpack_multi(first.result.expect("build ran"))?;
  assert!(stale);

  let artifact = tree.write("api/api.bin", "binary");
  let future = std::time::SystemTime::now() + std::time::Duration::from_secs(3600);
  std::fs::File::options()
    .write(true)
    .open(&artifact)
    .unwrap()
    .set_modified(future)
    .unwrap();

  let second = load_file(&lua, &api_build, "build")?;
  let (stale, _): (bool, String) = lua.unpack_multi(second.result.expect("build ran"))?;
  assert!(!stale);
  Ok(())
}
