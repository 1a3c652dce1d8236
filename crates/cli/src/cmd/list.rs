//! Implementation of the `wright list` command.

use std::path::Path;

use anyhow::{Context, Result, bail};

use wright_lib::include::derive_name;
use wright_lib::lua::loaders::load_module;
use wright_lib::lua::runtime::create_runtime;

use super::{build_file, lua_err};
use crate::output::{print_info, print_item, print_json};

pub fn cmd_list(script: &Path, json: bool) -> Result<()> {
  let path = build_file(script)?;
  let lua = create_runtime().map_err(lua_err).context("Failed to create Lua runtime")?;

  let Some(module) = load_module(&lua, &path, &derive_name(&path))
    .map_err(lua_err)
    .with_context(|| format!("Failed to evaluate {}", path.display()))?
  else {
    bail!("build file not found: {}", path.display());
  };
  let tasks = module.task_names().map_err(lua_err)?;

  if json {
    return print_json(&serde_json::json!({
      "module": module.name(),
      "path": module.path(),
      "tasks": tasks,
    }));
  }

  if tasks.is_empty() {
    print_info(&format!("No tasks in {}", path.display()));
    return Ok(());
  }

  print_info(&format!("Tasks in {}:", path.display()));
  for task in &tasks {
    print_item(task);
  }
  Ok(())
}
