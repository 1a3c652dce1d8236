//! Implementation of the `wright run` command.
//!
//! Loads the build file as a module and calls the named task with the
//! module's own context.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use wright_lib::lua::loaders::load_file;
use wright_lib::lua::runtime::create_runtime;

use super::{build_file, lua_err};
use crate::output::{format_duration, print_success, print_warning};

pub fn cmd_run(task: &str, script: &Path) -> Result<()> {
  let path = build_file(script)?;
  let lua = create_runtime().map_err(lua_err).context("Failed to create Lua runtime")?;

  info!(task, script = %path.display(), "running task");
  let started = Instant::now();

  let outcome = load_file(&lua, &path, task)
    .map_err(lua_err)
    .with_context(|| format!("Task '{}' failed", task))?;

  match (outcome.result, outcome.module) {
    (Some(_), _) => {
      print_success(&format!("{} finished in {}", task, format_duration(started.elapsed())));
    }
    (None, Some(module)) => {
      let available = module.task_names().map_err(lua_err)?;
      print_warning(&format!(
        "no task named '{}' in {} (available: {})",
        task,
        path.display(),
        available.join(", ")
      ));
    }
    (None, None) => print_warning(&format!("nothing loaded from {}", path.display())),
  }

  Ok(())
}
