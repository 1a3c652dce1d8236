//! Loaded build files.
//!
//! A [`Module`] is one build file evaluated in its own environment. Its
//! exported tasks become callable from a parent build file through the
//! parent context's module map (`ctx.<name>.<task>(...)`).
//!
//! Every module owns a child [`Context`] rooted at the module's directory.
//! Calling one of its tasks without a context injects that child context, so
//! the module tracks its own sources and target independently of the parent.

pub mod lua;

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::prelude::*;
use tracing::debug;

use crate::context::Context;
use crate::task::{Callable, TaskError, discover_context, prepend};

struct ModuleState {
  name: String,
  path: PathBuf,
  exports: LuaTable,
  context: Context,
}

/// Shared handle to a loaded build file.
#[derive(Clone)]
pub struct Module(Rc<ModuleState>);

impl Module {
  /// Wrap the exports of the build file at `path`.
  pub fn new(name: impl Into<String>, path: PathBuf, exports: LuaTable) -> Self {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let context = Context::for_build_file(dir, &path);
    Module(Rc::new(ModuleState {
      name: name.into(),
      path,
      exports,
      context,
    }))
  }

  pub fn name(&self) -> &str {
    &self.0.name
  }

  pub fn path(&self) -> &Path {
    &self.0.path
  }

  pub fn dir(&self) -> &Path {
    self.0.path.parent().unwrap_or(Path::new(""))
  }

  /// The module's own context.
  pub fn context(&self) -> &Context {
    &self.0.context
  }

  pub fn exports(&self) -> &LuaTable {
    &self.0.exports
  }

  /// Look up an exported task.
  pub fn task(&self, name: &str) -> Result<Callable, TaskError> {
    let value: LuaValue = self.0.exports.raw_get(name)?;
    Callable::from_value(&value)?.ok_or_else(|| TaskError::NoSuchTask {
      module: self.0.name.clone(),
      task: name.to_string(),
    })
  }

  /// Names of every exported callable, sorted.
  pub fn task_names(&self) -> LuaResult<Vec<String>> {
    let mut names = Vec::new();
    for pair in self.0.exports.pairs::<LuaValue, LuaValue>() {
      let (key, value) = pair?;
      if let LuaValue::String(key) = key
        && Callable::from_value(&value)?.is_some()
      {
        names.push(key.to_str()?.to_string());
      }
    }
    names.sort();
    Ok(names)
  }

  /// Call an exported task.
  ///
  /// When the arguments carry no context and the task takes one, the
  /// module's own context is passed as the first argument.
  pub fn call(&self, lua: &Lua, task: &str, args: LuaMultiValue) -> LuaResult<LuaMultiValue> {
    let callable = self.task(task).map_err(LuaError::external)?;

    let args = if callable.accepts_context() && discover_context(&args)?.is_none() {
      debug!(module = %self.0.name, task, "calling with module context");
      prepend(lua, self.0.context.clone(), args)?
    } else {
      args
    };

    callable.call(lua, args)
  }
}

impl fmt::Debug for Module {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Module")
      .field("name", &self.0.name)
      .field("path", &self.0.path)
      .finish()
  }
}
