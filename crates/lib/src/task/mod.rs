//! Task wrapping and invocation.
//!
//! Build files declare tasks as plain Lua functions and wrap them with the
//! `wright.*` combinators. Each combinator produces a [`Task`], a callable
//! userdata that adds one behavior around the callable it wraps:
//!
//! | Combinator | Behavior before calling the inner callable                 |
//! |------------|------------------------------------------------------------|
//! | `task`     | create or propagate the [`Context`], scope its working dir |
//! | `sources`  | watch a glob resolved against the working dir              |
//! | `target`   | set the target resolved against the working dir            |
//! | `depends`  | run a prerequisite with the same arguments                 |
//! | `include`  | load another build file and attach it as a module          |
//!
//! # Context discovery
//!
//! Every combinator finds the context the same way: the first positional
//! [`Context`] argument, else the `ctx` field of a trailing keyword table.
//! Only `task` may create one; the others fail with
//! [`TaskError::MissingContext`] when none is passed.

pub mod lua;

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::FromLua;
use mlua::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::consts::CONTEXT_PARAM;
use crate::context::Context;
use crate::include;
use crate::lua::loaders;

#[derive(Debug, Error)]
pub enum TaskError {
  #[error("declare a task before using {0}")]
  MissingContext(&'static str),

  #[error("module '{module}' has no task named '{task}'")]
  NoSuchTask { module: String, task: String },

  #[error("expected a function or task, got {0}")]
  NotCallable(String),

  #[error(transparent)]
  Lua(#[from] LuaError),
}

/// Keyword parameters a callable accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Params {
  /// Accepts any keyword.
  #[default]
  Open,
  Named(Vec<String>),
}

impl Params {
  /// Keep only the keywords this callable accepts. With `keep_context`,
  /// a `ctx` keyword survives even when it is not declared.
  pub fn filter(&self, lua: &Lua, kwargs: &LuaTable, keep_context: bool) -> LuaResult<LuaTable> {
    match self {
      Params::Open => Ok(kwargs.clone()),
      Params::Named(names) => {
        let filtered = lua.create_table()?;
        let context = keep_context.then_some(CONTEXT_PARAM);
        for name in names.iter().map(String::as_str).chain(context) {
          let value: LuaValue = kwargs.raw_get(name)?;
          if !value.is_nil() {
            filtered.raw_set(name, value)?;
          }
        }
        Ok(filtered)
      }
    }
  }
}

/// Where a task was declared.
#[derive(Debug, Clone)]
pub struct Origin {
  pub dir: PathBuf,
  pub file: Option<PathBuf>,
}

impl Origin {
  /// The build file currently being evaluated, else the process cwd.
  pub fn current(lua: &Lua) -> LuaResult<Self> {
    if let Some(file) = loaders::current_file(lua)? {
      let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
      return Ok(Origin { dir, file: Some(file) });
    }

    if let Some(dir) = loaders::current_dir(lua)? {
      return Ok(Origin { dir, file: None });
    }

    let dir = std::env::current_dir().map_err(LuaError::external)?;
    Ok(Origin { dir, file: None })
  }

  /// A fresh context rooted at this origin.
  pub fn new_context(&self) -> Context {
    match &self.file {
      Some(file) => Context::for_build_file(self.dir.clone(), file),
      None => Context::new(self.dir.clone()),
    }
  }
}

/// A Lua function or a wrapped task.
#[derive(Clone)]
pub enum Callable {
  Function(LuaFunction),
  Task(Task),
}

impl Callable {
  /// Returns `None` for values that cannot be called as a task.
  pub fn from_value(value: &LuaValue) -> LuaResult<Option<Self>> {
    match value {
      LuaValue::Function(f) => Ok(Some(Callable::Function(f.clone()))),
      LuaValue::UserData(ud) if ud.is::<Task>() => Ok(Some(Callable::Task((*ud.borrow::<Task>()?).clone()))),
      _ => Ok(None),
    }
  }

  pub fn call(&self, lua: &Lua, args: LuaMultiValue) -> LuaResult<LuaMultiValue> {
    match self {
      Callable::Function(f) => f.call(args),
      Callable::Task(task) => task.invoke(lua, args),
    }
  }

  pub fn params(&self) -> Params {
    match self {
      Callable::Function(_) => Params::Open,
      Callable::Task(task) => task.params().clone(),
    }
  }

  /// Whether a context should be supplied when the caller passes none.
  pub fn accepts_context(&self) -> bool {
    match self {
      Callable::Function(_) => false,
      Callable::Task(task) => task.accepts_context(),
    }
  }
}

impl FromLua for Callable {
  fn from_lua(value: LuaValue, _: &Lua) -> LuaResult<Self> {
    Callable::from_value(&value)?
      .ok_or_else(|| LuaError::external(TaskError::NotCallable(value.type_name().to_string())))
  }
}

enum TaskKind {
  Entry {
    origin: Origin,
    wants_context: bool,
    body: Callable,
  },
  Sources {
    glob: String,
    inner: Callable,
  },
  Target {
    name: String,
    inner: Callable,
  },
  Depends {
    prerequisite: Callable,
    inner: Callable,
  },
  Include {
    path: String,
    name: Option<String>,
    inner: Callable,
  },
}

impl TaskKind {
  fn label(&self) -> &'static str {
    match self {
      TaskKind::Entry { .. } => "task",
      TaskKind::Sources { .. } => "sources",
      TaskKind::Target { .. } => "target",
      TaskKind::Depends { .. } => "depends",
      TaskKind::Include { .. } => "include",
    }
  }
}

struct TaskDef {
  kind: TaskKind,
  params: Params,
}

/// A wrapped, callable build task.
#[derive(Clone)]
pub struct Task(Rc<TaskDef>);

impl Task {
  fn wrap(kind: TaskKind, params: Params) -> Self {
    Task(Rc::new(TaskDef { kind, params }))
  }

  /// Wrap `body` as a root task declared at `origin`.
  ///
  /// With `wants_context` false the task passes its arguments through
  /// untouched. `params` overrides the keyword parameters inherited from
  /// `body`.
  pub fn entry(origin: Origin, body: Callable, wants_context: bool, params: Option<Vec<String>>) -> Self {
    let params = params.map(Params::Named).unwrap_or_else(|| body.params());
    Self::wrap(
      TaskKind::Entry {
        origin,
        wants_context,
        body,
      },
      params,
    )
  }

  pub fn sources(glob: impl Into<String>, inner: Callable) -> Self {
    let params = inner.params();
    Self::wrap(
      TaskKind::Sources {
        glob: glob.into(),
        inner,
      },
      params,
    )
  }

  pub fn target(name: impl Into<String>, inner: Callable) -> Self {
    let params = inner.params();
    Self::wrap(
      TaskKind::Target {
        name: name.into(),
        inner,
      },
      params,
    )
  }

  pub fn depends(prerequisite: Callable, inner: Callable) -> Self {
    let params = inner.params();
    Self::wrap(TaskKind::Depends { prerequisite, inner }, params)
  }

  pub fn include(path: impl Into<String>, name: Option<String>, inner: Callable) -> Self {
    let params = inner.params();
    Self::wrap(
      TaskKind::Include {
        path: path.into(),
        name,
        inner,
      },
      params,
    )
  }

  pub fn params(&self) -> &Params {
    &self.0.params
  }

  pub fn accepts_context(&self) -> bool {
    !matches!(
      self.0.kind,
      TaskKind::Entry {
        wants_context: false,
        ..
      }
    )
  }

  pub fn invoke(&self, lua: &Lua, args: LuaMultiValue) -> LuaResult<LuaMultiValue> {
    match &self.0.kind {
      TaskKind::Entry {
        origin,
        wants_context,
        body,
      } => {
        if !wants_context {
          return body.call(lua, args);
        }

        match discover_context(&args)? {
          Some(ctx) => {
            let _guard = ctx.push_working_dir(origin.dir.clone());
            body.call(lua, args)
          }
          None => {
            debug!(dir = %origin.dir.display(), "creating build context");
            let args = prepend(lua, origin.new_context(), args)?;
            body.call(lua, args)
          }
        }
      }

      TaskKind::Sources { glob, inner } => {
        let ctx = require_context(&args, "sources")?;
        ctx.watch(ctx.resolve(glob).to_string_lossy());
        inner.call(lua, args)
      }

      TaskKind::Target { name, inner } => {
        let ctx = require_context(&args, "target")?;
        ctx.set_target(Some(ctx.resolve(name)));
        inner.call(lua, args)
      }

      TaskKind::Depends { prerequisite, inner } => {
        require_context(&args, "depends")?;
        let prerequisite_args = filter_kwargs(lua, &args, prerequisite)?;
        prerequisite.call(lua, prerequisite_args)?;
        inner.call(lua, args)
      }

      TaskKind::Include { path, name, inner } => {
        let ctx = require_context(&args, "include")?;
        include::include(lua, &ctx, path, name.as_deref())?;
        inner.call(lua, args)
      }
    }
  }
}

impl fmt::Debug for Task {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Task")
      .field("kind", &self.0.kind.label())
      .field("params", &self.0.params)
      .finish()
  }
}

/// Find the context among call arguments.
pub fn discover_context(args: &LuaMultiValue) -> LuaResult<Option<Context>> {
  for value in args.iter() {
    if let LuaValue::UserData(ud) = value
      && ud.is::<Context>()
    {
      return Ok(Some((*ud.borrow::<Context>()?).clone()));
    }
  }

  if let Some(kwargs) = kwargs(args)
    && let LuaValue::UserData(ud) = kwargs.raw_get::<LuaValue>(CONTEXT_PARAM)?
    && ud.is::<Context>()
  {
    return Ok(Some((*ud.borrow::<Context>()?).clone()));
  }

  Ok(None)
}

/// Pass `ctx` as the first argument.
pub fn prepend(lua: &Lua, ctx: Context, args: LuaMultiValue) -> LuaResult<LuaMultiValue> {
  let ctx = LuaValue::UserData(lua.create_userdata(ctx)?);
  Ok(std::iter::once(ctx).chain(args).collect())
}

fn require_context(args: &LuaMultiValue, combinator: &'static str) -> LuaResult<Context> {
  discover_context(args)?.ok_or_else(|| LuaError::external(TaskError::MissingContext(combinator)))
}

/// The trailing keyword table, if any.
fn kwargs(args: &LuaMultiValue) -> Option<&LuaTable> {
  match args.iter().last() {
    Some(LuaValue::Table(table)) => Some(table),
    _ => None,
  }
}

fn filter_kwargs(lua: &Lua, args: &LuaMultiValue, callee: &Callable) -> LuaResult<LuaMultiValue> {
  let Some(table) = kwargs(args) else {
    return Ok(args.clone());
  };

  let filtered = LuaValue::Table(callee.params().filter(lua, table, callee.accepts_context())?);
  let positional = args.len() - 1;
  Ok(args.iter().take(positional).cloned().chain(std::iter::once(filtered)).collect())
}
