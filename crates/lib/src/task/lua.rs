//! Lua bindings for tasks and the `wright.*` combinators.
//!
//! ```lua
//! local wright = require("wright")
//!
//! generate = wright.task(function(ctx) end)
//!
//! build = wright.task(
//!   wright.depends(generate,
//!     wright.sources("**/*.go",
//!       wright.target("app", function(ctx)
//!         if ctx:should_run() then
//!           -- compile
//!         end
//!       end))))
//! ```

use mlua::prelude::*;

use super::{Callable, Origin, Task};

/// Options accepted by `wright.task(fn, opts)`.
struct TaskOpts {
  context: bool,
  params: Option<Vec<String>>,
}

impl TaskOpts {
  fn from_table(opts: Option<LuaTable>) -> LuaResult<Self> {
    let Some(opts) = opts else {
      return Ok(TaskOpts {
        context: true,
        params: None,
      });
    };

    Ok(TaskOpts {
      context: opts.get::<Option<bool>>("context")?.unwrap_or(true),
      params: opts.get("params")?,
    })
  }
}

impl LuaUserData for Task {
  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    // Clone out of the userdata so nested calls do not hold a borrow.
    methods.add_meta_function(
      mlua::MetaMethod::Call,
      |lua, (ud, args): (LuaAnyUserData, LuaMultiValue)| {
        let task = (*ud.borrow::<Task>()?).clone();
        task.invoke(lua, args)
      },
    );

    methods.add_meta_method(mlua::MetaMethod::ToString, |_, this, ()| {
      Ok(format!("Task({})", this.0.kind.label()))
    });
  }
}

/// Register the task combinators on the `wright` table.
pub fn register_combinators(lua: &Lua, wright: &LuaTable) -> LuaResult<()> {
  wright.set(
    "task",
    lua.create_function(|lua, (body, opts): (Callable, Option<LuaTable>)| {
      let opts = TaskOpts::from_table(opts)?;
      let origin = Origin::current(lua)?;
      Ok(Task::entry(origin, body, opts.context, opts.params))
    })?,
  )?;

  wright.set(
    "sources",
    lua.create_function(|_, (glob, inner): (String, Callable)| Ok(Task::sources(glob, inner)))?,
  )?;

  wright.set(
    "target",
    lua.create_function(|_, (name, inner): (String, Callable)| Ok(Task::target(name, inner)))?,
  )?;

  wright.set(
    "depends",
    lua.create_function(|_, (prerequisite, inner): (Callable, Callable)| {
      Ok(Task::depends(prerequisite, inner))
    })?,
  )?;

  // include(path, fn) or include(path, name, fn)
  wright.set(
    "include",
    lua.create_function(
      |lua, (path, second, third): (String, LuaValue, Option<LuaValue>)| match third {
        Some(inner) => {
          let name = String::from_lua(second, lua)?;
          Ok(Task::include(path, Some(name), Callable::from_lua(inner, lua)?))
        }
        None => Ok(Task::include(path, None, Callable::from_lua(second, lua)?)),
      },
    )?,
  )?;

  Ok(())
}
