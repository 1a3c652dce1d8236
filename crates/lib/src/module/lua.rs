//! Lua bindings for [`Module`].
//!
//! Fields `name`, `path`, `dir` and `ctx` describe the module; any other key
//! resolves to an export. Exported tasks come back bound to the module so
//! `ctx.lib.build()` runs with the module's own context.

use mlua::FromLua;
use mlua::prelude::*;

use super::Module;
use crate::task::{Callable, TaskError};

impl LuaUserData for Module {
  fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
    fields.add_field_method_get("name", |_, this| Ok(this.name().to_string()));
    fields.add_field_method_get("path", |_, this| Ok(this.path().to_string_lossy().into_owned()));
    fields.add_field_method_get("dir", |_, this| Ok(this.dir().to_string_lossy().into_owned()));
    fields.add_field_method_get("ctx", |_, this| Ok(this.context().clone()));
  }

  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_method("tasks", |_, this, ()| this.task_names());

    methods.add_meta_method(mlua::MetaMethod::Index, |lua, this, key: String| {
      let value: LuaValue = this.exports().raw_get(key.as_str())?;

      if Callable::from_value(&value)?.is_some() {
        let module = this.clone();
        let bound = lua.create_function(move |lua, args: LuaMultiValue| module.call(lua, &key, args))?;
        return Ok(LuaValue::Function(bound));
      }

      match value {
        LuaValue::Nil => Err(LuaError::external(TaskError::NoSuchTask {
          module: this.name().to_string(),
          task: key,
        })),
        other => Ok(other),
      }
    });

    methods.add_meta_method(mlua::MetaMethod::ToString, |_, this, ()| {
      Ok(format!("Module({}, {})", this.name(), this.path().display()))
    });
  }
}

impl FromLua for Module {
  fn from_lua(value: LuaValue, _: &Lua) -> LuaResult<Self> {
    match value {
      LuaValue::UserData(ud) if ud.is::<Module>() => Ok((*ud.borrow::<Module>()?).clone()),
      other => Err(LuaError::external(format!(
        "expected a module, got {}",
        other.type_name()
      ))),
    }
  }
}
