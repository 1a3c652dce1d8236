//! Lua bindings for [`Context`].
//!
//! Build files see the context as userdata:
//!
//! ```lua
//! build = wright.task(function(ctx)
//!   ctx:watch("**/*.go")
//!   ctx.target = ctx.working_dir .. "/app"
//!   if ctx:should_run() then
//!     ctx.lib.compile(ctx)
//!   end
//! end)
//! ```
//!
//! Any key that is not a field or method resolves to an included module.

use std::path::PathBuf;

use mlua::FromLua;
use mlua::prelude::*;

use super::Context;
use crate::module::Module;

impl LuaUserData for Context {
  fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
    fields.add_field_method_get("working_dir", |_, this| {
      Ok(this.working_dir().to_string_lossy().into_owned())
    });
    fields.add_field_method_get("sources", |_, this| Ok(this.sources()));
    fields.add_field_method_get("target", |_, this| {
      Ok(this.target().map(|t| t.to_string_lossy().into_owned()))
    });
    fields.add_field_method_set("target", |_, this, target: Option<String>| {
      this.set_target(target.map(PathBuf::from));
      Ok(())
    });
  }

  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_method("watch", |_, this, glob: String| {
      this.watch(glob);
      Ok(())
    });

    methods.add_method("rewatch", |_, this, glob: String| {
      this.rewatch(glob);
      Ok(())
    });

    methods.add_method("should_run", |_, this, ()| this.should_run().map_err(LuaError::external));

    methods.add_method("has", |_, this, name: String| Ok(this.has(&name)));

    methods.add_method("get", |_, this, name: String| this.module(&name).map_err(LuaError::external));

    methods.add_method("set", |_, this, (name, module): (String, Module)| {
      this.set_module(&name, module);
      Ok(())
    });

    methods.add_method("modules", |_, this, ()| Ok(this.module_names()));

    // ctx.<name> falls back to the module map
    methods.add_meta_method(mlua::MetaMethod::Index, |_, this, key: String| {
      this.module(&key).map_err(LuaError::external)
    });

    methods.add_meta_method(mlua::MetaMethod::ToString, |_, this, ()| {
      Ok(format!("Context({})", this.working_dir().display()))
    });
  }
}

impl FromLua for Context {
  fn from_lua(value: LuaValue, _: &Lua) -> LuaResult<Self> {
    match value {
      LuaValue::UserData(ud) if ud.is::<Context>() => Ok((*ud.borrow::<Context>()?).clone()),
      other => Err(LuaError::external(format!(
        "expected a build context, got {}",
        other.type_name()
      ))),
    }
  }
}
