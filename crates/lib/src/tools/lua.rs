//! Lua bindings for `wright.go` and `wright.docker`.
//!
//! Builder-style methods return the receiver so calls chain:
//!
//! ```lua
//! wright.go.app(ctx):release():var("main.version", VERSION):compile()
//! ```

use mlua::prelude::*;

use super::docker::{Builder, Runner, compose};
use super::go::GoApp;
use crate::context::Context;

impl LuaUserData for GoApp {
  fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
    fields.add_field_method_get("module", |_, this| Ok(this.module().to_string()));
    fields.add_field_method_get("ctx", |_, this| Ok(this.context().clone()));
  }

  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_function("sources", |_, (ud, glob): (LuaAnyUserData, String)| {
      ud.borrow::<GoApp>()?.sources(&glob);
      Ok(ud)
    });

    // target() reads, target(path) sets then reads
    methods.add_method("target", |_, this, target: Option<String>| {
      if let Some(target) = target {
        this.set_target(&target);
      }
      Ok(this.target().map(|t| t.to_string_lossy().into_owned()))
    });

    methods.add_function("var", |_, (ud, name, value): (LuaAnyUserData, String, String)| {
      ud.borrow_mut::<GoApp>()?.var(name, value);
      Ok(ud)
    });

    methods.add_function("release", |_, (ud, production): (LuaAnyUserData, Option<bool>)| {
      ud.borrow_mut::<GoApp>()?.release(production.unwrap_or(true));
      Ok(ud)
    });

    methods.add_method("changed", |_, this, ()| this.changed().map_err(LuaError::external));

    methods.add_function("compile", |_, ud: LuaAnyUserData| {
      ud.borrow::<GoApp>()?.compile().map_err(LuaError::external)?;
      Ok(ud)
    });

    methods.add_function("test", |_, ud: LuaAnyUserData| {
      ud.borrow::<GoApp>()?.test().map_err(LuaError::external)?;
      Ok(ud)
    });

    methods.add_method("run", |_, this, args: LuaVariadic<String>| {
      this.run(&args).map_err(LuaError::external)
    });

    methods.add_function("rm", |_, ud: LuaAnyUserData| {
      ud.borrow::<GoApp>()?.rm().map_err(LuaError::external)?;
      Ok(ud)
    });

    methods.add_method("build_args", |_, this, ()| Ok(this.build_args()));
  }
}

impl LuaUserData for Builder {
  fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
    fields.add_field_method_get("name", |_, this| Ok(this.name.clone()));
    fields.add_field_method_get("version", |_, this| Ok(this.version.clone()));
    fields.add_field_method_set("version", |_, this, v: String| {
      this.version = v;
      Ok(())
    });
    fields.add_field_method_get("dockerfile", |_, this| Ok(this.dockerfile.clone()));
    fields.add_field_method_set("dockerfile", |_, this, v: String| {
      this.dockerfile = v;
      Ok(())
    });
    fields.add_field_method_get("platform", |_, this| Ok(this.platform.clone()));
    fields.add_field_method_set("platform", |_, this, v: String| {
      this.platform = v;
      Ok(())
    });
    fields.add_field_method_get("cache", |_, this| Ok(this.cache));
    fields.add_field_method_set("cache", |_, this, v: bool| {
      this.cache = v;
      Ok(())
    });
  }

  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_function("build_arg", |_, (ud, key, value): (LuaAnyUserData, String, String)| {
      ud.borrow_mut::<Builder>()?.build_arg(key, value);
      Ok(ud)
    });

    methods.add_function("include", |_, (ud, name, path): (LuaAnyUserData, String, String)| {
      ud.borrow_mut::<Builder>()?.include(name, path);
      Ok(ud)
    });

    methods.add_method("args", |_, this, ()| Ok(this.args()));
    methods.add_method("build", |_, this, ()| this.build().map_err(LuaError::external));
  }
}

impl LuaUserData for Runner {
  fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
    fields.add_field_method_get("name", |_, this| Ok(this.name.clone()));
    fields.add_field_method_get("version", |_, this| Ok(this.version.clone()));
    fields.add_field_method_set("version", |_, this, v: String| {
      this.version = v;
      Ok(())
    });
    fields.add_field_method_get("rm", |_, this| Ok(this.rm));
    fields.add_field_method_set("rm", |_, this, v: bool| {
      this.rm = v;
      Ok(())
    });
    fields.add_field_method_get("follow", |_, this| Ok(this.follow));
    fields.add_field_method_set("follow", |_, this, v: bool| {
      this.follow = v;
      Ok(())
    });
  }

  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_function(
      "add_port",
      |_, (ud, external, internal): (LuaAnyUserData, u16, u16)| {
        ud.borrow_mut::<Runner>()?.add_port(external, internal);
        Ok(ud)
      },
    );

    methods.add_function("set_env", |_, (ud, key, value): (LuaAnyUserData, String, String)| {
      ud.borrow_mut::<Runner>()?.set_env(key, value);
      Ok(ud)
    });

    methods.add_function("network", |_, (ud, name): (LuaAnyUserData, Option<String>)| {
      ud.borrow_mut::<Runner>()?.network(name);
      Ok(ud)
    });

    methods.add_method("args", |_, this, ()| Ok(this.args()));
    methods.add_method("run", |_, this, ()| this.run().map_err(LuaError::external));
  }
}

fn create_go_table(lua: &Lua) -> LuaResult<LuaTable> {
  let go = lua.create_table()?;
  go.set(
    "app",
    lua.create_function(|_, (ctx, module): (Context, Option<String>)| {
      GoApp::new(ctx, module).map_err(LuaError::external)
    })?,
  )?;
  Ok(go)
}

fn create_compose_table(lua: &Lua) -> LuaResult<LuaTable> {
  let table = lua.create_table()?;
  table.set(
    "up",
    lua.create_function(|_, (file, detach): (Option<String>, Option<bool>)| {
      compose::up(file.as_deref(), detach.unwrap_or(true)).map_err(LuaError::external)
    })?,
  )?;
  table.set(
    "down",
    lua.create_function(|_, file: Option<String>| compose::down(file.as_deref()).map_err(LuaError::external))?,
  )?;
  table.set(
    "logs",
    lua.create_function(|_, (file, follow): (Option<String>, Option<bool>)| {
      compose::logs(file.as_deref(), follow.unwrap_or(false)).map_err(LuaError::external)
    })?,
  )?;
  table.set(
    "running",
    lua.create_function(|_, file: Option<String>| compose::running(file.as_deref()).map_err(LuaError::external))?,
  )?;
  Ok(table)
}

fn create_docker_table(lua: &Lua) -> LuaResult<LuaTable> {
  let docker = lua.create_table()?;

  docker.set(
    "build",
    lua.create_function(|_, (name, version): (String, Option<String>)| Ok(Builder::new(name, version)))?,
  )?;

  docker.set(
    "run",
    lua.create_function(|_, (ctx, name, opts): (Context, String, Option<LuaTable>)| {
      let mut runner = Runner::new(ctx, name);
      if let Some(opts) = opts {
        if let Some(version) = opts.get::<Option<String>>("version")? {
          runner.version = version;
        }
        if let Some(rm) = opts.get::<Option<bool>>("rm")? {
          runner.rm = rm;
        }
        if let Some(follow) = opts.get::<Option<bool>>("follow")? {
          runner.follow = follow;
        }
      }
      Ok(runner)
    })?,
  )?;

  docker.set("compose", create_compose_table(lua)?)?;
  Ok(docker)
}

/// Register `wright.go` and `wright.docker`.
pub fn register_tools(lua: &Lua, wright: &LuaTable) -> LuaResult<()> {
  wright.set("go", create_go_table(lua)?)?;
  wright.set("docker", create_docker_table(lua)?)?;
  Ok(())
}
