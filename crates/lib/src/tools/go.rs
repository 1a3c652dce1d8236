//! Go applications.
//!
//! A [`GoApp`] ties a Go module to a [`Context`]: it watches every `.go` file
//! under the working directory and, unless the context already has one,
//! targets a binary named after the module.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{ToolError, check, status};
use crate::context::Context;
use crate::tracker::TrackError;

pub const GO_MOD: &str = "go.mod";
pub const GO_SOURCES: &str = "**/*.go";

/// Module path declared by a `go.mod` file, `None` when the file is missing
/// or declares none.
pub fn read_module_name(go_mod: &Path) -> Option<String> {
  let content = fs::read_to_string(go_mod).ok()?;
  content
    .lines()
    .map(str::trim)
    .filter(|line| line.starts_with("module"))
    .find_map(|line| line.split_whitespace().nth(1).map(str::to_string))
}

/// Binary name for a module: its last path segment.
pub fn target_name(module: &str) -> &str {
  module.rsplit('/').next().unwrap_or(module)
}

pub struct GoApp {
  ctx: Context,
  module: String,
  vars: Vec<(String, String)>,
  ldflags: Vec<String>,
}

impl GoApp {
  pub fn new(ctx: Context, module: Option<String>) -> Result<Self, ToolError> {
    let go_mod = ctx.working_dir().join(GO_MOD);
    let module = match module {
      Some(module) => module,
      None => read_module_name(&go_mod).ok_or(ToolError::GoModuleNotFound(go_mod))?,
    };

    ctx.watch(ctx.resolve(GO_SOURCES).to_string_lossy());
    if ctx.target().is_none() {
      ctx.set_target(Some(ctx.resolve(target_name(&module))));
    }

    debug!(module = %module, target = ?ctx.target(), "go app");
    Ok(GoApp {
      ctx,
      module,
      vars: Vec::new(),
      ldflags: Vec::new(),
    })
  }

  pub fn module(&self) -> &str {
    &self.module
  }

  pub fn context(&self) -> &Context {
    &self.ctx
  }

  pub fn sources(&self, glob: &str) {
    self.ctx.watch(self.ctx.resolve(glob).to_string_lossy());
  }

  pub fn target(&self) -> Option<PathBuf> {
    self.ctx.target()
  }

  pub fn set_target(&self, target: &str) {
    self.ctx.set_target(Some(self.ctx.resolve(target)));
  }

  /// Embed `value` into the variable `name` with `-ldflags -X`.
  pub fn var(&mut self, name: impl Into<String>, value: impl Into<String>) {
    let name = name.into();
    self.vars.retain(|(existing, _)| *existing != name);
    self.vars.push((name, value.into()));
  }

  /// Strip debug information from the binary.
  pub fn release(&mut self, production: bool) {
    if production && !self.ldflags.iter().any(|flag| flag == "-s") {
      self.ldflags.extend(["-w".to_string(), "-s".to_string()]);
    }
  }

  pub fn changed(&self) -> Result<bool, TrackError> {
    self.ctx.should_run()
  }

  /// Arguments for `go build`.
  pub fn build_args(&self) -> Vec<String> {
    let mut ldflags = self.ldflags.clone();
    for (name, value) in &self.vars {
      ldflags.push("-X".to_string());
      ldflags.push(format!("'{}/{}={}'", self.module, name, value));
    }

    let mut args = vec!["build".to_string()];
    if !ldflags.is_empty() {
      args.push("-ldflags".to_string());
      args.push(ldflags.join(" "));
    }
    if let Some(target) = self.ctx.target() {
      args.push("-o".to_string());
      args.push(target.to_string_lossy().into_owned());
    }
    args
  }

  /// Run `go build` when any watched file is newer than the target.
  /// Returns whether a build ran.
  pub fn compile(&self) -> Result<bool, ToolError> {
    if !self.changed()? {
      info!(module = %self.module, "up to date");
      return Ok(false);
    }

    check("go", &self.build_args(), Some(&self.ctx.working_dir()))?;
    Ok(true)
  }

  pub fn test(&self) -> Result<(), ToolError> {
    check("go", &["test".to_string(), "./...".to_string()], Some(&self.ctx.working_dir()))
  }

  /// Run the built binary, returning its exit code.
  pub fn run(&self, args: &[String]) -> Result<Option<i32>, ToolError> {
    let target = self.target_or_default();
    let dir = self.ctx.working_dir();
    info!(dir = %dir.display(), "running {}", target.display());
    status(&target.to_string_lossy(), args, Some(&dir))
  }

  /// Delete the binary. A missing binary is not an error.
  pub fn rm(&self) -> Result<(), ToolError> {
    let target = self.target_or_default();
    match fs::remove_file(&target) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(ToolError::Remove { path: target, source }),
    }
  }

  fn target_or_default(&self) -> PathBuf {
    self
      .ctx
      .target()
      .unwrap_or_else(|| self.ctx.resolve(target_name(&self.module)))
  }
}
