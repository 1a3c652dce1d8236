//! Docker images, containers and compose stacks.

use tracing::info;

use super::{ToolError, check, output};
use crate::context::Context;

pub const DOCKER: &str = "docker";
pub const DEFAULT_VERSION: &str = "latest";
pub const DEFAULT_PLATFORM: &str = "linux/amd64";
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

fn tag(name: &str, version: &str) -> String {
  format!("{}:{}", name, version)
}

fn set(pairs: &mut Vec<(String, String)>, key: String, value: String) {
  pairs.retain(|(existing, _)| *existing != key);
  pairs.push((key, value));
}

/// An image built with `docker buildx build`.
#[derive(Debug, Clone)]
pub struct Builder {
  pub name: String,
  pub version: String,
  pub dockerfile: String,
  pub platform: String,
  pub cache: bool,
  build_args: Vec<(String, String)>,
  contexts: Vec<(String, String)>,
}

impl Builder {
  pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
    Builder {
      name: name.into(),
      version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
      dockerfile: DEFAULT_DOCKERFILE.to_string(),
      platform: DEFAULT_PLATFORM.to_string(),
      cache: true,
      build_args: Vec::new(),
      contexts: Vec::new(),
    }
  }

  pub fn build_arg(&mut self, key: impl Into<String>, value: impl Into<String>) {
    set(&mut self.build_args, key.into(), value.into());
  }

  /// Add a named build context for files outside the project directory.
  pub fn include(&mut self, name: impl Into<String>, path: impl Into<String>) {
    set(&mut self.contexts, name.into(), path.into());
  }

  pub fn args(&self) -> Vec<String> {
    let mut args = vec![
      "buildx".to_string(),
      "build".to_string(),
      "--platform".to_string(),
      self.platform.clone(),
      "--tag".to_string(),
      tag(&self.name, &self.version),
      "--file".to_string(),
      self.dockerfile.clone(),
    ];

    for (key, value) in &self.build_args {
      args.push("--build-arg".to_string());
      args.push(format!("{}={}", key, value));
    }
    for (name, path) in &self.contexts {
      args.push("--build-context".to_string());
      args.push(format!("{}={}", name, path));
    }
    if !self.cache {
      args.push("--no-cache".to_string());
    }
    args.push(".".to_string());
    args
  }

  pub fn build(&self) -> Result<(), ToolError> {
    info!(image = %tag(&self.name, &self.version), "building image");
    check(DOCKER, &self.args(), None)
  }
}

/// A container started with `docker run` from the context's working dir.
#[derive(Debug, Clone)]
pub struct Runner {
  ctx: Context,
  pub name: String,
  pub version: String,
  pub rm: bool,
  pub follow: bool,
  ports: Vec<String>,
  env: Vec<(String, String)>,
  network: Option<String>,
}

impl Runner {
  pub fn new(ctx: Context, name: impl Into<String>) -> Self {
    Runner {
      ctx,
      name: name.into(),
      version: DEFAULT_VERSION.to_string(),
      rm: true,
      follow: false,
      ports: Vec::new(),
      env: Vec::new(),
      network: None,
    }
  }

  pub fn add_port(&mut self, external: u16, internal: u16) {
    self.ports.push(format!("{}:{}", external, internal));
  }

  pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
    set(&mut self.env, key.into(), value.into());
  }

  pub fn network(&mut self, name: Option<String>) {
    self.network = name;
  }

  pub fn args(&self) -> Vec<String> {
    let mut args = vec!["run".to_string()];
    if self.rm {
      args.push("--rm".to_string());
    }
    if !self.follow {
      args.push("-d".to_string());
    }
    for port in &self.ports {
      args.push("-p".to_string());
      args.push(port.clone());
    }
    if let Some(network) = &self.network {
      args.push("--network".to_string());
      args.push(network.clone());
    }
    for (key, value) in &self.env {
      args.push("-e".to_string());
      args.push(format!("{}={}", key, value));
    }
    args.push(tag(&self.name, &self.version));
    args
  }

  pub fn run(&self) -> Result<(), ToolError> {
    info!(image = %tag(&self.name, &self.version), "starting container");
    check(DOCKER, &self.args(), Some(&self.ctx.working_dir()))
  }
}

/// `docker compose` subcommands.
pub mod compose {
  use super::*;

  pub fn args(file: Option<&str>, command: &str, flags: &[&str]) -> Vec<String> {
    let mut args = vec!["compose".to_string()];
    if let Some(file) = file {
      args.push("-f".to_string());
      args.push(file.to_string());
    }
    args.push(command.to_string());
    args.extend(flags.iter().map(|f| f.to_string()));
    args
  }

  /// `docker compose ps` lists a header line plus one line per container.
  pub fn has_containers(ps_output: &str) -> bool {
    ps_output.lines().filter(|line| !line.trim().is_empty()).count() > 1
  }

  pub fn running(file: Option<&str>) -> Result<bool, ToolError> {
    Ok(has_containers(&output(DOCKER, &args(file, "ps", &[]), None)?))
  }

  /// Start the stack unless it is already running. Returns whether it was started.
  pub fn up(file: Option<&str>, detach: bool) -> Result<bool, ToolError> {
    if running(file)? {
      return Ok(false);
    }
    let flags: &[&str] = if detach { &["-d"] } else { &[] };
    check(DOCKER, &args(file, "up", flags), None)?;
    Ok(true)
  }

  /// Stop the stack if it is running. Returns whether it was stopped.
  pub fn down(file: Option<&str>) -> Result<bool, ToolError> {
    if !running(file)? {
      return Ok(false);
    }
    check(DOCKER, &args(file, "down", &[]), None)?;
    Ok(true)
  }

  pub fn logs(file: Option<&str>, follow: bool) -> Result<(), ToolError> {
    let flags: &[&str] = if follow { &["-f"] } else { &[] };
    check(DOCKER, &args(file, "logs", flags), None)
  }
}
