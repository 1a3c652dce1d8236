//! Wrappers around external build tools.
//!
//! The wrappers only assemble argument lists and read or write the
//! [`Context`](crate::context::Context); every tool runs as a blocking child
//! process with inherited stdio.

pub mod docker;
pub mod go;
pub mod lua;

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;
use tracing::{debug, info};

use crate::tracker::TrackError;

#[derive(Debug, Error)]
pub enum ToolError {
  #[error("cannot start '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("'{program} {args}' failed with exit code {code:?}")]
  Failed {
    program: String,
    args: String,
    code: Option<i32>,
  },

  #[error("no Go module given and none declared in '{0}'")]
  GoModuleNotFound(PathBuf),

  #[error(transparent)]
  Track(#[from] TrackError),

  #[error("cannot remove '{path}': {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

fn command(program: &str, args: &[String], cwd: Option<&Path>) -> Command {
  let mut cmd = Command::new(program);
  cmd.args(args);
  if let Some(cwd) = cwd {
    cmd.current_dir(cwd);
  }
  debug!(program, args = ?args, cwd = ?cwd, "spawning process");
  cmd
}

fn spawn_error(program: &str) -> impl FnOnce(io::Error) -> ToolError + '_ {
  move |source| ToolError::Spawn {
    program: program.to_string(),
    source,
  }
}

/// Run to completion and return the exit code, `None` when killed by a signal.
pub fn status(program: &str, args: &[String], cwd: Option<&Path>) -> Result<Option<i32>, ToolError> {
  info!(program, args = %args.join(" "), "running");
  let status = command(program, args, cwd).status().map_err(spawn_error(program))?;
  Ok(status.code())
}

/// Run to completion, failing on a non-zero exit.
pub fn check(program: &str, args: &[String], cwd: Option<&Path>) -> Result<(), ToolError> {
  match status(program, args, cwd)? {
    Some(0) => Ok(()),
    code => Err(ToolError::Failed {
      program: program.to_string(),
      args: args.join(" "),
      code,
    }),
  }
}

/// Run to completion and capture stdout, failing on a non-zero exit.
pub fn output(program: &str, args: &[String], cwd: Option<&Path>) -> Result<String, ToolError> {
  let Output { status, stdout, stderr } = command(program, args, cwd).output().map_err(spawn_error(program))?;

  if !status.success() {
    let stderr = String::from_utf8_lossy(&stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    return Err(ToolError::Failed {
      program: program.to_string(),
      args: args.join(" "),
      code: status.code(),
    });
  }

  Ok(String::from_utf8_lossy(&stdout).into_owned())
}
