//! The per-build-tree context.
//!
//! A [`Context`] is created once per root task invocation and shared by
//! reference with every nested task in that call chain. It carries:
//! - the working directory relative paths are anchored to
//! - the watched source globs and the build target used for staleness checks
//! - the modules included from other build files
//!
//! # Working directory scope
//!
//! Nested tasks temporarily move the working directory to the directory they
//! were declared in via [`Context::push_working_dir`]. The returned
//! [`WorkingDirGuard`] restores the previous value when dropped, so the
//! restore happens on every exit path including errors.

pub mod lua;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::BUILD_FILE;
use crate::module::Module;
use crate::tracker::{self, TrackError};

#[derive(Debug, Error)]
pub enum ContextError {
  #[error("context has no module or attribute named '{0}'")]
  NoSuchModule(String),
}

struct ContextState {
  working_dir: PathBuf,
  sources: Vec<String>,
  target: Option<PathBuf>,
  modules: BTreeMap<String, Module>,
}

/// Shared handle to a build context. Cloning shares the same state.
#[derive(Clone)]
pub struct Context(Rc<RefCell<ContextState>>);

impl Context {
  /// Create a context rooted at `working_dir`, watching the conventional
  /// build file relative to the process cwd.
  pub fn new(working_dir: impl Into<PathBuf>) -> Self {
    Self::with_sources(working_dir.into(), vec![BUILD_FILE.to_string()])
  }

  /// Create a context for a known build file, watching that file.
  pub fn for_build_file(working_dir: impl Into<PathBuf>, build_file: &Path) -> Self {
    Self::with_sources(working_dir.into(), vec![build_file.to_string_lossy().into_owned()])
  }

  fn with_sources(working_dir: PathBuf, sources: Vec<String>) -> Self {
    Context(Rc::new(RefCell::new(ContextState {
      working_dir,
      sources,
      target: None,
      modules: BTreeMap::new(),
    })))
  }

  pub fn working_dir(&self) -> PathBuf {
    self.0.borrow().working_dir.clone()
  }

  pub fn sources(&self) -> Vec<String> {
    self.0.borrow().sources.clone()
  }

  pub fn target(&self) -> Option<PathBuf> {
    self.0.borrow().target.clone()
  }

  /// Set the target as given, without resolving it.
  pub fn set_target(&self, target: Option<PathBuf>) {
    self.0.borrow_mut().target = target;
  }

  /// Resolve `path` against the current working directory unless absolute.
  pub fn resolve(&self, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
      p.to_path_buf()
    } else {
      self.0.borrow().working_dir.join(p)
    }
  }

  /// Append a glob to watch for changes.
  pub fn watch(&self, glob: impl Into<String>) {
    let glob = glob.into();
    debug!(glob = %glob, "watching");
    self.0.borrow_mut().sources.push(glob);
  }

  /// Replace every watched glob, including the defaults, with `glob`.
  pub fn rewatch(&self, glob: impl Into<String>) {
    self.0.borrow_mut().sources = vec![glob.into()];
  }

  /// Returns true when the target is unset, missing, or older than any
  /// watched file.
  pub fn should_run(&self) -> Result<bool, TrackError> {
    let (sources, target) = {
      let state = self.0.borrow();
      (state.sources.clone(), state.target.clone())
    };

    match target {
      Some(target) => tracker::is_stale(&sources, &target),
      None => Ok(true),
    }
  }

  pub fn has(&self, name: &str) -> bool {
    self.0.borrow().modules.contains_key(name)
  }

  /// Look up an included module by name.
  pub fn module(&self, name: &str) -> Result<Module, ContextError> {
    self
      .0
      .borrow()
      .modules
      .get(name)
      .cloned()
      .ok_or_else(|| ContextError::NoSuchModule(name.to_string()))
  }

  /// Attach a module under `name`, returning the module it replaced.
  ///
  /// Replacing an existing module is allowed (last write wins) but logged
  /// as a warning.
  pub fn set_module(&self, name: &str, module: Module) -> Option<Module> {
    let previous = self.0.borrow_mut().modules.insert(name.to_string(), module);
    if let Some(previous) = &previous {
      warn!(
        module = name,
        previous = %previous.path().display(),
        "overwriting previously included module"
      );
    }
    previous
  }

  pub fn module_names(&self) -> Vec<String> {
    self.0.borrow().modules.keys().cloned().collect()
  }

  /// Move the working directory to `dir` until the returned guard is dropped.
  pub fn push_working_dir(&self, dir: PathBuf) -> WorkingDirGuard {
    let previous = std::mem::replace(&mut self.0.borrow_mut().working_dir, dir);
    WorkingDirGuard {
      context: self.clone(),
      previous: Some(previous),
    }
  }

  /// Whether both handles share the same state.
  pub fn ptr_eq(&self, other: &Context) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl fmt::Debug for Context {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.0.borrow();
    f.debug_struct("Context")
      .field("working_dir", &state.working_dir)
      .field("sources", &state.sources)
      .field("target", &state.target)
      .field("modules", &state.modules.keys().collect::<Vec<_>>())
      .finish()
  }
}

/// Restores a context's previous working directory when dropped.
#[must_use = "the working directory is restored as soon as the guard is dropped"]
pub struct WorkingDirGuard {
  context: Context,
  previous: Option<PathBuf>,
}

impl Drop for WorkingDirGuard {
  fn drop(&mut self) {
    if let Some(previous) = self.previous.take() {
      self.context.0.borrow_mut().working_dir = previous;
    }
  }
}
