//! wright-lib: build orchestration for Lua build files.
//!
//! Build files declare tasks as plain Lua functions and wrap them with
//! combinators that attach build metadata:
//! - `Context`: per-build-tree state (working dir, watched sources, target, modules)
//! - `Task`: a wrapped callable that creates or propagates the context
//! - `Module`: another build file loaded in isolation and attached by name
//! - `tracker`: timestamp-based staleness of a target against source globs

pub mod consts;
pub mod context;
pub mod include;
pub mod lua;
pub mod module;
pub mod task;
pub mod tools;
pub mod tracker;
pub mod util;
