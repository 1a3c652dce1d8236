//! Lua runtime and build file loading.
//!
//! # Submodules
//!
//! - [`globals`] - The `wright` global table
//! - [`helpers`] - Helper tables exposed under `wright`
//! - [`loaders`] - Shared and isolated build file loading, `__dir` injection
//! - [`runtime`] - Lua VM setup

pub mod globals;
pub mod helpers;
pub mod loaders;
pub mod runtime;
