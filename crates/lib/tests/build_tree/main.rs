//! End-to-end tests over multi-directory build trees.

mod common;
mod tree_tests;
