//! Shared utilities.
//!
//! Environment and version helpers exposed to build files, plus test helpers.

pub mod env;
pub mod version;

#[cfg(test)]
pub mod testutil;
