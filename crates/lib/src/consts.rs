//! Constants shared across the crate.

/// Conventional build file name, used for directory includes and as the
/// default watched source.
pub const BUILD_FILE: &str = "BUILD.lua";

/// Name of the global table exposed to build files.
pub const GLOBAL_TABLE: &str = "wright";

/// Keyword-table field searched when discovering a context.
pub const CONTEXT_PARAM: &str = "ctx";
