//! Environment variable helpers.

/// Value `is_env` compares against when none is given.
pub const DEFAULT_ENV_VALUE: &str = "true";

/// Returns true if `var` is set and equals `value`, ignoring case.
///
/// Build files use this for switches such as `RELEASE=true wright run build`.
pub fn is_env(var: &str, value: Option<&str>) -> bool {
  let expected = value.unwrap_or(DEFAULT_ENV_VALUE);
  match std::env::var(var) {
    Ok(actual) => actual.to_lowercase() == expected.to_lowercase(),
    Err(_) => false,
  }
}
