//! Environment variable parsing utilities.
//!
//! Type-safe helpers for parsing environment variables with default values,
//! eliminating repeated boilerplate patterns like:
//!
//! ```ignore
//! std::env::var("VAR_NAME")
//!     .ok()
//!     .and_then(|v| v.parse::<u64>().ok())
//!     .unwrap_or(default_value)
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
///
/// # Example
///
/// ```
/// use abi_call_types::env_utils::env_var;
///
/// let value: Option<u64> = env_var("ABI_CALL_DOC_EXAMPLE_UNSET");
/// assert!(value.is_none());
/// ```
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
///
/// Returns the default if the variable is not set or cannot be parsed.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Get a non-empty environment variable as a string.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
