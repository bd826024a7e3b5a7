use std::env;
use std::str::FromStr;

use tracing::warn;

/// Retrieves an environment variable, treating an empty value as unset.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Retrieves the first of several environment variables that is set.
pub fn get_first_env_var(vars: &[&str]) -> Option<String> {
    vars.iter().find_map(|var| get_env_var(var))
}

/// Retrieves an environment variable and parses it, falling back to `default`
/// when the variable is unset or cannot be parsed.
///
/// # Arguments
/// - `var`: The name of the environment variable.
/// - `default`: The value to use when the variable is missing or invalid.
pub fn get_env_var_or<T>(var: &str, default: T) -> T
where
    T: FromStr,
{
    match get_env_var(var) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value for {}: {:?}", var, raw);
            default
        }),
        None => default,
    }
}

/// Interprets an environment variable as a boolean flag.
pub fn get_env_flag(var: &str, default: bool) -> bool {
    match get_env_var(var) {
        Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
            warn!("Ignoring invalid flag for {}: {:?}", var, raw);
            default
        }),
        None => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
