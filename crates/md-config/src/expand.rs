//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - a leading `~` - expands to the home directory (paths only)

use crate::ConfigError;

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok());
    if let Some(start) = expanded.find("${") {
        let name = expanded[start + 2..]
            .split(['}', ':'])
            .next()
            .unwrap_or_default();
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{name}}} not set"),
        });
    }
    Ok(expanded.into_owned())
}

/// Expand environment variables and a leading `~` in a path string.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    let expanded = expand_env(value, field)?;
    Ok(shellexpand::tilde(&expanded).into_owned())
}
