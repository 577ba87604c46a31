//! Process-wide metric name prefix.
//!
//! The prefix is set at most once, before any collector is built. The first
//! read fixes it as well, so a collector built with the empty default can
//! never coexist with one built under a later prefix.

use std::sync::OnceLock;

use crate::error::{ConfigError, ConfigResult};

static DEFAULT_PREFIX: OnceLock<String> = OnceLock::new();

/// Set the process-wide prefix. Fails if a prefix was already set or read.
pub fn set_default_prefix(prefix: &str) -> ConfigResult<()> {
    validate_prefix(prefix)?;
    DEFAULT_PREFIX
        .set(prefix.to_string())
        .map_err(|_| ConfigError::PrefixAlreadySet(default_prefix().to_string()))
}

/// The process-wide prefix, or `""` when none was set.
///
/// Reading an unset prefix locks in `""`.
pub fn default_prefix() -> &'static str {
    DEFAULT_PREFIX.get_or_init(String::new)
}

/// Check that `prefix` can start a Prometheus metric name.
///
/// The empty prefix is valid.
pub fn validate_prefix(prefix: &str) -> ConfigResult<()> {
    let mut chars = prefix.chars();
    let valid = match chars.next() {
        None => true,
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == ':')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidPrefix(prefix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_prefixes() {
        assert!(validate_prefix("").is_ok());
        assert!(validate_prefix("app_").is_ok());
        assert!(validate_prefix("_x:y9").is_ok());
    }

    #[test]
    fn rejects_invalid_prefixes() {
        assert!(matches!(
            validate_prefix("9lives"),
            Err(ConfigError::InvalidPrefix(_))
        ));
        assert!(validate_prefix("my-app").is_err());
        assert!(validate_prefix("with space").is_err());
    }
}
