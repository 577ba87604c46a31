//! The process-wide prefix is global, so it gets its own test binary.

use procstat_core::{ConfigError, default_prefix, set_default_prefix};

#[test]
fn prefix_is_set_once() {
    assert!(matches!(
        set_default_prefix("bad prefix"),
        Err(ConfigError::InvalidPrefix(_))
    ));

    set_default_prefix("app_").unwrap();
    assert_eq!(default_prefix(), "app_");

    let err = set_default_prefix("other_").unwrap_err();
    assert!(matches!(err, ConfigError::PrefixAlreadySet(ref p) if p == "app_"));
    assert_eq!(default_prefix(), "app_");
}
