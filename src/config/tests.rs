//! Tests for lock settings resolution.

use super::model::*;
use crate::error::SerializerError;
use serial_test::serial;
use std::collections::HashMap;
use std::path::PathBuf;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_default_settings() {
    let settings = LockSettings::resolve_with(LockOverrides::default(), env_of(&[])).unwrap();

    assert_eq!(settings.filename, "serializer.lck");
    assert_eq!(settings.directory, default_lock_dir());
    assert_eq!(settings.retry_seconds, 1);
    assert_eq!(settings.max_attempts, 0);
    assert_eq!(settings.lock_path(), default_lock_dir().join("serializer.lck"));
}

#[cfg(unix)]
#[test]
fn test_default_directory_is_shared_tmp() {
    assert_eq!(default_lock_dir(), PathBuf::from("/tmp"));
    assert_eq!(LockSettings::default().directory, PathBuf::from("/tmp"));
}

#[test]
fn test_environment_overrides_defaults() {
    let env = env_of(&[
        (ENV_FILE_NAME, "step.lck"),
        (ENV_DIR, "/var/lock/pipeline"),
        (ENV_SLEEP_SECONDS, "5"),
        (ENV_MAX_ATTEMPTS, "12"),
    ]);
    let settings = LockSettings::resolve_with(LockOverrides::default(), env).unwrap();

    assert_eq!(settings.filename, "step.lck");
    assert_eq!(settings.directory, PathBuf::from("/var/lock/pipeline"));
    assert_eq!(settings.retry_seconds, 5);
    assert_eq!(settings.max_attempts, 12);
    assert_eq!(settings.lock_path(), PathBuf::from("/var/lock/pipeline/step.lck"));
}

#[test]
fn test_explicit_values_override_environment() {
    let env = env_of(&[
        (ENV_FILE_NAME, "env.lck"),
        (ENV_DIR, "/env/dir"),
        (ENV_SLEEP_SECONDS, "5"),
        (ENV_MAX_ATTEMPTS, "12"),
    ]);
    let overrides = LockOverrides {
        filename: Some("cli.lck".to_string()),
        directory: Some(PathBuf::from("/cli/dir")),
        retry_seconds: Some(2),
        max_attempts: Some(3),
    };
    let settings = LockSettings::resolve_with(overrides, env).unwrap();

    assert_eq!(settings.lock_path(), PathBuf::from("/cli/dir/cli.lck"));
    assert_eq!(settings.retry_seconds, 2);
    assert_eq!(settings.max_attempts, 3);
}

#[test]
fn test_explicit_zero_is_honoured() {
    let env = env_of(&[(ENV_SLEEP_SECONDS, "5"), (ENV_MAX_ATTEMPTS, "12")]);
    let overrides = LockOverrides {
        retry_seconds: Some(0),
        max_attempts: Some(0),
        ..Default::default()
    };
    let settings = LockSettings::resolve_with(overrides, env).unwrap();

    assert_eq!(settings.retry_seconds, 0);
    assert_eq!(settings.max_attempts, 0);
}

#[test]
fn test_partial_overrides_mix_sources() {
    let env = env_of(&[(ENV_DIR, "/env/dir")]);
    let overrides = LockOverrides {
        max_attempts: Some(7),
        ..Default::default()
    };
    let settings = LockSettings::resolve_with(overrides, env).unwrap();

    assert_eq!(settings.filename, DEFAULT_FILE_NAME);
    assert_eq!(settings.directory, PathBuf::from("/env/dir"));
    assert_eq!(settings.retry_seconds, DEFAULT_RETRY_SECONDS);
    assert_eq!(settings.max_attempts, 7);
}

#[test]
fn test_empty_environment_values_are_ignored() {
    let env = env_of(&[(ENV_FILE_NAME, ""), (ENV_SLEEP_SECONDS, "  ")]);
    let settings = LockSettings::resolve_with(LockOverrides::default(), env).unwrap();

    assert_eq!(settings.filename, DEFAULT_FILE_NAME);
    assert_eq!(settings.retry_seconds, DEFAULT_RETRY_SECONDS);
}

#[test]
fn test_non_numeric_environment_value_is_rejected() {
    let env = env_of(&[(ENV_MAX_ATTEMPTS, "lots")]);
    let err = LockSettings::resolve_with(LockOverrides::default(), env).unwrap_err();

    assert!(matches!(err, SerializerError::UserError(_)));
    assert!(err.to_string().contains(ENV_MAX_ATTEMPTS));
}

#[test]
fn test_negative_environment_value_is_rejected() {
    let env = env_of(&[(ENV_SLEEP_SECONDS, "-1")]);
    let err = LockSettings::resolve_with(LockOverrides::default(), env).unwrap_err();

    assert!(err.to_string().contains(ENV_SLEEP_SECONDS));
}

#[test]
fn test_filename_with_separator_is_rejected() {
    let overrides = LockOverrides {
        filename: Some("nested/serializer.lck".to_string()),
        ..Default::default()
    };
    let err = LockSettings::resolve_with(overrides, env_of(&[])).unwrap_err();

    assert!(matches!(err, SerializerError::UserError(_)));
}

#[test]
fn test_empty_explicit_filename_is_rejected() {
    let overrides = LockOverrides {
        filename: Some(String::new()),
        ..Default::default()
    };
    assert!(LockSettings::resolve_with(overrides, env_of(&[])).is_err());
}

#[test]
fn test_retry_interval_duration() {
    let settings = LockSettings {
        retry_seconds: 3,
        ..Default::default()
    };
    assert_eq!(settings.retry_interval(), std::time::Duration::from_secs(3));
}

#[test]
#[serial]
fn test_resolve_reads_process_environment() {
    // SAFETY: std guards each env read and write with its own lock. Every test
    // that resolves settings from the real environment is `#[serial]`, so none
    // observes these values mid-test.
    unsafe {
        std::env::set_var(ENV_FILE_NAME, "from-env.lck");
        std::env::set_var(ENV_MAX_ATTEMPTS, "9");
    }

    let result = LockSettings::resolve(LockOverrides::default());

    unsafe {
        std::env::remove_var(ENV_FILE_NAME);
        std::env::remove_var(ENV_MAX_ATTEMPTS);
    }

    let settings = result.unwrap();
    assert_eq!(settings.filename, "from-env.lck");
    assert_eq!(settings.max_attempts, 9);
}
