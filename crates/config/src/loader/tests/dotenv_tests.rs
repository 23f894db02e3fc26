//! Tests for dotenv loading behavior.
//!
//! Responsibilities:
//! - Test that missing `.env` files are silently ignored.
//! - Test that invalid `.env` files return errors without leaking secrets.
//! - Test that `DOTENV_DISABLED=1`/`true` skips dotenv loading.
//!
//! Invariants / Assumptions:
//! - `.env` is read from the builder's project root, so no test changes the
//!   working directory.
//! - Variables a `.env` file sets are unset again by `temp_env`.
//! - Error messages must never contain secret values from `.env` files.

use serial_test::serial;
use tempfile::TempDir;

use super::write_file;
use crate::constants::DOTENV_DISABLED_VAR;
use crate::loader::{ConfigBuilder, ConfigError};

fn load_dotenv_from(temp_dir: &TempDir) -> Result<ConfigBuilder, ConfigError> {
    ConfigBuilder::new().with_root(temp_dir.path()).load_dotenv()
}

#[test]
#[serial]
fn test_missing_dotenv_is_ok() {
    let temp_dir = TempDir::new().unwrap();

    temp_env::with_var_unset(DOTENV_DISABLED_VAR, || {
        let result = load_dotenv_from(&temp_dir);
        assert!(
            result.is_ok(),
            "Missing .env file should be silently ignored"
        );
    });
}

#[test]
#[serial]
fn test_valid_dotenv_sets_variables() {
    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        ".env",
        "DOTENV_TEST_DATABASE_HOST=db.internal\nDOTENV_TEST_TOKEN=test-token\n",
    );

    temp_env::with_vars_unset(
        [
            DOTENV_DISABLED_VAR,
            "DOTENV_TEST_DATABASE_HOST",
            "DOTENV_TEST_TOKEN",
        ],
        || {
            let result = load_dotenv_from(&temp_dir);
            assert!(result.is_ok(), "Valid .env file should load successfully");
            assert_eq!(
                std::env::var("DOTENV_TEST_DATABASE_HOST").as_deref(),
                Ok("db.internal")
            );
        },
    );
}

#[test]
#[serial]
fn test_dotenv_does_not_replace_existing_variables() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), ".env", "DOTENV_TEST_EXISTING=from-file\n");

    temp_env::with_vars(
        [
            (DOTENV_DISABLED_VAR, None),
            ("DOTENV_TEST_EXISTING", Some("from-process")),
        ],
        || {
            load_dotenv_from(&temp_dir).unwrap();
            assert_eq!(
                std::env::var("DOTENV_TEST_EXISTING").as_deref(),
                Ok("from-process")
            );
        },
    );
}

#[test]
#[serial]
fn test_invalid_dotenv_returns_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    // A line without '=' is invalid.
    write_file(temp_dir.path(), ".env", "INVALID_LINE_WITHOUT_EQUALS");

    temp_env::with_var_unset(DOTENV_DISABLED_VAR, || match load_dotenv_from(&temp_dir) {
        Err(ConfigError::DotenvParse { .. }) => {}
        Err(other) => panic!(
            "Invalid .env should return DotenvParse error, got {}",
            other
        ),
        Ok(_) => panic!("Invalid .env should return DotenvParse error, got Ok"),
    });
}

#[test]
#[serial]
fn test_dotenv_parse_error_does_not_leak_secrets() {
    let temp_dir = TempDir::new().unwrap();
    let secret_value = "super-secret-master-key-12345";
    write_file(
        temp_dir.path(),
        ".env",
        &format!("RAILS_MASTER_KEY {}", secret_value),
    );

    temp_env::with_vars_unset([DOTENV_DISABLED_VAR, "RAILS_MASTER_KEY"], || {
        let err = load_dotenv_from(&temp_dir)
            .err()
            .expect("Invalid .env should fail");
        let message = err.to_string();
        assert!(
            !message.contains(secret_value),
            "Error message should not contain the secret value: {}",
            message
        );
        assert!(
            !format!("{:?}", err).contains(secret_value),
            "Debug output should not contain the secret value"
        );
    });
}

#[test]
#[serial]
fn test_dotenv_disabled_skips_loading() {
    let temp_dir = TempDir::new().unwrap();
    // Invalid on purpose: reading it would fail.
    write_file(temp_dir.path(), ".env", "INVALID_LINE_WITHOUT_EQUALS");

    for value in ["1", "true"] {
        temp_env::with_var(DOTENV_DISABLED_VAR, Some(value), || {
            assert!(
                load_dotenv_from(&temp_dir).is_ok(),
                "DOTENV_DISABLED={} should skip .env loading",
                value
            );
        });
    }
}

#[test]
#[serial]
fn test_dotenv_disabled_false_still_loads() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), ".env", "INVALID_LINE_WITHOUT_EQUALS");

    temp_env::with_var(DOTENV_DISABLED_VAR, Some("false"), || {
        assert!(
            matches!(
                load_dotenv_from(&temp_dir),
                Err(ConfigError::DotenvParse { .. })
            ),
            "DOTENV_DISABLED=false should not disable loading"
        );
    });
}

#[cfg(unix)]
#[test]
#[serial]
fn test_unreadable_dotenv_returns_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join(".env");
    write_file(temp_dir.path(), ".env", "DOTENV_TEST_UNREADABLE=1\n");
    std::fs::set_permissions(&env_path, std::fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read regardless of mode bits.
    if std::fs::read(&env_path).is_ok() {
        return;
    }

    temp_env::with_vars_unset([DOTENV_DISABLED_VAR, "DOTENV_TEST_UNREADABLE"], || {
        assert!(matches!(
            load_dotenv_from(&temp_dir),
            Err(ConfigError::DotenvIo { .. })
        ));
    });
}
