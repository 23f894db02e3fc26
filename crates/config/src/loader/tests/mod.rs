//! Tests for the configuration builder.
//!
//! Responsibilities:
//! - Test file loading, keying and environment-keyed extraction through the
//!   builder.
//! - Test credentials layering and strict/non-strict failure policy.
//! - Test `.env` loading and the `DOTENV_DISABLED` gate.
//!
//! Does NOT handle:
//! - Tree read semantics (tested in `tree::tests`).
//! - Cipher, envelope and framing internals (tested beside each module).
//!
//! Invariants:
//! - Tests that touch the process environment use `serial_test` and
//!   `temp_env` so variables are restored afterwards.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::path::Path;

pub mod dotenv_tests;

/// Key variables the default credentials layers consult.
pub const KEY_VARS: [&str; 5] = [
    "RAILS_MASTER_KEY",
    "RAILS_ROOT_KEY",
    "RAILS_DEVELOPMENT_KEY",
    "RAILS_PRODUCTION_KEY",
    "RAILS_STAGING_KEY",
];

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
