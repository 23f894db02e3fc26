//! Path helpers for configuration file locations.
//!
//! Responsibilities:
//! - Resolve bare configuration names (`database`) under `config/`.
//! - Resolve relative paths against a project root.
//! - Guess a missing extension from an ordered list.
//!
//! Does NOT handle:
//! - Directory walking or glob discovery.
//! - Reading files.

use std::path::{Path, PathBuf};

use crate::constants::CONFIG_DIR;

/// Resolves `base` to a configuration file path.
///
/// A `base` without any path separator is looked up in `root/config/`. If the
/// result has no extension, each of `extensions` is tried in order and the
/// first existing file wins; when none exists the first extension is
/// appended anyway so callers get a stable path to report.
pub fn resolve_config_file_path(root: &Path, base: impl AsRef<Path>, extensions: &[&str]) -> PathBuf {
    let base = base.as_ref();
    let relative = if base.components().count() > 1 || base.is_absolute() {
        base.to_path_buf()
    } else {
        Path::new(CONFIG_DIR).join(base)
    };
    let path = if relative.is_absolute() {
        relative
    } else {
        root.join(relative)
    };

    if path.extension().is_some() {
        return path;
    }

    for extension in extensions {
        let candidate = with_appended_extension(&path, extension);
        if candidate.exists() {
            return candidate;
        }
    }

    match extensions.first() {
        Some(extension) => {
            tracing::debug!(
                path = %path.display(),
                extensions = ?extensions,
                "Could not resolve configuration file with any extension"
            );
            with_appended_extension(&path, extension)
        }
        None => path,
    }
}

/// Appends `.extension` verbatim, so multi-part extensions like `yml.enc`
/// survive.
fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(extension);
    PathBuf::from(os)
}
