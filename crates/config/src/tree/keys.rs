//! Key normalization and override-variable naming.
//!
//! Keys are stored in `snake_case` regardless of how a source spelled them,
//! and the override variable for a key path is the upper-cased `_` join of
//! the normalized path. `otherThing`, `other-thing` and `other_thing` all
//! address the same slot and the same variable.

use heck::ToSnakeCase;

use crate::constants::{ENV_KEY_SEPARATOR, PATH_SEPARATOR};

/// Normalizes a single key to `snake_case`.
///
/// Only word boundaries inside the key are rewritten: leading and trailing
/// underscores survive, so `_token` stays distinct from `token`. Keys made
/// only of digits (array indices) or with no word characters at all (`--`)
/// pass through untouched.
pub fn normalize_key(key: &str) -> String {
    if key.chars().all(|c| c.is_ascii_digit()) {
        return key.to_string();
    }
    let core = key.trim_matches('_');
    let words = core.to_snake_case();
    if words.is_empty() {
        return key.to_string();
    }
    let leading = key.len() - key.trim_start_matches('_').len();
    let trailing = key.len() - key.trim_end_matches('_').len();
    format!("{}{}{}", &key[..leading], words, &key[key.len() - trailing..])
}

/// Splits read arguments on `.` and normalizes each resulting segment.
///
/// Empty segments (`"a..b"`, a trailing `.`) are dropped.
pub fn split_segments<I, S>(path: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    path.into_iter()
        .flat_map(|segment| {
            segment
                .as_ref()
                .split(PATH_SEPARATOR)
                .filter(|part| !part.is_empty())
                .map(normalize_key)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Name of the environment variable overriding the value at `key_path`.
pub fn env_var_name(key_path: &[String]) -> String {
    key_path.join(ENV_KEY_SEPARATOR).to_uppercase()
}

/// Reads the override for `key_path`, if one is set.
///
/// Presence is what matters: an empty string still overrides. The root
/// (empty path) never has an override.
pub fn env_override(key_path: &[String]) -> Option<String> {
    if key_path.is_empty() {
        return None;
    }
    std::env::var(env_var_name(key_path)).ok()
}
