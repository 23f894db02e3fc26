//! Hierarchical configuration tree.
//!
//! Responsibilities:
//! - Hold merged configuration as nested `ConfigNode`s.
//! - Resolve environment-variable overrides at any depth.
//! - Flatten a tree into definitions.
//!
//! Does NOT handle:
//! - Loading files or credentials (see `loader` and `credentials`).
//!
//! Invariants / Assumptions:
//! - Keys are normalized to `snake_case`; override variables derive from the
//!   normalized key path.

mod definitions;
mod keys;
mod node;
mod value;


pub use definitions::{DefinitionOptions, KeyTransform};
pub use keys::{env_var_name, normalize_key};
pub use node::ConfigNode;
pub use value::ConfigValue;
