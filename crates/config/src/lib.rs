//! Configuration loading, validation, and env substitution.
//!
//! Config files: `verwatch.toml`, `verwatch.yaml`, or `verwatch.json`
//! Searched in `./` then `~/.config/verwatch/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{DiscordConfig, VerwatchConfig, WatchConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
