//! Configuration for the diff engine.
//!
//! - Type-safe configuration structures with serde defaults
//! - Validation through the [`Validatable`] trait
//! - Named presets
//! - YAML config file loading and discovery
//!
//! ```yaml
//! breaking_rank: medium
//! rank_overrides:
//!   - kind: RemoveFunction
//!     rank: medium
//!     private_rank: compatible
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{ConfigPreset, DEFAULT_BREAKING_RANK};
pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};
pub use types::{EngineConfig, EngineConfigBuilder, RankOverride};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the `.apidiff.yaml` format.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(EngineConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
