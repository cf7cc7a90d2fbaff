//! Locating and reading `.apidiff.yaml` files.

use super::types::EngineConfig;
use crate::error::ApiDiffError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names tried in each search directory, in order.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".apidiff.yaml",
    ".apidiff.yml",
    "apidiff.yaml",
    "apidiff.yml",
];

/// Failure to turn a config file into an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigFileError {
    /// File the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

impl From<ConfigFileError> for ApiDiffError {
    fn from(err: ConfigFileError) -> Self {
        match err {
            ConfigFileError::Io { path, source } => Self::io(path, source),
            other => Self::config(other.to_string()),
        }
    }
}

/// Directories searched when no explicit path is given: the working
/// directory, `<config dir>/apidiff`, then the home directory.
fn search_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    candidates.extend(std::env::current_dir().ok());
    candidates.extend(dirs::config_dir().map(|dir| dir.join("apidiff")));
    candidates.extend(dirs::home_dir());
    candidates
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Find the config file to use.
///
/// An existing `explicit_path` wins. Otherwise the first known file name
/// found in the search directories is returned.
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path.filter(|path| path.is_file()) {
        return Some(path.to_path_buf());
    }
    search_dirs().iter().find_map(|dir| find_in(dir))
}

/// Read and parse an engine config from a YAML file.
pub fn load_config_file(path: &Path) -> Result<EngineConfig, ConfigFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigFileError::NotFound(path.to_path_buf())
        } else {
            ConfigFileError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the discovered config, falling back to the defaults.
///
/// Returns the path the config was read from, `None` when the defaults are
/// used. A file that fails to load is logged and skipped.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (EngineConfig, Option<PathBuf>) {
    let Some(path) = discover_config_file(explicit_path) else {
        return (EngineConfig::default(), None);
    };
    match load_config_file(&path) {
        Ok(config) => (config, Some(path)),
        Err(e) => {
            tracing::warn!("Ignoring config file: {e}");
            (EngineConfig::default(), None)
        }
    }
}

/// Commented example `.apidiff.yaml`.
#[must_use]
pub fn generate_example_config() -> String {
    r"# apidiff configuration
# Place this file at .apidiff.yaml in your project root or ~/.config/apidiff/

# Run the evaluation phase (ranking) after detection
evaluate: true

# Evaluate differences in parallel
parallel: false

# Differences at or above this rank count as breaking
# (unknown, compatible, low, medium, high)
breaking_rank: medium

# Extra rank rules, applied after the built-in ones
rank_overrides:
  - kind: RemoveModule
    rank: high
    private_rank: compatible
"
    .to_string()
}
