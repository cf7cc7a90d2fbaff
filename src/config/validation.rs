//! Configuration validation.

use super::types::{EngineConfig, RankOverride};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> Vec<ConfigError> {
        self.rank_overrides
            .iter()
            .enumerate()
            .flat_map(|(idx, rank_override)| {
                validate_override(rank_override, &format!("rank_overrides[{idx}]"))
            })
            .collect()
    }
}

impl Validatable for RankOverride {
    fn validate(&self) -> Vec<ConfigError> {
        validate_override(self, "rank_override")
    }
}

fn validate_override(rank_override: &RankOverride, prefix: &str) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if rank_override.kind.is_empty() {
        errors.push(ConfigError {
            field: format!("{prefix}.kind"),
            message: "Kind must not be empty".to_string(),
        });
    } else if rank_override.kind.chars().any(char::is_whitespace) {
        errors.push(ConfigError {
            field: format!("{prefix}.kind"),
            message: format!("Kind '{}' must not contain whitespace", rank_override.kind),
        });
    }

    if let Some(private_rank) = rank_override.private_rank {
        if private_rank > rank_override.rank {
            errors.push(ConfigError {
                field: format!("{prefix}.private_rank"),
                message: format!(
                    "Private rank {private_rank} must not exceed rank {}",
                    rank_override.rank
                ),
            });
        }
    }

    errors
}
