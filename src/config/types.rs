//! Configuration types for the diff engine.

use crate::model::BreakingRank;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Engine configuration, loadable from `.apidiff.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Run the evaluation phase after detection
    pub evaluate: bool,
    /// Evaluate entries on the rayon thread pool
    pub parallel: bool,
    /// Entries at or above this rank count as breaking in summaries
    pub breaking_rank: BreakingRank,
    /// Rank rules registered after the stock rules, overriding them
    pub rank_overrides: Vec<RankOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evaluate: true,
            parallel: false,
            breaking_rank: super::defaults::DEFAULT_BREAKING_RANK,
            rank_overrides: Vec::new(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `EngineConfig` builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// A configured `rank_at` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RankOverride {
    /// Difference kind, e.g. `RemoveFunction`
    pub kind: String,
    pub rank: BreakingRank,
    /// Rank used when a referenced entity is private
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_rank: Option<BreakingRank>,
}

impl RankOverride {
    pub fn new(kind: impl Into<String>, rank: BreakingRank) -> Self {
        Self {
            kind: kind.into(),
            rank,
            private_rank: None,
        }
    }

    #[must_use]
    pub fn with_private_rank(mut self, rank: BreakingRank) -> Self {
        self.private_rank = Some(rank);
        self
    }
}

// ============================================================================
// Builder for EngineConfig
// ============================================================================

/// Builder for [`EngineConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn evaluate(mut self, evaluate: bool) -> Self {
        self.config.evaluate = evaluate;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn breaking_rank(mut self, rank: BreakingRank) -> Self {
        self.config.breaking_rank = rank;
        self
    }

    pub fn rank_override(mut self, rank_override: RankOverride) -> Self {
        self.config.rank_overrides.push(rank_override);
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
