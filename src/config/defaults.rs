//! Default values and named presets.

use super::types::EngineConfig;
use crate::model::BreakingRank;

/// Rank at which a difference counts as breaking by default.
pub const DEFAULT_BREAKING_RANK: BreakingRank = BreakingRank::Medium;

/// Named configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Medium and High differences are breaking
    Default,
    /// Anything from Low upwards is breaking
    Strict,
    /// Only High differences are breaking
    Lenient,
}

impl ConfigPreset {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "balanced" => Some(Self::Default),
            "strict" => Some(Self::Strict),
            "lenient" | "permissive" => Some(Self::Lenient),
            _ => None,
        }
    }

    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Strict, Self::Lenient]
    }

    const fn breaking_rank(self) -> BreakingRank {
        match self {
            Self::Default => DEFAULT_BREAKING_RANK,
            Self::Strict => BreakingRank::Low,
            Self::Lenient => BreakingRank::High,
        }
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl EngineConfig {
    /// Configuration for a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        Self {
            breaking_rank: preset.breaking_rank(),
            ..Self::default()
        }
    }
}
