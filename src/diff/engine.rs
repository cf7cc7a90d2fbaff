//! Two-phase diff engine: detection, then evaluation.

use super::catalogue::default_constraints;
use super::constraint::ConstraintRegistry;
use crate::config::{discover_config_file, load_config_file, EngineConfig, Validatable};
use crate::error::{ApiDiffError, Result};
use crate::eval::{default_rules, rank_at, RuleRegistry};
use crate::model::{ApiDifference, ApiSnapshot, EntityKind, EntityRecord};
use rayon::prelude::*;
use std::path::Path;

/// Compares two API snapshots and ranks the differences.
///
/// Detection walks every entity kind present in either snapshot and runs
/// that kind's constraints on each old/new pair. Evaluation then runs the
/// rule registry over every detected record.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    constraints: ConstraintRegistry,
    rules: RuleRegistry,
    config: EngineConfig,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    /// Create an engine with the stock constraints and rules
    #[must_use]
    pub fn new() -> Self {
        Self {
            constraints: default_constraints(),
            rules: default_rules(),
            config: EngineConfig::default(),
        }
    }

    /// Create an engine with no constraints and no rules
    #[must_use]
    pub fn empty() -> Self {
        Self {
            constraints: ConstraintRegistry::new(),
            rules: RuleRegistry::new(),
            config: EngineConfig::default(),
        }
    }

    /// Build an engine from a configuration.
    ///
    /// Configured rank overrides are registered after the stock rules, so
    /// they take precedence for their kind.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ApiDiffError::validation(message));
        }

        let mut rules = default_rules();
        for rank_override in &config.rank_overrides {
            rules.add(rank_at(
                rank_override.kind.as_str(),
                rank_override.rank,
                rank_override.private_rank,
            ));
        }
        tracing::debug!(
            "Registered {} rank override(s) on top of {} stock rules",
            config.rank_overrides.len(),
            rules.len() - config.rank_overrides.len()
        );

        Ok(Self {
            constraints: default_constraints(),
            rules,
            config,
        })
    }

    /// Load a YAML config file and build an engine from it.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = load_config_file(path)?;
        tracing::info!("Loaded engine config from {}", path.display());
        Self::from_config(config)
    }

    /// Build an engine from the first config file found by
    /// [`discover_config_file`], or from the defaults when there is none.
    ///
    /// A file that exists but fails to load is an error rather than a
    /// silent fallback.
    pub fn from_discovered_config(explicit: Option<&Path>) -> Result<Self> {
        match discover_config_file(explicit) {
            Some(path) => Self::from_config_file(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::from_config(EngineConfig::default())
            }
        }
    }

    /// Replace the constraint registry
    #[must_use]
    pub fn with_constraints(mut self, constraints: ConstraintRegistry) -> Self {
        self.constraints = constraints;
        self
    }

    /// Replace the rule registry
    #[must_use]
    pub fn with_rules(mut self, rules: RuleRegistry) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the configuration without touching the registries.
    ///
    /// Only the `evaluate` and `parallel` switches take effect here. Rank
    /// overrides are turned into rules by [`DiffEngine::from_config`].
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn constraints(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    #[must_use]
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Detect differences between two snapshots without ranking them.
    ///
    /// Records are ordered by entity kind, then by old-snapshot order, then
    /// by new-snapshot order for additions. An id whose kind changed between
    /// snapshots is treated as a removal plus an addition.
    pub fn detect(&self, old: &ApiSnapshot, new: &ApiSnapshot) -> Result<ApiDifference> {
        let mut diff = ApiDifference::new(old.name.as_str(), new.name.as_str());
        let constrained = self.constraints.kinds();

        let mut kinds = old.kinds();
        kinds.extend(new.kinds());

        for kind in kinds.into_iter().filter(|k| constrained.contains(k)) {
            let before = diff.len();
            for (old_entity, new_entity) in entity_pairs(kind, old, new) {
                for entry in self
                    .constraints
                    .check_pair(kind, old_entity, new_entity, old, new)?
                {
                    diff.push(entry);
                }
            }
            tracing::debug!(
                "{} constraints on {} entities produced {} record(s)",
                self.constraints.for_kind(kind).count(),
                kind.label(),
                diff.len() - before
            );
        }

        tracing::info!(
            "Detected {} difference(s) between {} and {}",
            diff.len(),
            old.name,
            new.name
        );
        Ok(diff)
    }

    /// Rank every record of `diff` with the rule registry.
    ///
    /// Rules see the set as it was before this pass, so sequential and
    /// parallel evaluation produce the same records.
    pub fn evaluate(
        &self,
        diff: &mut ApiDifference,
        old: &ApiSnapshot,
        new: &ApiSnapshot,
    ) -> Result<()> {
        if self.rules.is_empty() || diff.is_empty() {
            return Ok(());
        }

        let context = diff.clone();
        let rules = &self.rules;

        let applied = if self.config.parallel {
            diff.entries
                .par_iter_mut()
                .map(|entry| rules.evaluate(entry, &context, old, new))
                .try_reduce(|| 0, |a, b| Ok(a + b))?
        } else {
            let mut applied = 0;
            for entry in &mut diff.entries {
                applied += rules.evaluate(entry, &context, old, new)?;
            }
            applied
        };

        tracing::debug!(
            "Applied {} rule invocation(s) across {} record(s){}",
            applied,
            diff.len(),
            if self.config.parallel { " in parallel" } else { "" }
        );
        Ok(())
    }

    /// Detect, then evaluate when the configuration enables it.
    pub fn diff(&self, old: &ApiSnapshot, new: &ApiSnapshot) -> Result<ApiDifference> {
        let mut diff = self.detect(old, new)?;
        if self.config.evaluate {
            self.evaluate(&mut diff, old, new)?;
            let summary = diff.summary(self.config.breaking_rank);
            tracing::info!(
                "Ranked {} difference(s): {} breaking at or above {}",
                summary.total,
                summary.breaking,
                self.config.breaking_rank
            );
        }
        Ok(diff)
    }
}

/// Old/new pairs for one entity kind.
///
/// Old entities come first in old-snapshot order, paired with the new entity
/// of the same id and kind if any. Entities only present in the new
/// snapshot follow in new-snapshot order.
fn entity_pairs<'a>(
    kind: EntityKind,
    old: &'a ApiSnapshot,
    new: &'a ApiSnapshot,
) -> Vec<(Option<&'a EntityRecord>, Option<&'a EntityRecord>)> {
    let same_kind = |snapshot: &'a ApiSnapshot, id: &str| {
        snapshot.get(id).filter(|entity| entity.kind == kind)
    };

    let mut pairs: Vec<_> = old
        .of_kind(kind)
        .map(|entity| (Some(entity), same_kind(new, &entity.id)))
        .collect();
    pairs.extend(
        new.of_kind(kind)
            .filter(|entity| same_kind(old, &entity.id).is_none())
            .map(|entity| (None, Some(entity))),
    );
    pairs
}
