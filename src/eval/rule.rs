//! Evaluation rules and their registry.

use crate::error::{ErrorContext, Result};
use crate::model::{ApiDifference, ApiSnapshot, DiffEntry};
use std::fmt;
use std::sync::Arc;

/// Checker signature shared by all evaluation rules.
///
/// The checker owns the entry it is given and may read the difference set
/// and both snapshots. It must not assume other entries have been ranked.
pub type EvalFn =
    dyn Fn(&mut DiffEntry, &ApiDifference, &ApiSnapshot, &ApiSnapshot) -> Result<()> + Send + Sync;

/// Which entries a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KindFilter {
    /// Every entry regardless of kind
    All,
    /// Entries whose kind equals this value
    Kind(String),
}

impl KindFilter {
    /// Build a filter from a kind string; `""` means every kind.
    pub fn from_kind(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        if kind.is_empty() {
            Self::All
        } else {
            Self::Kind(kind)
        }
    }

    #[must_use]
    pub fn matches(&self, kind: &str) -> bool {
        match self {
            Self::All => true,
            Self::Kind(expected) => expected == kind,
        }
    }
}

/// A named evaluation function with an optional kind filter.
#[derive(Clone)]
pub struct EvalRule {
    filter: KindFilter,
    checker: Arc<EvalFn>,
}

impl EvalRule {
    /// Wrap a checker, filtered to `kind` (`""` applies to every kind).
    pub fn new<F>(kind: impl Into<String>, checker: F) -> Self
    where
        F: Fn(&mut DiffEntry, &ApiDifference, &ApiSnapshot, &ApiSnapshot) -> Result<()>
            + Send
            + Sync
            + 'static,
    {
        Self {
            filter: KindFilter::from_kind(kind),
            checker: Arc::new(checker),
        }
    }

    /// Restrict the rule to exactly one kind.
    #[must_use]
    pub fn for_kind(mut self, kind: impl Into<String>) -> Self {
        self.filter = KindFilter::from_kind(kind);
        self
    }

    /// Apply the rule to every kind.
    #[must_use]
    pub fn for_all_kinds(mut self) -> Self {
        self.filter = KindFilter::All;
        self
    }

    #[must_use]
    pub fn filter(&self) -> &KindFilter {
        &self.filter
    }

    /// Kind this rule is restricted to, `None` for all kinds.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match &self.filter {
            KindFilter::All => None,
            KindFilter::Kind(kind) => Some(kind),
        }
    }

    #[must_use]
    pub fn matches(&self, entry: &DiffEntry) -> bool {
        self.filter.matches(entry.kind())
    }

    /// Run the rule on one entry.
    ///
    /// Returns `Ok(false)` without touching the entry when the filter does
    /// not match, `Ok(true)` when the checker ran.
    pub fn apply(
        &self,
        entry: &mut DiffEntry,
        diff: &ApiDifference,
        old: &ApiSnapshot,
        new: &ApiSnapshot,
    ) -> Result<bool> {
        if !self.matches(entry) {
            return Ok(false);
        }
        (self.checker)(entry, diff, old, new)?;
        Ok(true)
    }
}

impl fmt::Debug for EvalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalRule")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Build a rule whose filter is its own name, e.g. `evalrule("RemoveFunction", f)`.
pub fn evalrule<F>(name: impl Into<String>, checker: F) -> EvalRule
where
    F: Fn(&mut DiffEntry, &ApiDifference, &ApiSnapshot, &ApiSnapshot) -> Result<()>
        + Send
        + Sync
        + 'static,
{
    EvalRule::new(name, checker)
}

/// Ordered collection of evaluation rules.
///
/// Rules run in registration order, so when two matching rules set the
/// same attribute the one registered last wins.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<EvalRule>,
}

impl RuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, preserving registration order.
    pub fn add(&mut self, rule: EvalRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Builder form of [`RuleRegistry::add`].
    #[must_use]
    pub fn with(mut self, rule: EvalRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Append every rule of another registry after the existing ones.
    pub fn extend(&mut self, other: Self) {
        self.rules.extend(other.rules);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvalRule> {
        self.rules.iter()
    }

    /// Rules that would run for an entry of `kind`, in order.
    pub fn for_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a EvalRule> + 'a {
        self.rules.iter().filter(move |r| r.filter.matches(kind))
    }

    /// Run every matching rule on one entry, returning how many ran.
    pub fn evaluate(
        &self,
        entry: &mut DiffEntry,
        diff: &ApiDifference,
        old: &ApiSnapshot,
        new: &ApiSnapshot,
    ) -> Result<usize> {
        let mut applied = 0;
        for rule in &self.rules {
            if rule
                .apply(entry, diff, old, new)
                .with_context(|| format!("evaluating {}", entry_label(entry)))?
            {
                applied += 1;
            }
        }
        Ok(applied)
    }
}

fn entry_label(entry: &DiffEntry) -> String {
    let subject = entry
        .old
        .as_ref()
        .or(entry.new.as_ref())
        .map_or("<none>", |e| e.id.as_str());
    format!("{} ({subject})", entry.kind())
}
