//! Difference records and the difference set produced for a snapshot pair.

use super::EntityRecord;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

/// Breaking-change severity of a difference.
///
/// Ordered from least to most severe so ranks can be compared and
/// aggregated with `max`/`min`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum BreakingRank {
    /// Not ranked yet, or impact cannot be determined
    #[default]
    Unknown,
    /// Backwards compatible
    Compatible,
    Low,
    Medium,
    High,
}

impl BreakingRank {
    /// All ranks in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Unknown,
        Self::Compatible,
        Self::Low,
        Self::Medium,
        Self::High,
    ];

    /// Parse a rank name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unknown" => Some(Self::Unknown),
            "compatible" => Some(Self::Compatible),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Compatible => "compatible",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for BreakingRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected change between two snapshots.
///
/// Created by a constraint during detection, then annotated in place by
/// evaluation rules. The `kind` is fixed at creation; rules can change the
/// rank, messages and data but not the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    id: String,
    kind: String,
    /// Entity on the old side, absent for pure additions
    pub old: Option<EntityRecord>,
    /// Entity on the new side, absent for pure removals
    pub new: Option<EntityRecord>,
    /// Severity, `Unknown` until a rule ranks the entry
    #[serde(default)]
    pub rank: BreakingRank,
    #[serde(default)]
    pub messages: Vec<String>,
    /// Constraint-specific details
    #[serde(default)]
    pub data: IndexMap<String, serde_json::Value>,
}

impl DiffEntry {
    /// Create an unranked entry.
    pub fn new(
        kind: impl Into<String>,
        old: Option<EntityRecord>,
        new: Option<EntityRecord>,
    ) -> Self {
        let kind = kind.into();
        let id = entry_id(&kind, old.as_ref(), new.as_ref());
        Self {
            id,
            kind,
            old,
            new,
            rank: BreakingRank::Unknown,
            messages: Vec::new(),
            data: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: IndexMap<String, serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    /// Stable identifier derived from the kind and entity ids
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Primary message, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Whether either referenced entity is private.
    #[must_use]
    pub fn touches_private(&self) -> bool {
        self.old.as_ref().is_some_and(|e| e.private) || self.new.as_ref().is_some_and(|e| e.private)
    }

    /// String value of a data field
    #[must_use]
    pub fn data_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(serde_json::Value::as_str)
    }
}

fn entry_id(kind: &str, old: Option<&EntityRecord>, new: Option<&EntityRecord>) -> String {
    let key = format!(
        "{kind}\u{0}{}\u{0}{}",
        old.map_or("", |e| e.id.as_str()),
        new.map_or("", |e| e.id.as_str())
    );
    format!("{:016x}", xxh3_64(key.as_bytes()))
}

/// Ordered set of all differences detected for one snapshot pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ApiDifference {
    /// Name of the old snapshot
    pub old: String,
    /// Name of the new snapshot
    pub new: String,
    pub entries: Vec<DiffEntry>,
}

impl ApiDifference {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: DiffEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffEntry> {
        self.entries.iter()
    }

    /// Entries of one kind
    pub fn kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a DiffEntry> + 'a {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Entries with exactly this rank
    pub fn rank(&self, rank: BreakingRank) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(move |e| e.rank == rank)
    }

    /// Entries ranked at or above `threshold`
    pub fn breaking(&self, threshold: BreakingRank) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(move |e| e.rank >= threshold)
    }

    /// Highest rank among all entries
    #[must_use]
    pub fn max_rank(&self) -> Option<BreakingRank> {
        self.entries.iter().map(|e| e.rank).max()
    }

    /// Count entries per rank.
    pub fn summary(&self, breaking_threshold: BreakingRank) -> DiffSummary {
        let mut summary = DiffSummary {
            total: self.entries.len(),
            ..DiffSummary::default()
        };
        for entry in &self.entries {
            match entry.rank {
                BreakingRank::Unknown => summary.unknown += 1,
                BreakingRank::Compatible => summary.compatible += 1,
                BreakingRank::Low => summary.low += 1,
                BreakingRank::Medium => summary.medium += 1,
                BreakingRank::High => summary.high += 1,
            }
            if entry.rank >= breaking_threshold {
                summary.breaking += 1;
            }
        }
        summary
    }
}

impl<'a> IntoIterator for &'a ApiDifference {
    type Item = &'a DiffEntry;
    type IntoIter = std::slice::Iter<'a, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Per-rank counts for a difference set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total: usize,
    pub unknown: usize,
    pub compatible: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    /// Entries at or above the breaking threshold
    pub breaking: usize,
}

impl DiffSummary {
    #[must_use]
    pub const fn is_breaking(&self) -> bool {
        self.breaking > 0
    }
}
