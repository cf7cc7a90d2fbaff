//! Detection constraints and their registry.
//!
//! A [`Constraint`] wraps a checker function and binds it to an entity kind
//! and a [`Direction`]. The registry holds constraints for every kind side by
//! side; each constraint filters itself, so the detection driver never needs
//! a per-kind switch.

use crate::error::{ApiDiffError, ErrorContext, Result};
use crate::model::{ApiSnapshot, DiffEntry, EntityKind, EntityRecord};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Checker signature shared by all constraints.
///
/// Called with the old-side entity, the new-side entity (either may be
/// absent) and both snapshots. Each returned [`Finding`] becomes one
/// difference record.
pub type ConstraintFn = dyn Fn(
        Option<&EntityRecord>,
        Option<&EntityRecord>,
        &ApiSnapshot,
        &ApiSnapshot,
    ) -> Result<Vec<Finding>>
    + Send
    + Sync;

/// Which side of a snapshot pair a constraint looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Entity present only in the new snapshot
    Addition,
    /// Entity present only in the old snapshot
    Removal,
}

impl Direction {
    /// Whether an old/new pair has the shape this direction describes.
    #[must_use]
    pub const fn matches(self, old: Option<&EntityRecord>, new: Option<&EntityRecord>) -> bool {
        match self {
            Self::Addition => old.is_none() && new.is_some(),
            Self::Removal => old.is_some() && new.is_none(),
        }
    }

    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Addition => "Add",
            Self::Removal => "Remove",
        }
    }
}

/// Output of a checker: one message plus optional structured details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Finding {
    pub message: String,
    pub data: IndexMap<String, serde_json::Value>,
}

impl Finding {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_data(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// A named detection function bound to an entity kind and direction.
#[derive(Clone)]
pub struct Constraint {
    name: String,
    binding: Option<(EntityKind, Direction)>,
    checker: Arc<ConstraintFn>,
}

impl Constraint {
    /// Wrap a checker. The name becomes the kind of every emitted record.
    ///
    /// The constraint stays inert until bound with [`Constraint::for_type`].
    pub fn new<F>(name: impl Into<String>, checker: F) -> Self
    where
        F: Fn(
                Option<&EntityRecord>,
                Option<&EntityRecord>,
                &ApiSnapshot,
                &ApiSnapshot,
            ) -> Result<Vec<Finding>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            binding: None,
            checker: Arc::new(checker),
        }
    }

    /// Bind the constraint to an entity kind and direction.
    #[must_use]
    pub fn for_type(mut self, kind: EntityKind, direction: Direction) -> Self {
        self.binding = Some((kind, direction));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entity_kind(&self) -> Option<EntityKind> {
        self.binding.map(|(kind, _)| kind)
    }

    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.binding.map(|(_, direction)| direction)
    }

    /// Whether this constraint applies to the given pair.
    #[must_use]
    pub fn applies(&self, old: Option<&EntityRecord>, new: Option<&EntityRecord>) -> bool {
        let Some((kind, direction)) = self.binding else {
            return false;
        };
        direction.matches(old, new) && old.into_iter().chain(new).all(|e| e.kind == kind)
    }

    /// Run the constraint on one entity pair.
    ///
    /// Returns no records when the pair does not match the binding. Every
    /// finding must carry a message.
    pub fn check(
        &self,
        old: Option<&EntityRecord>,
        new: Option<&EntityRecord>,
        old_api: &ApiSnapshot,
        new_api: &ApiSnapshot,
    ) -> Result<Vec<DiffEntry>> {
        if !self.applies(old, new) {
            return Ok(Vec::new());
        }

        let findings = (self.checker)(old, new, old_api, new_api)
            .with_context(|| format!("constraint {}", self.name))?;
        if findings.iter().any(|finding| finding.message.is_empty()) {
            return Err(ApiDiffError::checker_failed(
                self.name.as_str(),
                "finding without a message",
            ));
        }

        Ok(findings
            .into_iter()
            .map(|finding| {
                DiffEntry::new(self.name.clone(), old.cloned(), new.cloned())
                    .with_message(finding.message)
                    .with_data(finding.data)
            })
            .collect())
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of constraints.
#[derive(Debug, Clone, Default)]
pub struct ConstraintRegistry {
    constraints: Vec<Constraint>,
}

impl ConstraintRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint, preserving registration order.
    pub fn add(&mut self, constraint: Constraint) -> &mut Self {
        self.constraints.push(constraint);
        self
    }

    /// Builder form of [`ConstraintRegistry::add`].
    #[must_use]
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Append every constraint of another registry.
    pub fn extend(&mut self, other: Self) {
        self.constraints.extend(other.constraints);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// Constraints bound to one entity kind, in registration order.
    pub fn for_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(move |c| c.entity_kind() == Some(kind))
    }

    /// Entity kinds that have at least one constraint.
    #[must_use]
    pub fn kinds(&self) -> BTreeSet<EntityKind> {
        self.constraints
            .iter()
            .filter_map(Constraint::entity_kind)
            .collect()
    }

    /// Run every constraint for `kind` on one pair, in registration order.
    pub fn check_pair(
        &self,
        kind: EntityKind,
        old: Option<&EntityRecord>,
        new: Option<&EntityRecord>,
        old_api: &ApiSnapshot,
        new_api: &ApiSnapshot,
    ) -> Result<Vec<DiffEntry>> {
        let mut entries = Vec::new();
        for constraint in self.for_kind(kind) {
            entries.extend(constraint.check(old, new, old_api, new_api)?);
        }
        Ok(entries)
    }
}

// ============================================================================
// Stock checkers
// ============================================================================

/// Report an entity that only exists in the new snapshot.
pub fn add(
    old: Option<&EntityRecord>,
    new: Option<&EntityRecord>,
    _old_api: &ApiSnapshot,
    _new_api: &ApiSnapshot,
) -> Result<Vec<Finding>> {
    match (old, new) {
        (None, Some(entity)) => Ok(vec![Finding::new(format!(
            "Add {}: {}",
            entity.kind.label(),
            entity.id
        ))]),
        _ => Ok(Vec::new()),
    }
}

/// Report an entity that only exists in the old snapshot.
pub fn remove(
    old: Option<&EntityRecord>,
    new: Option<&EntityRecord>,
    _old_api: &ApiSnapshot,
    _new_api: &ApiSnapshot,
) -> Result<Vec<Finding>> {
    match (old, new) {
        (Some(entity), None) => Ok(vec![Finding::new(format!(
            "Remove {}: {}",
            entity.kind.label(),
            entity.id
        ))]),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectionErrorKind;

    fn apis() -> (ApiSnapshot, ApiSnapshot) {
        (ApiSnapshot::new("old"), ApiSnapshot::new("new"))
    }

    #[test]
    fn test_unbound_constraint_never_fires() {
        let (old_api, new_api) = apis();
        let constraint = Constraint::new("AddModule", add);
        let module = EntityRecord::module("foo");

        assert!(constraint.entity_kind().is_none());
        let entries = constraint
            .check(None, Some(&module), &old_api, &new_api)
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_for_type_binds_kind_and_direction() {
        let constraint = Constraint::new("RemoveModule", remove)
            .for_type(EntityKind::Module, Direction::Removal);
        assert_eq!(constraint.name(), "RemoveModule");
        assert_eq!(constraint.entity_kind(), Some(EntityKind::Module));
        assert_eq!(constraint.direction(), Some(Direction::Removal));
    }

    #[test]
    fn test_removal_emits_entry() {
        let (old_api, new_api) = apis();
        let constraint = Constraint::new("RemoveModule", remove)
            .for_type(EntityKind::Module, Direction::Removal);
        let module = EntityRecord::module("foo.Bar");

        let entries = constraint
            .check(Some(&module), None, &old_api, &new_api)
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind(), "RemoveModule");
        assert_eq!(entries[0].old.as_ref().map(|e| e.id.as_str()), Some("foo.Bar"));
        assert!(entries[0].new.is_none());
        assert_eq!(entries[0].message(), Some("Remove module: foo.Bar"));
    }

    #[test]
    fn test_direction_mismatch_is_noop() {
        let (old_api, new_api) = apis();
        let constraint =
            Constraint::new("AddModule", add).for_type(EntityKind::Module, Direction::Addition);
        let module = EntityRecord::module("foo");

        assert!(constraint
            .check(Some(&module), None, &old_api, &new_api)
            .unwrap()
            .is_empty());
        assert!(constraint
            .check(Some(&module), Some(&module), &old_api, &new_api)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_kind_mismatch_is_noop() {
        let (old_api, new_api) = apis();
        let constraint =
            Constraint::new("AddModule", add).for_type(EntityKind::Module, Direction::Addition);
        let class = EntityRecord::class("foo.Bar");

        assert!(!constraint.applies(None, Some(&class)));
        assert!(constraint
            .check(None, Some(&class), &old_api, &new_api)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_multiple_findings_and_data() {
        let (old_api, new_api) = apis();
        let constraint = Constraint::new("AddClass", |_, new: Option<&EntityRecord>, _, _| {
            let name = new.map(|e| e.name.clone()).unwrap_or_default();
            Ok(vec![
                Finding::new("first").with_data("name", name),
                Finding::new("second"),
            ])
        })
        .for_type(EntityKind::Class, Direction::Addition);
        let class = EntityRecord::class("m.Widget");

        let entries = constraint
            .check(None, Some(&class), &old_api, &new_api)
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].data_str("name"), Some("Widget"));
        assert_eq!(entries[1].message(), Some("second"));
    }

    #[test]
    fn test_checker_error_gets_constraint_context() {
        let (old_api, new_api) = apis();
        let constraint = Constraint::new("AddModule", |_, _, _, _| {
            Err(ApiDiffError::detection(
                "inspecting module",
                DetectionErrorKind::CheckerFailed {
                    constraint: "AddModule".to_string(),
                    message: "boom".to_string(),
                },
            ))
        })
        .for_type(EntityKind::Module, Direction::Addition);
        let module = EntityRecord::module("foo");

        match constraint.check(None, Some(&module), &old_api, &new_api) {
            Err(ApiDiffError::Detection { context, .. }) => {
                assert_eq!(context, "constraint AddModule: inspecting module");
            }
            other => panic!("Expected Detection error, got {other:?}"),
        }
    }

    #[test]
    fn test_finding_without_message_is_rejected() {
        let (old_api, new_api) = apis();
        let constraint = Constraint::new("AddModule", |_, _, _, _| Ok(vec![Finding::default()]))
            .for_type(EntityKind::Module, Direction::Addition);
        let module = EntityRecord::module("foo");

        match constraint.check(None, Some(&module), &old_api, &new_api) {
            Err(ApiDiffError::Detection {
                context,
                source: DetectionErrorKind::CheckerFailed { constraint, .. },
            }) => {
                assert_eq!(context, "constraint AddModule");
                assert_eq!(constraint, "AddModule");
            }
            other => panic!("Expected Detection error, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_preserves_order_and_filters_by_kind() {
        let mut registry = ConstraintRegistry::new();
        registry
            .add(Constraint::new("AddClass", add).for_type(EntityKind::Class, Direction::Addition))
            .add(
                Constraint::new("AddModule", add).for_type(EntityKind::Module, Direction::Addition),
            )
            .add(
                Constraint::new("AddClassAgain", add)
                    .for_type(EntityKind::Class, Direction::Addition),
            );

        assert_eq!(registry.len(), 3);
        let names: Vec<_> = registry
            .for_kind(EntityKind::Class)
            .map(Constraint::name)
            .collect();
        assert_eq!(names, vec!["AddClass", "AddClassAgain"]);
        assert_eq!(
            registry.kinds().into_iter().collect::<Vec<_>>(),
            vec![EntityKind::Module, EntityKind::Class]
        );
    }

    fn class_addition() -> Constraint {
        Constraint::new("AddClass", add).for_type(EntityKind::Class, Direction::Addition)
    }

    #[test]
    fn test_registry_does_not_deduplicate() {
        let (old_api, new_api) = apis();
        let registry = ConstraintRegistry::new()
            .with(class_addition())
            .with(class_addition());
        let class = EntityRecord::class("m.A");

        let entries = registry
            .check_pair(EntityKind::Class, None, Some(&class), &old_api, &new_api)
            .unwrap();
        assert_eq!(entries.len(), 2);
    }
}
