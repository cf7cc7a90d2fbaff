//! Stock evaluation rules.
//!
//! Registration order matters: a later rule for the same kind overrides an
//! earlier one, which is how configured overrides take effect on top of
//! [`default_rules`].

use super::rank::rank_at;
use super::rule::{evalrule, RuleRegistry};
use crate::error::{ApiDiffError, EvaluationErrorKind, OptionContext, Result};
use crate::model::{
    is_private_name, ApiDifference, ApiSnapshot, BreakingRank, DiffEntry, EntityKind,
    EntityRecord, ItemScope,
};

/// All stock rules in registration order.
#[must_use]
pub fn default_rules() -> RuleRegistry {
    let mut registry = rank_rules();
    registry.extend(member_rules());
    registry
}

/// Fixed-rank rules for structural kinds.
#[must_use]
pub fn rank_rules() -> RuleRegistry {
    use BreakingRank::{Compatible, High, Low, Medium};

    let mut registry = RuleRegistry::new();
    registry
        .add(rank_at("AddModule", Compatible, None))
        .add(rank_at("RemoveModule", High, Some(Low)))
        .add(rank_at("AddClass", Compatible, None))
        .add(rank_at("RemoveClass", High, Some(Low)))
        .add(rank_at("AddBaseClass", Compatible, None))
        .add(rank_at("ImplementAbstractBaseClass", Compatible, None))
        .add(rank_at("DeimplementAbstractBaseClass", High, Some(Low)))
        .add(rank_at("ChangeMethodResolutionOrder", Medium, Some(Low)))
        .add(rank_at("MoveParameter", High, Some(Low)));
    registry
}

/// Rules for base classes, aliases, functions and attributes.
///
/// Alias records come from caller-supplied constraints and carry their
/// alias `name` and `target` ids (`old`/`new` for a retarget) in `data`.
#[must_use]
pub fn member_rules() -> RuleRegistry {
    RuleRegistry::new()
        .with(evalrule("RemoveBaseClass", remove_base_class))
        .with(evalrule("AddAlias", add_alias))
        .with(evalrule("RemoveAlias", remove_alias))
        .with(evalrule("ChangeAlias", change_alias))
        .with(evalrule("AddFunction", add_function))
        .with(evalrule("RemoveFunction", remove_function))
        .with(evalrule("AddAttribute", add_attribute))
        .with(evalrule("RemoveAttribute", remove_attribute))
}

fn remove_base_class(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    _old: &ApiSnapshot,
    _new: &ApiSnapshot,
) -> Result<()> {
    let old_private = require_old(entry, EntityKind::Class)?.private;
    let new_private = require_new(entry, EntityKind::Class)?.private;
    let name = require_data(entry, "name")?;

    let private = old_private || new_private || is_private_name(name);
    entry.rank = if private {
        BreakingRank::Low
    } else {
        BreakingRank::High
    };
    Ok(())
}

// Alias targets are entity ids. A target the snapshot does not contain
// lives outside the package and is ranked as external.

fn add_alias(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    _old: &ApiSnapshot,
    new: &ApiSnapshot,
) -> Result<()> {
    let name = require_data(entry, "name")?.to_string();
    let target = require_data(entry, "target")?.to_string();

    entry.rank = BreakingRank::Compatible;
    if !new.contains(&target) {
        entry.push_message(format!("Add external alias: {name} -> {target}"));
    }
    Ok(())
}

fn remove_alias(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    old: &ApiSnapshot,
    _new: &ApiSnapshot,
) -> Result<()> {
    let owner_private = entry
        .old
        .as_ref()
        .or_error(|| ApiDiffError::missing_entity(entry.kind(), "old"))?
        .private;
    let name = require_data(entry, "name")?.to_string();
    let target = require_data(entry, "target")?.to_string();

    entry.rank = if owner_private || is_private_name(&name) {
        BreakingRank::Low
    } else {
        BreakingRank::High
    };
    if !old.contains(&target) {
        entry.rank = BreakingRank::Low;
        entry.push_message(format!("Remove external alias: {name} -> {target}"));
    }
    Ok(())
}

fn change_alias(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    old: &ApiSnapshot,
    new: &ApiSnapshot,
) -> Result<()> {
    let name = require_data(entry, "name")?.to_string();
    let old_target = require_data(entry, "old")?.to_string();
    let new_target = require_data(entry, "new")?.to_string();

    // Retargeting cannot be judged from ids alone.
    entry.rank = BreakingRank::Unknown;
    if !old.contains(&old_target) && !new.contains(&new_target) {
        entry.push_message(format!(
            "Change external alias: {name}: {old_target} -> {new_target}"
        ));
    }
    Ok(())
}

fn add_function(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    _old: &ApiSnapshot,
    _new: &ApiSnapshot,
) -> Result<()> {
    let function = require_new(entry, EntityKind::Function)?.clone();
    entry.rank = BreakingRank::Compatible;
    if function.scope != ItemScope::Static {
        entry.push_message(format!(
            "Add method ({}): {}",
            function.parent_label(),
            function.name
        ));
    }
    Ok(())
}

fn remove_function(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    _old: &ApiSnapshot,
    _new: &ApiSnapshot,
) -> Result<()> {
    let function = require_old(entry, EntityKind::Function)?.clone();
    entry.rank = public_or_low(&function);
    if function.scope != ItemScope::Static {
        entry.push_message(format!(
            "Remove method ({}): {}",
            function.parent_label(),
            function.name
        ));
    }
    Ok(())
}

fn add_attribute(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    _old: &ApiSnapshot,
    _new: &ApiSnapshot,
) -> Result<()> {
    let attribute = require_new(entry, EntityKind::Attribute)?.clone();
    entry.rank = BreakingRank::Compatible;
    if attribute.scope == ItemScope::Instance {
        entry.push_message(format!(
            "Add instance attribute ({}): {}",
            attribute.parent_label(),
            attribute.name
        ));
    }
    Ok(())
}

fn remove_attribute(
    entry: &mut DiffEntry,
    _diff: &ApiDifference,
    _old: &ApiSnapshot,
    _new: &ApiSnapshot,
) -> Result<()> {
    let attribute = require_old(entry, EntityKind::Attribute)?.clone();
    entry.rank = public_or_low(&attribute);
    if attribute.scope == ItemScope::Instance {
        entry.push_message(format!(
            "Remove instance attribute ({}): {}",
            attribute.parent_label(),
            attribute.name
        ));
    }
    Ok(())
}

fn public_or_low(entity: &EntityRecord) -> BreakingRank {
    if entity.private {
        BreakingRank::Low
    } else {
        BreakingRank::High
    }
}

fn require_data<'a>(entry: &'a DiffEntry, field: &str) -> Result<&'a str> {
    entry.data_str(field).or_error(|| {
        ApiDiffError::evaluation(
            format!("record {}", entry.kind()),
            EvaluationErrorKind::MissingData {
                kind: entry.kind().to_string(),
                field: field.to_string(),
            },
        )
    })
}

fn require_old(entry: &DiffEntry, kind: EntityKind) -> Result<&EntityRecord> {
    require(entry, entry.old.as_ref(), "old", kind)
}

fn require_new(entry: &DiffEntry, kind: EntityKind) -> Result<&EntityRecord> {
    require(entry, entry.new.as_ref(), "new", kind)
}

fn require<'a>(
    entry: &DiffEntry,
    entity: Option<&'a EntityRecord>,
    side: &'static str,
    kind: EntityKind,
) -> Result<&'a EntityRecord> {
    let entity = entity.or_error(|| ApiDiffError::missing_entity(entry.kind(), side))?;
    if entity.kind != kind {
        return Err(ApiDiffError::evaluation(
            format!("record {}", entry.kind()),
            EvaluationErrorKind::UnexpectedEntityKind {
                kind: entry.kind().to_string(),
                expected: kind.to_string(),
                found: entity.kind.to_string(),
            },
        ));
    }
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate_in(
        entry: &mut DiffEntry,
        old: &ApiSnapshot,
        new: &ApiSnapshot,
    ) -> Result<usize> {
        default_rules().evaluate(entry, &ApiDifference::new("old", "new"), old, new)
    }

    fn alias(kind: &str, owner: EntityRecord, fields: &[(&str, &str)]) -> DiffEntry {
        let data = fields
            .iter()
            .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(*value)))
            .collect();
        DiffEntry::new(kind, Some(owner.clone()), Some(owner)).with_data(data)
    }

    fn evaluate(entry: &mut DiffEntry) -> Result<usize> {
        let diff = ApiDifference::new("old", "new");
        default_rules().evaluate(
            entry,
            &diff,
            &ApiSnapshot::new("old"),
            &ApiSnapshot::new("new"),
        )
    }

    #[test]
    fn test_stock_rank_rules() {
        let mut add = DiffEntry::new("AddModule", None, Some(EntityRecord::module("m")));
        evaluate(&mut add).unwrap();
        assert_eq!(add.rank, BreakingRank::Compatible);

        let mut removed_public =
            DiffEntry::new("RemoveClass", Some(EntityRecord::class("m.A")), None);
        evaluate(&mut removed_public).unwrap();
        assert_eq!(removed_public.rank, BreakingRank::High);

        let mut removed_private = DiffEntry::new(
            "RemoveClass",
            Some(EntityRecord::class("m._A").with_private(true)),
            None,
        );
        evaluate(&mut removed_private).unwrap();
        assert_eq!(removed_private.rank, BreakingRank::Low);
    }

    #[test]
    fn test_remove_method_message() {
        let method = EntityRecord::function("m.A.run").with_scope(ItemScope::Instance);
        let mut entry = DiffEntry::new("RemoveFunction", Some(method), None)
            .with_message("Remove function: m.A.run");
        evaluate(&mut entry).unwrap();

        assert_eq!(entry.rank, BreakingRank::High);
        assert_eq!(
            entry.messages,
            vec!["Remove function: m.A.run", "Remove method (m.A): run"]
        );
        assert_eq!(entry.kind(), "RemoveFunction");
    }

    #[test]
    fn test_private_function_removal_is_low() {
        let function = EntityRecord::function("m._helper").with_private(true);
        let mut entry = DiffEntry::new("RemoveFunction", Some(function), None);
        evaluate(&mut entry).unwrap();
        assert_eq!(entry.rank, BreakingRank::Low);
        assert!(entry.messages.is_empty());
    }

    #[test]
    fn test_attribute_rules() {
        let attr = EntityRecord::attribute("m.A.size").with_scope(ItemScope::Instance);
        let mut added = DiffEntry::new("AddAttribute", None, Some(attr.clone()));
        evaluate(&mut added).unwrap();
        assert_eq!(added.rank, BreakingRank::Compatible);
        assert_eq!(added.message(), Some("Add instance attribute (m.A): size"));

        let mut removed = DiffEntry::new("RemoveAttribute", Some(attr), None);
        evaluate(&mut removed).unwrap();
        assert_eq!(removed.rank, BreakingRank::High);
    }

    #[test]
    fn test_remove_base_class() {
        let class = EntityRecord::class("m.A");
        let base = |name: &str| {
            let mut data = indexmap::IndexMap::new();
            data.insert("name".to_string(), serde_json::Value::from(name));
            DiffEntry::new("RemoveBaseClass", Some(class.clone()), Some(class.clone()))
                .with_data(data)
        };

        let mut public_base = base("Base");
        evaluate(&mut public_base).unwrap();
        assert_eq!(public_base.rank, BreakingRank::High);

        let mut private_base = base("_Base");
        evaluate(&mut private_base).unwrap();
        assert_eq!(private_base.rank, BreakingRank::Low);
    }

    #[test]
    fn test_missing_entity_fails_fast() {
        let mut entry = DiffEntry::new("RemoveFunction", None, None);
        let err = evaluate(&mut entry).unwrap_err();
        assert!(matches!(
            err,
            ApiDiffError::Evaluation {
                source: EvaluationErrorKind::MissingEntity { side: "old", .. },
                ..
            }
        ));
    }

    #[test]
    fn test_wrong_entity_kind_fails_fast() {
        let mut entry = DiffEntry::new("AddFunction", None, Some(EntityRecord::class("m.A")));
        let err = evaluate(&mut entry).unwrap_err();
        assert!(matches!(
            err,
            ApiDiffError::Evaluation {
                source: EvaluationErrorKind::UnexpectedEntityKind { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_base_name_fails_fast() {
        let class = EntityRecord::class("m.A");
        let mut entry = DiffEntry::new("RemoveBaseClass", Some(class.clone()), Some(class));
        assert!(evaluate(&mut entry).is_err());
    }

    #[test]
    fn test_add_alias_to_internal_target() {
        let new = ApiSnapshot::from_entities("new", vec![EntityRecord::class("pkg.impl.Widget")])
            .unwrap();
        let mut entry = alias(
            "AddAlias",
            EntityRecord::module("pkg"),
            &[("name", "Widget"), ("target", "pkg.impl.Widget")],
        );
        evaluate_in(&mut entry, &ApiSnapshot::new("old"), &new).unwrap();

        assert_eq!(entry.rank, BreakingRank::Compatible);
        assert!(entry.messages.is_empty());
    }

    #[test]
    fn test_add_alias_to_missing_target_is_external() {
        let mut entry = alias(
            "AddAlias",
            EntityRecord::module("pkg"),
            &[("name", "OrderedDict"), ("target", "collections.OrderedDict")],
        );
        evaluate(&mut entry).unwrap();

        assert_eq!(entry.rank, BreakingRank::Compatible);
        assert_eq!(
            entry.message(),
            Some("Add external alias: OrderedDict -> collections.OrderedDict")
        );
        assert_eq!(entry.kind(), "AddAlias");
    }

    #[test]
    fn test_remove_alias_ranks() {
        let old = ApiSnapshot::from_entities("old", vec![EntityRecord::class("pkg.impl.Widget")])
            .unwrap();
        let new = ApiSnapshot::new("new");
        let fields = |name| [("name", name), ("target", "pkg.impl.Widget")];

        let mut public = alias("RemoveAlias", EntityRecord::module("pkg"), &fields("Widget"));
        evaluate_in(&mut public, &old, &new).unwrap();
        assert_eq!(public.rank, BreakingRank::High);
        assert!(public.messages.is_empty());

        let mut private_name =
            alias("RemoveAlias", EntityRecord::module("pkg"), &fields("_Widget"));
        evaluate_in(&mut private_name, &old, &new).unwrap();
        assert_eq!(private_name.rank, BreakingRank::Low);

        let mut private_owner = alias(
            "RemoveAlias",
            EntityRecord::module("pkg._impl").with_private(true),
            &fields("Widget"),
        );
        evaluate_in(&mut private_owner, &old, &new).unwrap();
        assert_eq!(private_owner.rank, BreakingRank::Low);
    }

    #[test]
    fn test_remove_alias_to_missing_target_is_low() {
        let mut entry = alias(
            "RemoveAlias",
            EntityRecord::module("pkg"),
            &[("name", "path"), ("target", "os.path")],
        );
        evaluate(&mut entry).unwrap();

        assert_eq!(entry.rank, BreakingRank::Low);
        assert_eq!(entry.message(), Some("Remove external alias: path -> os.path"));
    }

    #[test]
    fn test_change_alias() {
        let old = ApiSnapshot::from_entities("old", vec![EntityRecord::function("pkg.a.run")])
            .unwrap();
        let new = ApiSnapshot::from_entities("new", vec![EntityRecord::function("pkg.b.run")])
            .unwrap();
        let fields = [("name", "run"), ("old", "pkg.a.run"), ("new", "pkg.b.run")];

        let mut internal = alias("ChangeAlias", EntityRecord::module("pkg"), &fields);
        evaluate_in(&mut internal, &old, &new).unwrap();
        assert_eq!(internal.rank, BreakingRank::Unknown);
        assert!(internal.messages.is_empty());

        let mut external = alias("ChangeAlias", EntityRecord::module("pkg"), &fields);
        evaluate(&mut external).unwrap();
        assert_eq!(
            external.message(),
            Some("Change external alias: run: pkg.a.run -> pkg.b.run")
        );
    }

    #[test]
    fn test_alias_without_target_fails_fast() {
        let mut entry = alias("AddAlias", EntityRecord::module("pkg"), &[("name", "Widget")]);
        let err = evaluate(&mut entry).unwrap_err();
        assert!(matches!(
            err,
            ApiDiffError::Evaluation {
                source: EvaluationErrorKind::MissingData { ref field, .. },
                ..
            } if field == "target"
        ));

        let mut orphan = DiffEntry::new("RemoveAlias", None, None);
        assert!(evaluate(&mut orphan).is_err());
    }
}
