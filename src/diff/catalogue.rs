//! Stock addition/removal constraints for every entity kind.

use super::constraint::{add, remove, Constraint, ConstraintRegistry, Direction};
use crate::model::EntityKind;

/// `Add<Kind>` and `Remove<Kind>` constraints for one entity kind.
#[must_use]
pub fn presence_constraints(kind: EntityKind) -> [Constraint; 2] {
    [
        Constraint::new(format!("{}{}", Direction::Addition.verb(), kind.name()), add)
            .for_type(kind, Direction::Addition),
        Constraint::new(format!("{}{}", Direction::Removal.verb(), kind.name()), remove)
            .for_type(kind, Direction::Removal),
    ]
}

/// Module constraints: `AddModule`, `RemoveModule`.
#[must_use]
pub fn module_constraints() -> ConstraintRegistry {
    registry_for(EntityKind::Module)
}

/// Class constraints: `AddClass`, `RemoveClass`.
#[must_use]
pub fn class_constraints() -> ConstraintRegistry {
    registry_for(EntityKind::Class)
}

/// Function constraints: `AddFunction`, `RemoveFunction`.
#[must_use]
pub fn function_constraints() -> ConstraintRegistry {
    registry_for(EntityKind::Function)
}

/// Attribute constraints: `AddAttribute`, `RemoveAttribute`.
#[must_use]
pub fn attribute_constraints() -> ConstraintRegistry {
    registry_for(EntityKind::Attribute)
}

/// All stock constraints, grouped by entity kind.
#[must_use]
pub fn default_constraints() -> ConstraintRegistry {
    let mut registry = module_constraints();
    registry.extend(class_constraints());
    registry.extend(function_constraints());
    registry.extend(attribute_constraints());
    registry
}

fn registry_for(kind: EntityKind) -> ConstraintRegistry {
    let mut registry = ConstraintRegistry::new();
    for constraint in presence_constraints(kind) {
        registry.add(constraint);
    }
    registry
}
