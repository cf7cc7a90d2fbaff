//! Detection phase and the engine that drives both phases.
//!
//! A [`Constraint`] recognizes the addition or removal of one entity kind.
//! The [`ConstraintRegistry`] keeps constraints for every kind in one list;
//! the [`DiffEngine`] pairs entities across two snapshots, runs the
//! constraints for each pair, then hands the records to the rule registry.
//!
//! ```ignore
//! use apidiff::diff::{Constraint, ConstraintRegistry, DiffEngine, Direction, Finding};
//! use apidiff::model::EntityKind;
//!
//! let constraints = ConstraintRegistry::new().with(
//!     Constraint::new("RemoveModule", |old, _, _, _| {
//!         Ok(old.map(|m| Finding::new(format!("gone: {}", m.id))).into_iter().collect())
//!     })
//!     .for_type(EntityKind::Module, Direction::Removal),
//! );
//! let engine = DiffEngine::new().with_constraints(constraints);
//! let diff = engine.diff(&old_snapshot, &new_snapshot)?;
//! ```

mod catalogue;
mod constraint;
mod engine;

pub use catalogue::{
    attribute_constraints, class_constraints, default_constraints, function_constraints,
    module_constraints, presence_constraints,
};
pub use constraint::{add, remove, Constraint, ConstraintFn, ConstraintRegistry, Direction, Finding};
pub use engine::DiffEngine;
