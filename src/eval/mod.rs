//! Evaluation phase: rules that annotate detected differences.
//!
//! An [`EvalRule`] wraps a checker and an optional kind filter. Rules live
//! side by side in a [`RuleRegistry`] and filter themselves, so rules for
//! every kind can share one registry.
//!
//! ```ignore
//! use apidiff::eval::{rank_at, EvalRule, RuleRegistry};
//! use apidiff::model::BreakingRank;
//!
//! let mut rules = RuleRegistry::new();
//! rules
//!     .add(rank_at("RemoveModule", BreakingRank::High, Some(BreakingRank::Low)))
//!     .add(EvalRule::new("", |entry, _, _, _| {
//!         entry.push_message(format!("reviewed: {}", entry.kind()));
//!         Ok(())
//!     }));
//! ```

mod catalogue;
mod rank;
mod rule;

pub use catalogue::{default_rules, member_rules, rank_rules};
pub use rank::rank_at;
pub use rule::{evalrule, EvalFn, EvalRule, KindFilter, RuleRegistry};
