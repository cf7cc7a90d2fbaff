//! **Detect and rank changes between two versions of a library's public API.**
//!
//! `apidiff` compares two [`ApiSnapshot`]s in two phases:
//!
//! 1. **Detection**: every [`Constraint`] in a [`ConstraintRegistry`] looks at
//!    an old/new entity pair and emits [`DiffEntry`] records such as
//!    `RemoveModule` or `AddFunction`.
//! 2. **Evaluation**: every [`EvalRule`] in a [`RuleRegistry`] whose kind
//!    filter matches a record annotates it with a [`BreakingRank`] and
//!    messages. Rules run in registration order, so the last one wins.
//!
//! Snapshots are built by an external extractor; this crate only compares
//! them.
//!
//! ## Core Modules
//!
//! - **[`model`]**: entities, snapshots, difference records and ranks.
//! - **[`diff`]**: constraints, the stock detection catalogue and the [`DiffEngine`].
//! - **[`eval`]**: evaluation rules, [`rank_at`] and the stock rule catalogue.
//! - **[`config`]**: [`EngineConfig`], validation and `.apidiff.yaml` discovery.
//!
//! ## Getting Started
//!
//! ```
//! use apidiff::{ApiSnapshot, BreakingRank, DiffEngine, EntityRecord};
//!
//! fn main() -> apidiff::Result<()> {
//!     let old = ApiSnapshot::from_entities(
//!         "mylib@1",
//!         [EntityRecord::module("mylib"), EntityRecord::module("mylib.legacy")],
//!     )?;
//!     let new = ApiSnapshot::from_entities("mylib@2", [EntityRecord::module("mylib")])?;
//!
//!     let diff = DiffEngine::new().diff(&old, &new)?;
//!     let removed = diff.kind("RemoveModule").next().map(|entry| entry.rank);
//!     assert_eq!(removed, Some(BreakingRank::High));
//!     Ok(())
//! }
//! ```
//!
//! ## Overriding Ranks
//!
//! Rank overrides from configuration are registered after the stock rules:
//!
//! ```no_run
//! use std::path::Path;
//! use apidiff::DiffEngine;
//!
//! fn main() -> apidiff::Result<()> {
//!     let engine = DiffEngine::from_config_file(Path::new(".apidiff.yaml"))?;
//!     println!("{} rules registered", engine.rules().len());
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    // Doc completeness: # Errors sections are aspirational
    clippy::missing_errors_doc,
    // Variable names like `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod config;
pub mod diff;
pub mod error;
pub mod eval;
pub mod model;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigPreset, EngineConfig, EngineConfigBuilder, RankOverride};
pub use config::{load_or_default, Validatable};
pub use diff::{Constraint, ConstraintRegistry, DiffEngine, Direction, Finding};
pub use error::{ApiDiffError, ErrorContext, OptionContext, Result};
pub use eval::{evalrule, rank_at, EvalRule, KindFilter, RuleRegistry};
pub use model::{
    ApiDifference, ApiSnapshot, BreakingRank, DiffEntry, DiffSummary, EntityKind, EntityRecord,
    ItemScope,
};
