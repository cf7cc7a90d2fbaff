//! Data model shared by detection and evaluation.
//!
//! - [`EntityRecord`] / [`ApiSnapshot`]: one version of an API surface,
//!   built by an external extractor and treated as read-only here.
//! - [`DiffEntry`] / [`ApiDifference`]: the changes detected between two
//!   snapshots, ranked by [`BreakingRank`].

mod difference;
mod entity;
mod snapshot;

pub use difference::*;
pub use entity::*;
pub use snapshot::*;
