//! Rank assignment rules.

use super::rule::EvalRule;
use crate::model::BreakingRank;

/// Rule that ranks every entry of `kind` at `rank`.
///
/// An empty `kind` applies the rule to every kind, as with [`EvalRule::new`].
/// When either referenced entity is private the entry is ranked at
/// `private_rank` instead, if one is given. An entry with no entity
/// references takes the public branch.
pub fn rank_at(
    kind: impl Into<String>,
    rank: BreakingRank,
    private_rank: Option<BreakingRank>,
) -> EvalRule {
    EvalRule::new(kind, move |entry, _, _, _| {
        entry.rank = if entry.touches_private() {
            private_rank.unwrap_or(rank)
        } else {
            rank
        };
        Ok(())
    })
}
