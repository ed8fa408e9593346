//! Rank assignment for orderable collections (categories, nav items and
//! quick links). Ranks are caller-assigned integers; batch updates are
//! applied by the owning service inside a single transaction.

use serde::Deserialize;
use uuid::Uuid;

/// Resolve the rank for a new row. An explicit non-negative value (zero
/// included) is preserved verbatim; otherwise the row lands after the
/// current maximum of its scope, starting at 1 for an empty scope.
pub fn assign_order(explicit: Option<i32>, current_max: Option<i32>) -> i32 {
    match explicit {
        Some(value) if value >= 0 => value,
        _ => current_max.unwrap_or(0) + 1,
    }
}

/// One entry of a batch reorder payload: `[{id, order}, ...]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderPair {
    pub id: Uuid,
    pub order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_rank_is_preserved() {
        assert_eq!(assign_order(Some(5), Some(9)), 5);
    }

    #[test]
    fn explicit_zero_is_a_valid_rank() {
        assert_eq!(assign_order(Some(0), Some(9)), 0);
    }

    #[test]
    fn missing_rank_appends_after_max() {
        assert_eq!(assign_order(None, Some(4)), 5);
    }

    #[test]
    fn empty_scope_starts_at_one() {
        assert_eq!(assign_order(None, None), 1);
    }

    #[test]
    fn negative_rank_falls_back_to_default() {
        assert_eq!(assign_order(Some(-1), Some(4)), 5);
    }
}
