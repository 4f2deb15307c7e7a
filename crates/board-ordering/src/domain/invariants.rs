//! Domain invariants for board ordering

use board_types::ItemRecord;
use std::collections::HashSet;

/// INVARIANT-1: Contiguity
/// The orders of a scope with n items are exactly `{0, …, n-1}`.
pub fn invariant_contiguous<I>(orders: I) -> bool
where
    I: IntoIterator<Item = u32>,
{
    let mut seen = HashSet::new();
    let mut count: u64 = 0;
    let mut max: Option<u32> = None;

    for order in orders {
        if !seen.insert(order) {
            return false;
        }
        count += 1;
        max = Some(max.map_or(order, |m| m.max(order)));
    }

    match max {
        None => true,
        Some(max) => u64::from(max) + 1 == count,
    }
}

/// INVARIANT-1 over the records of one scope.
pub fn invariant_scope_contiguous(records: &[ItemRecord]) -> bool {
    invariant_contiguous(records.iter().map(|r| r.order))
}
