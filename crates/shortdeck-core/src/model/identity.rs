// ── Identity & merge primitives ──
//
// Entity identity and conflict resolution shared by both collection
// engines. Everything here is pure and allocation-free apart from the
// new list built by `replace_matching`.

use std::sync::Arc;

/// An entity with an identity key.
///
/// Two values are the same logical entity iff their keys are equal. The key
/// is borrowed so comparisons never allocate.
pub trait Identified {
    type Key<'a>: PartialEq
    where
        Self: 'a;

    fn identity(&self) -> Self::Key<'_>;
}

/// Structural equality over the identity key only.
pub fn same_entity<T: Identified>(a: &T, b: &T) -> bool {
    a.identity() == b.identity()
}

/// Monotonic merge for counters: never regresses under out-of-order or
/// duplicate delivery.
pub fn merge_count(current: u64, incoming: u64) -> u64 {
    current.max(incoming)
}

/// Rebuild `list`, passing every element that satisfies `predicate` through
/// `updater` and keeping all others as-is. Order is preserved.
///
/// `updater` returning `None` drops the element, so removal is expressed with
/// the same primitive as replacement. Untouched elements are the same `Arc`s
/// as in the input.
pub fn replace_matching<T, P, U>(list: &[Arc<T>], predicate: P, mut updater: U) -> Vec<Arc<T>>
where
    P: Fn(&T) -> bool,
    U: FnMut(&Arc<T>) -> Option<Arc<T>>,
{
    list.iter()
        .filter_map(|item| {
            if predicate(item) {
                updater(item)
            } else {
                Some(Arc::clone(item))
            }
        })
        .collect()
}
