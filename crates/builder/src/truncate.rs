//! Capacity truncation of ordered collections.
//!
//! Truncation never reorders: the caller establishes order first (see
//! [`crate::PtDescendingOrder`] for tracks) and truncation keeps a prefix.

use evflat_core::Capped;

/// A borrowed prefix of a collection together with its full length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Truncated<'a, T> {
    pub stored: &'a [T],
    pub total: usize,
}

impl<'a, T> Truncated<'a, T> {
    /// Project the retained entries into an owned [`Capped`] collection.
    pub fn project<U>(self, f: impl FnMut(&'a T) -> U) -> Capped<U> {
        Capped {
            total: self.total,
            stored: self.stored.iter().map(f).collect(),
        }
    }
}

/// Keep the first `capacity` entries of `items`; `total` is always `items.len()`.
pub fn truncate<T>(items: &[T], capacity: usize) -> Truncated<'_, T> {
    Truncated {
        stored: &items[..items.len().min(capacity)],
        total: items.len(),
    }
}

/// A truncation policy bound to one object kind's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionTruncator {
    capacity: usize,
}

impl CollectionTruncator {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn truncate<'a, T>(&self, items: &'a [T]) -> Truncated<'a, T> {
        truncate(items, self.capacity)
    }
}
