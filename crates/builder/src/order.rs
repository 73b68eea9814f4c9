//! Descending transverse-momentum order.

use evflat_core::TransverseMomentum;
use std::cmp::Ordering;

/// `a` precedes `b` iff `a.pt > b.pt`. Used with a stable sort, so equal
/// pT keeps input order. `NaN` ranks after every real value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PtDescendingOrder;

impl PtDescendingOrder {
    pub fn compare<T: TransverseMomentum + ?Sized>(a: &T, b: &T) -> Ordering {
        let (pa, pb) = (a.pt(), b.pt());
        match (pa.is_nan(), pb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => pb.partial_cmp(&pa).unwrap_or(Ordering::Equal),
        }
    }

    /// Borrowing, stably sorted view of `items`. The input is untouched.
    pub fn sorted<T: TransverseMomentum>(items: &[T]) -> Vec<&T> {
        let mut view: Vec<&T> = items.iter().collect();
        view.sort_by(|a, b| Self::compare(*a, *b));
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Obj {
        pt: f64,
        tag: u8,
    }

    impl TransverseMomentum for Obj {
        fn pt(&self) -> f64 {
            self.pt
        }
    }

    fn obj(pt: f64, tag: u8) -> Obj {
        Obj { pt, tag }
    }

    #[test]
    fn sorts_descending() {
        let items = vec![obj(1.0, 0), obj(30.0, 1), obj(7.5, 2)];
        let tags: Vec<u8> = PtDescendingOrder::sorted(&items).iter().map(|o| o.tag).collect();
        assert_eq!(tags, vec![1, 2, 0]);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = vec![obj(5.0, 0), obj(9.0, 1), obj(5.0, 2), obj(5.0, 3), obj(9.0, 4)];
        let tags: Vec<u8> = PtDescendingOrder::sorted(&items).iter().map(|o| o.tag).collect();
        assert_eq!(tags, vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn nan_sorts_last() {
        let items = vec![obj(f64::NAN, 0), obj(2.0, 1), obj(f64::INFINITY, 2)];
        let tags: Vec<u8> = PtDescendingOrder::sorted(&items).iter().map(|o| o.tag).collect();
        assert_eq!(tags, vec![2, 1, 0]);
    }

    #[test]
    fn input_is_not_mutated() {
        let items = vec![obj(1.0, 0), obj(2.0, 1)];
        let _ = PtDescendingOrder::sorted(&items);
        assert_eq!(items[0].tag, 0);
    }
}
