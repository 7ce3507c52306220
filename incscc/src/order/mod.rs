/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Order-maintenance structures.
//!
//! A [`DynamicOrder`] is a list of distinct `usize` elements supporting
//! insertion just before or after an existing element, removal, and
//! queries about the relative order of two elements. It is used by the
//! incremental algorithms as an online topological order over component
//! representatives.
//!
//! Three implementations cover a complexity/simplicity spectrum:
//! [`LinkedOrder`] (O(n) comparison), [`TreapOrder`] (O(log n)
//! comparison) and [`TwoLevelOrder`] (O(1) comparison, O(1) amortised
//! updates).

use crate::union_find::UnionFind;
use std::cmp::Ordering;

mod linked_list;
pub use linked_list::LinkedOrder;

mod treap;
pub use treap::TreapOrder;

mod two_level;
pub use two_level::TwoLevelOrder;

/// A mutable total order over distinct `usize` elements.
///
/// Elements are ids smaller than [`capacity`](DynamicOrder::capacity);
/// insertion points are addressed by an element already in the order.
///
/// # Panics
///
/// Inserting a present element, removing or comparing an absent one, and
/// asking for the first element of an empty order are invariant
/// violations and panic.
pub trait DynamicOrder {
    /// Appends `x` at the end of the order.
    fn insert_back(&mut self, x: usize);

    /// Inserts `x` just before `y`.
    fn insert_before(&mut self, x: usize, y: usize);

    /// Inserts `x` just after `y`.
    fn insert_after(&mut self, x: usize, y: usize);

    /// Removes `x` from the order.
    fn remove(&mut self, x: usize);

    /// Returns whether `x` occurs before `y`.
    fn is_before(&self, x: usize, y: usize) -> bool;

    /// Returns the maximum number of elements that can be present at the
    /// same time.
    fn capacity(&self) -> usize;

    /// Extends the capacity by one element slot.
    fn grow(&mut self);

    /// Returns the first element of the order.
    fn first(&self) -> usize;
}

/// Compares two present elements by their position in `order`.
pub fn cmp_in_order<O: DynamicOrder + ?Sized>(order: &O, x: usize, y: usize) -> Ordering {
    if x == y {
        Ordering::Equal
    } else if order.is_before(x, y) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Compares two elements by the position of their representatives in
/// `order`, collapsing elements of the same component and breaking ties
/// by id.
///
/// This is a strict weak ordering as long as only representatives are
/// present in the order.
pub fn cmp_components_in_order<O: DynamicOrder + ?Sized>(
    order: &O,
    union_find: &UnionFind,
    x: usize,
    y: usize,
) -> Ordering {
    let x_repr = union_find.representative(x);
    let y_repr = union_find.representative(y);
    if x_repr == y_repr {
        x.cmp(&y)
    } else if order.is_before(x_repr, y_repr) {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// A set of ids kept sorted under an external comparator.
///
/// The comparator is passed at each call instead of being stored, since
/// it typically closes over a [`DynamicOrder`] owned by the caller. The
/// set stays consistent as long as the relative order of its members is
/// not mutated while they are present, which is the contract all the
/// searches respect: order repairs happen only between traversals.
#[derive(Clone, Debug, Default)]
pub struct OrderedIdSet {
    ids: Vec<usize>,
}

impl OrderedIdSet {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Inserts `x`, keeping the set sorted; elements comparing equal to a
    /// present one are not inserted again.
    pub fn insert_by(&mut self, x: usize, mut cmp: impl FnMut(usize, usize) -> Ordering) {
        if let Err(i) = self.ids.binary_search_by(|&a| cmp(a, x)) {
            self.ids.insert(i, x);
        }
    }

    /// Removes `x` if present; returns whether it was.
    pub fn remove_by(&mut self, x: usize, mut cmp: impl FnMut(usize, usize) -> Ordering) -> bool {
        match self.ids.binary_search_by(|&a| cmp(a, x)) {
            Ok(i) => {
                self.ids.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains_by(&self, x: usize, mut cmp: impl FnMut(usize, usize) -> Ordering) -> bool {
        self.ids.binary_search_by(|&a| cmp(a, x)).is_ok()
    }

    /// The smallest element under the comparator.
    pub fn first(&self) -> Option<usize> {
        self.ids.first().copied()
    }

    /// The largest element under the comparator.
    pub fn last(&self) -> Option<usize> {
        self.ids.last().copied()
    }

    /// Removes and returns the smallest element.
    pub fn pop_first(&mut self) -> Option<usize> {
        if self.ids.is_empty() {
            None
        } else {
            Some(self.ids.remove(0))
        }
    }

    /// Removes and returns the largest element.
    pub fn pop_last(&mut self) -> Option<usize> {
        self.ids.pop()
    }

    /// The elements in increasing comparator order.
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Empties the set and returns its elements in increasing order.
    pub fn take(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.ids)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
