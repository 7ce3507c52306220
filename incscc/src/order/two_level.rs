/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::DynamicOrder;

const NIL: usize = usize::MAX;

const LOG_MAX: u64 = 62;
const MAX_LABEL: u64 = 1 << LOG_MAX;
const MIN_STEP_SIZE: u64 = MAX_LABEL / (LOG_MAX + 1);

fn ceil_div(x: u64, y: u64) -> u64 {
    (x + y - 1) / y
}

#[derive(Clone, Debug, Default)]
struct Upper {
    label: u64,
    next: usize,
    prev: usize,
}

#[derive(Clone, Debug, Default)]
struct Lower {
    label: u64,
    next: usize,
    prev: usize,
    parent: usize,
}

/// Two-level labelling in the style of Dietz and Sleator.
///
/// The order is a list of lower nodes partitioned into runs, each run
/// hanging off an upper node; upper nodes carry integer labels in
/// `[0, 2^62)` and lower labels are local to their parent. Comparing two
/// elements compares the upper labels and, on a tie, the lower labels, so
/// [`is_before`](DynamicOrder::is_before) is O(1); insertions relabel a
/// bounded window and are O(1) amortised.
///
/// Both levels are arena-allocated and linked by handles. Lower slots are
/// fixed (element `x` lives in slot `x + 2`, after the two sentinels);
/// upper slots freed by the removal of their last child are recycled.
#[derive(Clone, Debug)]
pub struct TwoLevelOrder {
    upper: Vec<Upper>,
    free_upper: Vec<usize>,
    lower: Vec<Lower>,
    present: Vec<bool>,
}

/// Sentinel slots in the lower arena.
const HEAD: usize = 0;
const TAIL: usize = 1;

impl TwoLevelOrder {
    /// Creates an order over `n` elements, initially containing
    /// `0, 1, …, n - 1` in this sequence.
    pub fn new(n: usize) -> Self {
        let upper = vec![
            Upper {
                label: 0,
                next: 1,
                prev: NIL,
            },
            Upper {
                label: MAX_LABEL - 1,
                next: NIL,
                prev: 0,
            },
        ];
        let mut lower = vec![Lower::default(); n + 2];
        lower[HEAD] = Lower {
            label: 0,
            next: TAIL,
            prev: NIL,
            parent: 0,
        };
        lower[TAIL] = Lower {
            label: MAX_LABEL - 1,
            next: NIL,
            prev: HEAD,
            parent: 1,
        };
        let mut order = Self {
            upper,
            free_upper: Vec::new(),
            lower,
            present: vec![false; n],
        };
        for x in (0..n).rev() {
            order.present[x] = true;
            order.lower_insert_after(HEAD, x);
        }
        order
    }

    fn assure_present(&self, x: usize) {
        if !self.present[x] {
            panic!("Element does not exist: {}", x);
        }
    }

    fn assure_absent(&self, x: usize) {
        if self.present[x] {
            panic!("Element already exists: {}", x);
        }
    }

    fn alloc_upper(&mut self, node: Upper) -> usize {
        match self.free_upper.pop() {
            Some(slot) => {
                self.upper[slot] = node;
                slot
            }
            None => {
                self.upper.push(node);
                self.upper.len() - 1
            }
        }
    }

    /// Inserts a fresh upper node after `a`, first relabelling successors
    /// of `a` so that the `k`-th one is at least `k²` away.
    fn upper_insert_after(&mut self, a: usize) -> usize {
        let a_label = self.upper[a].label;
        let mut current = self.upper[a].next;
        let mut j: u64 = 1;
        while current != NIL && self.upper[current].label - a_label <= j * j {
            j += 1;
            current = self.upper[current].next;
        }
        let mul = if current != NIL {
            ceil_div(self.upper[current].label - a_label, j)
        } else {
            ceil_div(MAX_LABEL - 1 - a_label, j)
        };

        let mut current = self.upper[a].next;
        for k in 1..j {
            self.upper[current].label = a_label + mul * k;
            current = self.upper[current].next;
        }

        let next = self.upper[a].next;
        let new_label = ceil_div(a_label + self.upper[next].label, 2);
        let slot = self.alloc_upper(Upper {
            label: new_label,
            next,
            prev: a,
        });
        self.upper[next].prev = slot;
        self.upper[a].next = slot;
        slot
    }

    /// Unlinks an upper node that has lost its last child.
    fn upper_remove(&mut self, p: usize) {
        let prev = self.upper[p].prev;
        if prev == NIL {
            return;
        }
        let next = self.upper[p].next;
        if next != NIL {
            self.upper[next].prev = prev;
        }
        self.upper[prev].next = next;
        self.free_upper.push(p);
    }

    /// Inserts element `x` right after the lower node in slot `y_slot`.
    fn lower_insert_after(&mut self, y_slot: usize, x: usize) {
        let x_slot = x + 2;
        let parent = self.lower[y_slot].parent;
        let y_next = self.lower[y_slot].next;

        let mut next_label = MAX_LABEL;
        self.lower[x_slot] = Lower {
            label: 0,
            next: y_next,
            prev: y_slot,
            parent,
        };
        if y_next != NIL {
            self.lower[y_next].prev = x_slot;
            if parent == self.lower[y_next].parent {
                next_label = self.lower[y_next].label;
            }
        }
        self.lower[y_slot].next = x_slot;

        let y_label = self.lower[y_slot].label;
        if next_label != y_label + 1 {
            self.lower[x_slot].label = ((y_label + next_label) / 2).min(y_label + LOG_MAX);
            return;
        }

        // No room: spread the whole same-parent run evenly, spilling at
        // most LOG_MAX nodes per parent and opening fresh upper nodes as
        // needed.
        let mut run_len: u64 = 1;
        let mut begin = y_slot;
        while self.lower[begin].prev != NIL && self.lower[self.lower[begin].prev].parent == parent {
            begin = self.lower[begin].prev;
            run_len += 1;
        }
        let mut end = y_slot;
        while self.lower[end].next != NIL && self.lower[self.lower[end].next].parent == parent {
            end = self.lower[end].next;
            run_len += 1;
        }
        end = self.lower[end].next;

        let mut current = begin;
        let mut current_parent = parent;
        loop {
            let step_size = MIN_STEP_SIZE.max(MAX_LABEL / (run_len + 1));
            let mut processed = 0;
            let mut label = step_size;
            while label < MAX_LABEL && processed < LOG_MAX {
                if current == end {
                    return;
                }
                self.lower[current].label = label;
                self.lower[current].parent = current_parent;
                current = self.lower[current].next;
                run_len -= 1;
                label += step_size;
                processed += 1;
            }
            if current == end {
                return;
            }
            current_parent = self.upper_insert_after(current_parent);
        }
    }
}

impl DynamicOrder for TwoLevelOrder {
    fn insert_back(&mut self, x: usize) {
        self.assure_absent(x);
        self.present[x] = true;
        self.lower_insert_after(self.lower[TAIL].prev, x);
    }

    fn insert_before(&mut self, x: usize, y: usize) {
        self.assure_absent(x);
        self.assure_present(y);
        self.present[x] = true;
        self.lower_insert_after(self.lower[y + 2].prev, x);
    }

    fn insert_after(&mut self, x: usize, y: usize) {
        self.assure_absent(x);
        self.assure_present(y);
        self.present[x] = true;
        self.lower_insert_after(y + 2, x);
    }

    fn remove(&mut self, x: usize) {
        self.assure_present(x);
        let x_slot = x + 2;
        let next = self.lower[x_slot].next;
        let prev = self.lower[x_slot].prev;
        let parent = self.lower[x_slot].parent;
        let mut unique_parent = true;
        if next != NIL {
            self.lower[next].prev = prev;
            unique_parent = self.lower[next].parent != parent;
        }
        if prev != NIL {
            self.lower[prev].next = next;
            unique_parent &= self.lower[prev].parent != parent;
        }
        if unique_parent {
            self.upper_remove(parent);
        }
        self.present[x] = false;
    }

    fn is_before(&self, x: usize, y: usize) -> bool {
        self.assure_present(x);
        self.assure_present(y);
        let x_slot = x + 2;
        let y_slot = y + 2;
        let x_key = (
            self.upper[self.lower[x_slot].parent].label,
            self.lower[x_slot].label,
        );
        let y_key = (
            self.upper[self.lower[y_slot].parent].label,
            self.lower[y_slot].label,
        );
        x_key < y_key
    }

    fn capacity(&self) -> usize {
        self.present.len()
    }

    fn grow(&mut self) {
        self.present.push(false);
        self.lower.push(Lower::default());
    }

    fn first(&self) -> usize {
        let slot = self.lower[HEAD].next;
        if slot == TAIL {
            panic!("Cannot retrieve the first element from an empty order");
        }
        slot - 2
    }
}
