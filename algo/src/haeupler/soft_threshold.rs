/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{BidiSearch, SideEvents};
use crate::framework::{Core, Direction, IncrementalSccs};
use incscc::order::DynamicOrder;
use incscc::rng;

use Direction::{Backward, Forward};

/// An insertion-ordered id list with O(1) membership, insertion and
/// removal, threaded through per-id link slots.
#[derive(Clone, Debug)]
struct IndexedList {
    next: Vec<Option<usize>>,
    prev: Vec<Option<usize>>,
    present: Vec<bool>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl IndexedList {
    fn new(num_nodes: usize) -> Self {
        Self {
            next: vec![None; num_nodes],
            prev: vec![None; num_nodes],
            present: vec![false; num_nodes],
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Appends `id`; does nothing if it is already present.
    fn insert(&mut self, id: usize) {
        if self.present[id] {
            return;
        }
        self.prev[id] = self.tail;
        self.next[id] = None;
        match self.tail {
            Some(t) => self.next[t] = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.present[id] = true;
        self.len += 1;
    }

    /// Removes `id`; does nothing if it is absent.
    fn remove(&mut self, id: usize) {
        if !self.present[id] {
            return;
        }
        match self.prev[id] {
            Some(p) => self.next[p] = self.next[id],
            None => self.head = self.next[id],
        }
        match self.next[id] {
            Some(n) => self.prev[n] = self.prev[id],
            None => self.tail = self.prev[id],
        }
        self.next[id] = None;
        self.prev[id] = None;
        self.present[id] = false;
        self.len -= 1;
    }

    fn clear(&mut self) {
        let mut current = self.head;
        while let Some(id) = current {
            current = self.next[id];
            self.next[id] = None;
            self.prev[id] = None;
            self.present[id] = false;
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn front(&self) -> usize {
        self.head.expect("front of an empty list")
    }

    fn to_vec(&self) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.len);
        let mut current = self.head;
        while let Some(id) = current {
            ids.push(id);
            current = self.next[id];
        }
        ids
    }

    fn choose_random(&self) -> usize {
        assert!(self.len > 0, "cannot choose a random id from an empty list");
        let mut index = rng::random_range(0..self.len);
        let mut current = self.head.unwrap();
        while index > 0 {
            current = self.next[current].unwrap();
            index -= 1;
        }
        current
    }
}

/// Per-direction vertex pools of the soft-threshold policy.
#[derive(Clone, Debug)]
struct SideLists {
    active: IndexedList,
    passive: IndexedList,
}

impl SideLists {
    fn new(num_nodes: usize) -> Self {
        Self {
            active: IndexedList::new(num_nodes),
            passive: IndexedList::new(num_nodes),
        }
    }

    fn clear(&mut self) {
        self.active.clear();
        self.passive.clear();
    }
}

/// The soft-threshold search, O(m^{3/2}) total time.
///
/// Each side consumes the front of its active list; a forward vertex
/// ordered before the backward one triggers a paired search step, and a
/// misordered vertex is demoted to passive. When a side's active list
/// empties, the other side's passive pool is discarded, a new threshold
/// is sampled uniformly from this side's passive pool, and passive
/// vertices on the correct side of the threshold are promoted back to
/// active. The `forward == threshold == backward` case, which the paper
/// leaves out, demotes the forward vertex.
pub struct SoftThresholdSearch<O: DynamicOrder> {
    search: BidiSearch<O>,
    forward: SideLists,
    backward: SideLists,
}

impl<O: DynamicOrder> SoftThresholdSearch<O> {
    pub fn new(num_nodes: usize, order: O) -> Self {
        assert!(order.capacity() >= num_nodes);
        Self {
            search: BidiSearch::new(num_nodes, order),
            forward: SideLists::new(num_nodes),
            backward: SideLists::new(num_nodes),
        }
    }

    fn apply_events(&mut self, forward: SideEvents, backward: SideEvents) {
        if let Some(vertex) = forward.activated {
            self.forward.active.insert(vertex);
        }
        if let Some(vertex) = forward.deactivated {
            self.forward.active.remove(vertex);
        }
        if let Some(vertex) = backward.activated {
            self.backward.active.insert(vertex);
        }
        if let Some(vertex) = backward.deactivated {
            self.backward.active.remove(vertex);
        }
    }

    fn should_promote(order: &O, dir: Direction, candidate: usize, threshold: usize) -> bool {
        candidate == threshold
            || match dir {
                Forward => order.is_before(candidate, threshold),
                Backward => order.is_before(threshold, candidate),
            }
    }

    /// When `dir`'s active list has emptied, clears the other side's
    /// passive pool, resamples the threshold from `dir`'s passive pool
    /// and promotes its members on the correct side of it.
    fn refill_active(&mut self, dir: Direction, threshold: &mut usize) {
        let (own, other) = match dir {
            Forward => (&mut self.forward, &mut self.backward),
            Backward => (&mut self.backward, &mut self.forward),
        };
        if !own.active.is_empty() {
            return;
        }

        other.passive.clear();
        other.active.remove(*threshold);
        if own.passive.is_empty() {
            return;
        }

        *threshold = own.passive.choose_random();
        for candidate in own.passive.to_vec() {
            if Self::should_promote(&self.search.order, dir, candidate, *threshold) {
                own.passive.remove(candidate);
                own.active.insert(candidate);
            }
        }
    }
}

impl<O: DynamicOrder> IncrementalSccs for SoftThresholdSearch<O> {
    fn core(&self) -> &Core {
        &self.search.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.search.core
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        let Some(((u, v), forward, backward)) = self.search.begin_step(u, v) else {
            return;
        };
        self.apply_events(forward, backward);

        let mut threshold = u;
        while !self.forward.active.is_empty() && !self.backward.active.is_empty() {
            let forward_vertex = self.forward.active.front();
            let backward_vertex = self.backward.active.front();

            if self.search.order.is_before(forward_vertex, backward_vertex) {
                let (forward, backward) = self.search.search_step(forward_vertex, backward_vertex);
                self.apply_events(forward, backward);
            } else {
                if self.search.order.is_before(threshold, forward_vertex)
                    || (threshold == forward_vertex && threshold == backward_vertex)
                {
                    self.forward.active.remove(forward_vertex);
                    self.forward.passive.insert(forward_vertex);
                }
                if self.search.order.is_before(backward_vertex, threshold) {
                    self.backward.active.remove(backward_vertex);
                    self.backward.passive.insert(backward_vertex);
                }
            }

            self.refill_active(Forward, &mut threshold);
            self.refill_active(Backward, &mut threshold);
        }

        self.search.finish_step(u, v);
        self.forward.clear();
        self.backward.clear();
    }

    fn postprocess_arc(&mut self, u: usize, v: usize) {
        self.search.add_arcs_for(u, v);
    }
}
