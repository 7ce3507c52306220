/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::framework::{Core, IncrementalSccs};
use crate::Arc;
use std::collections::{BTreeSet, HashMap};

/// The out-heap of a vertex: `(level, successor)` pairs, minimum first,
/// with an id→level side map for removals by id.
///
/// Re-inserting a successor at a new level overwrites the side map but
/// leaves the old pair in the set; such stale pairs may later surface
/// from [`pop_up_to`](OutHeap::pop_up_to) and be processed again as
/// candidates. The level-bump accounting absorbs this.
#[derive(Clone, Debug, Default)]
struct OutHeap {
    pairs: BTreeSet<(usize, usize)>,
    level_of: HashMap<usize, usize>,
}

impl OutHeap {
    fn insert(&mut self, vertex: usize, level: usize) {
        self.pairs.insert((level, vertex));
        self.level_of.insert(vertex, level);
    }

    fn remove(&mut self, vertex: usize) {
        if let Some(level) = self.level_of.remove(&vertex) {
            self.pairs.remove(&(level, vertex));
        }
    }

    /// Pops pairs whose stored level does not exceed `level`, appending
    /// them to `candidates` as arcs from `source`.
    fn pop_up_to(&mut self, source: usize, level: usize, candidates: &mut Vec<Arc>) {
        while let Some(&(pair_level, vertex)) = self.pairs.iter().next() {
            if pair_level > level {
                break;
            }
            self.pairs.remove(&(pair_level, vertex));
            if self.level_of.get(&vertex) == Some(&pair_level) {
                self.level_of.remove(&vertex);
            }
            candidates.push((source, vertex));
        }
    }

    /// The pairs in ascending `(level, id)` order.
    fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }
}

/// The one-way search, O(n²·log²n) total time.
///
/// Levels start at 1. Arcs whose source level dominates trigger a
/// forward component search; afterwards, candidate arcs drained from the
/// out-heaps are charged against per-span counters (`span =
/// ⌊log₂ min(level gap, indegree)⌋`): the `3·2^s`-th hit of a span lifts
/// the level to at least `bound + 2^s`, which amortises the total
/// level-bump work.
pub struct OneWaySearch {
    core: Core,
    level: Vec<usize>,
    bound: Vec<Vec<usize>>,
    count: Vec<Vec<usize>>,
    ins: Vec<BTreeSet<usize>>,
    outs: Vec<BTreeSet<usize>>,
    heap: Vec<OutHeap>,
    component: Vec<usize>,
    in_component: Vec<usize>,
}

fn log2_floor(x: usize) -> usize {
    debug_assert!(x > 0);
    (usize::BITS - 1 - x.leading_zeros()) as usize
}

impl OneWaySearch {
    pub fn new(num_nodes: usize) -> Self {
        let spans = log2_floor(num_nodes.max(1)) + 1;
        Self {
            core: Core::new(num_nodes),
            level: vec![1; num_nodes],
            bound: vec![vec![1; num_nodes]; spans],
            count: vec![vec![0; num_nodes]; spans],
            ins: vec![BTreeSet::new(); num_nodes],
            outs: vec![BTreeSet::new(); num_nodes],
            heap: vec![OutHeap::default(); num_nodes],
            component: Vec::new(),
            in_component: vec![0; num_nodes],
        }
    }

    /// Forward search over out-heaps from `v` towards `u`, promoting
    /// levels as it descends; vertices reaching `u` form the component.
    fn find_component(&mut self, u: usize, v: usize) {
        let stamp = self.core.next_traversal();
        self.level[v] = self.level[u] + 1;

        struct Frame {
            vertex: usize,
            entries: Vec<(usize, usize)>,
            i: usize,
            pending: Option<usize>,
        }

        let mut stack = vec![Frame {
            vertex: v,
            entries: self.heap[v].pairs().collect(),
            i: 0,
            pending: None,
        }];

        while let Some(frame) = stack.last_mut() {
            let current = frame.vertex;
            if let Some(neighbour) = frame.pending.take() {
                if self.in_component[neighbour] == stamp && self.in_component[current] != stamp {
                    self.in_component[current] = stamp;
                }
            }

            let mut descended = false;
            while frame.i < frame.entries.len() {
                let (out_level, neighbour) = frame.entries[frame.i];
                if out_level >= self.level[current] {
                    frame.i = frame.entries.len();
                    break;
                }
                frame.i += 1;

                if neighbour == u {
                    if self.in_component[u] != stamp {
                        self.in_component[u] = stamp;
                        self.component.push(u);
                    }
                } else if self.level[neighbour] < self.level[current] {
                    self.level[neighbour] = self.level[current];
                    frame.pending = Some(neighbour);
                    let entries = self.heap[neighbour].pairs().collect();
                    stack.push(Frame {
                        vertex: neighbour,
                        entries,
                        i: 0,
                        pending: None,
                    });
                    descended = true;
                    break;
                }

                if self.in_component[neighbour] == stamp && self.in_component[current] != stamp {
                    self.in_component[current] = stamp;
                }
            }
            if !descended {
                if self.in_component[current] == stamp {
                    self.component.push(current);
                }
                stack.pop();
            }
        }
    }

    fn insert_arc(&mut self, u: usize, v: usize) {
        self.outs[u].insert(v);
        self.ins[v].insert(u);
        let in_degree = self.ins[v].len();
        let span = log2_floor(in_degree);
        if 1usize << span == in_degree {
            self.bound[span][v] = self.level[v];
            self.count[span][v] = 0;
            if span != 0 {
                self.count[span - 1][v] = 0;
            }
        }
    }

    fn erase_arc_if_exists(&mut self, u: usize, v: usize) {
        if self.outs[u].contains(&v) {
            self.outs[u].remove(&v);
            self.ins[v].remove(&u);
            self.heap[u].remove(v);
        }
    }

    /// Drains out-heap pairs of `u` at levels not above `level[u]`.
    ///
    /// The bound consulted here is `level[u]` of the supplied id: when
    /// this is called right after a merge, the id must be the component
    /// representative. Stale candidate targets popped later may no
    /// longer be representatives; their frozen levels are harmless.
    fn move_from_heap_to_candidates(&mut self, u: usize, candidates: &mut Vec<Arc>) {
        let level = self.level[u];
        self.heap[u].pop_up_to(u, level, candidates);
    }

    /// Merges the component, rewiring in/out sets and heaps instead of
    /// splicing adjacency lists.
    fn merge_component(&mut self, vertices: &[usize]) {
        for i in 1..vertices.len() {
            let Some(result) = self.core.union_find.union(vertices[i - 1], vertices[i]) else {
                continue;
            };
            let (kept, absorbed) = (result.kept, result.absorbed);

            self.erase_arc_if_exists(kept, absorbed);
            self.erase_arc_if_exists(absorbed, kept);

            let out_absorbed = std::mem::take(&mut self.outs[absorbed]);
            for &neighbour in &out_absorbed {
                if !self.outs[kept].contains(&neighbour) {
                    self.outs[kept].insert(neighbour);
                    self.ins[neighbour].insert(kept);
                    self.heap[kept].insert(neighbour, self.level[neighbour]);
                }
                self.ins[neighbour].remove(&absorbed);
            }
            let in_absorbed = std::mem::take(&mut self.ins[absorbed]);
            for &neighbour in &in_absorbed {
                if !self.ins[kept].contains(&neighbour) {
                    self.outs[neighbour].insert(kept);
                    self.ins[kept].insert(neighbour);
                    self.heap[neighbour].insert(kept, self.level[kept]);
                }
                self.outs[neighbour].remove(&absorbed);
                self.heap[neighbour].remove(absorbed);
            }
        }
    }

    /// After a successful search, merges the found component and returns
    /// the initial candidate arcs; without a cycle the inserted arc is
    /// the only candidate.
    fn form_component_and_fill_candidates(&mut self, u: usize, v: usize) -> Vec<Arc> {
        if self.in_component[v] != self.core.traversal {
            return vec![(u, v)];
        }

        let component = std::mem::take(&mut self.component);
        self.merge_component(&component);
        self.component = component;
        let repr = self.core.representative(u);
        for span in &mut self.count {
            span[repr] = 0;
        }

        let mut candidates = Vec::new();
        debug_assert_eq!(self.core.representative(repr), repr);
        self.move_from_heap_to_candidates(repr, &mut candidates);
        candidates
    }

    fn traversal_step(&mut self, candidates: &mut Vec<Arc>) {
        let (x, y) = candidates.pop().unwrap();
        if self.level[x] >= self.level[y] {
            self.level[y] = self.level[x] + 1;
        } else {
            let span = log2_floor((self.level[y] - self.level[x]).min(self.ins[y].len()).max(1));
            self.count[span][y] += 1;
            if self.count[span][y] == 3 * (1usize << span) {
                self.count[span][y] = 0;
                self.level[y] = self.level[y].max(self.bound[span][y] + (1 << span));
                self.bound[span][y] = self.level[y];
            }
        }

        self.move_from_heap_to_candidates(y, candidates);
        self.heap[x].insert(y, self.level[y]);
    }
}

impl IncrementalSccs for OneWaySearch {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);

        if u == v || self.outs[u].contains(&v) {
            return;
        }

        if self.level[u] < self.level[v] {
            self.insert_arc(u, v);
            self.heap[u].insert(v, self.level[v]);
            return;
        }

        self.find_component(u, v);
        let mut candidates = self.form_component_and_fill_candidates(u, v);
        if self.in_component[v] != self.core.traversal {
            self.insert_arc(u, v);
        }
        while !candidates.is_empty() {
            self.traversal_step(&mut candidates);
        }

        self.component.clear();
    }
}
