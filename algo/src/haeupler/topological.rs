/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::collect_new_component;
use crate::framework::{Core, Direction, IncrementalSccs};
use incscc::prelude::VecGraph;
use std::collections::VecDeque;
use sux::bits::BitVec;

use Direction::{Backward, Forward};

/// The topological search, O(n^{5/2}) total time and O(n²) memory
/// regardless of the number of arcs.
///
/// The graph is an incidence matrix; the topological order is a pair of
/// arrays mapping canonical vertices to positions and back. A forward
/// cursor sweeps positions upwards from the arc target and a backward
/// cursor downwards from the source, each enqueuing the vertices its
/// queue can reach, until the cursors cross; the queues are then pushed
/// back into the position array in cursor order. A merge collapses the
/// cycle onto one representative and compacts the canonical range
/// downwards.
pub struct TopologicalSearch {
    core: Core,
    matrix: Vec<BitVec>,
    /// `position` and `vertex` are inverse maps between canonical
    /// vertices and their topological positions.
    position: Vec<usize>,
    vertex: Vec<Option<usize>>,
    canonical_len: usize,
    index: [usize; 2],
    queue: [VecDeque<usize>; 2],
    /// Used to determine newly created strongly connected components.
    scc_detector: VecGraph,
    within_detector: Vec<usize>,
    visited: Vec<usize>,
    in_new_scc: Vec<usize>,
    new_scc: Vec<usize>,
}

fn side(dir: Direction) -> usize {
    match dir {
        Forward => 0,
        Backward => 1,
    }
}

impl TopologicalSearch {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            core: Core::new(num_nodes),
            matrix: Vec::from_iter((0..num_nodes).map(|_| BitVec::new(num_nodes))),
            position: Vec::from_iter(0..num_nodes),
            vertex: Vec::from_iter((0..num_nodes).map(Some)),
            canonical_len: num_nodes,
            index: [0; 2],
            queue: [VecDeque::new(), VecDeque::new()],
            scc_detector: VecGraph::empty(num_nodes),
            within_detector: Vec::new(),
            visited: vec![0; num_nodes],
            in_new_scc: vec![0; num_nodes],
            new_scc: Vec::new(),
        }
    }

    /// Whether the queue member can reach `candidate` along one arc, in
    /// the direction of this traversal.
    fn has_arc(&self, dir: Direction, queued: usize, candidate: usize) -> bool {
        match dir {
            Forward => self.matrix[queued].get(candidate),
            Backward => self.matrix[candidate].get(queued),
        }
    }

    fn advance(dir: Direction, index: usize) -> usize {
        match dir {
            Forward => index + 1,
            Backward => index.wrapping_sub(1),
        }
    }

    fn in_range(dir: Direction, index: usize, other_index: usize) -> bool {
        match dir {
            Forward => index < other_index,
            Backward => index > other_index,
        }
    }

    fn init_queue(&mut self, dir: Direction, u: usize) {
        let s = side(dir);
        self.queue[s].push_back(u);
        self.index[s] = self.position[u];
        self.vertex[self.index[s]] = None;
    }

    /// Advances one cursor past canonical positions until it finds one
    /// reachable from this side's queue, then enqueues it. Returns
    /// whether the whole search is finished (the cursors crossed).
    fn search_step(&mut self, dir: Direction, other_index: usize) -> bool {
        let s = side(dir);
        let mut index = Self::advance(dir, self.index[s]);
        while Self::in_range(dir, index, other_index) {
            // Cursor positions strictly between the two cursors have not
            // been consumed, so the slot is occupied.
            let candidate = self.vertex[index].unwrap();
            if self.queue[s]
                .iter()
                .any(|&queued| self.has_arc(dir, queued, candidate))
            {
                break;
            }
            index = Self::advance(dir, index);
        }
        self.index[s] = index;

        if !Self::in_range(dir, index, other_index) {
            return true;
        }

        let candidate = self.vertex[index].take().unwrap();
        self.queue[s].push_back(candidate);
        false
    }

    /// Pushes the queued vertices back into the position arrays in
    /// cursor order.
    fn reorder(&mut self, dir: Direction) {
        let s = side(dir);
        while !self.queue[s].is_empty() {
            let index = self.index[s];
            if let Some(candidate) = self.vertex[index] {
                if self.queue[s]
                    .iter()
                    .any(|&queued| self.has_arc(dir, queued, candidate))
                {
                    self.queue[s].push_back(candidate);
                    self.vertex[index] = None;
                }
            }

            if self.vertex[index].is_none() {
                let u = self.queue[s].pop_front().unwrap();
                self.vertex[index] = Some(u);
                self.position[u] = index;
            }

            self.index[s] = Self::advance(dir, index);
        }
    }

    fn topological_search(&mut self, u: usize, v: usize) {
        self.init_queue(Forward, v);
        self.init_queue(Backward, u);
        loop {
            if self.search_step(Forward, self.index[side(Backward)]) {
                return;
            }
            if self.search_step(Backward, self.index[side(Forward)]) {
                return;
            }
        }
    }

    /// Materialises, among the queued vertices, the arcs witnessed by the
    /// incidence matrix into the SCC detector graph.
    fn create_scc_detection_graph(&mut self) {
        for qu in 0..2 {
            for qv in 0..2 {
                for i in 0..self.queue[qu].len() {
                    for j in 0..self.queue[qv].len() {
                        let a = self.queue[qu][i];
                        let b = self.queue[qv][j];
                        if self.matrix[a].get(b) {
                            self.scc_detector.add_arc(a, b);
                            self.within_detector.push(a);
                            self.within_detector.push(b);
                        }
                    }
                }
            }
        }
    }

    fn adjust_matrix_with_new_scc(&mut self) {
        let num_nodes = self.core.graph.num_nodes();
        for i in 1..self.new_scc.len() {
            let Some(result) = self
                .core
                .union_find
                .union(self.new_scc[i - 1], self.new_scc[i])
            else {
                continue;
            };
            for w in 0..num_nodes {
                if self.matrix[result.absorbed].get(w) {
                    self.matrix[result.kept].set(w, true);
                }
                if self.matrix[w].get(result.absorbed) {
                    self.matrix[w].set(result.kept, true);
                }
            }
        }
    }

    /// Collapses the merged vertices onto `new_repr` at `new_position`
    /// and compacts the canonical position range downwards.
    fn adjust_positions_with_new_scc(&mut self, new_repr: usize, new_position: usize) {
        let mut min_free = self.position[self.new_scc[0]];
        for &w in &self.new_scc {
            self.vertex[self.position[w]] = None;
            min_free = min_free.min(self.position[w]);
        }
        self.vertex[new_position] = Some(new_repr);
        self.position[new_repr] = new_position;

        for i in min_free..self.canonical_len {
            if let Some(x) = self.vertex[i] {
                self.vertex[min_free] = Some(x);
                self.position[x] = min_free;
                min_free += 1;
            }
        }

        self.canonical_len -= self.new_scc.len() - 1;
    }
}

impl IncrementalSccs for TopologicalSearch {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u == v {
            return;
        }

        if self.position[u] < self.position[v] {
            return;
        }

        self.topological_search(u, v);
        self.create_scc_detection_graph();
        let stamp = self.core.next_traversal();
        collect_new_component(
            &self.scc_detector,
            v,
            u,
            stamp,
            &mut self.visited,
            &mut self.in_new_scc,
            &mut self.new_scc,
        );

        self.reorder(Forward);
        self.index[side(Backward)] = Self::advance(Backward, self.index[side(Backward)]);
        self.reorder(Backward);

        if !self.new_scc.is_empty() {
            self.adjust_matrix_with_new_scc();
            let new_repr = self.core.representative(u);
            let new_position = self.position[v];
            self.adjust_positions_with_new_scc(new_repr, new_position);
        }
    }

    fn postprocess_arc(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u != v {
            self.matrix[u].set(v, true);
        }

        for i in 0..self.within_detector.len() {
            let w = self.within_detector[i];
            self.scc_detector.clear_successors(w);
        }
        self.within_detector.clear();
        self.new_scc.clear();
    }
}
