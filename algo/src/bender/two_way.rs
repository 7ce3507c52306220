/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::framework::{merge_into_component, Core, IncrementalSccs};
use incscc::prelude::*;
use std::collections::VecDeque;

/// The two-way search, O(m·min(n^⅔, m^½)) total time.
///
/// A bounded backward BFS on the reversed graph decides whether the new
/// arc can close a cycle cheaply; when the edge budget is exhausted the
/// target is lifted one level instead and a forward search propagates
/// levels, rebuilding reversed-graph arcs as vertices change level.
/// Hitting the budget is the adaptive cutoff, not a failure.
pub struct TwoWaySearch {
    core: Core,
    reversed: VecGraph,
    num_arcs: usize,
    traversal_steps: usize,
    threshold: usize,
    /// The n^⅔ cap on the threshold.
    nodes_threshold: usize,
    arcs_used_backwards: usize,
    found_cycle: bool,
    visited: Vec<usize>,
    level: Vec<usize>,
    /// Per-expansion stamps used to drop duplicate arcs mid-scan.
    considered: Vec<usize>,
    component: Vec<usize>,
    in_component: Vec<usize>,
}

impl TwoWaySearch {
    pub fn new(num_nodes: usize) -> Self {
        let cbrt = (num_nodes as f64).cbrt();
        Self {
            core: Core::new(num_nodes),
            reversed: VecGraph::empty(num_nodes),
            num_arcs: 0,
            traversal_steps: 0,
            threshold: 1,
            nodes_threshold: (cbrt * cbrt) as usize,
            arcs_used_backwards: 0,
            found_cycle: false,
            visited: vec![0; num_nodes],
            level: vec![0; num_nodes],
            considered: vec![0; num_nodes],
            component: Vec::new(),
            in_component: vec![0; num_nodes],
        }
    }

    /// The threshold is adjusted only when the number of arcs is a power
    /// of two, and only when the candidate at least doubles it.
    fn update_threshold(&mut self) {
        if self.num_arcs & (self.num_arcs - 1) != 0 {
            return;
        }
        let sqrt_num_arcs = (self.num_arcs as f64).sqrt() as usize;
        let candidate = sqrt_num_arcs.min(self.nodes_threshold);
        if candidate >= self.threshold * 2 {
            self.threshold = candidate;
        }
    }

    fn search_backward(&mut self, u: usize, v: usize) {
        let stamp = self.core.next_traversal();
        self.visited[u] = stamp;
        let mut to_be_considered = VecDeque::new();
        to_be_considered.push_back(u);

        while let Some(current) = to_be_considered.pop_front() {
            self.traversal_steps += 1;
            let step = self.traversal_steps;
            self.considered[current] = step;

            let mut i = 0;
            while i < self.reversed.outdegree(current) {
                let repr = self
                    .core
                    .representative(self.reversed.successors(current)[i]);

                // Remove loop / duplicated arc.
                if self.considered[repr] == step {
                    self.reversed.remove_successor(current, i);
                    continue;
                }
                self.considered[repr] = step;

                if repr == v {
                    self.found_cycle = true;
                } else if self.visited[repr] != stamp {
                    self.visited[repr] = stamp;
                    to_be_considered.push_back(repr);
                }
                self.arcs_used_backwards += 1;
                if self.arcs_used_backwards == self.threshold {
                    return;
                }
                i += 1;
            }
        }
    }

    fn search_forward(&mut self, u: usize) {
        let stamp = self.core.traversal;
        let u_level = self.level[u];
        let mut to_be_considered = vec![u];

        while let Some(current) = to_be_considered.pop() {
            self.traversal_steps += 1;
            let step = self.traversal_steps;
            self.considered[current] = step;

            let mut i = 0;
            while i < self.core.graph.outdegree(current) {
                let repr = self
                    .core
                    .representative(self.core.graph.successors(current)[i]);

                // Remove loop / duplicated arc.
                if self.considered[repr] == step {
                    self.core.graph.remove_successor(current, i);
                    continue;
                }
                self.considered[repr] = step;

                if self.visited[repr] == stamp {
                    self.found_cycle = true;
                }

                if self.level[repr] == u_level {
                    self.reversed.add_arc(repr, current);
                } else if self.level[repr] < u_level {
                    self.level[repr] = u_level;
                    self.reversed.clear_successors(repr);
                    self.reversed.add_arc(repr, current);
                    to_be_considered.push(repr);
                }

                i += 1;
            }
        }
    }

    /// Collects, on the reversed graph, the vertices of the cycle closed
    /// by (u, v) and merges them.
    fn form_component(&mut self, u: usize, v: usize) {
        if !self.found_cycle {
            return;
        }

        let stamp = self.core.next_traversal();
        self.in_component[v] = stamp;
        self.component.clear();
        self.component.push(v);

        struct Frame {
            vertex: usize,
            i: usize,
            pending: Option<usize>,
        }

        let mut stack = Vec::new();
        self.visited[u] = stamp;
        self.dedup_reversed(u);
        stack.push(Frame {
            vertex: u,
            i: 0,
            pending: None,
        });

        while let Some(frame) = stack.last_mut() {
            let current = frame.vertex;
            if let Some(repr) = frame.pending.take() {
                if self.in_component[repr] == stamp && self.in_component[current] != stamp {
                    self.in_component[current] = stamp;
                    self.component.push(current);
                }
            }

            let mut descended = false;
            while frame.i < self.reversed.outdegree(current) {
                let repr = self
                    .core
                    .representative(self.reversed.successors(current)[frame.i]);
                frame.i += 1;

                if self.in_component[repr] != stamp && self.visited[repr] != stamp {
                    frame.pending = Some(repr);
                    self.visited[repr] = stamp;
                    self.dedup_reversed(repr);
                    stack.push(Frame {
                        vertex: repr,
                        i: 0,
                        pending: None,
                    });
                    descended = true;
                    break;
                }
                if self.in_component[repr] == stamp && self.in_component[current] != stamp {
                    self.in_component[current] = stamp;
                    self.component.push(current);
                }
            }
            if !descended {
                stack.pop();
            }
        }

        let component = std::mem::take(&mut self.component);
        merge_into_component(
            &mut self.core.union_find,
            &component,
            &mut [&mut self.core.graph, &mut self.reversed],
        );
    }

    /// One dedup pass over the reversed successors of `u`, so the
    /// component search can scan them without re-resolving duplicates.
    fn dedup_reversed(&mut self, u: usize) {
        self.traversal_steps += 1;
        let step = self.traversal_steps;
        self.considered[u] = step;
        let mut i = 0;
        while i < self.reversed.outdegree(u) {
            let repr = self.core.representative(self.reversed.successors(u)[i]);
            if self.considered[repr] == step {
                self.reversed.remove_successor(u, i);
            } else {
                self.considered[repr] = step;
                i += 1;
            }
        }
    }
}

impl IncrementalSccs for TwoWaySearch {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn preprocess_arc(&mut self, _u: usize, _v: usize) {
        self.num_arcs += 1;
        self.update_threshold();
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u == v || self.level[u] < self.level[v] {
            return;
        }

        self.found_cycle = false;
        self.arcs_used_backwards = 0;
        self.search_backward(u, v);
        if self.arcs_used_backwards != self.threshold {
            if self.level[v] == self.level[u] {
                self.form_component(u, v);
                return;
            }
            self.level[v] = self.level[u];
        } else {
            self.level[v] = self.level[u] + 1;
            // Restart the traversal stamp so that only u counts as
            // "reached backwards" for the forward search.
            let stamp = self.core.next_traversal();
            self.visited[u] = stamp;
        }

        self.reversed.clear_successors(v);
        self.search_forward(v);
        self.form_component(u, v);
    }

    fn postprocess_arc(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u != v {
            self.core.graph.add_arc(u, v);
            if self.level[u] == self.level[v] {
                self.reversed.add_arc(v, u);
            }
        }
    }
}
