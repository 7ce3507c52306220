/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::framework::{merge_into_component, Core, IncrementalSccs};
use std::collections::HashMap;

/// The naive one-way search, O(mn) total time.
///
/// A forward search from the target promotes levels while looking for
/// the source; vertices that reach the source form the new component.
pub struct NaiveOneWaySearch {
    core: Core,
    /// Stamps for the per-vertex arc scans; each scan of a successor list
    /// gets a fresh value so the arc map can drop duplicates.
    arc_scans: usize,
    visited: Vec<usize>,
    level: Vec<usize>,
    reaches_target: Vec<usize>,
    reached_target: Vec<usize>,
    visited_arc: HashMap<(usize, usize), usize>,
}

/// Size past which the arc-stamp map is emptied wholesale. A
/// memory-hygiene bound, not a correctness requirement: stamps already
/// distinguish scans.
pub(crate) const MAX_VISITED_ARCS: usize = 15000;

struct Frame {
    vertex: usize,
    scan: usize,
    i: usize,
    pending: Option<usize>,
}

impl NaiveOneWaySearch {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            core: Core::new(num_nodes),
            arc_scans: 0,
            visited: vec![0; num_nodes],
            level: vec![1; num_nodes],
            reaches_target: vec![0; num_nodes],
            reached_target: Vec::new(),
            visited_arc: HashMap::new(),
        }
    }

    fn push_frame(&mut self, stack: &mut Vec<Frame>, vertex: usize, stamp: usize) {
        self.visited[vertex] = stamp;
        self.arc_scans += 1;
        stack.push(Frame {
            vertex,
            scan: self.arc_scans,
            i: 0,
            pending: None,
        });
    }

    /// Forward search from `current` towards `target`, promoting levels
    /// below the target's and recording every vertex that reaches it.
    fn detect_new_scc(&mut self, start: usize, target: usize) {
        let stamp = self.core.traversal;
        let target_level = self.level[target];
        let mut stack = Vec::new();
        self.push_frame(&mut stack, start, stamp);

        while let Some(frame) = stack.last_mut() {
            let current = frame.vertex;
            if let Some(repr) = frame.pending.take() {
                if self.reaches_target[repr] == stamp {
                    self.reaches_target[current] = stamp;
                }
            }

            let mut descended = false;
            while frame.i < self.core.graph.outdegree(current) {
                let repr = self
                    .core
                    .representative(self.core.graph.successors(current)[frame.i]);

                // Remove loop / duplicated arc.
                if repr == current || self.visited_arc.get(&(current, repr)) == Some(&frame.scan) {
                    self.core.graph.remove_successor(current, frame.i);
                    continue;
                }
                self.visited_arc.insert((current, repr), frame.scan);
                frame.i += 1;

                if self.visited[repr] != stamp {
                    if self.level[repr] < target_level {
                        frame.pending = Some(repr);
                        self.push_frame(&mut stack, repr, stamp);
                        descended = true;
                        break;
                    }
                    if repr == target {
                        self.reaches_target[repr] = stamp;
                        self.reached_target.push(repr);
                    }
                    self.visited[repr] = stamp;
                }

                if self.reaches_target[repr] == stamp {
                    self.reaches_target[current] = stamp;
                }
            }
            if !descended {
                if self.reaches_target[current] == stamp {
                    self.reached_target.push(current);
                }
                stack.pop();
            }
        }
    }

    /// Propagates `level[w] > level[current]` along arcs.
    fn update_levels(&mut self, start: usize) {
        struct LevelFrame {
            vertex: usize,
            scan: usize,
            i: usize,
        }
        let mut stack = Vec::new();
        self.arc_scans += 1;
        stack.push(LevelFrame {
            vertex: start,
            scan: self.arc_scans,
            i: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let current = frame.vertex;
            let mut descended = false;
            while frame.i < self.core.graph.outdegree(current) {
                let repr = self
                    .core
                    .representative(self.core.graph.successors(current)[frame.i]);

                // Remove loop / duplicated arc.
                if repr == current || self.visited_arc.get(&(current, repr)) == Some(&frame.scan) {
                    self.core.graph.remove_successor(current, frame.i);
                    continue;
                }
                self.visited_arc.insert((current, repr), frame.scan);
                frame.i += 1;

                if self.level[repr] <= self.level[current] {
                    self.level[repr] = self.level[current] + 1;
                    self.arc_scans += 1;
                    stack.push(LevelFrame {
                        vertex: repr,
                        scan: self.arc_scans,
                        i: 0,
                    });
                    descended = true;
                    break;
                }
            }
            if !descended {
                stack.pop();
            }
        }
    }
}

impl IncrementalSccs for NaiveOneWaySearch {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if self.level[u] < self.level[v] || u == v {
            return;
        }

        self.core.next_traversal();
        self.detect_new_scc(v, u);
        let reached = std::mem::take(&mut self.reached_target);
        merge_into_component(
            &mut self.core.union_find,
            &reached,
            &mut [&mut self.core.graph],
        );

        let mut v = v;
        if reached.is_empty() {
            self.level[v] = self.level[u] + 1;
        } else {
            let updated_level = self.level[u].max(self.level[v] + reached.len() - 1);
            v = self.core.representative(v);
            self.level[v] = updated_level;
        }
        self.reached_target = reached;
        self.update_levels(v);
    }

    fn postprocess_arc(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u != v {
            self.core.graph.add_arc(u, v);
        }

        self.reached_target.clear();
        if self.visited_arc.len() >= MAX_VISITED_ARCS {
            self.visited_arc.clear();
        }
    }
}
