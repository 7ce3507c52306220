/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bender::MAX_VISITED_ARCS;
use crate::framework::{merge_into_component, Core, IncrementalSccs};
use incscc::order::{DynamicOrder, TreapOrder};
use std::collections::HashMap;

/// The limited search, O(mn) total time.
///
/// A forward DFS from the target of the new arc, bounded to vertices
/// currently preceding the source in the dynamic order, records a
/// postorder; if the source is reached, the vertices reaching it are the
/// new component, and in any case the visited non-members are moved, in
/// reverse postorder, to just before the source using a dummy order slot
/// as anchor.
pub struct LimitedSearch {
    core: Core,
    dummy: usize,
    order: TreapOrder,
    visited: Vec<usize>,
    reaches_target: Vec<usize>,
    reached_target: Vec<usize>,
    postorder: Vec<usize>,
    visited_arc: HashMap<(usize, usize), usize>,
}

impl LimitedSearch {
    pub fn new(num_nodes: usize) -> Self {
        // One extra slot serves as the reordering anchor.
        let mut order = TreapOrder::new(num_nodes + 1);
        order.remove(num_nodes);
        Self {
            core: Core::new(num_nodes),
            dummy: num_nodes,
            order,
            visited: vec![0; num_nodes],
            reaches_target: vec![0; num_nodes],
            reached_target: Vec::new(),
            postorder: Vec::new(),
            visited_arc: HashMap::new(),
        }
    }

    fn dfs(&mut self, start: usize, target: usize) {
        struct Frame {
            vertex: usize,
            i: usize,
            pending: Option<usize>,
        }

        let stamp = self.core.traversal;
        self.visited[start] = stamp;
        let mut stack = vec![Frame {
            vertex: start,
            i: 0,
            pending: None,
        }];

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
                if repr == current || self.visited_arc.get(&(current, repr)) == Some(&stamp) {
                    self.core.graph.remove_successor(current, frame.i);
                    continue;
                }
                self.visited_arc.insert((current, repr), stamp);
                frame.i += 1;

                if self.visited[repr] != stamp {
                    if self.order.is_before(repr, target) {
                        frame.pending = Some(repr);
                        self.visited[repr] = stamp;
                        stack.push(Frame {
                            vertex: repr,
                            i: 0,
                            pending: None,
                        });
                        descended = true;
                        break;
                    }
                    if repr == target {
                        self.reaches_target[repr] = stamp;
                        self.reached_target.push(repr);
                        self.postorder.push(repr);
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
                self.postorder.push(current);
                stack.pop();
            }
        }
    }

    fn process_new_scc(&mut self, target: usize) {
        self.order.insert_after(self.dummy, target);
        if self.reached_target.is_empty() {
            return;
        }

        for &w in &self.reached_target {
            self.order.remove(w);
        }
        merge_into_component(
            &mut self.core.union_find,
            &self.reached_target,
            &mut [&mut self.core.graph],
        );
        self.order
            .insert_before(self.core.union_find.representative(target), self.dummy);
    }
}

impl IncrementalSccs for LimitedSearch {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        // Topological order remains valid.
        if u == v || self.order.is_before(u, v) {
            return;
        }

        self.core.next_traversal();
        self.dfs(v, u);
        self.process_new_scc(u);

        let stamp = self.core.traversal;
        let mut previous = self.dummy;
        for i in (0..self.postorder.len()).rev() {
            let w = self.postorder[i];
            // Members of the new component stay where the representative
            // was re-inserted.
            if self.reaches_target[w] == stamp {
                continue;
            }
            self.order.remove(w);
            self.order.insert_after(w, previous);
            previous = w;
        }
        self.order.remove(self.dummy);
    }

    fn postprocess_arc(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u != v {
            self.core.graph.add_arc(u, v);
        }

        self.reached_target.clear();
        self.postorder.clear();

        if self.visited_arc.len() >= MAX_VISITED_ARCS {
            self.visited_arc.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::Arc;

    fn check_invariants(search: &LimitedSearch, num_nodes: usize) {
        // Every arc between distinct components must be consistent with
        // the maintained order; this also requires both representatives
        // to still be present in it.
        for u in 0..num_nodes {
            for &v in search.core.graph.successors(u) {
                let u_repr = search.core.representative(u);
                let v_repr = search.core.representative(v);
                if u_repr != v_repr {
                    assert!(
                        search.order.is_before(u_repr, v_repr),
                        "arc ({u}, {v}) contradicts the maintained order"
                    );
                }
            }
        }
    }

    #[test]
    fn test_order_consistency() {
        let arcs: Vec<Arc> = vec![
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 1),
            (4, 0),
            (2, 4),
            (5, 5),
            (0, 1),
        ];
        let num_nodes = 6;
        let mut search = LimitedSearch::new(num_nodes);
        for &(u, v) in &arcs {
            search.preprocess_arc(u, v);
            search.arc_step(u, v);
            search.postprocess_arc(u, v);
            check_invariants(&search, num_nodes);
        }
    }
}
