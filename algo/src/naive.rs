/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::framework::{Core, IncrementalSccs};
use incscc::prelude::*;

/// The O(m·(n + m)) baseline: after each insertion, intersect forward and
/// reversed reachability and union the result.
///
/// This is the differential oracle for all other algorithms. Note that
/// both traversals start from `u`, and `u` is united with the vertices
/// its forward reach shares with its reversed reach; this is the
/// behaviour the whole test suite is calibrated against, so it must not
/// be "fixed" without recalibrating.
pub struct NaiveDfs {
    core: Core,
    reversed: VecGraph,
    visited: Vec<usize>,
}

fn dfs(
    graph: &VecGraph,
    visited: &mut [usize],
    source: usize,
    stamp: usize,
    store_encountered: bool,
) -> Vec<usize> {
    let mut to_be_considered = vec![source];
    let mut encountered = Vec::new();
    visited[source] = stamp;

    while let Some(current) = to_be_considered.pop() {
        if store_encountered {
            encountered.push(current);
        }
        for &neighbour in graph.successors(current) {
            if visited[neighbour] != stamp {
                visited[neighbour] = stamp;
                to_be_considered.push(neighbour);
            }
        }
    }

    encountered
}

impl NaiveDfs {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            core: Core::new(num_nodes),
            reversed: VecGraph::empty(num_nodes),
            visited: vec![0; num_nodes],
        }
    }
}

impl IncrementalSccs for NaiveDfs {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn preprocess_arc(&mut self, u: usize, v: usize) {
        self.core.graph.add_arc(u, v);
        self.reversed.add_arc(v, u);
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        if self.core.representative(u) == self.core.representative(v) {
            return;
        }

        let forward_stamp = self.core.next_traversal();
        let encountered = dfs(&self.core.graph, &mut self.visited, u, forward_stamp, true);
        let backward_stamp = self.core.next_traversal();
        dfs(&self.reversed, &mut self.visited, u, backward_stamp, false);

        // The SCC of u is exactly the set of vertices reachable from u
        // that can also reach u.
        for w in encountered {
            if self.visited[w] == backward_stamp {
                self.core.union_find.union(u, w);
            }
        }
    }
}
