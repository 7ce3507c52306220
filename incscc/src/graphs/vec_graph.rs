/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// A mutable graph implementation based on a vector of vectors,
/// tailored to incremental SCC maintenance.
///
/// The node set is fixed at construction. Successor lists are plain
/// sequences: they may contain duplicate arcs and stale ids of vertices
/// that have since been absorbed into another component, and it is the
/// caller's responsibility to deduplicate lazily (usually by resolving
/// representatives while traversing). Arcs survive a component merge only
/// through [`move_successors`](VecGraph::move_successors), which splices
/// the absorbed vertex's whole list onto the representative's.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecGraph {
    /// The number of arcs in the graph.
    number_of_arcs: u64,
    /// For each node, its list of successors.
    succ: Vec<Vec<usize>>,
}

impl VecGraph {
    /// Creates a new empty graph with `n` nodes and no arcs.
    pub fn empty(n: usize) -> Self {
        Self {
            number_of_arcs: 0,
            succ: Vec::from_iter((0..n).map(|_| Vec::new())),
        }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.succ.len()
    }

    /// Returns the number of arcs.
    pub fn num_arcs(&self) -> u64 {
        self.number_of_arcs
    }

    /// Adds an arc to the graph.
    ///
    /// Duplicate arcs and self-loops are accepted.
    ///
    /// # Panics
    ///
    /// This method will panic if one of the given nodes is greater than or
    /// equal to the number of nodes in the graph.
    pub fn add_arc(&mut self, u: usize, v: usize) {
        let max = u.max(v);
        if max >= self.succ.len() {
            panic!(
                "Node {} does not exist (the graph has {} nodes)",
                max,
                self.succ.len(),
            );
        }
        self.succ[u].push(v);
        self.number_of_arcs += 1;
    }

    /// Returns the successors of a node as a slice.
    pub fn successors(&self, u: usize) -> &[usize] {
        &self.succ[u]
    }

    /// Returns the outdegree of a node.
    pub fn outdegree(&self, u: usize) -> usize {
        self.succ[u].len()
    }

    /// Removes the successor at position `i` in the list of `u`,
    /// preserving the order of the remaining successors.
    pub fn remove_successor(&mut self, u: usize, i: usize) {
        self.succ[u].remove(i);
        self.number_of_arcs -= 1;
    }

    /// Empties the successor list of `u`.
    pub fn clear_successors(&mut self, u: usize) {
        self.number_of_arcs -= self.succ[u].len() as u64;
        self.succ[u].clear();
    }

    /// Splices all successors of `u` onto the end of the successor list of
    /// `v`, leaving `u` with no successors.
    pub fn move_successors(&mut self, u: usize, v: usize) {
        if u == v {
            return;
        }
        let mut moved = std::mem::take(&mut self.succ[u]);
        self.succ[v].append(&mut moved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_move() {
        let mut g = VecGraph::empty(4);
        g.add_arc(0, 1);
        g.add_arc(0, 2);
        g.add_arc(1, 3);
        g.add_arc(1, 3);
        assert_eq!(g.num_arcs(), 4);
        assert_eq!(g.successors(1), &[3, 3]);

        g.move_successors(1, 0);
        assert_eq!(g.successors(0), &[1, 2, 3, 3]);
        assert_eq!(g.outdegree(1), 0);
        assert_eq!(g.num_arcs(), 4);
    }

    #[test]
    fn test_remove_successor() {
        let mut g = VecGraph::empty(3);
        g.add_arc(0, 1);
        g.add_arc(0, 1);
        g.add_arc(0, 2);
        g.remove_successor(0, 1);
        assert_eq!(g.successors(0), &[1, 2]);
        assert_eq!(g.num_arcs(), 2);
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_add_arc_out_of_range() {
        let mut g = VecGraph::empty(2);
        g.add_arc(0, 2);
    }
}
