/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The incremental framework shared by all algorithms.
//!
//! An algorithm owns a [`Core`] (graph, union–find, traversal counter)
//! and implements [`IncrementalSccs`]: the provided
//! [`run`](IncrementalSccs::run) threads every arc through
//! `preprocess_arc → arc_step → postprocess_arc`, passing the raw
//! endpoints; resolving representatives is the step's own business.
//! [`merge_into_component`] is the one component-merging protocol: it
//! unions adjacent pairs and splices the absorbed successor list onto the
//! kept one in every graph the algorithm maintains.

use dsi_progress_logger::ProgressLog;
use incscc::prelude::*;
use std::io;
use std::io::Write;

/// A raw input arc.
pub type Arc = (usize, usize);

/// The orientation of one half of a bidirectional search.
///
/// The searches, explorers and sparsifiers come in symmetric pairs whose
/// behaviour differs only in a handful of choices (which end of an
/// ordered set is "best", which way a cursor moves, how a generated arc
/// is oriented); those choices dispatch on this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// State common to every incremental algorithm.
pub struct Core {
    pub graph: VecGraph,
    pub union_find: UnionFind,
    /// The traversal-stamp counter: a per-node mark equal to the current
    /// value means "visited by the traversal in progress"; anything else
    /// is stale. This avoids clearing visit arrays between steps.
    pub traversal: usize,
}

impl Core {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            graph: VecGraph::empty(num_nodes),
            union_find: UnionFind::new(num_nodes),
            traversal: 0,
        }
    }

    /// Returns the representative of the component of `u`.
    pub fn representative(&self, u: usize) -> usize {
        self.union_find.representative(u)
    }

    /// Starts a new traversal and returns its stamp.
    pub fn next_traversal(&mut self) -> usize {
        self.traversal += 1;
        self.traversal
    }
}

/// Merges all components containing `vertices` into one.
///
/// Adjacent pairs are united in sequence; each successful union splices
/// the absorbed representative's successor list onto the kept one in
/// every graph in `graphs`. The operation is idempotent on pairs that are
/// already merged.
pub fn merge_into_component(
    union_find: &mut UnionFind,
    vertices: &[usize],
    graphs: &mut [&mut VecGraph],
) {
    for i in 1..vertices.len() {
        if let Some(UnionResult { kept, absorbed }) = union_find.union(vertices[i - 1], vertices[i])
        {
            for graph in graphs.iter_mut() {
                graph.move_successors(absorbed, kept);
            }
        }
    }
}

/// An incremental strongly-connected-components algorithm.
pub trait IncrementalSccs {
    fn core(&self) -> &Core;
    fn core_mut(&mut self) -> &mut Core;

    /// Called before [`arc_step`](IncrementalSccs::arc_step) with the raw
    /// endpoints.
    fn preprocess_arc(&mut self, _u: usize, _v: usize) {}

    /// Processes one arc insertion.
    fn arc_step(&mut self, u: usize, v: usize);

    /// Called after [`arc_step`](IncrementalSccs::arc_step) with the raw
    /// endpoints.
    fn postprocess_arc(&mut self, _u: usize, _v: usize) {}

    /// Feeds all arcs through the three hooks, in input order.
    fn run(&mut self, arcs: &[Arc], pl: &mut impl ProgressLog)
    where
        Self: Sized,
    {
        pl.item_name("arc");
        pl.expected_updates(Some(arcs.len()));
        pl.start("Inserting arcs...");
        for &(u, v) in arcs {
            self.preprocess_arc(u, v);
            self.arc_step(u, v);
            self.postprocess_arc(u, v);
            pl.light_update();
        }
        pl.done();
    }

    /// Returns the current partition of the nodes `0..num_nodes` into
    /// strongly connected components.
    fn sccs(&self, num_nodes: usize) -> Sccs {
        Sccs::from_union_find(&self.core().union_find, num_nodes)
    }
}

/// Strongly connected components.
///
/// An instance of this structure stores, for each node, the [canonical
/// representative](Sccs::components) of the component it belongs to.
/// Note that representatives are arbitrary node ids, not consecutive
/// component indices: the canonical textual form is produced by
/// [`write_components`](Sccs::write_components).
pub struct Sccs {
    num_components: usize,
    components: Box<[usize]>,
}

impl Sccs {
    pub fn new(num_components: usize, components: Box<[usize]>) -> Self {
        Sccs {
            num_components,
            components,
        }
    }

    /// Snapshots the partition of `0..num_nodes` described by `union_find`.
    pub fn from_union_find(union_find: &UnionFind, num_nodes: usize) -> Self {
        let components: Box<[usize]> = (0..num_nodes)
            .map(|node| union_find.representative(node))
            .collect();
        let mut distinct: Vec<usize> = components.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        Sccs {
            num_components: distinct.len(),
            components,
        }
    }

    /// Returns the number of strongly connected components.
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Returns a slice containing, for each node, the representative of
    /// the component it belongs to.
    #[inline(always)]
    pub fn components(&self) -> &[usize] {
        &self.components
    }

    /// Returns the groups of nodes forming each component, each group in
    /// ascending id order, groups sorted by their minimum id.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut by_repr = std::collections::BTreeMap::<usize, Vec<usize>>::new();
        for (node, &repr) in self.components.iter().enumerate() {
            by_repr.entry(repr).or_default().push(node);
        }
        let mut groups: Vec<Vec<usize>> = by_repr.into_values().collect();
        // Members were pushed in ascending node order, so the first
        // element of each group is its minimum.
        groups.sort_by_key(|group| group[0]);
        groups
    }

    /// Writes the components, one per line: members in ascending order,
    /// each id followed by a single space, lines sorted by minimum id.
    pub fn write_components(&self, mut writer: impl Write) -> io::Result<()> {
        for group in self.groups() {
            for node in group {
                write!(writer, "{} ", node)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Labels every node with the minimum id of its component, giving a
    /// representation of the partition that does not depend on which
    /// member the union–find elected.
    pub fn normalized(&self) -> Vec<usize> {
        let mut min_of = std::collections::HashMap::<usize, usize>::new();
        for (node, &repr) in self.components.iter().enumerate() {
            min_of.entry(repr).or_insert(node);
        }
        self.components.iter().map(|repr| min_of[repr]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_components() {
        let mut union_find = UnionFind::new(5);
        union_find.union(1, 3);
        union_find.union(3, 4);
        let sccs = Sccs::from_union_find(&union_find, 5);
        assert_eq!(sccs.num_components(), 3);

        let mut out = Vec::new();
        sccs.write_components(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0 \n1 3 4 \n2 \n");
    }

    #[test]
    fn test_merge_moves_arcs_everywhere() {
        let mut union_find = UnionFind::new(4);
        let mut graph = VecGraph::empty(4);
        let mut reversed = VecGraph::empty(4);
        graph.add_arc(0, 1);
        graph.add_arc(1, 2);
        reversed.add_arc(1, 0);
        reversed.add_arc(2, 1);

        merge_into_component(&mut union_find, &[0, 1, 2], &mut [&mut graph, &mut reversed]);

        let repr = union_find.representative(0);
        assert_eq!(union_find.representative(1), repr);
        assert_eq!(union_find.representative(2), repr);
        assert_eq!(graph.outdegree(repr), 2);
        assert_eq!(reversed.outdegree(repr), 2);

        // Idempotent on already-merged pairs.
        merge_into_component(&mut union_find, &[2, 0], &mut [&mut graph, &mut reversed]);
        assert_eq!(graph.outdegree(repr), 2);
    }
}
