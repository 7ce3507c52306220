/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::collect_new_component;
use crate::framework::{merge_into_component, Core, Direction};
use incscc::order::{cmp_in_order, DynamicOrder};
use incscc::prelude::VecGraph;

use Direction::{Backward, Forward};

/// One half of a bidirectional traversal: the vertices traversed so far,
/// their visit stamps, and a cursor into each vertex's successor list.
///
/// The policies (compatible, soft-threshold) own the sets of vertices
/// that are still eligible for stepping; this structure reports
/// activations and exhaustions back to them through [`SideEvents`].
pub(crate) struct Traversal {
    pub(crate) traversed: Vec<usize>,
    visited: Vec<usize>,
    cursor: Vec<usize>,
}

impl Traversal {
    fn new(num_nodes: usize) -> Self {
        Self {
            traversed: Vec::new(),
            visited: vec![0; num_nodes],
            cursor: vec![0; num_nodes],
        }
    }

    /// Inserts `u` into the traversal; returns `Some(u)` if it was new
    /// and has successors to offer (that is, it becomes active).
    fn insert_vertex(&mut self, u: usize, graph: &VecGraph, stamp: usize) -> Option<usize> {
        if self.visited[u] == stamp {
            return None;
        }
        self.traversed.push(u);
        self.visited[u] = stamp;
        self.cursor[u] = 0;
        (graph.outdegree(u) > 0).then_some(u)
    }

    fn exhausted(&self, u: usize, graph: &VecGraph) -> bool {
        self.cursor[u] >= graph.outdegree(u)
    }

    fn clear(&mut self) {
        self.traversed.clear();
    }
}

/// What a search step did to one side's active set.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SideEvents {
    pub(crate) activated: Option<usize>,
    pub(crate) deactivated: Option<usize>,
}

/// State and behaviour shared by the compatible and soft-threshold
/// searches: both graphs, the dynamic order, the traversal halves, and
/// the SCC detector fed by the steps.
pub(crate) struct BidiSearch<O: DynamicOrder> {
    pub(crate) core: Core,
    pub(crate) reversed: VecGraph,
    pub(crate) order: O,
    pub(crate) forward: Traversal,
    pub(crate) backward: Traversal,
    /// Used to determine newly created strongly connected components.
    scc_detector: VecGraph,
    within_detector: Vec<usize>,
    visited: Vec<usize>,
    in_new_scc: Vec<usize>,
    new_scc: Vec<usize>,
}

impl<O: DynamicOrder> BidiSearch<O> {
    pub(crate) fn new(num_nodes: usize, order: O) -> Self {
        Self {
            core: Core::new(num_nodes),
            reversed: VecGraph::empty(num_nodes),
            order,
            forward: Traversal::new(num_nodes),
            backward: Traversal::new(num_nodes),
            scc_detector: VecGraph::empty(num_nodes),
            within_detector: Vec::new(),
            visited: vec![0; num_nodes],
            in_new_scc: vec![0; num_nodes],
            new_scc: Vec::new(),
        }
    }

    /// Resolves representatives and decides whether the step is trivial;
    /// if not, seeds both traversals and returns the resolved pair plus
    /// the initial activations `(forward, backward)`.
    pub(crate) fn begin_step(
        &mut self,
        u: usize,
        v: usize,
    ) -> Option<((usize, usize), SideEvents, SideEvents)> {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u == v || self.order.is_before(u, v) {
            return None;
        }

        let stamp = self.core.next_traversal();
        let forward = SideEvents {
            activated: self.forward.insert_vertex(v, &self.core.graph, stamp),
            deactivated: None,
        };
        let backward = SideEvents {
            activated: self.backward.insert_vertex(u, &self.reversed, stamp),
            deactivated: None,
        };
        Some(((u, v), forward, backward))
    }

    /// Steps one arc out of the forward vertex `u` and one into the
    /// backward vertex `v`, feeding the SCC detector.
    pub(crate) fn search_step(&mut self, u: usize, v: usize) -> (SideEvents, SideEvents) {
        let forward = self.step_side(Forward, u);
        let backward = self.step_side(Backward, v);
        (forward, backward)
    }

    fn step_side(&mut self, dir: Direction, u: usize) -> SideEvents {
        let stamp = self.core.traversal;
        let (graph, traversal) = match dir {
            Forward => (&mut self.core.graph, &mut self.forward),
            Backward => (&mut self.reversed, &mut self.backward),
        };

        let i = traversal.cursor[u];
        let x = self.core.union_find.representative(graph.successors(u)[i]);
        let mut events = SideEvents::default();
        if x == u {
            graph.remove_successor(u, i);
        } else {
            match dir {
                Forward => self.scc_detector.add_arc(u, x),
                Backward => self.scc_detector.add_arc(x, u),
            }
            self.within_detector.push(u);
            events.activated = traversal.insert_vertex(x, graph, stamp);
            traversal.cursor[u] = i + 1;
        }
        if traversal.exhausted(u, graph) {
            events.deactivated = Some(u);
        }
        events
    }

    /// Returns the traversed forward vertex with an unexhausted cursor
    /// that comes earliest in the order, defaulting to `initial`.
    fn find_pivot(&self, initial: usize) -> usize {
        let mut pivot = initial;
        for &vertex in &self.forward.traversed {
            if !self.forward.exhausted(vertex, &self.core.graph)
                && self.order.is_before(vertex, pivot)
            {
                pivot = vertex;
            }
        }
        pivot
    }

    /// The traversed vertices of one side strictly on the pivot's good
    /// side (before it for the forward side, after it for the backward
    /// side), sorted by the order.
    fn sorted_on_good_side(&self, dir: Direction, pivot: usize) -> Vec<usize> {
        let traversal = match dir {
            Forward => &self.forward,
            Backward => &self.backward,
        };
        let mut vertices: Vec<usize> = traversal
            .traversed
            .iter()
            .copied()
            .filter(|&vertex| match dir {
                Forward => self.order.is_before(vertex, pivot),
                Backward => self.order.is_before(pivot, vertex),
            })
            .collect();
        vertices.sort_by(|&a, &b| cmp_in_order(&self.order, a, b));
        vertices
    }

    /// Restores the topological order around a pivot: everything the
    /// forward search saw before the pivot (and, if the pivot moved, the
    /// backward side after it) is re-placed next to it.
    fn restore_topological_order(&mut self, default_pivot: usize) {
        let pivot = self.find_pivot(default_pivot);
        let sorted_before = self.sorted_on_good_side(Forward, pivot);
        let sorted_after = self.sorted_on_good_side(Backward, pivot);

        if pivot == default_pivot {
            let mut previous = pivot;
            for &vertex in &sorted_before {
                self.order.remove(vertex);
                self.order.insert_after(vertex, previous);
                previous = vertex;
            }
        } else {
            let mut next = pivot;
            for &vertex in sorted_before.iter().rev() {
                self.order.remove(vertex);
                self.order.insert_before(vertex, next);
                next = vertex;
            }
            for &vertex in sorted_after.iter().rev() {
                self.order.remove(vertex);
                self.order.insert_before(vertex, next);
                next = vertex;
            }
        }
    }

    /// The shared tail of a step: restore the order, detect the new
    /// component, merge it, and put its representative back right after
    /// `u`, dropping the other members from the order.
    pub(crate) fn finish_step(&mut self, u: usize, v: usize) {
        self.restore_topological_order(u);
        let stamp = self.core.traversal;
        collect_new_component(
            &self.scc_detector,
            v,
            u,
            stamp,
            &mut self.visited,
            &mut self.in_new_scc,
            &mut self.new_scc,
        );
        merge_into_component(
            &mut self.core.union_find,
            &self.new_scc,
            &mut [&mut self.core.graph, &mut self.reversed],
        );

        let repr = self.core.union_find.representative(u);
        if repr != u {
            self.order.remove(repr);
            self.order.insert_after(repr, u);
        }
        for i in 0..self.new_scc.len() {
            let vertex = self.new_scc[i];
            if vertex != repr {
                self.order.remove(vertex);
            }
        }

        for i in 0..self.within_detector.len() {
            let vertex = self.within_detector[i];
            self.scc_detector.clear_successors(vertex);
        }
        self.within_detector.clear();
        self.new_scc.clear();
        self.forward.clear();
        self.backward.clear();
    }

    pub(crate) fn add_arcs_for(&mut self, u: usize, v: usize) {
        let u = self.core.representative(u);
        let v = self.core.representative(v);
        if u != v {
            self.core.graph.add_arc(u, v);
            self.reversed.add_arc(v, u);
        }
    }
}
