/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::sample::Partition;
use crate::framework::Direction;
use incscc::order::{cmp_components_in_order, DynamicOrder, OrderedIdSet};
use incscc::prelude::{UnionFind, VecGraph};

use Direction::{Backward, Forward};

/// Read-only context threaded through an exploration: the dynamic order
/// and union–find used by the component comparator, the current vertex
/// partitions, and the exploration stamp.
pub(crate) struct ExploreContext<'a, O: DynamicOrder> {
    pub(crate) order: &'a O,
    pub(crate) union_find: &'a UnionFind,
    pub(crate) partitions: &'a [Partition],
    pub(crate) stamp: usize,
}

impl<O: DynamicOrder> ExploreContext<'_, O> {
    fn cmp(&self, a: usize, b: usize) -> std::cmp::Ordering {
        cmp_components_in_order(self.order, self.union_find, a, b)
    }
}

/// One half of the phase-3 exploration: an `alive` frontier and a `dead`
/// set of already-expanded vertices, both kept in component order, plus
/// the stamps used by the collection DFS and the canonical reordering.
///
/// The forward explorer expands its smallest alive vertex and its best
/// dead vertex is its largest; the backward explorer is the mirror
/// image. The `status` stamps shared by both explorers live in the
/// algorithm and are passed in.
pub(crate) struct Explorer {
    dir: Direction,
    alive: OrderedIdSet,
    dead: OrderedIdSet,
    /// Components touched by this explorer in the current exploration.
    visited_scc: Vec<usize>,
    visited: Vec<usize>,
    marked: Vec<usize>,
    reordered: Vec<usize>,
    pub(crate) cycle_created: bool,
    pub(crate) pivot: Option<usize>,
    /// Whether this side stopped taking alive vertices; decides between
    /// the forward and backward order repair.
    pub(crate) finished_processing_alive: bool,
}

impl Explorer {
    pub(crate) fn new(dir: Direction, num_nodes: usize, reordered_len: usize) -> Self {
        Self {
            dir,
            alive: OrderedIdSet::new(),
            dead: OrderedIdSet::new(),
            visited_scc: vec![0; num_nodes],
            visited: vec![0; num_nodes],
            marked: vec![0; num_nodes],
            reordered: vec![0; reordered_len],
            cycle_created: false,
            pivot: None,
            finished_processing_alive: false,
        }
    }

    pub(crate) fn any_alive(&mut self) -> bool {
        if self.alive.is_empty() {
            self.finished_processing_alive = true;
        }
        !self.alive.is_empty()
    }

    pub(crate) fn add_alive<O: DynamicOrder>(&mut self, id: usize, ctx: &ExploreContext<'_, O>) {
        self.visited_scc[ctx.union_find.representative(id)] = ctx.stamp;
        self.alive.insert_by(id, |a, b| ctx.cmp(a, b));
    }

    fn best_alive(&self) -> Option<usize> {
        match self.dir {
            Forward => self.alive.first(),
            Backward => self.alive.last(),
        }
    }

    fn best_dead(&self) -> Option<usize> {
        match self.dir {
            Forward => self.dead.last(),
            Backward => self.dead.first(),
        }
    }

    /// Whether our best alive vertex has moved past the other side's
    /// best dead one, so no cycle through the remaining frontier is
    /// possible.
    fn surpassed<O: DynamicOrder>(
        &self,
        alive_repr: usize,
        other_dead_repr: usize,
        order: &O,
    ) -> bool {
        match self.dir {
            Forward => order.is_before(other_dead_repr, alive_repr),
            Backward => order.is_before(alive_repr, other_dead_repr),
        }
    }

    pub(crate) fn max_dead(&self) -> Option<usize> {
        self.dead.last()
    }

    pub(crate) fn min_dead(&self) -> Option<usize> {
        self.dead.first()
    }

    pub(crate) fn take_dead(&mut self) -> Vec<usize> {
        self.dead.take()
    }

    pub(crate) fn populate_dead<O: DynamicOrder>(
        &mut self,
        ids: &[usize],
        ctx: &ExploreContext<'_, O>,
    ) {
        for &id in ids {
            self.dead
                .insert_by(ctx.union_find.representative(id), |a, b| ctx.cmp(a, b));
        }
    }

    pub(crate) fn erase_from_dead<O: DynamicOrder>(
        &mut self,
        id: usize,
        ctx: &ExploreContext<'_, O>,
    ) {
        self.dead
            .remove_by(ctx.union_find.representative(id), |a, b| ctx.cmp(a, b));
    }

    fn alive_or_dead<O: DynamicOrder>(&self, id: usize, ctx: &ExploreContext<'_, O>) -> bool {
        self.alive.contains_by(id, |a, b| ctx.cmp(a, b))
            || self.dead.contains_by(id, |a, b| ctx.cmp(a, b))
    }

    /// Expands the best alive vertex, or reports that the loop over
    /// alive vertices must stop (frontier crossed the other side's dead
    /// set, or both sides met at one component with a known cycle, which
    /// captures the pivot).
    pub(crate) fn process_best_alive<O: DynamicOrder>(
        &mut self,
        other: &mut Explorer,
        graph: &VecGraph,
        status: &mut [usize],
        ctx: &ExploreContext<'_, O>,
    ) -> bool {
        let alive = self.best_alive().expect("alive set checked by any_alive");
        let alive_repr = ctx.union_find.representative(alive);
        if let Some(other_dead) = other.best_dead() {
            let other_dead_repr = ctx.union_find.representative(other_dead);
            if self.surpassed(alive_repr, other_dead_repr, ctx.order) {
                self.finished_processing_alive = true;
                return true;
            }
            if alive_repr == other_dead_repr && (self.cycle_created || other.cycle_created) {
                self.finished_processing_alive = true;
                self.pivot = Some(other_dead);
                return true;
            }
        }

        status[alive] = ctx.stamp;
        self.explore(alive, other, graph, ctx);
        false
    }

    fn explore<O: DynamicOrder>(
        &mut self,
        id: usize,
        other: &Explorer,
        graph: &VecGraph,
        ctx: &ExploreContext<'_, O>,
    ) {
        let repr = ctx.union_find.representative(id);
        self.alive.remove_by(id, |a, b| ctx.cmp(a, b));
        self.dead.insert_by(id, |a, b| ctx.cmp(a, b));

        for &neighbour in graph.successors(id) {
            let neighbour_repr = ctx.union_find.representative(neighbour);
            if ctx.partitions[repr] == ctx.partitions[neighbour_repr] {
                if other.visited_scc[neighbour_repr] == ctx.stamp {
                    self.cycle_created = true;
                }
                if !self.alive_or_dead(neighbour, ctx) {
                    self.add_alive(neighbour, ctx);
                }
            }
        }
    }

    /// Collects the representatives of vertices that can reach one of
    /// the `permitted` components through vertices explored in this
    /// step, appending them to `marked_out`.
    pub(crate) fn collect_reaching<O: DynamicOrder>(
        &mut self,
        start: usize,
        permitted: &[usize],
        marked_out: &mut Vec<usize>,
        graph: &VecGraph,
        status: &[usize],
        ctx: &ExploreContext<'_, O>,
    ) {
        struct Frame {
            vertex: usize,
            marked: bool,
            i: usize,
            pending: Option<usize>,
        }

        let stamp = ctx.stamp;
        self.visited[start] = stamp;
        let start_repr = ctx.union_find.representative(start);
        let mut stack = vec![Frame {
            vertex: start,
            marked: permitted.contains(&start_repr),
            i: 0,
            pending: None,
        }];

        while let Some(idx) = stack.len().checked_sub(1) {
            let current = stack[idx].vertex;
            if let Some(neighbour_repr) = stack[idx].pending.take() {
                stack[idx].marked |= self.marked[neighbour_repr] == stamp;
            }

            let mut descended = false;
            while stack[idx].i < graph.outdegree(current) {
                let i = stack[idx].i;
                let neighbour = graph.successors(current)[i];
                stack[idx].i += 1;
                let neighbour_repr = ctx.union_find.representative(neighbour);
                if status[neighbour] == stamp {
                    if self.visited[neighbour] != stamp {
                        self.visited[neighbour] = stamp;
                        stack[idx].pending = Some(neighbour_repr);
                        stack.push(Frame {
                            vertex: neighbour,
                            marked: permitted.contains(&neighbour_repr),
                            i: 0,
                            pending: None,
                        });
                        descended = true;
                        break;
                    }
                    stack[idx].marked |= self.marked[neighbour_repr] == stamp;
                } else {
                    stack[idx].marked |= permitted.contains(&neighbour_repr);
                }
            }
            if !descended {
                if stack[idx].marked {
                    let current_repr = ctx.union_find.representative(current);
                    marked_out.push(current_repr);
                    self.marked[current_repr] = stamp;
                }
                stack.pop();
            }
        }
    }

    /// Drains the dead set into `new_canonical_order`, deduplicating by
    /// representative; for a forward repair the dead vertices are taken
    /// in decreasing order, for a backward one in increasing order.
    pub(crate) fn drain_canonical(
        &mut self,
        start_repr: usize,
        new_canonical_order: &mut Vec<usize>,
        update_forward: bool,
        union_find: &UnionFind,
        stamp: usize,
    ) {
        self.reordered[start_repr] = stamp;

        let dead = self.dead.take();
        let mut extend = |id: usize| {
            let repr = union_find.representative(id);
            if self.reordered[repr] != stamp {
                self.reordered[repr] = stamp;
                new_canonical_order.push(repr);
            }
        };
        if update_forward {
            for &id in dead.iter().rev() {
                extend(id);
            }
        } else {
            for &id in dead.iter() {
                extend(id);
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.alive.clear();
        self.dead.clear();
        self.cycle_created = false;
        self.pivot = None;
        self.finished_processing_alive = false;
    }
}
