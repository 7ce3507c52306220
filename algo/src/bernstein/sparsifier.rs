/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Reachability-preserving degree sparsifiers.
//!
//! The sample search assumes every vertex has degree O(m/n). The
//! sparsifiers restore that assumption: each endpoint of an arriving arc
//! is redirected to a chain of auxiliary vertices so that no working
//! vertex exceeds the average degree, while reachability between
//! original vertices is preserved. A forward and a backward side share
//! the arc counter, the fresh-id allocator and the generated-arc buffer;
//! the sides differ only in the orientation of the arcs they emit.

use crate::framework::{Arc, Direction};

use Direction::{Backward, Forward};

fn ceil_div(x: usize, y: usize) -> usize {
    (x + y - 1) / y
}

/// Per-direction tables of a sparsifier.
struct SparsifierSide {
    /// The next locally unused auxiliary slot.
    next_unused: usize,
    /// For each original vertex, the auxiliary vertex currently standing
    /// in for it.
    representative: Vec<usize>,
    /// Maps local slots to the vertex ids of the combined output graph.
    corresponding: Vec<usize>,
    degree: Vec<usize>,
}

impl SparsifierSide {
    fn new(original_num_nodes: usize, multiplier: usize) -> Self {
        let mut corresponding = vec![0; original_num_nodes * multiplier];
        for (id, slot) in corresponding.iter_mut().enumerate().take(original_num_nodes) {
            *slot = id;
        }
        Self {
            next_unused: original_num_nodes,
            representative: Vec::from_iter(0..original_num_nodes),
            corresponding,
            degree: vec![0; original_num_nodes * multiplier],
        }
    }
}

/// The simple sparsifier: a vertex whose stand-in is saturated chains
/// one fresh auxiliary vertex and moves its stand-in there.
pub struct SimpleSparsifier {
    original_num_nodes: usize,
    num_arcs: usize,
    global_next: usize,
    average_degree: usize,
    generated: Vec<Arc>,
    forward: SparsifierSide,
    backward: SparsifierSide,
}

impl SimpleSparsifier {
    const NODE_MULTIPLIER: usize = 4;
    const MIN_AVERAGE_DEGREE: usize = 10;

    /// The number of vertices the combined output graph must be sized
    /// for.
    pub fn updated_num_nodes(original_num_nodes: usize) -> usize {
        2 * original_num_nodes * Self::NODE_MULTIPLIER
    }

    pub fn new(original_num_nodes: usize) -> Self {
        Self {
            original_num_nodes,
            num_arcs: 0,
            global_next: original_num_nodes,
            average_degree: Self::MIN_AVERAGE_DEGREE,
            generated: Vec::new(),
            forward: SparsifierSide::new(original_num_nodes, Self::NODE_MULTIPLIER),
            backward: SparsifierSide::new(original_num_nodes, Self::NODE_MULTIPLIER),
        }
    }

    fn side(&mut self, dir: Direction) -> &mut SparsifierSide {
        match dir {
            Forward => &mut self.forward,
            Backward => &mut self.backward,
        }
    }

    /// Accounts one raw arc (both sides) and keeps the average-degree
    /// bound current.
    pub fn begin_arc(&mut self) {
        self.num_arcs += 2;
        self.average_degree = self
            .average_degree
            .max(ceil_div(2 * self.num_arcs, self.original_num_nodes));
    }

    /// Allocates a fresh auxiliary vertex chained to `from` and emits
    /// the corresponding arc, oriented by the side.
    fn chain_to_unused(&mut self, dir: Direction, from: usize) -> usize {
        let global = self.global_next;
        self.global_next += 1;
        let side = self.side(dir);
        let fresh = side.next_unused;
        side.next_unused += 1;
        side.corresponding[fresh] = global;
        let arc = match dir {
            Forward => (side.corresponding[from], side.corresponding[fresh]),
            Backward => (side.corresponding[fresh], side.corresponding[from]),
        };
        self.generated.push(arc);
        fresh
    }

    /// Redirects `u`'s stand-in if it is saturated, then charges it one
    /// unit of degree.
    pub fn generate_new_arcs(&mut self, dir: Direction, u: usize) {
        let average_degree = self.average_degree;
        let stand_in = self.side(dir).representative[u];
        if self.side(dir).degree[stand_in] >= average_degree {
            let fresh = self.chain_to_unused(dir, stand_in);
            self.side(dir).representative[u] = fresh;
        }
        let stand_in = self.side(dir).representative[u];
        self.side(dir).degree[stand_in] += 1;
    }

    /// The output-graph id of `u`'s current stand-in.
    pub fn corresponding_id(&mut self, dir: Direction, u: usize) -> usize {
        let side = self.side(dir);
        side.corresponding[side.representative[u]]
    }

    pub fn push_arc(&mut self, u: usize, v: usize) {
        self.generated.push((u, v));
    }

    /// Takes the arcs generated for the current raw arc.
    pub fn take_generated(&mut self) -> Vec<Arc> {
        std::mem::take(&mut self.generated)
    }
}

/// The sparsifier of Bernstein and Chechik: auxiliary vertices form a
/// balanced tree of layers per original vertex, so the degree bound
/// holds with only O(n) extra vertices even for small average degrees.
pub struct AdvancedSparsifier {
    global_next: usize,
    average_degree: usize,
    generated: Vec<Arc>,
    forward: AdvancedSide,
    backward: AdvancedSide,
}

struct AdvancedSide {
    side: SparsifierSide,
    /// How many layers each original vertex's tree currently has.
    layers: Vec<usize>,
    parent: Vec<usize>,
    depth: Vec<usize>,
}

impl AdvancedSide {
    fn new(original_num_nodes: usize) -> Self {
        let num_nodes = original_num_nodes * AdvancedSparsifier::NODE_MULTIPLIER;
        let mut parent = vec![0; num_nodes];
        for (id, slot) in parent.iter_mut().enumerate().take(original_num_nodes) {
            *slot = id;
        }
        Self {
            side: SparsifierSide::new(original_num_nodes, AdvancedSparsifier::NODE_MULTIPLIER),
            layers: vec![AdvancedSparsifier::INITIAL_LAYERS; original_num_nodes],
            parent,
            depth: vec![0; num_nodes],
        }
    }
}

impl AdvancedSparsifier {
    const NODE_MULTIPLIER: usize = 8;
    const INITIAL_LAYERS: usize = 1;
    const MIN_AVERAGE_DEGREE: usize = 2;

    pub fn updated_num_nodes(original_num_nodes: usize) -> usize {
        2 * original_num_nodes * Self::NODE_MULTIPLIER
    }

    /// The degree bound is fixed at construction from an arc-count hint.
    pub fn new(original_num_nodes: usize, num_arcs: usize) -> Self {
        Self {
            global_next: original_num_nodes,
            average_degree: Self::MIN_AVERAGE_DEGREE
                .max(ceil_div(num_arcs, original_num_nodes.max(1))),
            generated: Vec::new(),
            forward: AdvancedSide::new(original_num_nodes),
            backward: AdvancedSide::new(original_num_nodes),
        }
    }

    fn side(&mut self, dir: Direction) -> &mut AdvancedSide {
        match dir {
            Forward => &mut self.forward,
            Backward => &mut self.backward,
        }
    }

    fn chain_to_unused(&mut self, dir: Direction, from: usize) -> usize {
        let global = self.global_next;
        self.global_next += 1;
        let side = self.side(dir);
        let fresh = side.side.next_unused;
        side.side.next_unused += 1;
        side.parent[fresh] = from;
        side.depth[fresh] = side.depth[from] + 1;
        side.side.degree[from] += 1;
        side.side.corresponding[fresh] = global;
        let arc = match dir {
            Forward => (side.side.corresponding[from], side.side.corresponding[fresh]),
            Backward => (side.side.corresponding[fresh], side.side.corresponding[from]),
        };
        self.generated.push(arc);
        fresh
    }

    pub fn generate_new_arcs(&mut self, dir: Direction, u: usize) {
        let average_degree = self.average_degree;
        let mut w = self.side(dir).side.representative[u];

        // Climb towards the root past saturated tree nodes.
        loop {
            let side = self.side(dir);
            if side.parent[w] == w || side.side.degree[w] != average_degree {
                break;
            }
            w = side.parent[w];
        }

        // A saturated root opens a new layer.
        let side = self.side(dir);
        if side.parent[w] == w && side.side.degree[w] == average_degree {
            let fresh = self.chain_to_unused(dir, w);
            let side = self.side(dir);
            side.parent[fresh] = fresh;
            side.depth[fresh] = 0;
            side.layers[u] += 1;
            w = fresh;
        }

        // Chain down to the current layer depth.
        loop {
            let side = self.side(dir);
            if side.depth[w] == side.layers[u] {
                break;
            }
            w = self.chain_to_unused(dir, w);
        }

        let side = self.side(dir);
        side.side.representative[u] = w;
        side.side.degree[w] += 1;
    }

    pub fn corresponding_id(&mut self, dir: Direction, u: usize) -> usize {
        let side = self.side(dir);
        side.side.corresponding[side.side.representative[u]]
    }

    pub fn push_arc(&mut self, u: usize, v: usize) {
        self.generated.push((u, v));
    }

    pub fn take_generated(&mut self) -> Vec<Arc> {
        std::mem::take(&mut self.generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays arcs through a sparsifier pair the way the sparsified
    /// sample search does, returning the generated arcs per raw arc.
    fn sparsify(arcs: &[Arc], original_num_nodes: usize) -> Vec<Vec<Arc>> {
        let mut sparsifier = SimpleSparsifier::new(original_num_nodes);
        let mut result = Vec::new();
        for &(u, v) in arcs {
            sparsifier.begin_arc();
            sparsifier.generate_new_arcs(Forward, u);
            sparsifier.generate_new_arcs(Backward, v);
            let u_id = sparsifier.corresponding_id(Forward, u);
            let v_id = sparsifier.corresponding_id(Backward, v);
            sparsifier.push_arc(u_id, v_id);
            result.push(sparsifier.take_generated());
        }
        result
    }

    #[test]
    fn test_identity_when_sparse() {
        // Below the minimum average degree nothing is redirected.
        let arcs = vec![(0, 1), (1, 2), (2, 0)];
        let generated = sparsify(&arcs, 3);
        for (raw, arcs) in arcs.iter().zip(&generated) {
            assert_eq!(arcs.as_slice(), &[*raw]);
        }
    }

    #[test]
    fn test_degree_stays_bounded() {
        // A star forces the hub through auxiliary stand-ins.
        let hub = 0;
        let spokes = 3;
        let arcs: Vec<Arc> = (0..200).map(|i| (hub, 1 + i % spokes)).collect();
        let mut sparsifier = SimpleSparsifier::new(spokes + 1);
        let mut out_degree =
            vec![0usize; SimpleSparsifier::updated_num_nodes(spokes + 1)];
        for &(u, v) in &arcs {
            sparsifier.begin_arc();
            sparsifier.generate_new_arcs(Forward, u);
            sparsifier.generate_new_arcs(Backward, v);
            let u_id = sparsifier.corresponding_id(Forward, u);
            let v_id = sparsifier.corresponding_id(Backward, v);
            sparsifier.push_arc(u_id, v_id);
            for (a, _) in sparsifier.take_generated() {
                out_degree[a] += 1;
            }
        }
        let bound = sparsifier.average_degree + 1;
        assert!(out_degree.iter().all(|&d| d <= bound));
    }

    #[test]
    fn test_advanced_layers_grow() {
        let mut sparsifier = AdvancedSparsifier::new(2, 8);
        for _ in 0..40 {
            sparsifier.generate_new_arcs(Forward, 0);
            sparsifier.generate_new_arcs(Backward, 1);
            let u_id = sparsifier.corresponding_id(Forward, 0);
            let v_id = sparsifier.corresponding_id(Backward, 1);
            sparsifier.push_arc(u_id, v_id);
            let generated = sparsifier.take_generated();
            assert!(!generated.is_empty());
        }
        assert!(sparsifier.forward.layers[0] >= 2);
        assert!(sparsifier.forward.side.next_unused <= AdvancedSparsifier::NODE_MULTIPLIER * 2);
    }
}
