/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The sampling-based algorithm of Bernstein and Chechik
//! (<https://doi.org/10.4230/LIPIcs.ESA.2021.14>).

mod explorer;

mod sample;
pub use sample::SampleSearch;

mod sparsifier;
pub use sparsifier::{AdvancedSparsifier, SimpleSparsifier};

use crate::framework::{Arc, Core, Direction, IncrementalSccs};
use dsi_progress_logger::ProgressLog;
use incscc::order::DynamicOrder;

use Direction::{Backward, Forward};

/// The sample search behind a simple degree sparsifier, restoring the
/// O(m/n) degree assumption the plain search needs.
///
/// Every raw arc is turned into a chain of generated arcs over auxiliary
/// vertices before being fed through the inner search, so the driver
/// loop is overridden rather than hook-based.
pub struct SparsifiedSampleSearch<O: DynamicOrder> {
    inner: SampleSearch<O>,
    sparsifier: SimpleSparsifier,
}

impl<O: DynamicOrder> SparsifiedSampleSearch<O> {
    /// `num_nodes` must be
    /// [`SimpleSparsifier::updated_num_nodes`]`(original_num_nodes)`,
    /// and the order sized accordingly.
    pub fn new(num_nodes: usize, original_num_nodes: usize, order: O) -> Self {
        assert_eq!(
            num_nodes,
            SimpleSparsifier::updated_num_nodes(original_num_nodes)
        );
        Self {
            inner: SampleSearch::with_sample_universe(num_nodes, order, Some(original_num_nodes)),
            sparsifier: SimpleSparsifier::new(original_num_nodes),
        }
    }
}

impl<O: DynamicOrder> IncrementalSccs for SparsifiedSampleSearch<O> {
    fn core(&self) -> &Core {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut Core {
        self.inner.core_mut()
    }

    fn arc_step(&mut self, u: usize, v: usize) {
        self.inner.arc_step(u, v);
    }

    fn postprocess_arc(&mut self, u: usize, v: usize) {
        self.inner.postprocess_arc(u, v);
    }

    fn run(&mut self, arcs: &[Arc], pl: &mut impl ProgressLog) {
        pl.item_name("arc");
        pl.expected_updates(Some(arcs.len()));
        pl.start("Inserting arcs through the sparsifier...");
        for &(u, v) in arcs {
            self.sparsifier.begin_arc();
            self.sparsifier.generate_new_arcs(Forward, u);
            self.sparsifier.generate_new_arcs(Backward, v);
            let u_id = self.sparsifier.corresponding_id(Forward, u);
            let v_id = self.sparsifier.corresponding_id(Backward, v);
            self.sparsifier.push_arc(u_id, v_id);

            for (w, z) in self.sparsifier.take_generated() {
                self.inner.arc_step(w, z);
                self.inner.postprocess_arc(w, z);
            }
            pl.light_update();
        }
        pl.done();
    }
}
