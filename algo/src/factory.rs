/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::bender::{NaiveOneWaySearch, OneWaySearch, TwoWaySearch};
use crate::bernstein::{SampleSearch, SimpleSparsifier, SparsifiedSampleSearch};
use crate::framework::{Arc, IncrementalSccs, Sccs};
use crate::haeupler::{CompatibleSearch, LimitedSearch, SoftThresholdSearch, TopologicalSearch};
use crate::naive::NaiveDfs;
use dsi_progress_logger::ProgressLog;
use incscc::order::{LinkedOrder, TreapOrder, TwoLevelOrder};
use std::fmt;
use std::str::FromStr;

/// The error returned for names outside the roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

/// The algorithm roster, as selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmName {
    NaiveDfs,
    NaiveOneWaySearch,
    OneWaySearch,
    TwoWaySearch,
    LimitedSearch,
    CompatibleSearch,
    SoftThresholdSearch,
    SoftThresholdSearchBasicList,
    SoftThresholdSearchTreap,
    TopologicalSearch,
    SampleSearch,
    SparsifiedSampleSearch,
}

impl AlgorithmName {
    /// Every recognised configuration, in the order the documentation
    /// lists them.
    pub const ALL: [AlgorithmName; 12] = [
        AlgorithmName::NaiveDfs,
        AlgorithmName::NaiveOneWaySearch,
        AlgorithmName::OneWaySearch,
        AlgorithmName::TwoWaySearch,
        AlgorithmName::LimitedSearch,
        AlgorithmName::CompatibleSearch,
        AlgorithmName::SoftThresholdSearch,
        AlgorithmName::SoftThresholdSearchBasicList,
        AlgorithmName::SoftThresholdSearchTreap,
        AlgorithmName::TopologicalSearch,
        AlgorithmName::SampleSearch,
        AlgorithmName::SparsifiedSampleSearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmName::NaiveDfs => "naive_dfs",
            AlgorithmName::NaiveOneWaySearch => "naive_one_way_search",
            AlgorithmName::OneWaySearch => "one_way_search",
            AlgorithmName::TwoWaySearch => "two_way_search",
            AlgorithmName::LimitedSearch => "limited_search",
            AlgorithmName::CompatibleSearch => "compatible_search",
            AlgorithmName::SoftThresholdSearch => "soft_threshold_search",
            AlgorithmName::SoftThresholdSearchBasicList => "soft_threshold_search_basic_list",
            AlgorithmName::SoftThresholdSearchTreap => "soft_threshold_search_treap",
            AlgorithmName::TopologicalSearch => "topological_search",
            AlgorithmName::SampleSearch => "sample_search",
            AlgorithmName::SparsifiedSampleSearch => "sparsified_sample_search",
        }
    }
}

impl fmt::Display for AlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmName {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmName::ALL
            .iter()
            .find(|name| name.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

fn run_one<A: IncrementalSccs>(
    mut algorithm: A,
    arcs: &[Arc],
    num_nodes: usize,
    pl: &mut impl ProgressLog,
) -> Sccs {
    algorithm.run(arcs, pl);
    algorithm.sccs(num_nodes)
}

/// Instantiates the named algorithm over `num_nodes` vertices, feeds it
/// all arcs, and returns the resulting partition.
pub fn run_algorithm(
    name: AlgorithmName,
    num_nodes: usize,
    arcs: &[Arc],
    pl: &mut impl ProgressLog,
) -> Sccs {
    let n = num_nodes;
    match name {
        AlgorithmName::NaiveDfs => run_one(NaiveDfs::new(n), arcs, n, pl),
        AlgorithmName::NaiveOneWaySearch => run_one(NaiveOneWaySearch::new(n), arcs, n, pl),
        AlgorithmName::OneWaySearch => run_one(OneWaySearch::new(n), arcs, n, pl),
        AlgorithmName::TwoWaySearch => run_one(TwoWaySearch::new(n), arcs, n, pl),
        AlgorithmName::LimitedSearch => run_one(LimitedSearch::new(n), arcs, n, pl),
        AlgorithmName::CompatibleSearch => {
            run_one(CompatibleSearch::new(n, TwoLevelOrder::new(n)), arcs, n, pl)
        }
        AlgorithmName::SoftThresholdSearch => run_one(
            SoftThresholdSearch::new(n, TwoLevelOrder::new(n)),
            arcs,
            n,
            pl,
        ),
        AlgorithmName::SoftThresholdSearchBasicList => run_one(
            SoftThresholdSearch::new(n, LinkedOrder::new(n)),
            arcs,
            n,
            pl,
        ),
        AlgorithmName::SoftThresholdSearchTreap => {
            run_one(SoftThresholdSearch::new(n, TreapOrder::new(n)), arcs, n, pl)
        }
        AlgorithmName::TopologicalSearch => run_one(TopologicalSearch::new(n), arcs, n, pl),
        AlgorithmName::SampleSearch => {
            run_one(SampleSearch::new(n, TwoLevelOrder::new(n)), arcs, n, pl)
        }
        AlgorithmName::SparsifiedSampleSearch => {
            let total = SimpleSparsifier::updated_num_nodes(n);
            run_one(
                SparsifiedSampleSearch::new(total, n, TwoLevelOrder::new(total)),
                arcs,
                n,
                pl,
            )
        }
    }
}
