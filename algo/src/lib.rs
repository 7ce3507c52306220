/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unconditional_recursion)]
#![deny(unreachable_patterns)]

pub mod framework;
pub use framework::{merge_into_component, Arc, Core, Direction, IncrementalSccs, Sccs};

pub mod bender;
pub mod bernstein;
pub mod haeupler;
pub mod naive;

mod factory;
pub use factory::{run_algorithm, AlgorithmName, UnknownAlgorithm};

pub mod prelude {
    pub use crate::bender::{NaiveOneWaySearch, OneWaySearch, TwoWaySearch};
    pub use crate::bernstein::{SampleSearch, SparsifiedSampleSearch};
    pub use crate::framework::*;
    pub use crate::haeupler::{
        CompatibleSearch, LimitedSearch, SoftThresholdSearch, TopologicalSearch,
    };
    pub use crate::naive::NaiveDfs;
    pub use crate::{run_algorithm, AlgorithmName};
}
