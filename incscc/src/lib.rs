/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unconditional_recursion)]
#![deny(unreachable_patterns)]

pub mod graphs;
pub mod order;
pub mod rng;
pub mod union_find;

pub mod prelude {
    pub use crate::graphs::vec_graph::VecGraph;
    pub use crate::order::*;
    pub use crate::union_find::{UnionFind, UnionResult};
}
