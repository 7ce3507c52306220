/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The algorithms of Haeupler, Kavitha, Mathew, Sen and Tarjan
//! (<https://doi.org/10.1145/2071379.2071382>).

mod limited;
pub use limited::LimitedSearch;

mod topological;
pub use topological::TopologicalSearch;

mod bidi;
pub(crate) use bidi::{BidiSearch, SideEvents};

mod compatible;
pub use compatible::CompatibleSearch;

mod soft_threshold;
pub use soft_threshold::SoftThresholdSearch;

use incscc::prelude::VecGraph;

/// Collects, on an auxiliary detector graph, the vertices that lie on a
/// path from `start` to `target`: these form the new strongly connected
/// component (possibly just `target` itself, when no cycle was closed).
///
/// `visited` and `in_new_scc` are stamp arrays; members are appended to
/// `new_scc`.
pub(crate) fn collect_new_component(
    detector: &VecGraph,
    start: usize,
    target: usize,
    stamp: usize,
    visited: &mut [usize],
    in_new_scc: &mut [usize],
    new_scc: &mut Vec<usize>,
) {
    struct Frame {
        vertex: usize,
        i: usize,
        pending: Option<usize>,
    }

    visited[start] = stamp;
    let mut stack = vec![Frame {
        vertex: start,
        i: 0,
        pending: None,
    }];

    while let Some(frame) = stack.last_mut() {
        let current = frame.vertex;
        if let Some(neighbour) = frame.pending.take() {
            if in_new_scc[neighbour] == stamp {
                in_new_scc[current] = stamp;
            }
        }

        let mut descended = false;
        while frame.i < detector.outdegree(current) {
            let neighbour = detector.successors(current)[frame.i];
            frame.i += 1;
            if visited[neighbour] != stamp {
                visited[neighbour] = stamp;
                frame.pending = Some(neighbour);
                stack.push(Frame {
                    vertex: neighbour,
                    i: 0,
                    pending: None,
                });
                descended = true;
                break;
            }
            if in_new_scc[neighbour] == stamp {
                in_new_scc[current] = stamp;
            }
        }
        if !descended {
            if current == target {
                in_new_scc[current] = stamp;
            }
            if in_new_scc[current] == stamp {
                new_scc.push(current);
            }
            stack.pop();
        }
    }
}
