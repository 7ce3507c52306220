/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::prelude::*;
use incscc_algo::prelude::*;
use incscc_algo::Arc;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn num_nodes(arcs: &[Arc]) -> usize {
    arcs.iter().map(|&(u, v)| u.max(v)).max().unwrap_or(0) + 1
}

fn output_of(name: AlgorithmName, arcs: &[Arc]) -> String {
    incscc::rng::seed(123);
    let sccs = run_algorithm(name, num_nodes(arcs), arcs, no_logging![]);
    let mut out = Vec::new();
    sccs.write_components(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn partition_of(name: AlgorithmName, arcs: &[Arc]) -> Vec<usize> {
    incscc::rng::seed(123);
    run_algorithm(name, num_nodes(arcs), arcs, no_logging![]).normalized()
}

const SCENARIOS: &[(&[Arc], &str)] = &[
    (&[(0, 1), (1, 2), (2, 0)], "0 1 2 \n"),
    (&[(0, 1), (2, 3)], "0 \n1 \n2 \n3 \n"),
    (
        &[(0, 1), (1, 0), (1, 2), (2, 1), (3, 4)],
        "0 1 2 \n3 \n4 \n",
    ),
    (&[(0, 1), (1, 2), (2, 3), (3, 1)], "0 \n1 2 3 \n"),
    (&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)], "0 1 2 3 4 \n"),
    // Duplicate arcs must be harmless.
    (&[(0, 1), (0, 1), (1, 0)], "0 1 \n"),
];

#[test]
fn test_scenarios_all_algorithms() -> Result<()> {
    for name in AlgorithmName::ALL {
        for (arcs, expected) in SCENARIOS {
            assert_eq!(
                output_of(name, arcs),
                *expected,
                "algorithm {} disagrees on {:?}",
                name,
                arcs
            );
        }
    }
    Ok(())
}

#[test]
fn test_self_loops_and_single_node() -> Result<()> {
    for name in AlgorithmName::ALL {
        assert_eq!(output_of(name, &[(0, 0)]), "0 \n");
        assert_eq!(output_of(name, &[(2, 2), (0, 1)]), "0 \n1 \n2 \n");
    }
    Ok(())
}

fn random_arcs(rng: &mut SmallRng, num_nodes: usize, num_arcs: usize) -> Vec<Arc> {
    (0..num_arcs)
        .map(|_| (rng.random_range(0..num_nodes), rng.random_range(0..num_nodes)))
        .collect()
}

#[test]
fn test_differential_against_naive() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0);
    for num_nodes in [3, 6, 10, 16] {
        for density in [1, 2, 4] {
            for _ in 0..4 {
                let mut arcs = random_arcs(&mut rng, num_nodes, num_nodes * density);
                // Make sure the node count inference is stable across
                // algorithms.
                arcs.push((num_nodes - 1, num_nodes - 1));
                let oracle = partition_of(AlgorithmName::NaiveDfs, &arcs);
                for name in AlgorithmName::ALL {
                    assert_eq!(
                        partition_of(name, &arcs),
                        oracle,
                        "algorithm {} disagrees with the oracle on {:?}",
                        name,
                        arcs
                    );
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_duplicate_arcs_are_idempotent() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(1);
    let arcs = random_arcs(&mut rng, 8, 20);
    let mut doubled = Vec::new();
    for &arc in &arcs {
        doubled.push(arc);
        doubled.push(arc);
    }
    for name in AlgorithmName::ALL {
        assert_eq!(
            partition_of(name, &arcs),
            partition_of(name, &doubled),
            "duplicating every arc changed the partition of {}",
            name
        );
    }
    Ok(())
}

/// `coarser[i] == coarser[j]` whenever `finer[i] == finer[j]`.
fn refines(finer: &[usize], coarser: &[usize]) -> bool {
    let mut seen = std::collections::HashMap::new();
    for (&f, &c) in finer.iter().zip(coarser) {
        if *seen.entry(f).or_insert(c) != c {
            return false;
        }
    }
    true
}

#[test]
fn test_partition_coarsens_monotonically() -> Result<()> {
    incscc::rng::seed(123);
    let mut rng = SmallRng::seed_from_u64(2);
    let num_nodes = 10;
    let arcs = random_arcs(&mut rng, num_nodes, 40);

    let mut naive = NaiveDfs::new(num_nodes);
    let mut limited = LimitedSearch::new(num_nodes);
    let mut previous_naive = naive.sccs(num_nodes).normalized();
    let mut previous_limited = limited.sccs(num_nodes).normalized();
    for &(u, v) in &arcs {
        naive.preprocess_arc(u, v);
        naive.arc_step(u, v);
        naive.postprocess_arc(u, v);
        limited.preprocess_arc(u, v);
        limited.arc_step(u, v);
        limited.postprocess_arc(u, v);

        let current_naive = naive.sccs(num_nodes).normalized();
        let current_limited = limited.sccs(num_nodes).normalized();
        assert!(refines(&previous_naive, &current_naive));
        assert!(refines(&previous_limited, &current_limited));
        assert_eq!(current_naive, current_limited);
        previous_naive = current_naive;
        previous_limited = current_limited;
    }
    Ok(())
}

#[test]
fn test_write_components_canonical() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(3);
    let arcs = random_arcs(&mut rng, 12, 30);
    let n = num_nodes(&arcs);
    incscc::rng::seed(123);
    let sccs = run_algorithm(AlgorithmName::TwoWaySearch, n, &arcs, no_logging![]);

    let mut out = Vec::new();
    sccs.write_components(&mut out)?;
    let text = String::from_utf8(out)?;

    let mut seen = vec![false; n];
    let mut previous_min = None;
    for line in text.lines() {
        assert!(line.ends_with(' '));
        let ids: Vec<usize> = line
            .split_whitespace()
            .map(|token| token.parse().unwrap())
            .collect();
        assert!(!ids.is_empty());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids[0], *ids.iter().min().unwrap());
        assert!(previous_min < Some(ids[0]) || previous_min.is_none());
        previous_min = Some(ids[0]);
        for id in ids {
            assert!(!seen[id], "id {} printed twice", id);
            seen[id] = true;
        }
    }
    assert!(seen.into_iter().all(|s| s));
    Ok(())
}

#[test]
fn test_unknown_algorithm_name() {
    assert!("naive_dfs".parse::<AlgorithmName>().is_ok());
    let error = "quantum_search".parse::<AlgorithmName>().unwrap_err();
    assert_eq!(error.to_string(), "Unknown algorithm: quantum_search");
}
