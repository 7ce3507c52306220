/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::{Context, Result};
use clap::Parser;
use dsi_progress_logger::prelude::*;
use incscc_algo::{run_algorithm, AlgorithmName, Arc};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The seed of the process-wide random generator, fixed so that runs
/// are reproducible.
const RNG_SEED: u64 = 123;

#[derive(Parser, Debug)]
#[command(name = "incscc")]
/// Maintains strongly connected components of a graph incrementally
/// while the arcs of a given file are inserted one by one, and prints
/// the final components, one per line.
///
/// Noteworthy environment variables:
///
/// - RUST_LOG: configuration for env_logger
///   <https://docs.rs/env_logger/latest/env_logger/>
struct Cli {
    /// The algorithm to run: one of naive_dfs, naive_one_way_search,
    /// one_way_search, two_way_search, limited_search,
    /// compatible_search, soft_threshold_search,
    /// soft_threshold_search_basic_list, soft_threshold_search_treap,
    /// topological_search, sample_search, sparsified_sample_search.
    algorithm: String,

    /// A file of whitespace-separated decimal arc pairs, one `u v` pair
    /// per arc.
    arcs: PathBuf,
}

/// Reads whitespace-separated id pairs; parsing stops silently at the
/// first token that is not a decimal id, and a trailing odd token is
/// dropped.
fn read_arcs(path: &Path) -> Result<Vec<Arc>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Error opening file: {}", path.display()))?;
    let mut arcs = Vec::new();
    let mut tokens = content.split_whitespace();
    while let (Some(u), Some(v)) = (tokens.next(), tokens.next()) {
        let (Ok(u), Ok(v)) = (u.parse::<usize>(), v.parse::<usize>()) else {
            break;
        };
        arcs.push((u, v));
    }
    Ok(arcs)
}

fn num_nodes(arcs: &[Arc]) -> usize {
    arcs.iter().map(|&(u, v)| u.max(v)).max().unwrap_or(0) + 1
}

fn run(cli: &Cli) -> Result<()> {
    let algorithm = cli.algorithm.parse::<AlgorithmName>()?;
    let arcs = read_arcs(&cli.arcs)?;
    let num_nodes = num_nodes(&arcs);
    log::info!(
        "Running {} on {} arcs over {} nodes",
        algorithm,
        arcs.len(),
        num_nodes
    );

    let mut pl = progress_logger![];
    let sccs = run_algorithm(algorithm, num_nodes, &arcs, &mut pl);
    log::info!("Found {} strongly connected components", sccs.num_components());

    let stdout = std::io::stdout();
    let mut writer = std::io::BufWriter::new(stdout.lock());
    sccs.write_components(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    incscc::rng::seed(RNG_SEED);

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1);
        }
    };
    if let Err(error) = run(&cli) {
        eprintln!("{:#}", error);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_arc_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_arcs_any_whitespace() {
        let file = write_arc_file("0 1\n1\t2   2\n0\n");
        let arcs = read_arcs(file.path()).unwrap();
        assert_eq!(arcs, vec![(0, 1), (1, 2), (2, 0)]);
        assert_eq!(num_nodes(&arcs), 3);
    }

    #[test]
    fn test_read_arcs_stops_at_garbage() {
        let file = write_arc_file("0 1 2 x 3 4");
        let arcs = read_arcs(file.path()).unwrap();
        assert_eq!(arcs, vec![(0, 1)]);
    }

    #[test]
    fn test_read_arcs_drops_trailing_token() {
        let file = write_arc_file("0 1 7");
        let arcs = read_arcs(file.path()).unwrap();
        assert_eq!(arcs, vec![(0, 1)]);
    }

    #[test]
    fn test_empty_file_has_one_node() {
        let file = write_arc_file("");
        let arcs = read_arcs(file.path()).unwrap();
        assert!(arcs.is_empty());
        assert_eq!(num_nodes(&arcs), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_arcs(Path::new("/nonexistent/arcs.txt")).is_err());
    }
}
