/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use incscc::union_find::{UnionFind, UnionResult};

#[test]
fn test_representative_is_idempotent() -> Result<()> {
    let mut union_find = UnionFind::new(10);
    union_find.union(0, 1);
    union_find.union(1, 2);
    union_find.union(5, 6);
    for u in 0..10 {
        let repr = union_find.representative(u);
        assert_eq!(union_find.representative(repr), repr);
    }
    Ok(())
}

#[test]
fn test_union_returns_none_iff_already_joined() -> Result<()> {
    let mut union_find = UnionFind::new(4);
    assert!(union_find.union(0, 1).is_some());
    assert!(union_find.union(1, 0).is_none());
    assert!(union_find.union(2, 3).is_some());
    assert!(union_find.union(0, 3).is_some());
    assert!(union_find.union(1, 2).is_none());
    Ok(())
}

#[test]
fn test_larger_side_keeps_its_representative() -> Result<()> {
    let mut union_find = UnionFind::new(5);
    let first = union_find.union(0, 1).unwrap();
    // A tie keeps the first argument.
    assert_eq!(
        first,
        UnionResult {
            kept: 0,
            absorbed: 1
        }
    );

    // {0, 1} outweighs {2}, whichever way the arguments go.
    let second = union_find.union(2, 0).unwrap();
    assert_eq!(
        second,
        UnionResult {
            kept: 0,
            absorbed: 2
        }
    );
    assert_eq!(union_find.representative(2), 0);
    Ok(())
}
