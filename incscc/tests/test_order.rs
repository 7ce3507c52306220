/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use incscc::order::{DynamicOrder, LinkedOrder, TreapOrder, TwoLevelOrder};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A vector reference model mirroring the order under test.
struct Model {
    sequence: Vec<usize>,
}

impl Model {
    fn new(n: usize) -> Self {
        Self {
            sequence: Vec::from_iter(0..n),
        }
    }

    fn position(&self, x: usize) -> Option<usize> {
        self.sequence.iter().position(|&y| y == x)
    }

    fn insert_back(&mut self, x: usize) {
        self.sequence.push(x);
    }

    fn insert_before(&mut self, x: usize, y: usize) {
        let i = self.position(y).unwrap();
        self.sequence.insert(i, x);
    }

    fn insert_after(&mut self, x: usize, y: usize) {
        let i = self.position(y).unwrap();
        self.sequence.insert(i + 1, x);
    }

    fn remove(&mut self, x: usize) {
        let i = self.position(x).unwrap();
        self.sequence.remove(i);
    }
}

fn check_against_model(order: &impl DynamicOrder, model: &Model) {
    if let Some(&first) = model.sequence.first() {
        assert_eq!(order.first(), first);
    }
    for (i, &x) in model.sequence.iter().enumerate() {
        for &y in &model.sequence[i + 1..] {
            assert!(order.is_before(x, y), "{} should precede {}", x, y);
            assert!(!order.is_before(y, x), "{} should not precede {}", y, x);
        }
        assert!(!order.is_before(x, x));
    }
}

fn test_basic_operations(mut order: impl DynamicOrder) {
    // Initial order is 0, 1, …, n - 1.
    let mut model = Model::new(8);
    check_against_model(&order, &model);

    order.remove(3);
    model.remove(3);
    order.insert_before(3, 0);
    model.insert_before(3, 0);
    check_against_model(&order, &model);

    order.remove(7);
    model.remove(7);
    order.insert_after(7, 3);
    model.insert_after(7, 3);
    check_against_model(&order, &model);

    order.remove(0);
    model.remove(0);
    order.insert_back(0);
    model.insert_back(0);
    check_against_model(&order, &model);

    assert_eq!(order.capacity(), 8);
    order.grow();
    assert_eq!(order.capacity(), 9);
    order.insert_back(8);
    model.insert_back(8);
    check_against_model(&order, &model);
}

fn test_insert_remove_restores(mut order: impl DynamicOrder) {
    let model = Model::new(6);
    order.remove(2);
    order.insert_after(2, 4);
    order.remove(2);
    order.insert_after(2, 1);
    check_against_model(&order, &model);

    order.remove(0);
    order.insert_before(0, 5);
    order.remove(0);
    order.insert_before(0, 1);
    check_against_model(&order, &model);
}

fn test_random_operations(mut order: impl DynamicOrder, seed: u64) {
    let n = 40;
    let mut model = Model::new(n);
    let mut rng = SmallRng::seed_from_u64(seed);

    for _ in 0..400 {
        let x = rng.random_range(0..n);
        if model.position(x).is_some() {
            if model.sequence.len() > 1 {
                order.remove(x);
                model.remove(x);
            }
        } else {
            let y = model.sequence[rng.random_range(0..model.sequence.len())];
            match rng.random_range(0..3) {
                0 => {
                    order.insert_before(x, y);
                    model.insert_before(x, y);
                }
                1 => {
                    order.insert_after(x, y);
                    model.insert_after(x, y);
                }
                _ => {
                    order.insert_back(x);
                    model.insert_back(x);
                }
            }
        }
    }
    check_against_model(&order, &model);
}

/// Removing everything and re-inserting front-first stresses the
/// relabelling paths of the two-level implementation.
fn test_refill_front(mut order: impl DynamicOrder, n: usize) {
    for x in 1..n {
        order.remove(x);
    }
    for x in (1..n).rev() {
        order.insert_after(x, 0);
    }
    // Expected order: 0, 1, 2, …, n - 1.
    let model = Model::new(n);
    check_against_model(&order, &model);
}

macro_rules! order_tests {
    ($name:ident, $make:expr) => {
        mod $name {
            use super::*;

            #[test]
            fn test_basic() -> Result<()> {
                incscc::rng::seed(123);
                test_basic_operations($make(8));
                Ok(())
            }

            #[test]
            fn test_insert_remove_restoration() -> Result<()> {
                incscc::rng::seed(123);
                test_insert_remove_restores($make(6));
                Ok(())
            }

            #[test]
            fn test_random() -> Result<()> {
                incscc::rng::seed(123);
                for seed in 0..4 {
                    test_random_operations($make(40), seed);
                }
                Ok(())
            }

            #[test]
            fn test_refill() -> Result<()> {
                incscc::rng::seed(123);
                test_refill_front($make(70), 70);
                Ok(())
            }

            #[test]
            #[should_panic(expected = "already exists")]
            fn test_insert_present_panics() {
                let mut order = $make(3);
                order.insert_back(1);
            }

            #[test]
            #[should_panic(expected = "does not exist")]
            fn test_remove_absent_panics() {
                let mut order = $make(3);
                order.remove(1);
                order.remove(1);
            }
        }
    };
}

order_tests!(linked, |n| LinkedOrder::new(n));
order_tests!(treap, |n| TreapOrder::new(n));
order_tests!(two_level, |n| TwoLevelOrder::new(n));

#[test]
#[should_panic(expected = "empty order")]
fn test_first_of_empty_panics() {
    let mut order = LinkedOrder::new(1);
    order.remove(0);
    order.first();
}
