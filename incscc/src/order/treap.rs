/*
 * SPDX-FileCopyrightText: 2025 Matteo Dell'Acqua
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::DynamicOrder;
use crate::rng;

#[derive(Clone, Debug)]
struct Node {
    priority: u64,
    size: usize,
    left: Option<usize>,
    right: Option<usize>,
    parent: Option<usize>,
}

/// An implicit-key randomised binary search tree with parent pointers.
///
/// Nodes live in an arena with one slot per element id, so links are
/// plain ids. The rank of an element is recovered in O(log n) expected
/// time by climbing the parent chain, which makes
/// [`is_before`](DynamicOrder::is_before) an O(log n) rank comparison.
/// Priorities are drawn from the process-wide [`rng`].
#[derive(Clone, Debug)]
pub struct TreapOrder {
    root: Option<usize>,
    nodes: Vec<Option<Node>>,
}

impl TreapOrder {
    /// Creates an order over `n` elements, initially containing
    /// `0, 1, …, n - 1` in this sequence.
    pub fn new(n: usize) -> Self {
        let mut order = Self {
            root: None,
            nodes: Vec::from_iter((0..n).map(|_| None)),
        };
        for x in 0..n {
            order.insert_back(x);
        }
        order
    }

    fn assure_present(&self, x: usize) {
        if self.nodes[x].is_none() {
            panic!("Element does not exist: {}", x);
        }
    }

    fn assure_absent(&self, x: usize) {
        if self.nodes[x].is_some() {
            panic!("Element already exists: {}", x);
        }
    }

    fn node(&self, x: usize) -> &Node {
        self.nodes[x].as_ref().unwrap()
    }

    fn node_mut(&mut self, x: usize) -> &mut Node {
        self.nodes[x].as_mut().unwrap()
    }

    fn size(&self, node: Option<usize>) -> usize {
        node.map_or(0, |x| self.node(x).size)
    }

    fn rank(&self, x: usize) -> usize {
        let mut rank = self.size(self.node(x).left) + 1;
        let mut current = x;
        while let Some(parent) = self.node(current).parent {
            if self.node(parent).right == Some(current) {
                rank += self.size(self.node(parent).left) + 1;
            }
            current = parent;
        }
        rank
    }

    fn update(&mut self, x: usize) {
        let left = self.node(x).left;
        let right = self.node(x).right;
        self.node_mut(x).size = 1 + self.size(left) + self.size(right);
        if let Some(l) = left {
            self.node_mut(l).parent = Some(x);
        }
        if let Some(r) = right {
            self.node_mut(r).parent = Some(x);
        }
    }

    /// Splits `node` into the first `k` elements and the rest.
    fn split(&mut self, node: Option<usize>, k: usize) -> (Option<usize>, Option<usize>) {
        let Some(x) = node else {
            return (None, None);
        };
        if self.size(self.node(x).left) >= k {
            let (left, mid) = self.split(self.node(x).left, k);
            self.node_mut(x).left = mid;
            self.node_mut(x).parent = None;
            self.update(x);
            (left, Some(x))
        } else {
            let k = k - self.size(self.node(x).left) - 1;
            let (mid, right) = self.split(self.node(x).right, k);
            self.node_mut(x).right = mid;
            self.node_mut(x).parent = None;
            self.update(x);
            (Some(x), right)
        }
    }

    fn merge(&mut self, x: Option<usize>, y: Option<usize>) -> Option<usize> {
        let (x, y) = match (x, y) {
            (None, y) => return y,
            (x, None) => return x,
            (Some(x), Some(y)) => (x, y),
        };
        if self.node(x).priority > self.node(y).priority {
            let merged = self.merge(self.node(x).right, Some(y));
            self.node_mut(x).right = merged;
            self.update(x);
            self.node_mut(x).parent = None;
            Some(x)
        } else {
            let merged = self.merge(Some(x), self.node(y).left);
            self.node_mut(y).left = merged;
            self.update(y);
            self.node_mut(y).parent = None;
            Some(y)
        }
    }

    fn insert_at_position(&mut self, x: usize, position: usize) {
        let (left, right) = self.split(self.root, position);
        self.nodes[x] = Some(Node {
            priority: rng::random_u64(),
            size: 1,
            left: None,
            right: None,
            parent: None,
        });
        let left = self.merge(left, Some(x));
        self.root = self.merge(left, right);
    }
}

impl DynamicOrder for TreapOrder {
    fn insert_back(&mut self, x: usize) {
        self.assure_absent(x);
        self.nodes[x] = Some(Node {
            priority: rng::random_u64(),
            size: 1,
            left: None,
            right: None,
            parent: None,
        });
        self.root = self.merge(self.root, Some(x));
    }

    fn insert_before(&mut self, x: usize, y: usize) {
        self.assure_absent(x);
        self.assure_present(y);
        self.insert_at_position(x, self.rank(y) - 1);
    }

    fn insert_after(&mut self, x: usize, y: usize) {
        self.assure_absent(x);
        self.assure_present(y);
        self.insert_at_position(x, self.rank(y));
    }

    fn remove(&mut self, x: usize) {
        self.assure_present(x);
        let position = self.rank(x) - 1;
        let (left, rest) = self.split(self.root, position);
        let (_, right) = self.split(rest, 1);
        self.nodes[x] = None;
        self.root = self.merge(left, right);
    }

    fn is_before(&self, x: usize, y: usize) -> bool {
        self.assure_present(x);
        self.assure_present(y);
        self.rank(x) < self.rank(y)
    }

    fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn grow(&mut self) {
        self.nodes.push(None);
    }

    fn first(&self) -> usize {
        let Some(mut current) = self.root else {
            panic!("Cannot retrieve the first element from an empty order");
        };
        while let Some(left) = self.node(current).left {
            current = left;
        }
        current
    }
}
