//! Huffman tree construction.
//!
//! The tree is built with the classic greedy merge: every symbol with a
//! non-zero count becomes a leaf, and the two lightest nodes are repeatedly
//! joined under a new internal node until one root remains.
//!
//! # Tie-breaking
//!
//! Nodes of equal weight are extracted in insertion order. Leaves are
//! inserted in ascending symbol order, and each merged node is inserted after
//! every node that already exists. The first node extracted becomes the left
//! child. The resulting tree is therefore identical on every platform.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;

/// Huffman tree node.
///
/// Weights are only meaningful for trees produced by [`HuffmanTree::build`];
/// trees reconstructed from a serialized form carry weight 0 everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A node holding one alphabet symbol.
    Leaf {
        /// The byte this leaf decodes to.
        symbol: u8,
        /// Occurrence count of `symbol`.
        weight: u64,
    },
    /// A node with exactly two children.
    Internal {
        /// Subtree reached by a `0` bit.
        left: Box<Node>,
        /// Subtree reached by a `1` bit.
        right: Box<Node>,
        /// Sum of the subtree's leaf weights.
        weight: u64,
    },
}

impl Node {
    /// Create a leaf.
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        Node::Leaf { symbol, weight }
    }

    /// Join two subtrees under a new internal node.
    pub fn internal(left: Node, right: Node, weight: u64) -> Self {
        Node::Internal {
            left: Box::new(left),
            right: Box::new(right),
            weight,
        }
    }

    /// Weight of this node.
    pub fn weight(&self) -> u64 {
        match self {
            Node::Leaf { weight, .. } => *weight,
            Node::Internal { weight, .. } => *weight,
        }
    }

    /// True when the node has no children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Symbol held by a leaf, `None` for internal nodes.
    pub fn symbol(&self) -> Option<u8> {
        match self {
            Node::Leaf { symbol, .. } => Some(*symbol),
            Node::Internal { .. } => None,
        }
    }

    /// `(left, right)` for internal nodes, `None` for leaves.
    pub fn children(&self) -> Option<(&Node, &Node)> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some((left, right)),
        }
    }
}

/// Heap entry: a subtree plus its insertion sequence number.
#[derive(Debug)]
struct Pending {
    seq: u32,
    node: Node,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-priority queue on (weight, seq)
        other
            .node
            .weight()
            .cmp(&self.node.weight())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A complete Huffman tree over the byte alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: Node,
}

impl HuffmanTree {
    /// Build a tree from symbol frequencies.
    ///
    /// A table with a single distinct symbol yields a tree whose root is a
    /// leaf; no merging happens.
    ///
    /// # Errors
    /// Returns `Error::EmptyInput` if every count is zero.
    pub fn build(table: &FrequencyTable) -> Result<Self> {
        let mut pq = BinaryHeap::with_capacity(table.distinct());
        let mut seq = 0u32;
        for (symbol, weight) in table.symbols() {
            pq.push(Pending {
                seq,
                node: Node::leaf(symbol, weight),
            });
            seq += 1;
        }

        let root = loop {
            let left = pq.pop().ok_or(Error::EmptyInput)?;
            let Some(right) = pq.pop() else {
                break left.node;
            };
            let weight = left.node.weight() + right.node.weight();
            pq.push(Pending {
                seq,
                node: Node::internal(left.node, right.node, weight),
            });
            seq += 1;
        };

        let tree = Self { root };
        log::debug!(
            "Built Huffman tree: {} leaves, depth {}, weight {}",
            tree.leaf_count(),
            tree.depth(),
            tree.root.weight()
        );
        Ok(tree)
    }

    /// Wrap an existing root.
    pub fn from_root(root: Node) -> Self {
        Self { root }
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// True when the root is itself a leaf (single-symbol alphabet).
    pub fn is_single_leaf(&self) -> bool {
        self.root.is_leaf()
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    /// Number of internal nodes.
    pub fn internal_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some((l, r)) = node.children() {
                count += 1;
                stack.push(l);
                stack.push(r);
            }
        }
        count
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.leaves().map(|(_, d)| d).max().unwrap_or(0)
    }

    /// Iterate `(symbol, depth)` for every leaf, left to right.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: vec![(&self.root, 0)],
        }
    }

    /// Total encoded length in bits for the weights stored in the tree.
    pub fn weighted_path_length(&self) -> u64 {
        let mut total = 0;
        let mut stack = vec![(&self.root, 0u64)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                Node::Leaf { weight, .. } => total += weight * depth,
                Node::Internal { left, right, .. } => {
                    stack.push((right, depth + 1));
                    stack.push((left, depth + 1));
                }
            }
        }
        total
    }

    /// True when both trees have the same shape and the same leaf symbols,
    /// ignoring weights.
    pub fn same_shape(&self, other: &HuffmanTree) -> bool {
        let mut stack = vec![(&self.root, &other.root)];
        while let Some((a, b)) = stack.pop() {
            match (a.children(), b.children()) {
                (None, None) => {
                    if a.symbol() != b.symbol() {
                        return false;
                    }
                }
                (Some((al, ar)), Some((bl, br))) => {
                    stack.push((al, bl));
                    stack.push((ar, br));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Pre-order iterator over leaves and their depths.
pub struct Leaves<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl Iterator for Leaves<'_> {
    type Item = (u8, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, depth)) = self.stack.pop() {
            match node {
                Node::Leaf { symbol, .. } => return Some((*symbol, depth)),
                Node::Internal { left, right, .. } => {
                    self.stack.push((right, depth + 1));
                    self.stack.push((left, depth + 1));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_build_literal() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"aaaabbbcc")).unwrap();
        let leaves: Vec<_> = tree.leaves().collect();
        assert_eq!(leaves, vec![(b'a', 1), (b'c', 2), (b'b', 2)]);
        assert_eq!(tree.root().weight(), 9);
        assert_eq!(tree.internal_count(), 2);
        assert_eq!(tree.weighted_path_length(), 4 + 3 * 2 + 2 * 2);
    }

    #[test]
    fn test_build_empty() {
        let err = HuffmanTree::build(&FrequencyTable::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn test_build_single_symbol() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(&[0x41; 1000])).unwrap();
        assert!(tree.is_single_leaf());
        assert_eq!(tree.root(), &Node::leaf(0x41, 1000));
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.internal_count(), 0);
    }

    #[test]
    fn test_equal_weights_keep_insertion_order() {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(b"abcd")).unwrap();
        let leaves: Vec<_> = tree.leaves().collect();
        assert_eq!(leaves, vec![(b'a', 2), (b'b', 2), (b'c', 2), (b'd', 2)]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let table = FrequencyTable::from_bytes(b"the quick brown fox jumps over the lazy dog");
        let a = HuffmanTree::build(&table).unwrap();
        let b = HuffmanTree::build(&table).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_shape_ignores_weights() {
        let a = HuffmanTree::from_root(Node::internal(Node::leaf(1, 5), Node::leaf(2, 7), 12));
        let b = HuffmanTree::from_root(Node::internal(Node::leaf(1, 0), Node::leaf(2, 0), 0));
        let c = HuffmanTree::from_root(Node::internal(Node::leaf(2, 0), Node::leaf(1, 0), 0));
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }

    proptest! {
        #[test]
        fn prop_full_binary(data in prop::collection::vec(any::<u8>(), 1..512)) {
            let table = FrequencyTable::from_bytes(&data);
            let tree = HuffmanTree::build(&table).unwrap();
            prop_assert_eq!(tree.leaf_count(), table.distinct());
            prop_assert_eq!(tree.internal_count(), table.distinct() - 1);
            prop_assert_eq!(tree.root().weight(), data.len() as u64);
        }
    }
}
