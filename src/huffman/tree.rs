use core::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{HuffError, Result};
use crate::huffman::FrequencyTable;

if_tracing! {
    use tracing::debug;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        zero: Box<HuffNode>,
        one: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        HuffNode::Leaf { symbol, weight }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } | HuffNode::Internal { weight, .. } => *weight,
        }
    }

    /// Joins two subtrees. `zero` is the lighter one, taken first from the queue.
    pub fn merge(zero: Self, one: Self) -> Self {
        HuffNode::Internal {
            weight: zero.weight() + one.weight(),
            zero: Box::new(zero),
            one: Box::new(one),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// Longest root-to-leaf path below this node.
    pub fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { zero, one, .. } => 1 + zero.depth().max(one.depth()),
        }
    }
}

/// Queue entry: a subtree plus the order it entered the queue in.
///
/// Ordered by weight, then by sequence number, reversed so that [`BinaryHeap`] pops the
/// lightest and oldest entry first. Leaves enter in ascending symbol order and every merged
/// node gets the next free number, so equal weights resolve the same way on every run.
struct Queued {
    seq: usize,
    node: HuffNode,
}

impl Queued {
    fn key(&self) -> (u64, usize) {
        (self.node.weight(), self.seq)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Builds the tree by repeatedly merging the two lightest nodes.
    ///
    /// A table with a single entry performs no merge and that leaf becomes the root.
    ///
    /// # Errors
    ///
    /// Returns [`HuffError::EmptyTable`] if `frequencies` has no entries.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            if_tracing! {{
                tracing::warn!(target = "tree", "refusing to build a tree from an empty frequency table");
            }}
            return Err(HuffError::EmptyTable);
        }

        let mut heap: BinaryHeap<Queued> = frequencies
            .iter()
            .enumerate()
            .map(|(seq, (symbol, weight))| Queued {
                seq,
                node: HuffNode::leaf(symbol, weight),
            })
            .collect();
        let mut next_seq = heap.len();

        let root = loop {
            let zero = heap.pop().ok_or(HuffError::EmptyTable)?;
            let Some(one) = heap.pop() else {
                break zero.node;
            };
            heap.push(Queued {
                seq: next_seq,
                node: HuffNode::merge(zero.node, one.node),
            });
            next_seq += 1;
        };

        if_tracing! {{
            debug!(target = "tree", leaves = frequencies.len(), merges = frequencies.len() - 1, depth = root.depth(), weight = root.weight(), "tree built");
        }}
        Ok(HuffmanTree { root })
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}
