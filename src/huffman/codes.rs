use core::fmt;
use std::collections::BTreeMap;

use crate::huffman::{HuffNode, HuffmanTree, SENTINEL};

/// A root-to-leaf path: `'0'` for the zero branch, `'1'` for the one branch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(String);

impl Code {
    /// Wraps a string of `'0'`/`'1'` digits, or returns `None` if any other character appears.
    pub fn from_digits(digits: &str) -> Option<Self> {
        digits.bytes().all(|b| b == b'0' || b == b'1').then(|| Code(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bits in path order, `true` for the one branch.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.bytes().map(|b| b == b'1')
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        other.0.starts_with(&self.0)
    }

    fn push(&mut self, bit: bool) {
        self.0.push(if bit { '1' } else { '0' });
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symbol to code mapping, one entry per leaf, iterated in ascending symbol order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    /// Walks `tree` once and records the path to every leaf.
    ///
    /// A tree whose root is a leaf yields a single empty code. The stream codec handles that
    /// case by writing no bits at all.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = CodeTable::default();
        let mut path = Code::default();
        table.collect(tree.root(), &mut path);
        table
    }

    fn collect(&mut self, node: &HuffNode, path: &mut Code) {
        match node {
            HuffNode::Leaf { symbol, .. } => {
                self.codes.insert(*symbol, path.clone());
            }
            HuffNode::Internal { zero, one, .. } => {
                path.push(true);
                self.collect(one, path);
                path.pop();

                path.push(false);
                self.collect(zero, path);
                path.pop();
            }
        }
    }

    /// Records `code` for `symbol`, returning the code it replaced.
    pub fn insert(&mut self, symbol: u8, code: Code) -> Option<Code> {
        self.codes.insert(symbol, code)
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn sentinel(&self) -> Option<&Code> {
        self.get(SENTINEL)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    /// True when no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        // after sorting, a prefix always sorts directly before some code it prefixes
        let mut sorted: Vec<&Code> = self.codes.values().collect();
        sorted.sort();
        sorted.windows(2).all(|pair| !pair[0].is_prefix_of(pair[1]))
    }

    /// Average bits per symbol when weighted by `frequencies`.
    pub fn weighted_length(&self, frequencies: impl IntoIterator<Item = (u8, u64)>) -> f64 {
        let (bits, count) = frequencies.into_iter().fold((0u64, 0u64), |(bits, count), (symbol, weight)| {
            let len = self.get(symbol).map_or(0, Code::len) as u64;
            (bits + len * weight, count + weight)
        });
        if count == 0 { 0.0 } else { bits as f64 / count as f64 }
    }
}

impl FromIterator<(u8, Code)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (u8, Code)>>(iter: I) -> Self {
        CodeTable {
            codes: iter.into_iter().collect(),
        }
    }
}
