//! The Huffman core: frequency analysis, tree construction, code derivation, the header
//! codec, tree reconstruction, and the bit-stream traversal.

pub mod codes;
pub mod frequency;
pub mod header;
pub mod rebuild;
pub mod stream;
pub mod tree;

pub use codes::{Code, CodeTable};
pub use frequency::FrequencyTable;
pub use rebuild::DecodeTree;
pub use tree::{HuffNode, HuffmanTree};

/// End-of-transmission byte marking the end of the decoded content.
///
/// Every frequency table and every code table contains it exactly once.
pub const SENTINEL: u8 = 0x03;
