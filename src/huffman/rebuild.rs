use crate::error::{HuffError, Result};
use crate::huffman::{CodeTable, SENTINEL};

if_tracing! {
    use tracing::debug;
}

/// Index of a slot in the arena.
pub type SlotId = usize;

const ROOT: SlotId = 0;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Slot {
    /// `[zero, one]`
    children: [Option<SlotId>; 2],
    symbol: Option<u8>,
}

impl Slot {
    fn is_leaf(&self) -> bool {
        self.children == [None, None]
    }
}

/// Decoding tree rebuilt from code paths alone, stored as an arena with the root at slot 0.
///
/// No weights survive into the compressed file; only the shape matters for decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeTree {
    slots: Vec<Slot>,
}

/// Where a single step from a node leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// An internal node; keep reading bits.
    Inner(SlotId),
    /// A leaf carrying a data symbol.
    Symbol(u8),
    /// The end-of-stream leaf.
    End,
    /// No edge for this bit.
    Missing,
}

impl DecodeTree {
    /// Rebuilds the tree by walking every code from a synthetic root, creating missing edges.
    ///
    /// # Errors
    ///
    /// Returns [`HuffError::CorruptHeader`] if the table is empty, lacks the end-of-stream
    /// symbol, or is not prefix free.
    pub fn rebuild(table: &CodeTable) -> Result<Self> {
        if table.is_empty() {
            return Err(HuffError::corrupt_header(0, "code table is empty"));
        }
        if table.sentinel().is_none() {
            return Err(HuffError::corrupt_header(0, "code table has no end-of-stream entry"));
        }

        let mut tree = DecodeTree {
            slots: vec![Slot::default()],
        };

        for (symbol, code) in table.iter() {
            let mut cur = ROOT;
            for bit in code.bits() {
                if tree.slots[cur].symbol.is_some() {
                    return Err(prefix_violation(symbol));
                }
                cur = match tree.slots[cur].children[bit as usize] {
                    Some(next) => next,
                    None => {
                        let next = tree.slots.len();
                        tree.slots.push(Slot::default());
                        tree.slots[cur].children[bit as usize] = Some(next);
                        next
                    }
                };
            }

            let slot = &mut tree.slots[cur];
            if slot.symbol.is_some() || !slot.is_leaf() {
                return Err(prefix_violation(symbol));
            }
            slot.symbol = Some(symbol);
        }

        if_tracing! {{
            debug!(target = "rebuild", entries = table.len(), slots = tree.slots.len(), "decode tree rebuilt");
        }}
        Ok(tree)
    }

    pub fn root(&self) -> SlotId {
        ROOT
    }

    /// The symbol held by the root when the whole table is a single zero-length code.
    pub fn root_symbol(&self) -> Option<u8> {
        self.slots[ROOT].symbol
    }

    /// Follows one edge from `from`.
    pub fn step(&self, from: SlotId, bit: bool) -> Step {
        let Some(next) = self.slots[from].children[bit as usize] else {
            return Step::Missing;
        };
        let slot = &self.slots[next];
        if !slot.is_leaf() {
            return Step::Inner(next);
        }
        match slot.symbol {
            Some(SENTINEL) => Step::End,
            Some(symbol) => Step::Symbol(symbol),
            // every created slot lies on the path to some symbol, so a bare leaf is unreachable
            None => Step::Missing,
        }
    }

    /// Number of slots in the arena.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn prefix_violation(symbol: u8) -> HuffError {
    HuffError::corrupt_header(0, format!("code for symbol 0x{:02x} collides with another code's path", symbol))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman::{Code, FrequencyTable, HuffmanTree, header};

    fn table(entries: &[(u8, &str)]) -> CodeTable {
        entries
            .iter()
            .map(|&(symbol, digits)| (symbol, Code::from_digits(digits).unwrap()))
            .collect()
    }

    #[test]
    fn abb_tree_walks() {
        let codes = CodeTable::from_tree(&HuffmanTree::build(&FrequencyTable::from_bytes(b"abb")).unwrap());
        let tree = DecodeTree::rebuild(&codes).unwrap();

        // root, "0" leaf, "1" inner, "10" and "11" leaves
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.step(tree.root(), false), Step::Symbol(b'b'));
        let Step::Inner(one) = tree.step(tree.root(), true) else {
            panic!("the one branch of the root must be internal");
        };
        assert_eq!(tree.step(one, false), Step::End);
        assert_eq!(tree.step(one, true), Step::Symbol(b'a'));
    }

    #[test]
    fn every_code_leads_to_its_symbol() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let codes = CodeTable::from_tree(&HuffmanTree::build(&FrequencyTable::from_bytes(data)).unwrap());
        let tree = DecodeTree::rebuild(&codes).unwrap();

        for (symbol, code) in codes.iter() {
            let mut cur = tree.root();
            let mut last = Step::Missing;
            for bit in code.bits() {
                last = tree.step(cur, bit);
                if let Step::Inner(next) = last {
                    cur = next;
                }
            }
            let expected = if symbol == SENTINEL { Step::End } else { Step::Symbol(symbol) };
            assert_eq!(last, expected, "code {} for 0x{:02x}", code, symbol);
        }
    }

    #[test]
    fn degenerate_table_puts_the_sentinel_on_the_root() {
        let tree = DecodeTree::rebuild(&table(&[(SENTINEL, "")])).unwrap();
        assert_eq!(tree.root_symbol(), Some(SENTINEL));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn shorter_code_first_is_a_prefix_violation() {
        let err = DecodeTree::rebuild(&table(&[(SENTINEL, "0"), (b'a', "01"), (b'b', "1")])).unwrap_err();
        assert!(matches!(err, HuffError::CorruptHeader { .. }));
    }

    #[test]
    fn longer_code_first_is_a_prefix_violation() {
        // 0x03 is visited before 'a', so its longer path exists when 'a' lands on it
        let err = DecodeTree::rebuild(&table(&[(SENTINEL, "00"), (b'a', "0"), (b'b', "1")])).unwrap_err();
        assert!(matches!(err, HuffError::CorruptHeader { .. }));
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let err = DecodeTree::rebuild(&table(&[(SENTINEL, "1"), (b'a', "1"), (b'b', "0")])).unwrap_err();
        assert!(matches!(err, HuffError::CorruptHeader { .. }));
    }

    #[test]
    fn empty_code_beside_others_is_rejected() {
        let err = DecodeTree::rebuild(&table(&[(SENTINEL, ""), (b'a', "1")])).unwrap_err();
        assert!(matches!(err, HuffError::CorruptHeader { .. }));
    }

    #[test]
    fn missing_sentinel_is_rejected() {
        let parsed = header::parse(b"a:0/b:1/").unwrap();
        let err = DecodeTree::rebuild(&parsed).unwrap_err();
        assert!(err.to_string().contains("end-of-stream"));
    }

    #[test]
    fn incomplete_tree_reports_missing_edges() {
        // a valid prefix-free table that leaves the "11" edge unused
        let tree = DecodeTree::rebuild(&table(&[(SENTINEL, "0"), (b'a', "10")])).unwrap();
        let Step::Inner(one) = tree.step(tree.root(), true) else {
            panic!("expected an internal node");
        };
        assert_eq!(tree.step(one, true), Step::Missing);
    }
}
