use std::collections::BTreeMap;
use std::io::{self, BufReader, Read};

use crate::error::Result;
use crate::huffman::SENTINEL;

if_tracing! {
    use tracing::debug;
}

/// Symbol occurrence counts from one pass over the input.
///
/// Iterates in ascending symbol order, which the tree builder relies on for its tie-break.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    /// Counts every byte of `input` once, then adds one occurrence of [`SENTINEL`].
    ///
    /// The sentinel is added even when the input is empty or already contains it, so the
    /// result is never empty.
    pub fn scan<R: Read>(input: R) -> Result<Self> {
        let mut table = FrequencyTable::default();
        let mut reader = BufReader::new(input);
        let mut buf = [0u8; 8192];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.add_bytes(&buf[..n]);
        }
        table.add_sentinel();

        if_tracing! {{
            debug!(target = "frequency", distinct = table.len(), total = table.total(), "frequency scan complete");
        }}
        Ok(table)
    }

    /// In-memory form of [`FrequencyTable::scan`].
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = FrequencyTable::default();
        table.add_bytes(data);
        table.add_sentinel();
        table
    }

    fn add_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            *self.counts.entry(byte).or_insert(0) += 1;
        }
    }

    fn add_sentinel(&mut self) {
        *self.counts.entry(SENTINEL).or_insert(0) += 1;
    }

    /// Occurrences of `symbol`, zero if it was never seen.
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, sentinel included.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    /// Builds a table verbatim, without adding the sentinel. Zero counts are skipped.
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let counts = iter.into_iter().filter(|&(_, count)| count > 0).collect();
        FrequencyTable { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_holds_only_the_sentinel() {
        let table = FrequencyTable::from_bytes(b"");
        assert_eq!(table.len(), 1);
        assert_eq!(table.count(SENTINEL), 1);
    }

    #[test]
    fn counts_each_byte() {
        let table = FrequencyTable::from_bytes(b"abb");
        assert_eq!(table.count(b'a'), 1);
        assert_eq!(table.count(b'b'), 2);
        assert_eq!(table.count(SENTINEL), 1);
        assert_eq!(table.count(b'z'), 0);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn sentinel_bytes_in_input_are_counted_plus_one() {
        let table = FrequencyTable::from_bytes(&[SENTINEL, b'x', SENTINEL]);
        assert_eq!(table.count(SENTINEL), 3);
    }

    #[test]
    fn scan_matches_in_memory_form() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 7 % 251) as u8).collect();
        let scanned = FrequencyTable::scan(&data[..]).unwrap();
        assert_eq!(scanned, FrequencyTable::from_bytes(&data));
    }

    #[test]
    fn iterates_in_symbol_order() {
        let table = FrequencyTable::from_bytes(b"zya");
        let symbols: Vec<u8> = table.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, vec![SENTINEL, b'a', b'y', b'z']);
    }

    #[test]
    fn from_iter_does_not_add_the_sentinel() {
        let table: FrequencyTable = [(b'q', 4), (b'r', 0)].into_iter().collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.count(SENTINEL), 0);
    }
}
