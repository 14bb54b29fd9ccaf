//! Bit-stream storage: the container prelude, the header region, and the packed payload.
//!
//! ```text
//! offset 0    4 bytes  magic "HUFP"
//! offset 4    1 byte   format version
//! offset 5    4 bytes  header length, little-endian u32
//! offset 9    n bytes  header
//! offset 9+n  ...      payload bits, most significant bit first, last byte zero padded
//! ```
//!
//! Padding bits are never decoded, because the end-of-stream code stops the decoder first.

use crate::error::Result;
use crate::huffman::Code;

pub mod packed;

pub use packed::{PackedReader, PackedWriter};

pub const MAGIC: [u8; 4] = *b"HUFP";
pub const FORMAT_VERSION: u8 = 1;
pub const PRELUDE_LEN: usize = MAGIC.len() + 1 + 4;

/// Largest header the format can need: 256 entries of a symbol, `:`, a code of at most
/// 255 digits, and `/`.
pub const MAX_HEADER_LEN: usize = 256 * (255 + 3);

/// Receives codes from the encoder.
pub trait BitSink {
    /// Appends the bits of `code`.
    fn insert(&mut self, code: &Code) -> Result<()>;
}

/// Hands out bits to the decoder.
pub trait BitSource {
    /// Replaces the contents of `chunk` with the next available bits.
    ///
    /// Returns `false` once the source is exhausted; `chunk` is then empty.
    fn extract(&mut self, chunk: &mut Vec<bool>) -> Result<bool>;
}

/// In-memory sink. `Vec::insert` shadows the trait method on a concrete `Vec<bool>`, so call
/// it as `BitSink::insert(&mut bits, code)` outside generic code.
impl BitSink for Vec<bool> {
    fn insert(&mut self, code: &Code) -> Result<()> {
        self.extend(code.bits());
        Ok(())
    }
}

/// Bits held in memory, handed out `chunk_len` at a time.
#[derive(Clone, Debug)]
pub struct MemorySource<'a> {
    bits: &'a [bool],
    chunk_len: usize,
}

impl<'a> MemorySource<'a> {
    pub fn new(bits: &'a [bool], chunk_len: usize) -> Self {
        MemorySource {
            bits,
            chunk_len: chunk_len.max(1),
        }
    }
}

impl BitSource for MemorySource<'_> {
    fn extract(&mut self, chunk: &mut Vec<bool>) -> Result<bool> {
        chunk.clear();
        if self.bits.is_empty() {
            return Ok(false);
        }
        let n = self.chunk_len.min(self.bits.len());
        let (head, tail) = self.bits.split_at(n);
        chunk.extend_from_slice(head);
        self.bits = tail;
        Ok(true)
    }
}

/// Cheap check that `data` starts with a container prelude this build can read.
///
/// This does not mean the data will decode, only that the layout looks right.
pub fn has_valid_prelude(data: &[u8]) -> bool {
    if data.len() < PRELUDE_LEN || data[..4] != MAGIC || data[4] != FORMAT_VERSION {
        return false;
    }
    let header_len = u32::from_le_bytes([data[5], data[6], data[7], data[8]]) as usize;
    header_len <= MAX_HEADER_LEN && data.len() >= PRELUDE_LEN + header_len
}

/// Parses `digits` into bits. Characters other than `0` and `1` are skipped.
#[cfg(test)]
pub(crate) fn bits_of(digits: &str) -> Vec<bool> {
    digits.bytes().filter(|b| matches!(b, b'0' | b'1')).map(|b| b == b'1').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_appends_codes() {
        let mut sink: Vec<bool> = Vec::new();
        BitSink::insert(&mut sink, &Code::from_digits("10").unwrap()).unwrap();
        BitSink::insert(&mut sink, &Code::from_digits("011").unwrap()).unwrap();
        assert_eq!(sink, bits_of("10011"));
    }

    #[test]
    fn memory_source_chunks() {
        let bits = bits_of("1100101");
        let mut source = MemorySource::new(&bits, 3);
        let mut chunk = Vec::new();

        assert!(source.extract(&mut chunk).unwrap());
        assert_eq!(chunk, bits_of("110"));
        assert!(source.extract(&mut chunk).unwrap());
        assert_eq!(chunk, bits_of("010"));
        assert!(source.extract(&mut chunk).unwrap());
        assert_eq!(chunk, bits_of("1"));
        assert!(!source.extract(&mut chunk).unwrap());
        assert!(chunk.is_empty());
    }

    #[test]
    fn prelude_check() {
        let mut data = MAGIC.to_vec();
        data.push(FORMAT_VERSION);
        data.extend_from_slice(&3u32.to_le_bytes());
        assert!(!has_valid_prelude(&data), "header region is missing");

        data.extend_from_slice(b"\x03:/");
        assert!(has_valid_prelude(&data));

        data[4] = FORMAT_VERSION + 1;
        assert!(!has_valid_prelude(&data));
        assert!(!has_valid_prelude(b"HUF"));
    }
}
