use std::io::{self, Read, Write};

use arcode::bitbit::{BitReader, BitWriter, MSB};

use crate::error::{HuffError, Result};
use crate::huffman::Code;
use crate::storage::{BitSink, BitSource, FORMAT_VERSION, MAGIC, MAX_HEADER_LEN};

if_tracing! {
    use tracing::{debug, warn};
}

/// Packs codes eight bits per byte behind a container prelude and header.
///
/// The header is written on construction, so bits can never precede it. `W` is usually a
/// `&mut` to a buffered writer that the caller flushes after [`PackedWriter::finish`].
pub struct PackedWriter<W: Write> {
    bits: BitWriter<W>,
    bit_count: u64,
}

impl<W: Write> PackedWriter<W> {
    /// Writes the prelude and `header`, then readies the payload region.
    pub fn new(mut writer: W, header: &[u8]) -> Result<Self> {
        if header.len() > MAX_HEADER_LEN {
            return Err(HuffError::invalid_container(format!(
                "header of {} bytes exceeds the {} byte limit",
                header.len(),
                MAX_HEADER_LEN
            )));
        }
        writer.write_all(&MAGIC)?;
        writer.write_all(&[FORMAT_VERSION])?;
        writer.write_all(&(header.len() as u32).to_le_bytes())?;
        writer.write_all(header)?;

        if_tracing! {{
            debug!(target = "storage", header_len = header.len(), "container header written");
        }}
        Ok(PackedWriter {
            bits: BitWriter::new(writer),
            bit_count: 0,
        })
    }

    /// Payload bits written so far.
    pub fn bit_count(&self) -> u64 {
        self.bit_count
    }

    /// Zero-pads the final byte. Returns the number of payload bits, padding excluded.
    pub fn finish(mut self) -> Result<u64> {
        if self.bit_count % 8 != 0 {
            self.bits.pad_to_byte()?;
        }
        if_tracing! {{
            debug!(target = "storage", bits = self.bit_count, bytes = self.bit_count.div_ceil(8), "payload finished");
        }}
        Ok(self.bit_count)
    }
}

impl<W: Write> BitSink for PackedWriter<W> {
    fn insert(&mut self, code: &Code) -> Result<()> {
        for bit in code.bits() {
            self.bits.write_bit(bit)?;
        }
        self.bit_count += code.len() as u64;
        Ok(())
    }
}

/// Reads the container prelude and header, then unpacks the payload chunk by chunk.
pub struct PackedReader<R: Read> {
    reader: R,
    header: Vec<u8>,
    buf: Vec<u8>,
}

impl<R: Read> PackedReader<R> {
    /// Validates the prelude and reads the header. `chunk_size` is the number of payload bytes
    /// expanded per [`BitSource::extract`] call.
    pub fn open(mut reader: R, chunk_size: usize) -> Result<Self> {
        let mut prelude = [0u8; 9];
        read_prelude(&mut reader, &mut prelude)?;

        if prelude[..4] != MAGIC {
            return Err(HuffError::invalid_container("not a huffpack file: bad magic"));
        }
        if prelude[4] != FORMAT_VERSION {
            return Err(HuffError::invalid_container(format!(
                "unsupported format version {}",
                prelude[4]
            )));
        }

        let header_len = u32::from_le_bytes([prelude[5], prelude[6], prelude[7], prelude[8]]) as usize;
        if header_len > MAX_HEADER_LEN {
            return Err(HuffError::invalid_container(format!(
                "header length {} exceeds the {} byte limit",
                header_len, MAX_HEADER_LEN
            )));
        }

        let mut header = vec![0u8; header_len];
        reader.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => HuffError::invalid_container("file ends inside the header"),
            _ => HuffError::Io(e),
        })?;

        if_tracing! {{
            debug!(target = "storage", header_len = header_len, "container header read");
        }}
        Ok(PackedReader {
            reader,
            header,
            buf: vec![0u8; chunk_size.max(1)],
        })
    }

    /// The header bytes, verbatim.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn into_header(self) -> Vec<u8> {
        self.header
    }
}

fn read_prelude<R: Read>(reader: &mut R, prelude: &mut [u8; 9]) -> Result<()> {
    reader.read_exact(prelude).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            if_tracing! {{
                warn!(target = "storage", "input is shorter than the container prelude");
            }}
            HuffError::invalid_container("file is shorter than the container prelude")
        }
        _ => HuffError::Io(e),
    })
}

impl<R: Read> BitSource for PackedReader<R> {
    fn extract(&mut self, chunk: &mut Vec<bool>) -> Result<bool> {
        chunk.clear();

        let mut filled = 0;
        while filled < self.buf.len() {
            match self.reader.read(&mut self.buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled == 0 {
            return Ok(false);
        }

        chunk.reserve(filled * 8);
        let mut bits = BitReader::<_, MSB>::new(&self.buf[..filled]);
        for _ in 0..filled * 8 {
            chunk.push(bits.read_bit()?);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{PRELUDE_LEN, bits_of, has_valid_prelude};

    fn code(digits: &str) -> Code {
        Code::from_digits(digits).unwrap()
    }

    fn drain<S: BitSource>(source: &mut S) -> Vec<bool> {
        let mut all = Vec::new();
        let mut chunk = Vec::new();
        while source.extract(&mut chunk).unwrap() {
            all.extend_from_slice(&chunk);
        }
        all
    }

    #[test]
    fn writes_prelude_header_and_packed_bits() {
        let mut out = Vec::new();
        let mut writer = PackedWriter::new(&mut out, b"a:0/").unwrap();
        writer.insert(&code("1010")).unwrap();
        writer.insert(&code("11110000")).unwrap();
        assert_eq!(writer.finish().unwrap(), 12);

        assert!(has_valid_prelude(&out));
        assert_eq!(&out[..4], b"HUFP");
        assert_eq!(out[4], FORMAT_VERSION);
        assert_eq!(&out[5..9], &4u32.to_le_bytes());
        assert_eq!(&out[9..13], b"a:0/");
        // 1010 1111 | 0000 pad
        assert_eq!(&out[PRELUDE_LEN + 4..], &[0b1010_1111, 0b0000_0000]);
    }

    #[test]
    fn reader_returns_header_and_bits() {
        let mut out = Vec::new();
        let mut writer = PackedWriter::new(&mut out, b"hdr").unwrap();
        writer.insert(&code("110")).unwrap();
        writer.finish().unwrap();

        let mut reader = PackedReader::open(&out[..], 1).unwrap();
        assert_eq!(reader.header(), b"hdr");
        assert_eq!(drain(&mut reader), bits_of("11000000"));
    }

    #[test]
    fn chunk_size_does_not_change_the_bits() {
        let digits = "1011001110001111000011111000000111111";
        let mut out = Vec::new();
        let mut writer = PackedWriter::new(&mut out, b"").unwrap();
        writer.insert(&code(digits)).unwrap();
        writer.finish().unwrap();

        let expected = drain(&mut PackedReader::open(&out[..], 4096).unwrap());
        for chunk_size in [1, 2, 3, 7] {
            assert_eq!(drain(&mut PackedReader::open(&out[..], chunk_size).unwrap()), expected);
        }
        assert_eq!(&expected[..digits.len()], &bits_of(digits)[..]);
        assert_eq!(expected.len() % 8, 0);
    }

    #[test]
    fn empty_payload_is_exhausted_immediately() {
        let mut out = Vec::new();
        PackedWriter::new(&mut out, b"\x03:/").unwrap().finish().unwrap();
        assert_eq!(out.len(), PRELUDE_LEN + 3);

        let mut reader = PackedReader::open(&out[..], 16).unwrap();
        let mut chunk = vec![true];
        assert!(!reader.extract(&mut chunk).unwrap());
        assert!(chunk.is_empty());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let data = b"ZIPP\x01\x00\x00\x00\x00";
        assert!(matches!(PackedReader::open(&data[..], 8), Err(HuffError::InvalidContainer(_))));
    }

    #[test]
    fn short_prelude_is_rejected() {
        assert!(matches!(PackedReader::open(&b"HUFP"[..], 8), Err(HuffError::InvalidContainer(_))));
    }

    #[test]
    fn header_cut_short_is_rejected() {
        let mut data = b"HUFP\x01".to_vec();
        data.extend_from_slice(&10u32.to_le_bytes());
        data.extend_from_slice(b"a:0/");
        let err = PackedReader::open(&data[..], 8).err().unwrap();
        assert!(err.to_string().contains("inside the header"));
    }

    #[test]
    fn oversized_header_length_is_rejected() {
        let mut data = b"HUFP\x01".to_vec();
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(PackedReader::open(&data[..], 8), Err(HuffError::InvalidContainer(_))));
    }
}
