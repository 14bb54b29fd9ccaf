use std::io::{self, BufReader, Read, Write};

use crate::config::CodecConfig;
use crate::error::{HuffError, Result};
use crate::huffman::{CodeTable, DecodeTree, SENTINEL, rebuild::Step};
use crate::storage::{BitSink, BitSource};

if_tracing! {
    use tracing::{debug, info, warn};
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Input bytes encoded, the terminator excluded.
    pub symbols: u64,
    /// Payload bits written, the terminator included.
    pub bits: u64,
}

/// Encodes every byte of `input` with `table`, then appends the end-of-stream code once.
///
/// `input` is read independently of the frequency pass; any byte without a code means the
/// data changed in between, and aborts the encode.
///
/// # Errors
///
/// - [`HuffError::MissingCode`] for a byte without a code.
/// - [`HuffError::SentinelInInput`] for a 0x03 byte, unless
///   [`CodecConfig::allow_sentinel_in_input`] is set.
/// - [`HuffError::EmptyTable`] if the table has no end-of-stream code.
pub fn encode<R: Read, S: BitSink>(input: R, table: &CodeTable, sink: &mut S, config: &CodecConfig) -> Result<EncodeStats> {
    if_tracing! {{
        debug!(target = "stream", entries = table.len(), "encode start");
    }}

    let terminator = table.sentinel().ok_or(HuffError::EmptyTable)?;
    let mut stats = EncodeStats::default();
    let mut reader = BufReader::new(input);
    let mut buf = [0u8; 8192];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &symbol in &buf[..n] {
            let offset = stats.symbols;
            if symbol == SENTINEL && !config.allow_sentinel_in_input {
                if_tracing! {{
                    warn!(target = "stream", offset = offset, "reserved end-of-stream byte found in input");
                }}
                return Err(HuffError::SentinelInInput { offset });
            }
            let code = table.get(symbol).ok_or_else(|| {
                if_tracing! {{
                    tracing::error!(target = "stream", symbol = symbol, offset = offset, "byte has no code; input changed between passes");
                }}
                HuffError::MissingCode { symbol, offset }
            })?;
            sink.insert(code)?;
            stats.symbols += 1;
            stats.bits += code.len() as u64;
        }
    }

    sink.insert(terminator)?;
    stats.bits += terminator.len() as u64;

    if_tracing! {{
        info!(target = "stream", symbols = stats.symbols, bits = stats.bits, "encode complete");
    }}
    Ok(stats)
}

/// Walks bits from `source` through `tree`, writing each decoded symbol to `output`, until
/// the end-of-stream leaf is reached. Returns the number of symbols written.
///
/// Symbols decoded before an error stay in `output`; nothing is rolled back.
///
/// # Errors
///
/// - [`HuffError::CorruptStream`] when a bit has no edge to follow.
/// - [`HuffError::TruncatedStream`] when the source runs dry before the end-of-stream code.
pub fn decode<S: BitSource, W: Write>(source: &mut S, tree: &DecodeTree, mut output: W) -> Result<u64> {
    if_tracing! {{
        debug!(target = "stream", slots = tree.len(), "decode start");
    }}

    // a lone zero-length code: the whole stream is the terminator and carries no bits
    if tree.root_symbol() == Some(SENTINEL) {
        if_tracing! {{
            info!(target = "stream", symbols = 0, bits = 0, "decode complete: empty stream");
        }}
        return Ok(0);
    }

    let mut chunk = Vec::new();
    let mut cur = tree.root();
    let mut bits_read = 0u64;
    let mut symbols = 0u64;

    while source.extract(&mut chunk)? {
        for &bit in &chunk {
            match tree.step(cur, bit) {
                Step::Inner(next) => cur = next,
                Step::Symbol(symbol) => {
                    output.write_all(&[symbol])?;
                    symbols += 1;
                    cur = tree.root();
                }
                Step::End => {
                    if_tracing! {{
                        info!(target = "stream", symbols = symbols, bits = bits_read + 1, "decode complete");
                    }}
                    return Ok(symbols);
                }
                Step::Missing => {
                    if_tracing! {{
                        warn!(target = "stream", bit = bits_read, symbols = symbols, "decode walked off the tree");
                    }}
                    return Err(HuffError::CorruptStream { bit: bits_read });
                }
            }
            bits_read += 1;
        }
    }

    if_tracing! {{
        warn!(target = "stream", bits = bits_read, symbols = symbols, "bits ran out before the end-of-stream code");
    }}
    Err(HuffError::TruncatedStream { bits: bits_read })
}
