use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::anyhow;

use crate::compressor::{Compressor, Result as AnyResult};
use crate::config::CodecConfig;
use crate::error::{HuffError, Result};
use crate::huffman::{CodeTable, DecodeTree, FrequencyTable, HuffmanTree, header, stream};
use crate::storage::{self, PackedReader, PackedWriter};

if_tracing! {
    use tracing::{Level, info, span};
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompressStats {
    /// Input bytes.
    pub original_len: u64,
    /// Distinct symbols in the code table, the end-of-stream marker included.
    pub symbols: usize,
    pub header_len: usize,
    /// Payload bits, the end-of-stream code included and padding excluded.
    pub payload_bits: u64,
    /// Total bytes of the container.
    pub compressed_len: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecompressStats {
    pub symbols: usize,
    pub header_len: usize,
    pub decompressed_len: u64,
}

/// Two-pass Huffman compressor writing a self-describing container.
///
/// Every call owns its own frequency table, trees and code tables; nothing carries over
/// between calls.
#[derive(Clone, Debug, Default)]
pub struct HuffmanCoding {
    config: CodecConfig,
}

impl HuffmanCoding {
    pub fn new(config: CodecConfig) -> Self {
        HuffmanCoding { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compresses `input` into `output`.
    ///
    /// The input is read twice: once to count frequencies and, after rewinding, once to
    /// encode. Either the whole input is encoded or an error is returned.
    pub fn compress<R: Read + Seek, W: Write>(&self, input: &mut R, mut output: W) -> Result<CompressStats> {
        if_tracing! {
            let span = span!(Level::INFO, "compress");
            let _enter = span.enter();
        }

        input.seek(SeekFrom::Start(0))?;
        let frequencies = FrequencyTable::scan(&mut *input)?;
        let tree = HuffmanTree::build(&frequencies)?;
        let table = CodeTable::from_tree(&tree);
        let header = header::serialize(&table)?;

        let mut writer = PackedWriter::new(&mut output, &header)?;
        input.seek(SeekFrom::Start(0))?;
        let encoded = stream::encode(&mut *input, &table, &mut writer, &self.config)?;
        let payload_bits = writer.finish()?;
        output.flush()?;

        let stats = CompressStats {
            original_len: encoded.symbols,
            symbols: table.len(),
            header_len: header.len(),
            payload_bits,
            compressed_len: (storage::PRELUDE_LEN + header.len()) as u64 + payload_bits.div_ceil(8),
        };

        if_tracing! {{
            info!(target = "codec", original_len = stats.original_len, compressed_len = stats.compressed_len, symbols = stats.symbols, depth = tree.depth(), "compress complete");
        }}
        Ok(stats)
    }

    /// Decompresses a container from `input` into `output`.
    ///
    /// On a corrupt or truncated payload, the bytes decoded so far have already been written
    /// to `output` and the error is returned.
    pub fn decompress<R: Read, W: Write>(&self, input: R, output: W) -> Result<DecompressStats> {
        if_tracing! {
            let span = span!(Level::INFO, "decompress");
            let _enter = span.enter();
        }

        let container = self.open_container(input)?;
        self.decode_container(container, output)
    }

    /// Reads the prelude and header and rebuilds the decoding tree, leaving the payload unread.
    fn open_container<R: Read>(&self, input: R) -> Result<Container<R>> {
        let reader = PackedReader::open(input, self.config.chunk_size)?;
        let table = header::parse(reader.header())?;
        let tree = DecodeTree::rebuild(&table)?;
        Ok(Container { reader, table, tree })
    }

    fn decode_container<R: Read, W: Write>(&self, container: Container<R>, mut output: W) -> Result<DecompressStats> {
        let Container {
            mut reader,
            table,
            tree,
        } = container;

        let decoded = stream::decode(&mut reader, &tree, &mut output);
        output.flush()?;
        let decompressed_len = decoded?;

        let stats = DecompressStats {
            symbols: table.len(),
            header_len: reader.header().len(),
            decompressed_len,
        };

        if_tracing! {{
            info!(target = "codec", decompressed_len = stats.decompressed_len, symbols = stats.symbols, "decompress complete");
        }}
        Ok(stats)
    }

    /// Compresses the file at `input` into a new file at `output`.
    ///
    /// A failed compression, verification included, removes the partially written output.
    /// `output` must not name the input file.
    pub fn compress_file(&self, input: &Path, output: &Path) -> Result<CompressStats> {
        reject_same_file(input, output)?;
        let mut source = BufReader::new(File::open(input)?);
        let sink = BufWriter::new(File::create(output)?);

        let result = self.compress(&mut source, sink).and_then(|stats| {
            if self.config.verify {
                self.verify_file(input, output)?;
            }
            Ok(stats)
        });
        if let Err(ref _err) = result {
            if_tracing! {{
                tracing::warn!(target = "codec", output = %output.display(), error = %_err, category = _err.category(), "compression failed, removing partial output");
            }}
            // the encode error is what the caller needs to see
            let _ = fs::remove_file(output);
        }
        result
    }

    /// Decompresses the container at `input` into a new file at `output`.
    ///
    /// The output file is only created once the prelude and header have been read and the
    /// decoding tree rebuilt.
    pub fn decompress_file(&self, input: &Path, output: &Path) -> Result<DecompressStats> {
        reject_same_file(input, output)?;
        let container = self.open_container(BufReader::new(File::open(input)?))?;
        let sink = BufWriter::new(File::create(output)?);
        self.decode_container(container, sink)
    }

    /// Decodes `compressed` in memory and compares it with the file at `original`.
    fn verify_file(&self, original: &Path, compressed: &Path) -> Result<()> {
        let expected = fs::read(original)?;
        let mut decoded = Vec::with_capacity(expected.len());
        self.decompress(BufReader::new(File::open(compressed)?), &mut decoded)?;
        if decoded != expected {
            return Err(HuffError::VerifyMismatch {
                expected: expected.len() as u64,
                actual: decoded.len() as u64,
            });
        }
        if_tracing! {{
            info!(target = "codec", bytes = expected.len(), "verification passed");
        }}
        Ok(())
    }

    /// The code table this codec would write for `data`.
    pub fn code_table(&self, data: &[u8]) -> Result<CodeTable> {
        let tree = HuffmanTree::build(&FrequencyTable::from_bytes(data))?;
        Ok(CodeTable::from_tree(&tree))
    }

    /// Reads just the container header and parses it, without touching the payload.
    pub fn read_code_table<R: Read>(&self, input: R) -> Result<CodeTable> {
        let reader = PackedReader::open(input, 1)?;
        header::parse(reader.header())
    }
}

/// A container whose header has been consumed, ready to decode.
struct Container<R: Read> {
    reader: PackedReader<R>,
    table: CodeTable,
    tree: DecodeTree,
}

/// Fails when `output` already exists and resolves to the same file as `input`.
fn reject_same_file(input: &Path, output: &Path) -> Result<()> {
    let source = fs::canonicalize(input)?;
    if fs::canonicalize(output).is_ok_and(|target| target == source) {
        return Err(HuffError::OutputIsInput {
            path: output.display().to_string(),
        });
    }
    Ok(())
}

impl Compressor for HuffmanCoding {
    fn compress_bytes(&mut self, data: &[u8]) -> AnyResult<Vec<u8>> {
        let mut out = Vec::new();
        self.compress(&mut Cursor::new(data), &mut out)?;
        Ok(out)
    }

    fn decompress_bytes(&mut self, data: &[u8]) -> AnyResult<Vec<u8>> {
        let mut out = Vec::new();
        self.decompress(data, &mut out)
            .map_err(|e| anyhow!(e).context("huffman decoder error"))?;
        Ok(out)
    }

    fn compressor_name(&self) -> String {
        "Huffman Coding".into()
    }

    fn format_validity_check(&mut self, data: &[u8]) -> bool {
        storage::has_valid_prelude(data)
    }
}
