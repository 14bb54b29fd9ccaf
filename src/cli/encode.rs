use std::time::Instant;

use huffpack::codec::HuffmanCoding;

use crate::cli::{EncodeArgs, Result};

pub fn encode(args: EncodeArgs) -> Result<()> {
    let mut config = args.config.load()?;
    config.verify |= args.verify;
    config.allow_sentinel_in_input |= args.allow_sentinel;

    let codec = HuffmanCoding::new(config);
    let start = Instant::now();
    let stats = codec.compress_file(&args.input, &args.output)?;
    let _elapsed = start.elapsed();

    huffpack::if_tracing! {{
        tracing::info!(event = "encode_complete", input = %args.input.display(), output = %args.output.display(), elapsed_us = %_elapsed.as_micros(), original_len = stats.original_len, compressed_len = stats.compressed_len, "encode finished");
    }}
    eprintln!(
        "{} -> {}: {} bytes -> {} bytes ({} symbols, {} byte header)",
        args.input.display(),
        args.output.display(),
        stats.original_len,
        stats.compressed_len,
        stats.symbols,
        stats.header_len
    );
    Ok(())
}
