use std::time::Instant;

use huffpack::codec::HuffmanCoding;
use huffpack::error::HuffError;

use crate::cli::{DecodeArgs, Result};

pub fn decode(args: DecodeArgs) -> Result<()> {
    let codec = HuffmanCoding::new(args.config.load()?);

    let start = Instant::now();
    let result = codec.decompress_file(&args.input, &args.output);
    let _elapsed = start.elapsed();

    let stats = match result {
        Ok(stats) => stats,
        Err(err) => {
            huffpack::if_tracing! {{
                tracing::error!(event = "decode_failed", input = %args.input.display(), output = %args.output.display(), category = err.category(), error = %err, "decode failed");
            }}
            huffpack::if_not_tracing! {{
                eprintln!("[ERROR] decode failed: {} error", err.category());
            }}
            if matches!(err, HuffError::CorruptStream { .. } | HuffError::TruncatedStream { .. }) {
                eprintln!("[WARN] {} has a damaged payload; {} holds only what was decoded before the damage", args.input.display(), args.output.display());
            }
            return Err(err.into());
        }
    };

    huffpack::if_tracing! {{
        tracing::info!(event = "decode_complete", input = %args.input.display(), output = %args.output.display(), elapsed_us = %_elapsed.as_micros(), decompressed_len = stats.decompressed_len, "decode finished");
    }}
    eprintln!("{} -> {}: {} bytes", args.input.display(), args.output.display(), stats.decompressed_len);
    Ok(())
}
