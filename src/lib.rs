//! huffpack: a self-describing Huffman compressor.
//!
//! Compression runs two passes over the input. The first pass counts symbol frequencies
//! (plus one end-of-stream sentinel), the tree is built and turned into a code table,
//! and the code table is written as a text header ahead of the packed bit payload.
//! The second pass emits one code per input byte and finishes with the sentinel's code.
//!
//! Decompression needs nothing but the file: the header is parsed back into a code table,
//! a decoding tree is rebuilt from the code paths alone, and the payload is walked bit by
//! bit until the sentinel leaf is reached.
//!
//! ```no_run
//! use huffpack::codec::HuffmanCoding;
//! use std::path::Path;
//!
//! let codec = HuffmanCoding::default();
//! codec.compress_file(Path::new("input.txt"), Path::new("input.hfp"))?;
//! codec.decompress_file(Path::new("input.hfp"), Path::new("roundtrip.txt"))?;
//! # Ok::<(), huffpack::error::HuffError>(())
//! ```

/// Expands its body only when the `tracing` feature is enabled.
#[macro_export]
macro_rules! if_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(feature = "tracing")] {
                $($body)*
            }
        }
    };
}

/// Expands its body only when the `tracing` feature is disabled.
#[macro_export]
macro_rules! if_not_tracing {
    {$($body:tt)*} => {
        ::cfg_if::cfg_if! {
            if #[cfg(not(feature = "tracing"))] {
                $($body)*
            }
        }
    };
}

pub mod codec;
pub mod compressor;
pub mod config;
pub mod error;
pub mod huffman;
pub mod storage;


pub use codec::HuffmanCoding;
pub use config::CodecConfig;
pub use error::{HuffError, Result};
pub use huffman::SENTINEL;
