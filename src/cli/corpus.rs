use std::fs;
use std::io::{self, Cursor};
use std::path::Path;
use std::time::{Duration, Instant};

use huffpack::codec::HuffmanCoding;
use huffpack::error::HuffError;
use walkdir::WalkDir;

use crate::cli::{CliError, CorpusArgs, Result};

/// One file's trip through the codec.
pub struct RoundTrip<'a> {
    pub path: &'a Path,
    pub expected: &'a [u8],
    pub compressed: Vec<u8>,
    pub got: Vec<u8>,
    pub error: Option<HuffError>,
    pub encode_time: Duration,
    pub decode_time: Duration,
}

impl<'a> RoundTrip<'a> {
    /// Compresses then decompresses `expected` in memory. Codec errors are recorded, not returned.
    pub fn run(codec: &HuffmanCoding, path: &'a Path, expected: &'a [u8]) -> Self {
        let mut compressed = Vec::new();
        let start = Instant::now();
        let encoded = codec.compress(&mut Cursor::new(expected), &mut compressed);
        let encode_time = start.elapsed();

        let mut got = Vec::new();
        let start = Instant::now();
        let error = match encoded {
            Ok(_) => codec.decompress(&compressed[..], &mut got).err(),
            Err(err) => Some(err),
        };
        let decode_time = start.elapsed();

        RoundTrip {
            path,
            expected,
            compressed,
            got,
            error,
            encode_time,
            decode_time,
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.expected == self.got.as_slice()
    }

    fn ratio(&self) -> f64 {
        if self.expected.is_empty() {
            1.0
        } else {
            self.compressed.len() as f64 / self.expected.len() as f64
        }
    }

    /// Prints the report block for this file to stderr.
    pub fn print(&self, dumped: bool) {
        let original_size = self.expected.len();
        let bytes_saved = original_size as isize - self.compressed.len() as isize;
        let percent_saved = if original_size == 0 {
            0.0
        } else {
            bytes_saved as f64 / original_size as f64 * 100.0
        };

        let mut details = String::new();
        if let Some(err) = &self.error {
            details.push_str(&format!("error ({}): {}", err.category(), err));
        } else if !self.passed() {
            details.push_str("error: decoded data differs from the original");
        }
        if dumped {
            let name = file_name(self.path);
            details.push_str(&format!("\nsee {}.expected.bin and {}.got.bin for details", name, name));
        }

        eprintln!(
            "======== {} {} ========\n\t{:.0?} encode\n\t{:.0?} decode\n\toriginal: {} bytes\n\tcompressed: {} bytes\n\tdecompressed: {} bytes\n\tratio: {:.1}% (compressed/original)\n\tsaved: {:+} bytes ({:+.1}%)\n\t{}",
            if self.passed() { "PASSED" } else { "FAILED" },
            self.path.display(),
            self.encode_time,
            self.decode_time,
            original_size,
            self.compressed.len(),
            self.got.len(),
            self.ratio() * 100.0,
            bytes_saved,
            percent_saved,
            details,
        );
    }
}

pub fn corpus(args: CorpusArgs) -> Result<()> {
    let codec = HuffmanCoding::new(args.config.load()?);
    let mut total = 0;
    let mut failed = 0;

    for entry in WalkDir::new(&args.dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() || e.file_type().is_symlink())
    {
        let path = entry.path();
        let input = fs::read(path)?;
        let trip = RoundTrip::run(&codec, path, &input);
        total += 1;

        let mut dumped = false;
        if !trip.passed() {
            failed += 1;
            if args.save_failures {
                save_failed_results(&trip.expected[..], &trip.got, path)?;
                dumped = true;
            }
        }
        trip.print(dumped);
    }

    huffpack::if_tracing! {{
        tracing::info!(event = "corpus_complete", dir = %args.dir.display(), total, failed, "corpus finished");
    }}
    eprintln!("{} of {} files passed", total - failed, total);

    if failed > 0 {
        Err(CliError::RoundTripMismatch { failed, total })
    } else {
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Writes `<name>.expected.bin` and `<name>.got.bin` to the working directory, moving any
/// earlier dumps aside to `.old`.
fn save_failed_results(expected: &[u8], got: &[u8], path: &Path) -> io::Result<()> {
    let name = file_name(path);
    let target_expected = format!("{}.expected.bin", name);
    let target_got = format!("{}.got.bin", name);

    if fs::exists(&target_expected)? {
        fs::rename(&target_expected, format!("{}.old", &target_expected))?;
    }
    if fs::exists(&target_got)? {
        fs::rename(&target_got, format!("{}.old", &target_got))?;
    }

    fs::write(&target_expected, expected)?;
    fs::write(&target_got, got)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_passes_for_text() {
        let codec = HuffmanCoding::default();
        let data = b"the quick brown fox jumps over the lazy dog";
        let trip = RoundTrip::run(&codec, Path::new("fox.txt"), data);
        assert!(trip.passed());
        assert_eq!(trip.got, data);
    }

    #[test]
    fn round_trip_records_codec_errors() {
        let codec = HuffmanCoding::default();
        let data = [b'x', 0x03, b'y'];
        let trip = RoundTrip::run(&codec, Path::new("etx.bin"), &data);
        assert!(!trip.passed());
        assert!(matches!(trip.error, Some(HuffError::SentinelInInput { offset: 1 })));
    }

    #[test]
    fn corpus_over_a_directory() {
        let dir = std::env::temp_dir().join(format!("huffpack-corpus-{}", std::process::id()));
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("a.txt"), b"abracadabra").unwrap();
        fs::write(dir.join("nested").join("b.txt"), b"").unwrap();

        let args = CorpusArgs {
            dir: dir.clone(),
            save_failures: false,
            config: Default::default(),
        };
        let result = corpus(args);
        fs::remove_dir_all(&dir).unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn corpus_counts_failures() {
        let dir = std::env::temp_dir().join(format!("huffpack-corpus-fail-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("ok.txt"), b"fine").unwrap();
        fs::write(dir.join("etx.bin"), [0x03u8, 0x03]).unwrap();

        let args = CorpusArgs {
            dir: dir.clone(),
            save_failures: false,
            config: Default::default(),
        };
        let result = corpus(args);
        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(result, Err(CliError::RoundTripMismatch { failed: 1, total: 2 })));
    }
}
