//! cli component of the huffpack project.
//!
//! lines starting with `> ` denote valid invocations. `$exename` stands for the executable name,
//! `<description>` denotes a required argument, while `[description]` denotes an optional argument.
//!
//! # Compression
//!
//! > `$exename enc <input file> <output file> [--config <path to config file>] [--verify]`
//!
//! the input is read twice: once to count symbol frequencies and once to encode it. the code table
//! is stored in the output file as a text header, so nothing else needs to be remembered to decode it.
//! if `--verify` is passed, the freshly written file is decoded again and compared with the input.
//! on failure the partial output file is removed.
//!
//! # Decompression
//!
//! > `$exename dec <input file> <output file> [--config <path to config file>]`
//!
//! the header is parsed back into a code table, the decoding tree is rebuilt from it, and the payload
//! is decoded until the end-of-stream code. a damaged file is reported as an error; whatever was decoded
//! before the damage is left in the output file.
//!
//! # Testing
//!
//! > `$exename test <input file>`
//!
//! compresses the file in memory, decompresses the result and compares it with the original.
//!
//! > `$exename corpus <directory>`
//!
//! runs the same round trip for every file under the directory and prints a report per file.
//!
//! # Inspection
//!
//! > `$exename inspect <compressed file>`
//!
//! prints the code table stored in a compressed file without decoding the payload.
//!
//! # Configuration
//!
//! > `$exename config save <output path>`
//!
//! writes the default configuration as json, for editing and passing back with `--config`.
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use huffpack::config::CodecConfig;
use huffpack::error::HuffError;

pub mod config;
pub mod corpus;
pub mod decode;
pub mod encode;
pub mod inspect;

/// Error types for CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Codec(#[from] HuffError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0:#}")]
    Config(#[from] anyhow::Error),

    #[error("{failed} of {total} files failed the round trip")]
    RoundTripMismatch { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Formats `err` followed by each underlying cause that its message does not already carry.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// CLI arguments for the huffpack application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands for huffpack
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode (compress) a file
    #[command(alias = "enc")]
    Encode(EncodeArgs),

    /// Decode (decompress) a file
    #[command(alias = "dec")]
    Decode(DecodeArgs),

    /// Test compression/decompression roundtrip of a file
    Test(TestArgs),

    /// Test compression/decompression roundtrip of every file in a directory
    Corpus(CorpusArgs),

    /// Print the code table stored in a compressed file
    Inspect(InspectArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments specific to the encode command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Path to the input file
    pub input: PathBuf,

    /// Path for the output file
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Decode the output again and compare it with the input
    #[arg(long)]
    pub verify: bool,

    /// Encode 0x03 bytes instead of rejecting them (decoding stops at the first one)
    #[arg(long)]
    pub allow_sentinel: bool,
}

/// Arguments specific to the decode command
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Path to the compressed file
    pub input: PathBuf,

    /// Path for the output file
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments specific to the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to the original file
    pub input: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments specific to the corpus command
#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// Directory to walk
    #[arg(default_value = "./test_data")]
    pub dir: PathBuf,

    /// Write `.expected.bin` and `.got.bin` files next to the working directory for failures
    #[arg(long)]
    pub save_failures: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments specific to the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the compressed file
    pub input: PathBuf,
}

/// Shared `--config` flag
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Load the codec configuration from a JSON file
    #[arg(long = "config")]
    pub path: Option<PathBuf>,
}

impl ConfigArgs {
    /// The configuration file if one was given, the defaults otherwise.
    pub fn load(&self) -> Result<CodecConfig> {
        match &self.path {
            Some(path) => Ok(CodecConfig::from_file(path)?),
            None => Ok(CodecConfig::default()),
        }
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Save the default configuration to a file
    Save {
        /// Output file path
        output: PathBuf,
    },

    /// Print the effective configuration
    Show {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Command execution
pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Encode(args) => encode::encode(args),
        Command::Decode(args) => decode::decode(args),
        Command::Test(args) => test::test(args),
        Command::Corpus(args) => corpus::corpus(args),
        Command::Inspect(args) => inspect::inspect(args),
        Command::Config { command } => config::config(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_encode_with_alias_and_flags() {
        let cli = Cli::try_parse_from(["huffpack", "enc", "in.txt", "out.hfp", "--verify", "--config", "c.json"]).unwrap();
        let Command::Encode(args) = cli.command else {
            panic!("expected the encode command");
        };
        assert_eq!(args.input, PathBuf::from("in.txt"));
        assert_eq!(args.output, PathBuf::from("out.hfp"));
        assert!(args.verify);
        assert!(!args.allow_sentinel);
        assert_eq!(args.config.path, Some(PathBuf::from("c.json")));
    }

    #[test]
    fn corpus_dir_has_a_default() {
        let cli = Cli::try_parse_from(["huffpack", "corpus"]).unwrap();
        let Command::Corpus(args) = cli.command else {
            panic!("expected the corpus command");
        };
        assert_eq!(args.dir, PathBuf::from("./test_data"));
    }

    #[derive(Debug, Error)]
    #[error("could not finish")]
    struct Outer(#[source] io::Error);

    #[test]
    fn error_chain_appends_causes() {
        let err = Outer(io::Error::other("disk full"));
        assert_eq!(error_chain(&err), "could not finish: disk full");
    }

    #[test]
    fn error_chain_skips_causes_already_in_the_message() {
        let err = CliError::from(HuffError::from(io::Error::other("boom")));
        assert_eq!(error_chain(&err), "I/O error: boom");
    }

    #[test]
    fn missing_config_file_is_reported() {
        let args = ConfigArgs {
            path: Some(PathBuf::from("/nonexistent/huffpack.json")),
        };
        assert!(matches!(args.load(), Err(CliError::Config(_))));
    }
}
