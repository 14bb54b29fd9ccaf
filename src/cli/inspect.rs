use std::fs::File;
use std::io::BufReader;

use huffpack::codec::HuffmanCoding;
use huffpack::huffman::SENTINEL;

use crate::cli::{InspectArgs, Result};

pub fn inspect(args: InspectArgs) -> Result<()> {
    let codec = HuffmanCoding::default();
    let table = codec.read_code_table(BufReader::new(File::open(&args.input)?))?;

    println!("{}: {} symbols", args.input.display(), table.len());
    for (symbol, code) in table.iter() {
        println!("{}\t{:>3}\t{}", printable(symbol), code.len(), code);
    }
    Ok(())
}

fn printable(symbol: u8) -> String {
    match symbol {
        SENTINEL => "EOT".to_string(),
        b' ' => "' '".to_string(),
        s if s.is_ascii_graphic() => (s as char).to_string(),
        s => format!("0x{:02x}", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_symbols() {
        assert_eq!(printable(SENTINEL), "EOT");
        assert_eq!(printable(b'a'), "a");
        assert_eq!(printable(b' '), "' '");
        assert_eq!(printable(0xff), "0xff");
        assert_eq!(printable(b'\n'), "0x0a");
    }
}
