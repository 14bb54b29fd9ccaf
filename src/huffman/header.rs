//! Text form of the code table, stored ahead of the payload.
//!
//! Every entry is the raw symbol byte, a `:`, the code digits, and a terminating `/`:
//!
//! ```text
//! \x03:10/a:11/b:0/
//! ```
//!
//! The symbol slot is a single raw byte and may itself be `:` or `/`; the format stays
//! unambiguous because codes only ever contain `0` and `1`. Entries are written in ascending
//! symbol order, so the same input always produces the same header bytes.

use crate::error::{HuffError, Result};
use crate::huffman::{Code, CodeTable};

if_tracing! {
    use tracing::{debug, warn};
}

const KEY_DELIMITER: u8 = b':';
const ENTRY_TERMINATOR: u8 = b'/';

/// Serializes `table` into header bytes.
///
/// # Errors
///
/// Returns [`HuffError::EmptyTable`] if the table has no entries.
pub fn serialize(table: &CodeTable) -> Result<Vec<u8>> {
    if table.is_empty() {
        return Err(HuffError::EmptyTable);
    }

    let size = table.iter().map(|(_, code)| code.len() + 3).sum();
    let mut header = Vec::with_capacity(size);
    for (symbol, code) in table.iter() {
        header.push(symbol);
        header.push(KEY_DELIMITER);
        header.extend_from_slice(code.as_str().as_bytes());
        header.push(ENTRY_TERMINATOR);
    }

    if_tracing! {{
        debug!(target = "header", entries = table.len(), header_len = header.len(), "header serialized");
    }}
    Ok(header)
}

/// Parses header bytes back into a code table.
///
/// # Errors
///
/// Returns [`HuffError::CorruptHeader`] for an empty header, a missing `:`, a code digit
/// other than `0`/`1`, an entry without its trailing `/`, or a symbol listed twice.
pub fn parse(header: &[u8]) -> Result<CodeTable> {
    let result = parse_entries(header);

    if_tracing! {{
        match &result {
            Ok(table) => debug!(target = "header", entries = table.len(), header_len = header.len(), "header parsed"),
            Err(err) => warn!(target = "header", error = %err, "header rejected"),
        }
    }}
    result
}

fn parse_entries(header: &[u8]) -> Result<CodeTable> {
    if header.is_empty() {
        return Err(HuffError::corrupt_header(0, "header is empty"));
    }

    let mut table = CodeTable::default();
    let mut pos = 0;
    while pos < header.len() {
        let entry_start = pos;
        let symbol = header[pos];
        pos += 1;

        match header.get(pos) {
            Some(&KEY_DELIMITER) => pos += 1,
            Some(_) => return Err(HuffError::corrupt_header(pos, "expected ':' after symbol")),
            None => return Err(HuffError::corrupt_header(pos, "entry ends after its symbol")),
        }

        let digits_start = pos;
        loop {
            match header.get(pos) {
                Some(&ENTRY_TERMINATOR) => break,
                Some(b'0' | b'1') => pos += 1,
                Some(_) => return Err(HuffError::corrupt_header(pos, "code digit is not 0 or 1")),
                None => return Err(HuffError::corrupt_header(pos, "dangling entry: missing trailing '/'")),
            }
        }

        // digits were checked above, so they are valid utf-8 and valid code digits
        let digits = core::str::from_utf8(&header[digits_start..pos]).ok();
        let code = digits
            .and_then(Code::from_digits)
            .ok_or_else(|| HuffError::corrupt_header(digits_start, "code digit is not 0 or 1"))?;
        pos += 1;

        if table.insert(symbol, code).is_some() {
            return Err(HuffError::corrupt_header(
                entry_start,
                format!("symbol 0x{:02x} appears twice", symbol),
            ));
        }
    }

    Ok(table)
}
