//! Modified UTF-8, the string encoding of `CONSTANT_Utf8` entries.
//!
//! It differs from standard UTF-8 in two ways: the NUL character is written as the two-byte
//! sequence `C0 80`, and supplementary characters are written as a surrogate pair, each half
//! encoded as its own three-byte sequence. Four-byte forms never occur.

use crate::{Error, Result};

/// Decodes a modified UTF-8 byte string.
///
/// Unpaired surrogates, which obfuscators occasionally emit, decode as U+FFFD.
///
/// # Errors
///
/// Returns [`Error::InvalidMutf8`] with the position of the offending byte if the data contains a
/// raw zero byte, a four-byte lead, or a truncated or malformed multi-byte sequence.
///
/// # Examples
///
/// ```rust
/// use classscope::classfile::mutf8;
///
/// assert_eq!(mutf8::decode(b"java/lang/Object")?, "java/lang/Object");
/// assert_eq!(mutf8::decode(&[0x61, 0xC0, 0x80, 0x62])?, "a\0b");
/// # Ok::<(), classscope::Error>(())
/// ```
pub fn decode(data: &[u8]) -> Result<String> {
    if data.iter().all(|b| (0x01..0x80).contains(b)) {
        return Ok(data.iter().map(|b| char::from(*b)).collect());
    }

    let mut units = Vec::with_capacity(data.len());
    let mut pos = 0;
    while pos < data.len() {
        let lead = data[pos];
        let (unit, width) = match lead {
            0x01..=0x7F => (u16::from(lead), 1),
            0xC0..=0xDF => {
                let b1 = continuation(data, pos, 1)?;
                ((u16::from(lead & 0x1F) << 6) | b1, 2)
            }
            0xE0..=0xEF => {
                let b1 = continuation(data, pos, 1)?;
                let b2 = continuation(data, pos, 2)?;
                ((u16::from(lead & 0x0F) << 12) | (b1 << 6) | b2, 3)
            }
            _ => return Err(Error::InvalidMutf8(pos)),
        };
        units.push(unit);
        pos += width;
    }

    Ok(char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

fn continuation(data: &[u8], pos: usize, index: usize) -> Result<u16> {
    match data.get(pos + index) {
        Some(b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        _ => Err(Error::InvalidMutf8(pos)),
    }
}

/// Encodes a string as modified UTF-8.
#[must_use]
pub fn encode(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}
