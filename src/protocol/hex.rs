//! Dash-separated hexadecimal codec for characteristic values.
//!
//! The module's AT command set carries raw bytes as text: every byte is two
//! uppercase hex digits and bytes are joined by `-`, for example four bytes
//! become `DE-AD-BE-EF` (11 characters). `N` bytes always take `3N - 1`
//! characters.

use crate::error::{Error, Result};

/// Separator between encoded bytes.
pub const SEPARATOR: char = '-';

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Length of the encoded form of `n` bytes.
///
/// Returns 0 for `n == 0`, which has no valid encoding.
#[inline]
pub fn encoded_len(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        3 * n - 1
    }
}

/// Check whether a reply of `len` characters can hold whole byte groups.
#[inline]
pub fn is_well_framed(len: usize) -> bool {
    len != 0 && (len + 1) % 3 == 0
}

/// Encode bytes as dash-separated uppercase hex.
///
/// # Arguments
///
/// * `bytes` - The value to encode, at least one byte
///
/// # Returns
///
/// The encoded text, exactly `3N - 1` characters long, or
/// [`Error::EmptyValue`] when `bytes` is empty.
///
/// # Example
///
/// ```
/// use bluefruit_gatt::protocol::hex;
///
/// let text = hex::encode(&[0x12, 0x34, 0xAB]).unwrap();
/// assert_eq!(text, "12-34-AB");
/// ```
pub fn encode(bytes: &[u8]) -> Result<String> {
    if bytes.is_empty() {
        return Err(Error::EmptyValue);
    }

    let mut text = String::with_capacity(encoded_len(bytes.len()));
    for (i, &byte) in bytes.iter().enumerate() {
        if i > 0 {
            text.push(SEPARATOR);
        }
        text.push(HEX_DIGITS[(byte >> 4) as usize] as char);
        text.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
    }

    Ok(text)
}

/// Decode dash-separated hex into a caller-supplied buffer.
///
/// A reply whose length cannot hold whole groups (`len == 0` or
/// `(len + 1) % 3 != 0`) is malformed and decodes to nothing. Otherwise at
/// most `out.len()` bytes are written; groups beyond that are ignored.
///
/// Each group is read like `strtol(.., 16)` would: hex digits accumulate
/// until the first non-hex character, and a group without any digit is 0.
///
/// # Arguments
///
/// * `text` - The reply payload
/// * `out` - Destination buffer; its length is the maximum byte count
///
/// # Returns
///
/// The number of bytes written to `out`.
///
/// # Example
///
/// ```
/// use bluefruit_gatt::protocol::hex;
///
/// let mut buf = [0u8; 2];
/// assert_eq!(hex::decode("01-02-03", &mut buf), 2);
/// assert_eq!(buf, [0x01, 0x02]);
///
/// assert_eq!(hex::decode("01-0", &mut buf), 0);
/// ```
pub fn decode(text: &str, out: &mut [u8]) -> usize {
    let raw = text.as_bytes();
    if !is_well_framed(raw.len()) {
        return 0;
    }

    let count = ((raw.len() + 1) / 3).min(out.len());
    for (i, slot) in out.iter_mut().take(count).enumerate() {
        let start = i * 3;
        *slot = parse_group(&raw[start..start + 2]);
    }

    count
}

/// Longest prefix of `text` that holds only whole byte groups.
///
/// Used on a reply cut at the session's length cap, so the bytes that did
/// arrive still decode. Text shorter than one group is returned as is.
///
/// ```
/// use bluefruit_gatt::protocol::hex;
///
/// assert_eq!(hex::whole_groups("01-02-0"), "01-02");
/// assert_eq!(hex::whole_groups("01-02-"), "01-02");
/// assert_eq!(hex::whole_groups("01-02"), "01-02");
/// ```
pub fn whole_groups(text: &str) -> &str {
    let len = text.len();
    if len < 2 {
        return text;
    }
    let end = ((len + 1) / 3) * 3 - 1;
    text.get(..end).unwrap_or(text)
}

/// Text for `n` zero bytes, used to seed new characteristics.
///
/// Empty for `n == 0`.
pub fn zero_fill(n: usize) -> String {
    let mut text = String::with_capacity(encoded_len(n));
    for i in 0..n {
        if i > 0 {
            text.push(SEPARATOR);
        }
        text.push_str("00");
    }
    text
}

fn parse_group(group: &[u8]) -> u8 {
    let mut value = 0u8;
    for &c in group {
        match (c as char).to_digit(16) {
            Some(digit) => value = (value << 4) | digit as u8,
            None => break,
        }
    }
    value
}
