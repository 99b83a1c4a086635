//! Character set conversions for the ASN.1 string types.
//!
//! Decoding is lenient: undecodable input is replaced by U+FFFD.
//! Encoding replaces unrepresentable characters by `?`.

use std::char::REPLACEMENT_CHARACTER;

pub(crate) fn decode_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| if b.is_ascii() { char::from(*b) } else { REPLACEMENT_CHARACTER })
        .collect()
}

pub(crate) fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}

pub(crate) fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// UTF-16BE; a dangling odd byte decodes to U+FFFD
pub(crate) fn decode_bmp(bytes: &[u8]) -> String {
    let units = bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            _ => REPLACEMENT_CHARACTER as u16,
        });
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(REPLACEMENT_CHARACTER))
        .collect()
}

pub(crate) fn encode_ascii(value: &str) -> Vec<u8> {
    value.chars().map(|c| if c.is_ascii() { c as u8 } else { b'?' }).collect()
}

pub(crate) fn encode_latin1(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

pub(crate) fn encode_bmp(value: &str) -> Vec<u8> {
    value.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// Characters allowed in a PrintableString
pub fn is_printable_string_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            ' ' | '\'' | '(' | ')' | '+' | ',' | '-' | '.' | '/' | ':' | '=' | '?'
        )
}
