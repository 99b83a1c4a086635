use crate::{Asn1DerError, DerInputBuffer, Result};

/// Marker byte announcing a BER indefinite length
pub const INDEFINITE: u8 = 0x80;

/// Maximum number of subsequent length octets accepted in long form
const MAX_LENGTH_OCTETS: u8 = 4;

/// A decoded length octet sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

impl Length {
    /// Decodes a length whose first octet was already consumed from `buffer`.
    ///
    /// Long forms must be minimal: a leading zero octet or a value that fits in the
    /// short form are rejected.
    pub fn read(first: u8, buffer: &mut DerInputBuffer) -> Result<Length> {
        if first & 0x80 == 0 {
            return Ok(Length::Definite(usize::from(first)));
        }

        let octets = first & 0x7F;
        if octets == 0 {
            return Ok(Length::Indefinite);
        }
        if octets > MAX_LENGTH_OCTETS {
            return Err(Asn1DerError::InvalidLength(format!(
                "DerInputStream.getLength(): lengthTag={}, too big.",
                octets
            )));
        }

        let mut value = usize::from(buffer.read()?);
        if value == 0 {
            return Err(Asn1DerError::InvalidLength(
                "DerInputStream.getLength(): Redundant length bytes found".to_owned(),
            ));
        }
        for _ in 1..octets {
            value = (value << 8) | usize::from(buffer.read()?);
        }

        if value <= 127 {
            return Err(Asn1DerError::InvalidLength(
                "DerInputStream.getLength(): Should use short form for length".to_owned(),
            ));
        }

        Ok(Length::Definite(value))
    }

    /// Definite value, or an error naming `context`
    pub fn definite(self, context: &'static str) -> Result<usize> {
        match self {
            Length::Definite(len) => Ok(len),
            Length::Indefinite => Err(Asn1DerError::InvalidLength(format!(
                "{}: indefinite length not allowed here",
                context
            ))),
        }
    }

    /// Number of octets used by the minimal encoding of `len`
    pub fn encoded_len(len: usize) -> usize {
        match len {
            0..=0x7F => 1,
            0x80..=0xFF => 2,
            0x100..=0xFFFF => 3,
            0x1_0000..=0xFF_FFFF => 4,
            _ => 5,
        }
    }

    /// Appends the minimal encoding of `len` to `out`.
    pub fn write(len: usize, out: &mut Vec<u8>) {
        let encoded_len = Self::encoded_len(len);
        if encoded_len == 1 {
            out.push(len as u8);
            return;
        }

        let octets = encoded_len - 1;
        out.push(0x80 | octets as u8);
        for shift in (0..octets).rev() {
            out.push((len >> (shift * 8)) as u8);
        }
    }
}
