//! Rewrites BER indefinite-length encodings into definite DER lengths.

use crate::length::{Length, INDEFINITE};
use crate::{Asn1DerError, Result};

/// Output of [`IndefiniteLengthConverter::convert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The converted value followed by any bytes that trailed it in the input
    pub der: Vec<u8>,
    /// Number of input bytes that made up the converted value
    pub consumed: usize,
}

enum Section {
    /// Content start of an indefinite-length value still waiting for its EOC
    Open(usize),
    /// Definite length octets replacing the `0x80` marker
    Resolved(Vec<u8>),
}

/// Two-pass converter: the first pass matches each `0x80` length with its
/// end-of-contents octets and computes the definite length, the second pass
/// copies the input while substituting lengths and dropping EOC octets.
#[derive(Default)]
pub struct IndefiniteLengthConverter {
    sections: Vec<Section>,
    unresolved: usize,
    /// Net growth of the output caused by replacing `0x80` + EOC by definite lengths
    growth: isize,
}

impl IndefiniteLengthConverter {
    pub fn is_indefinite(length_byte: u8) -> bool {
        length_byte == INDEFINITE
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the first value of `data`.
    pub fn convert(mut self, data: &[u8]) -> Result<Conversion> {
        if data.is_empty() {
            return Err(Asn1DerError::TruncatedData("No data to convert"));
        }

        let mut pos = 0;
        let mut size = data.len();
        let mut unused = 0;

        while pos < size {
            pos = self.parse_tag(data, pos)?;
            let (next, len) = self.parse_length(data, pos)?;
            pos = next;
            if len > size - pos {
                return Err(Asn1DerError::TruncatedData("Too little data"));
            }
            pos += len;

            if self.unresolved == 0 {
                unused = size - pos;
                size = pos;
                break;
            }
        }

        if self.unresolved != 0 {
            return Err(Asn1DerError::UnterminatedIndefiniteLength);
        }

        debug_log!("indefinite length value of {} bytes converted (growth {})", size, self.growth);

        let capacity = (size as isize + self.growth).max(0) as usize + unused;
        let mut der = Vec::with_capacity(capacity);
        let mut resolved = self.sections.into_iter().filter_map(|section| match section {
            Section::Resolved(bytes) => Some(bytes),
            Section::Open(_) => None,
        });

        let mut pos = 0;
        while pos < size {
            while pos + 1 < size && data[pos] == 0 && data[pos + 1] == 0 {
                pos += 2;
            }
            if pos >= size {
                break;
            }
            der.push(data[pos]);
            pos += 1;
            if pos >= size {
                break;
            }

            let first = data[pos];
            pos += 1;
            if Self::is_indefinite(first) {
                let bytes = resolved.next().ok_or(Asn1DerError::UnterminatedIndefiniteLength)?;
                der.extend_from_slice(&bytes);
                continue;
            }

            let octets = if first & 0x80 != 0 { usize::from(first & 0x7F) } else { 0 };
            let len = Self::length_value(data, first, pos, octets);
            der.push(first);
            der.extend_from_slice(&data[pos..pos + octets]);
            pos += octets;
            der.extend_from_slice(&data[pos..pos + len]);
            pos += len;
        }

        der.extend_from_slice(&data[size..size + unused]);

        Ok(Conversion { der, consumed: size })
    }

    fn parse_tag(&mut self, data: &[u8], pos: usize) -> Result<usize> {
        if data[pos] == 0 && data.get(pos + 1) == Some(&0) {
            let mut encapsulated: isize = 0;
            let mut open = None;
            for (index, section) in self.sections.iter().enumerate().rev() {
                match section {
                    Section::Open(start) => {
                        open = Some((index, *start));
                        break;
                    }
                    Section::Resolved(bytes) => encapsulated += bytes.len() as isize - 3,
                }
            }
            let (index, start) = open.ok_or(Asn1DerError::UnmatchedEndOfContents)?;

            let section_len = (pos - start) as isize + encapsulated;
            let mut bytes = Vec::new();
            Length::write(section_len.max(0) as usize, &mut bytes);
            self.growth += bytes.len() as isize - 3;
            self.sections[index] = Section::Resolved(bytes);
            self.unresolved -= 1;
        }
        Ok(pos + 1)
    }

    fn parse_length(&mut self, data: &[u8], pos: usize) -> Result<(usize, usize)> {
        let Some(&first) = data.get(pos) else {
            return Err(Asn1DerError::TruncatedData("Too little data"));
        };
        let pos = pos + 1;

        if Self::is_indefinite(first) {
            self.sections.push(Section::Open(pos));
            self.unresolved += 1;
            return Ok((pos, 0));
        }
        if first & 0x80 == 0 {
            return Ok((pos, usize::from(first)));
        }

        let octets = usize::from(first & 0x7F);
        if octets > 4 {
            return Err(Asn1DerError::InvalidLength("Too much data".to_owned()));
        }
        if data.len() - pos < octets {
            return Err(Asn1DerError::TruncatedData("Too little data"));
        }
        Ok((pos + octets, Self::length_value(data, first, pos, octets)))
    }

    fn length_value(data: &[u8], first: u8, pos: usize, octets: usize) -> usize {
        if octets == 0 {
            return usize::from(first & 0x7F);
        }
        data[pos..pos + octets]
            .iter()
            .fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte))
    }
}
