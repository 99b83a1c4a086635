use std::{error, fmt};

const BITS_PER_UNIT: usize = 8;
const BYTES_PER_LINE: usize = 8;

const NYBBLE: [&str; 16] = [
    "0000", "0001", "0010", "0011", "0100", "0101", "0110", "0111", "1000", "1001", "1010", "1011", "1100", "1101",
    "1110", "1111",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitArrayError {
    /// the backing bytes cannot hold the requested number of bits
    TooShort { length: usize, available: usize },
    /// bit index out of range
    IndexOutOfBounds { index: usize, length: usize },
}

impl fmt::Display for BitArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitArrayError::TooShort { length, available } => write!(
                f,
                "byte array too short to represent bit array of given length (needs {} bits, got {})",
                length, available
            ),
            BitArrayError::IndexOutOfBounds { index, length } => {
                write!(f, "bit index {} out of bounds for bit array of length {}", index, length)
            }
        }
    }
}

impl error::Error for BitArrayError {}

/// A sequence of bits packed big-endian in bytes, as carried by a DER BIT STRING.
///
/// Bits past `len()` in the last byte are always zero.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitArray {
    length: usize,
    repn: Vec<u8>,
}

#[inline]
fn subscript(idx: usize) -> usize {
    idx / BITS_PER_UNIT
}

#[inline]
fn position(idx: usize) -> u8 {
    1 << (BITS_PER_UNIT - 1 - (idx % BITS_PER_UNIT))
}

impl BitArray {
    /// Creates an all-zero bit array of `length` bits.
    pub fn new(length: usize) -> Self {
        let rep_length = (length + BITS_PER_UNIT - 1) / BITS_PER_UNIT;
        Self {
            length,
            repn: vec![0; rep_length],
        }
    }

    /// Creates a bit array of `length` bits out of packed `bytes`.
    ///
    /// Extra bytes are ignored and trailing bits of the last used byte are cleared.
    pub fn from_bytes(length: usize, bytes: &[u8]) -> Result<Self, BitArrayError> {
        if bytes.len() * BITS_PER_UNIT < length {
            return Err(BitArrayError::TooShort {
                length,
                available: bytes.len() * BITS_PER_UNIT,
            });
        }

        let rep_length = (length + BITS_PER_UNIT - 1) / BITS_PER_UNIT;
        let unused_bits = rep_length * BITS_PER_UNIT - length;
        let mut repn = bytes[..rep_length].to_vec();
        if let Some(last) = repn.last_mut() {
            *last &= 0xFFu8 << unused_bits;
        }

        Ok(Self { length, repn })
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut array = Self::new(bits.len());
        for (idx, bit) in bits.iter().enumerate() {
            if *bit {
                array.repn[subscript(idx)] |= position(idx);
            }
        }
        array
    }

    pub fn get(&self, index: usize) -> Result<bool, BitArrayError> {
        self.check_index(index)?;
        Ok(self.repn[subscript(index)] & position(index) != 0)
    }

    pub fn set(&mut self, index: usize, value: bool) -> Result<(), BitArrayError> {
        self.check_index(index)?;
        let bit = position(index);
        if value {
            self.repn[subscript(index)] |= bit;
        } else {
            self.repn[subscript(index)] &= !bit;
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), BitArrayError> {
        if index >= self.length {
            Err(BitArrayError::IndexOutOfBounds {
                index,
                length: self.length,
            })
        } else {
            Ok(())
        }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.repn
    }

    pub fn to_byte_array(&self) -> Vec<u8> {
        self.repn.clone()
    }

    pub fn to_boolean_array(&self) -> Vec<bool> {
        (0..self.length)
            .map(|idx| self.repn[subscript(idx)] & position(idx) != 0)
            .collect()
    }

    /// Drops trailing zero bits.
    ///
    /// An array without any set bit truncates to a single `0` bit.
    pub fn truncate(&self) -> BitArray {
        for idx in (0..self.length).rev() {
            if self.repn[subscript(idx)] & position(idx) != 0 {
                let length = idx + 1;
                let rep_length = (idx + BITS_PER_UNIT) / BITS_PER_UNIT;
                return BitArray {
                    length,
                    repn: self.repn[..rep_length].to_vec(),
                };
            }
        }
        BitArray::new(1)
    }

    /// Hash code compatible with the classic `31 * h + byte` scheme, xored with the bit length.
    pub fn hash_code(&self) -> i32 {
        let hash = self
            .repn
            .iter()
            .fold(0i32, |hash, byte| hash.wrapping_mul(31).wrapping_add(i32::from(*byte as i8)));
        hash ^ self.length as i32
    }
}

impl fmt::Debug for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitArray")
            .field("length", &self.length)
            .field("repn", &self.repn)
            .finish()
    }
}

impl fmt::Display for BitArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_bytes = self.repn.len().saturating_sub(1);
        for (i, byte) in self.repn[..full_bytes].iter().enumerate() {
            f.write_str(NYBBLE[usize::from(byte >> 4)])?;
            f.write_str(NYBBLE[usize::from(byte & 0x0F)])?;
            if i % BYTES_PER_LINE == BYTES_PER_LINE - 1 {
                f.write_str("\n")?;
            } else {
                f.write_str(" ")?;
            }
        }

        for idx in BITS_PER_UNIT * full_bytes..self.length {
            let bit = self.repn[subscript(idx)] & position(idx) != 0;
            f.write_str(if bit { "1" } else { "0" })?;
        }

        Ok(())
    }
}

impl From<&[bool]> for BitArray {
    fn from(bits: &[bool]) -> Self {
        Self::from_bools(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trailing_bits_are_masked() {
        let array = BitArray::from_bytes(10, &[0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(array.as_bytes(), &[0xFF, 0xC0]);
        assert_eq!(array.len(), 10);
    }

    #[test]
    fn too_short() {
        let err = BitArray::from_bytes(17, &[0xFF, 0xFF]).unwrap_err();
        assert_eq!(
            err,
            BitArrayError::TooShort {
                length: 17,
                available: 16
            }
        );
    }

    #[test]
    fn get_and_set() {
        let mut array = BitArray::new(12);
        array.set(0, true).unwrap();
        array.set(9, true).unwrap();
        assert_eq!(array.as_bytes(), &[0x80, 0x40]);
        assert!(array.get(9).unwrap());
        assert!(!array.get(8).unwrap());
        array.set(0, false).unwrap();
        assert_eq!(array.as_bytes(), &[0x00, 0x40]);
        assert!(array.get(12).is_err());
        assert!(array.set(12, true).is_err());
    }

    #[test]
    fn truncate_keeps_up_to_last_set_bit() {
        let array = BitArray::from_bools(&[true, true, false, false, false, false, false, false]);
        let truncated = array.truncate();
        assert_eq!(truncated.len(), 2);
        assert_eq!(truncated.to_boolean_array(), vec![true, true]);
    }

    #[test]
    fn truncate_all_zero() {
        let truncated = BitArray::new(19).truncate();
        assert_eq!(truncated.len(), 1);
        assert_eq!(truncated.to_boolean_array(), vec![false]);
    }

    #[test]
    fn truncate_across_bytes() {
        let mut array = BitArray::new(24);
        array.set(9, true).unwrap();
        let truncated = array.truncate();
        assert_eq!(truncated.len(), 10);
        assert_eq!(truncated.as_bytes(), &[0x00, 0x40]);
    }

    #[test]
    fn equality_and_hash_code() {
        let a = BitArray::from_bytes(9, &[0xAA, 0x80]).unwrap();
        let b = BitArray::from_bytes(9, &[0xAA, 0xFF]).unwrap();
        let c = BitArray::from_bytes(10, &[0xAA, 0x80]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.hash_code(), b.hash_code());
        // (31 * -86 + -128) ^ 9
        assert_eq!(a.hash_code(), (31 * -86 - 128) ^ 9);
    }

    #[test]
    fn display_groups_bytes() {
        let array = BitArray::from_bytes(11, &[0xA5, 0xE0]).unwrap();
        assert_eq!(array.to_string(), "10100101 111");

        let long = BitArray::from_bytes(72, &[0xFF; 9]).unwrap();
        let rendered = long.to_string();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.ends_with("\n11111111"));
    }
}
