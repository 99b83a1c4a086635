use crate::{Asn1DerError, Result};
use chrono::{DateTime, Utc};
use num_bigint_dig::{BigInt, Sign};
use pkix_asn1::{BitArray, Date, GeneralizedTimeRepr, TimeRepr, UTCTimeRepr};
use std::fmt;
use std::sync::Arc;

/// A read cursor over shared, immutable DER bytes.
///
/// Cloning (or [`dup`](Self::dup)) yields an independent cursor over the same bytes.
#[derive(Clone)]
pub struct DerInputBuffer {
    buf: Arc<[u8]>,
    pos: usize,
    count: usize,
    mark: usize,
}

impl DerInputBuffer {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        let buf = data.into();
        let count = buf.len();
        Self {
            buf,
            pos: 0,
            count,
            mark: 0,
        }
    }

    pub(crate) fn from_shared(buf: Arc<[u8]>, offset: usize, len: usize) -> Self {
        let end = offset.saturating_add(len).min(buf.len());
        let pos = offset.min(end);
        Self {
            buf,
            pos,
            count: end,
            mark: pos,
        }
    }

    /// Independent cursor at the same position
    pub fn dup(&self) -> Self {
        self.clone()
    }

    pub fn available(&self) -> usize {
        self.count - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remaining bytes, without consuming them
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.pos..self.count]
    }

    pub fn to_byte_array(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    pub(crate) fn shared(&self) -> &Arc<[u8]> {
        &self.buf
    }

    /// Limits the readable window to the next `len` bytes.
    pub fn truncate(&mut self, len: usize) -> Result<()> {
        if len > self.available() {
            return Err(Asn1DerError::TruncatedData("insufficient data"));
        }
        self.count = self.pos + len;
        Ok(())
    }

    pub fn read(&mut self) -> Result<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn peek(&self) -> Result<u8> {
        if self.pos >= self.count {
            return Err(Asn1DerError::TruncatedData("out of data"));
        }
        Ok(self.buf[self.pos])
    }

    /// Reads up to `out.len()` bytes and returns how many were copied.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.available());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    pub fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len, "short read")?.to_vec())
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len, "short skip").map(|_| ())
    }

    pub fn mark(&mut self) {
        self.mark = self.pos;
    }

    pub fn reset(&mut self) {
        self.pos = self.mark;
    }

    fn take(&mut self, len: usize, context: &'static str) -> Result<&[u8]> {
        if len > self.available() {
            return Err(Asn1DerError::TruncatedData(context));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..start + len])
    }

    /// Two's complement INTEGER content of `len` bytes.
    ///
    /// With `make_positive` the bytes are read as an unsigned magnitude.
    pub fn get_big_integer(&mut self, len: usize, make_positive: bool) -> Result<BigInt> {
        if len > self.available() {
            return Err(Asn1DerError::TruncatedData("short read of integer"));
        }
        if len == 0 {
            return Err(Asn1DerError::InvalidData(
                "Invalid encoding: zero length Int value".to_owned(),
            ));
        }

        let bytes = self.take(len, "short read of integer")?;
        if bytes.len() >= 2 && bytes[0] == 0 && bytes[1] < 0x80 {
            return Err(Asn1DerError::InvalidData(
                "Invalid encoding: redundant leading 0s".to_owned(),
            ));
        }

        Ok(if make_positive {
            BigInt::from_bytes_be(Sign::Plus, bytes)
        } else {
            BigInt::from_signed_bytes_be(bytes)
        })
    }

    /// INTEGER content that must fit an `i32`
    pub fn get_integer(&mut self, len: usize) -> Result<i32> {
        if len > self.available() {
            return Err(Asn1DerError::TruncatedData("short read of integer"));
        }
        if len == 0 {
            return Err(Asn1DerError::InvalidData(
                "Invalid encoding: zero length Int value".to_owned(),
            ));
        }

        let bytes = self.take(len, "short read of integer")?;
        if bytes.len() >= 2 && bytes[0] == 0 && bytes[1] < 0x80 {
            return Err(Asn1DerError::InvalidData(
                "Invalid encoding: redundant leading 0s".to_owned(),
            ));
        }

        let negative = bytes[0] & 0x80 != 0;
        let significant = bytes
            .iter()
            .position(|b| *b != if negative { 0xFF } else { 0x00 })
            .unwrap_or(bytes.len());
        let magnitude = bytes.len() - significant;
        let sign_flips = magnitude == 4 && (bytes[significant] & 0x80 != 0) != negative;
        if magnitude > 4 || sign_flips {
            return Err(Asn1DerError::InvalidData(if negative {
                "Integer below minimum valid value".to_owned()
            } else {
                "Integer exceeds maximum valid value".to_owned()
            }));
        }

        let mut value: i32 = if negative { -1 } else { 0 };
        for byte in &bytes[significant..] {
            value = (value << 8) | i32::from(*byte);
        }
        Ok(value)
    }

    /// BIT STRING content of `len` bytes whose bit count is a multiple of eight
    pub fn get_bit_string(&mut self, len: usize) -> Result<Vec<u8>> {
        if len > self.available() {
            return Err(Asn1DerError::TruncatedData("short read of bit string"));
        }
        if len == 0 {
            return Err(Asn1DerError::InvalidData("Invalid encoding: zero length bit string".to_owned()));
        }

        let bytes = self.take(len, "short read of bit string")?;
        let unused = bytes[0];
        if unused > 7 {
            return Err(Asn1DerError::InvalidData("Invalid number of padding bits".to_owned()));
        }

        let mut content = bytes[1..].to_vec();
        if unused != 0 {
            match content.last_mut() {
                Some(last) => *last &= 0xFFu8 << unused,
                None => {
                    return Err(Asn1DerError::InvalidData("Invalid number of padding bits".to_owned()));
                }
            }
        }
        Ok(content)
    }

    /// Consumes the rest of the window as BIT STRING content.
    pub fn get_unaligned_bit_string(&mut self) -> Result<BitArray> {
        let len = self.available();
        if len == 0 {
            return Ok(BitArray::new(0));
        }

        let bytes = self.take(len, "short read of bit string")?;
        let unused = usize::from(bytes[0]);
        if unused > 7 {
            return Err(Asn1DerError::InvalidData("Invalid number of padding bits".to_owned()));
        }

        let valid_bits = (len - 1)
            .checked_mul(8)
            .and_then(|bits| bits.checked_sub(unused))
            .ok_or_else(|| Asn1DerError::InvalidData("Invalid octet length".to_owned()))?;

        Ok(BitArray::from_bytes(valid_bits, &bytes[1..])?)
    }

    pub fn get_utc_time(&mut self, len: usize) -> Result<DateTime<Utc>> {
        self.get_time::<UTCTimeRepr>(len)
    }

    pub fn get_generalized_time(&mut self, len: usize) -> Result<DateTime<Utc>> {
        self.get_time::<GeneralizedTimeRepr>(len)
    }

    fn get_time<TR: TimeRepr>(&mut self, len: usize) -> Result<DateTime<Utc>> {
        let bytes = self.take(len, "short read of DER time")?;
        let date = Date::<TR>::decode(bytes)?;
        Ok(date.to_date_time())
    }
}

impl PartialEq for DerInputBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for DerInputBuffer {}

impl fmt::Debug for DerInputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerInputBuffer")
            .field("pos", &self.pos)
            .field("count", &self.count)
            .field("remaining", &self.as_slice())
            .finish()
    }
}
