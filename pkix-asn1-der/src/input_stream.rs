use crate::charset;
use crate::indefinite_length::IndefiniteLengthConverter;
use crate::length::Length;
use crate::object_identifier::decode_oid;
use crate::{Asn1DerError, DerInputBuffer, DerValue, Result};
use chrono::{DateTime, Utc};
use num_bigint_dig::BigInt;
use oid::ObjectIdentifier;
use pkix_asn1::{BitArray, Tag};

/// Sequential reader of DER values.
///
/// Each typed getter consumes one complete TLV and checks its tag first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerInputStream {
    buffer: DerInputBuffer,
}

impl DerInputStream {
    /// Creates a stream over `data`.
    ///
    /// Input whose second byte announces an indefinite length is converted to
    /// definite lengths up front.
    pub fn new(data: &[u8]) -> Result<Self> {
        if data.len() > 2 && IndefiniteLengthConverter::is_indefinite(data[1]) {
            let conversion = IndefiniteLengthConverter::new().convert(data)?;
            return Ok(Self::from_buffer(DerInputBuffer::new(conversion.der)));
        }
        Ok(Self::from_buffer(DerInputBuffer::new(data.to_vec())))
    }

    pub fn from_buffer(buffer: DerInputBuffer) -> Self {
        Self { buffer }
    }

    /// Stream over the next `len` bytes; with `do_skip` this stream moves past them.
    pub fn sub_stream(&mut self, len: usize, do_skip: bool) -> Result<DerInputStream> {
        let mut sub = self.buffer.dup();
        sub.truncate(len)?;
        if do_skip {
            self.buffer.skip(len)?;
        }
        Ok(Self::from_buffer(sub))
    }

    pub fn to_byte_array(&self) -> Vec<u8> {
        self.buffer.to_byte_array()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn available(&self) -> usize {
        self.buffer.available()
    }

    pub fn mark(&mut self) {
        self.buffer.mark();
    }

    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    pub fn get_byte(&mut self) -> Result<u8> {
        self.buffer.read()
    }

    pub fn peek_byte(&self) -> Result<u8> {
        self.buffer.peek()
    }

    pub fn peek_tag(&self) -> Result<Tag> {
        self.buffer.peek().map(Tag::from)
    }

    fn expect_tag(&mut self, expected: Tag, context: &'static str) -> Result<()> {
        let actual = Tag::from(self.buffer.read()?);
        if actual != expected {
            return Err(Asn1DerError::tag_mismatch(context, expected, actual));
        }
        Ok(())
    }

    fn definite_length(&mut self, context: &'static str) -> Result<usize> {
        let first = self.buffer.read()?;
        Length::read(first, &mut self.buffer)?.definite(context)
    }

    /// Splits off the content of the current TLV, whose header was already read.
    fn content(&mut self, len: usize, context: &'static str) -> Result<DerInputBuffer> {
        if len > self.buffer.available() {
            return Err(Asn1DerError::TruncatedData(context));
        }
        let mut content = self.buffer.dup();
        content.truncate(len)?;
        self.buffer.skip(len)?;
        Ok(content)
    }

    pub fn get_integer(&mut self) -> Result<i32> {
        self.expect_tag(Tag::INTEGER, "DER input, Integer tag error")?;
        let len = self.definite_length("getInteger")?;
        self.buffer.get_integer(len)
    }

    pub fn get_big_integer(&mut self) -> Result<BigInt> {
        self.expect_tag(Tag::INTEGER, "DER input, Integer tag error")?;
        let len = self.definite_length("getBigInteger")?;
        self.buffer.get_big_integer(len, false)
    }

    /// INTEGER content read as an unsigned magnitude
    pub fn get_positive_big_integer(&mut self) -> Result<BigInt> {
        self.expect_tag(Tag::INTEGER, "DER input, Integer tag error")?;
        let len = self.definite_length("getPositiveBigInteger")?;
        self.buffer.get_big_integer(len, true)
    }

    pub fn get_enumerated(&mut self) -> Result<i32> {
        self.expect_tag(Tag::ENUMERATED, "DER input, Enumerated tag error")?;
        let len = self.definite_length("getEnumerated")?;
        self.buffer.get_integer(len)
    }

    pub fn get_bit_string(&mut self) -> Result<Vec<u8>> {
        self.expect_tag(Tag::BIT_STRING, "DER input not an bit string")?;
        let len = self.definite_length("getBitString")?;
        self.buffer.get_bit_string(len)
    }

    pub fn get_unaligned_bit_string(&mut self) -> Result<BitArray> {
        self.expect_tag(Tag::BIT_STRING, "DER input not a bit string")?;
        let len = self.definite_length("getUnalignedBitString")?;
        self.content(len, "Short read of DER bit string")?.get_unaligned_bit_string()
    }

    pub fn get_octet_string(&mut self) -> Result<Vec<u8>> {
        self.expect_tag(Tag::OCTET_STRING, "DER input not an octet string")?;
        let len = self.definite_length("getOctetString")?;
        self.buffer
            .read_exact(len)
            .map_err(|_| Asn1DerError::TruncatedData("Short read of DER octet string"))
    }

    /// Fills `out` with the next raw bytes.
    pub fn get_bytes(&mut self, out: &mut [u8]) -> Result<()> {
        if self.buffer.read_into(out) != out.len() {
            return Err(Asn1DerError::TruncatedData("Short read of DER octet string"));
        }
        Ok(())
    }

    pub fn get_null(&mut self) -> Result<()> {
        if self.buffer.read()? != Tag::NULL.inner() || self.buffer.read()? != 0 {
            return Err(Asn1DerError::InvalidData("getNull, bad data".to_owned()));
        }
        Ok(())
    }

    pub fn get_oid(&mut self) -> Result<ObjectIdentifier> {
        self.expect_tag(Tag::OID, "ObjectIdentifier() -- data isn't an object ID")?;
        let len = self.definite_length("getOID")?;
        let content = self.content(len, "short read of OID")?;
        decode_oid(content.as_slice())
    }

    pub fn get_der_value(&mut self) -> Result<DerValue> {
        DerValue::parse(&mut self.buffer)
    }

    pub fn get_utf8_string(&mut self) -> Result<String> {
        self.read_string(Tag::UTF8_STRING, "DER input not a UTF-8 string", charset::decode_utf8)
    }

    pub fn get_printable_string(&mut self) -> Result<String> {
        self.read_string(
            Tag::PRINTABLE_STRING,
            "DER input not a Printable string",
            charset::decode_ascii,
        )
    }

    pub fn get_t61_string(&mut self) -> Result<String> {
        self.read_string(Tag::T61_STRING, "DER input not a T61 string", charset::decode_latin1)
    }

    pub fn get_ia5_string(&mut self) -> Result<String> {
        self.read_string(Tag::IA5_STRING, "DER input not a IA5 string", charset::decode_ascii)
    }

    pub fn get_bmp_string(&mut self) -> Result<String> {
        self.read_string(Tag::BMP_STRING, "DER input not a BMP string", charset::decode_bmp)
    }

    pub fn get_general_string(&mut self) -> Result<String> {
        self.read_string(Tag::GENERAL_STRING, "DER input not a General string", charset::decode_ascii)
    }

    fn read_string(&mut self, tag: Tag, context: &'static str, decode: fn(&[u8]) -> String) -> Result<String> {
        self.expect_tag(tag, context)?;
        let len = self.definite_length(context)?;
        let content = self.content(len, "Short read of DER string")?;
        Ok(decode(content.as_slice()))
    }

    pub fn get_utc_time(&mut self) -> Result<DateTime<Utc>> {
        self.expect_tag(Tag::UTC_TIME, "DER input, UTCtime tag invalid")?;
        let len = self.definite_length("getUTCTime")?;
        self.buffer.get_utc_time(len)
    }

    pub fn get_generalized_time(&mut self) -> Result<DateTime<Utc>> {
        self.expect_tag(Tag::GENERALIZED_TIME, "DER input, GeneralizedTime tag invalid")?;
        let len = self.definite_length("getGeneralizedTime")?;
        self.buffer.get_generalized_time(len)
    }

    /// Children of a SEQUENCE; `start_len` is a capacity hint.
    pub fn get_sequence(&mut self, start_len: usize) -> Result<Vec<DerValue>> {
        self.expect_tag(Tag::SEQUENCE, "Sequence tag error")?;
        self.read_vector(Tag::SEQUENCE, start_len)
    }

    pub fn get_set(&mut self, start_len: usize) -> Result<Vec<DerValue>> {
        self.expect_tag(Tag::SET, "Set tag error")?;
        self.read_vector(Tag::SET, start_len)
    }

    /// Children of a SET OF; with `implicit` any outer tag is accepted.
    pub fn get_set_implicit(&mut self, start_len: usize, implicit: bool) -> Result<Vec<DerValue>> {
        if !implicit {
            return self.get_set(start_len);
        }
        let tag = Tag::from(self.buffer.read()?);
        self.read_vector(tag, start_len)
    }

    fn read_vector(&mut self, tag: Tag, start_len: usize) -> Result<Vec<DerValue>> {
        let first = self.buffer.read()?;

        let mut content = match Length::read(first, &mut self.buffer)? {
            Length::Definite(len) => self.content(len, "short read of sequence")?,
            Length::Indefinite => {
                let mut ber = Vec::with_capacity(self.buffer.available() + 2);
                ber.push(tag.inner());
                ber.push(first);
                ber.extend_from_slice(self.buffer.as_slice());

                let conversion = IndefiniteLengthConverter::new().convert(&ber)?;
                self.buffer.skip(conversion.consumed - 2)?;

                let mut converted = DerInputBuffer::new(conversion.der);
                converted.skip(1)?;
                let first = converted.read()?;
                let len = Length::read(first, &mut converted)?.definite("readVector")?;
                converted.truncate(len)?;
                converted
            }
        };

        let mut values = Vec::with_capacity(start_len);
        while content.available() > 0 {
            let remaining = content.available();
            match DerValue::parse(&mut content) {
                Ok(value) => values.push(value),
                // leftover octets too short to hold the element they announce
                Err(Asn1DerError::TruncatedData(_)) => return Err(Asn1DerError::TrailingData { remaining }),
                Err(e) => return Err(e),
            }
        }

        debug_log!("{} with {} elements", tag, values.len());

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sequence_of_integers() {
        let mut stream = DerInputStream::new(&hex::decode("3006020101020102").unwrap()).unwrap();
        let values = stream.get_sequence(2).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].get_integer().unwrap(), 1);
        assert_eq!(values[1].get_integer().unwrap(), 2);
        assert_eq!(stream.available(), 0);
    }

    #[test]
    fn empty_sequence() {
        let mut stream = DerInputStream::new(&[0x30, 0x00]).unwrap();
        assert!(stream.get_sequence(0).unwrap().is_empty());
    }

    #[test]
    fn indefinite_sequence_in_the_middle() {
        // INTEGER 5, SEQUENCE (indef) { NULL }, BOOLEAN TRUE
        let data = hex::decode("0201053080050000000101FF").unwrap();
        let mut stream = DerInputStream::new(&data).unwrap();
        assert_eq!(stream.get_integer().unwrap(), 5);
        let values = stream.get_sequence(1).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].tag(), Tag::NULL);
        assert_eq!(stream.get_der_value().unwrap().get_boolean().unwrap(), true);
        assert_eq!(stream.available(), 0);
    }

    #[test]
    fn trailing_junk_in_sequence() {
        // SEQUENCE { INTEGER 1, 02 05 }
        let mut stream = DerInputStream::new(&hex::decode("30050201010205").unwrap()).unwrap();
        assert!(matches!(
            stream.get_sequence(1),
            Err(Asn1DerError::TrailingData { remaining: 2 })
        ));

        // a lone octet after the last element
        let mut stream = DerInputStream::new(&hex::decode("300402010100").unwrap()).unwrap();
        assert!(matches!(
            stream.get_sequence(1),
            Err(Asn1DerError::TrailingData { remaining: 1 })
        ));
    }

    #[test]
    fn tag_errors() {
        let mut stream = DerInputStream::new(&[0x31, 0x00]).unwrap();
        let err = stream.get_sequence(0).unwrap_err();
        assert!(err.to_string().starts_with("Sequence tag error"));

        let mut stream = DerInputStream::new(&[0x05, 0x01, 0x00]).unwrap();
        assert_eq!(stream.get_null().unwrap_err().to_string(), "invalid data: getNull, bad data");
    }

    #[test]
    fn sub_stream_skips() {
        let mut stream = DerInputStream::new(&[0x02, 0x01, 0x07, 0x05, 0x00]).unwrap();
        let mut sub = stream.sub_stream(3, true).unwrap();
        assert_eq!(sub.get_integer().unwrap(), 7);
        stream.get_null().unwrap();
        assert_eq!(stream.available(), 0);
    }

    #[test]
    fn strings_and_oid() {
        let data = hex::decode("130474657374160361406206032A0304").unwrap();
        let mut stream = DerInputStream::new(&data).unwrap();
        assert_eq!(stream.get_printable_string().unwrap(), "test");
        assert_eq!(stream.get_ia5_string().unwrap(), "a@b");
        assert_eq!(Into::<String>::into(&stream.get_oid().unwrap()), "1.2.3.4");
    }

    #[test]
    fn mark_and_reset() {
        let mut stream = DerInputStream::new(&[0x02, 0x01, 0x07]).unwrap();
        stream.mark();
        assert_eq!(stream.peek_byte().unwrap(), 0x02);
        assert_eq!(stream.get_integer().unwrap(), 7);
        stream.reset();
        assert_eq!(stream.available(), 3);
    }
}
