use crate::charset;
use crate::length::Length;
use crate::object_identifier::encode_oid;
use crate::{DerValue, Result};
use chrono::{DateTime, Utc};
use num_bigint_dig::BigInt;
use oid::ObjectIdentifier;
use pkix_asn1::{BitArray, ByteArrayLexOrder, GeneralizedTime, Tag, TagClass, UTCTime};
use std::cmp::Ordering;

/// Types able to write their own DER encoding
pub trait DerEncode {
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()>;
}

/// Growable DER output buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DerOutputStream {
    buf: Vec<u8>,
}

impl DerOutputStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn to_byte_array(&self) -> Vec<u8> {
        self.buf.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Appends already encoded bytes.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a TLV with `content` as value.
    pub fn write(&mut self, tag: Tag, content: &[u8]) {
        self.put_tag(tag);
        self.put_length(content.len());
        self.buf.extend_from_slice(content);
    }

    /// Writes a TLV whose value is the content of `stream`.
    pub fn write_stream(&mut self, tag: Tag, stream: &DerOutputStream) {
        self.write(tag, &stream.buf);
    }

    /// Copies the encoding held by `value`, replacing its identifier octet by `tag`.
    pub fn write_implicit(&mut self, tag: Tag, value: &DerOutputStream) {
        self.put_tag(tag);
        if let Some(rest) = value.buf.get(1..) {
            self.buf.extend_from_slice(rest);
        }
    }

    pub fn put_tag(&mut self, tag: Tag) {
        self.buf.push(tag.inner());
    }

    /// Identifier octet from its parts
    pub fn put_tag_parts(&mut self, class: TagClass, constructed: bool, number: u8) {
        self.put_tag(Tag::create(class, constructed, number));
    }

    pub fn put_length(&mut self, len: usize) {
        Length::write(len, &mut self.buf);
    }

    pub fn put_der_value(&mut self, value: &DerValue) {
        value.encode(self);
    }

    pub fn put_boolean(&mut self, value: bool) {
        self.write(Tag::BOOLEAN, &[if value { 0xFF } else { 0x00 }]);
    }

    pub fn put_integer(&mut self, value: i32) {
        self.put_tag(Tag::INTEGER);
        self.put_integer_contents(value);
    }

    pub fn put_enumerated(&mut self, value: i32) {
        self.put_tag(Tag::ENUMERATED);
        self.put_integer_contents(value);
    }

    fn put_integer_contents(&mut self, value: i32) {
        let bytes = value.to_be_bytes();
        let mut start = 0;
        if bytes[0] == 0xFF {
            while start < 3 && bytes[start] == 0xFF && bytes[start + 1] & 0x80 == 0x80 {
                start += 1;
            }
        } else if bytes[0] == 0x00 {
            while start < 3 && bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0 {
                start += 1;
            }
        }
        self.put_length(4 - start);
        self.buf.extend_from_slice(&bytes[start..]);
    }

    pub fn put_big_integer(&mut self, value: &BigInt) {
        self.write(Tag::INTEGER, &value.to_signed_bytes_be());
    }

    /// BIT STRING with no unused bits
    pub fn put_bit_string(&mut self, bits: &[u8]) {
        self.put_tag(Tag::BIT_STRING);
        self.put_length(bits.len() + 1);
        self.buf.push(0);
        self.buf.extend_from_slice(bits);
    }

    pub fn put_unaligned_bit_string(&mut self, bits: &BitArray) {
        let bytes = bits.as_bytes();
        self.put_tag(Tag::BIT_STRING);
        self.put_length(bytes.len() + 1);
        self.buf.push((bytes.len() * 8 - bits.len()) as u8);
        self.buf.extend_from_slice(bytes);
    }

    /// Named-bit BIT STRING: trailing zero bits are dropped first.
    pub fn put_truncated_unaligned_bit_string(&mut self, bits: &BitArray) {
        self.put_unaligned_bit_string(&bits.truncate());
    }

    pub fn put_octet_string(&mut self, octets: &[u8]) {
        self.write(Tag::OCTET_STRING, octets);
    }

    pub fn put_null(&mut self) {
        self.put_tag(Tag::NULL);
        self.put_length(0);
    }

    pub fn put_oid(&mut self, oid: &ObjectIdentifier) -> Result<()> {
        let content = encode_oid(oid)?;
        self.write(Tag::OID, &content);
        Ok(())
    }

    pub fn put_sequence(&mut self, values: &[DerValue]) {
        self.put_constructed(Tag::SEQUENCE, values);
    }

    pub fn put_set(&mut self, values: &[DerValue]) {
        self.put_constructed(Tag::SET, values);
    }

    fn put_constructed(&mut self, tag: Tag, values: &[DerValue]) {
        let mut content = DerOutputStream::new();
        for value in values {
            value.encode(&mut content);
        }
        self.write_stream(tag, &content);
    }

    /// DER SET OF: elements sorted by their encodings.
    pub fn put_ordered_set_of<T: DerEncode>(&mut self, tag: Tag, set: &[T]) -> Result<()> {
        self.put_ordered(tag, set, |a, b| ByteArrayLexOrder.compare(a, b))
    }

    /// DER SET: elements sorted by their tag numbers.
    pub fn put_ordered_set<T: DerEncode>(&mut self, tag: Tag, set: &[T]) -> Result<()> {
        self.put_ordered(tag, set, |a, b| {
            let lhs = a.first().map(|t| t | Tag::FORM_CONSTRUCTED);
            let rhs = b.first().map(|t| t | Tag::FORM_CONSTRUCTED);
            lhs.cmp(&rhs)
        })
    }

    fn put_ordered<T, F>(&mut self, tag: Tag, set: &[T], order: F) -> Result<()>
    where
        T: DerEncode,
        F: Fn(&[u8], &[u8]) -> Ordering,
    {
        let mut encodings = set
            .iter()
            .map(|element| {
                let mut out = DerOutputStream::new();
                element.encode_der(&mut out)?;
                Ok(out.buf)
            })
            .collect::<Result<Vec<Vec<u8>>>>()?;
        encodings.sort_by(|a, b| order(a.as_slice(), b.as_slice()));

        let mut content = DerOutputStream::new();
        for encoding in &encodings {
            content.write_raw(encoding);
        }
        self.write_stream(tag, &content);
        Ok(())
    }

    pub fn put_utf8_string(&mut self, value: &str) {
        self.write(Tag::UTF8_STRING, value.as_bytes());
    }

    pub fn put_printable_string(&mut self, value: &str) {
        self.write(Tag::PRINTABLE_STRING, &charset::encode_ascii(value));
    }

    pub fn put_t61_string(&mut self, value: &str) {
        self.write(Tag::T61_STRING, &charset::encode_latin1(value));
    }

    pub fn put_ia5_string(&mut self, value: &str) {
        self.write(Tag::IA5_STRING, &charset::encode_ascii(value));
    }

    pub fn put_bmp_string(&mut self, value: &str) {
        self.write(Tag::BMP_STRING, &charset::encode_bmp(value));
    }

    pub fn put_general_string(&mut self, value: &str) {
        self.write(Tag::GENERAL_STRING, &charset::encode_ascii(value));
    }

    /// `YYMMDDhhmmssZ`
    pub fn put_utc_time(&mut self, time: &DateTime<Utc>) {
        self.write(Tag::UTC_TIME, &UTCTime::from_date_time(time).encode());
    }

    /// `YYYYMMDDhhmmssZ`
    pub fn put_generalized_time(&mut self, time: &DateTime<Utc>) {
        self.write(Tag::GENERALIZED_TIME, &GeneralizedTime::from_date_time(time).encode());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn encoded(f: impl FnOnce(&mut DerOutputStream)) -> Vec<u8> {
        let mut out = DerOutputStream::new();
        f(&mut out);
        out.into_bytes()
    }

    #[rstest]
    #[case(0, "020100")]
    #[case(127, "02017F")]
    #[case(128, "02020080")]
    #[case(256, "02020100")]
    #[case(-1, "0201FF")]
    #[case(-128, "020180")]
    #[case(-129, "0202FF7F")]
    #[case(i32::MAX, "02047FFFFFFF")]
    #[case(i32::MIN, "020480000000")]
    fn minimal_integers(#[case] value: i32, #[case] expected: &str) {
        assert_eq!(encoded(|out| out.put_integer(value)), hex::decode(expected).unwrap());
    }

    #[test]
    fn big_integer_matches_small_form() {
        assert_eq!(
            encoded(|out| out.put_big_integer(&BigInt::from(128))),
            encoded(|out| out.put_integer(128))
        );
    }

    #[test]
    fn unaligned_bits() {
        let bits = BitArray::from_bools(&[true, false, true, false, false, false, false, false, false]);
        assert_eq!(encoded(|out| out.put_unaligned_bit_string(&bits)), vec![0x03, 0x03, 0x07, 0xA0, 0x00]);
        assert_eq!(
            encoded(|out| out.put_truncated_unaligned_bit_string(&bits)),
            vec![0x03, 0x02, 0x05, 0xA0]
        );
    }

    #[test]
    fn ordered_set_of_sorts_encodings() {
        let set = [
            DerValue::new(Tag::INTEGER, vec![0x02]),
            DerValue::new(Tag::BOOLEAN, vec![0xFF]),
            DerValue::new(Tag::INTEGER, vec![0x01]),
        ];
        let bytes = encoded(|out| out.put_ordered_set_of(Tag::SET, &set).unwrap());
        assert_eq!(bytes, hex::decode("3109 0101FF 020101 020102".replace(' ', "")).unwrap());
    }

    #[test]
    fn implicit_tagging() {
        let mut inner = DerOutputStream::new();
        inner.put_octet_string(&[0xAB]);
        let bytes = encoded(|out| out.write_implicit(Tag::CTX_1, &inner));
        assert_eq!(bytes, vec![0x81, 0x01, 0xAB]);
    }

    #[test]
    fn times() {
        let time = Utc.with_ymd_and_hms(2024, 2, 29, 13, 5, 9).unwrap();
        assert_eq!(encoded(|out| out.put_utc_time(&time)), [&[0x17, 0x0D][..], b"240229130509Z"].concat());
        assert_eq!(
            encoded(|out| out.put_generalized_time(&time)),
            [&[0x18, 0x0F][..], b"20240229130509Z"].concat()
        );
    }

    #[test]
    fn strings() {
        assert_eq!(encoded(|out| out.put_printable_string("ab")), vec![0x13, 0x02, b'a', b'b']);
        assert_eq!(encoded(|out| out.put_t61_string("é")), vec![0x14, 0x01, 0xE9]);
        assert_eq!(encoded(|out| out.put_bmp_string("a")), vec![0x1E, 0x02, 0x00, b'a']);
        assert_eq!(encoded(|out| out.put_null()), vec![0x05, 0x00]);
        assert_eq!(encoded(|out| out.put_boolean(true)), vec![0x01, 0x01, 0xFF]);
    }
}
