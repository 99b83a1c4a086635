use crate::charset;
use crate::indefinite_length::IndefiniteLengthConverter;
use crate::length::Length;
use crate::object_identifier::{decode_oid, encode_oid};
use crate::output_stream::{DerEncode, DerOutputStream};
use crate::{Asn1DerError, DerInputBuffer, DerInputStream, Result};
use chrono::{DateTime, Utc};
use num_bigint_dig::BigInt;
use oid::ObjectIdentifier;
use pkix_asn1::{BitArray, Tag, TagClass};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single decoded TLV.
///
/// The content bytes are immutable and shared with the buffer the value was
/// parsed from, so cloning and comparing never copy nor lock. Getters work on
/// a fresh cursor and can be called any number of times.
#[derive(Clone)]
pub struct DerValue {
    tag: Tag,
    content: DerInputBuffer,
}

impl DerValue {
    /// Wraps already encoded `content` under `tag`.
    pub fn new(tag: Tag, content: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            content: DerInputBuffer::new(content.into()),
        }
    }

    /// PrintableString when every char allows it, otherwise UTF8String
    pub fn from_string(value: &str) -> Self {
        let tag = if value.chars().all(charset::is_printable_string_char) {
            Tag::PRINTABLE_STRING
        } else {
            Tag::UTF8_STRING
        };
        Self::new(tag, value.as_bytes())
    }

    pub fn new_string(tag: Tag, value: &str) -> Result<Self> {
        let content = match tag {
            Tag::PRINTABLE_STRING | Tag::IA5_STRING | Tag::GENERAL_STRING => charset::encode_ascii(value),
            Tag::T61_STRING => charset::encode_latin1(value),
            Tag::BMP_STRING => charset::encode_bmp(value),
            Tag::UTF8_STRING => value.as_bytes().to_vec(),
            _ => return Err(Asn1DerError::UnsupportedStringType(tag)),
        };
        Ok(Self::new(tag, content))
    }

    /// Decodes the first value of `encoding`; trailing bytes are ignored.
    pub fn from_der(encoding: &[u8]) -> Result<Self> {
        let mut buffer = DerInputBuffer::new(encoding.to_vec());
        Self::parse(&mut buffer)
    }

    /// Reads one TLV from `buffer`, converting BER indefinite lengths.
    pub fn parse(buffer: &mut DerInputBuffer) -> Result<Self> {
        let tag = Tag::from(buffer.read()?);
        let first = buffer.read()?;

        match Length::read(first, buffer)? {
            Length::Definite(len) => {
                if len > buffer.available() {
                    return Err(Asn1DerError::TruncatedData("short read of DER value"));
                }
                let mut content = buffer.dup();
                content.truncate(len)?;
                buffer.skip(len)?;

                debug_log!("{} ({} bytes)", tag, len);

                Ok(Self { tag, content })
            }
            Length::Indefinite => {
                if !tag.is_constructed() {
                    return Err(Asn1DerError::InvalidLength(format!(
                        "Indefinite length encoding not supported for primitive {}",
                        tag
                    )));
                }

                let mut ber = Vec::with_capacity(buffer.available() + 2);
                ber.push(tag.inner());
                ber.push(first);
                ber.extend_from_slice(buffer.as_slice());

                let conversion = IndefiniteLengthConverter::new().convert(&ber)?;
                buffer.skip(conversion.consumed - 2)?;

                let mut converted = DerInputBuffer::new(conversion.der);
                Self::parse(&mut converted)
            }
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Content length in bytes
    pub fn length(&self) -> usize {
        self.content.available()
    }

    /// A fresh stream over the content
    pub fn data(&self) -> DerInputStream {
        DerInputStream::from_buffer(self.content.dup())
    }

    pub fn create_tag(class: TagClass, constructed: bool, number: u8) -> Tag {
        Tag::create(class, constructed, number)
    }

    /// Replaces the identifier octet, typically to undo an implicit tag.
    pub fn reset_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    pub fn is_universal(&self) -> bool {
        self.tag.is_universal()
    }

    pub fn is_application(&self) -> bool {
        self.tag.is_application()
    }

    pub fn is_context_specific(&self) -> bool {
        self.tag.is_context_specific()
    }

    pub fn is_context_specific_tag(&self, number: u8) -> bool {
        self.tag.is_context_specific() && self.tag.number() == number
    }

    pub fn is_private(&self) -> bool {
        self.tag.is_private()
    }

    pub fn is_constructed(&self) -> bool {
        self.tag.is_constructed()
    }

    pub fn is_constructed_tag(&self, number: u8) -> bool {
        self.tag.is_constructed() && self.tag.number() == number
    }

    fn check_tag(&self, expected: Tag, context: &'static str) -> Result<()> {
        if self.tag != expected {
            return Err(Asn1DerError::tag_mismatch(context, expected, self.tag));
        }
        Ok(())
    }

    pub fn get_boolean(&self) -> Result<bool> {
        self.check_tag(Tag::BOOLEAN, "DerValue.getBoolean, not a BOOLEAN")?;
        if self.length() != 1 {
            return Err(Asn1DerError::InvalidLength(format!(
                "DerValue.getBoolean, invalid length {}",
                self.length()
            )));
        }
        Ok(self.content.as_slice()[0] != 0)
    }

    pub fn get_integer(&self) -> Result<i32> {
        self.check_tag(Tag::INTEGER, "DerValue.getInteger, not an int")?;
        self.content.dup().get_integer(self.length())
    }

    pub fn get_big_integer(&self) -> Result<BigInt> {
        self.check_tag(Tag::INTEGER, "DerValue.getBigInteger, not an int")?;
        self.content.dup().get_big_integer(self.length(), false)
    }

    pub fn get_positive_big_integer(&self) -> Result<BigInt> {
        self.check_tag(Tag::INTEGER, "DerValue.getBigInteger, not an int")?;
        self.content.dup().get_big_integer(self.length(), true)
    }

    pub fn get_enumerated(&self) -> Result<i32> {
        self.check_tag(Tag::ENUMERATED, "DerValue.getEnumerated, incorrect tag")?;
        self.content.dup().get_integer(self.length())
    }

    pub fn get_bit_string(&self) -> Result<Vec<u8>> {
        self.check_tag(Tag::BIT_STRING, "DerValue.getBitString, not a bit string")?;
        self.content.dup().get_bit_string(self.length())
    }

    pub fn get_unaligned_bit_string(&self) -> Result<BitArray> {
        self.get_unaligned_bit_string_implicit(false)
    }

    /// With `tag_implicit` the identifier octet is not checked.
    pub fn get_unaligned_bit_string_implicit(&self, tag_implicit: bool) -> Result<BitArray> {
        if !tag_implicit {
            self.check_tag(Tag::BIT_STRING, "DerValue.getBitString, not a bit string")?;
        }
        self.content.dup().get_unaligned_bit_string()
    }

    /// OCTET STRING content; constructed encodings are concatenated.
    pub fn get_octet_string(&self) -> Result<Vec<u8>> {
        if self.tag != Tag::OCTET_STRING && self.tag != Tag::OCTET_STRING.constructed() {
            return Err(Asn1DerError::tag_mismatch(
                "DerValue.getOctetString, not an Octet String",
                Tag::OCTET_STRING,
                self.tag,
            ));
        }

        if !self.tag.is_constructed() {
            return Ok(self.content.to_byte_array());
        }

        let mut segments = self.data();
        let mut bytes = Vec::new();
        while segments.available() != 0 {
            bytes.extend(segments.get_octet_string()?);
        }
        Ok(bytes)
    }

    /// Raw content, whatever the tag
    pub fn get_data_bytes(&self) -> Vec<u8> {
        self.content.to_byte_array()
    }

    pub fn content(&self) -> &[u8] {
        self.content.as_slice()
    }

    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        Ok(Self::new(Tag::OID, encode_oid(oid)?))
    }

    pub fn get_oid(&self) -> Result<ObjectIdentifier> {
        self.check_tag(Tag::OID, "DerValue.getOID, not an OID")?;
        decode_oid(self.content.as_slice())
    }

    /// Decoded text of any string type, `None` for other tags
    pub fn get_as_string(&self) -> Option<String> {
        let bytes = self.content.as_slice();
        match self.tag {
            Tag::UTF8_STRING => Some(charset::decode_utf8(bytes)),
            Tag::PRINTABLE_STRING | Tag::IA5_STRING | Tag::GENERAL_STRING => Some(charset::decode_ascii(bytes)),
            Tag::T61_STRING => Some(charset::decode_latin1(bytes)),
            Tag::BMP_STRING => Some(charset::decode_bmp(bytes)),
            _ => None,
        }
    }

    pub fn get_printable_string(&self) -> Result<String> {
        self.check_tag(Tag::PRINTABLE_STRING, "DerValue.getPrintableString, not a string")?;
        Ok(charset::decode_ascii(self.content.as_slice()))
    }

    pub fn get_t61_string(&self) -> Result<String> {
        self.check_tag(Tag::T61_STRING, "DerValue.getT61String, not T61")?;
        Ok(charset::decode_latin1(self.content.as_slice()))
    }

    pub fn get_ia5_string(&self) -> Result<String> {
        self.check_tag(Tag::IA5_STRING, "DerValue.getIA5String, not IA5")?;
        Ok(charset::decode_ascii(self.content.as_slice()))
    }

    pub fn get_bmp_string(&self) -> Result<String> {
        self.check_tag(Tag::BMP_STRING, "DerValue.getBMPString, not BMP")?;
        Ok(charset::decode_bmp(self.content.as_slice()))
    }

    pub fn get_utf8_string(&self) -> Result<String> {
        self.check_tag(Tag::UTF8_STRING, "DerValue.getUTF8String, not UTF-8")?;
        Ok(charset::decode_utf8(self.content.as_slice()))
    }

    pub fn get_general_string(&self) -> Result<String> {
        self.check_tag(Tag::GENERAL_STRING, "DerValue.getGeneralString, not GeneralString")?;
        Ok(charset::decode_ascii(self.content.as_slice()))
    }

    pub fn get_utc_time(&self) -> Result<DateTime<Utc>> {
        self.check_tag(Tag::UTC_TIME, "DerValue.getUTCTime, not a UtcTime")?;
        self.content.dup().get_utc_time(self.length())
    }

    pub fn get_generalized_time(&self) -> Result<DateTime<Utc>> {
        self.check_tag(Tag::GENERALIZED_TIME, "DerValue.getGeneralizedTime, not a GeneralizedTime")?;
        self.content.dup().get_generalized_time(self.length())
    }

    /// Complete TLV encoding
    pub fn to_byte_array(&self) -> Vec<u8> {
        let mut out = DerOutputStream::new();
        self.encode(&mut out);
        out.to_byte_array()
    }

    pub fn encode(&self, out: &mut DerOutputStream) {
        out.write(self.tag, self.content.as_slice());
    }
}

impl DerEncode for DerValue {
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()> {
        self.encode(out);
        Ok(())
    }
}

impl PartialEq for DerValue {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.content.as_slice() == other.content.as_slice()
    }
}

impl Eq for DerValue {}

impl Hash for DerValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        self.content.as_slice().hash(state);
    }
}

impl fmt::Display for DerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.get_as_string() {
            return write!(f, "\"{}\"", text);
        }
        match self.tag {
            Tag::NULL => write!(f, "[DerValue, null]"),
            Tag::OID => match self.get_oid() {
                Ok(oid) => write!(f, "OID.{}", Into::<String>::into(&oid)),
                Err(_) => write!(f, "[DerValue, tag = {}, length = {}]", self.tag.inner(), self.length()),
            },
            _ => write!(f, "[DerValue, tag = {}, length = {}]", self.tag.inner(), self.length()),
        }
    }
}

impl fmt::Debug for DerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerValue")
            .field("tag", &self.tag)
            .field("content", &self.content.as_slice())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn string_type_selection() {
        assert_eq!(DerValue::from_string("Example CA").tag(), Tag::PRINTABLE_STRING);
        assert_eq!(DerValue::from_string("root@example.com").tag(), Tag::UTF8_STRING);
        assert_eq!(DerValue::from_string("Zürich").tag(), Tag::UTF8_STRING);
    }

    #[test]
    fn new_string_rejects_non_string_tags() {
        assert!(matches!(
            DerValue::new_string(Tag::INTEGER, "1"),
            Err(Asn1DerError::UnsupportedStringType(Tag::INTEGER))
        ));
        let bmp = DerValue::new_string(Tag::BMP_STRING, "ab").unwrap();
        assert_eq!(bmp.content(), &[0x00, 0x61, 0x00, 0x62]);
        assert_eq!(bmp.get_bmp_string().unwrap(), "ab");
    }

    #[test]
    fn getters_do_not_consume() {
        let value = DerValue::from_der(&[0x02, 0x02, 0x01, 0x00]).unwrap();
        assert_eq!(value.get_integer().unwrap(), 256);
        assert_eq!(value.get_integer().unwrap(), 256);
        assert_eq!(value.length(), 2);
    }

    #[test]
    fn boolean_checks() {
        assert_eq!(DerValue::from_der(&[0x01, 0x01, 0xFF]).unwrap().get_boolean().unwrap(), true);
        assert!(DerValue::from_der(&[0x01, 0x02, 0xFF, 0xFF]).unwrap().get_boolean().is_err());
        assert!(DerValue::from_der(&[0x02, 0x01, 0x01]).unwrap().get_boolean().is_err());
    }

    #[test]
    fn constructed_octet_string() {
        let value = DerValue::from_der(&hex::decode("240C040361626304036465660400").unwrap()).unwrap();
        assert_eq!(value.get_octet_string().unwrap(), b"abcdef".to_vec());
    }

    #[test]
    fn indefinite_value_advances_cursor() {
        let mut buffer = DerInputBuffer::new(hex::decode("3080020101000005000101FF").unwrap());
        let sequence = DerValue::parse(&mut buffer).unwrap();
        assert_eq!(sequence.to_byte_array(), vec![0x30, 0x03, 0x02, 0x01, 0x01]);
        assert_eq!(DerValue::parse(&mut buffer).unwrap().tag(), Tag::NULL);
        assert_eq!(DerValue::parse(&mut buffer).unwrap().tag(), Tag::BOOLEAN);
        assert_eq!(buffer.available(), 0);
    }

    #[test]
    fn indefinite_primitive_is_rejected() {
        assert!(DerValue::from_der(&[0x04, 0x80, 0x00, 0x00]).is_err());
    }

    #[test]
    fn display_forms() {
        assert_eq!(DerValue::from_string("abc").to_string(), "\"abc\"");
        assert_eq!(DerValue::new(Tag::NULL, Vec::new()).to_string(), "[DerValue, null]");
        assert_eq!(DerValue::new(Tag::OID, vec![0x2A, 0x03]).to_string(), "OID.1.2.3");
        assert_eq!(
            DerValue::new(Tag::SEQUENCE, vec![0x05, 0x00]).to_string(),
            "[DerValue, tag = 48, length = 2]"
        );
    }

    #[test]
    fn equality_is_tag_and_content() {
        let a = DerValue::new(Tag::OCTET_STRING, vec![1, 2, 3]);
        let b = DerValue::from_der(&[0x04, 0x03, 1, 2, 3, 0xFF]).unwrap();
        let c = DerValue::new(Tag::BIT_STRING, vec![1, 2, 3]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn tag_helpers() {
        let mut value = DerValue::new(Tag::CTX_CONSTRUCTED_3, Vec::new());
        assert!(value.is_context_specific());
        assert!(value.is_context_specific_tag(3));
        assert!(value.is_constructed_tag(3));
        assert!(!value.is_universal());
        value.reset_tag(Tag::SEQUENCE);
        assert!(value.is_universal());
        assert!(value.is_constructed_tag(16));
        assert_eq!(
            DerValue::create_tag(TagClass::Application, false, 5),
            Tag::application(5)
        );
    }
}
