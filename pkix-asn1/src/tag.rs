use std::fmt;

/// Class bits of an identifier octet
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    #[inline]
    pub const fn bits(self) -> u8 {
        match self {
            TagClass::Universal => Tag::CLASS_UNIVERSAL,
            TagClass::Application => Tag::CLASS_APPLICATION,
            TagClass::ContextSpecific => Tag::CLASS_CONTEXT,
            TagClass::Private => Tag::CLASS_PRIVATE,
        }
    }
}

/// Single-octet ASN.1 identifier (class, constructed bit and tag number).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tag(u8);

impl Tag {
    pub const CLASS_UNIVERSAL: u8 = 0x00;
    pub const CLASS_APPLICATION: u8 = 0x40;
    pub const CLASS_CONTEXT: u8 = 0x80;
    pub const CLASS_PRIVATE: u8 = 0xC0;
    pub const CLASS_MASK: u8 = 0xC0;
    pub const FORM_CONSTRUCTED: u8 = 0x20;
    pub const NUMBER_MASK: u8 = 0x1F;

    pub const BOOLEAN: Self = Tag(0x01);
    pub const INTEGER: Self = Tag(0x02);
    pub const BIT_STRING: Self = Tag(0x03);
    pub const OCTET_STRING: Self = Tag(0x04);
    pub const NULL: Self = Tag(0x05);
    pub const OID: Self = Tag(0x06);
    pub const ENUMERATED: Self = Tag(0x0A);
    pub const UTF8_STRING: Self = Tag(0x0C);
    pub const PRINTABLE_STRING: Self = Tag(0x13);
    pub const T61_STRING: Self = Tag(0x14);
    pub const IA5_STRING: Self = Tag(0x16);
    pub const UTC_TIME: Self = Tag(0x17);
    pub const GENERALIZED_TIME: Self = Tag(0x18);
    pub const GENERAL_STRING: Self = Tag(0x1B);
    pub const UNIVERSAL_STRING: Self = Tag(0x1C);
    pub const BMP_STRING: Self = Tag(0x1E);
    pub const SEQUENCE: Self = Tag(0x30);
    pub const SET: Self = Tag(0x31);
    pub const CTX_0: Self = Tag::context_specific(0);
    pub const CTX_1: Self = Tag::context_specific(1);
    pub const CTX_2: Self = Tag::context_specific(2);
    pub const CTX_3: Self = Tag::context_specific(3);
    pub const CTX_CONSTRUCTED_0: Self = Tag::context_specific_constructed(0);
    pub const CTX_CONSTRUCTED_1: Self = Tag::context_specific_constructed(1);
    pub const CTX_CONSTRUCTED_2: Self = Tag::context_specific_constructed(2);
    pub const CTX_CONSTRUCTED_3: Self = Tag::context_specific_constructed(3);

    /// Builds an identifier octet out of its three components.
    ///
    /// `number` is expected to fit in the low five bits (no high tag number form).
    #[inline]
    pub const fn create(class: TagClass, constructed: bool, number: u8) -> Self {
        let mut tag = class.bits() | (number & Self::NUMBER_MASK);
        if constructed {
            tag |= Self::FORM_CONSTRUCTED;
        }
        Tag(tag)
    }

    #[inline]
    pub const fn application(number: u8) -> Self {
        Self::create(TagClass::Application, false, number)
    }

    #[inline]
    pub const fn context_specific(number: u8) -> Self {
        Self::create(TagClass::ContextSpecific, false, number)
    }

    #[inline]
    pub const fn context_specific_constructed(number: u8) -> Self {
        Self::create(TagClass::ContextSpecific, true, number)
    }

    /// Raw identifier octet
    #[inline]
    pub const fn inner(self) -> u8 {
        self.0
    }

    /// Tag number (low five bits)
    #[inline]
    pub const fn number(self) -> u8 {
        self.0 & Self::NUMBER_MASK
    }

    #[inline]
    pub const fn class(self) -> TagClass {
        match self.0 & Self::CLASS_MASK {
            Self::CLASS_UNIVERSAL => TagClass::Universal,
            Self::CLASS_APPLICATION => TagClass::Application,
            Self::CLASS_CONTEXT => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    #[inline]
    pub const fn is_universal(self) -> bool {
        self.0 & Self::CLASS_MASK == Self::CLASS_UNIVERSAL
    }

    #[inline]
    pub const fn is_application(self) -> bool {
        self.0 & Self::CLASS_MASK == Self::CLASS_APPLICATION
    }

    #[inline]
    pub const fn is_context_specific(self) -> bool {
        self.0 & Self::CLASS_MASK == Self::CLASS_CONTEXT
    }

    #[inline]
    pub const fn is_private(self) -> bool {
        self.0 & Self::CLASS_MASK == Self::CLASS_PRIVATE
    }

    #[inline]
    pub const fn is_constructed(self) -> bool {
        self.0 & Self::FORM_CONSTRUCTED == Self::FORM_CONSTRUCTED
    }

    /// Same tag with the constructed bit set.
    #[inline]
    pub const fn constructed(self) -> Self {
        Tag(self.0 | Self::FORM_CONSTRUCTED)
    }

    /// End-of-contents marker (`00`) used by BER indefinite lengths.
    #[inline]
    pub const fn is_end_of_contents(self) -> bool {
        self.0 == 0
    }

    /// Tag types carrying character strings
    pub const fn is_string(self) -> bool {
        matches!(
            self,
            Tag::UTF8_STRING
                | Tag::PRINTABLE_STRING
                | Tag::T61_STRING
                | Tag::IA5_STRING
                | Tag::GENERAL_STRING
                | Tag::BMP_STRING
        )
    }
}

impl From<u8> for Tag {
    fn from(tag: u8) -> Self {
        Self(tag)
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::T61_STRING => write!(f, "TeletexString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            Tag::GENERAL_STRING => write!(f, "GeneralString"),
            Tag::UNIVERSAL_STRING => write!(f, "UniversalString"),
            Tag::BMP_STRING => write!(f, "BMPString"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            other => match other.class() {
                TagClass::ContextSpecific if other.is_constructed() => write!(f, "[{}] CONSTRUCTED", other.number()),
                TagClass::ContextSpecific => write!(f, "[{}]", other.number()),
                TagClass::Application => write!(f, "ApplicationTag{}", other.number()),
                TagClass::Private => write!(f, "PrivateTag{}", other.number()),
                TagClass::Universal => write!(f, "UNKNOWN({})", other.0),
            },
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({}[{:02X}])", self, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_combines_class_form_and_number() {
        assert_eq!(Tag::create(TagClass::ContextSpecific, true, 3), Tag::from(0xA3));
        assert_eq!(Tag::create(TagClass::Universal, true, 0x10), Tag::SEQUENCE);
        assert_eq!(Tag::create(TagClass::Application, false, 1), Tag::from(0x41));
        assert_eq!(Tag::create(TagClass::Private, false, 0), Tag::from(0xC0));
    }

    #[test]
    fn class_predicates() {
        let tag = Tag::from(0xA0);
        assert!(tag.is_context_specific());
        assert!(tag.is_constructed());
        assert!(!tag.is_universal());
        assert_eq!(tag.number(), 0);

        assert!(Tag::SEQUENCE.is_universal());
        assert!(Tag::SEQUENCE.is_constructed());
        assert!(Tag::from(0x61).is_application());
        assert!(Tag::from(0xC5).is_private());
        assert!(!Tag::INTEGER.is_constructed());
    }

    #[test]
    fn display() {
        assert_eq!(Tag::BIT_STRING.to_string(), "BIT STRING");
        assert_eq!(Tag::CTX_CONSTRUCTED_3.to_string(), "[3] CONSTRUCTED");
        assert_eq!(Tag::CTX_1.to_string(), "[1]");
        assert_eq!(format!("{:?}", Tag::SET), "Tag(SET[31])");
    }
}
