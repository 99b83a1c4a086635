//! A stream-oriented ASN.1 DER codec.
//!
//! Input is read through [`DerInputStream`] / [`DerInputBuffer`] cursors into a tree of
//! [`DerValue`]s, each one holding an immutable view of its content bytes. Output is
//! assembled with [`DerOutputStream`].
//!
//! BER is only tolerated for indefinite-length constructed encodings, which are
//! rewritten to definite lengths by [`IndefiniteLengthConverter`] before decoding
//! proceeds.

#[macro_use]
mod debug_log;

mod charset;
mod indefinite_length;
mod input_buffer;
mod input_stream;
mod length;
mod object_identifier;
mod output_stream;
mod value;

pub use charset::is_printable_string_char;
pub use indefinite_length::{Conversion, IndefiniteLengthConverter};
pub use input_buffer::DerInputBuffer;
pub use input_stream::DerInputStream;
pub use length::Length;
pub use output_stream::{DerEncode, DerOutputStream};
pub use value::DerValue;

pub use pkix_asn1::{BitArray, ByteArrayLexOrder, Tag, TagClass};

use pkix_asn1::{BitArrayError, DateError};
use std::{error::Error, fmt};

/// A DER-related error
#[derive(Debug)]
pub enum Asn1DerError {
    /// Input ended before the announced content
    TruncatedData(&'static str),

    /// Unexpected identifier octet
    TagMismatch {
        context: &'static str,
        expected: Tag,
        actual: Tag,
    },

    /// Malformed or non-minimal length octets
    InvalidLength(String),

    /// Structurally invalid content
    InvalidData(String),

    /// Bytes left over after the last element of a SEQUENCE/SET
    TrailingData { remaining: usize },

    /// BER indefinite-length value missing its end-of-contents octets
    UnterminatedIndefiniteLength,

    /// End-of-contents octets without a matching indefinite-length header
    UnmatchedEndOfContents,

    /// Malformed OBJECT IDENTIFIER
    InvalidOid(String),

    /// String tag without a known character set
    UnsupportedStringType(Tag),

    /// Malformed BIT STRING
    BitString(BitArrayError),

    /// Malformed UTCTime or GeneralizedTime
    Time(DateError),
}

impl fmt::Display for Asn1DerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asn1DerError::TruncatedData(context) => write!(f, "truncated data: {}", context),
            Asn1DerError::TagMismatch {
                context,
                expected,
                actual,
            } => write!(f, "{}: expected {}, got {}", context, expected, actual),
            Asn1DerError::InvalidLength(msg) => write!(f, "invalid length: {}", msg),
            Asn1DerError::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Asn1DerError::TrailingData { remaining } => {
                write!(f, "Extra data at end of vector ({} bytes)", remaining)
            }
            Asn1DerError::UnterminatedIndefiniteLength => write!(f, "not all indef len BER resolved"),
            Asn1DerError::UnmatchedEndOfContents => {
                write!(f, "EOC does not have matching indefinite-length tag")
            }
            Asn1DerError::InvalidOid(msg) => write!(f, "invalid object identifier: {}", msg),
            Asn1DerError::UnsupportedStringType(tag) => write!(f, "Unsupported DER string type: {}", tag),
            Asn1DerError::BitString(e) => write!(f, "invalid bit string: {}", e),
            Asn1DerError::Time(e) => write!(f, "invalid time: {}", e),
        }
    }
}

impl Error for Asn1DerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Asn1DerError::BitString(e) => Some(e),
            Asn1DerError::Time(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitArrayError> for Asn1DerError {
    fn from(e: BitArrayError) -> Self {
        Asn1DerError::BitString(e)
    }
}

impl From<DateError> for Asn1DerError {
    fn from(e: DateError) -> Self {
        Asn1DerError::Time(e)
    }
}

impl Asn1DerError {
    pub(crate) fn tag_mismatch(context: &'static str, expected: Tag, actual: Tag) -> Self {
        Asn1DerError::TagMismatch {
            context,
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, Asn1DerError>;
