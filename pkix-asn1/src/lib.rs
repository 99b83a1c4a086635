//! ASN.1 leaf types shared by the pkix crates.
//!
//! This crate knows nothing about tag/length/value framing: see `pkix-asn1-der`
//! for the codec.

pub mod bit_array;
pub mod date;
pub mod lex_order;
pub mod tag;

pub use bit_array::{BitArray, BitArrayError};
pub use date::{Date, DateError, GeneralizedTime, GeneralizedTimeRepr, TimeRepr, UTCTime, UTCTimeRepr};
pub use lex_order::ByteArrayLexOrder;
pub use tag::{Tag, TagClass};
