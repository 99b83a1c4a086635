//! X.509 certificates and CRLs

mod attribute;
mod certificate;
mod crl;
mod info;
mod revocation;
mod verification;

pub use attribute::{
    AlgorithmIdField, AttributeError, AttributeValue, CertAttribute, CertInfoAttribute, KeyField, NameField,
    SerialNumberField, ValidityField, VersionField,
};
pub use certificate::{CertError, X509CertImpl};
pub use crl::{CrlError, X509CRLEntry, X509CRLImpl};
pub use info::X509CertInfo;
pub use revocation::{DirectRevocationIndex, IndirectRevocationIndex, IssuerSerial, RevocationIndex};
pub use verification::VerificationState;

use std::fmt::Write as _;

/// Sum of `data[i] * i` over signed bytes, skipping the first byte.
pub(crate) fn hash_code(data: &[u8]) -> i32 {
    data.iter()
        .enumerate()
        .skip(1)
        .fold(0i32, |acc, (i, byte)| acc.wrapping_add((*byte as i8 as i32).wrapping_mul(i as i32)))
}

/// Hex dump with a 4-digit offset and 16 bytes per line.
pub(crate) fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in data.chunks(16).enumerate() {
        if line > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:04X}:", line * 16);
        for byte in chunk {
            let _ = write!(out, " {byte:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hash_code_uses_signed_bytes() {
        assert_eq!(hash_code(&[0x30]), 0);
        assert_eq!(hash_code(&[0x30, 0x01, 0x02]), 1 + 2 * 2);
        assert_eq!(hash_code(&[0x00, 0xFF, 0x80]), -1 + 2 * -128);
    }

    #[test]
    fn hex_dump_lines() {
        let dump = hex_dump(&(0u8..18).collect::<Vec<_>>());
        assert_eq!(
            dump,
            "0000: 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F\n0010: 10 11"
        );
    }
}
