use pkix_asn1_der::{Asn1DerError, DerEncode, DerOutputStream, DerValue, Result, Tag};
use std::fmt;

/// `Version ::= INTEGER { v1(0), v2(1), v3(2) }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CertificateVersion {
    #[default]
    V1 = 0,
    V2 = 1,
    V3 = 2,
}

impl CertificateVersion {
    pub const IDENT: &'static str = "x509.info.version";
    pub const NAME: &'static str = "version";
    pub const VERSION: &'static str = "number";

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::V1),
            1 => Some(Self::V2),
            2 => Some(Self::V3),
            _ => None,
        }
    }

    /// Encoded value: 0 for v1.
    pub fn value(self) -> i32 {
        self as i32
    }

    /// Human numbering: 1 for v1.
    pub fn number(self) -> i32 {
        self.value() + 1
    }

    /// Reads the `[0] EXPLICIT Version` field of a `TBSCertificate`.
    pub fn parse_explicit(value: &DerValue) -> Result<Self> {
        if !value.is_context_specific_tag(0) || !value.is_constructed() {
            return Err(Asn1DerError::InvalidData("X.509 version, bad format".to_owned()));
        }
        let mut data = value.data();
        let version = data.get_integer()?;
        if data.available() != 0 {
            return Err(Asn1DerError::InvalidData("X.509 version, bad format".to_owned()));
        }
        Self::from_value(version).ok_or_else(|| Asn1DerError::InvalidData("Invalid version".to_owned()))
    }
}

impl DerEncode for CertificateVersion {
    /// v1 is the DEFAULT and is not written.
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()> {
        if *self == Self::V1 {
            return Ok(());
        }
        let mut inner = DerOutputStream::new();
        inner.put_integer(self.value());
        out.write_stream(Tag::CTX_CONSTRUCTED_0, &inner);
        Ok(())
    }
}

impl fmt::Display for CertificateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version: V{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_tag_round_trip() {
        let mut out = DerOutputStream::new();
        CertificateVersion::V3.encode_der(&mut out).unwrap();
        let bytes = out.into_bytes();
        assert_eq!(bytes, vec![0xA0, 0x03, 0x02, 0x01, 0x02]);
        let value = DerValue::from_der(&bytes).unwrap();
        assert_eq!(CertificateVersion::parse_explicit(&value).unwrap(), CertificateVersion::V3);
    }

    #[test]
    fn v1_is_omitted() {
        let mut out = DerOutputStream::new();
        CertificateVersion::V1.encode_der(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn out_of_range() {
        let value = DerValue::from_der(&[0xA0, 0x03, 0x02, 0x01, 0x05]).unwrap();
        assert_eq!(
            CertificateVersion::parse_explicit(&value).unwrap_err().to_string(),
            "invalid data: Invalid version"
        );
        let value = DerValue::from_der(&[0xA1, 0x03, 0x02, 0x01, 0x02]).unwrap();
        assert_eq!(
            CertificateVersion::parse_explicit(&value).unwrap_err().to_string(),
            "invalid data: X.509 version, bad format"
        );
    }

    #[test]
    fn numbering() {
        assert_eq!(CertificateVersion::V2.value(), 1);
        assert_eq!(CertificateVersion::V2.number(), 2);
        assert_eq!(CertificateVersion::V3.to_string(), "Version: V3");
    }
}
