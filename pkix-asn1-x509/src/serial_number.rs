use num_bigint_dig::{BigInt, Sign};
use pkix_asn1_der::{Asn1DerError, DerEncode, DerOutputStream, DerValue, Result, Tag};
use std::fmt;

/// `CertificateSerialNumber ::= INTEGER`
///
/// RFC 5280 asks for positive serials, yet zero and negative serials exist in
/// the wild; [`SerialNumber::parse`] lets the caller decide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SerialNumber(BigInt);

impl SerialNumber {
    pub fn new(value: BigInt) -> Self {
        Self(value)
    }

    pub fn parse(value: &DerValue, lenient: bool) -> Result<Self> {
        if value.tag() != Tag::INTEGER {
            return Err(Asn1DerError::InvalidData("Invalid encoding for serial number".to_owned()));
        }
        let serial = value.get_big_integer()?;
        if !lenient && serial.sign() != Sign::Plus {
            return Err(Asn1DerError::InvalidData(format!(
                "serial number must be positive, got {serial}"
            )));
        }
        Ok(Self(serial))
    }

    pub fn value(&self) -> &BigInt {
        &self.0
    }

    /// Upper-case hexadecimal, `-` prefixed when negative.
    pub fn to_hex(&self) -> String {
        self.0.to_str_radix(16).to_uppercase()
    }
}

impl From<BigInt> for SerialNumber {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        Self(BigInt::from(value))
    }
}

impl DerEncode for SerialNumber {
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()> {
        out.put_big_integer(&self.0);
        Ok(())
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerialNumber: [{}]", self.to_hex())
    }
}
