use pkix_asn1::BitArray;
use pkix_asn1_der::{DerOutputStream, DerValue, Result, Tag};

/// `UniqueIdentifier ::= BIT STRING`, carried as `[1] IMPLICIT` (issuer) or
/// `[2] IMPLICIT` (subject) in v2 and v3 certificates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueIdentity(BitArray);

impl UniqueIdentity {
    pub fn new(id: BitArray) -> Self {
        Self(id)
    }

    pub fn from_bytes(id: &[u8]) -> Self {
        Self(BitArray::from_bools(
            &id.iter()
                .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
                .collect::<Vec<_>>(),
        ))
    }

    pub fn parse_implicit(value: &DerValue) -> Result<Self> {
        Ok(Self(value.get_unaligned_bit_string_implicit(true)?))
    }

    pub fn id(&self) -> &BitArray {
        &self.0
    }

    pub fn to_boolean_array(&self) -> Vec<bool> {
        self.0.to_boolean_array()
    }

    pub fn encode_implicit(&self, out: &mut DerOutputStream, number: u8) {
        let mut bits = DerOutputStream::new();
        bits.put_unaligned_bit_string(&self.0);
        out.write_implicit(Tag::context_specific(number), &bits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn implicit_round_trip() {
        let id = UniqueIdentity::from_bytes(&[0xCA, 0xFE]);
        let mut out = DerOutputStream::new();
        id.encode_implicit(&mut out, 2);
        let bytes = out.into_bytes();
        assert_eq!(bytes, vec![0x82, 0x03, 0x00, 0xCA, 0xFE]);

        let parsed = UniqueIdentity::parse_implicit(&DerValue::from_der(&bytes).unwrap()).unwrap();
        assert_eq!(parsed, id);
    }
}
