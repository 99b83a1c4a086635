//! `SubjectPublicKeyInfo` and typed access to the key it carries

use crate::algorithm_identifier::{AlgorithmId, AlgorithmParams};
use crate::oids;
use num_bigint_dig::BigInt;
use oid::ObjectIdentifier;
use pkix_asn1::BitArray;
use pkix_asn1_der::{Asn1DerError, DerEncode, DerOutputStream, DerValue, Tag};
use std::hash::{Hash, Hasher};

/// Key material of a `SubjectPublicKeyInfo`, decoded by algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// PKCS#1 `RSAPublicKey`
    Rsa { modulus: BigInt, public_exponent: BigInt },
    /// SEC1 encoded point on a named curve
    Ec { curve: ObjectIdentifier, point: Vec<u8> },
}

#[derive(Debug, thiserror::Error)]
pub enum PublicKeyError {
    #[error("unsupported key algorithm: {oid}")]
    UnsupportedAlgorithm { oid: String },
    #[error("EC key without a named curve")]
    MissingCurve,
    #[error("invalid key data: {0}")]
    InvalidKeyData(#[from] Asn1DerError),
}

/// ```not_rust
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///      algorithm            AlgorithmIdentifier,
///      subjectPublicKey     BIT STRING  }
/// ```
#[derive(Debug, Clone)]
pub struct SubjectPublicKeyInfo {
    algorithm: AlgorithmId,
    key: BitArray,
    encoded: Vec<u8>,
}

impl SubjectPublicKeyInfo {
    pub fn new(algorithm: AlgorithmId, key: BitArray) -> Result<Self, Asn1DerError> {
        let mut content = DerOutputStream::new();
        algorithm.encode(&mut content)?;
        content.put_unaligned_bit_string(&key);
        let mut out = DerOutputStream::new();
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(Self {
            algorithm,
            key,
            encoded: out.into_bytes(),
        })
    }

    pub fn new_rsa_key(modulus: &BigInt, public_exponent: &BigInt) -> Result<Self, Asn1DerError> {
        let mut content = DerOutputStream::new();
        content.put_big_integer(modulus);
        content.put_big_integer(public_exponent);
        let mut key = DerOutputStream::new();
        key.write_stream(Tag::SEQUENCE, &content);
        let key = key.into_bytes();

        Self::new(
            AlgorithmId::with_null_params(oids::rsa_encryption()),
            BitArray::from_bytes(key.len() * 8, &key)?,
        )
    }

    pub fn new_ec_key(curve: &ObjectIdentifier, point: &[u8]) -> Result<Self, Asn1DerError> {
        Self::new(
            AlgorithmId::with_params(oids::ec_public_key(), DerValue::from_oid(curve)?),
            BitArray::from_bytes(point.len() * 8, point)?,
        )
    }

    pub fn from_der(encoded: &[u8]) -> Result<Self, Asn1DerError> {
        Self::parse(&DerValue::from_der(encoded)?)
    }

    pub fn parse(value: &DerValue) -> Result<Self, Asn1DerError> {
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("X.509 key, not a sequence".to_owned()));
        }
        let mut data = value.data();
        let algorithm = AlgorithmId::parse(&data.get_der_value()?)?;
        let key = data.get_unaligned_bit_string()?;
        if data.available() != 0 {
            return Err(Asn1DerError::InvalidData("excess key data".to_owned()));
        }
        Ok(Self {
            algorithm,
            key,
            encoded: value.to_byte_array(),
        })
    }

    pub fn algorithm(&self) -> &AlgorithmId {
        &self.algorithm
    }

    /// `RSA`, `EC`, ... or the dotted OID.
    pub fn algorithm_name(&self) -> String {
        self.algorithm.name()
    }

    pub fn key_bits(&self) -> &BitArray {
        &self.key
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn decode(&self) -> Result<PublicKey, PublicKeyError> {
        match self.algorithm.oid_string().as_str() {
            oids::RSA_ENCRYPTION | oids::RSA => {
                let value = DerValue::from_der(self.key.as_bytes())?;
                if value.tag() != Tag::SEQUENCE {
                    return Err(Asn1DerError::InvalidData("RSAPublicKey, not a sequence".to_owned()).into());
                }
                let mut data = value.data();
                let modulus = data.get_positive_big_integer()?;
                let public_exponent = data.get_positive_big_integer()?;
                Ok(PublicKey::Rsa {
                    modulus,
                    public_exponent,
                })
            }
            oids::EC_PUBLIC_KEY => {
                let curve = match self.algorithm.params() {
                    AlgorithmParams::Value(value) if value.tag() == Tag::OID => value.get_oid()?,
                    _ => return Err(PublicKeyError::MissingCurve),
                };
                Ok(PublicKey::Ec {
                    curve,
                    point: self.key.to_byte_array(),
                })
            }
            other => Err(PublicKeyError::UnsupportedAlgorithm { oid: other.to_owned() }),
        }
    }
}

impl DerEncode for SubjectPublicKeyInfo {
    fn encode_der(&self, out: &mut DerOutputStream) -> pkix_asn1_der::Result<()> {
        out.write_raw(&self.encoded);
        Ok(())
    }
}

impl PartialEq for SubjectPublicKeyInfo {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for SubjectPublicKeyInfo {}

impl Hash for SubjectPublicKeyInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.encoded.hash(state);
    }
}
