use crate::key::KeyError;
use pkix_asn1_x509::{oids, ObjectIdentifier};
use rand_core::CryptoRngCore;
use std::fmt;
use zeroize::Zeroizing;

// Points are always written uncompressed; several consumers reject compressed SEC1 points.
const COMPRESS_EC_POINT: bool = false;

/// Named curves supported for ECDSA.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EcCurve {
    /// NIST P-256 curve (secp256r1)
    NistP256,
    /// NIST P-384 curve (secp384r1)
    NistP384,
}

impl EcCurve {
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        match Into::<String>::into(oid).as_str() {
            oids::SECP256R1 => Some(Self::NistP256),
            oids::SECP384R1 => Some(Self::NistP384),
            _ => None,
        }
    }

    pub fn oid(self) -> ObjectIdentifier {
        match self {
            Self::NistP256 => oids::secp256r1(),
            Self::NistP384 => oids::secp384r1(),
        }
    }

    /// Size in bytes of a scalar or a point coordinate
    pub fn field_bytes_size(self) -> usize {
        match self {
            Self::NistP256 => 32,
            Self::NistP384 => 48,
        }
    }

    pub(crate) fn unsupported(oid: &ObjectIdentifier, context: &'static str) -> KeyError {
        KeyError::EC {
            context: format!(
                "EC curve with oid `{}` is not supported in context of {}",
                Into::<String>::into(oid),
                context
            ),
        }
    }

    /// SEC1 uncompressed point of the public key matching `secret`.
    pub(crate) fn public_point(self, secret: &[u8]) -> Result<Vec<u8>, KeyError> {
        if secret.len() != self.field_bytes_size() {
            return Err(KeyError::EC {
                context: format!(
                    "invalid secret size for {self}: expected {}, got {}",
                    self.field_bytes_size(),
                    secret.len()
                ),
            });
        }

        let invalid = |e: p256::elliptic_curve::Error| KeyError::EC {
            context: format!("invalid {self} secret: {e}"),
        };

        let point = match self {
            Self::NistP256 => {
                use p256::elliptic_curve::sec1::ToEncodedPoint;

                p256::SecretKey::from_slice(secret)
                    .map_err(invalid)?
                    .public_key()
                    .to_encoded_point(COMPRESS_EC_POINT)
                    .as_bytes()
                    .to_vec()
            }
            Self::NistP384 => {
                use p384::elliptic_curve::sec1::ToEncodedPoint;

                p384::SecretKey::from_slice(secret)
                    .map_err(invalid)?
                    .public_key()
                    .to_encoded_point(COMPRESS_EC_POINT)
                    .as_bytes()
                    .to_vec()
            }
        };

        Ok(point)
    }

    /// Random secret scalar and its public point.
    pub(crate) fn generate(self, rng: &mut impl CryptoRngCore) -> (Zeroizing<Vec<u8>>, Vec<u8>) {
        match self {
            Self::NistP256 => {
                use p256::elliptic_curve::sec1::ToEncodedPoint;

                let key = p256::SecretKey::random(rng);
                let secret = Zeroizing::new(key.to_bytes().to_vec());
                let point = key
                    .public_key()
                    .to_encoded_point(COMPRESS_EC_POINT)
                    .as_bytes()
                    .to_vec();
                (secret, point)
            }
            Self::NistP384 => {
                use p384::elliptic_curve::sec1::ToEncodedPoint;

                let key = p384::SecretKey::random(rng);
                let secret = Zeroizing::new(key.to_bytes().to_vec());
                let point = key
                    .public_key()
                    .to_encoded_point(COMPRESS_EC_POINT)
                    .as_bytes()
                    .to_vec();
                (secret, point)
            }
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NistP256 => f.write_str("P-256"),
            Self::NistP384 => f.write_str("P-384"),
        }
    }
}
