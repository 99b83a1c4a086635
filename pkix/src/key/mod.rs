//! Signing and verification keys: PKCS#8, PKCS#1 and SEC1 private keys,
//! `SubjectPublicKeyInfo` public keys.

mod ec;

pub use ec::EcCurve;

use crate::pem::{parse_pem, Pem, PemError};
use num_bigint_dig::{BigInt, Sign};
use pkix_asn1_der::{Asn1DerError, DerOutputStream, DerValue, Tag};
use pkix_asn1_x509::{
    oids, AlgorithmId, AlgorithmParams, ObjectIdentifier, PublicKey as PublicKeyData, PublicKeyError, SubjectPublicKeyInfo,
};
use rand_core::CryptoRngCore;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum KeyError {
    /// ASN1 serialization error
    #[error("(ASN1) couldn't serialize {element}: {source}")]
    Asn1Serialization {
        element: &'static str,
        source: Asn1DerError,
    },

    /// ASN1 deserialization error
    #[error("(ASN1) couldn't deserialize {element}: {source}")]
    Asn1Deserialization {
        element: &'static str,
        source: Asn1DerError,
    },

    /// RSA error
    #[error("RSA error: {context}")]
    Rsa { context: String },

    /// EC error
    #[error("EC error: {context}")]
    EC { context: String },

    /// invalid PEM label error
    #[error("invalid PEM label: {label}")]
    InvalidPemLabel { label: String },

    /// unsupported algorithm
    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    /// invalid PEM provided
    #[error("invalid PEM provided: {source}")]
    Pem { source: PemError },

    /// undecodable subject public key
    #[error("invalid subject public key: {source}")]
    PublicKey { source: PublicKeyError },
}

impl From<rsa::errors::Error> for KeyError {
    fn from(e: rsa::errors::Error) -> Self {
        Self::Rsa { context: e.to_string() }
    }
}

impl From<PemError> for KeyError {
    fn from(e: PemError) -> Self {
        Self::Pem { source: e }
    }
}

impl From<PublicKeyError> for KeyError {
    fn from(e: PublicKeyError) -> Self {
        Self::PublicKey { source: e }
    }
}

pub(crate) fn to_biguint(value: &BigInt) -> BigUint {
    BigUint::from_bytes_be(&value.to_bytes_be().1)
}

fn to_bigint(value: &BigUint) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_bytes_be())
}

// === private key === //

const PRIVATE_KEY_PEM_LABEL: &str = "PRIVATE KEY";
const RSA_PRIVATE_KEY_PEM_LABEL: &str = "RSA PRIVATE KEY";
const EC_PRIVATE_KEY_LABEL: &str = "EC PRIVATE KEY";

#[derive(Clone)]
pub(crate) enum PrivateKeyKind {
    Rsa(Box<RsaPrivateKey>),
    Ec {
        curve: EcCurve,
        secret: Zeroizing<Vec<u8>>,
        point: Vec<u8>,
    },
}

#[derive(Clone)]
pub struct PrivateKey {
    /// Inner key details. This should never be publicly exposed.
    kind: PrivateKeyKind,
    /// PKCS#8 encoding
    pkcs8: Zeroizing<Vec<u8>>,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PrivateKeyKind::Rsa(_) => f.debug_struct("PrivateKey").field("algorithm", &"RSA").finish_non_exhaustive(),
            PrivateKeyKind::Ec { curve, .. } => f
                .debug_struct("PrivateKey")
                .field("algorithm", &"EC")
                .field("curve", curve)
                .finish_non_exhaustive(),
        }
    }
}

impl TryFrom<&'_ PrivateKey> for RsaPrivateKey {
    type Error = KeyError;

    fn try_from(v: &PrivateKey) -> Result<Self, Self::Error> {
        match &v.kind {
            PrivateKeyKind::Rsa(key) => Ok(key.as_ref().clone()),
            PrivateKeyKind::Ec { .. } => Err(KeyError::Rsa {
                context: "RSA private key cannot be constructed from non-RSA private key.".to_owned(),
            }),
        }
    }
}

impl PrivateKey {
    pub fn from_pem(pem: &Pem) -> Result<Self, KeyError> {
        match pem.label() {
            PRIVATE_KEY_PEM_LABEL => Self::from_pkcs8(pem.data()),
            RSA_PRIVATE_KEY_PEM_LABEL => Self::from_rsa_der(pem.data()),
            EC_PRIVATE_KEY_LABEL => Self::from_ec_der(pem.data()),
            _ => Err(KeyError::InvalidPemLabel {
                label: pem.label().to_owned(),
            }),
        }
    }

    pub fn from_pem_str(pem_str: &str) -> Result<Self, KeyError> {
        let pem = parse_pem(pem_str)?;
        Self::from_pem(&pem)
    }

    pub fn from_pkcs8<T: ?Sized + AsRef<[u8]>>(pkcs8: &T) -> Result<Self, KeyError> {
        let pkcs8 = pkcs8.as_ref();
        let (algorithm, private_key) =
            read_private_key_info(pkcs8).map_err(|source| KeyError::Asn1Deserialization {
                element: "private key info (pkcs8)",
                source,
            })?;

        let kind = match algorithm.oid_string().as_str() {
            oids::RSA_ENCRYPTION => PrivateKeyKind::Rsa(Box::new(rsa_private_key_from_der(&private_key)?)),
            oids::EC_PUBLIC_KEY => {
                let curve_oid = match algorithm.params() {
                    AlgorithmParams::Value(value) if value.tag() == Tag::OID => {
                        value.get_oid().map_err(|source| KeyError::Asn1Deserialization {
                            element: "ec parameters",
                            source,
                        })?
                    }
                    _ => {
                        return Err(KeyError::EC {
                            context: "Specified private key parameters are not EC parameters".to_owned(),
                        })
                    }
                };
                let curve =
                    EcCurve::from_oid(&curve_oid).ok_or_else(|| EcCurve::unsupported(&curve_oid, "private key"))?;
                let (secret, _) = read_ec_private_key(&private_key)?;
                let point = curve.public_point(&secret)?;
                PrivateKeyKind::Ec { curve, secret, point }
            }
            _ => {
                return Err(KeyError::UnsupportedAlgorithm {
                    algorithm: algorithm.name(),
                })
            }
        };

        Ok(Self {
            kind,
            pkcs8: Zeroizing::new(pkcs8.to_vec()),
        })
    }

    /// PKCS#1 `RSAPrivateKey`
    pub fn from_rsa_der<T: ?Sized + AsRef<[u8]>>(der: &T) -> Result<Self, KeyError> {
        let key = rsa_private_key_from_der(der.as_ref())?;
        let pkcs8 = write_private_key_info(&AlgorithmId::with_null_params(oids::rsa_encryption()), der.as_ref())?;
        Ok(Self {
            kind: PrivateKeyKind::Rsa(Box::new(key)),
            pkcs8,
        })
    }

    /// SEC1 `ECPrivateKey`, the curve is taken from its parameters.
    pub fn from_ec_der<T: ?Sized + AsRef<[u8]>>(der: &T) -> Result<Self, KeyError> {
        let (secret, curve_oid) = read_ec_private_key(der.as_ref())?;
        let curve_oid = curve_oid.ok_or_else(|| KeyError::EC {
            context: "EC private key without curve parameters".to_owned(),
        })?;
        let curve = EcCurve::from_oid(&curve_oid).ok_or_else(|| EcCurve::unsupported(&curve_oid, "private key"))?;
        Self::from_ec_secret(curve, secret)
    }

    /// Generates new ec key pair with specified supported curve.
    pub fn generate_ec(curve: EcCurve, rng: &mut impl CryptoRngCore) -> Result<Self, KeyError> {
        let (secret, _) = curve.generate(rng);
        Self::from_ec_secret(curve, secret)
    }

    fn from_ec_secret(curve: EcCurve, secret: Zeroizing<Vec<u8>>) -> Result<Self, KeyError> {
        let point = curve.public_point(&secret)?;
        let sec1 = write_ec_private_key(&secret, &point);
        let algorithm = AlgorithmId::with_params(
            oids::ec_public_key(),
            DerValue::from_oid(&curve.oid()).map_err(|source| KeyError::Asn1Serialization {
                element: "ec parameters",
                source,
            })?,
        );
        let pkcs8 = write_private_key_info(&algorithm, &sec1)?;
        Ok(Self {
            kind: PrivateKeyKind::Ec { curve, secret, point },
            pkcs8,
        })
    }

    pub fn to_pkcs8(&self) -> Vec<u8> {
        self.pkcs8.to_vec()
    }

    pub fn to_pem(&self) -> Pem<'static> {
        Pem::new(PRIVATE_KEY_PEM_LABEL, self.pkcs8.to_vec())
    }

    pub fn to_pem_str(&self) -> String {
        self.to_pem().to_string()
    }

    pub fn to_public_key(&self) -> Result<PublicKey, KeyError> {
        match &self.kind {
            PrivateKeyKind::Rsa(key) => {
                use rsa::traits::PublicKeyParts;
                PublicKey::from_rsa_components(key.n(), key.e())
            }
            PrivateKeyKind::Ec { curve, point, .. } => PublicKey::from_ec_encoded_components(*curve, point),
        }
    }

    pub(crate) fn kind(&self) -> &PrivateKeyKind {
        &self.kind
    }
}

fn read_private_key_info(der: &[u8]) -> Result<(AlgorithmId, Zeroizing<Vec<u8>>), Asn1DerError> {
    let value = DerValue::from_der(der)?;
    if value.tag() != Tag::SEQUENCE {
        return Err(Asn1DerError::InvalidData("PrivateKeyInfo, not a sequence".to_owned()));
    }
    let mut data = value.data();
    let version = data.get_integer()?;
    if version != 0 && version != 1 {
        return Err(Asn1DerError::InvalidData(format!(
            "PrivateKeyInfo, unsupported version {version}"
        )));
    }
    let algorithm = AlgorithmId::parse(&data.get_der_value()?)?;
    let private_key = Zeroizing::new(data.get_octet_string()?);
    Ok((algorithm, private_key))
}

fn write_private_key_info(algorithm: &AlgorithmId, private_key: &[u8]) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let mut content = DerOutputStream::new();
    content.put_integer(0);
    algorithm
        .encode(&mut content)
        .map_err(|source| KeyError::Asn1Serialization {
            element: "private key info (pkcs8)",
            source,
        })?;
    content.put_octet_string(private_key);
    let mut out = DerOutputStream::new();
    out.write_stream(Tag::SEQUENCE, &content);
    Ok(Zeroizing::new(out.into_bytes()))
}

/// ```not_rust
/// RSAPrivateKey ::= SEQUENCE {
///     version           Version,
///     modulus           INTEGER,  -- n
///     publicExponent    INTEGER,  -- e
///     privateExponent   INTEGER,  -- d
///     prime1            INTEGER,  -- p
///     prime2            INTEGER,  -- q
///     ... }
/// ```
fn rsa_private_key_from_der(der: &[u8]) -> Result<RsaPrivateKey, KeyError> {
    let components = (|| -> Result<Vec<BigUint>, Asn1DerError> {
        let value = DerValue::from_der(der)?;
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("RSAPrivateKey, not a sequence".to_owned()));
        }
        let mut data = value.data();
        data.get_integer()?;
        let mut components = Vec::with_capacity(5);
        for _ in 0..5 {
            components.push(to_biguint(&data.get_positive_big_integer()?));
        }
        Ok(components)
    })()
    .map_err(|source| KeyError::Asn1Deserialization {
        element: "rsa private key",
        source,
    })?;

    let [n, e, d, p, q]: [BigUint; 5] = components.try_into().map_err(|_| KeyError::Rsa {
        context: "invalid number of RSA components".to_owned(),
    })?;

    Ok(RsaPrivateKey::from_components(n, e, d, vec![p, q])?)
}

/// ```not_rust
/// ECPrivateKey ::= SEQUENCE {
///     version        INTEGER { ecPrivkeyVer1(1) },
///     privateKey     OCTET STRING,
///     parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
///     publicKey  [1] BIT STRING OPTIONAL }
/// ```
fn read_ec_private_key(der: &[u8]) -> Result<(Zeroizing<Vec<u8>>, Option<ObjectIdentifier>), KeyError> {
    (|| -> Result<(Zeroizing<Vec<u8>>, Option<ObjectIdentifier>), Asn1DerError> {
        let value = DerValue::from_der(der)?;
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("ECPrivateKey, not a sequence".to_owned()));
        }
        let mut data = value.data();
        if data.get_integer()? != 1 {
            return Err(Asn1DerError::InvalidData("ECPrivateKey, unsupported version".to_owned()));
        }
        let secret = Zeroizing::new(data.get_octet_string()?);

        let mut curve = None;
        while data.available() > 0 {
            let field = data.get_der_value()?;
            if field.is_context_specific_tag(0) && field.is_constructed() {
                curve = Some(field.data().get_oid()?);
            }
        }
        Ok((secret, curve))
    })()
    .map_err(|source| KeyError::Asn1Deserialization {
        element: "ec private key",
        source,
    })
}

fn write_ec_private_key(secret: &[u8], point: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut content = DerOutputStream::new();
    content.put_integer(1);
    content.put_octet_string(secret);
    let mut public_key = DerOutputStream::new();
    public_key.put_bit_string(point);
    content.write_stream(Tag::context_specific_constructed(1), &public_key);
    let mut out = DerOutputStream::new();
    out.write_stream(Tag::SEQUENCE, &content);
    Zeroizing::new(out.into_bytes())
}

// === public key === //

const PUBLIC_KEY_PEM_LABEL: &str = "PUBLIC KEY";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PublicKey(SubjectPublicKeyInfo);

impl From<SubjectPublicKeyInfo> for PublicKey {
    fn from(spki: SubjectPublicKeyInfo) -> Self {
        Self(spki)
    }
}

impl From<PublicKey> for SubjectPublicKeyInfo {
    fn from(key: PublicKey) -> Self {
        key.0
    }
}

impl AsRef<PublicKey> for PublicKey {
    #[inline]
    fn as_ref(&self) -> &PublicKey {
        self
    }
}

impl TryFrom<&'_ PublicKey> for RsaPublicKey {
    type Error = KeyError;

    fn try_from(v: &PublicKey) -> Result<Self, Self::Error> {
        match v.0.decode()? {
            PublicKeyData::Rsa {
                modulus,
                public_exponent,
            } => Ok(RsaPublicKey::new(to_biguint(&modulus), to_biguint(&public_exponent))?),
            PublicKeyData::Ec { .. } => Err(KeyError::UnsupportedAlgorithm {
                algorithm: "elliptic curves".to_owned(),
            }),
        }
    }
}

impl PublicKey {
    pub fn from_rsa_components(modulus: &BigUint, public_exponent: &BigUint) -> Result<Self, KeyError> {
        SubjectPublicKeyInfo::new_rsa_key(&to_bigint(modulus), &to_bigint(public_exponent))
            .map(Self)
            .map_err(|source| KeyError::Asn1Serialization {
                element: "rsa public key",
                source,
            })
    }

    /// `point` is SEC1 encoded point data
    pub fn from_ec_encoded_components(curve: EcCurve, point: &[u8]) -> Result<Self, KeyError> {
        SubjectPublicKeyInfo::new_ec_key(&curve.oid(), point)
            .map(Self)
            .map_err(|source| KeyError::Asn1Serialization {
                element: "ec public key",
                source,
            })
    }

    pub fn from_der<T: ?Sized + AsRef<[u8]>>(der: &T) -> Result<Self, KeyError> {
        SubjectPublicKeyInfo::from_der(der.as_ref())
            .map(Self)
            .map_err(|source| KeyError::Asn1Deserialization {
                element: "subject public key info",
                source,
            })
    }

    pub fn from_pem(pem: &Pem) -> Result<Self, KeyError> {
        match pem.label() {
            PUBLIC_KEY_PEM_LABEL => Self::from_der(pem.data()),
            _ => Err(KeyError::InvalidPemLabel {
                label: pem.label().to_owned(),
            }),
        }
    }

    pub fn from_pem_str(pem_str: &str) -> Result<Self, KeyError> {
        let pem = parse_pem(pem_str)?;
        Self::from_pem(&pem)
    }

    pub fn to_der(&self) -> Vec<u8> {
        self.0.encoded().to_vec()
    }

    pub fn to_pem(&self) -> Pem<'static> {
        Pem::new(PUBLIC_KEY_PEM_LABEL, self.to_der())
    }

    pub fn to_pem_str(&self) -> String {
        self.to_pem().to_string()
    }

    pub fn as_inner(&self) -> &SubjectPublicKeyInfo {
        &self.0
    }

    /// `RSA`, `EC`, ...
    pub fn algorithm_name(&self) -> String {
        self.0.algorithm_name()
    }

    /// Named curve of an EC key.
    pub fn ec_curve(&self) -> Result<EcCurve, KeyError> {
        match self.0.decode()? {
            PublicKeyData::Ec { curve, .. } => {
                EcCurve::from_oid(&curve).ok_or_else(|| EcCurve::unsupported(&curve, "public key"))
            }
            PublicKeyData::Rsa { .. } => Err(KeyError::UnsupportedAlgorithm {
                algorithm: "RSA".to_owned(),
            }),
        }
    }

    pub(crate) fn decode(&self) -> Result<PublicKeyData, KeyError> {
        Ok(self.0.decode()?)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.decode() {
            Ok(PublicKeyData::Rsa { modulus, .. }) => {
                write!(f, "RSA public key, {} bits", modulus.bits())
            }
            Ok(PublicKeyData::Ec { curve, .. }) => match EcCurve::from_oid(&curve) {
                Some(curve) => write!(f, "EC public key, {curve}"),
                None => write!(f, "EC public key, curve {}", Into::<String>::into(&curve)),
            },
            Err(_) => write!(f, "{} public key", self.algorithm_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rstest::rstest;

    #[rstest]
    #[case(pkix_test_data::ROOT_CA_P256_PK, "EC")]
    #[case(pkix_test_data::ROOT_CA_P384_PK, "EC")]
    #[case(pkix_test_data::ROOT_CA_RSA_PK, "RSA")]
    fn pkcs8_keys(#[case] pem: &str, #[case] algorithm: &str) {
        let key = PrivateKey::from_pem_str(pem).unwrap();
        assert_eq!(key.to_public_key().unwrap().algorithm_name(), algorithm);
        assert_eq!(key.to_pem_str(), pem.trim_end());
    }

    #[test]
    fn ec_public_key_matches_certificate() {
        let key = PrivateKey::from_pem_str(pkix_test_data::ROOT_CA_P256_PK).unwrap();
        let public_key = key.to_public_key().unwrap();
        assert_eq!(public_key.ec_curve().unwrap(), EcCurve::NistP256);

        let cert_der = parse_pem(pkix_test_data::ROOT_CA_P256).unwrap().into_data();
        let hex_key = hex::encode(public_key.to_der());
        assert!(hex::encode(cert_der).contains(&hex_key));
    }

    #[test]
    fn rsa_public_key() {
        let key = PrivateKey::from_pem_str(pkix_test_data::ROOT_CA_RSA_PK).unwrap();
        let public_key = key.to_public_key().unwrap();
        let rsa_key = RsaPublicKey::try_from(&public_key).unwrap();
        use rsa::traits::PublicKeyParts;
        assert_eq!(rsa_key.size(), 256);
        assert_eq!(public_key.to_string(), "RSA public key, 2048 bits");
    }

    #[test]
    fn generated_ec_key_round_trips() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let key = PrivateKey::generate_ec(EcCurve::NistP384, &mut rng).unwrap();
        let parsed = PrivateKey::from_pkcs8(&key.to_pkcs8()).unwrap();
        assert_eq!(
            parsed.to_public_key().unwrap(),
            key.to_public_key().unwrap()
        );
        assert_eq!(format!("{parsed:?}"), "PrivateKey { algorithm: \"EC\", curve: NistP384, .. }");
    }

    #[test]
    fn public_key_pem() {
        let public_key = PrivateKey::from_pem_str(pkix_test_data::LEAF_P256_PK)
            .unwrap()
            .to_public_key()
            .unwrap();
        let pem = public_key.to_pem_str();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
        assert_eq!(PublicKey::from_pem_str(&pem).unwrap(), public_key);
    }

    #[test]
    fn wrong_pem_label() {
        let err = PrivateKey::from_pem_str(pkix_test_data::ROOT_CA_P256).unwrap_err();
        assert_eq!(err.to_string(), "invalid PEM label: CERTIFICATE");
    }
}
