//! Signature algorithms behind a provider interface
//!
//! A [`SignatureProvider`] hands out [`Signer`]s by standard algorithm name
//! (`SHA256withRSA`, `SHA384withECDSA`, ...). Certificates and CRLs only talk
//! to these traits; [`DefaultSignatureProvider`] implements them with the
//! RustCrypto crates.

use crate::hash::{self, HashAlgorithm, MessageDigest};
use crate::key::{to_biguint, EcCurve, KeyError, PrivateKey, PrivateKeyKind, PublicKey};
use pkix_asn1_x509::{digest_algorithm_of, encryption_algorithm_of, PublicKey as PublicKeyData};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    /// no signer for this algorithm
    #[error("{algorithm} Signature not available")]
    NoSuchAlgorithm { algorithm: String },

    /// key unusable with this algorithm
    #[error("invalid key: {context}")]
    InvalidKey { context: String },

    /// parameters not accepted by this algorithm
    #[error("invalid algorithm parameters for {algorithm}")]
    InvalidParameters { algorithm: String },

    /// signature bytes are malformed
    #[error("invalid signature encoding: {context}")]
    InvalidSignature { context: String },

    /// signer used before `init_verify` / `init_sign`
    #[error("signer not initialized for {operation}")]
    NotInitialized { operation: &'static str },

    /// signing failed
    #[error("signing failed: {context}")]
    Signing { context: String },

    /// key error
    #[error("key error: {source}")]
    Key {
        #[from]
        source: KeyError,
    },
}

/// One signature computation or verification.
///
/// `verify` distinguishes a signature that does not match (`Ok(false)`) from
/// one that cannot be checked at all (`Err`).
pub trait Signer: Send {
    /// Standard name, e.g. `SHA256withECDSA`
    fn algorithm(&self) -> &str;

    /// `params` is the DER encoding of the algorithm parameters, if any.
    fn init_verify(&mut self, key: &PublicKey, params: Option<&[u8]>) -> Result<(), SignatureError>;

    fn init_sign(&mut self, key: &PrivateKey) -> Result<(), SignatureError>;

    fn update(&mut self, data: &[u8]) -> Result<(), SignatureError>;

    fn verify(&mut self, signature: &[u8]) -> Result<bool, SignatureError>;

    fn sign(&mut self) -> Result<Vec<u8>, SignatureError>;
}

pub trait SignatureProvider: Send + Sync + fmt::Debug {
    /// Name used to tell providers apart in verification caches.
    fn name(&self) -> &str;

    fn get_instance(&self, algorithm: &str) -> Result<Box<dyn Signer>, SignatureError>;
}

/// `SHA{1,224,256,384,512}withRSA`, `MD5withRSA` and
/// `SHA{1,224,256,384,512}withECDSA` on P-256 and P-384.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultSignatureProvider;

impl DefaultSignatureProvider {
    pub const NAME: &'static str = "PKIX";
}

impl SignatureProvider for DefaultSignatureProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn get_instance(&self, algorithm: &str) -> Result<Box<dyn Signer>, SignatureError> {
        let scheme = SignatureScheme::from_name(algorithm).ok_or_else(|| SignatureError::NoSuchAlgorithm {
            algorithm: algorithm.to_owned(),
        })?;
        let digest = hash::get_instance(scheme.hash().name()).map_err(|_| SignatureError::NoSuchAlgorithm {
            algorithm: algorithm.to_owned(),
        })?;
        Ok(Box::new(DefaultSigner {
            name: algorithm.to_owned(),
            scheme,
            digest,
            state: SignerState::Uninitialized,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureScheme {
    RsaPkcs1v15(HashAlgorithm),
    Ecdsa(HashAlgorithm),
}

impl SignatureScheme {
    fn from_name(name: &str) -> Option<Self> {
        let hash = HashAlgorithm::from_name(&digest_algorithm_of(name)?)?;
        let encryption = encryption_algorithm_of(name)?;
        if encryption.eq_ignore_ascii_case("RSA") {
            Some(Self::RsaPkcs1v15(hash))
        } else if encryption.eq_ignore_ascii_case("ECDSA") && hash != HashAlgorithm::MD5 {
            Some(Self::Ecdsa(hash))
        } else {
            None
        }
    }

    fn hash(self) -> HashAlgorithm {
        match self {
            Self::RsaPkcs1v15(hash) | Self::Ecdsa(hash) => hash,
        }
    }

    fn padding(self) -> Pkcs1v15Sign {
        match self.hash() {
            HashAlgorithm::MD5 => Pkcs1v15Sign::new::<md5::Md5>(),
            HashAlgorithm::SHA1 => Pkcs1v15Sign::new::<sha1::Sha1>(),
            HashAlgorithm::SHA2_224 => Pkcs1v15Sign::new::<sha2::Sha224>(),
            HashAlgorithm::SHA2_256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
            HashAlgorithm::SHA2_384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
            HashAlgorithm::SHA2_512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
        }
    }
}

enum VerifyingKey {
    Rsa(Box<RsaPublicKey>),
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
}

enum SigningKey {
    Rsa(Box<RsaPrivateKey>),
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

enum SignerState {
    Uninitialized,
    Verify(VerifyingKey),
    Sign(SigningKey),
}

struct DefaultSigner {
    name: String,
    scheme: SignatureScheme,
    digest: Box<dyn MessageDigest>,
    state: SignerState,
}

impl DefaultSigner {
    fn wrong_key(&self, key_algorithm: &str) -> SignatureError {
        SignatureError::InvalidKey {
            context: format!("{} key cannot be used with {}", key_algorithm, self.name),
        }
    }
}

impl Signer for DefaultSigner {
    fn algorithm(&self) -> &str {
        &self.name
    }

    fn init_verify(&mut self, key: &PublicKey, params: Option<&[u8]>) -> Result<(), SignatureError> {
        // NULL is the only parameter PKCS#1 v1.5 and ECDSA accept.
        if params.is_some_and(|params| params != [0x05, 0x00]) {
            return Err(SignatureError::InvalidParameters {
                algorithm: self.name.clone(),
            });
        }

        let verifying_key = match (self.scheme, key.decode()?) {
            (
                SignatureScheme::RsaPkcs1v15(_),
                PublicKeyData::Rsa {
                    modulus,
                    public_exponent,
                },
            ) => VerifyingKey::Rsa(Box::new(
                RsaPublicKey::new(to_biguint(&modulus), to_biguint(&public_exponent)).map_err(KeyError::from)?,
            )),
            (SignatureScheme::Ecdsa(_), PublicKeyData::Ec { curve, point }) => {
                let invalid_point = |e: p256::ecdsa::Error| SignatureError::InvalidKey {
                    context: format!("invalid EC point: {e}"),
                };
                match EcCurve::from_oid(&curve) {
                    Some(EcCurve::NistP256) => VerifyingKey::P256(
                        p256::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid_point)?,
                    ),
                    Some(EcCurve::NistP384) => VerifyingKey::P384(
                        p384::ecdsa::VerifyingKey::from_sec1_bytes(&point).map_err(invalid_point)?,
                    ),
                    None => return Err(EcCurve::unsupported(&curve, "signature verification").into()),
                }
            }
            _ => return Err(self.wrong_key(&key.algorithm_name())),
        };

        self.digest.reset();
        self.state = SignerState::Verify(verifying_key);
        Ok(())
    }

    fn init_sign(&mut self, key: &PrivateKey) -> Result<(), SignatureError> {
        let invalid_secret = |e: p256::ecdsa::Error| SignatureError::InvalidKey {
            context: format!("invalid EC secret: {e}"),
        };
        let signing_key = match (self.scheme, key.kind()) {
            (SignatureScheme::RsaPkcs1v15(_), PrivateKeyKind::Rsa(key)) => SigningKey::Rsa(key.clone()),
            (SignatureScheme::Ecdsa(_), PrivateKeyKind::Ec { curve, secret, .. }) => match curve {
                EcCurve::NistP256 => {
                    SigningKey::P256(p256::ecdsa::SigningKey::from_slice(secret).map_err(invalid_secret)?)
                }
                EcCurve::NistP384 => {
                    SigningKey::P384(p384::ecdsa::SigningKey::from_slice(secret).map_err(invalid_secret)?)
                }
            },
            (_, PrivateKeyKind::Rsa(_)) => return Err(self.wrong_key("RSA")),
            (_, PrivateKeyKind::Ec { .. }) => return Err(self.wrong_key("EC")),
        };

        self.digest.reset();
        self.state = SignerState::Sign(signing_key);
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<(), SignatureError> {
        if let SignerState::Uninitialized = self.state {
            return Err(SignatureError::NotInitialized { operation: "update" });
        }
        self.digest.update(data);
        Ok(())
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool, SignatureError> {
        use p256::ecdsa::signature::hazmat::PrehashVerifier;

        let SignerState::Verify(key) = &self.state else {
            return Err(SignatureError::NotInitialized { operation: "verify" });
        };
        let hashed = self.digest.digest();

        let malformed = |e: p256::ecdsa::Error| SignatureError::InvalidSignature {
            context: e.to_string(),
        };

        let outcome = match key {
            VerifyingKey::Rsa(key) => {
                use rsa::traits::PublicKeyParts;

                if signature.len() != key.size() {
                    return Err(SignatureError::InvalidSignature {
                        context: format!(
                            "signature length {} does not match modulus length {}",
                            signature.len(),
                            key.size()
                        ),
                    });
                }
                key.verify(self.scheme.padding(), &hashed, signature).is_ok()
            }
            VerifyingKey::P256(key) => {
                let signature = p256::ecdsa::Signature::from_der(signature).map_err(malformed)?;
                key.verify_prehash(&hashed, &signature).is_ok()
            }
            VerifyingKey::P384(key) => {
                let signature = p384::ecdsa::Signature::from_der(signature).map_err(malformed)?;
                key.verify_prehash(&hashed, &signature).is_ok()
            }
        };

        Ok(outcome)
    }

    fn sign(&mut self) -> Result<Vec<u8>, SignatureError> {
        use p256::ecdsa::signature::hazmat::PrehashSigner;

        let SignerState::Sign(key) = &self.state else {
            return Err(SignatureError::NotInitialized { operation: "sign" });
        };
        let hashed = self.digest.digest();

        let failed = |e: p256::ecdsa::Error| SignatureError::Signing { context: e.to_string() };

        let signature = match key {
            SigningKey::Rsa(key) => key
                .sign(self.scheme.padding(), &hashed)
                .map_err(|e| SignatureError::Signing { context: e.to_string() })?,
            SigningKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key.sign_prehash(&hashed).map_err(failed)?;
                signature.to_der().as_bytes().to_vec()
            }
            SigningKey::P384(key) => {
                let signature: p384::ecdsa::Signature = key.sign_prehash(&hashed).map_err(failed)?;
                signature.to_der().as_bytes().to_vec()
            }
        };

        Ok(signature)
    }
}
