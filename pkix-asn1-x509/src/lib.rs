//! ASN.1 structures of X.509 certificates and CRLs (RFC 5280) built on the
//! `pkix-asn1-der` stream codec.

pub mod algorithm_identifier;
pub mod extension;
pub mod name;
pub mod oids;
pub mod public_key;
pub mod serial_number;
pub mod unique_identity;
pub mod validity;
pub mod version;

pub use algorithm_identifier::{
    digest_algorithm_of, encryption_algorithm_of, make_sig_alg, AlgorithmId, AlgorithmParams,
};
pub use extension::{BasicConstraints, CrlReason, Extension, Extensions, GeneralName, KeyUsage};
pub use name::{AttributeTypeAndValue, NameError, RelativeDistinguishedName, X500Principal};
pub use public_key::{PublicKey, PublicKeyError, SubjectPublicKeyInfo};
pub use serial_number::SerialNumber;
pub use unique_identity::UniqueIdentity;
pub use validity::{CertificateValidity, ValidityCheck};
pub use version::CertificateVersion;

pub use oid::ObjectIdentifier;
