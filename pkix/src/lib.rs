//! # pkix
//!
//! X.509 certificates and certificate revocation lists over the
//! `pkix-asn1-der` stream codec: parsing with exact encoding retention,
//! signature verification through pluggable providers, validity checks and
//! revocation lookups.

pub mod config;
pub mod hash;
pub mod key;
pub mod pem;
pub mod signature;
pub mod trust;
pub mod x509;

pub use config::{PkixConfig, RevocationIndexKind};
pub use pkix_asn1_x509::{oids, AlgorithmId, X500Principal};
pub use x509::{X509CRLEntry, X509CRLImpl, X509CertImpl, X509CertInfo};
