//! Test data shared between the pkix crates.

// P-256 root CA, self-signed, notAfter encoded as GeneralizedTime (2051)
pub const ROOT_CA_P256: &str = include_str!("../test_assets/root_ca_p256.crt");
pub const ROOT_CA_P256_PK: &str = include_str!("../test_assets/root_ca_p256.key");

// CRL v2 issued by ROOT_CA_P256, revokes serials 0x1000 (keyCompromise) and 0x1001
pub const ROOT_CA_P256_CRL: &str = include_str!("../test_assets/root_ca_p256.crl");

// Issued by ROOT_CA_P256, serial 0x1A2B3C
pub const LEAF_P256: &str = include_str!("../test_assets/leaf_p256.crt");
pub const LEAF_P256_PK: &str = include_str!("../test_assets/leaf_p256.key");

// LEAF_P256 with the outer and TBS sequences re-encoded with BER indefinite lengths
pub const LEAF_P256_INDEFINITE: &str = include_str!("../test_assets/leaf_p256_indefinite.crt");

// Issued by ROOT_CA_P256, serial 0x1000, listed in ROOT_CA_P256_CRL
pub const REVOKED_P256: &str = include_str!("../test_assets/revoked_p256.crt");

// RSA 2048 root with a multi-valued RDN and an emailAddress attribute
pub const ROOT_CA_RSA: &str = include_str!("../test_assets/root_ca_rsa.crt");
pub const ROOT_CA_RSA_PK: &str = include_str!("../test_assets/root_ca_rsa.key");

pub const ROOT_CA_P384: &str = include_str!("../test_assets/root_ca_p384.crt");
pub const ROOT_CA_P384_PK: &str = include_str!("../test_assets/root_ca_p384.key");

// https://lapo.it/asn1js/ sample: RSA signed v3 certificate issued by "contoso.local Authority"
pub const CONTOSO_LEAF: &str = include_str!("../test_assets/contoso_leaf.crt");
