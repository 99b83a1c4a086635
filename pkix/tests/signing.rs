use chrono::{Duration, TimeZone, Utc};
use pkix::key::{EcCurve, PrivateKey};
use pkix::x509::{AttributeValue, CertAttribute, CertError};
use pkix::{X500Principal, X509CertImpl, X509CertInfo};
use pkix_asn1_x509::{
    BasicConstraints, CertificateValidity, CertificateVersion, Extension, KeyUsage, SerialNumber,
};
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn attribute(name: &str) -> CertAttribute {
    name.parse().expect("attribute name")
}

fn unsigned_ca(key: &PrivateKey) -> X509CertImpl {
    let name: X500Principal = "CN=Pkix Generated CA,O=Pkix Test".parse().unwrap();
    let not_before = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();

    let mut cert = X509CertImpl::new(X509CertInfo::new());
    for (attr, value) in [
        ("x509.info.version", AttributeValue::Version(CertificateVersion::V3)),
        ("x509.info.serialNumber", AttributeValue::SerialNumber(SerialNumber::from(0xCAFEu64))),
        ("x509.info.issuer", AttributeValue::Name(name.clone())),
        ("x509.info.subject", AttributeValue::Name(name)),
        (
            "x509.info.validity",
            AttributeValue::Validity(CertificateValidity::new(not_before, not_before + Duration::days(365))),
        ),
        ("x509.info.key", AttributeValue::Key(key.to_public_key().unwrap())),
        (
            "x509.info.extensions.BasicConstraints",
            AttributeValue::Extension(Extension::new_basic_constraints(
                true,
                BasicConstraints {
                    ca: true,
                    path_len: Some(0),
                },
            )),
        ),
        (
            "x509.info.extensions.KeyUsage",
            AttributeValue::Extension(Extension::new_key_usage(&KeyUsage::new(&[
                KeyUsage::KEY_CERT_SIGN,
                KeyUsage::CRL_SIGN,
            ]))),
        ),
    ] {
        cert.set(&attribute(attr), value).unwrap_or_else(|e| panic!("{attr}: {e}"));
    }
    cert
}

fn generated_key(seed: u64) -> PrivateKey {
    PrivateKey::generate_ec(EcCurve::NistP256, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

#[test]
fn sign_then_parse() {
    let key = generated_key(42);
    let mut cert = unsigned_ca(&key);
    assert!(!cert.is_read_only());
    assert!(matches!(cert.encoded(), Err(CertError::NotSigned)));

    cert.sign(&key, "SHA256withECDSA").unwrap();
    assert!(cert.is_read_only());
    cert.verify(&key.to_public_key().unwrap()).unwrap();

    let parsed = X509CertImpl::from_der(&cert.encoded().unwrap()).unwrap();
    assert_eq!(parsed, cert);
    assert_eq!(parsed.hash_code(), cert.hash_code());
    assert_eq!(parsed.version(), 3);
    assert_eq!(parsed.serial_number().unwrap().to_hex(), "CAFE");
    assert_eq!(parsed.sig_alg_name().as_deref(), Some("SHA256withECDSA"));
    assert_eq!(parsed.basic_constraints(), 0);
    assert_eq!(
        parsed.subject_x500_principal().unwrap().to_string(),
        "CN=Pkix Generated CA,O=Pkix Test"
    );
    parsed.verify(parsed.public_key().unwrap()).unwrap();
}

#[test]
fn signed_certificate_is_read_only() {
    let key = generated_key(1);
    let mut cert = unsigned_ca(&key);
    cert.sign(&key, "SHA256withECDSA").unwrap();

    let err = cert
        .set(&CertAttribute::serial_id(), AttributeValue::SerialNumber(SerialNumber::from(1u64)))
        .unwrap_err();
    assert_eq!(err.to_string(), "cannot over-write existing certificate");
    assert!(matches!(cert.delete(&CertAttribute::subject_dn()), Err(CertError::ReadOnly)));
    assert!(matches!(cert.sign(&key, "SHA256withECDSA"), Err(CertError::ReadOnly)));
}

#[test]
fn algorithm_must_match_key() {
    let key = generated_key(2);
    let mut cert = unsigned_ca(&key);
    assert!(cert.sign(&key, "SHA256withRSA").is_err());
    assert!(!cert.is_read_only());

    // a failed attempt leaves the certificate signable
    cert.sign(&key, "SHA384withECDSA").unwrap();
    assert_eq!(cert.sig_alg_name().as_deref(), Some("SHA384withECDSA"));
}

#[test]
fn incomplete_certificate_cannot_be_signed() {
    let key = generated_key(3);
    let mut cert = unsigned_ca(&key);
    cert.delete(&attribute("x509.info.validity")).unwrap();
    assert!(cert.sign(&key, "SHA256withECDSA").is_err());
    assert!(!cert.is_read_only());
}

#[test]
fn wrong_attribute_value_type() {
    let key = generated_key(4);
    let mut cert = unsigned_ca(&key);
    let err = cert
        .set(&CertAttribute::subject_dn(), AttributeValue::Bytes(vec![1, 2, 3]))
        .unwrap_err();
    assert!(err.to_string().ends_with("class type invalid."), "{err}");
    assert!(cert
        .set(&attribute("x509.signature"), AttributeValue::Bytes(Vec::new()))
        .is_err());
}

#[test]
fn issued_by_fixture_root() {
    let root = X509CertImpl::from_pem_str(pkix_test_data::ROOT_CA_RSA).unwrap();
    let root_key = PrivateKey::from_pem_str(pkix_test_data::ROOT_CA_RSA_PK).unwrap();
    let subject_key = generated_key(5);

    let mut cert = unsigned_ca(&subject_key);
    cert.set(
        &attribute("x509.info.issuer"),
        AttributeValue::Name(root.subject_x500_principal().unwrap()),
    )
    .unwrap();
    cert.sign(&root_key, "SHA256withRSA").unwrap();

    cert.verify(root.public_key().unwrap()).unwrap();
    assert!(matches!(
        cert.verify(&subject_key.to_public_key().unwrap()),
        Err(CertError::Signature(_))
    ));
    assert_eq!(cert.issuer_x500_principal(), root.subject_x500_principal());
}
