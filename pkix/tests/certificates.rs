use chrono::{Duration, TimeZone, Utc};
use pkix::key::PublicKey;
use pkix::signature::{DefaultSignatureProvider, SignatureError, SignatureProvider, Signer};
use pkix::x509::{CertAttribute, CertError, VerificationState};
use pkix::{oids, PkixConfig, X509CertImpl};
use pkix_asn1_x509::GeneralName;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::sync::atomic::{AtomicUsize, Ordering};

fn cert(pem: &str) -> X509CertImpl {
    X509CertImpl::from_pem_str(pem).expect("certificate")
}

fn root_key() -> PublicKey {
    cert(pkix_test_data::ROOT_CA_P256).public_key().cloned().unwrap()
}

#[rstest]
#[case(pkix_test_data::ROOT_CA_P256, "SHA256withECDSA")]
#[case(pkix_test_data::ROOT_CA_P384, "SHA384withECDSA")]
#[case(pkix_test_data::ROOT_CA_RSA, "SHA256withRSA")]
fn self_signed_roots_verify(#[case] pem: &str, #[case] algorithm: &str) {
    let root = cert(pem);
    assert_eq!(root.sig_alg_name().as_deref(), Some(algorithm));
    root.verify(root.public_key().unwrap()).unwrap();
}

#[test]
fn leaf_verifies_with_root_key() {
    let leaf = cert(pkix_test_data::LEAF_P256);
    leaf.verify(&root_key()).unwrap();

    let other_root = cert(pkix_test_data::ROOT_CA_P384);
    let err = leaf.verify(other_root.public_key().unwrap()).unwrap_err();
    assert!(matches!(err, CertError::SignatureMismatch), "{err}");

    let own_key = leaf.public_key().cloned().unwrap();
    let err = leaf.verify(&own_key).unwrap_err();
    assert_eq!(err.to_string(), "Signature does not match.");
}

#[test]
fn rsa_key_cannot_verify_ecdsa_signature() {
    let leaf = cert(pkix_test_data::LEAF_P256);
    let rsa_root = cert(pkix_test_data::ROOT_CA_RSA);
    let err = leaf.verify(rsa_root.public_key().unwrap()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "signature error: invalid key: RSA key cannot be used with SHA256withECDSA"
    );
}

#[test]
fn leaf_fields() {
    let leaf = cert(pkix_test_data::LEAF_P256);
    assert_eq!(leaf.version(), 3);
    assert_eq!(leaf.serial_number().unwrap().to_hex(), "1A2B3C");
    assert_eq!(leaf.subject_dn().unwrap().to_string(), "CN=leaf.pkix.test");
    assert_eq!(
        leaf.issuer_x500_principal().unwrap().to_string(),
        "CN=Pkix Test Root CA,O=Pkix Test,C=CA"
    );
    assert_eq!(leaf.basic_constraints(), -1);
    assert_eq!(
        leaf.key_usage(),
        Some(vec![true, false, true, false, false, false, false, false, false])
    );
    assert_eq!(leaf.extended_key_usage(), Some(vec![oids::KP_SERVER_AUTH.to_owned()]));
    assert_eq!(
        leaf.subject_alternative_names(),
        Some(vec![GeneralName::DnsName("leaf.pkix.test".to_owned())])
    );
    assert_eq!(
        leaf.critical_extension_oids().unwrap().into_iter().collect::<Vec<_>>(),
        vec![oids::KEY_USAGE.to_owned()]
    );
    assert_eq!(leaf.non_critical_extension_oids().unwrap().len(), 5);
    assert!(!leaf.has_unsupported_critical_extension());
    assert_eq!(leaf.issuer_unique_id(), None);
}

#[test]
fn root_ca_path_length() {
    assert_eq!(cert(pkix_test_data::ROOT_CA_P256).basic_constraints(), 1);
}

#[test]
fn validity_bounds() {
    let leaf = cert(pkix_test_data::LEAF_P256);
    let not_before = Utc.with_ymd_and_hms(2026, 10, 16, 22, 40, 37).unwrap();
    let not_after = Utc.with_ymd_and_hms(2036, 10, 13, 22, 40, 37).unwrap();
    let ms = Duration::milliseconds(1);

    leaf.check_validity_at(&not_before).unwrap();
    leaf.check_validity_at(&not_after).unwrap();

    match leaf.check_validity_at(&(not_before - ms)) {
        Err(CertError::CertificateNotYetValid { not_before: date, now }) => {
            assert_eq!(date, not_before);
            assert_eq!(now, not_before - ms);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    match leaf.check_validity_at(&(not_after + ms)) {
        Err(CertError::CertificateExpired { not_after: date, .. }) => assert_eq!(date, not_after),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn indefinite_length_encoding_is_normalized() {
    let ber = cert(pkix_test_data::LEAF_P256_INDEFINITE);
    let der = cert(pkix_test_data::LEAF_P256);
    assert_eq!(ber.encoded().unwrap(), der.encoded().unwrap());
    assert_eq!(ber, der);
    assert_eq!(ber.hash_code(), der.hash_code());
    ber.verify(&root_key()).unwrap();
}

#[test]
fn hash_code_of_encoding() {
    let leaf = cert(pkix_test_data::LEAF_P256);
    let encoded = leaf.encoded().unwrap();
    let expected = encoded
        .iter()
        .enumerate()
        .skip(1)
        .fold(0i32, |acc, (i, b)| acc.wrapping_add((*b as i8 as i32).wrapping_mul(i as i32)));
    assert_eq!(leaf.hash_code(), expected);
    assert_ne!(leaf.hash_code(), cert(pkix_test_data::ROOT_CA_P256).hash_code());
}

#[test]
fn expired_third_party_certificate() {
    let contoso = cert(pkix_test_data::CONTOSO_LEAF);
    assert_eq!(contoso.subject_dn().unwrap().to_string(), "CN=test.contoso.local");
    assert!(matches!(
        contoso.check_validity_at(&Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        Err(CertError::CertificateExpired { .. })
    ));
}

#[test]
fn strict_serial_numbers() {
    let config = PkixConfig {
        lenient_serial_numbers: false,
        ..PkixConfig::default()
    };
    let der = cert(pkix_test_data::LEAF_P256).encoded().unwrap();
    X509CertImpl::from_der_with_config(&der, &config).unwrap();
}

#[derive(Debug, Default)]
struct CountingProvider {
    calls: AtomicUsize,
}

impl SignatureProvider for CountingProvider {
    fn name(&self) -> &str {
        "Counting"
    }

    fn get_instance(&self, algorithm: &str) -> Result<Box<dyn Signer>, SignatureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DefaultSignatureProvider.get_instance(algorithm)
    }
}

#[test]
fn verification_outcome_is_cached() {
    let leaf = cert(pkix_test_data::LEAF_P256);
    let key = root_key();
    let provider = CountingProvider::default();

    assert_eq!(leaf.verification_state(), VerificationState::Unverified);
    leaf.verify_with_provider(&key, &provider).unwrap();
    leaf.verify_with_provider(&key, &provider).unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        leaf.verification_state(),
        VerificationState::Verified {
            key: key.clone(),
            provider: "Counting".to_owned(),
            outcome: true,
        }
    );

    // another key is checked again, and a mismatch is remembered as well
    let own_key = leaf.public_key().cloned().unwrap();
    assert!(leaf.verify_with_provider(&own_key, &provider).is_err());
    assert!(matches!(
        leaf.verify_with_provider(&own_key, &provider),
        Err(CertError::SignatureMismatch)
    ));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

    // another provider is a cache miss
    leaf.verify(&key).unwrap();
    assert!(matches!(
        leaf.verification_state(),
        VerificationState::Verified { provider, .. } if provider == "PKIX"
    ));
}

#[test]
fn verification_cache_can_be_disabled() {
    let config = PkixConfig {
        verification_cache: false,
        ..PkixConfig::default()
    };
    let der = cert(pkix_test_data::LEAF_P256).encoded().unwrap();
    let leaf = X509CertImpl::from_der_with_config(&der, &config).unwrap();
    let provider = CountingProvider::default();

    leaf.verify_with_provider(&root_key(), &provider).unwrap();
    leaf.verify_with_provider(&root_key(), &provider).unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert_eq!(leaf.verification_state(), VerificationState::Unverified);
}

#[test]
fn shared_between_threads() {
    let leaf = std::sync::Arc::new(cert(pkix_test_data::LEAF_P256));
    let key = root_key();

    let handles = (0..4)
        .map(|_| {
            let leaf = leaf.clone();
            let key = key.clone();
            std::thread::spawn(move || leaf.verify(&key).is_ok())
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn attributes_by_name() {
    let leaf = cert(pkix_test_data::LEAF_P256);
    for name in [
        "x509.info",
        "x509.algorithm",
        "x509.signed_cert",
        "x509.info.validity.notAfter",
        "x509.info.key.value",
        "x509.info.issuer.x500principal",
        "x509.info.extensions.KeyUsage",
        "x509.info.extensions.2.5.29.17",
    ] {
        assert!(leaf.get_by_name(name).unwrap().is_some(), "{name}");
    }
    assert!(leaf.get_by_name("x509.info.issuerID").unwrap().is_none());
    assert!(leaf.get(&CertAttribute::public_key()).is_some());
}

#[test]
fn certificate_bundle() {
    let bundle = [
        pkix_test_data::LEAF_P256,
        pkix_test_data::ROOT_CA_P256_CRL,
        pkix_test_data::ROOT_CA_P256,
    ]
    .join("\n");
    let certs = X509CertImpl::from_pem_bundle(&bundle).unwrap();
    assert_eq!(certs.len(), 2);
    assert_eq!(certs[0], cert(pkix_test_data::LEAF_P256));
    certs[0].verify(certs[1].public_key().unwrap()).unwrap();
}
