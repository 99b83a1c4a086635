use super::pem_body;
use pkix_asn1_der::{Asn1DerError, DerInputStream, DerValue, IndefiniteLengthConverter};

#[test]
fn indefinite_certificate_decodes_like_definite() {
    let definite = pem_body(pkix_test_data::LEAF_P256);
    let indefinite = pem_body(pkix_test_data::LEAF_P256_INDEFINITE);
    assert_ne!(definite, indefinite);

    let conversion = IndefiniteLengthConverter::new().convert(&indefinite).unwrap();
    assert_eq!(conversion.der, definite);
    assert_eq!(conversion.consumed, indefinite.len());

    let from_ber = DerInputStream::new(&indefinite).unwrap().get_sequence(3).unwrap();
    let from_der = DerInputStream::new(&definite).unwrap().get_sequence(3).unwrap();
    assert_eq!(from_ber, from_der);

    // the to-be-signed bytes must survive untouched
    assert_eq!(from_ber[0].to_byte_array(), from_der[0].to_byte_array());
}

#[test]
fn indefinite_value_nested_in_definite_stream() {
    let indefinite = pem_body(pkix_test_data::LEAF_P256_INDEFINITE);

    let mut wrapped = vec![0x02, 0x01, 0x2A];
    wrapped.extend_from_slice(&indefinite);
    wrapped.extend_from_slice(&[0x05, 0x00]);

    let mut stream = DerInputStream::new(&wrapped).unwrap();
    assert_eq!(stream.get_integer().unwrap(), 42);
    let certificate = stream.get_der_value().unwrap();
    assert_eq!(certificate.to_byte_array(), pem_body(pkix_test_data::LEAF_P256));
    stream.get_null().unwrap();
    assert_eq!(stream.available(), 0);
}

#[test]
fn definite_lengths_must_be_minimal() {
    // INTEGER 1 with a long-form length
    let err = DerValue::from_der(&[0x02, 0x81, 0x01, 0x01]).unwrap_err();
    assert!(matches!(err, Asn1DerError::InvalidLength(_)));
    assert!(err.to_string().contains("Should use short form for length"));

    let err = DerValue::from_der(&[0x04, 0x82, 0x00, 0x81]).unwrap_err();
    assert!(err.to_string().contains("Redundant length bytes found"));
}

#[test]
fn truncated_sequence_child() {
    // SEQUENCE of 5 bytes: INTEGER 1 followed by an incomplete TLV
    let mut stream = DerInputStream::new(&[0x30, 0x05, 0x02, 0x01, 0x01, 0x04, 0x05]).unwrap();
    assert!(matches!(
        stream.get_sequence(2),
        Err(Asn1DerError::TrailingData { remaining: 2 })
    ));

    // the sequence itself runs past the input
    let mut stream = DerInputStream::new(&[0x30, 0x05, 0x02, 0x01, 0x01]).unwrap();
    assert!(matches!(stream.get_sequence(1), Err(Asn1DerError::TruncatedData(_))));
}

#[test]
fn missing_end_of_contents() {
    let err = DerInputStream::new(&[0x30, 0x80, 0x02, 0x01, 0x01]).unwrap_err();
    assert!(matches!(err, Asn1DerError::UnterminatedIndefiniteLength));
}
