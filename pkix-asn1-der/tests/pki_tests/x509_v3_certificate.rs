use super::pem_body;
use chrono::{TimeZone, Utc};
use num_bigint_dig::BigInt;
use pkix_asn1_der::{DerInputStream, DerValue, Tag};

#[test]
fn x509_v3_certificate() {
    let encoded = pem_body(pkix_test_data::CONTOSO_LEAF);
    assert_eq!(encoded.len(), 1054);

    let mut stream = DerInputStream::new(&encoded).unwrap();
    let certificate = stream.get_sequence(3).unwrap();
    assert_eq!(stream.available(), 0);
    assert_eq!(certificate.len(), 3);

    let tbs = &certificate[0];
    check!(tbs in encoded[4..522]);

    let mut fields = tbs.data();

    // version [0] EXPLICIT v3
    let version = fields.get_der_value().unwrap();
    assert!(version.is_context_specific_tag(0));
    assert!(version.is_constructed());
    assert_eq!(version.data().get_integer().unwrap(), 2);

    let serial = fields.get_big_integer().unwrap();
    assert_eq!(serial, BigInt::from(0x37C3_57C4));

    let signature = fields.get_sequence(2).unwrap();
    assert_eq!(Into::<String>::into(&signature[0].get_oid().unwrap()), "1.2.840.113549.1.1.11");
    assert_eq!(signature[1].tag(), Tag::NULL);
    assert_eq!(signature[1].to_string(), "[DerValue, null]");

    let issuer = fields.get_sequence(1).unwrap();
    let rdn = issuer[0].data().get_set(1).unwrap();
    let ava = rdn[0].data().get_sequence(2).unwrap();
    assert_eq!(ava[0].to_string(), "OID.2.5.4.3");
    assert_eq!(ava[1].get_as_string().unwrap(), "contoso.local Authority");
    assert_eq!(ava[1].get_utf8_string().unwrap(), "contoso.local Authority");

    let mut validity = fields.get_der_value().unwrap().data();
    assert_eq!(
        validity.get_utc_time().unwrap(),
        Utc.with_ymd_and_hms(2019, 10, 17, 17, 41, 28).unwrap()
    );
    assert_eq!(
        validity.get_utc_time().unwrap(),
        Utc.with_ymd_and_hms(2022, 10, 16, 17, 41, 28).unwrap()
    );

    let subject = fields.get_der_value().unwrap();
    assert_eq!(subject.tag(), Tag::SEQUENCE);

    let spki = fields.get_sequence(2).unwrap();
    let key = spki[1].get_unaligned_bit_string().unwrap();
    assert_eq!(key.len(), 270 * 8);
    let rsa_key = DerInputStream::new(key.as_bytes()).unwrap().get_sequence(2).unwrap();
    assert_eq!(rsa_key[1].get_integer().unwrap(), 65537);

    let extensions = fields.get_der_value().unwrap();
    assert!(extensions.is_constructed_tag(3));
    let extensions = extensions.data().get_sequence(4).unwrap();
    assert_eq!(extensions.len(), 4);
    let key_usage = extensions[1].data().get_sequence(3).unwrap();
    assert_eq!(Into::<String>::into(&key_usage[0].get_oid().unwrap()), "2.5.29.15");
    assert!(key_usage[1].get_boolean().unwrap());
    assert_eq!(fields.available(), 0);

    let signature_value = &certificate[2];
    assert_eq!(signature_value.get_bit_string().unwrap().len(), 512);

    let reencoded = {
        let mut out = pkix_asn1_der::DerOutputStream::new();
        out.put_sequence(&certificate);
        out.into_bytes()
    };
    assert_eq!(reencoded, encoded);
}

#[test]
fn sub_values_share_encoding() {
    let encoded = pem_body(pkix_test_data::CONTOSO_LEAF);
    let certificate = DerValue::from_der(&encoded).unwrap();
    let first = certificate.data().get_der_value().unwrap();
    let second = certificate.data().get_der_value().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.length(), 514);
}
