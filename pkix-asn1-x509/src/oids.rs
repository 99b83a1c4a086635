//! OIDs commonly used with X.509 certificates and CRLs

macro_rules! define_oid {
    ($uppercase:ident => $lowercase:ident => $str_value:literal) => {
        pub const $uppercase: &str = $str_value;

        pub fn $lowercase() -> oid::ObjectIdentifier {
            static OID: std::sync::OnceLock<oid::ObjectIdentifier> = std::sync::OnceLock::new();
            OID.get_or_init(|| oid::ObjectIdentifier::try_from($uppercase).expect("valid OID literal"))
                .clone()
        }
    };
    ( $( $uppercase:ident => $lowercase:ident => $str_value:literal, )+ ) => {
        $( define_oid! { $uppercase => $lowercase => $str_value } )+
    };
}

define_oid! {
    // digests
    MD2 => md2 => "1.2.840.113549.2.2",
    MD5 => md5 => "1.2.840.113549.2.5",
    SHA1 => sha1 => "1.3.14.3.2.26",
    SHA256 => sha256 => "2.16.840.1.101.3.4.2.1",
    SHA384 => sha384 => "2.16.840.1.101.3.4.2.2",
    SHA512 => sha512 => "2.16.840.1.101.3.4.2.3",
    SHA224 => sha224 => "2.16.840.1.101.3.4.2.4",
    SHA512_224 => sha512_224 => "2.16.840.1.101.3.4.2.5",
    SHA512_256 => sha512_256 => "2.16.840.1.101.3.4.2.6",

    // key algorithms
    DH => dh => "1.2.840.113549.1.3.1",
    DH_PKIX => dh_pkix => "1.2.840.10046.2.1",
    DSA => dsa => "1.2.840.10040.4.1",
    DSA_OIW => dsa_oiw => "1.3.14.3.2.12",
    EC_PUBLIC_KEY => ec_public_key => "1.2.840.10045.2.1",
    ECDH => ecdh => "1.3.132.1.12",
    RSA => rsa => "2.5.8.1.1",
    RSA_ENCRYPTION => rsa_encryption => "1.2.840.113549.1.1.1",
    RSAES_OAEP => rsaes_oaep => "1.2.840.113549.1.1.7",
    MGF1 => mgf1 => "1.2.840.113549.1.1.8",
    RSASSA_PSS => rsassa_pss => "1.2.840.113549.1.1.10",
    AES => aes => "2.16.840.1.101.3.4.1",

    // named curves
    SECP256R1 => secp256r1 => "1.2.840.10045.3.1.7",
    SECP384R1 => secp384r1 => "1.3.132.0.34",
    SECP521R1 => secp521r1 => "1.3.132.0.35",

    // RSA signatures
    MD2_WITH_RSA_ENCRYPTION => md2_with_rsa_encryption => "1.2.840.113549.1.1.2",
    MD5_WITH_RSA_ENCRYPTION => md5_with_rsa_encryption => "1.2.840.113549.1.1.4",
    SHA1_WITH_RSA_ENCRYPTION => sha1_with_rsa_encryption => "1.2.840.113549.1.1.5",
    SHA1_WITH_RSA_ENCRYPTION_OIW => sha1_with_rsa_encryption_oiw => "1.3.14.3.2.29",
    SHA256_WITH_RSA_ENCRYPTION => sha256_with_rsa_encryption => "1.2.840.113549.1.1.11",
    SHA384_WITH_RSA_ENCRYPTION => sha384_with_rsa_encryption => "1.2.840.113549.1.1.12",
    SHA512_WITH_RSA_ENCRYPTION => sha512_with_rsa_encryption => "1.2.840.113549.1.1.13",
    SHA224_WITH_RSA_ENCRYPTION => sha224_with_rsa_encryption => "1.2.840.113549.1.1.14",
    SHA512_224_WITH_RSA_ENCRYPTION => sha512_224_with_rsa_encryption => "1.2.840.113549.1.1.15",
    SHA512_256_WITH_RSA_ENCRYPTION => sha512_256_with_rsa_encryption => "1.2.840.113549.1.1.16",

    // DSA signatures
    SHA_WITH_DSA_OIW => sha_with_dsa_oiw => "1.3.14.3.2.13",
    SHA1_WITH_DSA_OIW => sha1_with_dsa_oiw => "1.3.14.3.2.27",
    SHA1_WITH_DSA => sha1_with_dsa => "1.2.840.10040.4.3",
    SHA224_WITH_DSA => sha224_with_dsa => "2.16.840.1.101.3.4.3.1",
    SHA256_WITH_DSA => sha256_with_dsa => "2.16.840.1.101.3.4.3.2",

    // ECDSA signatures
    ECDSA_WITH_SHA1 => ecdsa_with_sha1 => "1.2.840.10045.4.1",
    ECDSA_WITH_SPECIFIED => ecdsa_with_specified => "1.2.840.10045.4.3",
    ECDSA_WITH_SHA224 => ecdsa_with_sha224 => "1.2.840.10045.4.3.1",
    ECDSA_WITH_SHA256 => ecdsa_with_sha256 => "1.2.840.10045.4.3.2",
    ECDSA_WITH_SHA384 => ecdsa_with_sha384 => "1.2.840.10045.4.3.3",
    ECDSA_WITH_SHA512 => ecdsa_with_sha512 => "1.2.840.10045.4.3.4",

    // PKCS#5 / PKCS#12 password based encryption
    PBE_WITH_MD5_AND_DES => pbe_with_md5_and_des => "1.2.840.113549.1.5.3",
    PBE_WITH_MD5_AND_RC2 => pbe_with_md5_and_rc2 => "1.2.840.113549.1.5.6",
    PBE_WITH_SHA1_AND_DES => pbe_with_sha1_and_des => "1.2.840.113549.1.5.10",
    PBE_WITH_SHA1_AND_RC2 => pbe_with_sha1_and_rc2 => "1.2.840.113549.1.5.11",
    PBE_WITH_SHA1_AND_DESEDE => pbe_with_sha1_and_desede => "1.2.840.113549.1.12.1.3",
    PBE_WITH_SHA1_AND_RC2_40 => pbe_with_sha1_and_rc2_40 => "1.2.840.113549.1.12.1.6",

    // attribute types
    AT_COMMON_NAME => at_common_name => "2.5.4.3",
    AT_SURNAME => at_surname => "2.5.4.4",
    AT_SERIAL_NUMBER => at_serial_number => "2.5.4.5",
    AT_COUNTRY_NAME => at_country_name => "2.5.4.6",
    AT_LOCALITY_NAME => at_locality_name => "2.5.4.7",
    AT_STATE_OR_PROVINCE_NAME => at_state_or_province_name => "2.5.4.8",
    AT_STREET_NAME => at_street_name => "2.5.4.9",
    AT_ORGANIZATION_NAME => at_organization_name => "2.5.4.10",
    AT_ORGANIZATIONAL_UNIT_NAME => at_organizational_unit_name => "2.5.4.11",
    AT_DOMAIN_COMPONENT => at_domain_component => "0.9.2342.19200300.100.1.25",
    AT_USER_ID => at_user_id => "0.9.2342.19200300.100.1.1",
    EMAIL_ADDRESS => email_address => "1.2.840.113549.1.9.1", // deprecated

    // certificate and CRL extensions
    SUBJECT_KEY_IDENTIFIER => subject_key_identifier => "2.5.29.14",
    KEY_USAGE => key_usage => "2.5.29.15",
    PRIVATE_KEY_USAGE_PERIOD => private_key_usage_period => "2.5.29.16",
    SUBJECT_ALTERNATIVE_NAME => subject_alternative_name => "2.5.29.17",
    ISSUER_ALTERNATIVE_NAME => issuer_alternative_name => "2.5.29.18",
    BASIC_CONSTRAINTS => basic_constraints => "2.5.29.19",
    CRL_NUMBER => crl_number => "2.5.29.20",
    CRL_REASON_CODE => crl_reason_code => "2.5.29.21",
    INVALIDITY_DATE => invalidity_date => "2.5.29.24",
    DELTA_CRL_INDICATOR => delta_crl_indicator => "2.5.29.27",
    ISSUING_DISTRIBUTION_POINT => issuing_distribution_point => "2.5.29.28",
    CERTIFICATE_ISSUER => certificate_issuer => "2.5.29.29",
    NAME_CONSTRAINTS => name_constraints => "2.5.29.30",
    CRL_DISTRIBUTION_POINTS => crl_distribution_points => "2.5.29.31",
    CERTIFICATE_POLICIES => certificate_policies => "2.5.29.32",
    POLICY_MAPPINGS => policy_mappings => "2.5.29.33",
    AUTHORITY_KEY_IDENTIFIER => authority_key_identifier => "2.5.29.35",
    POLICY_CONSTRAINTS => policy_constraints => "2.5.29.36",
    EXTENDED_KEY_USAGE => extended_key_usage => "2.5.29.37",
    FRESHEST_CRL => freshest_crl => "2.5.29.46",
    INHIBIT_ANY_POLICY => inhibit_any_policy => "2.5.29.54",
    AUTHORITY_INFO_ACCESS => authority_info_access => "1.3.6.1.5.5.7.1.1",
    SUBJECT_INFO_ACCESS => subject_info_access => "1.3.6.1.5.5.7.1.11",
    NETSCAPE_CERT_TYPE => netscape_cert_type => "2.16.840.1.113730.1.1",

    // extended key purposes
    KP_SERVER_AUTH => kp_server_auth => "1.3.6.1.5.5.7.3.1",
    KP_CLIENT_AUTH => kp_client_auth => "1.3.6.1.5.5.7.3.2",
    KP_CODE_SIGNING => kp_code_signing => "1.3.6.1.5.5.7.3.3",
    KP_OCSP_SIGNING => kp_ocsp_signing => "1.3.6.1.5.5.7.3.9",
    KP_ANY_EXTENDED_KEY_USAGE => kp_any_extended_key_usage => "2.5.29.37.0",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_parse_their_literal() {
        assert_eq!(Into::<String>::into(&sha256_with_rsa_encryption()), SHA256_WITH_RSA_ENCRYPTION);
        assert_eq!(Into::<String>::into(&at_domain_component()), AT_DOMAIN_COMPONENT);
        assert_eq!(Into::<String>::into(&rsa()), RSA);
    }
}
