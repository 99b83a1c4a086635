use crate::oids;
use oid::ObjectIdentifier;
use pkix_asn1_der::{Asn1DerError, DerEncode, DerOutputStream, DerValue, Result, Tag};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

/// Standard algorithm names, canonical OID first when a name has several.
const ALGORITHMS: &[(&str, &str)] = &[
    // digests
    ("MD2", oids::MD2),
    ("MD5", oids::MD5),
    ("SHA-1", oids::SHA1),
    ("SHA-224", oids::SHA224),
    ("SHA-256", oids::SHA256),
    ("SHA-384", oids::SHA384),
    ("SHA-512", oids::SHA512),
    ("SHA-512/224", oids::SHA512_224),
    ("SHA-512/256", oids::SHA512_256),
    // key algorithms
    ("RSA", oids::RSA_ENCRYPTION),
    ("RSA", oids::RSA),
    ("Diffie-Hellman", oids::DH),
    ("Diffie-Hellman", oids::DH_PKIX),
    ("DSA", oids::DSA),
    ("DSA", oids::DSA_OIW),
    ("EC", oids::EC_PUBLIC_KEY),
    ("ECDH", oids::ECDH),
    ("AES", oids::AES),
    ("RSASSA-PSS", oids::RSASSA_PSS),
    ("RSAES-OAEP", oids::RSAES_OAEP),
    ("MGF1", oids::MGF1),
    // signatures
    ("SHA1withECDSA", oids::ECDSA_WITH_SHA1),
    ("SHA224withECDSA", oids::ECDSA_WITH_SHA224),
    ("SHA256withECDSA", oids::ECDSA_WITH_SHA256),
    ("SHA384withECDSA", oids::ECDSA_WITH_SHA384),
    ("SHA512withECDSA", oids::ECDSA_WITH_SHA512),
    ("MD2withRSA", oids::MD2_WITH_RSA_ENCRYPTION),
    ("MD5withRSA", oids::MD5_WITH_RSA_ENCRYPTION),
    ("SHA1withDSA", oids::SHA1_WITH_DSA),
    ("SHA1withDSA", oids::SHA1_WITH_DSA_OIW),
    ("SHA1withDSA", oids::SHA_WITH_DSA_OIW),
    ("SHA224withDSA", oids::SHA224_WITH_DSA),
    ("SHA256withDSA", oids::SHA256_WITH_DSA),
    ("SHA1withRSA", oids::SHA1_WITH_RSA_ENCRYPTION),
    ("SHA1withRSA", oids::SHA1_WITH_RSA_ENCRYPTION_OIW),
    ("SHA224withRSA", oids::SHA224_WITH_RSA_ENCRYPTION),
    ("SHA256withRSA", oids::SHA256_WITH_RSA_ENCRYPTION),
    ("SHA384withRSA", oids::SHA384_WITH_RSA_ENCRYPTION),
    ("SHA512withRSA", oids::SHA512_WITH_RSA_ENCRYPTION),
    ("SHA512/224withRSA", oids::SHA512_224_WITH_RSA_ENCRYPTION),
    ("SHA512/256withRSA", oids::SHA512_256_WITH_RSA_ENCRYPTION),
    // password based encryption
    ("PBEWithMD5AndDES", oids::PBE_WITH_MD5_AND_DES),
    ("PBEWithMD5AndRC2", oids::PBE_WITH_MD5_AND_RC2),
    ("PBEWithSHA1AndDES", oids::PBE_WITH_SHA1_AND_DES),
    ("PBEWithSHA1AndRC2", oids::PBE_WITH_SHA1_AND_RC2),
    ("PBEWithSHA1AndDESede", oids::PBE_WITH_SHA1_AND_DESEDE),
    ("PBEWithSHA1AndRC2_40", oids::PBE_WITH_SHA1_AND_RC2_40),
];

struct Registry {
    names: HashMap<&'static str, &'static str>,
    oids: HashMap<String, &'static str>,
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut names = HashMap::with_capacity(ALGORITHMS.len());
        let mut oids = HashMap::with_capacity(ALGORITHMS.len());
        for (name, oid) in ALGORITHMS {
            names.insert(*oid, *name);
            oids.entry(name.to_ascii_uppercase()).or_insert(*oid);
        }
        Registry { names, oids }
    })
}

/// Parameters field of an `AlgorithmIdentifier`.
///
/// An explicit NULL is kept apart from an absent field so that re-encoding
/// reproduces the original bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlgorithmParams {
    Absent,
    Null,
    Value(DerValue),
}

/// ```not_rust
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm               OBJECT IDENTIFIER,
///      parameters              ANY DEFINED BY algorithm OPTIONAL }
/// ```
#[derive(Debug, Clone)]
pub struct AlgorithmId {
    oid: ObjectIdentifier,
    params: AlgorithmParams,
}

impl AlgorithmId {
    pub fn new(oid: ObjectIdentifier) -> Self {
        Self {
            oid,
            params: AlgorithmParams::Absent,
        }
    }

    pub fn with_null_params(oid: ObjectIdentifier) -> Self {
        Self {
            oid,
            params: AlgorithmParams::Null,
        }
    }

    pub fn with_params(oid: ObjectIdentifier, params: DerValue) -> Self {
        let params = if params.tag() == Tag::NULL && params.length() == 0 {
            AlgorithmParams::Null
        } else {
            AlgorithmParams::Value(params)
        };
        Self { oid, params }
    }

    /// Looks up an algorithm by its standard name (case-insensitive) or by
    /// its dotted OID.
    ///
    /// Digests and PKCS#1 algorithms get explicit NULL parameters, the way
    /// they are conventionally encoded.
    pub fn get(name: &str) -> Option<Self> {
        let oid = match registry().oids.get(&name.to_ascii_uppercase()) {
            Some(oid) => ObjectIdentifier::try_from(*oid).ok()?,
            None if looks_like_oid(name) => ObjectIdentifier::try_from(name).ok()?,
            None => return None,
        };

        if wants_null_params(&Into::<String>::into(&oid)) {
            Some(Self::with_null_params(oid))
        } else {
            Some(Self::new(oid))
        }
    }

    pub fn parse(value: &DerValue) -> Result<Self> {
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("algid parse error, not a sequence".to_owned()));
        }

        let mut data = value.data();
        let oid = data.get_oid()?;

        let params = if data.available() == 0 {
            AlgorithmParams::Absent
        } else {
            let params = data.get_der_value()?;
            if params.tag() == Tag::NULL {
                if params.length() != 0 {
                    return Err(Asn1DerError::InvalidData("invalid NULL".to_owned()));
                }
                AlgorithmParams::Null
            } else {
                AlgorithmParams::Value(params)
            }
        };

        if data.available() != 0 {
            return Err(Asn1DerError::InvalidData(
                "Invalid AlgorithmIdentifier: extra data".to_owned(),
            ));
        }

        Ok(Self { oid, params })
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn oid_string(&self) -> String {
        Into::<String>::into(&self.oid)
    }

    pub fn params(&self) -> &AlgorithmParams {
        &self.params
    }

    /// Standard name of this algorithm, falling back to the dotted OID.
    pub fn name(&self) -> String {
        let dotted = self.oid_string();
        if let Some(name) = registry().names.get(dotted.as_str()) {
            return (*name).to_owned();
        }

        if dotted == oids::ECDSA_WITH_SPECIFIED {
            if let AlgorithmParams::Value(params) = &self.params {
                if let Ok(digest) = AlgorithmId::parse(params) {
                    return make_sig_alg(&digest.name(), "EC");
                }
            }
        }

        dotted
    }

    /// DER encoding of the parameters.
    ///
    /// `None` when there are no parameters, and for the parameterized ECDSA
    /// signature whose parameters only name the digest.
    pub fn encoded_params(&self) -> Option<Vec<u8>> {
        if self.oid_string() == oids::ECDSA_WITH_SPECIFIED {
            return None;
        }
        match &self.params {
            AlgorithmParams::Absent => None,
            AlgorithmParams::Null => Some(vec![Tag::NULL.inner(), 0x00]),
            AlgorithmParams::Value(value) => Some(value.to_byte_array()),
        }
    }

    pub fn encode(&self, out: &mut DerOutputStream) -> Result<()> {
        let mut content = DerOutputStream::new();
        content.put_oid(&self.oid)?;
        match &self.params {
            AlgorithmParams::Absent => {}
            AlgorithmParams::Null => content.put_null(),
            AlgorithmParams::Value(value) => content.put_der_value(value),
        }
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(())
    }

    pub fn encoded(&self) -> Result<Vec<u8>> {
        let mut out = DerOutputStream::new();
        self.encode(&mut out)?;
        Ok(out.into_bytes())
    }
}

impl DerEncode for AlgorithmId {
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()> {
        self.encode(out)
    }
}

impl PartialEq for AlgorithmId {
    fn eq(&self, other: &Self) -> bool {
        self.oid == other.oid && self.params == other.params
    }
}

impl Eq for AlgorithmId {}

impl Hash for AlgorithmId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.oid_string().hash(state);
        self.params.hash(state);
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Builds a `<digest>with<encryption>` signature algorithm name.
///
/// Dashes are removed from the digest name and `EC` becomes `ECDSA`.
pub fn make_sig_alg(digest: &str, encryption: &str) -> String {
    let digest = digest.replace('-', "");
    let encryption = if encryption.eq_ignore_ascii_case("EC") {
        "ECDSA"
    } else {
        encryption
    };
    format!("{digest}with{encryption}")
}

/// `SHA256withRSA` → `SHA256`
pub fn digest_algorithm_of(signature_algorithm: &str) -> Option<String> {
    let index = signature_algorithm.to_ascii_uppercase().find("WITH")?;
    Some(signature_algorithm[..index].to_owned())
}

/// `SHA256withRSA` → `RSA`, `SHA1withRSAandMGF1` → `RSA`
pub fn encryption_algorithm_of(signature_algorithm: &str) -> Option<String> {
    let upper = signature_algorithm.to_ascii_uppercase();
    let start = upper.find("WITH")? + 4;
    let end = upper[start..].find("AND").map_or(upper.len(), |index| start + index);
    if start == end {
        return None;
    }
    Some(signature_algorithm[start..end].to_owned())
}

fn looks_like_oid(name: &str) -> bool {
    name.contains('.') && name.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn wants_null_params(dotted: &str) -> bool {
    match dotted {
        oids::RSASSA_PSS | oids::RSAES_OAEP | oids::MGF1 => false,
        _ => {
            dotted.starts_with("1.2.840.113549.1.1.")
                || dotted.starts_with("1.2.840.113549.2.")
                || dotted.starts_with("2.16.840.1.101.3.4.2.")
                || dotted == oids::SHA1
                || dotted == oids::SHA1_WITH_RSA_ENCRYPTION_OIW
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn null_params_are_preserved() {
        let encoded = hex::decode("300D06092A864886F70D01010B0500").unwrap();
        let algorithm = AlgorithmId::parse(&DerValue::from_der(&encoded).unwrap()).unwrap();
        assert_eq!(algorithm.params(), &AlgorithmParams::Null);
        assert_eq!(algorithm.name(), "SHA256withRSA");
        assert_eq!(algorithm.encoded().unwrap(), encoded);
        assert_eq!(algorithm.encoded_params(), Some(vec![0x05, 0x00]));
    }

    #[test]
    fn absent_params_are_preserved() {
        let encoded = hex::decode("300A06082A8648CE3D040302").unwrap();
        let algorithm = AlgorithmId::parse(&DerValue::from_der(&encoded).unwrap()).unwrap();
        assert_eq!(algorithm.params(), &AlgorithmParams::Absent);
        assert_eq!(algorithm.name(), "SHA256withECDSA");
        assert_eq!(algorithm.encoded().unwrap(), encoded);
        assert_eq!(algorithm.encoded_params(), None);
    }

    #[test]
    fn specified_ecdsa_is_named_after_its_digest() {
        let digest = AlgorithmId::get("SHA-384").unwrap();
        let params = DerValue::from_der(&digest.encoded().unwrap()).unwrap();
        let algorithm = AlgorithmId::with_params(oids::ecdsa_with_specified(), params);

        assert_eq!(algorithm.name(), "SHA384withECDSA");
        assert_eq!(algorithm.encoded_params(), None);
    }

    #[test]
    fn specified_ecdsa_without_params_keeps_dotted_name() {
        let algorithm = AlgorithmId::new(oids::ecdsa_with_specified());
        assert_eq!(algorithm.name(), oids::ECDSA_WITH_SPECIFIED);
    }

    #[test]
    fn unknown_oid_is_named_by_dotted_form() {
        let algorithm = AlgorithmId::new(ObjectIdentifier::try_from("1.2.3.4.5").unwrap());
        assert_eq!(algorithm.name(), "1.2.3.4.5");
        assert_eq!(algorithm.to_string(), "1.2.3.4.5");
    }

    #[rstest]
    #[case("sha256withrsa", oids::SHA256_WITH_RSA_ENCRYPTION)]
    #[case("RSA", oids::RSA_ENCRYPTION)]
    #[case("SHA1withDSA", oids::SHA1_WITH_DSA)]
    #[case("Diffie-Hellman", oids::DH)]
    #[case("sha-512/256", oids::SHA512_256)]
    #[case("1.2.840.10045.4.3.3", oids::ECDSA_WITH_SHA384)]
    fn reverse_lookup(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(AlgorithmId::get(name).unwrap().oid_string(), expected);
    }

    #[test]
    fn reverse_lookup_params_convention() {
        assert_eq!(AlgorithmId::get("SHA256withRSA").unwrap().params(), &AlgorithmParams::Null);
        assert_eq!(AlgorithmId::get("SHA256withECDSA").unwrap().params(), &AlgorithmParams::Absent);
        assert_eq!(AlgorithmId::get("RSASSA-PSS").unwrap().params(), &AlgorithmParams::Absent);
        assert!(AlgorithmId::get("NotAnAlgorithm").is_none());
    }

    #[test]
    fn alternate_oids_share_a_name() {
        let oiw = AlgorithmId::new(oids::sha1_with_rsa_encryption_oiw());
        assert_eq!(oiw.name(), "SHA1withRSA");
        let x500 = AlgorithmId::new(oids::rsa());
        assert_eq!(x500.name(), "RSA");
    }

    #[rstest]
    #[case("SHA-256", "EC", "SHA256withECDSA")]
    #[case("SHA-1", "ec", "SHA1withECDSA")]
    #[case("SHA-512", "RSA", "SHA512withRSA")]
    fn signature_names(#[case] digest: &str, #[case] encryption: &str, #[case] expected: &str) {
        assert_eq!(make_sig_alg(digest, encryption), expected);
    }

    #[test]
    fn signature_name_split() {
        assert_eq!(digest_algorithm_of("SHA256withECDSA").as_deref(), Some("SHA256"));
        assert_eq!(encryption_algorithm_of("SHA256withECDSA").as_deref(), Some("ECDSA"));
        assert_eq!(encryption_algorithm_of("SHA1withRSAandMGF1").as_deref(), Some("RSA"));
        assert_eq!(digest_algorithm_of("RSA"), None);
    }

    #[test]
    fn malformed_identifiers() {
        let not_sequence = DerValue::new(Tag::OCTET_STRING, vec![0x00]);
        assert_eq!(
            AlgorithmId::parse(&not_sequence).unwrap_err().to_string(),
            "invalid data: algid parse error, not a sequence"
        );

        let bad_null = hex::decode("300E06092A864886F70D01010B050100").unwrap();
        assert_eq!(
            AlgorithmId::parse(&DerValue::from_der(&bad_null).unwrap())
                .unwrap_err()
                .to_string(),
            "invalid data: invalid NULL"
        );

        let extra = hex::decode("300F06092A864886F70D01010B05000500").unwrap();
        assert_eq!(
            AlgorithmId::parse(&DerValue::from_der(&extra).unwrap())
                .unwrap_err()
                .to_string(),
            "invalid data: Invalid AlgorithmIdentifier: extra data"
        );
    }
}
