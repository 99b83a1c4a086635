use crate::config::PkixConfig;
use crate::key::{KeyError, PrivateKey, PublicKey};
use crate::pem::{parse_pem, pem_blocks, Pem, PemError};
use crate::signature::{DefaultSignatureProvider, SignatureError, SignatureProvider};
use crate::x509::attribute::{AttributeError, AttributeValue, CertAttribute, CertInfoAttribute};
use crate::x509::info::X509CertInfo;
use crate::x509::verification::{VerificationCache, VerificationState};
use crate::x509::{hash_code, hex_dump};
use chrono::{DateTime, Utc};
use pkix_asn1_der::{Asn1DerError, DerInputStream, DerOutputStream, DerValue, Tag};
use pkix_asn1_x509::{
    extension, oids, AlgorithmId, BasicConstraints, GeneralName, KeyUsage, ObjectIdentifier, SerialNumber,
    ValidityCheck, X500Principal,
};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use thiserror::Error;

const CERT_PEM_LABEL: &str = "CERTIFICATE";

#[derive(Debug, Error)]
pub enum CertError {
    /// asn1 serialization error
    #[error("(asn1) couldn't serialize {element}: {source}")]
    Asn1Serialization {
        element: &'static str,
        source: Asn1DerError,
    },

    /// asn1 deserialization error
    #[error("(asn1) couldn't deserialize {element}: {source}")]
    Asn1Deserialization {
        element: &'static str,
        source: Asn1DerError,
    },

    /// structurally invalid certificate
    #[error("{0}")]
    Parsing(String),

    /// certificate is read-only
    #[error("cannot over-write existing certificate")]
    ReadOnly,

    /// attribute selection error
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// signature did not verify
    #[error("Signature does not match.")]
    SignatureMismatch,

    /// signature error
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// certificate is not yet valid
    #[error("certificate is not yet valid (not before: {not_before}, now: {now})")]
    CertificateNotYetValid {
        not_before: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// certificate expired
    #[error("certificate expired (not after: {not_after}, now: {now})")]
    CertificateExpired {
        not_after: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// invalid PEM label error
    #[error("invalid PEM label: {label}")]
    InvalidPemLabel { label: String },

    /// PEM error
    #[error(transparent)]
    Pem(#[from] PemError),

    /// key error
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// operation needs a signed certificate
    #[error("Uninitialized certificate")]
    NotSigned,

    /// a mandatory field is missing
    #[error("X.509 certificate is incomplete: {field} missing")]
    IncompleteCertificate { field: &'static str },
}

fn deser(element: &'static str) -> impl FnOnce(Asn1DerError) -> CertError {
    move |source| CertError::Asn1Deserialization { element, source }
}

/// Signed X.509 certificate.
///
/// ```not_rust
/// Certificate  ::=  SEQUENCE  {
///      tbsCertificate       TBSCertificate,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
/// ```
///
/// Parsed certificates are read-only and keep their exact encoding. A
/// certificate built from an [`X509CertInfo`] stays writable until signed.
#[derive(Debug, Clone)]
pub struct X509CertImpl {
    info: X509CertInfo,
    algorithm: Option<AlgorithmId>,
    signature: Option<Vec<u8>>,
    signed_cert: Option<Vec<u8>>,
    read_only: bool,
    verification: VerificationCache,
    issuer_principal: OnceLock<Option<X500Principal>>,
    subject_principal: OnceLock<Option<X500Principal>>,
}

impl X509CertImpl {
    /// Unsigned certificate to be completed with `set` and then `sign`ed.
    pub fn new(info: X509CertInfo) -> Self {
        Self::with_info(info, PkixConfig::global())
    }

    fn with_info(info: X509CertInfo, config: &PkixConfig) -> Self {
        Self {
            info,
            algorithm: None,
            signature: None,
            signed_cert: None,
            read_only: false,
            verification: VerificationCache::new(config.verification_cache),
            issuer_principal: OnceLock::new(),
            subject_principal: OnceLock::new(),
        }
    }

    pub fn from_der<T: ?Sized + AsRef<[u8]>>(der: &T) -> Result<Self, CertError> {
        Self::from_der_with_config(der, PkixConfig::global())
    }

    /// BER input (indefinite lengths) is accepted and normalized to DER.
    pub fn from_der_with_config<T: ?Sized + AsRef<[u8]>>(der: &T, config: &PkixConfig) -> Result<Self, CertError> {
        let value = DerValue::from_der(der.as_ref()).map_err(deser("certificate"))?;
        Self::parse_with_config(&value, config)
    }

    pub fn parse(value: &DerValue) -> Result<Self, CertError> {
        Self::parse_with_config(value, PkixConfig::global())
    }

    pub fn parse_with_config(value: &DerValue, config: &PkixConfig) -> Result<Self, CertError> {
        if value.tag() != Tag::SEQUENCE {
            return Err(CertError::Parsing("invalid DER-encoded certificate data".to_owned()));
        }

        let mut data = value.data();
        let tbs = data.get_der_value().map_err(deser("tbs certificate"))?;
        let algorithm = data.get_der_value().map_err(deser("signature algorithm"))?;
        let signature = data.get_der_value().map_err(deser("signature"))?;

        if data.available() != 0 {
            return Err(CertError::Parsing(format!(
                "signed overrun, bytes = {}",
                data.available()
            )));
        }
        if tbs.tag() != Tag::SEQUENCE {
            return Err(CertError::Parsing("signed fields invalid".to_owned()));
        }

        let algorithm = AlgorithmId::parse(&algorithm).map_err(deser("signature algorithm"))?;
        let signature = signature.get_bit_string().map_err(deser("signature"))?;
        let info = X509CertInfo::parse(&tbs, config.lenient_serial_numbers)?;

        if info.algorithm() != Some(&algorithm) {
            return Err(CertError::Parsing("Signature algorithm mismatch".to_owned()));
        }

        let mut cert = Self::with_info(info, config);
        cert.algorithm = Some(algorithm);
        cert.signature = Some(signature);
        cert.signed_cert = Some(value.to_byte_array());
        cert.read_only = true;

        log::debug!(
            "parsed certificate {} issued by {}",
            cert.info.serial_number().map(SerialNumber::to_hex).unwrap_or_default(),
            cert.info.issuer().map(ToString::to_string).unwrap_or_default(),
        );

        Ok(cert)
    }

    pub fn from_pem(pem: &Pem) -> Result<Self, CertError> {
        match pem.label() {
            CERT_PEM_LABEL => Self::from_der(pem.data()),
            _ => Err(CertError::InvalidPemLabel {
                label: pem.label().to_owned(),
            }),
        }
    }

    pub fn from_pem_str(pem_str: &str) -> Result<Self, CertError> {
        let pem = parse_pem(pem_str)?;
        Self::from_pem(&pem)
    }

    /// Every `CERTIFICATE` block of a bundle; blocks with other labels are skipped.
    pub fn from_pem_bundle(bundle: &str) -> Result<Vec<Self>, CertError> {
        let mut certs = Vec::new();
        for pem in pem_blocks(bundle) {
            let pem = pem?;
            if pem.label() == CERT_PEM_LABEL {
                certs.push(Self::from_der(pem.data())?);
            }
        }
        Ok(certs)
    }

    pub fn to_pem(&self) -> Result<Pem<'static>, CertError> {
        Ok(Pem::new(CERT_PEM_LABEL, self.encoded()?))
    }

    /// DER encoding of the signed certificate.
    pub fn encoded(&self) -> Result<Vec<u8>, CertError> {
        self.signed_cert.clone().ok_or(CertError::NotSigned)
    }

    pub fn info(&self) -> &X509CertInfo {
        &self.info
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn verify(&self, key: &PublicKey) -> Result<(), CertError> {
        self.verify_with_provider(key, &DefaultSignatureProvider)
    }

    /// Checks the signature with `key`.
    ///
    /// The outcome is remembered for the `(key, provider)` pair, so a repeated
    /// call with the same inputs does not recompute the signature.
    pub fn verify_with_provider(&self, key: &PublicKey, provider: &dyn SignatureProvider) -> Result<(), CertError> {
        let (Some(algorithm), Some(signature), Some(_)) = (&self.algorithm, &self.signature, &self.signed_cert) else {
            return Err(CertError::NotSigned);
        };

        let tbs = self.info.encoded_info()?;
        if self.verification.verify(key, provider, algorithm, &tbs, signature)? {
            Ok(())
        } else {
            log::debug!("certificate signature mismatch ({})", algorithm.name());
            Err(CertError::SignatureMismatch)
        }
    }

    pub fn verification_state(&self) -> VerificationState {
        self.verification.state()
    }

    pub fn sign(&mut self, key: &PrivateKey, algorithm: &str) -> Result<(), CertError> {
        self.sign_with_provider(key, algorithm, &DefaultSignatureProvider)
    }

    /// Encodes the info, signs it and makes the certificate read-only.
    pub fn sign_with_provider(
        &mut self,
        key: &PrivateKey,
        algorithm: &str,
        provider: &dyn SignatureProvider,
    ) -> Result<(), CertError> {
        if self.read_only {
            return Err(CertError::ReadOnly);
        }

        let mut signer = provider.get_instance(algorithm)?;
        signer.init_sign(key)?;

        let algorithm_id = AlgorithmId::get(signer.algorithm()).ok_or_else(|| SignatureError::NoSuchAlgorithm {
            algorithm: algorithm.to_owned(),
        })?;

        match self.info.algorithm() {
            None => self.info.set(
                &CertInfoAttribute::AlgorithmId(None),
                AttributeValue::AlgorithmId(algorithm_id.clone()),
            )?,
            Some(existing) if *existing != algorithm_id => {
                return Err(CertError::Parsing("Signature algorithm mismatch".to_owned()))
            }
            Some(_) => {}
        }

        let tbs = self.info.encoded_info()?;
        signer.update(&tbs)?;
        let signature = signer.sign()?;

        let mut content = DerOutputStream::new();
        content.write_raw(&tbs);
        algorithm_id.encode(&mut content).map_err(|source| CertError::Asn1Serialization {
            element: "signature algorithm",
            source,
        })?;
        content.put_bit_string(&signature);

        let mut out = DerOutputStream::new();
        out.write_stream(Tag::SEQUENCE, &content);

        self.info.retain_encoding(tbs);
        self.algorithm = Some(algorithm_id);
        self.signature = Some(signature);
        self.signed_cert = Some(out.into_bytes());
        self.read_only = true;
        self.verification.reset();
        self.issuer_principal = OnceLock::new();
        self.subject_principal = OnceLock::new();

        Ok(())
    }

    pub fn check_validity(&self) -> Result<(), CertError> {
        self.check_validity_at(&Utc::now())
    }

    pub fn check_validity_at(&self, now: &DateTime<Utc>) -> Result<(), CertError> {
        let validity = self
            .info
            .validity()
            .ok_or(CertError::IncompleteCertificate { field: "validity" })?;

        match validity.check(now) {
            ValidityCheck::Valid => Ok(()),
            ValidityCheck::NotYetValid => Err(CertError::CertificateNotYetValid {
                not_before: validity.not_before,
                now: *now,
            }),
            ValidityCheck::Expired => Err(CertError::CertificateExpired {
                not_after: validity.not_after,
                now: *now,
            }),
        }
    }

    /// Version number, 1 for v1.
    pub fn version(&self) -> i32 {
        self.info.version().number()
    }

    pub fn serial_number(&self) -> Option<&SerialNumber> {
        self.info.serial_number()
    }

    pub fn issuer_dn(&self) -> Option<&X500Principal> {
        self.info.issuer()
    }

    pub fn subject_dn(&self) -> Option<&X500Principal> {
        self.info.subject()
    }

    /// Issuer name read from the encoded certificate.
    pub fn issuer_x500_principal(&self) -> Option<X500Principal> {
        self.issuer_principal
            .get_or_init(|| match &self.signed_cert {
                Some(encoded) => Self::issuer_x500_principal_of(encoded).ok(),
                None => self.info.issuer().cloned(),
            })
            .clone()
    }

    /// Subject name read from the encoded certificate.
    pub fn subject_x500_principal(&self) -> Option<X500Principal> {
        self.subject_principal
            .get_or_init(|| match &self.signed_cert {
                Some(encoded) => principals_of(encoded).ok().map(|(_, subject)| subject),
                None => self.info.subject().cloned(),
            })
            .clone()
    }

    /// Extracts the issuer name of an encoded certificate without parsing the rest.
    pub fn issuer_x500_principal_of(encoded: &[u8]) -> Result<X500Principal, CertError> {
        principals_of(encoded).map(|(issuer, _)| issuer)
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.info.validity().map(|validity| validity.not_before)
    }

    pub fn not_after(&self) -> Option<DateTime<Utc>> {
        self.info.validity().map(|validity| validity.not_after)
    }

    /// DER encoded `TBSCertificate`.
    pub fn tbs_certificate(&self) -> Result<Vec<u8>, CertError> {
        self.info.encoded_info()
    }

    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    pub fn sig_alg_name(&self) -> Option<String> {
        self.algorithm.as_ref().map(AlgorithmId::name)
    }

    pub fn sig_alg_oid(&self) -> Option<String> {
        self.algorithm.as_ref().map(AlgorithmId::oid_string)
    }

    /// DER encoded signature algorithm parameters.
    pub fn sig_alg_params(&self) -> Option<Vec<u8>> {
        self.algorithm.as_ref().and_then(AlgorithmId::encoded_params)
    }

    pub fn issuer_unique_id(&self) -> Option<Vec<bool>> {
        self.info.issuer_unique_id().map(|id| id.to_boolean_array())
    }

    pub fn subject_unique_id(&self) -> Option<Vec<bool>> {
        self.info.subject_unique_id().map(|id| id.to_boolean_array())
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.info.key()
    }

    /// KeyUsage bits, padded to the nine named bits.
    pub fn key_usage(&self) -> Option<Vec<bool>> {
        let extension = self.info.extensions()?.get(oids::KEY_USAGE)?;
        KeyUsage::from_der(extension.value())
            .ok()
            .map(|usage| usage.to_boolean_array())
    }

    /// Path length constraint of a CA certificate: -1 for an end entity,
    /// `i32::MAX` when unlimited.
    pub fn basic_constraints(&self) -> i32 {
        let constraints = self
            .info
            .extensions()
            .and_then(|extensions| extensions.get(oids::BASIC_CONSTRAINTS))
            .and_then(|extension| BasicConstraints::from_der(extension.value()).ok());

        match constraints {
            Some(BasicConstraints { ca: true, path_len }) => path_len.unwrap_or(i32::MAX),
            _ => -1,
        }
    }

    pub fn extended_key_usage(&self) -> Option<Vec<String>> {
        let extension = self.info.extensions()?.get(oids::EXTENDED_KEY_USAGE)?;
        let mut data = DerInputStream::new(extension.value()).ok()?;
        data.get_sequence(1)
            .ok()?
            .iter()
            .map(|value| value.get_oid().ok().map(|oid| Into::<String>::into(&oid)))
            .collect()
    }

    pub fn subject_alternative_names(&self) -> Option<Vec<GeneralName>> {
        self.general_names(oids::SUBJECT_ALTERNATIVE_NAME)
    }

    pub fn issuer_alternative_names(&self) -> Option<Vec<GeneralName>> {
        self.general_names(oids::ISSUER_ALTERNATIVE_NAME)
    }

    fn general_names(&self, oid: &str) -> Option<Vec<GeneralName>> {
        let extension = self.info.extensions()?.get(oid)?;
        GeneralName::parse_all(extension.value()).ok()
    }

    /// Extension value wrapped in an OCTET STRING, as in the certificate.
    pub fn extension_value(&self, oid: &str) -> Option<Vec<u8>> {
        ObjectIdentifier::try_from(oid).ok()?;
        let extensions = self.info.extensions()?;
        let extension = match extension::alias_of(oid) {
            Some(alias) => extensions.get(alias),
            None => extensions.iter().find(|extension| extension.oid_string() == oid),
        }?;

        let mut out = DerOutputStream::new();
        out.put_octet_string(extension.value());
        Some(out.into_bytes())
    }

    pub fn critical_extension_oids(&self) -> Option<BTreeSet<String>> {
        self.info.extensions().map(|extensions| extensions.critical_oids())
    }

    pub fn non_critical_extension_oids(&self) -> Option<BTreeSet<String>> {
        self.info.extensions().map(|extensions| extensions.non_critical_oids())
    }

    pub fn has_unsupported_critical_extension(&self) -> bool {
        self.info
            .extensions()
            .map_or(false, |extensions| extensions.has_unsupported_critical_extension())
    }

    pub fn get(&self, attribute: &CertAttribute) -> Option<AttributeValue> {
        match attribute {
            CertAttribute::Info(None) => Some(AttributeValue::Info(Box::new(self.info.clone()))),
            CertAttribute::Info(Some(attribute)) => self.info.get(attribute),
            CertAttribute::Algorithm => self.algorithm.clone().map(AttributeValue::AlgorithmId),
            CertAttribute::Signature => self.signature.clone().map(AttributeValue::Bytes),
            CertAttribute::SignedCert => self.signed_cert.clone().map(AttributeValue::Bytes),
        }
    }

    /// `name` is a dotted attribute name such as `x509.info.subject.dname`.
    pub fn get_by_name(&self, name: &str) -> Result<Option<AttributeValue>, CertError> {
        Ok(self.get(&name.parse()?))
    }

    pub fn set(&mut self, attribute: &CertAttribute, value: AttributeValue) -> Result<(), CertError> {
        if self.read_only {
            return Err(CertError::ReadOnly);
        }

        match (attribute, value) {
            (CertAttribute::Info(None), AttributeValue::Info(info)) => self.info = *info,
            (CertAttribute::Info(Some(attribute)), value) => self.info.set(attribute, value)?,
            (CertAttribute::Algorithm, AttributeValue::AlgorithmId(algorithm)) => self.algorithm = Some(algorithm),
            (CertAttribute::Signature | CertAttribute::SignedCert, _) => {
                return Err(AttributeError::UnknownAttribute {
                    name: attribute.to_string(),
                }
                .into())
            }
            _ => {
                return Err(AttributeError::TypeMismatch {
                    attribute: attribute.to_string(),
                }
                .into())
            }
        }

        self.signed_cert = None;
        Ok(())
    }

    pub fn delete(&mut self, attribute: &CertAttribute) -> Result<(), CertError> {
        if self.read_only {
            return Err(CertError::ReadOnly);
        }

        match attribute {
            CertAttribute::Info(None) => self.info = X509CertInfo::default(),
            CertAttribute::Info(Some(attribute)) => self.info.delete(attribute),
            CertAttribute::Algorithm => self.algorithm = None,
            CertAttribute::Signature => self.signature = None,
            CertAttribute::SignedCert => self.signed_cert = None,
        }

        Ok(())
    }

    /// Sum of the signed encoding bytes weighted by their index, 0 when unsigned.
    pub fn hash_code(&self) -> i32 {
        self.signed_cert.as_deref().map_or(0, hash_code)
    }
}

/// Issuer and subject of an encoded certificate.
fn principals_of(encoded: &[u8]) -> Result<(X500Principal, X500Principal), CertError> {
    let value = DerValue::from_der(encoded).map_err(deser("certificate"))?;
    let tbs = value.data().get_der_value().map_err(deser("tbs certificate"))?;
    let mut data = tbs.data();

    let mut tmp = data.get_der_value().map_err(deser("version"))?;
    if tmp.is_context_specific_tag(0) && tmp.is_constructed() {
        tmp = data.get_der_value().map_err(deser("serial number"))?;
    }
    if tmp.tag() != Tag::INTEGER {
        return Err(CertError::Parsing("invalid DER-encoded certificate data".to_owned()));
    }

    data.get_der_value().map_err(deser("algorithm"))?;
    let issuer = X500Principal::parse(&data.get_der_value().map_err(deser("issuer"))?).map_err(deser("issuer"))?;
    data.get_der_value().map_err(deser("validity"))?;
    let subject = X500Principal::parse(&data.get_der_value().map_err(deser("subject"))?).map_err(deser("subject"))?;

    Ok((issuer, subject))
}

impl PartialEq for X509CertImpl {
    fn eq(&self, other: &Self) -> bool {
        match (&self.signed_cert, &other.signed_cert) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => std::ptr::eq(self, other),
        }
    }
}

impl Eq for X509CertImpl {}

impl Hash for X509CertImpl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signed_cert.hash(state);
    }
}

impl fmt::Display for X509CertImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        writeln!(f, "{}", self.info)?;
        if let (Some(algorithm), Some(signature)) = (&self.algorithm, &self.signature) {
            writeln!(f, "  Algorithm: [{algorithm}]")?;
            writeln!(f, "  Signature:")?;
            writeln!(f, "{}", hex_dump(signature))?;
            writeln!(f)?;
        }
        write!(f, "]")
    }
}
