use crate::config::PkixConfig;
use crate::key::{PrivateKey, PublicKey};
use crate::pem::{parse_pem, Pem, PemError};
use crate::signature::{DefaultSignatureProvider, SignatureError, SignatureProvider};
use crate::x509::certificate::X509CertImpl;
use crate::x509::revocation::{index_entries, IssuerSerial, RevokedEntries};
use crate::x509::verification::{VerificationCache, VerificationState};
use crate::x509::{hash_code, hex_dump};
use chrono::{DateTime, Utc};
use num_bigint_dig::BigInt;
use pkix_asn1_der::{Asn1DerError, DerEncode, DerInputStream, DerOutputStream, DerValue, Tag};
use pkix_asn1_x509::validity::{parse_time, put_time};
use pkix_asn1_x509::{
    extension, oids, AlgorithmId, CrlReason, Extensions, GeneralName, ObjectIdentifier, SerialNumber, X500Principal,
};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

const CRL_PEM_LABEL: &str = "X509 CRL";

#[derive(Debug, Error)]
pub enum CrlError {
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

    /// structurally invalid CRL
    #[error("{0}")]
    Parsing(String),

    /// CRL is read-only
    #[error("cannot over-write existing CRL")]
    ReadOnly,

    /// signature did not verify
    #[error("Signature does not match.")]
    SignatureMismatch,

    /// signature error
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// invalid PEM label error
    #[error("invalid PEM label: {label}")]
    InvalidPemLabel { label: String },

    /// PEM error
    #[error(transparent)]
    Pem(#[from] PemError),

    /// operation needs a signed CRL
    #[error("Uninitialized CRL")]
    NotSigned,
}

fn invalid(msg: impl Into<String>) -> CrlError {
    CrlError::Parsing(msg.into())
}

fn deser(element: &'static str) -> impl FnOnce(Asn1DerError) -> CrlError {
    move |source| CrlError::Asn1Deserialization { element, source }
}

fn ser(element: &'static str) -> impl FnOnce(Asn1DerError) -> CrlError {
    move |source| CrlError::Asn1Serialization { element, source }
}

fn is_time(tag: Tag) -> bool {
    tag == Tag::UTC_TIME || tag == Tag::GENERALIZED_TIME
}

/// Extension value wrapped in an OCTET STRING; `oid` is tried as an alias first.
fn wrapped_extension_value(extensions: Option<&Extensions>, oid: &str) -> Option<Vec<u8>> {
    ObjectIdentifier::try_from(oid).ok()?;
    let extensions = extensions?;
    let extension = match extension::alias_of(oid) {
        Some(alias) => extensions.get(alias),
        None => extensions.iter().find(|extension| extension.oid_string() == oid),
    }?;

    let mut out = DerOutputStream::new();
    out.put_octet_string(extension.value());
    Some(out.into_bytes())
}

/// ```not_rust
/// revokedCertificates     SEQUENCE OF SEQUENCE  {
///      userCertificate         CertificateSerialNumber,
///      revocationDate          Time,
///      crlEntryExtensions      Extensions OPTIONAL
///                               -- if present, version MUST be v2
/// }  OPTIONAL,
/// ```
#[derive(Debug, Clone)]
pub struct X509CRLEntry {
    serial_number: SerialNumber,
    revocation_date: DateTime<Utc>,
    extensions: Option<Extensions>,
    certificate_issuer: Option<X500Principal>,
    raw: Option<Vec<u8>>,
}

impl X509CRLEntry {
    pub fn new(serial_number: SerialNumber, revocation_date: DateTime<Utc>, extensions: Option<Extensions>) -> Self {
        Self {
            serial_number,
            revocation_date,
            extensions,
            certificate_issuer: None,
            raw: None,
        }
    }

    pub fn parse(value: &DerValue, lenient_serial_numbers: bool) -> Result<Self, CrlError> {
        if value.tag() != Tag::SEQUENCE {
            return Err(invalid("Invalid encoded RevokedCertificate, starting sequence tag missing."));
        }

        let mut data = value.data();
        let serial = data.get_der_value().map_err(deser("revoked serial number"))?;
        let serial_number = SerialNumber::parse(&serial, lenient_serial_numbers).map_err(deser("revoked serial number"))?;

        let date = data.get_der_value().map_err(deser("revocation date"))?;
        if !is_time(date.tag()) {
            return Err(invalid("Invalid encoding for revocation date"));
        }
        let revocation_date = parse_time(&date).map_err(deser("revocation date"))?;

        let extensions = if data.available() == 0 {
            None
        } else {
            let value = data.get_der_value().map_err(deser("crl entry extensions"))?;
            Some(Extensions::parse(&value).map_err(deser("crl entry extensions"))?)
        };

        Ok(Self {
            serial_number,
            revocation_date,
            extensions,
            certificate_issuer: None,
            raw: Some(value.to_byte_array()),
        })
    }

    pub fn encode(&self, out: &mut DerOutputStream) -> Result<(), CrlError> {
        if let Some(raw) = &self.raw {
            out.write_raw(raw);
            return Ok(());
        }

        let mut content = DerOutputStream::new();
        self.serial_number
            .encode_der(&mut content)
            .map_err(ser("revoked serial number"))?;
        put_time(&mut content, &self.revocation_date);
        if let Some(extensions) = &self.extensions {
            extensions.encode(&mut content).map_err(ser("crl entry extensions"))?;
        }
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(())
    }

    pub fn encoded(&self) -> Result<Vec<u8>, CrlError> {
        let mut out = DerOutputStream::new();
        self.encode(&mut out)?;
        Ok(out.into_bytes())
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn revocation_date(&self) -> DateTime<Utc> {
        self.revocation_date
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    pub fn has_extensions(&self) -> bool {
        self.extensions.as_ref().map_or(false, |extensions| !extensions.is_empty())
    }

    /// Value of the `CRLReasonCode` extension.
    pub fn reason_code(&self) -> Option<CrlReason> {
        let extension = self.extensions.as_ref()?.get(oids::CRL_REASON_CODE)?;
        CrlReason::from_der(extension.value()).ok()
    }

    pub fn invalidity_date(&self) -> Option<DateTime<Utc>> {
        let extension = self.extensions.as_ref()?.get(oids::INVALIDITY_DATE)?;
        extension.decoded_value().ok()?.get_generalized_time().ok()
    }

    /// Issuer of the revoked certificate in an indirect CRL, `None` when it
    /// is the CRL issuer.
    pub fn certificate_issuer(&self) -> Option<&X500Principal> {
        self.certificate_issuer.as_ref()
    }

    /// First directory name of the `CertificateIssuer` extension.
    pub fn certificate_issuer_extension(&self) -> Option<X500Principal> {
        let extension = self.extensions.as_ref()?.get(oids::CERTIFICATE_ISSUER)?;
        GeneralName::parse_all(extension.value())
            .ok()?
            .into_iter()
            .find_map(|name| match name {
                GeneralName::DirectoryName(principal) => Some(principal),
                _ => None,
            })
    }

    pub(crate) fn set_certificate_issuer(&mut self, crl_issuer: &X500Principal, certificate_issuer: &X500Principal) {
        self.certificate_issuer = (crl_issuer != certificate_issuer).then(|| certificate_issuer.clone());
    }

    pub fn extension_value(&self, oid: &str) -> Option<Vec<u8>> {
        wrapped_extension_value(self.extensions.as_ref(), oid)
    }

    pub fn critical_extension_oids(&self) -> Option<BTreeSet<String>> {
        self.extensions.as_ref().map(Extensions::critical_oids)
    }

    pub fn non_critical_extension_oids(&self) -> Option<BTreeSet<String>> {
        self.extensions.as_ref().map(Extensions::non_critical_oids)
    }

    pub fn has_unsupported_critical_extension(&self) -> bool {
        self.extensions
            .as_ref()
            .map_or(false, Extensions::has_unsupported_critical_extension)
    }
}

impl PartialEq for X509CRLEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self.encoded(), other.encoded()) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl fmt::Display for X509CRLEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  On: {}", self.serial_number, self.revocation_date)?;
        if let Some(issuer) = &self.certificate_issuer {
            write!(f, "\n    Certificate issuer: {issuer}")?;
        }
        if let Some(extensions) = &self.extensions {
            write!(f, "\n    CRL Entry Extensions: {}", extensions.len())?;
            for (i, extension) in extensions.iter().enumerate() {
                write!(f, "\n    [{}]: ", i + 1)?;
                match extension.oid_string().as_str() {
                    oids::CRL_REASON_CODE => match self.reason_code() {
                        Some(reason) => write!(f, "Reason Code: {reason}")?,
                        None => write!(f, "{extension}")?,
                    },
                    _ => write!(f, "{extension}")?,
                }
            }
        }
        Ok(())
    }
}

/// Certificate revocation list.
///
/// ```not_rust
/// CertificateList  ::=  SEQUENCE  {
///      tbsCertList          TBSCertList,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
///
/// TBSCertList  ::=  SEQUENCE  {
///      version                 Version OPTIONAL,
///                                   -- if present, MUST be v2
///      signature               AlgorithmIdentifier,
///      issuer                  Name,
///      thisUpdate              Time,
///      nextUpdate              Time OPTIONAL,
///      revokedCertificates     SEQUENCE OF SEQUENCE  { ... }  OPTIONAL,
///      crlExtensions           [0]  EXPLICIT Extensions OPTIONAL
///                                   -- if present, version MUST be v2
///      }
/// ```
///
/// Revoked entries are keyed by issuer and serial number, the issuer being
/// chosen by the configured [`RevocationIndex`](crate::x509::RevocationIndex).
#[derive(Debug, Clone)]
pub struct X509CRLImpl {
    version: i32,
    info_algorithm: Option<AlgorithmId>,
    issuer: X500Principal,
    this_update: DateTime<Utc>,
    next_update: Option<DateTime<Utc>>,
    revoked: RevokedEntries,
    extensions: Option<Extensions>,
    algorithm: Option<AlgorithmId>,
    signature: Option<Vec<u8>>,
    tbs_cert_list: Option<Vec<u8>>,
    signed_crl: Option<Vec<u8>>,
    read_only: bool,
    verification: VerificationCache,
}

impl X509CRLImpl {
    /// Unsigned CRL; v2 when it carries CRL or entry extensions.
    pub fn new(
        issuer: X500Principal,
        this_update: DateTime<Utc>,
        next_update: Option<DateTime<Utc>>,
        entries: Vec<X509CRLEntry>,
        extensions: Option<Extensions>,
    ) -> Self {
        Self::new_with_config(issuer, this_update, next_update, entries, extensions, PkixConfig::global())
    }

    pub fn new_with_config(
        issuer: X500Principal,
        this_update: DateTime<Utc>,
        next_update: Option<DateTime<Utc>>,
        entries: Vec<X509CRLEntry>,
        extensions: Option<Extensions>,
        config: &PkixConfig,
    ) -> Self {
        let version = i32::from(extensions.is_some() || entries.iter().any(X509CRLEntry::has_extensions));
        let revoked = index_entries(config.revocation_index.index(), &issuer, entries);

        Self {
            version,
            info_algorithm: None,
            issuer,
            this_update,
            next_update,
            revoked,
            extensions,
            algorithm: None,
            signature: None,
            tbs_cert_list: None,
            signed_crl: None,
            read_only: false,
            verification: VerificationCache::new(config.verification_cache),
        }
    }

    pub fn from_der<T: ?Sized + AsRef<[u8]>>(der: &T) -> Result<Self, CrlError> {
        Self::from_der_with_config(der, PkixConfig::global())
    }

    pub fn from_der_with_config<T: ?Sized + AsRef<[u8]>>(der: &T, config: &PkixConfig) -> Result<Self, CrlError> {
        let value = DerValue::from_der(der.as_ref()).map_err(deser("crl"))?;
        Self::parse_with_config(&value, config)
    }

    pub fn parse(value: &DerValue) -> Result<Self, CrlError> {
        Self::parse_with_config(value, PkixConfig::global())
    }

    pub fn parse_with_config(value: &DerValue, config: &PkixConfig) -> Result<Self, CrlError> {
        if value.tag() != Tag::SEQUENCE {
            return Err(invalid("Invalid DER-encoded CRL data"));
        }

        let mut data = value.data();
        let tbs = data.get_der_value().map_err(deser("tbs cert list"))?;
        let algorithm = data.get_der_value().map_err(deser("signature algorithm"))?;
        let signature = data.get_der_value().map_err(deser("signature"))?;
        if data.available() != 0 {
            return Err(invalid(format!("signed overrun, bytes = {}", data.available())));
        }

        if tbs.tag() != Tag::SEQUENCE {
            return Err(invalid("signed CRL fields invalid"));
        }

        let algorithm = AlgorithmId::parse(&algorithm).map_err(deser("signature algorithm"))?;
        let signature = signature.get_bit_string().map_err(deser("signature"))?;

        let mut tbs_data = tbs.data();
        let mut version = 0;
        if tbs_data.peek_tag().map_err(deser("version"))? == Tag::INTEGER {
            version = tbs_data.get_integer().map_err(deser("version"))?;
            if version != 1 {
                return Err(invalid("Invalid version"));
            }
        }

        let info_algorithm = tbs_data.get_der_value().map_err(deser("algorithm"))?;
        let info_algorithm = AlgorithmId::parse(&info_algorithm).map_err(deser("algorithm"))?;
        if info_algorithm != algorithm {
            return Err(invalid("Signature algorithm mismatch"));
        }

        let issuer = tbs_data.get_der_value().map_err(deser("issuer"))?;
        let issuer = X500Principal::parse(&issuer).map_err(deser("issuer"))?;
        if issuer.is_empty() {
            return Err(invalid("Empty issuer DN not allowed in X509CRLs"));
        }

        let tag = tbs_data.peek_tag().map_err(deser("thisUpdate"))?;
        if !is_time(tag) {
            return Err(invalid(format!("Invalid encoding for thisUpdate (tag={})", tag.inner())));
        }
        let this_update = parse_time(&tbs_data.get_der_value().map_err(deser("thisUpdate"))?)
            .map_err(deser("thisUpdate"))?;

        let mut next_update = None;
        if tbs_data.available() > 0 && is_time(tbs_data.peek_tag().map_err(deser("nextUpdate"))?) {
            next_update = Some(
                parse_time(&tbs_data.get_der_value().map_err(deser("nextUpdate"))?).map_err(deser("nextUpdate"))?,
            );
        }

        let mut entries = Vec::new();
        if tbs_data.available() > 0 && tbs_data.peek_tag().map_err(deser("revoked certificates"))? == Tag::SEQUENCE {
            for entry in tbs_data.get_sequence(4).map_err(deser("revoked certificates"))? {
                entries.push(X509CRLEntry::parse(&entry, config.lenient_serial_numbers)?);
            }
        }

        let mut extensions = None;
        if tbs_data.available() > 0 {
            let tmp = tbs_data.get_der_value().map_err(deser("crl extensions"))?;
            if !tmp.is_constructed() || !tmp.is_context_specific_tag(0) {
                return Err(invalid(format!("Invalid CRL extensions (tag={})", tmp.tag().inner())));
            }
            extensions = Some(Extensions::parse_explicit(&tmp, 0).map_err(deser("crl extensions"))?);
        }
        if tbs_data.available() != 0 {
            return Err(invalid(format!("tbs overrun, bytes = {}", tbs_data.available())));
        }

        log::debug!("parsed CRL v{} from {issuer} with {} entries", version + 1, entries.len());

        let revoked = index_entries(config.revocation_index.index(), &issuer, entries);

        Ok(Self {
            version,
            info_algorithm: Some(info_algorithm),
            issuer,
            this_update,
            next_update,
            revoked,
            extensions,
            algorithm: Some(algorithm),
            signature: Some(signature),
            tbs_cert_list: Some(tbs.to_byte_array()),
            signed_crl: Some(value.to_byte_array()),
            read_only: true,
            verification: VerificationCache::new(config.verification_cache),
        })
    }

    pub fn from_pem(pem: &Pem) -> Result<Self, CrlError> {
        match pem.label() {
            CRL_PEM_LABEL => Self::from_der(pem.data()),
            _ => Err(CrlError::InvalidPemLabel {
                label: pem.label().to_owned(),
            }),
        }
    }

    pub fn from_pem_str(pem_str: &str) -> Result<Self, CrlError> {
        let pem = parse_pem(pem_str)?;
        Self::from_pem(&pem)
    }

    pub fn to_pem(&self) -> Result<Pem<'static>, CrlError> {
        Ok(Pem::new(CRL_PEM_LABEL, self.encoded()?))
    }

    pub fn encoded(&self) -> Result<Vec<u8>, CrlError> {
        self.signed_crl.clone().ok_or(CrlError::NotSigned)
    }

    pub fn verify(&self, key: &PublicKey) -> Result<(), CrlError> {
        self.verify_with_provider(key, &DefaultSignatureProvider)
    }

    /// Checks the signature with `key`, remembering the outcome for the
    /// `(key, provider)` pair.
    pub fn verify_with_provider(&self, key: &PublicKey, provider: &dyn SignatureProvider) -> Result<(), CrlError> {
        let (Some(algorithm), Some(signature), Some(tbs)) = (&self.algorithm, &self.signature, &self.tbs_cert_list)
        else {
            return Err(CrlError::NotSigned);
        };

        if self.verification.verify(key, provider, algorithm, tbs, signature)? {
            Ok(())
        } else {
            log::debug!("CRL signature mismatch ({})", algorithm.name());
            Err(CrlError::SignatureMismatch)
        }
    }

    pub fn verification_state(&self) -> VerificationState {
        self.verification.state()
    }

    pub fn sign(&mut self, key: &PrivateKey, algorithm: &str) -> Result<(), CrlError> {
        self.sign_with_provider(key, algorithm, &DefaultSignatureProvider)
    }

    pub fn sign_with_provider(
        &mut self,
        key: &PrivateKey,
        algorithm: &str,
        provider: &dyn SignatureProvider,
    ) -> Result<(), CrlError> {
        if self.read_only {
            return Err(CrlError::ReadOnly);
        }

        let mut signer = provider.get_instance(algorithm)?;
        signer.init_sign(key)?;
        let algorithm_id = AlgorithmId::get(signer.algorithm()).ok_or_else(|| SignatureError::NoSuchAlgorithm {
            algorithm: algorithm.to_owned(),
        })?;

        self.info_algorithm = Some(algorithm_id.clone());
        let tbs = self.encode_info()?;
        signer.update(&tbs)?;
        let signature = signer.sign()?;

        let mut content = DerOutputStream::new();
        content.write_raw(&tbs);
        algorithm_id
            .encode(&mut content)
            .map_err(ser("signature algorithm"))?;
        content.put_bit_string(&signature);

        let mut out = DerOutputStream::new();
        out.write_stream(Tag::SEQUENCE, &content);

        self.algorithm = Some(algorithm_id);
        self.signature = Some(signature);
        self.tbs_cert_list = Some(tbs);
        self.signed_crl = Some(out.into_bytes());
        self.read_only = true;
        self.verification.reset();

        Ok(())
    }

    fn encode_info(&self) -> Result<Vec<u8>, CrlError> {
        let mut content = DerOutputStream::new();
        if self.version != 0 {
            content.put_integer(self.version);
        }
        self.info_algorithm
            .as_ref()
            .ok_or_else(|| invalid("Uninitialized CRL algorithm"))?
            .encode(&mut content)
            .map_err(ser("algorithm"))?;
        if self.version == 0 && self.issuer.is_empty() {
            return Err(invalid("Null Issuer DN not allowed in v1 CRL"));
        }
        self.issuer.encode_der(&mut content).map_err(ser("issuer"))?;
        put_time(&mut content, &self.this_update);
        if let Some(next_update) = &self.next_update {
            put_time(&mut content, next_update);
        }

        if !self.revoked.is_empty() {
            let mut entries = DerOutputStream::new();
            for entry in self.revoked.listed() {
                entry.encode(&mut entries)?;
            }
            content.write_stream(Tag::SEQUENCE, &entries);
        }

        if let Some(extensions) = &self.extensions {
            extensions
                .encode_explicit(&mut content, 0)
                .map_err(ser("crl extensions"))?;
        }

        let mut out = DerOutputStream::new();
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(out.into_bytes())
    }

    /// `true` if the certificate's issuer and serial number are listed.
    pub fn is_revoked(&self, cert: &X509CertImpl) -> bool {
        if self.revoked.is_empty() {
            return false;
        }
        IssuerSerial::of(cert).map_or(false, |key| self.revoked.contains(&key))
    }

    /// Entry for `serial` issued by the CRL issuer.
    pub fn revoked_certificate(&self, serial: &BigInt) -> Option<&X509CRLEntry> {
        if self.revoked.is_empty() {
            return None;
        }
        self.revoked.get(&IssuerSerial::new(self.issuer.clone(), serial.clone()))
    }

    pub fn revoked_certificate_for(&self, cert: &X509CertImpl) -> Option<&X509CRLEntry> {
        if self.revoked.is_empty() {
            return None;
        }
        self.revoked.get(&IssuerSerial::of(cert)?)
    }

    /// Entries ordered by issuer, then serial number.
    pub fn revoked_certificates(&self) -> impl Iterator<Item = &X509CRLEntry> {
        self.revoked.values()
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }

    /// Version number, 1 for v1.
    pub fn version(&self) -> i32 {
        self.version + 1
    }

    pub fn issuer_dn(&self) -> &X500Principal {
        &self.issuer
    }

    /// Extracts the issuer name of an encoded CRL without parsing the rest.
    pub fn issuer_x500_principal_of(encoded: &[u8]) -> Result<X500Principal, CrlError> {
        let value = DerValue::from_der(encoded).map_err(deser("crl"))?;
        let tbs = value.data().get_der_value().map_err(deser("tbs cert list"))?;
        let mut data: DerInputStream = tbs.data();

        if data.peek_tag().map_err(deser("version"))? == Tag::INTEGER {
            data.get_integer().map_err(deser("version"))?;
        }
        data.get_der_value().map_err(deser("algorithm"))?;
        let issuer = data.get_der_value().map_err(deser("issuer"))?;
        X500Principal::parse(&issuer).map_err(deser("issuer"))
    }

    pub fn this_update(&self) -> DateTime<Utc> {
        self.this_update
    }

    pub fn next_update(&self) -> Option<DateTime<Utc>> {
        self.next_update
    }

    pub fn tbs_cert_list(&self) -> Result<Vec<u8>, CrlError> {
        self.tbs_cert_list.clone().ok_or(CrlError::NotSigned)
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

    pub fn sig_alg_params(&self) -> Option<Vec<u8>> {
        self.algorithm.as_ref().and_then(AlgorithmId::encoded_params)
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    /// Value of the `CRLNumber` extension.
    pub fn crl_number(&self) -> Option<BigInt> {
        let extension = self.extensions.as_ref()?.get(oids::CRL_NUMBER)?;
        extension.decoded_value().ok()?.get_big_integer().ok()
    }

    pub fn extension_value(&self, oid: &str) -> Option<Vec<u8>> {
        wrapped_extension_value(self.extensions.as_ref(), oid)
    }

    pub fn critical_extension_oids(&self) -> Option<BTreeSet<String>> {
        self.extensions.as_ref().map(Extensions::critical_oids)
    }

    pub fn non_critical_extension_oids(&self) -> Option<BTreeSet<String>> {
        self.extensions.as_ref().map(Extensions::non_critical_oids)
    }

    pub fn has_unsupported_critical_extension(&self) -> bool {
        self.extensions
            .as_ref()
            .map_or(false, Extensions::has_unsupported_critical_extension)
    }

    pub fn hash_code(&self) -> i32 {
        self.signed_crl.as_deref().map_or(0, hash_code)
    }
}

impl PartialEq for X509CRLImpl {
    fn eq(&self, other: &Self) -> bool {
        match (&self.signed_crl, &other.signed_crl) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => std::ptr::eq(self, other),
        }
    }
}

impl Eq for X509CRLImpl {}

impl Hash for X509CRLImpl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.signed_crl.hash(state);
    }
}

impl fmt::Display for X509CRLImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "X.509 CRL v{}", self.version + 1)?;
        if let Some(algorithm) = &self.algorithm {
            writeln!(
                f,
                "Signature Algorithm: {}, OID={}",
                algorithm.name(),
                algorithm.oid_string()
            )?;
        }
        writeln!(f, "Issuer: {}", self.issuer)?;
        writeln!(f)?;
        writeln!(f, "This Update: {}", self.this_update)?;
        if let Some(next_update) = &self.next_update {
            writeln!(f, "Next Update: {next_update}")?;
        }

        if self.revoked.is_empty() {
            write!(f, "\nNO certificates have been revoked")?;
        } else {
            write!(f, "\nRevoked Certificates: {}", self.revoked.len())?;
            for (i, entry) in self.revoked.listed().enumerate() {
                write!(f, "\n[{}] {}", i + 1, entry)?;
            }
        }

        if let Some(extensions) = &self.extensions {
            write!(f, "\nCRL Extensions: {}", extensions.len())?;
            for (i, extension) in extensions.iter().enumerate() {
                write!(f, "\n[{}]: {}", i + 1, extension)?;
            }
        }

        if let Some(signature) = &self.signature {
            write!(f, "\nSignature:\n{}", hex_dump(signature))?;
        }
        Ok(())
    }
}
