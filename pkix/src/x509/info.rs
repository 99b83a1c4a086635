use crate::key::PublicKey;
use crate::x509::attribute::{AttributeError, AttributeValue, CertInfoAttribute, ValidityField};
use crate::x509::certificate::CertError;
use pkix_asn1_der::{Asn1DerError, DerEncode, DerInputStream, DerOutputStream, DerValue, Tag};
use pkix_asn1_x509::{
    oids, AlgorithmId, CertificateValidity, CertificateVersion, Extensions, GeneralName, SerialNumber,
    SubjectPublicKeyInfo, UniqueIdentity, X500Principal,
};
use std::fmt;

/// ```not_rust
/// TBSCertificate  ::=  SEQUENCE  {
///      version         [0]  EXPLICIT Version DEFAULT v1,
///      serialNumber         CertificateSerialNumber,
///      signature            AlgorithmIdentifier,
///      issuer               Name,
///      validity             Validity,
///      subject              Name,
///      subjectPublicKeyInfo SubjectPublicKeyInfo,
///      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///                           -- If present, version MUST be v2 or v3
///      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///                           -- If present, version MUST be v2 or v3
///      extensions      [3]  EXPLICIT Extensions OPTIONAL
///                           -- If present, version MUST be v3
///      }
/// ```
///
/// A parsed `X509CertInfo` keeps its original encoding until an attribute is
/// modified, so the bytes covered by the signature are reproduced exactly.
#[derive(Debug, Clone, Default)]
pub struct X509CertInfo {
    version: CertificateVersion,
    serial_number: Option<SerialNumber>,
    algorithm: Option<AlgorithmId>,
    issuer: Option<X500Principal>,
    validity: Option<CertificateValidity>,
    subject: Option<X500Principal>,
    key: Option<PublicKey>,
    issuer_unique_id: Option<UniqueIdentity>,
    subject_unique_id: Option<UniqueIdentity>,
    extensions: Option<Extensions>,
    raw: Option<Vec<u8>>,
}

fn invalid(msg: &str) -> CertError {
    CertError::Parsing(msg.to_owned())
}

fn deser(element: &'static str) -> impl FnOnce(Asn1DerError) -> CertError {
    move |source| CertError::Asn1Deserialization { element, source }
}

fn ser(element: &'static str) -> impl FnOnce(Asn1DerError) -> CertError {
    move |source| CertError::Asn1Serialization { element, source }
}

impl X509CertInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_der(encoded: &[u8], lenient_serial_numbers: bool) -> Result<Self, CertError> {
        let value = DerValue::from_der(encoded).map_err(deser("tbs certificate"))?;
        Self::parse(&value, lenient_serial_numbers)
    }

    pub fn parse(value: &DerValue, lenient_serial_numbers: bool) -> Result<Self, CertError> {
        if value.tag() != Tag::SEQUENCE {
            return Err(invalid("signed fields invalid"));
        }

        let mut info = Self {
            raw: Some(value.to_byte_array()),
            ..Self::default()
        };
        let mut data = value.data();
        let next = |data: &mut DerInputStream, element: &'static str| data.get_der_value().map_err(deser(element));

        let mut tmp = next(&mut data, "version")?;
        if tmp.is_context_specific_tag(0) && tmp.is_constructed() {
            info.version = CertificateVersion::parse_explicit(&tmp).map_err(deser("version"))?;
            tmp = next(&mut data, "serial number")?;
        }

        info.serial_number = Some(SerialNumber::parse(&tmp, lenient_serial_numbers).map_err(deser("serial number"))?);
        info.algorithm = Some(AlgorithmId::parse(&next(&mut data, "algorithm")?).map_err(deser("algorithm"))?);

        let issuer = X500Principal::parse(&next(&mut data, "issuer")?).map_err(deser("issuer"))?;
        if issuer.is_empty() {
            return Err(invalid("Empty issuer DN not allowed in X509Certificates"));
        }
        info.issuer = Some(issuer);

        info.validity = Some(CertificateValidity::parse(&next(&mut data, "validity")?).map_err(deser("validity"))?);

        let subject = X500Principal::parse(&next(&mut data, "subject")?).map_err(deser("subject"))?;
        if info.version == CertificateVersion::V1 && subject.is_empty() {
            return Err(invalid("Empty subject DN not allowed in v1 certificate"));
        }
        info.subject = Some(subject);

        let key = next(&mut data, "subject public key")?;
        if key.tag() != Tag::SEQUENCE {
            return Err(invalid("corrupt subject key"));
        }
        info.key = Some(PublicKey::from(
            SubjectPublicKeyInfo::parse(&key).map_err(deser("subject public key"))?,
        ));

        if data.available() == 0 {
            return Ok(info);
        }
        if info.version == CertificateVersion::V1 {
            return Err(invalid("no more data allowed for version 1 certificate"));
        }

        tmp = next(&mut data, "issuer unique id")?;
        if tmp.is_context_specific_tag(1) {
            info.issuer_unique_id = Some(UniqueIdentity::parse_implicit(&tmp).map_err(deser("issuer unique id"))?);
            if data.available() == 0 {
                return Ok(info);
            }
            tmp = next(&mut data, "subject unique id")?;
        }

        if tmp.is_context_specific_tag(2) {
            info.subject_unique_id = Some(UniqueIdentity::parse_implicit(&tmp).map_err(deser("subject unique id"))?);
            if data.available() == 0 {
                return Ok(info);
            }
            tmp = next(&mut data, "extensions")?;
        }

        if info.version != CertificateVersion::V3 {
            return Err(invalid("Extensions not allowed in v2 certificate"));
        }
        if tmp.is_constructed() && tmp.is_context_specific_tag(3) {
            info.extensions = Some(Extensions::parse_explicit(&tmp, 3).map_err(deser("extensions"))?);
        }

        info.verify_subject_alternative_name()?;

        Ok(info)
    }

    /// An empty subject requires a critical, non-empty SubjectAlternativeName.
    fn verify_subject_alternative_name(&self) -> Result<(), CertError> {
        if !self.subject.as_ref().map_or(true, X500Principal::is_empty) {
            return Ok(());
        }

        let extensions = self.extensions.as_ref().ok_or_else(|| {
            invalid("X.509 Certificate is incomplete: subject field is empty, and certificate has no extensions")
        })?;

        let san = extensions.get(oids::SUBJECT_ALTERNATIVE_NAME).ok_or_else(|| {
            invalid(
                "X.509 Certificate is incomplete: subject field is empty, and SubjectAlternativeName extension is absent",
            )
        })?;

        if !san.is_critical() {
            return Err(invalid(
                "X.509 Certificate is incomplete: SubjectAlternativeName extension MUST be marked critical when subject field is empty",
            ));
        }

        let names = GeneralName::parse_all(san.value()).map_err(deser("subject alternative name"))?;
        if names.is_empty() {
            return Err(invalid(
                "X.509 Certificate is incomplete: subject field is empty, and SubjectAlternativeName extension is empty",
            ));
        }

        Ok(())
    }

    /// Bytes covered by the certificate signature: the original encoding when
    /// parsed and unmodified, a fresh encoding otherwise.
    pub fn encoded_info(&self) -> Result<Vec<u8>, CertError> {
        match &self.raw {
            Some(raw) => Ok(raw.clone()),
            None => {
                let mut out = DerOutputStream::new();
                self.encode(&mut out)?;
                Ok(out.into_bytes())
            }
        }
    }

    /// Keeps `encoded` as the bytes returned by `encoded_info`.
    pub(crate) fn retain_encoding(&mut self, encoded: Vec<u8>) {
        self.raw = Some(encoded);
    }

    pub fn encode(&self, out: &mut DerOutputStream) -> Result<(), CertError> {
        fn missing(field: &'static str) -> CertError {
            CertError::IncompleteCertificate { field }
        }

        let mut content = DerOutputStream::new();
        self.version.encode_der(&mut content).map_err(ser("version"))?;
        self.serial_number
            .as_ref()
            .ok_or_else(|| missing(CertInfoAttribute::SERIAL_NUMBER))?
            .encode_der(&mut content)
            .map_err(ser("serial number"))?;
        self.algorithm
            .as_ref()
            .ok_or_else(|| missing(CertInfoAttribute::ALGORITHM_ID))?
            .encode(&mut content)
            .map_err(ser("algorithm"))?;
        self.issuer
            .as_ref()
            .ok_or_else(|| missing(CertInfoAttribute::ISSUER))?
            .encode_der(&mut content)
            .map_err(ser("issuer"))?;
        self.validity
            .as_ref()
            .ok_or_else(|| missing(CertInfoAttribute::VALIDITY))?
            .encode_der(&mut content)
            .map_err(ser("validity"))?;
        self.subject
            .as_ref()
            .ok_or_else(|| missing(CertInfoAttribute::SUBJECT))?
            .encode_der(&mut content)
            .map_err(ser("subject"))?;
        content.write_raw(&self.key.as_ref().ok_or_else(|| missing(CertInfoAttribute::KEY))?.to_der());

        if let Some(id) = &self.issuer_unique_id {
            id.encode_implicit(&mut content, 1);
        }
        if let Some(id) = &self.subject_unique_id {
            id.encode_implicit(&mut content, 2);
        }
        if let Some(extensions) = &self.extensions {
            extensions
                .encode_explicit(&mut content, 3)
                .map_err(ser("extensions"))?;
        }

        out.write_stream(Tag::SEQUENCE, &content);
        Ok(())
    }

    pub fn version(&self) -> CertificateVersion {
        self.version
    }

    pub fn serial_number(&self) -> Option<&SerialNumber> {
        self.serial_number.as_ref()
    }

    pub fn algorithm(&self) -> Option<&AlgorithmId> {
        self.algorithm.as_ref()
    }

    pub fn issuer(&self) -> Option<&X500Principal> {
        self.issuer.as_ref()
    }

    pub fn validity(&self) -> Option<&CertificateValidity> {
        self.validity.as_ref()
    }

    pub fn subject(&self) -> Option<&X500Principal> {
        self.subject.as_ref()
    }

    pub fn key(&self) -> Option<&PublicKey> {
        self.key.as_ref()
    }

    pub fn issuer_unique_id(&self) -> Option<&UniqueIdentity> {
        self.issuer_unique_id.as_ref()
    }

    pub fn subject_unique_id(&self) -> Option<&UniqueIdentity> {
        self.subject_unique_id.as_ref()
    }

    pub fn extensions(&self) -> Option<&Extensions> {
        self.extensions.as_ref()
    }

    pub fn get(&self, attribute: &CertInfoAttribute) -> Option<AttributeValue> {
        match attribute {
            CertInfoAttribute::Extensions(None) => self.extensions.clone().map(AttributeValue::Extensions),
            CertInfoAttribute::Extensions(Some(name)) => self
                .extensions
                .as_ref()
                .and_then(|extensions| extensions.get(name))
                .cloned()
                .map(AttributeValue::Extension),
            CertInfoAttribute::Subject(_) => self.subject.clone().map(AttributeValue::Name),
            CertInfoAttribute::Issuer(_) => self.issuer.clone().map(AttributeValue::Name),
            CertInfoAttribute::Key(_) => self.key.clone().map(AttributeValue::Key),
            CertInfoAttribute::AlgorithmId(_) => self.algorithm.clone().map(AttributeValue::AlgorithmId),
            CertInfoAttribute::Validity(None) => self.validity.map(AttributeValue::Validity),
            CertInfoAttribute::Validity(Some(ValidityField::NotBefore)) => {
                self.validity.map(|validity| AttributeValue::Date(validity.not_before))
            }
            CertInfoAttribute::Validity(Some(ValidityField::NotAfter)) => {
                self.validity.map(|validity| AttributeValue::Date(validity.not_after))
            }
            CertInfoAttribute::Version(None) => Some(AttributeValue::Version(self.version)),
            CertInfoAttribute::Version(Some(_)) => Some(AttributeValue::Integer(self.version.value())),
            CertInfoAttribute::SerialNumber(_) => self.serial_number.clone().map(AttributeValue::SerialNumber),
            CertInfoAttribute::IssuerId => self.issuer_unique_id.clone().map(AttributeValue::UniqueId),
            CertInfoAttribute::SubjectId => self.subject_unique_id.clone().map(AttributeValue::UniqueId),
        }
    }

    /// Replaces an attribute; the original encoding is discarded.
    pub fn set(&mut self, attribute: &CertInfoAttribute, value: AttributeValue) -> Result<(), AttributeError> {
        let mismatch = || AttributeError::TypeMismatch {
            attribute: attribute.to_string(),
        };

        match (attribute, value) {
            (CertInfoAttribute::Version(_), AttributeValue::Version(version)) => self.set_version(version)?,
            (CertInfoAttribute::Version(_), AttributeValue::Integer(value)) => {
                self.set_version(CertificateVersion::from_value(value).ok_or(AttributeError::InvalidVersion)?)?
            }
            (CertInfoAttribute::SerialNumber(_), AttributeValue::SerialNumber(serial)) => {
                self.serial_number = Some(serial)
            }
            (CertInfoAttribute::AlgorithmId(_), AttributeValue::AlgorithmId(algorithm)) => {
                self.algorithm = Some(algorithm)
            }
            (CertInfoAttribute::Issuer(_), AttributeValue::Name(name)) => self.issuer = Some(name),
            (CertInfoAttribute::Subject(_), AttributeValue::Name(name)) => self.subject = Some(name),
            (CertInfoAttribute::Validity(None), AttributeValue::Validity(validity)) => self.validity = Some(validity),
            (CertInfoAttribute::Validity(Some(field)), AttributeValue::Date(date)) => {
                let mut validity = self.validity.unwrap_or_else(|| CertificateValidity::new(date, date));
                match field {
                    ValidityField::NotBefore => validity.not_before = date,
                    ValidityField::NotAfter => validity.not_after = date,
                }
                self.validity = Some(validity);
            }
            (CertInfoAttribute::Key(_), AttributeValue::Key(key)) => self.key = Some(key),
            (CertInfoAttribute::IssuerId, AttributeValue::UniqueId(id)) => {
                self.require_version(CertificateVersion::V2)?;
                self.issuer_unique_id = Some(id);
            }
            (CertInfoAttribute::SubjectId, AttributeValue::UniqueId(id)) => {
                self.require_version(CertificateVersion::V2)?;
                self.subject_unique_id = Some(id);
            }
            (CertInfoAttribute::Extensions(None), AttributeValue::Extensions(extensions)) => {
                self.require_version(CertificateVersion::V3)?;
                self.extensions = Some(extensions);
            }
            (CertInfoAttribute::Extensions(Some(_)), AttributeValue::Extension(extension)) => {
                self.require_version(CertificateVersion::V3)?;
                self.extensions.get_or_insert_with(Extensions::new).insert(extension);
            }
            _ => return Err(mismatch()),
        }

        self.raw = None;
        Ok(())
    }

    /// Clears an attribute; the version falls back to v1.
    pub fn delete(&mut self, attribute: &CertInfoAttribute) {
        match attribute {
            CertInfoAttribute::Version(_) => self.version = CertificateVersion::default(),
            CertInfoAttribute::SerialNumber(_) => self.serial_number = None,
            CertInfoAttribute::AlgorithmId(_) => self.algorithm = None,
            CertInfoAttribute::Issuer(_) => self.issuer = None,
            CertInfoAttribute::Validity(_) => self.validity = None,
            CertInfoAttribute::Subject(_) => self.subject = None,
            CertInfoAttribute::Key(_) => self.key = None,
            CertInfoAttribute::IssuerId => self.issuer_unique_id = None,
            CertInfoAttribute::SubjectId => self.subject_unique_id = None,
            CertInfoAttribute::Extensions(None) => self.extensions = None,
            CertInfoAttribute::Extensions(Some(name)) => {
                if let Some(extensions) = self.extensions.as_mut() {
                    extensions.remove(name);
                }
            }
        }
        self.raw = None;
    }

    fn set_version(&mut self, version: CertificateVersion) -> Result<(), AttributeError> {
        let needed = if self.extensions.is_some() {
            CertificateVersion::V3
        } else if self.issuer_unique_id.is_some() || self.subject_unique_id.is_some() {
            CertificateVersion::V2
        } else {
            CertificateVersion::V1
        };
        if version < needed {
            return Err(AttributeError::InvalidVersion);
        }
        self.version = version;
        Ok(())
    }

    fn require_version(&self, minimum: CertificateVersion) -> Result<(), AttributeError> {
        if self.version < minimum {
            Err(AttributeError::InvalidVersion)
        } else {
            Ok(())
        }
    }
}

impl PartialEq for X509CertInfo {
    fn eq(&self, other: &Self) -> bool {
        match (self.encoded_info(), other.encoded_info()) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl fmt::Display for X509CertInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_none<T: fmt::Display>(value: Option<&T>) -> String {
            value.map_or_else(|| "<none>".to_owned(), ToString::to_string)
        }

        writeln!(f, "[")?;
        writeln!(f, "  {}", self.version)?;
        writeln!(f, "  Subject: {}", or_none(self.subject.as_ref()))?;
        match &self.algorithm {
            Some(algorithm) => writeln!(
                f,
                "  Signature Algorithm: {}, OID = {}",
                algorithm.name(),
                algorithm.oid_string()
            )?,
            None => writeln!(f, "  Signature Algorithm: <none>")?,
        }
        writeln!(f)?;
        writeln!(f, "  Key:  {}", or_none(self.key.as_ref()))?;
        match &self.validity {
            Some(validity) => writeln!(
                f,
                "  Validity: [From: {},\n               To: {}]",
                validity.not_before, validity.not_after
            )?,
            None => writeln!(f, "  Validity: <none>")?,
        }
        writeln!(f, "  Issuer: {}", or_none(self.issuer.as_ref()))?;
        writeln!(f, "  {}", or_none(self.serial_number.as_ref()))?;

        if let Some(id) = &self.issuer_unique_id {
            writeln!(f, "Issuer Id:\n{}", id.id())?;
        }
        if let Some(id) = &self.subject_unique_id {
            writeln!(f, "Subject Id:\n{}", id.id())?;
        }
        if let Some(extensions) = &self.extensions {
            writeln!(f)?;
            writeln!(f, "Certificate Extensions: {}", extensions.len())?;
            for (i, extension) in extensions.iter().enumerate() {
                writeln!(f, "[{}]: {}", i + 1, extension)?;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::PrivateKey;
    use crate::x509::certificate::X509CertImpl;
    use pretty_assertions::{assert_eq, assert_ne};

    // [3] { SEQUENCE { BasicConstraints, critical FALSE, SEQUENCE {} } }
    const EXPLICIT_NON_CRITICAL: &str = "A310300E300C0603551D1301010004023000";

    /// Leaf TBSCertificate whose extensions spell out the `critical` default,
    /// which DER re-encoding drops.
    fn tbs_with_explicit_default() -> Vec<u8> {
        let leaf = X509CertImpl::from_pem_str(pkix_test_data::LEAF_P256).unwrap();
        let tbs = DerValue::from_der(&leaf.tbs_certificate().unwrap()).unwrap();
        let extensions = DerValue::from_der(&hex::decode(EXPLICIT_NON_CRITICAL).unwrap()).unwrap();

        let mut data = tbs.data();
        let mut fields = Vec::new();
        while data.available() > 0 {
            let field = data.get_der_value().unwrap();
            if field.tag() != Tag::context_specific_constructed(3) {
                fields.push(field);
            }
        }
        fields.push(extensions);

        let mut out = DerOutputStream::new();
        out.put_sequence(&fields);
        out.into_bytes()
    }

    #[test]
    fn parsed_encoding_is_kept() {
        let tbs = tbs_with_explicit_default();
        let info = X509CertInfo::from_der(&tbs, false).unwrap();
        let extension = info.extensions().unwrap().get(oids::BASIC_CONSTRAINTS).unwrap();
        assert!(!extension.is_critical());

        let mut reencoded = DerOutputStream::new();
        info.encode(&mut reencoded).unwrap();
        assert_ne!(reencoded.into_bytes(), tbs);
        assert_eq!(info.encoded_info().unwrap(), tbs);
    }

    #[test]
    fn signature_covers_parsed_bytes() {
        let tbs = tbs_with_explicit_default();
        let root = X509CertImpl::from_pem_str(pkix_test_data::ROOT_CA_P256).unwrap();
        let root_key = PrivateKey::from_pem_str(pkix_test_data::ROOT_CA_P256_PK).unwrap();

        let mut cert = X509CertImpl::new(X509CertInfo::from_der(&tbs, false).unwrap());
        cert.sign(&root_key, "SHA256withECDSA").unwrap();

        let parsed = X509CertImpl::from_der(&cert.encoded().unwrap()).unwrap();
        assert_eq!(parsed.tbs_certificate().unwrap(), tbs);
        parsed.verify(root.public_key().unwrap()).unwrap();
    }

    #[test]
    fn modification_drops_parsed_encoding() {
        let tbs = tbs_with_explicit_default();

        let mut info = X509CertInfo::from_der(&tbs, false).unwrap();
        info.set(
            &CertInfoAttribute::SerialNumber(None),
            AttributeValue::SerialNumber(SerialNumber::from(0x1000u64)),
        )
        .unwrap();
        let encoded = info.encoded_info().unwrap();
        assert_ne!(encoded, tbs);
        // the explicit default is gone with the fresh encoding
        assert!(!hex::encode_upper(&encoded).contains("0603551D13010100"));

        let mut info = X509CertInfo::from_der(&tbs, false).unwrap();
        info.delete(&CertInfoAttribute::IssuerId);
        assert_ne!(info.encoded_info().unwrap(), tbs);
    }
}
