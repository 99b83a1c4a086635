use crate::name::X500Principal;
use crate::oids;
use oid::ObjectIdentifier;
use pkix_asn1::BitArray;
use pkix_asn1_der::{Asn1DerError, DerEncode, DerOutputStream, DerValue, Result, Tag};
use std::collections::BTreeSet;
use std::fmt;

const ALIASES: &[(&str, &str)] = &[
    ("SubjectKeyIdentifier", oids::SUBJECT_KEY_IDENTIFIER),
    ("KeyUsage", oids::KEY_USAGE),
    ("PrivateKeyUsage", oids::PRIVATE_KEY_USAGE_PERIOD),
    ("SubjectAlternativeName", oids::SUBJECT_ALTERNATIVE_NAME),
    ("IssuerAlternativeName", oids::ISSUER_ALTERNATIVE_NAME),
    ("BasicConstraints", oids::BASIC_CONSTRAINTS),
    ("CRLNumber", oids::CRL_NUMBER),
    ("CRLReasonCode", oids::CRL_REASON_CODE),
    ("InvalidityDate", oids::INVALIDITY_DATE),
    ("DeltaCRLIndicator", oids::DELTA_CRL_INDICATOR),
    ("IssuingDistributionPoint", oids::ISSUING_DISTRIBUTION_POINT),
    ("CertificateIssuer", oids::CERTIFICATE_ISSUER),
    ("NameConstraints", oids::NAME_CONSTRAINTS),
    ("CRLDistributionPoints", oids::CRL_DISTRIBUTION_POINTS),
    ("CertificatePolicies", oids::CERTIFICATE_POLICIES),
    ("PolicyMappings", oids::POLICY_MAPPINGS),
    ("AuthorityKeyIdentifier", oids::AUTHORITY_KEY_IDENTIFIER),
    ("PolicyConstraints", oids::POLICY_CONSTRAINTS),
    ("ExtendedKeyUsage", oids::EXTENDED_KEY_USAGE),
    ("FreshestCRL", oids::FRESHEST_CRL),
    ("InhibitAnyPolicy", oids::INHIBIT_ANY_POLICY),
    ("AuthorityInfoAccess", oids::AUTHORITY_INFO_ACCESS),
    ("SubjectInfoAccess", oids::SUBJECT_INFO_ACCESS),
    ("NetscapeCertType", oids::NETSCAPE_CERT_TYPE),
];

/// Alias of a known extension OID (`2.5.29.15` → `KeyUsage`).
pub fn alias_of(dotted: &str) -> Option<&'static str> {
    ALIASES.iter().find(|(_, oid)| *oid == dotted).map(|(alias, _)| *alias)
}

/// OID of a known extension alias, case-insensitive.
pub fn oid_of_alias(alias: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(alias))
        .map(|(_, oid)| *oid)
}

/// ```not_rust
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING
///                  -- contains the DER encoding of an ASN.1 value
///                  -- corresponding to the extension type identified
///                  -- by extnID
///      }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    oid: ObjectIdentifier,
    critical: bool,
    value: Vec<u8>,
}

impl Extension {
    pub fn new(oid: ObjectIdentifier, critical: bool, value: Vec<u8>) -> Self {
        Self { oid, critical, value }
    }

    pub fn parse(value: &DerValue) -> Result<Self> {
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("Invalid encoding for Extension".to_owned()));
        }

        let mut data = value.data();
        let oid = data.get_oid()?;

        let mut field = data.get_der_value()?;
        let critical = if field.tag() == Tag::BOOLEAN {
            let critical = field.get_boolean()?;
            field = data.get_der_value()?;
            critical
        } else {
            false
        };
        let value = field.get_octet_string()?;

        if data.available() != 0 {
            return Err(Asn1DerError::InvalidData("Extension, extra data".to_owned()));
        }

        Ok(Self { oid, critical, value })
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn oid_string(&self) -> String {
        Into::<String>::into(&self.oid)
    }

    pub fn alias(&self) -> Option<&'static str> {
        alias_of(&self.oid_string())
    }

    /// Alias when known, dotted OID otherwise.
    pub fn name(&self) -> String {
        self.alias().map(str::to_owned).unwrap_or_else(|| self.oid_string())
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Content of `extnValue`, the DER encoding of the extension value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn decoded_value(&self) -> Result<DerValue> {
        DerValue::from_der(&self.value)
    }

    pub fn new_basic_constraints(critical: bool, constraints: BasicConstraints) -> Self {
        Self::new(oids::basic_constraints(), critical, constraints.to_der())
    }

    pub fn new_key_usage(usage: &KeyUsage) -> Self {
        Self::new(oids::key_usage(), true, usage.to_der())
    }

    pub fn new_subject_key_identifier(key_identifier: &[u8]) -> Self {
        let mut out = DerOutputStream::new();
        out.put_octet_string(key_identifier);
        Self::new(oids::subject_key_identifier(), false, out.into_bytes())
    }

    pub fn new_crl_number(number: &num_bigint_dig::BigInt) -> Self {
        let mut out = DerOutputStream::new();
        out.put_big_integer(number);
        Self::new(oids::crl_number(), false, out.into_bytes())
    }

    pub fn new_crl_reason(reason: CrlReason) -> Self {
        let mut out = DerOutputStream::new();
        out.put_enumerated(reason as i32);
        Self::new(oids::crl_reason_code(), false, out.into_bytes())
    }

    pub fn new_certificate_issuer(names: &[GeneralName]) -> Self {
        Self::new(oids::certificate_issuer(), true, GeneralName::encode_all(names))
    }
}

impl DerEncode for Extension {
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()> {
        let mut content = DerOutputStream::new();
        content.put_oid(&self.oid)?;
        if self.critical {
            content.put_boolean(true);
        }
        content.put_octet_string(&self.value);
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(())
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId: {} Criticality={}", self.oid_string(), self.critical)?;
        if let Some(alias) = self.alias() {
            write!(f, "\n{alias} [{} bytes]", self.value.len())?;
        }
        Ok(())
    }
}

/// Ordered extension set, keyed by alias (dotted OID for unknown extensions).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    entries: Vec<(String, Extension)>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Extensions ::= SEQUENCE SIZE (1..MAX) OF Extension`
    pub fn parse(value: &DerValue) -> Result<Self> {
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("Invalid encoding for Extensions".to_owned()));
        }
        let mut data = value.data();
        let mut extensions = Self::new();
        while data.available() > 0 {
            extensions.insert(Extension::parse(&data.get_der_value()?)?);
        }
        Ok(extensions)
    }

    /// Extensions wrapped in an `[n] EXPLICIT` tag (`[3]` in certificates, `[0]` in CRLs).
    pub fn parse_explicit(value: &DerValue, number: u8) -> Result<Self> {
        if !value.is_context_specific_tag(number) || !value.is_constructed() {
            return Err(Asn1DerError::InvalidData(format!(
                "Invalid encoding for extensions, expected [{number}]"
            )));
        }
        let mut data = value.data();
        let inner = data.get_der_value()?;
        if data.available() != 0 {
            return Err(Asn1DerError::InvalidData("Extensions, extra data".to_owned()));
        }
        Self::parse(&inner)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an extension, replacing a previous one with the same key.
    pub fn insert(&mut self, extension: Extension) {
        let key = extension.name();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = extension,
            None => self.entries.push((key, extension)),
        }
    }

    /// Lookup by alias (case-insensitive) or dotted OID.
    pub fn get(&self, name: &str) -> Option<&Extension> {
        let key = Self::key_for(name);
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
            .map(|(_, extension)| extension)
    }

    pub fn get_by_oid(&self, oid: &ObjectIdentifier) -> Option<&Extension> {
        self.entries
            .iter()
            .map(|(_, extension)| extension)
            .find(|extension| &extension.oid == oid)
    }

    pub fn remove(&mut self, name: &str) -> Option<Extension> {
        let key = Self::key_for(name);
        let index = self
            .entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(&key))?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.entries.iter().map(|(_, extension)| extension)
    }

    /// A critical extension this crate has no alias for.
    pub fn has_unsupported_critical_extension(&self) -> bool {
        self.iter().any(|extension| extension.critical && extension.alias().is_none())
    }

    pub fn critical_oids(&self) -> BTreeSet<String> {
        self.oids_where(true)
    }

    pub fn non_critical_oids(&self) -> BTreeSet<String> {
        self.oids_where(false)
    }

    fn oids_where(&self, critical: bool) -> BTreeSet<String> {
        self.iter()
            .filter(|extension| extension.critical == critical)
            .map(Extension::oid_string)
            .collect()
    }

    fn key_for(name: &str) -> String {
        match alias_of(name) {
            Some(alias) => alias.to_owned(),
            None => name.to_owned(),
        }
    }

    pub fn encode(&self, out: &mut DerOutputStream) -> Result<()> {
        let mut content = DerOutputStream::new();
        for extension in self.iter() {
            extension.encode_der(&mut content)?;
        }
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(())
    }

    pub fn encode_explicit(&self, out: &mut DerOutputStream, number: u8) -> Result<()> {
        let mut inner = DerOutputStream::new();
        self.encode(&mut inner)?;
        out.write_stream(Tag::context_specific_constructed(number), &inner);
        Ok(())
    }
}

impl DerEncode for Extensions {
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()> {
        self.encode(out)
    }
}

/// ```not_rust
/// BasicConstraints ::= SEQUENCE {
///      cA                      BOOLEAN DEFAULT FALSE,
///      pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BasicConstraints {
    pub ca: bool,
    pub path_len: Option<i32>,
}

impl BasicConstraints {
    pub fn from_der(encoded: &[u8]) -> Result<Self> {
        let value = DerValue::from_der(encoded)?;
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("Invalid encoding of BasicConstraints".to_owned()));
        }
        let mut data = value.data();
        let mut constraints = Self::default();
        if data.available() > 0 && data.peek_tag()? == Tag::BOOLEAN {
            constraints.ca = data.get_der_value()?.get_boolean()?;
        }
        if data.available() > 0 && data.peek_tag()? == Tag::INTEGER {
            constraints.path_len = Some(data.get_integer()?);
        }
        Ok(constraints)
    }

    pub fn to_der(&self) -> Vec<u8> {
        let mut content = DerOutputStream::new();
        if self.ca {
            content.put_boolean(true);
        }
        if let Some(path_len) = self.path_len {
            content.put_integer(path_len);
        }
        let mut out = DerOutputStream::new();
        out.write_stream(Tag::SEQUENCE, &content);
        out.into_bytes()
    }
}

/// Named bits of the `KeyUsage` extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUsage(BitArray);

impl KeyUsage {
    pub const DIGITAL_SIGNATURE: usize = 0;
    pub const NON_REPUDIATION: usize = 1;
    pub const KEY_ENCIPHERMENT: usize = 2;
    pub const DATA_ENCIPHERMENT: usize = 3;
    pub const KEY_AGREEMENT: usize = 4;
    pub const KEY_CERT_SIGN: usize = 5;
    pub const CRL_SIGN: usize = 6;
    pub const ENCIPHER_ONLY: usize = 7;
    pub const DECIPHER_ONLY: usize = 8;

    pub fn new(bits: &[usize]) -> Self {
        let mut flags = [false; 9];
        for bit in bits {
            if let Some(flag) = flags.get_mut(*bit) {
                *flag = true;
            }
        }
        Self(BitArray::from_bools(&flags))
    }

    pub fn from_der(encoded: &[u8]) -> Result<Self> {
        Ok(Self(DerValue::from_der(encoded)?.get_unaligned_bit_string()?))
    }

    pub fn to_der(&self) -> Vec<u8> {
        let mut out = DerOutputStream::new();
        out.put_truncated_unaligned_bit_string(&self.0);
        out.into_bytes()
    }

    pub fn is_set(&self, bit: usize) -> bool {
        self.0.get(bit).unwrap_or(false)
    }

    /// Bits as booleans, padded to the nine named bits.
    pub fn to_boolean_array(&self) -> Vec<bool> {
        let mut bits = self.0.to_boolean_array();
        if bits.len() < 9 {
            bits.resize(9, false);
        }
        bits
    }
}

/// `CRLReason` enumeration carried by the `CRLReasonCode` entry extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrlReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CaCompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    Unused = 7,
    RemoveFromCrl = 8,
    PrivilegeWithdrawn = 9,
    AaCompromise = 10,
}

impl CrlReason {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Unspecified,
            1 => Self::KeyCompromise,
            2 => Self::CaCompromise,
            3 => Self::AffiliationChanged,
            4 => Self::Superseded,
            5 => Self::CessationOfOperation,
            6 => Self::CertificateHold,
            7 => Self::Unused,
            8 => Self::RemoveFromCrl,
            9 => Self::PrivilegeWithdrawn,
            10 => Self::AaCompromise,
            _ => return None,
        })
    }

    pub fn from_der(encoded: &[u8]) -> Result<Self> {
        let code = DerValue::from_der(encoded)?.get_enumerated()?;
        Self::from_code(code).ok_or_else(|| Asn1DerError::InvalidData(format!("unknown CRL reason code {code}")))
    }
}

impl fmt::Display for CrlReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::KeyCompromise => "KEY_COMPROMISE",
            Self::CaCompromise => "CA_COMPROMISE",
            Self::AffiliationChanged => "AFFILIATION_CHANGED",
            Self::Superseded => "SUPERSEDED",
            Self::CessationOfOperation => "CESSATION_OF_OPERATION",
            Self::CertificateHold => "CERTIFICATE_HOLD",
            Self::Unused => "UNUSED",
            Self::RemoveFromCrl => "REMOVE_FROM_CRL",
            Self::PrivilegeWithdrawn => "PRIVILEGE_WITHDRAWN",
            Self::AaCompromise => "AA_COMPROMISE",
        };
        f.write_str(name)
    }
}

/// Subset of `GeneralName` the certificate and CRL code reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralName {
    Rfc822Name(String),
    DnsName(String),
    DirectoryName(X500Principal),
    Uri(String),
    IpAddress(Vec<u8>),
    RegisteredId(ObjectIdentifier),
    /// otherName, x400Address and ediPartyName, kept as encoded
    Other(DerValue),
}

impl GeneralName {
    pub fn parse(value: &DerValue) -> Result<Self> {
        if !value.is_context_specific() {
            return Err(Asn1DerError::InvalidData(format!("Invalid GeneralName tag {}", value.tag())));
        }
        let ascii = || {
            String::from_utf8(value.content().to_vec())
                .map_err(|_| Asn1DerError::InvalidData("GeneralName, invalid IA5String".to_owned()))
        };
        Ok(match value.tag().number() {
            1 => Self::Rfc822Name(ascii()?),
            2 => Self::DnsName(ascii()?),
            4 => Self::DirectoryName(X500Principal::from_der(value.content())?),
            6 => Self::Uri(ascii()?),
            7 => Self::IpAddress(value.content().to_vec()),
            8 => {
                let oid = DerValue::new(Tag::OID, value.content().to_vec());
                Self::RegisteredId(oid.get_oid()?)
            }
            _ => Self::Other(value.clone()),
        })
    }

    /// `GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName`
    pub fn parse_all(encoded: &[u8]) -> Result<Vec<Self>> {
        let value = DerValue::from_der(encoded)?;
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("Invalid encoding for GeneralNames".to_owned()));
        }
        let mut data = value.data();
        let mut names = Vec::new();
        while data.available() > 0 {
            names.push(Self::parse(&data.get_der_value()?)?);
        }
        Ok(names)
    }

    pub fn encode_all(names: &[GeneralName]) -> Vec<u8> {
        let mut content = DerOutputStream::new();
        for name in names {
            name.encode(&mut content);
        }
        let mut out = DerOutputStream::new();
        out.write_stream(Tag::SEQUENCE, &content);
        out.into_bytes()
    }

    pub fn encode(&self, out: &mut DerOutputStream) {
        match self {
            Self::Rfc822Name(name) => out.write(Tag::context_specific(1), name.as_bytes()),
            Self::DnsName(name) => out.write(Tag::context_specific(2), name.as_bytes()),
            Self::DirectoryName(name) => out.write(Tag::context_specific_constructed(4), name.encoded()),
            Self::Uri(uri) => out.write(Tag::context_specific(6), uri.as_bytes()),
            Self::IpAddress(address) => out.write(Tag::context_specific(7), address),
            Self::RegisteredId(oid) => {
                if let Ok(value) = DerValue::from_oid(oid) {
                    out.write(Tag::context_specific(8), value.content());
                }
            }
            Self::Other(value) => out.put_der_value(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn critical_flag_defaults_to_false() {
        // SEQUENCE { OID 2.5.29.14, OCTET STRING { OCTET STRING 0102 } }
        let encoded = hex::decode("300B0603551D0E040404020102").unwrap();
        let extension = Extension::parse(&DerValue::from_der(&encoded).unwrap()).unwrap();
        assert!(!extension.is_critical());
        assert_eq!(extension.name(), "SubjectKeyIdentifier");
        assert_eq!(extension.value(), &[0x04, 0x02, 0x01, 0x02]);

        let mut out = DerOutputStream::new();
        extension.encode_der(&mut out).unwrap();
        assert_eq!(out.into_bytes(), encoded);
    }

    #[test]
    fn explicit_critical_flag() {
        // SEQUENCE { OID 2.5.29.15, BOOLEAN TRUE, OCTET STRING { BIT STRING } }
        let encoded = hex::decode("300E0603551D0F0101FF040403020186").unwrap();
        let extension = Extension::parse(&DerValue::from_der(&encoded).unwrap()).unwrap();
        assert!(extension.is_critical());
        let usage = KeyUsage::from_der(extension.value()).unwrap();
        assert!(usage.is_set(KeyUsage::DIGITAL_SIGNATURE));
        assert!(usage.is_set(KeyUsage::KEY_CERT_SIGN));
        assert!(usage.is_set(KeyUsage::CRL_SIGN));
        assert!(!usage.is_set(KeyUsage::KEY_ENCIPHERMENT));
        assert_eq!(usage.to_boolean_array().len(), 9);
        assert_eq!(KeyUsage::new(&[0, 5, 6]).to_der(), vec![0x03, 0x02, 0x01, 0x86]);
    }

    #[test]
    fn set_keys_and_lookups() {
        let mut extensions = Extensions::new();
        extensions.insert(Extension::new_basic_constraints(
            true,
            BasicConstraints {
                ca: true,
                path_len: Some(1),
            },
        ));
        extensions.insert(Extension::new(
            ObjectIdentifier::try_from("1.2.3.4").unwrap(),
            false,
            vec![0x05, 0x00],
        ));
        extensions.insert(Extension::new_basic_constraints(true, BasicConstraints::default()));

        assert_eq!(extensions.len(), 2);
        assert!(extensions.get("basicconstraints").is_some());
        assert!(extensions.get(oids::BASIC_CONSTRAINTS).is_some());
        assert!(extensions.get("1.2.3.4").is_some());
        assert_eq!(
            BasicConstraints::from_der(extensions.get("BasicConstraints").unwrap().value()).unwrap(),
            BasicConstraints::default()
        );
        assert_eq!(
            extensions.critical_oids().into_iter().collect::<Vec<_>>(),
            vec![oids::BASIC_CONSTRAINTS.to_owned()]
        );
        assert_eq!(
            extensions.non_critical_oids().into_iter().collect::<Vec<_>>(),
            vec!["1.2.3.4".to_owned()]
        );
        assert!(!extensions.has_unsupported_critical_extension());

        extensions.insert(Extension::new(
            ObjectIdentifier::try_from("1.2.3.5").unwrap(),
            true,
            vec![0x05, 0x00],
        ));
        assert!(extensions.has_unsupported_critical_extension());

        assert!(extensions.remove("1.2.3.5").is_some());
        assert!(!extensions.has_unsupported_critical_extension());
    }

    #[test]
    fn explicit_wrapper_round_trip() {
        let mut extensions = Extensions::new();
        extensions.insert(Extension::new_crl_number(&num_bigint_dig::BigInt::from(7)));

        let mut out = DerOutputStream::new();
        extensions.encode_explicit(&mut out, 0).unwrap();
        let bytes = out.into_bytes();
        assert_eq!(bytes[0], 0xA0);

        let parsed = Extensions::parse_explicit(&DerValue::from_der(&bytes).unwrap(), 0).unwrap();
        assert_eq!(parsed, extensions);
        assert!(Extensions::parse_explicit(&DerValue::from_der(&bytes).unwrap(), 3).is_err());
    }

    #[test]
    fn basic_constraints_encoding() {
        let constraints = BasicConstraints {
            ca: true,
            path_len: Some(0),
        };
        assert_eq!(constraints.to_der(), vec![0x30, 0x06, 0x01, 0x01, 0xFF, 0x02, 0x01, 0x00]);
        assert_eq!(BasicConstraints::from_der(&constraints.to_der()).unwrap(), constraints);
        assert_eq!(BasicConstraints::default().to_der(), vec![0x30, 0x00]);
    }

    #[test]
    fn crl_reason() {
        let extension = Extension::new_crl_reason(CrlReason::KeyCompromise);
        assert_eq!(extension.value(), &[0x0A, 0x01, 0x01]);
        assert_eq!(CrlReason::from_der(extension.value()).unwrap(), CrlReason::KeyCompromise);
        assert_eq!(CrlReason::KeyCompromise.to_string(), "KEY_COMPROMISE");
        assert!(CrlReason::from_code(11).is_none());
    }

    #[test]
    fn certificate_issuer_names() {
        let issuer: X500Principal = "CN=Other CA,O=Pkix".parse().unwrap();
        let names = vec![
            GeneralName::DirectoryName(issuer.clone()),
            GeneralName::DnsName("ca.pkix.test".to_owned()),
        ];
        let extension = Extension::new_certificate_issuer(&names);
        assert!(extension.is_critical());
        assert_eq!(GeneralName::parse_all(extension.value()).unwrap(), names);
    }
}
