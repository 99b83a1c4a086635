//! Dotted attribute names (`x509.info.subject.dname`, `validity.notAfter`, ...)
//! parsed into closed selector enums, and the values they address.

use crate::key::PublicKey;
use crate::x509::info::X509CertInfo;
use chrono::{DateTime, Utc};
use pkix_asn1_x509::{
    AlgorithmId, CertificateValidity, CertificateVersion, Extension, Extensions, SerialNumber, UniqueIdentity,
    X500Principal,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DOT: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// attribute name is unknown
    #[error("Attribute name not recognized: {name}")]
    UnknownAttribute { name: String },

    /// full attribute name does not start with `x509`
    #[error("Invalid root of attribute name, expected [x509], received [{id}]")]
    InvalidRoot { id: String },

    /// value does not fit the attribute
    #[error("{attribute} class type invalid.")]
    TypeMismatch { attribute: String },

    /// attribute requires a newer certificate version
    #[error("Invalid version")]
    InvalidVersion,
}

/// Splits `prefix.suffix` at the first dot.
fn split(name: &str) -> (&str, Option<&str>) {
    match name.split_once(DOT) {
        Some((prefix, suffix)) => (prefix, Some(suffix)),
        None => (name, None),
    }
}

fn unknown(name: &str) -> AttributeError {
    AttributeError::UnknownAttribute { name: name.to_owned() }
}

macro_rules! field_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn from_label(label: &str) -> Option<Self> {
                $(
                    if label.eq_ignore_ascii_case($label) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

field_enum! {
    /// `version.number`
    VersionField { Number => "number" }
}

field_enum! {
    /// `serialNumber.number`
    SerialNumberField { Number => "number" }
}

field_enum! {
    /// `algorithmID.algorithm`
    AlgorithmIdField { Algorithm => "algorithm" }
}

field_enum! {
    /// `issuer.dname`, `subject.x500principal`
    NameField { DName => "dname", X500Principal => "x500principal" }
}

field_enum! {
    /// `validity.notBefore`, `validity.notAfter`
    ValidityField { NotBefore => "notBefore", NotAfter => "notAfter" }
}

field_enum! {
    /// `key.value`
    KeyField { Value => "value" }
}

/// Attribute of a `TBSCertificate`, optionally narrowed to one of its fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertInfoAttribute {
    Version(Option<VersionField>),
    SerialNumber(Option<SerialNumberField>),
    AlgorithmId(Option<AlgorithmIdField>),
    Issuer(Option<NameField>),
    Validity(Option<ValidityField>),
    Subject(Option<NameField>),
    Key(Option<KeyField>),
    IssuerId,
    SubjectId,
    /// Whole extension set, or a single extension by alias or dotted OID
    Extensions(Option<String>),
}

impl CertInfoAttribute {
    pub const VERSION: &'static str = "version";
    pub const SERIAL_NUMBER: &'static str = "serialNumber";
    pub const ALGORITHM_ID: &'static str = "algorithmID";
    pub const ISSUER: &'static str = "issuer";
    pub const VALIDITY: &'static str = "validity";
    pub const SUBJECT: &'static str = "subject";
    pub const KEY: &'static str = "key";
    pub const ISSUER_ID: &'static str = "issuerID";
    pub const SUBJECT_ID: &'static str = "subjectID";
    pub const EXTENSIONS: &'static str = "extensions";

    /// Top-level segment of this attribute.
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Version(_) => Self::VERSION,
            Self::SerialNumber(_) => Self::SERIAL_NUMBER,
            Self::AlgorithmId(_) => Self::ALGORITHM_ID,
            Self::Issuer(_) => Self::ISSUER,
            Self::Validity(_) => Self::VALIDITY,
            Self::Subject(_) => Self::SUBJECT,
            Self::Key(_) => Self::KEY,
            Self::IssuerId => Self::ISSUER_ID,
            Self::SubjectId => Self::SUBJECT_ID,
            Self::Extensions(_) => Self::EXTENSIONS,
        }
    }

    fn suffix(&self) -> Option<&str> {
        match self {
            Self::Version(field) => field.map(VersionField::as_str),
            Self::SerialNumber(field) => field.map(SerialNumberField::as_str),
            Self::AlgorithmId(field) => field.map(AlgorithmIdField::as_str),
            Self::Issuer(field) | Self::Subject(field) => field.map(NameField::as_str),
            Self::Validity(field) => field.map(ValidityField::as_str),
            Self::Key(field) => field.map(KeyField::as_str),
            Self::IssuerId | Self::SubjectId => None,
            Self::Extensions(name) => name.as_deref(),
        }
    }
}

impl FromStr for CertInfoAttribute {
    type Err = AttributeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let (prefix, suffix) = split(name);

        fn field<T>(name: &str, suffix: Option<&str>, parse: fn(&str) -> Option<T>) -> Result<Option<T>, AttributeError> {
            suffix.map(|suffix| parse(suffix).ok_or_else(|| unknown(name))).transpose()
        }

        let attribute = if prefix.eq_ignore_ascii_case(Self::VERSION) {
            Self::Version(field(name, suffix, VersionField::from_label)?)
        } else if prefix.eq_ignore_ascii_case(Self::SERIAL_NUMBER) {
            Self::SerialNumber(field(name, suffix, SerialNumberField::from_label)?)
        } else if prefix.eq_ignore_ascii_case(Self::ALGORITHM_ID) {
            Self::AlgorithmId(field(name, suffix, AlgorithmIdField::from_label)?)
        } else if prefix.eq_ignore_ascii_case(Self::ISSUER) {
            Self::Issuer(field(name, suffix, NameField::from_label)?)
        } else if prefix.eq_ignore_ascii_case(Self::VALIDITY) {
            Self::Validity(field(name, suffix, ValidityField::from_label)?)
        } else if prefix.eq_ignore_ascii_case(Self::SUBJECT) {
            Self::Subject(field(name, suffix, NameField::from_label)?)
        } else if prefix.eq_ignore_ascii_case(Self::KEY) {
            Self::Key(field(name, suffix, KeyField::from_label)?)
        } else if prefix.eq_ignore_ascii_case(Self::ISSUER_ID) && suffix.is_none() {
            Self::IssuerId
        } else if prefix.eq_ignore_ascii_case(Self::SUBJECT_ID) && suffix.is_none() {
            Self::SubjectId
        } else if prefix.eq_ignore_ascii_case(Self::EXTENSIONS) {
            Self::Extensions(suffix.map(str::to_owned))
        } else {
            return Err(unknown(name));
        };

        Ok(attribute)
    }
}

impl fmt::Display for CertInfoAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())?;
        if let Some(suffix) = self.suffix() {
            write!(f, "{DOT}{suffix}")?;
        }
        Ok(())
    }
}

/// Attribute of a whole certificate, rooted at `x509`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CertAttribute {
    Info(Option<CertInfoAttribute>),
    Algorithm,
    Signature,
    SignedCert,
}

impl CertAttribute {
    pub const NAME: &'static str = "x509";
    pub const INFO: &'static str = "info";
    pub const ALG_ID: &'static str = "algorithm";
    pub const SIGNATURE: &'static str = "signature";
    pub const SIGNED_CERT: &'static str = "signed_cert";

    /// `x509.info.subject.dname`
    pub fn subject_dn() -> Self {
        Self::Info(Some(CertInfoAttribute::Subject(Some(NameField::DName))))
    }

    /// `x509.info.issuer.dname`
    pub fn issuer_dn() -> Self {
        Self::Info(Some(CertInfoAttribute::Issuer(Some(NameField::DName))))
    }

    /// `x509.info.serialNumber.number`
    pub fn serial_id() -> Self {
        Self::Info(Some(CertInfoAttribute::SerialNumber(Some(SerialNumberField::Number))))
    }

    /// `x509.info.key.value`
    pub fn public_key() -> Self {
        Self::Info(Some(CertInfoAttribute::Key(Some(KeyField::Value))))
    }

    /// `x509.info.version.number`
    pub fn version() -> Self {
        Self::Info(Some(CertInfoAttribute::Version(Some(VersionField::Number))))
    }
}

impl FromStr for CertAttribute {
    type Err = AttributeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let (root, rest) = split(name);
        if !root.eq_ignore_ascii_case(Self::NAME) {
            return Err(AttributeError::InvalidRoot { id: root.to_owned() });
        }

        let rest = rest.ok_or_else(|| unknown(name))?;
        let (id, suffix) = split(rest);

        if id.eq_ignore_ascii_case(Self::INFO) {
            return Ok(Self::Info(suffix.map(str::parse).transpose()?));
        }

        if suffix.is_some() {
            return Err(unknown(name));
        }

        if id.eq_ignore_ascii_case(Self::ALG_ID) {
            Ok(Self::Algorithm)
        } else if id.eq_ignore_ascii_case(Self::SIGNATURE) {
            Ok(Self::Signature)
        } else if id.eq_ignore_ascii_case(Self::SIGNED_CERT) {
            Ok(Self::SignedCert)
        } else {
            Err(unknown(name))
        }
    }
}

impl fmt::Display for CertAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DOT}", Self::NAME)?;
        match self {
            Self::Info(None) => f.write_str(Self::INFO),
            Self::Info(Some(attribute)) => write!(f, "{}{DOT}{attribute}", Self::INFO),
            Self::Algorithm => f.write_str(Self::ALG_ID),
            Self::Signature => f.write_str(Self::SIGNATURE),
            Self::SignedCert => f.write_str(Self::SIGNED_CERT),
        }
    }
}

/// Value read from or written to an attribute.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Version(CertificateVersion),
    /// Encoded version number (0 for v1)
    Integer(i32),
    SerialNumber(SerialNumber),
    AlgorithmId(AlgorithmId),
    Name(X500Principal),
    Validity(CertificateValidity),
    Date(DateTime<Utc>),
    Key(PublicKey),
    UniqueId(UniqueIdentity),
    Extensions(Extensions),
    Extension(Extension),
    Info(Box<X509CertInfo>),
    Bytes(Vec<u8>),
}

impl AttributeValue {
    /// Name used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Version(_) => "CertificateVersion",
            Self::Integer(_) => "Integer",
            Self::SerialNumber(_) => "SerialNumber",
            Self::AlgorithmId(_) => "AlgorithmId",
            Self::Name(_) => "X500Principal",
            Self::Validity(_) => "CertificateValidity",
            Self::Date(_) => "Date",
            Self::Key(_) => "PublicKey",
            Self::UniqueId(_) => "UniqueIdentity",
            Self::Extensions(_) => "CertificateExtensions",
            Self::Extension(_) => "Extension",
            Self::Info(_) => "X509CertInfo",
            Self::Bytes(_) => "byte[]",
        }
    }
}
