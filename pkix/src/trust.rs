//! Trust anchors and the inputs of a certification path validation

use crate::key::PublicKey;
use crate::x509::X509CertImpl;
use chrono::{DateTime, Utc};
use pkix_asn1_der::{Asn1DerError, DerValue, Tag};
use pkix_asn1_x509::X500Principal;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrustError {
    /// no trust anchor given
    #[error("the trustAnchors parameter must be non-empty")]
    EmptyTrustAnchors,

    /// name constraints are not a DER `NameConstraints`
    #[error("invalid name constraints: {source}")]
    InvalidNameConstraints { source: Asn1DerError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    Certificate(Box<X509CertImpl>),
    Key { ca: X500Principal, public_key: PublicKey },
}

/// Most-trusted CA, either as a certificate or as a name and public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    anchor: Anchor,
    name_constraints: Option<Vec<u8>>,
}

fn check_name_constraints(name_constraints: Option<Vec<u8>>) -> Result<Option<Vec<u8>>, TrustError> {
    if let Some(encoded) = &name_constraints {
        let value = DerValue::from_der(encoded).map_err(|source| TrustError::InvalidNameConstraints { source })?;
        if value.tag() != Tag::SEQUENCE || value.to_byte_array() != *encoded {
            return Err(TrustError::InvalidNameConstraints {
                source: Asn1DerError::InvalidData("NameConstraints must be a DER SEQUENCE".to_owned()),
            });
        }
    }
    Ok(name_constraints)
}

impl TrustAnchor {
    /// `name_constraints` is the DER encoded `NameConstraints` extension value.
    pub fn from_certificate(cert: X509CertImpl, name_constraints: Option<Vec<u8>>) -> Result<Self, TrustError> {
        Ok(Self {
            anchor: Anchor::Certificate(Box::new(cert)),
            name_constraints: check_name_constraints(name_constraints)?,
        })
    }

    pub fn from_key(
        ca: X500Principal,
        public_key: PublicKey,
        name_constraints: Option<Vec<u8>>,
    ) -> Result<Self, TrustError> {
        Ok(Self {
            anchor: Anchor::Key { ca, public_key },
            name_constraints: check_name_constraints(name_constraints)?,
        })
    }

    pub fn trusted_cert(&self) -> Option<&X509CertImpl> {
        match &self.anchor {
            Anchor::Certificate(cert) => Some(cert),
            Anchor::Key { .. } => None,
        }
    }

    pub fn ca(&self) -> Option<&X500Principal> {
        match &self.anchor {
            Anchor::Key { ca, .. } => Some(ca),
            Anchor::Certificate(_) => None,
        }
    }

    pub fn ca_name(&self) -> Option<String> {
        self.ca().map(ToString::to_string)
    }

    pub fn ca_public_key(&self) -> Option<&PublicKey> {
        match &self.anchor {
            Anchor::Key { public_key, .. } => Some(public_key),
            Anchor::Certificate(_) => None,
        }
    }

    pub fn name_constraints(&self) -> Option<&[u8]> {
        self.name_constraints.as_deref()
    }
}

impl fmt::Display for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        match &self.anchor {
            Anchor::Key { ca, public_key } => {
                writeln!(f, "  Trusted CA Public Key: {public_key}")?;
                writeln!(f, "  Trusted CA Issuer Name: {ca}")?;
            }
            Anchor::Certificate(cert) => writeln!(f, "  Trusted CA cert: {cert}")?,
        }
        if let Some(name_constraints) = &self.name_constraints {
            writeln!(f, "  Name Constraints: {}", hex::encode_upper(name_constraints))?;
        }
        write!(f, "]")
    }
}

/// Parameters of a certification path validation.
#[derive(Debug, Clone)]
pub struct PkixParameters {
    trust_anchors: Vec<TrustAnchor>,
    initial_policies: BTreeSet<String>,
    date: Option<DateTime<Utc>>,
    revocation_enabled: bool,
    explicit_policy_required: bool,
    policy_mapping_inhibited: bool,
    any_policy_inhibited: bool,
    policy_qualifiers_rejected: bool,
    sig_provider: Option<String>,
}

impl PkixParameters {
    pub fn new(trust_anchors: Vec<TrustAnchor>) -> Result<Self, TrustError> {
        let mut params = Self {
            trust_anchors: Vec::new(),
            initial_policies: BTreeSet::new(),
            date: None,
            revocation_enabled: true,
            explicit_policy_required: false,
            policy_mapping_inhibited: false,
            any_policy_inhibited: false,
            policy_qualifiers_rejected: true,
            sig_provider: None,
        };
        params.set_trust_anchors(trust_anchors)?;
        Ok(params)
    }

    pub fn trust_anchors(&self) -> &[TrustAnchor] {
        &self.trust_anchors
    }

    pub fn set_trust_anchors(&mut self, trust_anchors: Vec<TrustAnchor>) -> Result<(), TrustError> {
        if trust_anchors.is_empty() {
            return Err(TrustError::EmptyTrustAnchors);
        }
        self.trust_anchors = trust_anchors;
        Ok(())
    }

    /// Empty means any policy is acceptable.
    pub fn initial_policies(&self) -> &BTreeSet<String> {
        &self.initial_policies
    }

    pub fn set_initial_policies(&mut self, policies: BTreeSet<String>) {
        self.initial_policies = policies;
    }

    /// Validation time; `None` means now.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn set_date(&mut self, date: Option<DateTime<Utc>>) {
        self.date = date;
    }

    pub fn is_revocation_enabled(&self) -> bool {
        self.revocation_enabled
    }

    pub fn set_revocation_enabled(&mut self, enabled: bool) {
        self.revocation_enabled = enabled;
    }

    pub fn is_explicit_policy_required(&self) -> bool {
        self.explicit_policy_required
    }

    pub fn set_explicit_policy_required(&mut self, required: bool) {
        self.explicit_policy_required = required;
    }

    pub fn is_policy_mapping_inhibited(&self) -> bool {
        self.policy_mapping_inhibited
    }

    pub fn set_policy_mapping_inhibited(&mut self, inhibited: bool) {
        self.policy_mapping_inhibited = inhibited;
    }

    pub fn is_any_policy_inhibited(&self) -> bool {
        self.any_policy_inhibited
    }

    pub fn set_any_policy_inhibited(&mut self, inhibited: bool) {
        self.any_policy_inhibited = inhibited;
    }

    pub fn policy_qualifiers_rejected(&self) -> bool {
        self.policy_qualifiers_rejected
    }

    pub fn set_policy_qualifiers_rejected(&mut self, rejected: bool) {
        self.policy_qualifiers_rejected = rejected;
    }

    /// Name of the signature provider to use, the default one when `None`.
    pub fn sig_provider(&self) -> Option<&str> {
        self.sig_provider.as_deref()
    }

    pub fn set_sig_provider(&mut self, provider: Option<String>) {
        self.sig_provider = provider;
    }
}

impl fmt::Display for PkixParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        write!(f, "  Trust Anchors: [")?;
        for anchor in &self.trust_anchors {
            write!(f, "\n{anchor}")?;
        }
        writeln!(f, "]")?;
        writeln!(f, "  Initial Policy OIDs: {:?}", self.initial_policies)?;
        match &self.date {
            Some(date) => writeln!(f, "  Validity Date: {date}")?,
            None => writeln!(f, "  Validity Date: null")?,
        }
        writeln!(f, "  Signature Provider: {}", self.sig_provider.as_deref().unwrap_or("null"))?;
        writeln!(f, "  Default Revocation Enabled: {}", self.revocation_enabled)?;
        writeln!(f, "  Explicit Policy Required: {}", self.explicit_policy_required)?;
        writeln!(f, "  Policy Mapping Inhibited: {}", self.policy_mapping_inhibited)?;
        writeln!(f, "  Any Policy Inhibited: {}", self.any_policy_inhibited)?;
        writeln!(f, "  Policy Qualifiers Rejected: {}", self.policy_qualifiers_rejected)?;
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root_anchor() -> TrustAnchor {
        let cert = X509CertImpl::from_pem_str(pkix_test_data::ROOT_CA_P256).unwrap();
        TrustAnchor::from_certificate(cert, None).unwrap()
    }

    #[test]
    fn empty_anchor_set() {
        let err = PkixParameters::new(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "the trustAnchors parameter must be non-empty");

        let mut params = PkixParameters::new(vec![root_anchor()]).unwrap();
        assert!(params.set_trust_anchors(Vec::new()).is_err());
        assert_eq!(params.trust_anchors().len(), 1);
    }

    #[test]
    fn defaults() {
        let params = PkixParameters::new(vec![root_anchor()]).unwrap();
        assert!(params.is_revocation_enabled());
        assert!(params.policy_qualifiers_rejected());
        assert!(!params.is_explicit_policy_required());
        assert!(!params.is_policy_mapping_inhibited());
        assert!(!params.is_any_policy_inhibited());
        assert!(params.initial_policies().is_empty());
        assert_eq!(params.date(), None);
        assert_eq!(params.sig_provider(), None);
    }

    #[test]
    fn key_anchor() {
        let cert = X509CertImpl::from_pem_str(pkix_test_data::ROOT_CA_P256).unwrap();
        let anchor = TrustAnchor::from_key(
            cert.subject_dn().cloned().unwrap(),
            cert.public_key().cloned().unwrap(),
            Some(vec![0x30, 0x00]),
        )
        .unwrap();
        assert!(anchor.trusted_cert().is_none());
        assert_eq!(anchor.ca_name().as_deref(), Some("CN=Pkix Test Root CA,O=Pkix Test,C=CA"));
        assert_eq!(anchor.ca_public_key(), cert.public_key());
        assert_eq!(anchor.name_constraints(), Some(&[0x30, 0x00][..]));
    }

    #[test]
    fn invalid_name_constraints() {
        let cert = X509CertImpl::from_pem_str(pkix_test_data::ROOT_CA_P256).unwrap();
        assert!(TrustAnchor::from_certificate(cert.clone(), Some(vec![0x04, 0x00])).is_err());
        assert!(TrustAnchor::from_certificate(cert.clone(), Some(vec![0x30, 0x05])).is_err());
        assert!(TrustAnchor::from_certificate(cert, Some(vec![0x30, 0x00, 0x00])).is_err());
    }
}
