//! Keying of revoked certificate entries by `(issuer, serial number)`.

use crate::config::RevocationIndexKind;
use crate::x509::certificate::X509CertImpl;
use crate::x509::crl::X509CRLEntry;
use num_bigint_dig::BigInt;
use pkix_asn1_x509::X500Principal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a certificate across issuers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssuerSerial {
    issuer: X500Principal,
    serial: BigInt,
}

impl IssuerSerial {
    pub fn new(issuer: X500Principal, serial: BigInt) -> Self {
        Self { issuer, serial }
    }

    /// `None` when the certificate lacks an issuer or a serial number.
    pub fn of(cert: &X509CertImpl) -> Option<Self> {
        let issuer = cert.issuer_x500_principal()?;
        let serial = cert.serial_number()?.value().clone();
        Some(Self::new(issuer, serial))
    }

    pub fn issuer(&self) -> &X500Principal {
        &self.issuer
    }

    pub fn serial(&self) -> &BigInt {
        &self.serial
    }
}

impl Ord for IssuerSerial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.issuer
            .cmp(&other.issuer)
            .then_with(|| self.serial.cmp(&other.serial))
    }
}

impl PartialOrd for IssuerSerial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IssuerSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.issuer, self.serial.to_str_radix(16).to_uppercase())
    }
}

/// Decides which issuer a CRL entry revokes a certificate of.
pub trait RevocationIndex: Send + Sync + fmt::Debug {
    /// `previous` is the issuer of the preceding entry, the CRL issuer for
    /// the first one.
    fn certificate_issuer(&self, entry: &X509CRLEntry, previous: &X500Principal) -> X500Principal;
}

/// Every entry belongs to the CRL issuer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectRevocationIndex;

impl RevocationIndex for DirectRevocationIndex {
    fn certificate_issuer(&self, _: &X509CRLEntry, previous: &X500Principal) -> X500Principal {
        previous.clone()
    }
}

/// Honours the `CertificateIssuer` entry extension of indirect CRLs.
///
/// An entry without the extension belongs to the issuer of the entry before it.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndirectRevocationIndex;

impl RevocationIndex for IndirectRevocationIndex {
    fn certificate_issuer(&self, entry: &X509CRLEntry, previous: &X500Principal) -> X500Principal {
        entry
            .certificate_issuer_extension()
            .unwrap_or_else(|| previous.clone())
    }
}

impl RevocationIndexKind {
    pub fn index(self) -> &'static dyn RevocationIndex {
        static DIRECT: DirectRevocationIndex = DirectRevocationIndex;
        static INDIRECT: IndirectRevocationIndex = IndirectRevocationIndex;

        match self {
            Self::Direct => &DIRECT,
            Self::Indirect => &INDIRECT,
        }
    }
}

/// Revoked entries keyed by issuer and serial number, remembering the order
/// they were listed in.
#[derive(Debug, Clone, Default)]
pub(crate) struct RevokedEntries {
    entries: BTreeMap<IssuerSerial, X509CRLEntry>,
    listed: Vec<IssuerSerial>,
}

impl RevokedEntries {
    pub(crate) fn get(&self, key: &IssuerSerial) -> Option<&X509CRLEntry> {
        self.entries.get(key)
    }

    pub(crate) fn contains(&self, key: &IssuerSerial) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Ordered by issuer, then serial number.
    pub(crate) fn values(&self) -> impl Iterator<Item = &X509CRLEntry> {
        self.entries.values()
    }

    /// In listing order, the order an indirect CRL must be encoded in for
    /// entries without a `CertificateIssuer` extension to keep their issuer.
    pub(crate) fn listed(&self) -> impl Iterator<Item = &X509CRLEntry> {
        self.listed.iter().filter_map(|key| self.entries.get(key))
    }
}

/// Keys `entries` in order, recording on each entry the issuer it was filed under
/// when that differs from `crl_issuer`. A later duplicate replaces the earlier one.
pub(crate) fn index_entries(
    index: &dyn RevocationIndex,
    crl_issuer: &X500Principal,
    entries: Vec<X509CRLEntry>,
) -> RevokedEntries {
    let mut revoked = RevokedEntries::default();
    let mut issuer = crl_issuer.clone();

    for mut entry in entries {
        issuer = index.certificate_issuer(&entry, &issuer);
        entry.set_certificate_issuer(crl_issuer, &issuer);

        let key = IssuerSerial::new(issuer.clone(), entry.serial_number().value().clone());
        if revoked.entries.insert(key.clone(), entry).is_some() {
            log::debug!("duplicate CRL entry for serial number under {issuer}");
        } else {
            revoked.listed.push(key);
        }
    }

    revoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pkix_asn1_x509::{Extension, Extensions, GeneralName, SerialNumber};
    use pretty_assertions::assert_eq;

    fn principal(dn: &str) -> X500Principal {
        dn.parse().unwrap()
    }

    fn entry(serial: u64, issuer: Option<&X500Principal>) -> X509CRLEntry {
        let extensions = issuer.map(|issuer| {
            let mut extensions = Extensions::new();
            extensions.insert(Extension::new_certificate_issuer(&[GeneralName::DirectoryName(
                issuer.clone(),
            )]));
            extensions
        });
        X509CRLEntry::new(
            SerialNumber::from(serial),
            Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap(),
            extensions,
        )
    }

    #[test]
    fn issuer_serial_orders_by_issuer_then_serial() {
        let a = principal("CN=A");
        let b = principal("CN=B");
        let mut keys = vec![
            IssuerSerial::new(b.clone(), BigInt::from(1)),
            IssuerSerial::new(a.clone(), BigInt::from(2)),
            IssuerSerial::new(a.clone(), BigInt::from(1)),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                IssuerSerial::new(a.clone(), BigInt::from(1)),
                IssuerSerial::new(a, BigInt::from(2)),
                IssuerSerial::new(b, BigInt::from(1)),
            ]
        );
    }

    #[test]
    fn direct_index_ignores_certificate_issuer() {
        let crl_issuer = principal("CN=CRL Issuer");
        let other = principal("CN=Other CA");
        let revoked = index_entries(
            &DirectRevocationIndex,
            &crl_issuer,
            vec![entry(1, None), entry(2, Some(&other))],
        );

        assert!(revoked.contains(&IssuerSerial::new(crl_issuer.clone(), BigInt::from(2))));
        assert!(revoked.values().all(|entry| entry.certificate_issuer().is_none()));
    }

    #[test]
    fn indirect_index_carries_issuer_forward() {
        let crl_issuer = principal("CN=CRL Issuer");
        let other = principal("CN=Other CA");
        let revoked = index_entries(
            &IndirectRevocationIndex,
            &crl_issuer,
            vec![entry(1, None), entry(2, Some(&other)), entry(3, None)],
        );

        let issuers = revoked
            .listed()
            .map(|entry| {
                let issuer = entry.certificate_issuer().unwrap_or(&crl_issuer);
                (entry.serial_number().value().clone(), issuer.clone())
            })
            .collect::<Vec<_>>();
        assert_eq!(
            issuers,
            vec![
                (BigInt::from(1), crl_issuer.clone()),
                (BigInt::from(2), other.clone()),
                (BigInt::from(3), other.clone()),
            ]
        );

        let third = revoked.get(&IssuerSerial::new(other.clone(), BigInt::from(3))).unwrap();
        assert_eq!(third.certificate_issuer(), Some(&other));
        assert!(revoked.get(&IssuerSerial::new(crl_issuer, BigInt::from(3))).is_none());
    }

    #[test]
    fn index_from_kind() {
        let crl_issuer = principal("CN=CRL Issuer");
        let other = principal("CN=Other CA");
        let e = entry(9, Some(&other));
        assert_eq!(
            RevocationIndexKind::Direct.index().certificate_issuer(&e, &crl_issuer),
            crl_issuer
        );
        assert_eq!(
            RevocationIndexKind::Indirect.index().certificate_issuer(&e, &crl_issuer),
            other
        );
    }
}
