use chrono::{DateTime, TimeZone, Utc};
use pkix_asn1_der::{Asn1DerError, DerEncode, DerOutputStream, DerValue, Result, Tag};

/// Outcome of checking a date against a validity period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityCheck {
    Valid,
    NotYetValid,
    Expired,
}

/// ```not_rust
/// Validity ::= SEQUENCE {
///      notBefore      Time,
///      notAfter       Time }
///
/// Time ::= CHOICE {
///      utcTime        UTCTime,
///      generalTime    GeneralizedTime }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CertificateValidity {
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateValidity {
    pub fn new(not_before: DateTime<Utc>, not_after: DateTime<Utc>) -> Self {
        Self { not_before, not_after }
    }

    pub fn parse(value: &DerValue) -> Result<Self> {
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData(
                "Invalid encoded CertificateValidity, starting sequence tag missing.".to_owned(),
            ));
        }
        let mut data = value.data();
        let not_before = parse_time(&data.get_der_value()?)?;
        let not_after = parse_time(&data.get_der_value()?)?;
        if data.available() != 0 {
            return Err(Asn1DerError::InvalidData(
                "Invalid encoded CertificateValidity, extra data".to_owned(),
            ));
        }
        Ok(Self { not_before, not_after })
    }

    /// Both bounds are inclusive.
    pub fn check(&self, at: &DateTime<Utc>) -> ValidityCheck {
        if *at < self.not_before {
            ValidityCheck::NotYetValid
        } else if *at > self.not_after {
            ValidityCheck::Expired
        } else {
            ValidityCheck::Valid
        }
    }
}

impl DerEncode for CertificateValidity {
    fn encode_der(&self, out: &mut DerOutputStream) -> Result<()> {
        let mut content = DerOutputStream::new();
        put_time(&mut content, &self.not_before);
        put_time(&mut content, &self.not_after);
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(())
    }
}

/// Reads a `Time` CHOICE.
pub fn parse_time(value: &DerValue) -> Result<DateTime<Utc>> {
    match value.tag() {
        Tag::UTC_TIME => value.get_utc_time(),
        Tag::GENERALIZED_TIME => value.get_generalized_time(),
        other => Err(Asn1DerError::InvalidData(format!(
            "Invalid encoding for Time (tag={})",
            other.inner()
        ))),
    }
}

/// Writes a `Time` CHOICE: UTCTime through 2049, GeneralizedTime from 2050 on.
pub fn put_time(out: &mut DerOutputStream, time: &DateTime<Utc>) {
    if uses_utc_time(time) {
        out.put_utc_time(time);
    } else {
        out.put_generalized_time(time);
    }
}

fn uses_utc_time(time: &DateTime<Utc>) -> bool {
    let lower = Utc.with_ymd_and_hms(1950, 1, 1, 0, 0, 0).single();
    let upper = Utc.with_ymd_and_hms(2050, 1, 1, 0, 0, 0).single();
    match (lower, upper) {
        (Some(lower), Some(upper)) => *time >= lower && *time < upper,
        _ => false,
    }
}
