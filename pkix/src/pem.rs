//! Textual encoding of DER structures (RFC 7468)
//!
//! Parsing is line oriented: anything before a `-----BEGIN <label>-----` line
//! is skipped (explanatory text as printed by `openssl x509 -text`), and the
//! base64 body runs up to the matching `-----END <label>-----` line.

use base64::engine::general_purpose::STANDARD;
use base64::{DecodeError, Engine as _};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const BOUNDARY: &str = "-----";
const BEGIN: &str = "BEGIN ";
const END: &str = "END ";
const LINE_WIDTH: usize = 64;

#[derive(Debug, Clone, Error)]
pub enum PemError {
    /// no `-----BEGIN` line
    #[error("pem header not found")]
    HeaderNotFound,

    /// malformed `-----BEGIN` line
    #[error("invalid pem header")]
    InvalidHeader,

    /// input ended before the `-----END` line
    #[error("pem footer not found")]
    FooterNotFound,

    /// `-----END` line names another label
    #[error("pem footer label [{footer}] does not match header label [{header}]")]
    LabelMismatch { header: String, footer: String },

    /// couldn't decode base64
    #[error("couldn't decode base64: {source}")]
    Base64Decoding { source: DecodeError },
}

/// A labelled binary payload, usually DER.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pem<'a> {
    label: String,
    data: Cow<'a, [u8]>,
}

impl<'a> Pem<'a> {
    pub fn new<S: Into<String>, D: Into<Cow<'a, [u8]>>>(label: S, data: D) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Cow<'a, [u8]> {
        self.data
    }
}

impl FromStr for Pem<'static> {
    type Err = PemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pem(s)
    }
}

impl fmt::Display for Pem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BOUNDARY}{BEGIN}{}{BOUNDARY}", self.label)?;

        let body = STANDARD.encode(&self.data);
        let mut rest = body.as_str();
        while !rest.is_empty() {
            let (line, tail) = rest.split_at(rest.len().min(LINE_WIDTH));
            writeln!(f, "{line}")?;
            rest = tail;
        }

        write!(f, "{BOUNDARY}{END}{}{BOUNDARY}", self.label)
    }
}

impl From<Pem<'_>> for String {
    fn from(pem: Pem<'_>) -> Self {
        pem.to_string()
    }
}

/// `Some(label)` if `line` is a `-----<marker><label>-----` boundary.
fn boundary_label<'l>(line: &'l str, marker: &str) -> Option<&'l str> {
    line.trim()
        .strip_prefix(BOUNDARY)?
        .strip_prefix(marker)?
        .strip_suffix(BOUNDARY)
        .map(str::trim)
}

/// PEM blocks of a text, in order.
///
/// Yields an error for a malformed block and stops after it.
#[derive(Debug, Clone)]
pub struct PemBlocks<'i> {
    lines: std::str::Lines<'i>,
    failed: bool,
}

impl Iterator for PemBlocks<'_> {
    type Item = Result<Pem<'static>, PemError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let header = self.lines.by_ref().find(|line| line.trim_start().starts_with(BOUNDARY))?;
        let result = self.read_block(header);
        self.failed = result.is_err();
        Some(result)
    }
}

impl PemBlocks<'_> {
    fn read_block(&mut self, header: &str) -> Result<Pem<'static>, PemError> {
        let label = boundary_label(header, BEGIN).ok_or(PemError::InvalidHeader)?;

        let mut body = String::new();
        loop {
            let line = self.lines.next().ok_or(PemError::FooterNotFound)?;
            if let Some(footer) = boundary_label(line, END) {
                if footer != label {
                    return Err(PemError::LabelMismatch {
                        header: label.to_owned(),
                        footer: footer.to_owned(),
                    });
                }
                break;
            }
            body.extend(line.chars().filter(|c| !c.is_ascii_whitespace()));
        }

        let data = STANDARD
            .decode(body)
            .map_err(|source| PemError::Base64Decoding { source })?;

        Ok(Pem::new(label, data))
    }
}

/// Iterates over every PEM block of `input`, such as a certificate bundle.
pub fn pem_blocks(input: &str) -> PemBlocks<'_> {
    PemBlocks {
        lines: input.lines(),
        failed: false,
    }
}

/// First PEM block of `input`.
pub fn parse_pem<T: ?Sized + AsRef<[u8]>>(input: &T) -> Result<Pem<'static>, PemError> {
    let text = String::from_utf8_lossy(input.as_ref());
    let first = pem_blocks(&text).next();
    first.unwrap_or(Err(PemError::HeaderNotFound))
}

pub fn to_pem<S, T>(label: S, data: &T) -> String
where
    S: Into<String>,
    T: ?Sized + AsRef<[u8]>,
{
    Pem::new(label, data.as_ref()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROOT: &str = pkix_test_data::ROOT_CA_P256;

    #[test]
    fn read_certificate() {
        let from_bytes = parse_pem(ROOT.as_bytes()).unwrap();
        assert_eq!(from_bytes.label(), "CERTIFICATE");
        assert_eq!(from_bytes.data()[0], 0x30);
        assert_eq!(from_bytes, ROOT.parse::<Pem>().unwrap());
    }

    #[test]
    fn display_reproduces_input() {
        let pem = ROOT.parse::<Pem>().unwrap();
        assert_eq!(pem.to_string(), ROOT.trim_end());
    }

    #[test]
    fn lines_are_64_columns() {
        let pem = to_pem("DATA", &[0xA5u8; 100][..]);
        let body: Vec<&str> = pem.lines().skip(1).take_while(|line| !line.starts_with(BOUNDARY)).collect();
        assert_eq!(body.len(), 3);
        assert!(body[..2].iter().all(|line| line.len() == LINE_WIDTH));
    }

    #[test]
    fn leading_text_and_crlf() {
        let input = format!("Certificate:\r\n    Data: ...\r\n{}", ROOT.replace('\n', "\r\n"));
        assert_eq!(parse_pem(&input).unwrap(), parse_pem(ROOT).unwrap());
    }

    #[test]
    fn bundle() {
        let bundle = format!("{}\n{}", pkix_test_data::LEAF_P256, pkix_test_data::ROOT_CA_P256_CRL);
        let labels = pem_blocks(&bundle)
            .map(|pem| pem.unwrap().label().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["CERTIFICATE", "X509 CRL"]);
    }

    #[test]
    fn malformed() {
        assert!(matches!(parse_pem("no pem here"), Err(PemError::HeaderNotFound)));
        assert!(matches!(parse_pem("-----BEGAN X-----\n"), Err(PemError::InvalidHeader)));
        assert!(matches!(
            parse_pem("-----BEGIN CERTIFICATE-----\nAAAA\n"),
            Err(PemError::FooterNotFound)
        ));
        assert!(matches!(
            parse_pem("-----BEGIN X-----\nAAAA\n-----END Y-----\n"),
            Err(PemError::LabelMismatch { .. })
        ));
        assert!(matches!(
            parse_pem("-----BEGIN X-----\n@@@@\n-----END X-----"),
            Err(PemError::Base64Decoding { .. })
        ));

        let mut blocks = pem_blocks("-----BEGIN X-----\n@@@@\n-----END X-----\n-----BEGIN Y-----\n-----END Y-----\n");
        assert!(blocks.next().unwrap().is_err());
        assert!(blocks.next().is_none());
    }
}
