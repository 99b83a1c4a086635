use crate::oids;
use oid::ObjectIdentifier;
use pkix_asn1_der::{Asn1DerError, DerEncode, DerOutputStream, DerValue, Tag};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

const KEYWORDS: &[(&str, &str)] = &[
    ("CN", oids::AT_COMMON_NAME),
    ("C", oids::AT_COUNTRY_NAME),
    ("L", oids::AT_LOCALITY_NAME),
    ("ST", oids::AT_STATE_OR_PROVINCE_NAME),
    ("O", oids::AT_ORGANIZATION_NAME),
    ("OU", oids::AT_ORGANIZATIONAL_UNIT_NAME),
    ("STREET", oids::AT_STREET_NAME),
    ("DC", oids::AT_DOMAIN_COMPONENT),
    ("UID", oids::AT_USER_ID),
    ("SERIALNUMBER", oids::AT_SERIAL_NUMBER),
    ("EMAILADDRESS", oids::EMAIL_ADDRESS),
    ("SURNAME", oids::AT_SURNAME),
];

fn keyword_of(dotted: &str) -> Option<&'static str> {
    KEYWORDS.iter().find(|(_, oid)| *oid == dotted).map(|(keyword, _)| *keyword)
}

fn oid_of(keyword: &str) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(keyword))
        .map(|(_, oid)| *oid)
}

#[derive(Debug, Error)]
pub enum NameError {
    /// distinguished name string is malformed
    #[error("improperly specified input name: {0}")]
    Syntax(String),

    /// attribute value could not be encoded
    #[error("invalid attribute value: {source}")]
    Value { source: Asn1DerError },

    /// DER encoding of the name is malformed
    #[error("invalid X.500 name encoding: {source}")]
    Encoding {
        #[from]
        source: Asn1DerError,
    },
}

/// ```not_rust
/// AttributeTypeAndValue ::= SEQUENCE {
///      type     AttributeType,
///      value    AttributeValue }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    oid: ObjectIdentifier,
    value: DerValue,
}

impl AttributeTypeAndValue {
    pub fn new(oid: ObjectIdentifier, value: DerValue) -> Self {
        Self { oid, value }
    }

    pub fn new_common_name(name: &str) -> Self {
        Self::new(oids::at_common_name(), DerValue::from_string(name))
    }

    pub fn parse(value: &DerValue) -> Result<Self, Asn1DerError> {
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("AVA not a sequence".to_owned()));
        }
        let mut data = value.data();
        let oid = data.get_oid()?;
        let value = data.get_der_value()?;
        if data.available() != 0 {
            return Err(Asn1DerError::InvalidData("AVA, extra bytes".to_owned()));
        }
        Ok(Self { oid, value })
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn value(&self) -> &DerValue {
        &self.value
    }

    pub fn keyword(&self) -> Option<&'static str> {
        keyword_of(&Into::<String>::into(&self.oid))
    }

    fn type_label(&self) -> String {
        self.keyword()
            .map(str::to_owned)
            .unwrap_or_else(|| Into::<String>::into(&self.oid))
    }

    fn hex_value(&self) -> String {
        let mut out = String::from("#");
        for byte in self.value.to_byte_array() {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    fn rfc2253(&self) -> String {
        let value = match (self.keyword(), self.value.get_as_string()) {
            (Some(_), Some(text)) => escape(&text),
            _ => self.hex_value(),
        };
        format!("{}={}", self.type_label(), value)
    }

    fn canonical(&self) -> String {
        let value = match (self.keyword(), self.value.get_as_string()) {
            (Some(_), Some(text)) => {
                let folded = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
                escape(&folded)
            }
            _ => self.hex_value(),
        };
        format!("{}={}", self.type_label().to_lowercase(), value)
    }
}

impl DerEncode for AttributeTypeAndValue {
    fn encode_der(&self, out: &mut DerOutputStream) -> pkix_asn1_der::Result<()> {
        let mut content = DerOutputStream::new();
        content.put_oid(&self.oid)?;
        content.put_der_value(&self.value);
        out.write_stream(Tag::SEQUENCE, &content);
        Ok(())
    }
}

/// ```not_rust
/// RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    avas: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    pub fn new(avas: Vec<AttributeTypeAndValue>) -> Self {
        Self { avas }
    }

    pub fn avas(&self) -> &[AttributeTypeAndValue] {
        &self.avas
    }

    fn parse(value: &DerValue) -> Result<Self, Asn1DerError> {
        if value.tag() != Tag::SET {
            return Err(Asn1DerError::InvalidData("RDN not a set".to_owned()));
        }
        let mut data = value.data();
        let mut avas = Vec::new();
        while data.available() > 0 {
            avas.push(AttributeTypeAndValue::parse(&data.get_der_value()?)?);
        }
        if avas.is_empty() {
            return Err(Asn1DerError::InvalidData("empty RDN".to_owned()));
        }
        Ok(Self { avas })
    }

    fn rfc2253(&self) -> String {
        self.avas.iter().map(AttributeTypeAndValue::rfc2253).collect::<Vec<_>>().join("+")
    }

    fn canonical(&self) -> String {
        let mut avas = self.avas.iter().map(AttributeTypeAndValue::canonical).collect::<Vec<_>>();
        avas.sort();
        avas.join("+")
    }
}

/// An X.500 distinguished name, kept together with its DER encoding.
///
/// `Display` renders the RFC 2253 form: most specific RDN first, `,` between
/// RDNs and `+` between the values of a multi-valued RDN. Equality, hashing
/// and ordering use a canonical form of that string (case folded, internal
/// whitespace collapsed, values of multi-valued RDNs sorted).
#[derive(Debug, Clone)]
pub struct X500Principal {
    rdns: Vec<RelativeDistinguishedName>,
    encoded: Vec<u8>,
    canonical: String,
}

impl X500Principal {
    pub fn empty() -> Self {
        Self::from_rdns(Vec::new()).unwrap_or_else(|_| Self {
            rdns: Vec::new(),
            encoded: vec![Tag::SEQUENCE.inner(), 0x00],
            canonical: String::new(),
        })
    }

    /// Builds a name from RDNs listed in encoding order (least specific first).
    pub fn from_rdns(rdns: Vec<RelativeDistinguishedName>) -> Result<Self, Asn1DerError> {
        let mut content = DerOutputStream::new();
        for rdn in &rdns {
            content.put_ordered_set_of(Tag::SET, &rdn.avas)?;
        }
        let mut out = DerOutputStream::new();
        out.write_stream(Tag::SEQUENCE, &content);

        // re-read so the AVA order matches the sorted encoding
        Self::from_der(&out.into_bytes())
    }

    pub fn from_der(encoded: &[u8]) -> Result<Self, Asn1DerError> {
        Self::parse(&DerValue::from_der(encoded)?)
    }

    pub fn parse(value: &DerValue) -> Result<Self, Asn1DerError> {
        if value.tag() != Tag::SEQUENCE {
            return Err(Asn1DerError::InvalidData("X500Name not a sequence".to_owned()));
        }
        let mut data = value.data();
        let mut rdns = Vec::new();
        while data.available() > 0 {
            rdns.push(RelativeDistinguishedName::parse(&data.get_der_value()?)?);
        }
        let canonical = rdns
            .iter()
            .rev()
            .map(RelativeDistinguishedName::canonical)
            .collect::<Vec<_>>()
            .join(",");
        Ok(Self {
            rdns,
            encoded: value.to_byte_array(),
            canonical,
        })
    }

    pub fn rdns(&self) -> &[RelativeDistinguishedName] {
        &self.rdns
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Canonical string used for comparisons.
    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    /// String values of every attribute of the given type, most specific first.
    pub fn attribute_values(&self, oid: &ObjectIdentifier) -> Vec<String> {
        self.rdns
            .iter()
            .rev()
            .flat_map(|rdn| rdn.avas.iter())
            .filter(|ava| &ava.oid == oid)
            .filter_map(|ava| ava.value.get_as_string())
            .collect()
    }

    pub fn common_name(&self) -> Option<String> {
        self.attribute_values(&oids::at_common_name()).into_iter().next()
    }
}

impl DerEncode for X500Principal {
    fn encode_der(&self, out: &mut DerOutputStream) -> pkix_asn1_der::Result<()> {
        out.write_raw(&self.encoded);
        Ok(())
    }
}

impl PartialEq for X500Principal {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for X500Principal {}

impl Hash for X500Principal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for X500Principal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for X500Principal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for X500Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rdn in self.rdns.iter().rev() {
            if !first {
                f.write_char(',')?;
            }
            first = false;
            f.write_str(&rdn.rfc2253())?;
        }
        Ok(())
    }
}

impl FromStr for X500Principal {
    type Err = NameError;

    /// Parses an RFC 2253 / RFC 1779 style string such as
    /// `CN=Duke, OU=JavaSoft, O=Sun Microsystems, C=US`.
    fn from_str(name: &str) -> Result<Self, NameError> {
        if name.trim().is_empty() {
            return Ok(Self::empty());
        }

        let mut rdns = Vec::new();
        for rdn in split_unescaped(name, &[',', ';'])? {
            let mut avas = Vec::new();
            for ava in split_unescaped(&rdn, &['+'])? {
                avas.push(parse_ava(&ava)?);
            }
            rdns.push(RelativeDistinguishedName::new(avas));
        }
        rdns.reverse();

        Ok(Self::from_rdns(rdns)?)
    }
}

fn parse_ava(ava: &str) -> Result<AttributeTypeAndValue, NameError> {
    let (keyword, value) = ava
        .split_once('=')
        .ok_or_else(|| NameError::Syntax(format!("no '=' in attribute `{}`", ava.trim())))?;
    let keyword = keyword.trim();

    let dotted = match oid_of(keyword) {
        Some(oid) => oid.to_owned(),
        None => {
            let dotted = keyword
                .strip_prefix("OID.")
                .or_else(|| keyword.strip_prefix("oid."))
                .unwrap_or(keyword);
            if dotted.is_empty() || !dotted.chars().all(|c| c.is_ascii_digit() || c == '.') {
                return Err(NameError::Syntax(format!("unknown keyword `{keyword}`")));
            }
            dotted.to_owned()
        }
    };
    let oid = ObjectIdentifier::try_from(dotted.as_str())
        .map_err(|_| NameError::Syntax(format!("invalid attribute type `{keyword}`")))?;

    let value = value.trim_start();
    let value = if value.ends_with("\\ ") { value } else { value.trim_end() };

    let value = if let Some(hex) = value.strip_prefix('#') {
        DerValue::from_der(&decode_hex(hex)?).map_err(|source| NameError::Value { source })?
    } else {
        let text = if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            unescape(&value[1..value.len() - 1])?
        } else {
            unescape(value)?
        };
        match dotted.as_str() {
            oids::AT_COUNTRY_NAME => DerValue::new_string(Tag::PRINTABLE_STRING, &text),
            oids::AT_DOMAIN_COMPONENT | oids::EMAIL_ADDRESS => DerValue::new_string(Tag::IA5_STRING, &text),
            _ => Ok(DerValue::from_string(&text)),
        }
        .map_err(|source| NameError::Value { source })?
    };

    Ok(AttributeTypeAndValue::new(oid, value))
}

/// Splits on separators that are neither escaped nor quoted. Escapes are kept.
fn split_unescaped(input: &str, separators: &[char]) -> Result<Vec<String>, NameError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                let escaped = chars
                    .next()
                    .ok_or_else(|| NameError::Syntax("trailing backslash".to_owned()))?;
                current.push(escaped);
            }
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if !quoted && separators.contains(&c) => parts.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }

    if quoted {
        return Err(NameError::Syntax("unterminated quoted string".to_owned()));
    }
    parts.push(current);

    if parts.iter().any(|part| part.trim().is_empty()) {
        return Err(NameError::Syntax(format!("empty component in `{input}`")));
    }
    Ok(parts)
}

fn unescape(value: &str) -> Result<String, NameError> {
    let mut bytes = Vec::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let next = chars
            .next()
            .ok_or_else(|| NameError::Syntax("trailing backslash".to_owned()))?;
        match (next.to_digit(16), chars.peek().and_then(|c| c.to_digit(16))) {
            (Some(high), Some(low)) => {
                chars.next();
                bytes.push((high * 16 + low) as u8);
            }
            _ => {
                let mut buf = [0; 4];
                bytes.extend_from_slice(next.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    String::from_utf8(bytes).map_err(|_| NameError::Syntax("escaped bytes are not UTF-8".to_owned()))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (index, c) in value.chars().enumerate() {
        let special = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';')
            || (index == 0 && (c == '#' || c == ' '))
            || (index == last && c == ' ');
        if special {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, NameError> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(NameError::Syntax(format!("invalid hex value `#{hex}`")));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| NameError::Syntax(format!("invalid hex value `#{hex}`")))
}
