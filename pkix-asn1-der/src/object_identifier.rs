//! Base-128 content octets of an OBJECT IDENTIFIER.

use crate::{Asn1DerError, Result};
use oid::ObjectIdentifier;

/// Content octets are checked for DER form, then handed to the `oid` crate's
/// own BER conversion.
pub(crate) fn decode_oid(content: &[u8]) -> Result<ObjectIdentifier> {
    let arcs = decode_arcs(content)?;
    ObjectIdentifier::try_from(content)
        .map_err(|e| Asn1DerError::InvalidOid(format!("{:?} rejected: {:?}", arcs, e)))
}

pub(crate) fn decode_arcs(content: &[u8]) -> Result<Vec<u64>> {
    let Some(last) = content.last() else {
        return Err(Asn1DerError::InvalidOid("ObjectIdentifier() -- empty encoding".to_owned()));
    };
    if last & 0x80 != 0 {
        return Err(Asn1DerError::InvalidOid(
            "ObjectIdentifier() -- Invalid DER encoding, not ended".to_owned(),
        ));
    }

    let mut components = Vec::new();
    let mut value: u64 = 0;
    let mut starting = true;
    for byte in content {
        if starting && *byte == 0x80 {
            return Err(Asn1DerError::InvalidOid(
                "ObjectIdentifier() -- Invalid DER encoding, useless extra octet detected".to_owned(),
            ));
        }
        if value.leading_zeros() < 7 {
            return Err(Asn1DerError::InvalidOid(
                "ObjectIdentifier() -- component too large".to_owned(),
            ));
        }
        value = (value << 7) | u64::from(byte & 0x7F);
        starting = byte & 0x80 == 0;
        if starting {
            components.push(value);
            value = 0;
        }
    }

    let mut arcs = Vec::with_capacity(components.len() + 1);
    let first = components[0];
    match first {
        0..=39 => arcs.extend([0, first]),
        40..=79 => arcs.extend([1, first - 40]),
        _ => arcs.extend([2, first - 80]),
    }
    arcs.extend_from_slice(&components[1..]);

    Ok(arcs)
}

pub(crate) fn encode_oid(oid: &ObjectIdentifier) -> Result<Vec<u8>> {
    let dotted: String = oid.into();
    let arcs = dotted
        .split('.')
        .map(|arc| {
            arc.parse::<u64>()
                .map_err(|_| Asn1DerError::InvalidOid(format!("invalid arc `{}` in {}", arc, dotted)))
        })
        .collect::<Result<Vec<u64>>>()?;
    encode_arcs(&arcs)
}

pub(crate) fn encode_arcs(arcs: &[u64]) -> Result<Vec<u8>> {
    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] > 39) {
        return Err(Asn1DerError::InvalidOid(format!("invalid leading arcs {:?}", arcs)));
    }

    let first = arcs[0]
        .checked_mul(40)
        .and_then(|v| v.checked_add(arcs[1]))
        .ok_or_else(|| Asn1DerError::InvalidOid("ObjectIdentifier() -- component too large".to_owned()))?;

    let mut out = Vec::new();
    for component in std::iter::once(first).chain(arcs[2..].iter().copied()) {
        let mut septets = vec![(component & 0x7F) as u8];
        let mut rest = component >> 7;
        while rest != 0 {
            septets.push(0x80 | (rest & 0x7F) as u8);
            rest >>= 7;
        }
        out.extend(septets.iter().rev());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sha256_with_rsa() {
        let content = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];
        assert_eq!(decode_arcs(&content).unwrap(), vec![1, 2, 840, 113549, 1, 1, 11]);
        assert_eq!(encode_arcs(&[1, 2, 840, 113549, 1, 1, 11]).unwrap(), content.to_vec());

        let oid = decode_oid(&content).unwrap();
        assert_eq!(Into::<String>::into(&oid), "1.2.840.113549.1.1.11");
        assert_eq!(encode_oid(&oid).unwrap(), content.to_vec());
    }

    #[test]
    fn joint_iso_itu_large_second_arc() {
        // 2.100.3
        let encoded = encode_arcs(&[2, 100, 3]).unwrap();
        assert_eq!(encoded, vec![0x81, 0x34, 0x03]);
        assert_eq!(decode_arcs(&encoded).unwrap(), vec![2, 100, 3]);
    }

    #[test]
    fn large_child_arcs() {
        // 1.2.840.10045.4.3.2
        let content = [0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02];
        let oid = decode_oid(&content).unwrap();
        assert_eq!(Into::<String>::into(&oid), "1.2.840.10045.4.3.2");
        assert_eq!(oid, ObjectIdentifier::try_from("1.2.840.10045.4.3.2").unwrap());
    }

    #[test]
    fn rejects_malformed_content() {
        assert!(decode_arcs(&[]).is_err());
        assert!(decode_arcs(&[0x2A, 0x86]).is_err());
        assert!(decode_arcs(&[0x2A, 0x80, 0x01]).is_err());
        assert!(decode_oid(&[0x2A, 0x86]).is_err());
        assert!(decode_oid(&[0x2A, 0x80, 0x01]).is_err());
    }
}
