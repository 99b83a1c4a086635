use std::cmp::Ordering;

/// Lexicographic order over unsigned byte strings.
///
/// Used to sort the encodings of a DER `SET OF`. When one array is a prefix of
/// the other, the shorter one comes first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ByteArrayLexOrder;

impl ByteArrayLexOrder {
    pub fn compare(&self, lhs: &[u8], rhs: &[u8]) -> Ordering {
        for (l, r) in lhs.iter().zip(rhs.iter()) {
            match l.cmp(r) {
                Ordering::Equal => continue,
                diff => return diff,
            }
        }
        lhs.len().cmp(&rhs.len())
    }

    /// Sorts `encodings` in place.
    pub fn sort<T: AsRef<[u8]>>(&self, encodings: &mut [T]) {
        encodings.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0x01, 0x02], &[0x01, 0x03], Ordering::Less)]
    #[case(&[0x80], &[0x7F], Ordering::Greater)]
    #[case(&[0x01, 0x02], &[0x01, 0x02, 0x00], Ordering::Less)]
    #[case(&[0xFF, 0x00], &[0xFF, 0x00], Ordering::Equal)]
    #[case(&[], &[0x00], Ordering::Less)]
    fn compare(#[case] lhs: &[u8], #[case] rhs: &[u8], #[case] expected: Ordering) {
        assert_eq!(ByteArrayLexOrder.compare(lhs, rhs), expected);
        assert_eq!(ByteArrayLexOrder.compare(rhs, lhs), expected.reverse());
    }

    #[test]
    fn sort_set_of_encodings() {
        let mut encodings = vec![vec![0x31, 0x02, 0xFF], vec![0x31, 0x01], vec![0x0C, 0x00]];
        ByteArrayLexOrder.sort(&mut encodings);
        assert_eq!(encodings, vec![vec![0x0C, 0x00], vec![0x31, 0x01], vec![0x31, 0x02, 0xFF]]);
    }
}
