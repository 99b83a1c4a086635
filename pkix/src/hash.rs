//! Message digests used by signature algorithms

use digest::{Digest, DynDigest};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    /// unknown digest name
    #[error("{name} MessageDigest not available")]
    NoSuchAlgorithm { name: String },

    /// output buffer too small
    #[error("output buffer too small: {needed} bytes needed, {available} available")]
    ShortBuffer { needed: usize, available: usize },
}

/// Supported hash algorithms
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HashAlgorithm {
    MD5,
    SHA1,
    SHA2_224,
    SHA2_256,
    SHA2_384,
    SHA2_512,
}

impl HashAlgorithm {
    /// Accepts both `SHA-256` and `SHA256` spellings, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.to_ascii_uppercase().replace('-', "");
        match normalized.as_str() {
            "MD5" => Some(Self::MD5),
            "SHA" | "SHA1" => Some(Self::SHA1),
            "SHA224" => Some(Self::SHA2_224),
            "SHA256" => Some(Self::SHA2_256),
            "SHA384" => Some(Self::SHA2_384),
            "SHA512" => Some(Self::SHA2_512),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::MD5 => "MD5",
            Self::SHA1 => "SHA-1",
            Self::SHA2_224 => "SHA-224",
            Self::SHA2_256 => "SHA-256",
            Self::SHA2_384 => "SHA-384",
            Self::SHA2_512 => "SHA-512",
        }
    }

    pub fn output_size(self) -> usize {
        match self {
            Self::MD5 => 16,
            Self::SHA1 => 20,
            Self::SHA2_224 => 28,
            Self::SHA2_256 => 32,
            Self::SHA2_384 => 48,
            Self::SHA2_512 => 64,
        }
    }

    pub fn digest(self, msg: &[u8]) -> Vec<u8> {
        match self {
            Self::MD5 => md5::Md5::digest(msg).as_slice().to_vec(),
            Self::SHA1 => sha1::Sha1::digest(msg).as_slice().to_vec(),
            Self::SHA2_224 => sha2::Sha224::digest(msg).as_slice().to_vec(),
            Self::SHA2_256 => sha2::Sha256::digest(msg).as_slice().to_vec(),
            Self::SHA2_384 => sha2::Sha384::digest(msg).as_slice().to_vec(),
            Self::SHA2_512 => sha2::Sha512::digest(msg).as_slice().to_vec(),
        }
    }

    fn hasher(self) -> Box<dyn DynDigest + Send + Sync> {
        match self {
            Self::MD5 => Box::<md5::Md5>::default(),
            Self::SHA1 => Box::<sha1::Sha1>::default(),
            Self::SHA2_224 => Box::<sha2::Sha224>::default(),
            Self::SHA2_256 => Box::<sha2::Sha256>::default(),
            Self::SHA2_384 => Box::<sha2::Sha384>::default(),
            Self::SHA2_512 => Box::<sha2::Sha512>::default(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Incremental digest computation.
pub trait MessageDigest: Send + Sync {
    fn algorithm(&self) -> HashAlgorithm;

    fn update(&mut self, input: &[u8]);

    fn update_byte(&mut self, input: u8) {
        self.update(&[input]);
    }

    /// Writes the digest at `out[offset..]` and resets; returns the number of bytes written.
    fn do_final(&mut self, out: &mut [u8], offset: usize) -> Result<usize, DigestError>;

    /// Completes the computation and resets.
    fn digest(&mut self) -> Vec<u8>;

    fn digest_size(&self) -> usize {
        self.algorithm().output_size()
    }

    fn reset(&mut self);
}

/// Returns a fresh digest for `name` (`SHA-256`, `sha1`, `MD5`...).
pub fn get_instance(name: &str) -> Result<Box<dyn MessageDigest>, DigestError> {
    let algorithm = HashAlgorithm::from_name(name).ok_or_else(|| DigestError::NoSuchAlgorithm {
        name: name.to_owned(),
    })?;
    Ok(Box::new(DynMessageDigest::new(algorithm)))
}

struct DynMessageDigest {
    algorithm: HashAlgorithm,
    inner: Box<dyn DynDigest + Send + Sync>,
}

impl DynMessageDigest {
    fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            inner: algorithm.hasher(),
        }
    }
}

impl MessageDigest for DynMessageDigest {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn update(&mut self, input: &[u8]) {
        self.inner.update(input);
    }

    fn do_final(&mut self, out: &mut [u8], offset: usize) -> Result<usize, DigestError> {
        let size = self.inner.output_size();
        let available = out.len().saturating_sub(offset);
        if available < size {
            return Err(DigestError::ShortBuffer { needed: size, available });
        }
        self.inner
            .finalize_into_reset(&mut out[offset..offset + size])
            .map_err(|_| DigestError::ShortBuffer { needed: size, available })?;
        Ok(size)
    }

    fn digest(&mut self) -> Vec<u8> {
        self.inner.finalize_reset().to_vec()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("MD5", "900150983cd24fb0d6963f7d28e17f72")]
    #[case("SHA-1", "a9993e364706816aba3e25717850c26c9cd0d89d")]
    #[case("sha224", "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7")]
    #[case("SHA256", "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")]
    fn known_answers(#[case] name: &str, #[case] expected: &str) {
        let mut digest = get_instance(name).unwrap();
        digest.update(b"ab");
        digest.update_byte(b'c');
        assert_eq!(hex::encode(digest.digest()), expected);
    }

    #[test]
    fn do_final_writes_at_offset_and_resets() {
        let mut digest = get_instance("SHA-1").unwrap();
        digest.update(b"abc");

        let mut out = [0u8; 24];
        assert_eq!(digest.do_final(&mut out, 4).unwrap(), 20);
        assert_eq!(&out[4..], HashAlgorithm::SHA1.digest(b"abc").as_slice());

        assert_eq!(digest.digest(), HashAlgorithm::SHA1.digest(b""));
    }

    #[test]
    fn short_buffer() {
        let mut digest = get_instance("SHA-256").unwrap();
        let mut out = [0u8; 40];
        let err = digest.do_final(&mut out, 10).unwrap_err();
        assert!(matches!(err, DigestError::ShortBuffer { needed: 32, available: 30 }));
    }

    #[test]
    fn unknown_algorithm() {
        let err = get_instance("WHIRLPOOL").err().unwrap();
        assert_eq!(err.to_string(), "WHIRLPOOL MessageDigest not available");
    }

    #[test]
    fn reset_discards_input() {
        let mut digest = get_instance("SHA-512").unwrap();
        digest.update(b"garbage");
        digest.reset();
        digest.update(b"abc");
        assert_eq!(digest.digest(), HashAlgorithm::SHA2_512.digest(b"abc"));
        assert_eq!(digest.digest_size(), 64);
    }
}
