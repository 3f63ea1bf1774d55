//! Content and commit hashes
//!
//! A [`Hash`] is a digest tagged with the algorithm that produced it. Commit
//! revisions are SHA-1 hashes written as 40 hex digits; tarball pins are SRI
//! hashes (`sha256-<base64>`). The all-zero digest of an algorithm is the
//! "empty" hash, used as the dirty working tree sentinel.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::flakeref::bad_ref;
use crate::error::Result;

/// Hash algorithms accepted in references
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Digest size in bytes
    pub fn size(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "md5" => Some(HashAlgorithm::Md5),
            "sha1" => Some(HashAlgorithm::Sha1),
            "sha256" => Some(HashAlgorithm::Sha256),
            "sha512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    /// Length of the base16 representation
    pub fn base16_len(self) -> usize {
        self.size() * 2
    }
}

/// A digest of a fixed-length, declared algorithm
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    digest: Vec<u8>,
}

impl Hash {
    /// The all-zero hash of an algorithm
    pub fn empty(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            digest: vec![0; algorithm.size()],
        }
    }

    /// Build a hash from raw digest bytes; the length must match the algorithm
    pub fn from_digest(algorithm: HashAlgorithm, digest: Vec<u8>) -> Option<Self> {
        (digest.len() == algorithm.size()).then_some(Self { algorithm, digest })
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    pub fn is_empty(&self) -> bool {
        self.digest.iter().all(|b| *b == 0)
    }

    /// Whether `input` is a full base16 digest for `algorithm`
    pub fn is_base16(input: &str, algorithm: HashAlgorithm) -> bool {
        input.len() == algorithm.base16_len() && input.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Parse a base16 digest of the given algorithm (case-insensitive)
    pub fn parse_base16(input: &str, algorithm: HashAlgorithm) -> Result<Self> {
        if !Self::is_base16(input, algorithm) {
            return Err(bad_ref(
                input,
                format!(
                    "expected {} hex digits for a {} hash",
                    algorithm.base16_len(),
                    algorithm.name()
                ),
            ));
        }

        let digest =
            hex::decode(input).map_err(|e| bad_ref(input, format!("invalid hex digest: {e}")))?;

        Ok(Self { algorithm, digest })
    }

    /// Parse an SRI hash (`<algo>-<base64>`), also accepting a base16 body
    pub fn parse_sri(input: &str) -> Result<Self> {
        let (name, body) = input
            .split_once('-')
            .ok_or_else(|| bad_ref(input, "expected an SRI hash of the form <algo>-<digest>"))?;

        let algorithm = HashAlgorithm::from_name(name)
            .ok_or_else(|| bad_ref(input, format!("unknown hash algorithm '{name}'")))?;

        if Self::is_base16(body, algorithm) {
            return Self::parse_base16(body, algorithm);
        }

        let digest = BASE64
            .decode(body)
            .map_err(|e| bad_ref(input, format!("invalid base64 digest: {e}")))?;

        Self::from_digest(algorithm, digest).ok_or_else(|| {
            bad_ref(
                input,
                format!("digest has the wrong length for a {} hash", algorithm.name()),
            )
        })
    }

    pub fn to_base16(&self) -> String {
        hex::encode(&self.digest)
    }

    pub fn to_sri(&self) -> String {
        format!("{}-{}", self.algorithm.name(), BASE64.encode(&self.digest))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.algorithm {
            HashAlgorithm::Sha1 => f.write_str(&self.to_base16()),
            _ => f.write_str(&self.to_sri()),
        }
    }
}
