//! `Digest` header values (§4.7) and body-digest validation.

use base64::Engine;
use sha2::{Digest as _, Sha256, Sha512};

use crate::error::{Error, Result};

/// The digest algorithm named in a `Digest` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    fn wire_name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    fn expected_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    fn compute(&self, body: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha256 => Sha256::digest(body).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(body).to_vec(),
        }
    }
}

/// A parsed `Digest` header: `SHA-256=<base64>` (§4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub algorithm: DigestAlgorithm,
    pub value: Vec<u8>,
}

impl Digest {
    /// Computes the digest of `body` under `algorithm`.
    pub fn compute(algorithm: DigestAlgorithm, body: &[u8]) -> Self {
        Self {
            algorithm,
            value: algorithm.compute(body),
        }
    }

    /// Parses a `Digest` header value of the form `SHA-256=<base64>`.
    /// Rejects a value whose decoded length does not match the named
    /// algorithm's output size (§3 invariant).
    pub fn parse(header_value: &str) -> Result<Self> {
        let (name, b64) = header_value
            .split_once('=')
            .ok_or_else(|| Error::InvalidRequest("malformed Digest header".into()))?;
        let algorithm = match name.trim() {
            "SHA-256" => DigestAlgorithm::Sha256,
            "SHA-512" => DigestAlgorithm::Sha512,
            other => {
                return Err(Error::InvalidRequest(format!(
                    "unsupported digest algorithm {other:?}"
                )))
            }
        };
        let value = base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| Error::InvalidRequest(format!("invalid base64 in Digest header: {e}")))?;
        if value.len() != algorithm.expected_len() {
            return Err(Error::InvalidRequest(
                "Digest value length does not match its algorithm".into(),
            ));
        }
        Ok(Self { algorithm, value })
    }

    /// Renders as a `Digest` header value.
    pub fn to_header_value(&self) -> String {
        format!(
            "{}={}",
            self.algorithm.wire_name(),
            base64::engine::general_purpose::STANDARD.encode(&self.value)
        )
    }

    /// Recomputes the digest of `body` and constant-time-compares it
    /// against this value (§8 invariant 3).
    pub fn validate(&self, body: &[u8]) -> bool {
        let recomputed = self.algorithm.compute(body);
        use subtle_compare::ct_eq;
        ct_eq(&recomputed, &self.value)
    }
}

/// A tiny constant-time byte comparison, since this crate does not
/// otherwise depend on `subtle` — only equal-length, fixed-size digest
/// buffers ever reach this function.
mod subtle_compare {
    pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let mut diff = 0u8;
        for (x, y) in a.iter().zip(b.iter()) {
            diff |= x ^ y;
        }
        diff == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_round_trips_through_header_value() {
        let d = Digest::compute(DigestAlgorithm::Sha256, b"hello world");
        let header = d.to_header_value();
        let parsed = Digest::parse(&header).unwrap();
        assert_eq!(d, parsed);
        assert!(parsed.validate(b"hello world"));
    }

    #[test]
    fn single_bit_flip_fails_validation() {
        let d = Digest::compute(DigestAlgorithm::Sha256, b"hello world");
        assert!(!d.validate(b"hello worle"));
    }

    #[test]
    fn rejects_wrong_length_for_algorithm() {
        let bogus = format!(
            "SHA-256={}",
            base64::engine::general_purpose::STANDARD.encode(b"too short")
        );
        assert!(Digest::parse(&bogus).is_err());
    }
}
