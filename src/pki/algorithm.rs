//! Signature algorithms (C4). Mirrors the teacher's `SignatureAlgorithm`
//! static-table pattern, swapped from `ring`'s EC/Ed25519 table to RSA
//! variants since `ring` cannot generate RSA keys itself.

use crate::der::oid;
use rsa::pkcs1v15::{SigningKey as Pkcs1SigningKey, VerifyingKey as Pkcs1VerifyingKey};
use rsa::pss::{SigningKey as PssSigningKey, VerifyingKey as PssVerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// One of the RSA signature algorithms this crate supports, matching the
/// wire names used in the `Signature` header's `algorithm` parameter and
/// the certificate entity's `algorithm` field (§3, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    Rs256,
    /// RSASSA-PKCS1-v1_5 with SHA-384.
    Rs384,
    /// RSASSA-PKCS1-v1_5 with SHA-512.
    Rs512,
    /// RSASSA-PSS with SHA-256.
    Ps256,
}

impl SignatureAlgorithm {
    /// The wire name used in HTTP `Signature` headers and certificate
    /// entity metadata.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Rs256 => "rsa-sha256",
            SignatureAlgorithm::Rs384 => "rsa-sha384",
            SignatureAlgorithm::Rs512 => "rsa-sha512",
            SignatureAlgorithm::Ps256 => "rsa-pss-sha256",
        }
    }

    /// Parses a wire name, falling back to `Rs256` for the legacy
    /// `hs2019` placeholder (§4.7: "derive from key type" — all keys in
    /// this crate are RSA, so `hs2019` resolves to the default RSA scheme).
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "rsa-sha256" => Some(SignatureAlgorithm::Rs256),
            "rsa-sha384" => Some(SignatureAlgorithm::Rs384),
            "rsa-sha512" => Some(SignatureAlgorithm::Rs512),
            "rsa-pss-sha256" => Some(SignatureAlgorithm::Ps256),
            "hs2019" => Some(SignatureAlgorithm::Rs256),
            _ => None,
        }
    }

    /// The `signatureAlgorithm` AlgorithmIdentifier OID (RFC 4055).
    pub fn oid(&self) -> &'static [u64] {
        match self {
            SignatureAlgorithm::Rs256 => oid::SHA256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Rs384 => oid::SHA384_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Rs512 => oid::SHA512_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Ps256 => oid::RSASSA_PSS,
        }
    }

    /// Whether the `AlgorithmIdentifier.parameters` field is a `NULL`
    /// (PKCS#1v1.5) or the RSASSA-PSS parameter sequence.
    pub fn is_pss(&self) -> bool {
        matches!(self, SignatureAlgorithm::Ps256)
    }

    /// DER-encodes the full `AlgorithmIdentifier ::= SEQUENCE { algorithm,
    /// parameters }` for this algorithm: `NULL` parameters for the
    /// PKCS#1v1.5 variants, the full `RSASSA-PSS-params` sequence
    /// (RFC 4055 §3.1) with explicit SHA-256/MGF1-SHA-256/salt-length-32
    /// for `Ps256` (the defaults are SHA-1-based and must not be assumed).
    pub fn algorithm_identifier_der(&self) -> Vec<u8> {
        yasna::construct_der(|writer| {
            writer.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(self.oid()));
                if self.is_pss() {
                    seq.next().write_sequence(|pss| {
                        let sha256_oid =
                            yasna::models::ObjectIdentifier::from_slice(oid::SHA256);
                        pss.next().write_tagged(yasna::Tag::context(0), |w| {
                            w.write_sequence(|s| {
                                s.next().write_oid(&sha256_oid);
                                s.next().write_null();
                            });
                        });
                        pss.next().write_tagged(yasna::Tag::context(1), |w| {
                            w.write_sequence(|s| {
                                s.next().write_oid(&yasna::models::ObjectIdentifier::from_slice(
                                    oid::MGF1,
                                ));
                                s.next().write_sequence(|inner| {
                                    inner.next().write_oid(&sha256_oid);
                                    inner.next().write_null();
                                });
                            });
                        });
                        pss.next().write_tagged(yasna::Tag::context(2), |w| {
                            w.write_i64(32);
                        });
                    });
                } else {
                    seq.next().write_null();
                }
            });
        })
    }

    /// Signs `message` (already the TBS bytes or canonical signing-input
    /// string) with `key`, returning the raw signature bytes destined for
    /// the `BIT STRING`/base64 `signature` parameter.
    pub fn sign(&self, key: &RsaPrivateKey, message: &[u8]) -> crate::Result<Vec<u8>> {
        let mut rng = rand::rngs::OsRng;
        let sig = match self {
            SignatureAlgorithm::Rs256 => {
                let signing_key = Pkcs1SigningKey::<Sha256>::new(key.clone());
                signing_key.sign_with_rng(&mut rng, message).to_vec()
            }
            SignatureAlgorithm::Rs384 => {
                let signing_key = Pkcs1SigningKey::<Sha384>::new(key.clone());
                signing_key.sign_with_rng(&mut rng, message).to_vec()
            }
            SignatureAlgorithm::Rs512 => {
                let signing_key = Pkcs1SigningKey::<Sha512>::new(key.clone());
                signing_key.sign_with_rng(&mut rng, message).to_vec()
            }
            SignatureAlgorithm::Ps256 => {
                let signing_key = PssSigningKey::<Sha256>::new(key.clone());
                signing_key.sign_with_rng(&mut rng, message).to_vec()
            }
        };
        Ok(sig)
    }

    /// Verifies `signature` over `message` against `public_key`. Collapses
    /// every failure mode to `Ok(false)`/`Err` being reserved for malformed
    /// inputs, per the "never leak which step failed" policy (§7) —
    /// callers translate a `false` result to `Error::SignatureInvalid`.
    pub fn verify(&self, public_key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> bool {
        match self {
            SignatureAlgorithm::Rs256 => {
                verify_pkcs1::<Sha256>(public_key, message, signature)
            }
            SignatureAlgorithm::Rs384 => {
                verify_pkcs1::<Sha384>(public_key, message, signature)
            }
            SignatureAlgorithm::Rs512 => {
                verify_pkcs1::<Sha512>(public_key, message, signature)
            }
            SignatureAlgorithm::Ps256 => {
                let verifying_key = PssVerifyingKey::<Sha256>::new(public_key.clone());
                let Ok(sig) = rsa::pss::Signature::try_from(signature) else {
                    return false;
                };
                verifying_key.verify(message, &sig).is_ok()
            }
        }
    }
}

fn verify_pkcs1<D>(public_key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> bool
where
    D: Digest,
{
    let verifying_key = Pkcs1VerifyingKey::<D>::new(public_key.clone());
    let Ok(sig) = rsa::pkcs1v15::Signature::try_from(signature) else {
        return false;
    };
    verifying_key.verify(message, &sig).is_ok()
}
