//! RSA key pairs (C4), the one concrete key type this crate issues.
//!
//! The teacher generates EC/Ed25519 keys through `ring` and only supports
//! RSA for *verifying* pre-existing keys (`ring` has no RSA keygen). PSD2
//! qualified certificates are issued almost exclusively over RSA in
//! practice, so this module generates RSA directly via the `rsa` crate, and
//! `sha1`/`sha2` cover the hashing duties elsewhere in the crate instead.

use crate::error::{Error, Result};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

use super::algorithm::SignatureAlgorithm;

/// An RSA key pair together with its pre-computed `SubjectPublicKeyInfo`
/// DER encoding, which every certificate and CSR needs at least once.
#[derive(Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Generates a new RSA key pair of the given modulus size (2048, 3072,
    /// or 4096 bits per §4.4).
    pub fn generate(bits: usize) -> Result<Self> {
        let mut rng = rand::rngs::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// Parses a key pair from a PKCS#8 PEM-encoded private key (the format
    /// this crate itself exports via [`Self::to_pkcs8_pem`]).
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| Error::KeyEncoding(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self { private, public })
    }

    /// Exports the private key as a PKCS#8 PEM document.
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        self.private
            .to_pkcs8_pem(LineEnding::LF)
            .map(|z| z.to_string())
            .map_err(|e| Error::KeyEncoding(e.to_string()))
    }

    /// Exports the private key as PKCS#1 DER (needed by the PKCS#12
    /// exporter, which expects a raw `RSAPrivateKey` structure).
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>> {
        self.private
            .to_pkcs1_der()
            .map(|z| z.as_bytes().to_vec())
            .map_err(|e| Error::KeyEncoding(e.to_string()))
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// DER encoding of `SubjectPublicKeyInfo ::= SEQUENCE { algorithm,
    /// subjectPublicKey BIT STRING }`, the form every certificate embeds.
    pub fn subject_public_key_info_der(&self) -> Vec<u8> {
        let rsa_public_key_der = yasna::construct_der(|writer| {
            writer.write_sequence(|seq| {
                seq.next().write_biguint(&to_yasna_uint(self.public.n()));
                seq.next().write_biguint(&to_yasna_uint(self.public.e()));
            });
        });
        yasna::construct_der(|writer| {
            writer.write_sequence(|seq| {
                seq.next().write_sequence(|alg| {
                    alg.next().write_oid(&yasna::models::ObjectIdentifier::from_slice(
                        crate::der::oid::RSA_ENCRYPTION,
                    ));
                    alg.next().write_null();
                });
                let bv = bit_vec::BitVec::from_bytes(&rsa_public_key_der);
                seq.next().write_bitvec(&bv);
            });
        })
    }

    /// The `subjectPublicKey` `BIT STRING` content bytes alone (without the
    /// enclosing `SubjectPublicKeyInfo` wrapper), used for SKI/AKI hashing
    /// (RFC 5280 §4.2.1.2 method (1)).
    pub fn subject_public_key_bitstring_bytes(&self) -> Vec<u8> {
        yasna::construct_der(|writer| {
            writer.write_sequence(|seq| {
                seq.next().write_biguint(&to_yasna_uint(self.public.n()));
                seq.next().write_biguint(&to_yasna_uint(self.public.e()));
            });
        })
    }

    /// Signs `message` with `alg`, returning raw signature bytes.
    pub fn sign(&self, alg: SignatureAlgorithm, message: &[u8]) -> Result<Vec<u8>> {
        alg.sign(&self.private, message)
    }
}

fn to_yasna_uint(v: &rsa::BigUint) -> num_bigint::BigUint {
    num_bigint::BigUint::from_bytes_be(&v.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_then_pem_round_trips() {
        let kp = KeyPair::generate(2048).unwrap();
        let pem = kp.to_pkcs8_pem().unwrap();
        let kp2 = KeyPair::from_pkcs8_pem(&pem).unwrap();
        assert_eq!(kp.public_key().n(), kp2.public_key().n());
    }

    #[test]
    fn spki_der_is_a_valid_sequence() {
        let kp = KeyPair::generate(2048).unwrap();
        let der = kp.subject_public_key_info_der();
        let mut r = crate::der::Reader::new(&der);
        r.read_sequence(|seq| {
            seq.read_sequence(|_alg| Ok(()))?;
            let (_unused, _bytes) = seq.read_bit_string()?;
            Ok::<(), crate::der::DerError>(())
        })
        .unwrap();
    }
}
