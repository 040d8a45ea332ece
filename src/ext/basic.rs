//! `BasicConstraints`, `KeyUsage`, `ExtendedKeyUsage`, `SubjectKeyIdentifier`
//! and `AuthorityKeyIdentifier` — the RFC 5280 extensions every certificate
//! in this crate carries, CA or leaf.

use super::Extension;
use crate::der::{encode, oid};
use sha1::{Digest, Sha1};

/// `BasicConstraints ::= SEQUENCE { cA BOOLEAN DEFAULT FALSE, pathLenConstraint INTEGER OPTIONAL }`
///
/// Always marked critical, per RFC 5280 §4.2.1.9 and TS 119 495.
pub fn basic_constraints(is_ca: bool, path_len: Option<u8>) -> Extension {
    let value = encode::sequence(|w| {
        if is_ca {
            encode::boolean(w, true);
        }
        if let Some(len) = path_len {
            encode::integer_i64(w, len as i64);
        }
    });
    Extension {
        oid: oid::BASIC_CONSTRAINTS.to_vec(),
        critical: true,
        value,
    }
}

/// Named bit positions within the `KeyUsage` `BIT STRING` (RFC 5280 §4.2.1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsageFlag {
    DigitalSignature = 0,
    NonRepudiation = 1,
    KeyEncipherment = 2,
    DataEncipherment = 3,
    KeyAgreement = 4,
    KeyCertSign = 5,
    CrlSign = 6,
    EncipherOnly = 7,
    DecipherOnly = 8,
}

/// `KeyUsage ::= BIT STRING`. Always marked critical.
pub fn key_usage(flags: &[KeyUsageFlag]) -> Extension {
    let highest_bit = flags.iter().map(|f| *f as usize).max().unwrap_or(0);
    let num_bytes = highest_bit / 8 + 1;
    let mut bytes = vec![0u8; num_bytes];
    for flag in flags {
        let bit = *flag as usize;
        bytes[bit / 8] |= 0x80 >> (bit % 8);
    }
    let unused_bits = (8 - (highest_bit % 8 + 1)) as u8 % 8;
    let value = yasna::construct_der(|writer| {
        let mut bitvec = bit_vec::BitVec::from_bytes(&bytes);
        // Trim to the declared bit length so the unused-bits count is exact.
        bitvec.truncate(highest_bit + 1);
        writer.write_bitvec(&bitvec);
    });
    debug_assert!(unused_bits < 8);
    Extension {
        oid: oid::KEY_USAGE.to_vec(),
        critical: true,
        value,
    }
}

/// Well-known `ExtendedKeyUsage` purpose OIDs (RFC 5280 §4.2.1.12).
pub mod eku {
    pub const SERVER_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 1];
    pub const CLIENT_AUTH: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 3, 2];
}

/// `ExtendedKeyUsage ::= SEQUENCE OF KeyPurposeId`. Non-critical by default.
pub fn extended_key_usage(purposes: &[&[u64]]) -> Extension {
    let value = encode::sequence(|w| {
        for p in purposes {
            encode::oid(w, p);
        }
    });
    Extension {
        oid: oid::EXTENDED_KEY_USAGE.to_vec(),
        critical: false,
        value,
    }
}

/// SHA-1 over the `subjectPublicKey` `BIT STRING` content bytes, excluding
/// the leading unused-bits octet (RFC 5280 §4.2.1.2 method (1)).
pub fn key_identifier(subject_public_key_bytes: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(subject_public_key_bytes);
    hasher.finalize().into()
}

/// `SubjectKeyIdentifier ::= OCTET STRING`. Non-critical.
pub fn subject_key_identifier(ski: &[u8; 20]) -> Extension {
    let value = yasna::construct_der(|writer| {
        writer.write_bytes(ski);
    });
    Extension {
        oid: oid::SUBJECT_KEY_IDENTIFIER.to_vec(),
        critical: false,
        value,
    }
}

/// `AuthorityKeyIdentifier ::= SEQUENCE { keyIdentifier [0] IMPLICIT OCTET STRING OPTIONAL }`.
/// Non-critical.
pub fn authority_key_identifier(aki: &[u8; 20]) -> Extension {
    let value = yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            seq.next()
                .write_tagged_implicit(yasna::Tag::context(0), |w| w.write_bytes(aki));
        });
    });
    Extension {
        oid: oid::AUTHORITY_KEY_IDENTIFIER.to_vec(),
        critical: false,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_usage_sets_requested_bits_only() {
        let ext = key_usage(&[KeyUsageFlag::KeyCertSign, KeyUsageFlag::CrlSign]);
        let mut r = crate::der::Reader::new(&ext.value);
        let (unused, bytes) = r.read_bit_string().unwrap();
        // keyCertSign is bit 5, cRLSign is bit 6 -> byte 0b0000_0110, and the
        // highest set bit (6) means 1 trailing unused bit in the last byte.
        assert_eq!(bytes, &[0b0000_0110]);
        assert_eq!(unused, 1);
    }

    #[test]
    fn ski_is_sha1_of_spki_bits() {
        let ski = key_identifier(b"some public key bytes");
        let ext = subject_key_identifier(&ski);
        let mut r = crate::der::Reader::new(&ext.value);
        let octets = r.read_octet_string().unwrap();
        assert_eq!(octets, ski);
    }
}
