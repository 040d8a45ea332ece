//! The certificate entity (§3): the record this crate persists and hands
//! back through the repository and HTTP surface.

use chrono::{DateTime, Utc};

use super::algorithm::SignatureAlgorithm;

/// A certificate as the repository stores and serves it.
///
/// Invariants (enforced by [`super::manager::CertificateManager`] and
/// [`super::repository::CertificateRepository`], not by this type itself):
/// `key_id` is unique; `revoked` implies `revocation_date.is_some()`;
/// `is_ca` implies the certificate's `BasicConstraints.cA = true` and its
/// `KeyUsage` includes `keyCertSign`/`cRLSign`; `authority_key_id` resolves
/// to another entity's `key_id`, or equals this entity's own `key_id` for a
/// self-signed root.
#[derive(Debug, Clone)]
pub struct CertificateEntity {
    /// SHA-1 of the DER-encoded `SubjectPublicKey` BIT STRING content.
    pub key_id: String,
    /// `key_id` of the issuing certificate (self for a self-signed root).
    pub authority_key_id: String,
    /// 20-byte positive serial number, hex-encoded.
    pub serial_number: String,
    /// RFC 2253 string form of the subject distinguished name.
    pub subject: String,
    /// SHA-1 thumbprint of the full DER certificate.
    pub thumbprint: String,
    /// The signature algorithm used to sign this certificate.
    pub algorithm: SignatureAlgorithm,
    /// Base64 of the DER-encoded `Certificate`.
    pub encoded_cert: String,
    /// PEM private key, present only when the manager generated the key
    /// pair itself (as opposed to signing an externally-supplied CSR).
    pub private_key: Option<String>,
    pub is_ca: bool,
    pub revoked: bool,
    pub revocation_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// Opaque caller metadata, round-tripped but never interpreted here.
    pub metadata: serde_json::Value,
}

impl CertificateEntity {
    /// Whether `at` falls within `[not_before, not_after]` and the entity
    /// is not revoked — the check §4.7/§4.8 run before trusting a signer's
    /// certificate.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        !self.revoked && at >= self.not_before && at <= self.not_after
    }
}
