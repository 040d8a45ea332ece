//! The certificate repository interface (C5) and a default in-memory
//! implementation, in the pack's storage-adapter style (an interface plus
//! an owned `HashMap` guarded by a lock, as `cim-keys`'s
//! `InMemoryStorageAdapter` does for its storage port) rather than a
//! concrete database driver — persistence is the host's job (§1).

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::entity::CertificateEntity;

/// A revoked serial entry as `revocation_list` reports it (§4.5).
#[derive(Debug, Clone)]
pub struct RevokedSerial {
    pub serial_number: String,
    pub revocation_date: DateTime<Utc>,
}

/// Filters accepted by [`CertificateRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub not_before: Option<DateTime<Utc>>,
    pub revoked: Option<bool>,
    pub authority_key_id: Option<String>,
}

/// Persistent store of issued certificates (§4.5). Implementations back
/// this with whatever the host has on hand (SQL, KV, in-memory); the core
/// only requires linearizable reads and serialized writes.
pub trait CertificateRepository: Send + Sync {
    /// Inserts a newly issued certificate. Fails with
    /// [`Error::DuplicateKeyId`] if `entity.key_id` is already present.
    fn add(&self, entity: CertificateEntity) -> Result<CertificateEntity>;

    /// Looks up a certificate by key id. Returns `None` for both an
    /// absent id and a revoked one — callers that need revoked entries
    /// use [`Self::list`] with `revoked: Some(true)`.
    fn get_by_id(&self, key_id: &str) -> Option<CertificateEntity>;

    /// Lists certificates matching `filter`. An unset filter field
    /// imposes no constraint.
    fn list(&self, filter: &ListFilter) -> Vec<CertificateEntity>;

    /// The set of revoked serials, optionally restricted to certificates
    /// not valid before `not_before`.
    fn revocation_list(&self, not_before: Option<DateTime<Utc>>) -> Vec<RevokedSerial>;

    /// Marks a certificate revoked as of `at`. A no-op if already revoked.
    /// Fails with [`Error::NotFound`] if `key_id` is unknown.
    fn revoke(&self, key_id: &str, at: DateTime<Utc>) -> Result<()>;

    /// The next CRL number, incrementing the repository-maintained
    /// counter (§4.6 — CRL number must be monotonically increasing).
    fn next_crl_number(&self) -> u64;
}

/// Default in-memory [`CertificateRepository`], suitable for tests and
/// for bootstrapping before a real store is wired in.
#[derive(Default)]
pub struct InMemoryCertificateRepository {
    certificates: RwLock<HashMap<String, CertificateEntity>>,
    crl_counter: std::sync::atomic::AtomicU64,
}

impl InMemoryCertificateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CertificateRepository for InMemoryCertificateRepository {
    fn add(&self, entity: CertificateEntity) -> Result<CertificateEntity> {
        let mut certs = self.certificates.write().unwrap();
        if certs.contains_key(&entity.key_id) {
            warn!(key_id = %entity.key_id, "rejected duplicate key id");
            return Err(Error::DuplicateKeyId(entity.key_id));
        }
        debug!(key_id = %entity.key_id, is_ca = entity.is_ca, "stored certificate");
        certs.insert(entity.key_id.clone(), entity.clone());
        Ok(entity)
    }

    fn get_by_id(&self, key_id: &str) -> Option<CertificateEntity> {
        let certs = self.certificates.read().unwrap();
        certs.get(key_id).filter(|c| !c.revoked).cloned()
    }

    fn list(&self, filter: &ListFilter) -> Vec<CertificateEntity> {
        let certs = self.certificates.read().unwrap();
        certs
            .values()
            .filter(|c| {
                filter
                    .not_before
                    .map_or(true, |nb| c.not_before >= nb)
            })
            .filter(|c| filter.revoked.map_or(true, |r| c.revoked == r))
            .filter(|c| {
                filter
                    .authority_key_id
                    .as_deref()
                    .map_or(true, |aki| c.authority_key_id == aki)
            })
            .cloned()
            .collect()
    }

    fn revocation_list(&self, not_before: Option<DateTime<Utc>>) -> Vec<RevokedSerial> {
        let certs = self.certificates.read().unwrap();
        certs
            .values()
            .filter(|c| c.revoked)
            .filter(|c| not_before.map_or(true, |nb| c.not_before >= nb))
            .filter_map(|c| {
                c.revocation_date.map(|date| RevokedSerial {
                    serial_number: c.serial_number.clone(),
                    revocation_date: date,
                })
            })
            .collect()
    }

    fn revoke(&self, key_id: &str, at: DateTime<Utc>) -> Result<()> {
        let mut certs = self.certificates.write().unwrap();
        let entity = certs
            .get_mut(key_id)
            .ok_or_else(|| Error::NotFound(key_id.to_string()))?;
        if entity.revoked {
            debug!(key_id = %key_id, "revoke is a no-op on an already-revoked entry");
            return Ok(());
        }
        entity.revoked = true;
        entity.revocation_date = Some(at);
        debug!(key_id = %key_id, at = %at, "revoked certificate");
        Ok(())
    }

    fn next_crl_number(&self) -> u64 {
        self.crl_counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pki::algorithm::SignatureAlgorithm;
    use chrono::TimeZone;

    fn sample(key_id: &str) -> CertificateEntity {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        CertificateEntity {
            key_id: key_id.to_string(),
            authority_key_id: "root".to_string(),
            serial_number: "01".to_string(),
            subject: "CN=test".to_string(),
            thumbprint: "ff".to_string(),
            algorithm: SignatureAlgorithm::Rs256,
            encoded_cert: String::new(),
            private_key: None,
            is_ca: false,
            revoked: false,
            revocation_date: None,
            created_date: now,
            not_before: now,
            not_after: now,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn add_rejects_duplicate_key_id() {
        let repo = InMemoryCertificateRepository::new();
        repo.add(sample("a")).unwrap();
        let err = repo.add(sample("a")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKeyId(_)));
    }

    #[test]
    fn get_by_id_hides_revoked_entries() {
        let repo = InMemoryCertificateRepository::new();
        repo.add(sample("a")).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        repo.revoke("a", at).unwrap();
        assert!(repo.get_by_id("a").is_none());
        let revoked = repo.list(&ListFilter {
            revoked: Some(true),
            ..Default::default()
        });
        assert_eq!(revoked.len(), 1);
    }

    #[test]
    fn revoke_is_idempotent() {
        let repo = InMemoryCertificateRepository::new();
        repo.add(sample("a")).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        repo.revoke("a", at).unwrap();
        repo.revoke("a", at).unwrap();
        let list = repo.revocation_list(None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn revoke_unknown_key_id_is_not_found() {
        let repo = InMemoryCertificateRepository::new();
        let err = repo.revoke("missing", Utc::now()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn crl_numbers_are_monotonically_increasing() {
        let repo = InMemoryCertificateRepository::new();
        assert_eq!(repo.next_crl_number(), 1);
        assert_eq!(repo.next_crl_number(), 2);
        assert_eq!(repo.next_crl_number(), 3);
    }
}
