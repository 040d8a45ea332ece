//! The PSD2 certificate request (§3) and the invariant checks it must pass
//! before [`super::manager::CertificateManager`] will issue anything from it.

use crate::error::{Error, Result};
use crate::ext::qc::{NcaId, Psd2Role, QcLimitValue, QcPdsEntry, QcType};

/// Everything needed to mint one PSD2 qualified certificate.
#[derive(Debug, Clone)]
pub struct Psd2CertificateRequest {
    pub locality: Option<String>,
    pub state_or_province: Option<String>,
    pub country: String,
    pub organization: String,
    pub organizational_unit: Option<String>,
    pub common_name: String,
    pub authority_id: String,
    pub authority_name: String,
    pub authorization_number: String,
    pub validity_days: u32,
    pub qc_type: QcType,
    pub roles: Vec<Psd2Role>,
    pub nca_id: Option<NcaId>,
    pub limit_value: Option<QcLimitValue>,
    pub retention_period_years: Option<u32>,
    pub qscd: bool,
    pub pds: Vec<QcPdsEntry>,
    pub key_bits: usize,
    pub algorithm: crate::pki::algorithm::SignatureAlgorithm,
}

impl Psd2CertificateRequest {
    /// Checks the invariants enumerated in §3:
    /// country is ISO-3166 alpha-2; at least one role flag is set;
    /// `validity_days >= 1`; authorization number non-empty; CN <= 64 chars.
    pub fn validate(&self) -> Result<()> {
        if self.country.len() != 2 || !self.country.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(Error::InvalidRequest(format!(
                "country must be an ISO-3166 alpha-2 code, got {:?}",
                self.country
            )));
        }
        if self.roles.is_empty() {
            return Err(Error::InvalidRequest(
                "at least one PSD2 role flag must be set".into(),
            ));
        }
        if self.validity_days < 1 {
            return Err(Error::InvalidRequest(
                "validity_days must be at least 1".into(),
            ));
        }
        if self.authorization_number.trim().is_empty() {
            return Err(Error::InvalidRequest(
                "authorization_number must not be empty".into(),
            ));
        }
        if self.common_name.chars().count() > 64 {
            return Err(Error::InvalidRequest(
                "common_name must be 64 characters or fewer".into(),
            ));
        }
        Ok(())
    }
}
