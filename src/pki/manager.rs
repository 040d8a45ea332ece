//! The certificate manager (C4): generates key pairs, assembles and signs
//! `TBSCertificate`s, and exports the result. Generalizes the teacher's
//! `Certificate::from_params`/`write_cert`/`serialize_der_with_signer`
//! pipeline from a single self-signed-or-CA-signed leaf to the PSD2
//! root-CA-then-qualified-certificate flow this crate needs.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha1::{Digest as Sha1Digest, Sha1};

use tracing::debug;

use crate::clock::Clock;
use crate::der::encode;
use crate::error::{Error, Result};
use crate::ext::basic::{self, KeyUsageFlag};
use crate::ext::distribution::{self, AccessMethod};
use crate::ext::policies::{self, PolicyInformation};
use crate::ext::qc::{QcStatementsBuilder, QcType};
use crate::ext::{write_extensions, Extension};
use crate::subject::{DistinguishedName, DnType};

use super::algorithm::SignatureAlgorithm;
use super::entity::CertificateEntity;
use super::keypair::KeyPair;
use super::request::Psd2CertificateRequest;

/// The export formats `CertificateManager::export` understands (§4.4).
pub enum ExportFormat {
    Der,
    Pem,
    Pkcs12 { password: String },
}

/// The media type the host should set on the response body for a given
/// `GET /.certificates/{keyId}.{ext}` file extension (§6). `ext` is matched
/// case-sensitively against the extensions the endpoint contract allows;
/// anything else is the host's problem, not this crate's.
pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "crt" => Some("application/x-x509-user-cert"),
        "cer" => Some("application/pkix-cert"),
        "key" => Some("application/pkcs8"),
        "pfx" => Some("application/x-pkcs12"),
        "pem" => Some("application/x-pem-file"),
        "crl" => Some("application/pkix-crl"),
        _ => None,
    }
}

/// Generates, signs, and exports certificates. Stateless beyond the clock
/// and issuer-domain configuration it was built with; persistence is the
/// caller's job, via [`super::repository::CertificateRepository`].
pub struct CertificateManager {
    issuer_domain: String,
    clock: std::sync::Arc<dyn Clock>,
    root_ca_validity_years: i64,
}

impl CertificateManager {
    pub fn new(issuer_domain: impl Into<String>, clock: std::sync::Arc<dyn Clock>) -> Self {
        Self {
            issuer_domain: issuer_domain.into(),
            clock,
            root_ca_validity_years: 10,
        }
    }

    /// `create_root_ca(issuer_domain, diagnostics?) -> (Cert, PrivKey)` (§4.4):
    /// RSA-2048 by default, SHA-256, validity 10 years, `BasicConstraints
    /// CA=true`, `SKI=AKI`, `KeyUsage={digitalSignature, keyCertSign,
    /// cRLSign}`.
    pub fn create_root_ca(&self, key_bits: usize) -> Result<(CertificateEntity, KeyPair)> {
        let key_pair = KeyPair::generate(key_bits)?;
        let alg = SignatureAlgorithm::Rs256;

        let subject = DistinguishedName::new()
            .push(DnType::CommonName, format!("{} Root CA", self.issuer_domain))
            .push(DnType::OrganizationName, self.issuer_domain.clone());

        let not_before = self.clock.now() - Duration::minutes(5);
        let not_after = self.clock.now() + Duration::days(365 * self.root_ca_validity_years);

        let ski = basic::key_identifier(&key_pair.subject_public_key_bitstring_bytes());
        let extensions = vec![
            basic::basic_constraints(true, None),
            basic::key_usage(&[
                KeyUsageFlag::DigitalSignature,
                KeyUsageFlag::KeyCertSign,
                KeyUsageFlag::CrlSign,
            ]),
            basic::subject_key_identifier(&ski),
            basic::authority_key_identifier(&ski),
        ];

        let serial = random_serial();
        let subject_der = subject.to_der();
        let tbs = build_tbs_certificate(
            &serial,
            alg,
            &subject_der,
            &subject,
            not_before,
            not_after,
            &key_pair,
            &extensions,
        );
        let signature = key_pair.sign(alg, &tbs)?;
        let der = wrap_signed_certificate(&tbs, alg, &signature);

        let key_id = hex::encode(ski);
        let entity = CertificateEntity {
            key_id: key_id.clone(),
            authority_key_id: key_id,
            serial_number: hex::encode(&serial),
            subject: subject.to_rfc2253_string(),
            thumbprint: hex::encode(Sha1::digest(&der)),
            algorithm: alg,
            encoded_cert: base64::engine::general_purpose::STANDARD.encode(&der),
            private_key: Some(key_pair.to_pkcs8_pem()?),
            is_ca: true,
            revoked: false,
            revocation_date: None,
            created_date: self.clock.now(),
            not_before,
            not_after,
            metadata: serde_json::Value::Null,
        };
        debug!(key_id = %entity.key_id, issuer_domain = %self.issuer_domain, "issued root CA");
        Ok((entity, key_pair))
    }

    /// `create_qualified_certificate(req, issuer_domain, issuer?) ->
    /// (Cert, PrivKey)` (§4.4). When `issuer` is `None`, mints a fresh root
    /// CA on the fly and signs with it.
    pub fn create_qualified_certificate(
        &self,
        req: &Psd2CertificateRequest,
        issuer: Option<(&CertificateEntity, &KeyPair)>,
    ) -> Result<(CertificateEntity, KeyPair, Option<CertificateEntity>)> {
        req.validate()?;

        let (issuer_entity_owned, issuer_key_owned);
        let (issuer_entity, issuer_key, bootstrapped) = match issuer {
            Some((entity, key)) => (entity, key, None),
            None => {
                let (entity, key) = self.create_root_ca(2048)?;
                issuer_entity_owned = entity;
                issuer_key_owned = key;
                (
                    &issuer_entity_owned,
                    &issuer_key_owned,
                    Some(issuer_entity_owned.clone()),
                )
            }
        };

        let key_pair = KeyPair::generate(req.key_bits)?;
        let alg = req.algorithm;

        let mut subject = DistinguishedName::new();
        if let Some(l) = &req.locality {
            subject = subject.push(DnType::LocalityName, l.clone());
        }
        if let Some(s) = &req.state_or_province {
            subject = subject.push(DnType::StateOrProvinceName, s.clone());
        }
        subject = subject.push(DnType::CountryName, req.country.clone());
        subject = subject.push(DnType::OrganizationName, req.organization.clone());
        if let Some(ou) = &req.organizational_unit {
            subject = subject.push(DnType::OrganizationalUnitName, ou.clone());
        }
        subject = subject.push(
            DnType::OrganizationIdentifier,
            format!("PSD{}-{}-{}", req.country, req.authority_id, req.authorization_number),
        );
        subject = subject.push(DnType::CommonName, req.common_name.clone());

        let issuer_der = base64::engine::general_purpose::STANDARD
            .decode(&issuer_entity.encoded_cert)
            .map_err(Error::Base64)
            .and_then(|cert_der| extract_subject_name_der(&cert_der))?;

        let not_before = self.clock.now() - Duration::minutes(5);
        let not_after = self.clock.now() + Duration::days(req.validity_days as i64);

        let ski = basic::key_identifier(&key_pair.subject_public_key_bitstring_bytes());
        // AKI is the issuer's own SKI, not whatever AKI the issuer itself
        // carries (those only coincide for a self-signed root).
        let aki_bytes = hex::decode(&issuer_entity.key_id)
            .map_err(|e| Error::KeyEncoding(e.to_string()))?;
        let aki: [u8; 20] = aki_bytes
            .try_into()
            .map_err(|_| Error::KeyEncoding("issuer key id is not 20 bytes".into()))?;

        let policy_oid = policy_oid_for(req.qc_type, req.qscd);
        let mut qc = QcStatementsBuilder::new().with_compliance();
        if req.qscd {
            qc = qc.with_sscd();
        }
        if let Some(limit) = &req.limit_value {
            qc = qc.with_limit_value(limit);
        }
        if let Some(years) = req.retention_period_years {
            qc = qc.with_retention_period(years);
        }
        if !req.pds.is_empty() {
            qc = qc.with_pds(&req.pds);
        }
        qc = qc.with_qc_type(&[req.qc_type]);
        if let Some(nca_id) = &req.nca_id {
            qc = qc.with_psd2(&crate::ext::qc::Psd2Statement {
                roles: req.roles.clone(),
                nca_name: req.authority_name.clone(),
                nca_id: nca_id.clone(),
            });
        }

        let extensions = vec![
            basic::key_usage(&[
                KeyUsageFlag::DigitalSignature,
                KeyUsageFlag::NonRepudiation,
            ]),
            basic::subject_key_identifier(&ski),
            basic::authority_key_identifier(&aki),
            distribution::crl_distribution_points(&[&format!(
                "https://{}/.certificates/revoked.crl",
                self.issuer_domain
            )]),
            distribution::authority_information_access(&[(
                AccessMethod::CaIssuers,
                &format!("https://{}/.certificates/ca.cer", self.issuer_domain),
            )]),
            policies::certificate_policies(&[PolicyInformation {
                oid: policy_oid.to_vec(),
                qualifiers: vec![],
            }]),
            qc.build(),
        ];

        let serial = random_serial();
        let tbs = build_tbs_certificate(
            &serial,
            alg,
            &issuer_der,
            &subject,
            not_before,
            not_after,
            &key_pair,
            &extensions,
        );
        let signature = issuer_key.sign(alg, &tbs)?;
        let der = wrap_signed_certificate(&tbs, alg, &signature);

        let entity = CertificateEntity {
            key_id: hex::encode(ski),
            authority_key_id: issuer_entity.key_id.clone(),
            serial_number: hex::encode(&serial),
            subject: subject.to_rfc2253_string(),
            thumbprint: hex::encode(Sha1::digest(&der)),
            algorithm: alg,
            encoded_cert: base64::engine::general_purpose::STANDARD.encode(&der),
            private_key: Some(key_pair.to_pkcs8_pem()?),
            is_ca: false,
            revoked: false,
            revocation_date: None,
            created_date: self.clock.now(),
            not_before,
            not_after,
            metadata: serde_json::Value::Null,
        };
        debug!(
            key_id = %entity.key_id,
            authority_key_id = %entity.authority_key_id,
            qc_type = ?req.qc_type,
            "issued PSD2 qualified certificate"
        );
        Ok((entity, key_pair, bootstrapped))
    }

    /// `export(cert, format)` (§4.4).
    pub fn export(
        &self,
        entity: &CertificateEntity,
        key_pair: Option<&KeyPair>,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        let der = base64::engine::general_purpose::STANDARD
            .decode(&entity.encoded_cert)
            .map_err(Error::Base64)?;
        match format {
            ExportFormat::Der => Ok(der),
            ExportFormat::Pem => {
                let p = pem::Pem::new("CERTIFICATE", der);
                Ok(pem::encode(&p).into_bytes())
            }
            ExportFormat::Pkcs12 { password } => {
                let key_pair = key_pair.ok_or_else(|| {
                    Error::Pkcs12("PKCS#12 export requires the private key".into())
                })?;
                let key_der = key_pair.to_pkcs1_der()?;
                let pfx = p12::PFX::new(&der, &key_der, None, &password, &entity.key_id)
                    .ok_or_else(|| Error::Pkcs12("failed to assemble PKCS#12 archive".into()))?;
                Ok(pfx.to_der())
            }
        }
    }
}

/// `create_root_ca`/`create_qualified_certificate`'s serial-number
/// algorithm (§4.4): 20 random bytes, high bit cleared to guarantee a
/// positive `INTEGER`.
fn random_serial() -> Vec<u8> {
    let mut bytes = [0u8; 20];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes[0] &= 0x7f;
    bytes.to_vec()
}

fn policy_oid_for(qc_type: QcType, qscd: bool) -> &'static [u64] {
    use crate::der::oid;
    match (qc_type, qscd) {
        (QcType::ESign, true) => oid::QCP_NATURAL_QSCD,
        (QcType::ESign, false) => oid::QCP_NATURAL,
        (QcType::ESeal, true) => oid::QCP_LEGAL_QSCD,
        (QcType::ESeal, false) => oid::QCP_LEGAL,
        (QcType::Web, _) => oid::QCP_WEB,
    }
}

/// Pulls the raw, already-DER-encoded `subject` `Name` straight out of an
/// issuer's own certificate, so a newly issued leaf's `issuer` field is
/// byte-identical to the CA's `subject` field — required for chain
/// validation, and not guaranteed by re-deriving the name from its
/// rendered RFC 2253 string.
fn extract_subject_name_der(issuer_cert_der: &[u8]) -> Result<Vec<u8>> {
    let mut r = crate::der::Reader::new(issuer_cert_der);
    let mut cert = r.open_sequence()?;
    let mut tbs = cert.open_sequence()?;
    if tbs.peek_is_explicit(0) {
        tbs.read_explicit(0, |v| v.read_integer_i64())?;
    }
    let _serial = tbs.read_integer_bytes()?;
    let _sig_alg = tbs.read_raw_tlv()?;
    let _issuer = tbs.read_raw_tlv()?;
    let _validity = tbs.read_raw_tlv()?;
    let subject = tbs.read_raw_tlv()?;
    Ok(subject.to_vec())
}

#[allow(clippy::too_many_arguments)]
fn build_tbs_certificate(
    serial: &[u8],
    alg: SignatureAlgorithm,
    issuer_der: &[u8],
    subject: &DistinguishedName,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
    subject_key: &KeyPair,
    extensions: &[Extension],
) -> Vec<u8> {
    yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            // version [0] EXPLICIT INTEGER { v3(2) }
            seq.next().write_tagged(yasna::Tag::context(0), |w| {
                w.write_i64(2);
            });
            encode::integer_bytes(seq, serial);
            seq.next().write_der(&alg.algorithm_identifier_der());
            seq.next().write_der(issuer_der);
            seq.next().write_sequence(|validity| {
                encode::time(validity, &not_before);
                encode::time(validity, &not_after);
            });
            seq.next().write_der(&subject.to_der());
            seq.next()
                .write_der(&subject_key.subject_public_key_info_der());
            seq.next().write_tagged(yasna::Tag::context(3), |w| {
                w.write_sequence(|exts| {
                    write_extensions(exts, extensions);
                });
            });
        });
    })
}

fn wrap_signed_certificate(tbs: &[u8], alg: SignatureAlgorithm, signature: &[u8]) -> Vec<u8> {
    yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            seq.next().write_der(tbs);
            seq.next().write_der(&alg.algorithm_identifier_der());
            let bv = bit_vec::BitVec::from_bytes(signature);
            seq.next().write_bitvec(&bv);
        });
    })
}
