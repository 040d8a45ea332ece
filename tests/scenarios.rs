//! End-to-end scenarios spanning the certificate manager, the repository,
//! and the CRL generator together, the way a single request against a real
//! deployment would exercise them.

use std::sync::Arc;

use base64::Engine;
use chrono::{TimeZone, Utc};

use psd2_qcert::clock::{Clock, FixedClock};
use psd2_qcert::der::{oid, DerError, Reader};
use psd2_qcert::ext::qc::{NcaId, Psd2Role, QcType};
use psd2_qcert::pki::algorithm::SignatureAlgorithm;
use psd2_qcert::pki::manager::{CertificateManager, ExportFormat};
use psd2_qcert::pki::repository::{CertificateRepository, InMemoryCertificateRepository};
use psd2_qcert::pki::request::Psd2CertificateRequest;

/// Installs a `tracing` subscriber once per test binary, the same way the
/// pack's own `tracing_subscriber::fmt()` entry points do, so `cargo test
/// -- --nocapture` surfaces the `debug!`/`warn!` lines the pipeline and
/// manager emit instead of discarding them.
fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn sample_request() -> Psd2CertificateRequest {
    Psd2CertificateRequest {
        locality: Some("Athens".into()),
        state_or_province: None,
        country: "GR".into(),
        organization: "Acme Bank of Greece".into(),
        organizational_unit: Some("Digital Payments".into()),
        common_name: "acme-bank.example.com".into(),
        authority_id: "BOG".into(),
        authority_name: "Bank of Greece".into(),
        authorization_number: "123456".into(),
        validity_days: 825,
        qc_type: QcType::Web,
        roles: vec![Psd2Role::Aisp, Psd2Role::Pisp],
        nca_id: Some(NcaId {
            prefix: "PSD".into(),
            country: "GR".into(),
            nca: "BOG".into(),
            authorization_number: "123456".into(),
        }),
        limit_value: None,
        retention_period_years: None,
        qscd: true,
        pds: vec![],
        key_bits: 2048,
        algorithm: SignatureAlgorithm::Rs256,
    }
}

/// Walks a `Certificate`'s `tbsCertificate.extensions` and returns the raw
/// `extnValue` octets for `target_oid`, if present.
fn find_extension(cert_der: &[u8], target_oid: &[u64]) -> Option<Vec<u8>> {
    let mut found = None;
    let mut r = Reader::new(cert_der);
    r.read_sequence(|cert| -> Result<(), DerError> {
        cert.read_sequence(|tbs| -> Result<(), DerError> {
            if tbs.peek_is_explicit(0) {
                tbs.read_explicit(0, |v| v.read_integer_i64())?;
            }
            let _serial = tbs.read_integer_bytes()?;
            let _sig_alg = tbs.read_raw_tlv()?;
            let _issuer = tbs.read_raw_tlv()?;
            let _validity = tbs.read_raw_tlv()?;
            let _subject = tbs.read_raw_tlv()?;
            let _spki = tbs.read_raw_tlv()?;
            if tbs.peek_is_explicit(3) {
                tbs.read_explicit(3, |exts| -> Result<(), DerError> {
                    exts.read_sequence(|list| -> Result<(), DerError> {
                        while !list.is_empty() {
                            list.read_sequence(|one| -> Result<(), DerError> {
                                let ext_oid = one.read_oid()?;
                                if one.peek_tag()? == psd2_qcert::der::tag::BOOLEAN {
                                    let _critical = one.read_bool()?;
                                }
                                let value = one.read_octet_string()?;
                                if ext_oid == target_oid {
                                    found = Some(value.to_vec());
                                }
                                Ok(())
                            })?;
                        }
                        Ok(())
                    })
                })?;
            }
            Ok(())
        })
    })
    .unwrap();
    found
}

/// S1: root CA creation, PEM export, and re-import of the structural facts
/// a relying party actually checks.
#[test]
fn s1_root_ca_round_trips_through_pem_with_ca_facts_intact() {
    init_tracing();
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at));
    let manager = CertificateManager::new("ca.example.com", clock);

    let (entity, key_pair) = manager.create_root_ca(2048).unwrap();
    assert!((entity.not_after - entity.not_before).num_days() >= 3650);

    let pem_bytes = manager
        .export(&entity, Some(&key_pair), ExportFormat::Pem)
        .unwrap();
    let pem_text = String::from_utf8(pem_bytes).unwrap();
    let reimported = pem::parse(pem_text).unwrap();
    assert_eq!(reimported.tag(), "CERTIFICATE");
    let der = reimported.contents();

    let basic_constraints = find_extension(der, oid::BASIC_CONSTRAINTS).unwrap();
    let mut bc = Reader::new(&basic_constraints);
    let is_ca = bc
        .read_sequence(|seq| -> Result<bool, DerError> {
            if seq.is_empty() {
                Ok(false)
            } else {
                seq.read_bool()
            }
        })
        .unwrap();
    assert!(is_ca);

    let key_usage = find_extension(der, oid::KEY_USAGE).unwrap();
    let mut ku = Reader::new(&key_usage);
    let (_unused, bits) = ku.read_bit_string().unwrap();
    // digitalSignature(0), keyCertSign(5), cRLSign(6) all set in the first byte.
    assert_eq!(bits[0] & 0b1000_0011, 0b1000_0011);
}

/// S2: a PSD2-qualified certificate with two PSP roles carries a decodable
/// QCStatements extension under the PSD2 OID.
#[test]
fn s2_psd2_certificate_carries_both_roles_and_qc_type_web() {
    init_tracing();
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at));
    let manager = CertificateManager::new("bank.example.com", clock);

    let req = sample_request();
    let (entity, _key, bootstrapped) = manager.create_qualified_certificate(&req, None).unwrap();
    assert!(bootstrapped.is_some());
    assert!(!entity.is_ca);

    let der = base64::engine::general_purpose::STANDARD
        .decode(&entity.encoded_cert)
        .unwrap();
    let qc_statements = find_extension(&der, oid::QC_STATEMENTS).unwrap();

    // QcStatements ::= SEQUENCE OF QcStatement; find the PSD2 one and pull
    // RolesOfPSP back out to confirm both AISP and PISP survived the round trip.
    let mut seen_psd2 = false;
    let mut r = Reader::new(&qc_statements);
    r.read_sequence(|seq| -> Result<(), DerError> {
        while !seq.is_empty() {
            seq.read_sequence(|stmt| -> Result<(), DerError> {
                let statement_id = stmt.read_oid()?;
                if statement_id == oid::QC_STATEMENT_PSD2 {
                    seen_psd2 = true;
                    stmt.read_sequence(|psd2| -> Result<(), DerError> {
                        psd2.read_sequence(|roles| -> Result<(), DerError> {
                            let mut role_oids = Vec::new();
                            while !roles.is_empty() {
                                roles.read_sequence(|role| -> Result<(), DerError> {
                                    role_oids.push(role.read_oid()?);
                                    let _name = role.read_utf8_string()?;
                                    Ok(())
                                })?;
                            }
                            assert!(role_oids.contains(&oid::PSD2_ROLE_PSP_AI.to_vec()));
                            assert!(role_oids.contains(&oid::PSD2_ROLE_PSP_PI.to_vec()));
                            Ok(())
                        })?;
                        let _nca_name = psd2.read_utf8_string()?;
                        let nca_id = psd2.read_utf8_string()?;
                        assert_eq!(nca_id, "PSD-GR-BOG-123456");
                        Ok(())
                    })?;
                } else if !stmt.is_empty() {
                    let _ = stmt.read_raw_tlv()?;
                }
                Ok(())
            })?;
        }
        Ok(())
    })
    .unwrap();
    assert!(seen_psd2, "expected a PSD2 QcStatement in QCStatements");
}

/// S6: revoking an issued certificate produces a CRL signed by the CA in
/// which the revoked serial appears exactly once and `thisUpdate <= now <=
/// nextUpdate`.
#[test]
fn s6_revoked_certificate_appears_exactly_once_in_a_well_formed_crl() {
    init_tracing();
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(at));
    let manager = CertificateManager::new("bank.example.com", clock.clone());
    let repo = InMemoryCertificateRepository::new();

    let (root_entity, root_key) = manager.create_root_ca(2048).unwrap();
    repo.add(root_entity.clone()).unwrap();

    let req = sample_request();
    let (leaf_entity, _leaf_key, _bootstrapped) = manager
        .create_qualified_certificate(&req, Some((&root_entity, &root_key)))
        .unwrap();
    repo.add(leaf_entity.clone()).unwrap();

    let revoked_at = at + chrono::Duration::days(1);
    repo.revoke(&leaf_entity.key_id, revoked_at).unwrap();
    assert!(repo.get_by_id(&leaf_entity.key_id).is_none());

    let revoked = repo.revocation_list(None);
    assert_eq!(
        revoked
            .iter()
            .filter(|r| r.serial_number == leaf_entity.serial_number)
            .count(),
        1
    );

    let crl_number = repo.next_crl_number();
    let issuer_subject_der = {
        let der = base64::engine::general_purpose::STANDARD
            .decode(&root_entity.encoded_cert)
            .unwrap();
        let mut r = Reader::new(&der);
        r.read_sequence(|cert| -> Result<Vec<u8>, DerError> {
            cert.read_sequence(|tbs| -> Result<Vec<u8>, DerError> {
                if tbs.peek_is_explicit(0) {
                    tbs.read_explicit(0, |v| v.read_integer_i64())?;
                }
                let _serial = tbs.read_integer_bytes()?;
                let _sig_alg = tbs.read_raw_tlv()?;
                let _issuer = tbs.read_raw_tlv()?;
                let _validity = tbs.read_raw_tlv()?;
                let subject = tbs.read_raw_tlv()?;
                Ok(subject.to_vec())
            })
        })
        .unwrap()
    };

    let this_update = revoked_at;
    let crl_der = psd2_qcert::pki::crl::build_crl(
        &issuer_subject_der,
        &root_key,
        SignatureAlgorithm::Rs256,
        &revoked,
        crl_number,
        this_update,
    )
    .unwrap();

    let mut r = Reader::new(&crl_der);
    let (tbs_bytes, _alg, (_unused, _sig)) = r
        .read_sequence(|seq| -> Result<(Vec<u8>, Vec<u8>, (u8, Vec<u8>)), DerError> {
            let tbs = seq.read_raw_tlv()?.to_vec();
            let alg = seq.read_raw_tlv()?.to_vec();
            let sig = seq.read_bit_string()?;
            Ok((tbs, alg, (sig.0, sig.1.to_vec())))
        })
        .unwrap();

    let mut tbs_r = Reader::new(&tbs_bytes);
    tbs_r
        .read_sequence(|tbs| -> Result<(), DerError> {
            let version = tbs.read_integer_i64()?;
            assert_eq!(version, 1);
            let _sig_alg = tbs.read_raw_tlv()?;
            let _issuer = tbs.read_raw_tlv()?;
            let this = tbs.read_time()?;
            let next = tbs.read_time()?;
            assert!(this <= revoked_at);
            assert!(next >= this);

            let mut serials = Vec::new();
            tbs.read_sequence(|list| -> Result<(), DerError> {
                while !list.is_empty() {
                    list.read_sequence(|entry| -> Result<(), DerError> {
                        serials.push(hex::encode(entry.read_integer_bytes()?));
                        let _revocation_date = entry.read_time()?;
                        Ok(())
                    })?;
                }
                Ok(())
            })?;
            assert_eq!(
                serials
                    .iter()
                    .filter(|s| **s == leaf_entity.serial_number)
                    .count(),
                1
            );
            // crlExtensions [0] EXPLICIT SEQUENCE { cRLNumber } — consume so
            // the outer `read_sequence` sees every byte accounted for.
            tbs.read_explicit(0, |exts| -> Result<(), DerError> {
                exts.read_sequence(|list| -> Result<(), DerError> {
                    while !list.is_empty() {
                        list.read_raw_tlv()?;
                    }
                    Ok(())
                })
            })?;
            Ok(())
        })
        .unwrap();
}
