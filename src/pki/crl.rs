//! The CRL generator (C6): a DER `CertificateList` signed by the CA,
//! built from the repository's revoked-serial set with the same
//! `yasna::construct_der` style [`super::manager`] uses for certificates.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::der::encode;
use crate::error::Result;

use super::algorithm::SignatureAlgorithm;
use super::keypair::KeyPair;
use super::repository::RevokedSerial;

/// How far past `thisUpdate` the CRL remains valid (§4.6 — the source
/// does not specify this interval; 7 days is a sensible default).
pub fn next_update_interval() -> Duration {
    Duration::days(7)
}

/// Builds and signs a CRL (§4.6): `tbsCertList{ version v2, signature,
/// issuer, thisUpdate, nextUpdate, revokedCertificates[] }`, then wraps
/// it as `CertificateList{ tbsCertList, signatureAlgorithm,
/// signatureValue }`.
pub fn build_crl(
    issuer_subject_der: &[u8],
    issuer_key: &KeyPair,
    alg: SignatureAlgorithm,
    revoked: &[RevokedSerial],
    crl_number: u64,
    this_update: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let next_update = this_update + next_update_interval();
    let tbs = build_tbs_cert_list(
        issuer_subject_der,
        alg,
        revoked,
        crl_number,
        this_update,
        next_update,
    );
    let signature = issuer_key.sign(alg, &tbs)?;
    debug!(
        crl_number,
        revoked_count = revoked.len(),
        this_update = %this_update,
        next_update = %next_update,
        "generated CRL"
    );
    Ok(wrap_signed_crl(&tbs, alg, &signature))
}

fn build_tbs_cert_list(
    issuer_der: &[u8],
    alg: SignatureAlgorithm,
    revoked: &[RevokedSerial],
    crl_number: u64,
    this_update: DateTime<Utc>,
    next_update: DateTime<Utc>,
) -> Vec<u8> {
    yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            // version v2(1) — required once any extension (cRLNumber) is present.
            seq.next().write_i64(1);
            seq.next().write_der(&alg.algorithm_identifier_der());
            seq.next().write_der(issuer_der);
            encode::time(seq, &this_update);
            encode::time(seq, &next_update);
            if !revoked.is_empty() {
                seq.next().write_sequence(|list| {
                    for entry in revoked {
                        list.next().write_sequence(|rc| {
                            let serial_bytes = hex::decode(&entry.serial_number)
                                .unwrap_or_else(|_| entry.serial_number.as_bytes().to_vec());
                            encode::integer_bytes(rc, &serial_bytes);
                            encode::time(rc, &entry.revocation_date);
                        });
                    }
                });
            }
            // crlExtensions [0] EXPLICIT SEQUENCE { cRLNumber }
            seq.next().write_tagged(yasna::Tag::context(0), |w| {
                w.write_sequence(|exts| {
                    exts.next().write_sequence(|ext| {
                        ext.next().write_oid(&yasna::models::ObjectIdentifier::from_slice(
                            crate::der::oid::CRL_NUMBER,
                        ));
                        ext.next().write_bytes(&yasna::construct_der(|w| {
                            w.write_i64(crl_number as i64);
                        }));
                    });
                });
            });
        });
    })
}

fn wrap_signed_crl(tbs: &[u8], alg: SignatureAlgorithm, signature: &[u8]) -> Vec<u8> {
    yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            seq.next().write_der(tbs);
            seq.next().write_der(&alg.algorithm_identifier_der());
            let bv = bit_vec::BitVec::from_bytes(signature);
            seq.next().write_bitvec(&bv);
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::{DistinguishedName, DnType};
    use chrono::TimeZone;

    #[test]
    fn crl_with_no_revocations_is_well_formed_der() {
        let key = KeyPair::generate(2048).unwrap();
        let issuer = DistinguishedName::new()
            .push(DnType::CommonName, "Test Root CA".to_string())
            .to_der();
        let this_update = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let crl = build_crl(
            &issuer,
            &key,
            SignatureAlgorithm::Rs256,
            &[],
            1,
            this_update,
        )
        .unwrap();

        let mut r = crate::der::Reader::new(&crl);
        r.read_sequence(|seq| {
            seq.read_sequence(|_tbs| Ok(()))?;
            seq.read_sequence(|_alg| Ok(()))?;
            let (_unused, _bytes) = seq.read_bit_string()?;
            Ok::<(), crate::der::DerError>(())
        })
        .unwrap();
    }

    #[test]
    fn next_update_is_seven_days_after_this_update() {
        let this_update = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            this_update + next_update_interval(),
            Utc.with_ymd_and_hms(2026, 1, 8, 0, 0, 0).unwrap()
        );
    }
}
