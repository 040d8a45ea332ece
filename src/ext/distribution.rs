//! `CRLDistributionPoints` and `AuthorityInformationAccess` — the two
//! pointer extensions relying parties use to fetch revocation and issuer
//! material (RFC 5280 §4.2.1.13–14).

use super::Extension;
use crate::der::oid;

/// A `GeneralName` restricted to the `uniformResourceIdentifier [6]` choice,
/// the only variant this crate's extensions ever emit.
fn uri_general_name(writer: &mut yasna::DERWriterSeq, uri: &str) {
    writer
        .next()
        .write_tagged_implicit(yasna::Tag::context(6), |w| w.write_ia5_string(uri));
}

/// `CRLDistributionPoints ::= SEQUENCE OF DistributionPoint`, each with a
/// single `fullName` `GeneralName` URI. Non-critical (RFC 5280 §4.2.1.13).
pub fn crl_distribution_points(urls: &[&str]) -> Extension {
    let value = yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            for url in urls {
                // DistributionPoint ::= SEQUENCE { distributionPoint [0] EXPLICIT DistributionPointName }
                seq.next().write_sequence(|dp| {
                    dp.next().write_tagged(yasna::Tag::context(0), |explicit| {
                        // DistributionPointName ::= CHOICE { fullName [0] GeneralNames }
                        explicit.write_tagged_implicit(yasna::Tag::context(0), |gn_seq_writer| {
                            gn_seq_writer.write_sequence(|gn_seq| {
                                uri_general_name(gn_seq, url);
                            });
                        });
                    });
                });
            }
        });
    });
    Extension {
        oid: oid::CRL_DISTRIBUTION_POINTS.to_vec(),
        critical: false,
        value,
    }
}

/// One `AccessDescription` method: `id-ad-caIssuers` or `id-ad-ocsp`
/// (RFC 5280 §4.2.2.1).
pub enum AccessMethod {
    CaIssuers,
    Ocsp,
}

impl AccessMethod {
    fn oid(&self) -> &'static [u64] {
        match self {
            AccessMethod::CaIssuers => oid::AD_CA_ISSUERS,
            AccessMethod::Ocsp => oid::AD_OCSP,
        }
    }
}

/// `AuthorityInformationAccess ::= SEQUENCE OF AccessDescription`.
/// Non-critical (RFC 5280 §4.2.2.1).
pub fn authority_information_access(entries: &[(AccessMethod, &str)]) -> Extension {
    let value = yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            for (method, location) in entries {
                seq.next().write_sequence(|ad| {
                    ad.next()
                        .write_oid(&yasna::models::ObjectIdentifier::from_slice(method.oid()));
                    uri_general_name(ad, location);
                });
            }
        });
    });
    Extension {
        oid: oid::AUTHORITY_INFO_ACCESS.to_vec(),
        critical: false,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crl_distribution_points_carries_the_url() {
        let ext = crl_distribution_points(&["https://bank.example.com/.certificates/revoked.crl"]);
        assert_eq!(ext.oid, oid::CRL_DISTRIBUTION_POINTS);
        assert!(!ext.critical);
        assert!(ext.value.windows(4).any(|w| w == b"http"));
    }

    #[test]
    fn aia_ca_issuers_uses_correct_method_oid() {
        let ext = authority_information_access(&[(
            AccessMethod::CaIssuers,
            "https://bank.example.com/.certificates/ca.cer",
        )]);
        assert_eq!(ext.oid, oid::AUTHORITY_INFO_ACCESS);
    }
}
