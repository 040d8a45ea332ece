//! `CertificatePolicies` (RFC 5280 §4.2.1.4).

use super::Extension;
use crate::der::oid;

/// A single policy qualifier: either a CPS pointer URI or a user notice
/// text. Only `cPSuri` is emitted by this crate's builders today, but both
/// variants are modeled since `PolicyQualifierInfo` is a CHOICE.
pub enum PolicyQualifier {
    CpsUri(String),
    UserNotice(String),
}

/// One `PolicyInformation { policyIdentifier, policyQualifiers }`.
pub struct PolicyInformation {
    pub oid: Vec<u64>,
    pub qualifiers: Vec<PolicyQualifier>,
}

const ID_QT_CPS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 2, 1];
const ID_QT_UNOTICE: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 2, 2];

/// `CertificatePolicies ::= SEQUENCE OF PolicyInformation`. Non-critical.
pub fn certificate_policies(policies: &[PolicyInformation]) -> Extension {
    let value = yasna::construct_der(|writer| {
        writer.write_sequence(|seq| {
            for policy in policies {
                seq.next().write_sequence(|pi| {
                    pi.next()
                        .write_oid(&yasna::models::ObjectIdentifier::from_slice(&policy.oid));
                    if !policy.qualifiers.is_empty() {
                        pi.next().write_sequence(|quals| {
                            for q in &policy.qualifiers {
                                quals.next().write_sequence(|qi| match q {
                                    PolicyQualifier::CpsUri(uri) => {
                                        qi.next().write_oid(
                                            &yasna::models::ObjectIdentifier::from_slice(
                                                ID_QT_CPS,
                                            ),
                                        );
                                        qi.next().write_ia5_string(uri);
                                    }
                                    PolicyQualifier::UserNotice(text) => {
                                        qi.next().write_oid(
                                            &yasna::models::ObjectIdentifier::from_slice(
                                                ID_QT_UNOTICE,
                                            ),
                                        );
                                        qi.next().write_sequence(|notice| {
                                            notice.next().write_utf8_string(text);
                                        });
                                    }
                                });
                            }
                        });
                    }
                });
            }
        });
    });
    Extension {
        oid: oid::CERTIFICATE_POLICIES.to_vec(),
        critical: false,
        value,
    }
}
