//! `QualifiedCertificateStatements` (ETSI EN 319 412-5) and the PSD2
//! `QcStatement` it carries (ETSI TS 119 495 §5.1).
//!
//! This is the extension the rest of the crate exists to produce: every
//! other builder in [`super`] is RFC 5280 plumbing, but `QcStatements` is
//! what turns a certificate into a PSD2 qualified certificate.

use super::Extension;
use crate::der::oid;

/// A PSD2 role flag (ETSI TS 119 495 §5.2, `RolesOfPSP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Psd2Role {
    /// Account Servicing Payment Service Provider.
    Aspsp,
    /// Payment Initiation Service Provider.
    Pisp,
    /// Account Information Service Provider.
    Aisp,
    /// Issuing of card-based payment instruments.
    Piisp,
}

impl Psd2Role {
    fn oid(&self) -> &'static [u64] {
        match self {
            Psd2Role::Aspsp => oid::PSD2_ROLE_PSP_AS,
            Psd2Role::Pisp => oid::PSD2_ROLE_PSP_PI,
            Psd2Role::Aisp => oid::PSD2_ROLE_PSP_AI,
            Psd2Role::Piisp => oid::PSD2_ROLE_PSP_IC,
        }
    }

    fn role_name(&self) -> &'static str {
        match self {
            Psd2Role::Aspsp => "PSP_AS",
            Psd2Role::Pisp => "PSP_PI",
            Psd2Role::Aisp => "PSP_AI",
            Psd2Role::Piisp => "PSP_IC",
        }
    }
}

/// The NCA-assigned authorization identifier carried in the PSD2
/// `QcStatement` (`NCAId`, e.g. `"BE-NBB"`).
#[derive(Debug, Clone)]
pub struct NcaId {
    pub prefix: String,
    pub country: String,
    pub nca: String,
    pub authorization_number: String,
}

impl NcaId {
    /// Renders the `NCAId` as the single string ETSI TS 119 495 specifies:
    /// `{prefix}-{country}-{nca}-{authorizationNumber}`.
    fn render(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.prefix, self.country, self.nca, self.authorization_number
        )
    }
}

/// Input for the PSD2 `QcStatement` (`id-psd2-qcStatement`, `0.4.0.19495.2`).
#[derive(Debug, Clone)]
pub struct Psd2Statement {
    pub roles: Vec<Psd2Role>,
    pub nca_name: String,
    pub nca_id: NcaId,
}

/// A monetary limit for `QcLimitValue` (ISO 4217 currency + integer amount).
#[derive(Debug, Clone)]
pub struct QcLimitValue {
    pub currency: String,
    pub amount: u32,
}

/// One entry of `QcPDS`: a PKI Disclosure Statement URL in a given language.
#[derive(Debug, Clone)]
pub struct QcPdsEntry {
    pub language: String,
    pub url: String,
}

/// The QC type a certificate is issued for (ETSI EN 319 412-5 QcType child OIDs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QcType {
    ESign,
    ESeal,
    Web,
}

impl QcType {
    fn oid(&self) -> &'static [u64] {
        match self {
            QcType::ESign => oid::QCT_ESIGN,
            QcType::ESeal => oid::QCT_ESEAL,
            QcType::Web => oid::QCT_WEB,
        }
    }
}

/// Builder for the full `QualifiedCertificateStatements` extension value.
///
/// `QCStatements ::= SEQUENCE OF QCStatement`, `QCStatement ::= SEQUENCE
/// { statementId OID, statementInfo ANY OPTIONAL }`. Each `with_*` call
/// appends one statement; [`build`](Self::build) wraps the whole thing as
/// the extension's `critical` `OCTET STRING` value (TS 119 495 mandates
/// the PSD2 statement set be present when this extension is critical).
#[derive(Default)]
pub struct QcStatementsBuilder {
    statements: Vec<Vec<u8>>,
}

impl QcStatementsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `QcCompliance` — asserts the certificate meets the EU qualified
    /// certificate requirements. No `statementInfo`.
    pub fn with_compliance(mut self) -> Self {
        self.statements.push(yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(
                        oid::QC_COMPLIANCE,
                    ));
            });
        }));
        self
    }

    /// `QcLimitValue { currency, amount, exponent }`. `exponent` is fixed at
    /// 0 — amounts are whole-unit integers, matching how issuers in this
    /// ecosystem express transaction limits.
    pub fn with_limit_value(mut self, limit: &QcLimitValue) -> Self {
        let currency = limit.currency.clone();
        let amount = limit.amount;
        self.statements.push(yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(
                        oid::QC_LIMIT_VALUE,
                    ));
                seq.next().write_sequence(|info| {
                    info.next().write_ia5_string(&currency);
                    info.next().write_i64(amount as i64);
                    info.next().write_i64(0);
                });
            });
        }));
        self
    }

    /// `QcRetentionPeriod years` — an INTEGER count of years.
    pub fn with_retention_period(mut self, years: u32) -> Self {
        self.statements.push(yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(
                        oid::QC_RETENTION_PERIOD,
                    ));
                seq.next().write_i64(years as i64);
            });
        }));
        self
    }

    /// `QcSSCD` — the private key lives on a Qualified Signature/Seal
    /// Creation Device. No `statementInfo`.
    pub fn with_sscd(mut self) -> Self {
        self.statements.push(yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(oid::QC_SSCD));
            });
        }));
        self
    }

    /// `QcPDS` — SEQUENCE OF `{ url IA5String, language PrintableString }`.
    pub fn with_pds(mut self, entries: &[QcPdsEntry]) -> Self {
        let entries: Vec<(String, String)> = entries
            .iter()
            .map(|e| (e.url.clone(), e.language.clone()))
            .collect();
        self.statements.push(yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(oid::QC_PDS));
                seq.next().write_sequence(|list| {
                    for (url, language) in &entries {
                        list.next().write_sequence(|pair| {
                            pair.next().write_ia5_string(url);
                            pair.next().write_printable_string(language);
                        });
                    }
                });
            });
        }));
        self
    }

    /// `QcType` — SEQUENCE OF the QcType child OID(s) this certificate is
    /// issued for.
    pub fn with_qc_type(mut self, types: &[QcType]) -> Self {
        let oids: Vec<&'static [u64]> = types.iter().map(QcType::oid).collect();
        self.statements.push(yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(oid::QC_TYPE));
                seq.next().write_sequence(|list| {
                    for o in &oids {
                        list.next()
                            .write_oid(&yasna::models::ObjectIdentifier::from_slice(o));
                    }
                });
            });
        }));
        self
    }

    /// The PSD2 `QcStatement` (ETSI TS 119 495 §5.1): `statementInfo ::=
    /// PSD2QcInfo ::= SEQUENCE { rolesOfPSP RolesOfPSP, nCAName UTF8String,
    /// nCAId UTF8String }`, `RolesOfPSP ::= SEQUENCE OF RoleOfPSP`,
    /// `RoleOfPSP ::= SEQUENCE { roleOfPspOid OID, roleOfPspName UTF8String }`.
    pub fn with_psd2(mut self, psd2: &Psd2Statement) -> Self {
        let roles = psd2.roles.clone();
        let nca_name = psd2.nca_name.clone();
        let nca_id = psd2.nca_id.render();
        self.statements.push(yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                seq.next()
                    .write_oid(&yasna::models::ObjectIdentifier::from_slice(
                        oid::QC_STATEMENT_PSD2,
                    ));
                seq.next().write_sequence(|info| {
                    info.next().write_sequence(|roles_seq| {
                        for role in &roles {
                            roles_seq.next().write_sequence(|role_pair| {
                                role_pair.next().write_oid(
                                    &yasna::models::ObjectIdentifier::from_slice(role.oid()),
                                );
                                role_pair.next().write_utf8_string(role.role_name());
                            });
                        }
                    });
                    info.next().write_utf8_string(&nca_name);
                    info.next().write_utf8_string(&nca_id);
                });
            });
        }));
        self
    }

    /// Wraps the accumulated statements as the extension value. Critical,
    /// per TS 119 495 and this crate's policy (§4.2): the PSD2 QcStatement
    /// set is one of only three extensions marked critical.
    pub fn build(self) -> Extension {
        let value = yasna::construct_der(|w| {
            w.write_sequence(|seq| {
                for statement in &self.statements {
                    seq.next().write_der(statement);
                }
            });
        });
        Extension {
            oid: oid::QC_STATEMENTS.to_vec(),
            critical: true,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psd2_builder_round_trips_roles_and_nca_id() {
        let ext = QcStatementsBuilder::new()
            .with_compliance()
            .with_sscd()
            .with_psd2(&Psd2Statement {
                roles: vec![Psd2Role::Aisp, Psd2Role::Pisp],
                nca_name: "National Bank of Belgium".into(),
                nca_id: NcaId {
                    prefix: "PSD".into(),
                    country: "BE".into(),
                    nca: "NBB".into(),
                    authorization_number: "1234567".into(),
                },
            })
            .build();

        assert_eq!(ext.oid, oid::QC_STATEMENTS);
        assert!(ext.critical);

        let mut r = crate::der::Reader::new(&ext.value);
        r.read_sequence(|statements| {
            // QcCompliance
            statements.read_sequence(|s| {
                let oid = s.read_oid()?;
                assert_eq!(oid, oid::QC_COMPLIANCE);
                Ok(())
            })?;
            // QcSSCD
            statements.read_sequence(|s| {
                let oid = s.read_oid()?;
                assert_eq!(oid, oid::QC_SSCD);
                Ok(())
            })?;
            // PSD2
            statements.read_sequence(|s| {
                let oid = s.read_oid()?;
                assert_eq!(oid, oid::QC_STATEMENT_PSD2);
                s.read_sequence(|info| {
                    info.read_sequence(|roles| {
                        roles.read_sequence(|r1| {
                            let oid = r1.read_oid()?;
                            assert_eq!(oid, oid::PSD2_ROLE_PSP_AI);
                            let _ = r1.read_utf8_string()?;
                            Ok(())
                        })?;
                        roles.read_sequence(|r2| {
                            let oid = r2.read_oid()?;
                            assert_eq!(oid, oid::PSD2_ROLE_PSP_PI);
                            let _ = r2.read_utf8_string()?;
                            Ok(())
                        })
                    })?;
                    let name = info.read_utf8_string()?;
                    assert_eq!(name, "National Bank of Belgium");
                    let id = info.read_utf8_string()?;
                    assert_eq!(id, "PSD-BE-NBB-1234567");
                    Ok(())
                })
            })?;
            Ok::<(), crate::der::DerError>(())
        })
        .unwrap();
    }
}
