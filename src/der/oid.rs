//! Object identifiers used by the certificate and CRL builders.
//!
//! Arc component lists, not dotted strings — [`encode::oid`](super::encode::oid)
//! and [`Reader::read_oid`](super::Reader::read_oid) both operate on
//! `&[u64]`.

/// id-at-commonName
pub const COMMON_NAME: &[u64] = &[2, 5, 4, 3];
/// id-at-countryName
pub const COUNTRY_NAME: &[u64] = &[2, 5, 4, 6];
/// id-at-localityName
pub const LOCALITY_NAME: &[u64] = &[2, 5, 4, 7];
/// id-at-stateOrProvinceName
pub const STATE_OR_PROVINCE_NAME: &[u64] = &[2, 5, 4, 8];
/// id-at-organizationName
pub const ORGANIZATION_NAME: &[u64] = &[2, 5, 4, 10];
/// id-at-organizationalUnitName
pub const ORGANIZATIONAL_UNIT_NAME: &[u64] = &[2, 5, 4, 11];
/// id-emailAddress (PKCS#9)
pub const EMAIL_ADDRESS: &[u64] = &[1, 2, 840, 113549, 1, 9, 1];
/// CA/Browser Forum Organization Identifier attribute, EVG Appendix A.
pub const ORGANIZATION_IDENTIFIER: &[u64] = &[2, 23, 140, 3, 1];

/// rsaEncryption (RFC 4055)
pub const RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 1];
/// sha256WithRSAEncryption (RFC 4055)
pub const SHA256_WITH_RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 11];
/// sha384WithRSAEncryption (RFC 4055)
pub const SHA384_WITH_RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 12];
/// sha512WithRSAEncryption (RFC 4055)
pub const SHA512_WITH_RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 13];
/// id-RSASSA-PSS (RFC 4055)
pub const RSASSA_PSS: &[u64] = &[1, 2, 840, 113549, 1, 1, 10];
/// id-sha256 (used inside RSASSA-PSS AlgorithmIdentifier parameters)
pub const SHA256: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 1];
/// id-sha384
pub const SHA384: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 2];
/// id-sha512
pub const SHA512: &[u64] = &[2, 16, 840, 1, 101, 3, 4, 2, 3];
/// id-mgf1 (RFC 4055)
pub const MGF1: &[u64] = &[1, 2, 840, 113549, 1, 1, 8];

/// id-ce-keyUsage (RFC 5280)
pub const KEY_USAGE: &[u64] = &[2, 5, 29, 15];
/// id-ce-subjectKeyIdentifier
pub const SUBJECT_KEY_IDENTIFIER: &[u64] = &[2, 5, 29, 14];
/// id-ce-basicConstraints
pub const BASIC_CONSTRAINTS: &[u64] = &[2, 5, 29, 19];
/// id-ce-authorityKeyIdentifier
pub const AUTHORITY_KEY_IDENTIFIER: &[u64] = &[2, 5, 29, 35];
/// id-ce-extKeyUsage
pub const EXTENDED_KEY_USAGE: &[u64] = &[2, 5, 29, 37];
/// id-ce-cRLDistributionPoints
pub const CRL_DISTRIBUTION_POINTS: &[u64] = &[2, 5, 29, 31];
/// id-ce-certificatePolicies
pub const CERTIFICATE_POLICIES: &[u64] = &[2, 5, 29, 32];
/// id-ce-cRLNumber
pub const CRL_NUMBER: &[u64] = &[2, 5, 29, 20];

/// id-pe-authorityInfoAccess (RFC 5280)
pub const AUTHORITY_INFO_ACCESS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 1];
/// id-ad-caIssuers
pub const AD_CA_ISSUERS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 48, 2];
/// id-ad-ocsp
pub const AD_OCSP: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 48, 1];

/// id-pe-qcStatements (RFC 3739 / ETSI EN 319 412-5)
pub const QC_STATEMENTS: &[u64] = &[1, 3, 6, 1, 5, 5, 7, 1, 3];
/// esi4-qcStatement-1 (QcCompliance, ETSI EN 319 412-5)
pub const QC_COMPLIANCE: &[u64] = &[0, 4, 0, 1862, 1, 1];
/// esi4-qcStatement-2 (QcLimitValue)
pub const QC_LIMIT_VALUE: &[u64] = &[0, 4, 0, 1862, 1, 2];
/// esi4-qcStatement-3 (QcRetentionPeriod)
pub const QC_RETENTION_PERIOD: &[u64] = &[0, 4, 0, 1862, 1, 3];
/// esi4-qcStatement-4 (QcSSCD, formerly QCSSCD)
pub const QC_SSCD: &[u64] = &[0, 4, 0, 1862, 1, 4];
/// esi4-qcStatement-5 (QcPDS)
pub const QC_PDS: &[u64] = &[0, 4, 0, 1862, 1, 5];
/// esi4-qcStatement-6 (QcType)
pub const QC_TYPE: &[u64] = &[0, 4, 0, 1862, 1, 6];
/// id-etsi-qct-esign (QcType child: eSign)
pub const QCT_ESIGN: &[u64] = &[0, 4, 0, 1862, 1, 6, 1];
/// id-etsi-qct-eseal (QcType child: eSeal)
pub const QCT_ESEAL: &[u64] = &[0, 4, 0, 1862, 1, 6, 2];
/// id-etsi-qct-web (QcType child: Web)
pub const QCT_WEB: &[u64] = &[0, 4, 0, 1862, 1, 6, 3];
/// id-psd2-qcStatement (ETSI TS 119 495, §5.1)
pub const QC_STATEMENT_PSD2: &[u64] = &[0, 4, 0, 19495, 2];
/// id-psd2-role-psp-as (ASPSP)
pub const PSD2_ROLE_PSP_AS: &[u64] = &[0, 4, 0, 19495, 1, 1];
/// id-psd2-role-psp-pi (PISP)
pub const PSD2_ROLE_PSP_PI: &[u64] = &[0, 4, 0, 19495, 1, 2];
/// id-psd2-role-psp-ai (AISP)
pub const PSD2_ROLE_PSP_AI: &[u64] = &[0, 4, 0, 19495, 1, 3];
/// id-psd2-role-psp-ic (PIISP, "account issuing")
pub const PSD2_ROLE_PSP_IC: &[u64] = &[0, 4, 0, 19495, 1, 4];

/// QCP-n: qualified certificate policy for natural person eSign (ETSI EN 319 411-2)
pub const QCP_NATURAL: &[u64] = &[0, 4, 0, 194112, 1, 0];
/// QCP-n-qscd: as QCP-n, private key on a QSCD
pub const QCP_NATURAL_QSCD: &[u64] = &[0, 4, 0, 194112, 1, 1];
/// QCP-l: qualified certificate policy for legal person eSeal
pub const QCP_LEGAL: &[u64] = &[0, 4, 0, 194112, 1, 2];
/// QCP-l-qscd: as QCP-l, private key on a QSCD
pub const QCP_LEGAL_QSCD: &[u64] = &[0, 4, 0, 194112, 1, 3];
/// QCP-w: qualified certificate policy for website authentication
pub const QCP_WEB: &[u64] = &[0, 4, 0, 194112, 1, 4];
