//! Subject/issuer distinguished name builder (C3).
//!
//! Mirrors the teacher crate's `DistinguishedName`/`DnType` pair, extended
//! with the RFC 4519 attributes PSD2 certificates need (`L`, `ST`, `E`) and
//! the CA/Browser Forum `organizationIdentifier` attribute TS 119 495
//! certificates carry under the Subject.

use crate::der::{encode, oid};

/// The attribute type of one RDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnType {
    /// `CN` — commonName
    CommonName,
    /// `O` — organizationName
    OrganizationName,
    /// `OU` — organizationalUnitName
    OrganizationalUnitName,
    /// `L` — localityName
    LocalityName,
    /// `ST` — stateOrProvinceName
    StateOrProvinceName,
    /// `C` — countryName
    CountryName,
    /// `E` — emailAddress (PKCS#9)
    EmailAddress,
    /// CA/Browser Forum organizationIdentifier (EVG Appendix A / TS 119 495 §5.2.1)
    OrganizationIdentifier,
}

impl DnType {
    fn oid(&self) -> &'static [u64] {
        match self {
            DnType::CommonName => oid::COMMON_NAME,
            DnType::OrganizationName => oid::ORGANIZATION_NAME,
            DnType::OrganizationalUnitName => oid::ORGANIZATIONAL_UNIT_NAME,
            DnType::LocalityName => oid::LOCALITY_NAME,
            DnType::StateOrProvinceName => oid::STATE_OR_PROVINCE_NAME,
            DnType::CountryName => oid::COUNTRY_NAME,
            DnType::EmailAddress => oid::EMAIL_ADDRESS,
            DnType::OrganizationIdentifier => oid::ORGANIZATION_IDENTIFIER,
        }
    }

    /// Short label used when rendering the RFC 2253 string form.
    fn short_name(&self) -> &'static str {
        match self {
            DnType::CommonName => "CN",
            DnType::OrganizationName => "O",
            DnType::OrganizationalUnitName => "OU",
            DnType::LocalityName => "L",
            DnType::StateOrProvinceName => "ST",
            DnType::CountryName => "C",
            DnType::EmailAddress => "E",
            DnType::OrganizationIdentifier => "2.23.140.3.1",
        }
    }
}

/// A distinguished name: an ordered set of (attribute type, value) pairs.
///
/// Order matters here (unlike the teacher's `HashMap`-backed version):
/// RFC 2253 string rendering and DER `Name` encoding both emit RDNs in
/// insertion order, and the issuer/subject Name used to sign a certificate
/// must encode identically every time it's re-derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    entries: Vec<(DnType, String)>,
}

impl DistinguishedName {
    /// An empty distinguished name.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an RDN, fluent-builder style.
    pub fn push(mut self, ty: DnType, value: impl Into<String>) -> Self {
        self.entries.push((ty, value.into()));
        self
    }

    /// The RDNs in insertion order.
    pub fn entries(&self) -> &[(DnType, String)] {
        &self.entries
    }

    /// Looks up the first value stored for `ty`, if any.
    pub fn get(&self, ty: DnType) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, v)| v.as_str())
    }

    /// Encodes this name as a DER `Name ::= SEQUENCE OF RelativeDistinguishedName`,
    /// with each RDN being a `SET` containing a single `AttributeTypeAndValue`.
    pub fn to_der(&self) -> Vec<u8> {
        encode::sequence(|writer| {
            for (ty, value) in &self.entries {
                encode::nested_sequence(writer, |rdn_writer| {
                    // DER SET OF with a single element is already canonically
                    // ordered; no sort needed.
                    rdn_writer.next().write_set(|set_writer| {
                        set_writer.next().write_sequence(|atv_writer| {
                            atv_writer.next().write_oid(&yasna::models::ObjectIdentifier::from_slice(ty.oid()));
                            if *ty == DnType::CountryName {
                                atv_writer.next().write_printable_string(value);
                            } else {
                                atv_writer.next().write_utf8_string(value);
                            }
                        });
                    });
                });
            }
        })
    }

    /// Renders the RFC 2253 string form, RDNs listed in *reverse* of
    /// encoding order (the convention `openssl` and every CA UI follows).
    pub fn to_rfc2253_string(&self) -> String {
        self.entries
            .iter()
            .rev()
            .map(|(ty, value)| format!("{}={}", ty.short_name(), escape_rfc2253(value)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn escape_rfc2253(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_reverses_rdn_order() {
        let dn = DistinguishedName::new()
            .push(DnType::CountryName, "GR")
            .push(DnType::OrganizationName, "Acme Bank")
            .push(DnType::CommonName, "acme.example.com");
        assert_eq!(
            dn.to_rfc2253_string(),
            "CN=acme.example.com,O=Acme Bank,C=GR"
        );
    }

    #[test]
    fn der_round_trips_through_reader() {
        let dn = DistinguishedName::new()
            .push(DnType::CountryName, "GR")
            .push(DnType::CommonName, "acme.example.com");
        let der = dn.to_der();
        let mut r = crate::der::Reader::new(&der);
        r.read_sequence(|seq| {
            seq.read_sequence(|rdn| {
                rdn.read_set(|atv| {
                    let oid = atv.read_oid()?;
                    assert_eq!(oid, crate::der::oid::COUNTRY_NAME);
                    let v = atv.read_printable_string()?;
                    assert_eq!(v, "GR");
                    Ok(())
                })
            })?;
            seq.read_sequence(|rdn| {
                rdn.read_set(|atv| {
                    let _oid = atv.read_oid()?;
                    let v = atv.read_utf8_string()?;
                    assert_eq!(v, "acme.example.com");
                    Ok(())
                })
            })?;
            Ok::<(), crate::der::DerError>(())
        })
        .unwrap();
    }
}
