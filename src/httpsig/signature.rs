//! The `Signature` header (§4.7): parameter grammar, canonical
//! signing-input construction, and sign/verify over that input.

use base64::Engine;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::pki::algorithm::SignatureAlgorithm;
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Pseudo-header names recognized inside a `headers` list (§4.7).
pub const REQUEST_TARGET: &str = "(request-target)";
pub const CREATED: &str = "(created)";
pub const EXPIRES: &str = "(expires)";

/// A parsed `Signature` (or `Authorization: Signature ...`) header value.
///
/// Grammar: a comma-separated list of `k="v"` parameters (`created`/
/// `expires` are bare decimal integers, not quoted). Parsing tolerates
/// any ordering and surrounding whitespace; a duplicate key is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParams {
    pub key_id: String,
    pub algorithm: String,
    pub headers: Vec<String>,
    pub created: Option<i64>,
    pub expires: Option<i64>,
    pub signature: Vec<u8>,
}

impl SignatureParams {
    /// Parses a `Signature` header value.
    pub fn parse(value: &str) -> Result<Self> {
        let mut seen: BTreeMap<&str, String> = BTreeMap::new();
        for part in split_params(value) {
            let (key, raw) = part
                .split_once('=')
                .ok_or_else(|| Error::InvalidRequest("malformed Signature parameter".into()))?;
            let key = key.trim();
            let raw = raw.trim();
            let unquoted = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"'));
            let val = unquoted.unwrap_or(raw).to_string();
            if seen.insert(key, val).is_some() {
                return Err(Error::InvalidRequest(format!(
                    "duplicate Signature parameter {key:?}"
                )));
            }
        }

        let key_id = seen
            .remove("keyId")
            .ok_or_else(|| Error::InvalidRequest("Signature missing keyId".into()))?;
        let algorithm = seen
            .remove("algorithm")
            .ok_or_else(|| Error::InvalidRequest("Signature missing algorithm".into()))?;
        let headers = seen
            .remove("headers")
            .map(|h| h.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| vec![REQUEST_TARGET.to_string()]);
        if headers.is_empty() {
            return Err(Error::InvalidRequest(
                "Signature headers list must not be empty".into(),
            ));
        }
        let created = seen
            .remove("created")
            .map(|s| s.parse::<i64>())
            .transpose()
            .map_err(|_| Error::InvalidRequest("created is not an integer".into()))?;
        let expires = seen
            .remove("expires")
            .map(|s| s.parse::<i64>())
            .transpose()
            .map_err(|_| Error::InvalidRequest("expires is not an integer".into()))?;
        if headers.iter().any(|h| h == CREATED) && created.is_none() {
            return Err(Error::InvalidRequest(
                "headers references (created) but no created parameter was given".into(),
            ));
        }
        let signature_b64 = seen
            .remove("signature")
            .ok_or_else(|| Error::InvalidRequest("Signature missing signature".into()))?;
        let signature = base64::engine::general_purpose::STANDARD
            .decode(signature_b64)
            .map_err(|e| Error::InvalidRequest(format!("invalid base64 in signature: {e}")))?;

        Ok(Self {
            key_id,
            algorithm,
            headers,
            created,
            expires,
            signature,
        })
    }

    /// Renders as a `Signature` header value.
    pub fn to_header_value(&self) -> String {
        let mut s = format!(
            "keyId=\"{}\",algorithm=\"{}\",headers=\"{}\"",
            self.key_id,
            self.algorithm,
            self.headers.join(" ")
        );
        if let Some(created) = self.created {
            s.push_str(&format!(",created={created}"));
        }
        if let Some(expires) = self.expires {
            s.push_str(&format!(",expires={expires}"));
        }
        s.push_str(&format!(
            ",signature=\"{}\"",
            base64::engine::general_purpose::STANDARD.encode(&self.signature)
        ));
        s
    }
}

fn split_params(value: &str) -> Vec<&str> {
    // Commas only separate parameters outside of quoted values — headers="a
    // b c" never contains a comma, and signature values are base64 (no
    // commas either), so a naive split is safe here.
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Provides the raw values of ordinary (non-pseudo) headers for canonical
/// signing-input construction. Multiple values for the same header are
/// joined with `", "` in the order this returns them (§4.7).
pub trait HeaderSource {
    fn header_values(&self, lowercase_name: &str) -> Option<Vec<String>>;
}

/// Builds the canonical signing-input string for `params.headers`, in
/// order, joined by `\n` with no trailing newline (§4.7, §8 scenario S3).
pub fn canonical_signing_input(
    params: &SignatureParams,
    method: &str,
    request_target: &str,
    headers: &impl HeaderSource,
) -> Result<String> {
    let mut lines = Vec::with_capacity(params.headers.len());
    for name in &params.headers {
        let line = match name.as_str() {
            REQUEST_TARGET => {
                format!("{}: {} {}", REQUEST_TARGET, method.to_lowercase(), request_target)
            }
            CREATED => {
                let created = params
                    .created
                    .ok_or_else(|| Error::InvalidRequest("(created) requested but absent".into()))?;
                format!("{CREATED}: {created}")
            }
            EXPIRES => {
                let expires = params
                    .expires
                    .ok_or_else(|| Error::InvalidRequest("(expires) requested but absent".into()))?;
                format!("{EXPIRES}: {expires}")
            }
            other => {
                let lower = other.to_lowercase();
                let values = headers.header_values(&lower).ok_or_else(|| {
                    Error::InvalidRequest(format!("missing header {lower:?} for signing input"))
                })?;
                format!("{lower}: {}", values.join(", "))
            }
        };
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Signs `signing_input` with `key` under `alg`, returning a fully
/// populated [`SignatureParams`] (caller fills in `key_id`/`headers`/
/// `created`/`expires` before calling; this only computes `signature`).
pub fn sign(
    key_id: String,
    alg: SignatureAlgorithm,
    headers: Vec<String>,
    created: Option<i64>,
    expires: Option<i64>,
    signing_input: &str,
    key: &RsaPrivateKey,
) -> Result<SignatureParams> {
    let signature = alg.sign(key, signing_input.as_bytes())?;
    Ok(SignatureParams {
        key_id,
        algorithm: alg.wire_name().to_string(),
        headers,
        created,
        expires,
        signature,
    })
}

/// Verifies `params.signature` over `signing_input` against `public_key`,
/// using the algorithm named in `params.algorithm` (`hs2019` resolves to
/// the default RSA scheme, per §4.7).
pub fn verify(params: &SignatureParams, signing_input: &str, public_key: &RsaPublicKey) -> bool {
    let Some(alg) = SignatureAlgorithm::from_wire_name(&params.algorithm) else {
        return false;
    };
    alg.verify(public_key, signing_input.as_bytes(), &params.signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapHeaders(HashMap<String, Vec<String>>);
    impl HeaderSource for MapHeaders {
        fn header_values(&self, name: &str) -> Option<Vec<String>> {
            self.0.get(name).cloned()
        }
    }

    #[test]
    fn parses_the_wire_example_from_the_design_notes() {
        let header = r#"keyId="abc",algorithm="rsa-sha256",headers="(request-target) (created) digest x-request-id",created=1618302811,signature="aGVsbG8="#.to_string() + "\"";
        let params = SignatureParams::parse(&header).unwrap();
        assert_eq!(params.key_id, "abc");
        assert_eq!(params.created, Some(1618302811));
        assert_eq!(
            params.headers,
            vec!["(request-target)", "(created)", "digest", "x-request-id"]
        );
    }

    #[test]
    fn rejects_duplicate_parameters() {
        let header = r#"keyId="a",keyId="b",algorithm="rsa-sha256",signature="aGk=""#;
        assert!(SignatureParams::parse(header).is_err());
    }

    #[test]
    fn canonical_input_matches_the_scenario_s3_example() {
        let params = SignatureParams {
            key_id: "abc".into(),
            algorithm: "rsa-sha256".into(),
            headers: vec![
                REQUEST_TARGET.to_string(),
                CREATED.to_string(),
                "digest".to_string(),
                "x-response-id".to_string(),
            ],
            created: Some(1618302811),
            expires: None,
            signature: vec![],
        };
        let mut map = HashMap::new();
        map.insert(
            "digest".to_string(),
            vec!["SHA-256=X48E9qOokqqrvdts8nOJRJN3OWDUoyWxBf7kbu9DBPE=".to_string()],
        );
        map.insert("x-response-id".to_string(), vec!["abc".to_string()]);
        let input =
            canonical_signing_input(&params, "POST", "/payments", &MapHeaders(map)).unwrap();
        assert_eq!(
            input,
            "(request-target): post /payments\n\
             (created): 1618302811\n\
             digest: SHA-256=X48E9qOokqqrvdts8nOJRJN3OWDUoyWxBf7kbu9DBPE=\n\
             x-response-id: abc"
        );
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let key = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).unwrap();
        let public = RsaPublicKey::from(&key);
        let params = sign(
            "abc".into(),
            SignatureAlgorithm::Rs256,
            vec![REQUEST_TARGET.to_string()],
            None,
            None,
            "(request-target): get /x",
            &key,
        )
        .unwrap();
        assert!(verify(&params, "(request-target): get /x", &public));
        assert!(!verify(&params, "(request-target): get /y", &public));
    }
}
