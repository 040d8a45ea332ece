//! The HTTP-Signature pipeline (C8): path-scoped inbound validation and
//! optional outbound response signing, wired exactly to the state machine
//! in §4.8. The core is transport-agnostic — no HTTP server framework is a
//! dependency of this crate (§1) — so [`RequestContext`]/[`ResponseContext`]
//! are the narrow plain-data request/response shapes a host adapter (axum,
//! actix, a CGI shim, whatever) translates to and from.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::{PathRule, PipelineConfig};
use crate::error::{Error, Result};
use crate::httpsig::digest::{Digest, DigestAlgorithm};
use crate::httpsig::keystore::{SecurityKey, SigningCredentialsSource, ValidationKeyStore};
use crate::httpsig::signature::{
    self, canonical_signing_input, HeaderSource, SignatureParams, CREATED,
};
use rsa::RsaPublicKey;

/// An RFC 7807-shaped error body (§4.8 step 2, §7): `status`, `title`,
/// `detail`. Never includes which cryptographic step failed (§7 policy) —
/// `detail` is only ever one of a small set of fixed, generic sentences.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    pub status: u16,
    pub title: String,
    pub detail: String,
}

impl ProblemDetails {
    fn from_error(err: &Error) -> Self {
        Self {
            status: err.status_code(),
            title: err.title().to_string(),
            detail: public_detail(err),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"status\":{},\"title\":\"{}\"}}",
                self.status, self.title
            )
        })
    }
}

/// The fixed, non-leaking detail messages the client-facing error surface
/// uses (§7: "cryptographic failures never leak which step failed").
fn public_detail(err: &Error) -> String {
    match err {
        Error::MissingSignature => "Missing Signature header.".to_string(),
        Error::MissingDigest => "Missing digest.".to_string(),
        Error::MissingCert => "Missing signer certificate.".to_string(),
        Error::DigestMismatch => "Digest validation failed.".to_string(),
        Error::SignatureInvalid => "Signature validation failed.".to_string(),
        Error::Expired => "Signature has expired.".to_string(),
        Error::BadCertificate(_) => "Signature validation failed.".to_string(),
        Error::InvalidRequest(msg) => msg.clone(),
        Error::BodyTooLarge { limit, .. } => format!("Request body exceeds {limit} bytes."),
        other => other.to_string(),
    }
}

/// A header set as a flat ordered list, preserving duplicate entries in
/// the order they appeared on the wire — required by §4.7's "multiple
/// same-named headers are joined with `, `" rule.
#[derive(Debug, Clone, Default)]
pub struct HeaderList(pub Vec<(String, String)>);

impl HeaderList {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    fn first(&self, lowercase_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(lowercase_name))
            .map(|(_, v)| v.as_str())
    }
}

impl HeaderSource for HeaderList {
    fn header_values(&self, lowercase_name: &str) -> Option<Vec<String>> {
        let values: Vec<String> = self
            .0
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(lowercase_name))
            .map(|(_, v)| v.clone())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }
}

/// An inbound request, in the shape the pipeline needs to see it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: String,
    pub path_and_query: String,
    pub headers: HeaderList,
    pub body: Vec<u8>,
}

impl RequestContext {
    /// The effective path used for rule matching and `(request-target)`,
    /// preferring the configured forwarded-path header when present
    /// (§6 — `forwarded_path_header_name`).
    fn effective_path(&self, cfg: &PipelineConfig) -> String {
        self.headers
            .first(&cfg.forwarded_path_header_name)
            .map(str::to_string)
            .unwrap_or_else(|| self.path_and_query.clone())
    }
}

/// Outcome of running the inbound algorithm (§4.8) on one request.
pub enum InboundOutcome {
    /// No rule matched and no `Signature` header was present; forward as-is.
    Forward,
    /// The signature validated. `matched_rule` is `Some` when response
    /// signing should be considered for the matching outbound response.
    Accepted {
        signer_key_id: String,
        matched_rule: Option<PathRule>,
    },
    /// Validation failed; surface `problem` to the client verbatim.
    Rejected(ProblemDetails),
}

/// Drives the inbound half of §4.8's state machine.
pub fn validate_inbound(
    cfg: &PipelineConfig,
    req: &RequestContext,
    keys: &dyn ValidationKeyStore,
    clock: &dyn Clock,
) -> InboundOutcome {
    let path = req.effective_path(cfg);
    let rule = cfg.matching_rule(&path).cloned();
    let has_signature_header = req.headers.first("signature").is_some();

    if rule.is_none() && !has_signature_header {
        debug!(path = %path, "no matching rule and no Signature header; forwarding");
        return InboundOutcome::Forward;
    }
    if !cfg.request_validation {
        debug!(path = %path, "request_validation disabled; forwarding matched path");
        return InboundOutcome::Forward;
    }

    match run_inbound(cfg, req, &path, keys, clock) {
        Ok(signer_key_id) => InboundOutcome::Accepted {
            signer_key_id,
            matched_rule: rule,
        },
        Err(err) => {
            warn!(path = %path, status = err.status_code(), "inbound signature validation failed");
            InboundOutcome::Rejected(ProblemDetails::from_error(&err))
        }
    }
}

fn run_inbound(
    cfg: &PipelineConfig,
    req: &RequestContext,
    path: &str,
    keys: &dyn ValidationKeyStore,
    clock: &dyn Clock,
) -> Result<String> {
    let raw = req
        .headers
        .first("signature")
        .ok_or(Error::MissingSignature)?;
    let params = SignatureParams::parse(raw)?;

    if let Some(expires) = params.expires {
        if clock.now().timestamp() > expires {
            return Err(Error::Expired);
        }
    }

    let candidates = resolve_validation_keys(cfg, req, keys)?;

    if params.headers.iter().any(|h| h == "digest") {
        let digest_header = req
            .headers
            .first("digest")
            .ok_or(Error::MissingDigest)?
            .to_string();
        let digest = Digest::parse(&digest_header)?;
        if req.body.len() > cfg.max_body_bytes {
            return Err(Error::BodyTooLarge {
                actual: req.body.len(),
                limit: cfg.max_body_bytes,
            });
        }
        if !digest.validate(&req.body) {
            return Err(Error::DigestMismatch);
        }
    }

    let signing_input =
        canonical_signing_input(&params, &req.method, path, &req.headers)?;

    for key in &candidates {
        if signature::verify(&params, &signing_input, &key.public_key) {
            debug!(key_id = %key.key_id, "signature verified");
            return Ok(key.key_id.clone());
        }
    }
    Err(Error::SignatureInvalid)
}

/// §4.8 step 3: prefer the base64 X.509 carried in the configured request
/// certificate header; else fall back to the validation key store.
fn resolve_validation_keys(
    cfg: &PipelineConfig,
    req: &RequestContext,
    keys: &dyn ValidationKeyStore,
) -> Result<Vec<SecurityKey>> {
    if let Some(cert_b64) = req
        .headers
        .first(&cfg.request_signature_certificate_header_name)
    {
        match public_key_from_cert_b64(cert_b64) {
            Ok((key_id, public_key, der)) => {
                return Ok(vec![SecurityKey {
                    key_id,
                    public_key,
                    certificate_der: Some(der),
                }])
            }
            Err(err) => {
                warn!("request carried an unparseable certificate header: {err}");
            }
        }
    }
    let fallback = keys.validation_keys();
    if fallback.is_empty() {
        return Err(Error::MissingCert);
    }
    Ok(fallback)
}

fn public_key_from_cert_b64(b64: &str) -> Result<(String, RsaPublicKey, Vec<u8>)> {
    let der = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| Error::BadCertificate(e.to_string()))?;
    let (key_id, public_key) = extract_spki(&der)?;
    Ok((key_id, public_key, der))
}

/// Pulls the `subjectPublicKeyInfo` out of a DER `Certificate` and
/// computes its key id the same way [`crate::ext::basic::key_identifier`]
/// does, without depending on the issuing manager.
fn extract_spki(cert_der: &[u8]) -> Result<(String, RsaPublicKey)> {
    use rsa::pkcs8::DecodePublicKey;
    use sha1::{Digest as _, Sha1};

    let mut r = crate::der::Reader::new(cert_der);
    let spki_der = r.read_sequence(|cert| {
        cert.read_sequence(|tbs| {
            if tbs.peek_is_explicit(0) {
                tbs.read_explicit(0, |v| v.read_integer_i64())?;
            }
            let _serial = tbs.read_integer_bytes()?;
            let _sig_alg = tbs.read_raw_tlv()?;
            let _issuer = tbs.read_raw_tlv()?;
            let _validity = tbs.read_raw_tlv()?;
            let _subject = tbs.read_raw_tlv()?;
            let spki = tbs.read_raw_tlv()?;
            Ok(spki.to_vec())
        })
    })
    .map_err(|e| Error::BadCertificate(e.to_string()))?;

    let public_key = RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| Error::BadCertificate(e.to_string()))?;

    // Recompute the same key id the certificate manager derives (SHA-1 of
    // the subjectPublicKey BIT STRING content, RFC 5280 §4.2.1.2 method (1)).
    let mut inner = crate::der::Reader::new(&spki_der);
    let bit_string_bytes = inner
        .read_sequence(|seq| {
            seq.read_sequence(|_alg| Ok(()))?;
            let (_unused, bytes) = seq.read_bit_string()?;
            Ok(bytes.to_vec())
        })
        .map_err(|e| Error::BadCertificate(e.to_string()))?;
    let key_id = hex::encode(Sha1::digest(&bit_string_bytes));
    Ok((key_id, public_key))
}

/// An outbound response to be (optionally) signed.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub headers: HeaderList,
    pub body: Vec<u8>,
}

/// §4.8's outbound algorithm: signs `response` in place when `rule` is
/// `Some` (the inbound request matched a rule) and `response_signing` is
/// enabled and a signing credential is available. A no-op otherwise —
/// never partially signs (§8 invariant 6).
#[allow(clippy::too_many_arguments)]
pub fn sign_response(
    cfg: &PipelineConfig,
    rule: Option<&PathRule>,
    response: &mut ResponseContext,
    credentials: &dyn SigningCredentialsSource,
    clock: &dyn Clock,
    request_id: &str,
) -> Result<()> {
    let Some(rule) = rule else {
        return Ok(());
    };
    if !cfg.response_signing {
        return Ok(());
    }
    let Some(creds) = credentials.signing_credentials() else {
        return Ok(());
    };
    if response.body.len() > cfg.max_body_bytes {
        return Err(Error::BodyTooLarge {
            actual: response.body.len(),
            limit: cfg.max_body_bytes,
        });
    }

    let digest = Digest::compute(DigestAlgorithm::Sha256, &response.body);
    let digest_header = digest.to_header_value();

    let created = clock.now().timestamp();
    let mut headers = response.headers.clone();
    headers.push(cfg.response_created_header_name.clone(), created.to_string());
    headers.push(cfg.response_id_header_name.clone(), request_id.to_string());
    headers.push("digest".to_string(), digest_header.clone());

    let header_names = rule_headers_for_response(cfg, rule);
    let signing_input = response_signing_input(&header_names, &headers)?;

    let signed = signature::sign(
        creds.key_id.clone(),
        creds.algorithm,
        header_names,
        Some(created),
        None,
        &signing_input,
        creds.key_pair.private_key(),
    )?;

    response
        .headers
        .push("signature", signed.to_header_value());
    response.headers.push("digest", digest_header);
    response.headers.push(
        cfg.response_signature_certificate_header_name.clone(),
        base64::engine::general_purpose::STANDARD.encode(&creds.certificate_der),
    );
    response
        .headers
        .push(cfg.response_created_header_name.clone(), created.to_string());
    response
        .headers
        .push(cfg.response_id_header_name.clone(), request_id.to_string());
    Ok(())
}

/// The `Signature.headers` list for an outbound response: the rule's
/// declared headers with `(created)` mapped to the configured
/// response-created header name (§4.8: "mapping `(created)` to the
/// configured response-created header") and the response-id header
/// appended if not already present ("injecting a generated response id").
/// `(request-target)` is dropped — a response has none.
fn rule_headers_for_response(cfg: &PipelineConfig, rule: &PathRule) -> Vec<String> {
    let source: Vec<String> = if rule.required_headers.is_empty() {
        vec![CREATED.to_string(), "digest".to_string()]
    } else {
        rule.required_headers.clone()
    };
    let mut headers: Vec<String> = source
        .into_iter()
        .filter(|h| h != signature::REQUEST_TARGET)
        .map(|h| {
            if h == CREATED {
                cfg.response_created_header_name.clone()
            } else {
                h
            }
        })
        .collect();
    if !headers.iter().any(|h| h == &cfg.response_id_header_name) {
        headers.push(cfg.response_id_header_name.clone());
    }
    headers
}

/// Every entry in `header_names` is by this point a real (non-pseudo)
/// header name, so the canonical input is a plain lookup-and-join per
/// entry (§4.7's "multiple same-named headers are joined with `, `").
fn response_signing_input(header_names: &[String], headers: &HeaderList) -> Result<String> {
    let mut lines = Vec::with_capacity(header_names.len());
    for name in header_names {
        let lower = name.to_lowercase();
        let values = headers
            .header_values(&lower)
            .ok_or_else(|| Error::InvalidRequest(format!("missing header {lower:?} for signing input")))?;
        lines.push(format!("{lower}: {}", values.join(", ")));
    }
    Ok(lines.join("\n"))
}

/// Generates a response id for the outbound `x-response-id`-equivalent
/// header. Exposed so hosts can thread the same id through logs.
pub fn generate_response_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Whether `at` is on or before `expires`, used by callers that want to
/// pre-check expiry without going through [`validate_inbound`] (e.g. to
/// decide whether to even attempt a retry).
pub fn is_expired(expires: Option<i64>, at: DateTime<Utc>) -> bool {
    expires.is_some_and(|e| at.timestamp() > e)
}
