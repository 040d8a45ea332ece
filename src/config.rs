//! Configuration options (§6), loadable from TOML.
//!
//! The host wires these up from whatever its own configuration surface is
//! (environment, file, secrets manager); this module only owns the shape
//! and the TOML deserialization, mirroring how the pack's larger crates
//! (`cim-keys`) load a plain `serde`-deserializable config struct rather
//! than reaching for a dedicated config crate.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration consumed by [`crate::pki::manager::CertificateManager`]
/// and the CRL generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateManagerConfig {
    /// Base URL used to build AIA/CRL distribution point URLs.
    pub issuer_domain: String,
    /// Root-CA PKCS#12 export passphrase, used when bootstrapping the
    /// on-disk `ca.pfx` artifact.
    pub pfx_passphrase: String,
    /// Directory holding the bootstrap artifacts (`ca.pfx`, `ca.cer`).
    pub path: String,
    /// RSA modulus size for newly generated root CAs.
    pub root_ca_key_bits: usize,
}

impl Default for CertificateManagerConfig {
    fn default() -> Self {
        Self {
            issuer_domain: "localhost".to_string(),
            pfx_passphrase: String::new(),
            path: ".".to_string(),
            root_ca_key_bits: 2048,
        }
    }
}

/// Configuration consumed by [`crate::httpsig::pipeline::SignaturePipeline`]
/// (§6's enumerated options).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Enforce signatures on matched paths. Default `true`.
    pub request_validation: bool,
    /// Sign outbound responses on matched paths, when a signing credential
    /// is available. Default `true`.
    pub response_signing: bool,
    /// Request header carrying the base64 X.509 signer certificate.
    pub request_signature_certificate_header_name: String,
    /// Response header carrying the base64 X.509 signer certificate.
    pub response_signature_certificate_header_name: String,
    /// Header used to recover the original request path when the pipeline
    /// sits behind a reverse proxy.
    pub forwarded_path_header_name: String,
    /// Header the inbound `(created)` pseudo-header reads its fallback
    /// value from when `Signature.created` is absent and the path rule
    /// still requires `(created)`. Present for parity with the response
    /// side; the inbound algorithm otherwise relies on the `Signature`
    /// header's own `created` parameter (§4.7).
    pub request_created_header_name: String,
    /// Header carrying the response's `(created)` value when signing.
    pub response_created_header_name: String,
    /// Header carrying the generated response id injected into the
    /// outbound canonical signing input.
    pub response_id_header_name: String,
    /// Maximum buffered body size before a request/response is rejected
    /// with 413 (§9).
    pub max_body_bytes: usize,
    /// Path-scoped validation rules.
    pub rules: Vec<PathRule>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_validation: true,
            response_signing: true,
            request_signature_certificate_header_name: "x-ssl-client-cert".to_string(),
            response_signature_certificate_header_name: "x-ssl-cert".to_string(),
            forwarded_path_header_name: "x-forwarded-path".to_string(),
            request_created_header_name: "x-request-created".to_string(),
            response_created_header_name: "x-response-created".to_string(),
            response_id_header_name: "x-response-id".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
            rules: Vec::new(),
        }
    }
}

/// One path-scoped signing policy: `pattern` may end in a bare `*`
/// wildcard segment (e.g. `/payments/*`), matching any suffix at that
/// position; `required_headers` is the `headers` list the inbound
/// `Signature` must cover for a match against this rule to be considered
/// satisfied by signature shape alone (digest/signature verification
/// still apply regardless).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRule {
    pub pattern: String,
    #[serde(default)]
    pub required_headers: Vec<String>,
}

impl PathRule {
    /// Whether `path` matches this rule's `pattern`.
    pub fn matches(&self, path: &str) -> bool {
        match self.pattern.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => path == self.pattern,
        }
    }
}

impl PipelineConfig {
    /// The first rule matching `path`, if any.
    pub fn matching_rule(&self, path: &str) -> Option<&PathRule> {
        self.rules.iter().find(|r| r.matches(path))
    }

    /// Parses a `PipelineConfig` from a TOML document.
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Configuration(e.to_string()))
    }
}

impl CertificateManagerConfig {
    /// Parses a `CertificateManagerConfig` from a TOML document.
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_pattern_matches_prefix() {
        let rule = PathRule {
            pattern: "/payments/*".to_string(),
            required_headers: vec![],
        };
        assert!(rule.matches("/payments/123"));
        assert!(rule.matches("/payments/"));
        assert!(!rule.matches("/accounts/123"));
    }

    #[test]
    fn exact_pattern_matches_only_itself() {
        let rule = PathRule {
            pattern: "/payments".to_string(),
            required_headers: vec![],
        };
        assert!(rule.matches("/payments"));
        assert!(!rule.matches("/payments/123"));
    }

    #[test]
    fn pipeline_config_round_trips_through_toml() {
        let cfg = PipelineConfig {
            rules: vec![PathRule {
                pattern: "/payments/*".to_string(),
                required_headers: vec!["digest".to_string()],
            }],
            ..Default::default()
        };
        let toml = toml::to_string(&cfg).unwrap();
        let parsed = PipelineConfig::from_toml(&toml).unwrap();
        assert_eq!(parsed.rules.len(), 1);
        assert_eq!(parsed.request_validation, cfg.request_validation);
    }

    #[test]
    fn defaults_match_the_design_notes() {
        let cfg = PipelineConfig::default();
        assert!(cfg.request_validation);
        assert!(cfg.response_signing);
        assert_eq!(cfg.max_body_bytes, 10 * 1024 * 1024);
    }
}
