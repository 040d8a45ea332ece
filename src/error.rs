//! Crate-wide error type.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. The HTTP
//! pipeline (`httpsig::pipeline`) maps each variant to a status code exactly
//! once, at the edge, per the policy in the error handling design: a
//! cryptographic failure never leaks which step failed, only that the
//! request was rejected.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate error taxonomy.
#[derive(Error, Debug)]
pub enum Error {
    /// ASN.1/DER decode failure (§4.1). Carries the offending byte offset.
    #[error("DER decode error at offset {offset}: {kind}")]
    DerDecode {
        /// What went wrong.
        kind: crate::der::DerErrorKind,
        /// Byte offset into the input where decoding failed.
        offset: usize,
    },

    /// ASN.1/DER encoding failure. Only raised for programmer errors (e.g. an
    /// out-of-range value), since encoding is otherwise infallible.
    #[error("DER encode error: {0}")]
    DerEncode(String),

    /// A PSD2 certificate request failed an invariant in §3.
    #[error("invalid certificate request: {0}")]
    InvalidRequest(String),

    /// The `Signature` header was required but absent.
    #[error("missing Signature header")]
    MissingSignature,

    /// The `Digest` header was required but absent.
    #[error("missing Digest header")]
    MissingDigest,

    /// No signer certificate was supplied and none could be resolved.
    #[error("missing signing certificate")]
    MissingCert,

    /// A certificate supplied by a client did not decode.
    #[error("malformed certificate: {0}")]
    BadCertificate(String),

    /// The `Digest` header did not match the recomputed digest of the body.
    #[error("digest validation failed")]
    DigestMismatch,

    /// Cryptographic signature verification failed.
    #[error("signature verification failed")]
    SignatureInvalid,

    /// A signature or certificate has expired, or is not yet valid.
    #[error("expired")]
    Expired,

    /// The repository already holds an entry with this key id.
    #[error("duplicate key id: {0}")]
    DuplicateKeyId(String),

    /// No entry exists for the given key id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The certificate repository could not service the request.
    #[error("repository unavailable: {0}")]
    RepositoryUnavailable(String),

    /// RSA key generation or signing failure.
    #[error("RSA error: {0}")]
    Rsa(#[from] rsa::Error),

    /// PKCS#8/PKCS#1 key (de)serialization failure.
    #[error("key encoding error: {0}")]
    KeyEncoding(String),

    /// Base64 decoding failure.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// PEM (de)serialization failure.
    #[error("PEM error: {0}")]
    Pem(#[from] pem::PemError),

    /// PKCS#12 assembly failure.
    #[error("PKCS#12 error: {0}")]
    Pkcs12(String),

    /// Body exceeded the configured size cap (413).
    #[error("request body too large ({actual} > {limit} bytes)")]
    BodyTooLarge {
        /// Observed body size.
        actual: usize,
        /// Configured cap.
        limit: usize,
    },

    /// I/O failure (bootstrap artifact read/write, config load).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or TOML parsing failure.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<crate::der::DerError> for Error {
    fn from(e: crate::der::DerError) -> Self {
        Error::DerDecode {
            kind: e.kind,
            offset: e.offset,
        }
    }
}

impl Error {
    /// Maps this error to the HTTP status code the pipeline should surface,
    /// per the taxonomy table in the error handling design (§7).
    ///
    /// Cryptographic failures are collapsed to 401 regardless of the precise
    /// internal cause, so a client never learns which validation step broke.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 400,
            Error::MissingSignature | Error::MissingDigest | Error::MissingCert => 400,
            Error::BadCertificate(_) => 401,
            Error::DigestMismatch => 401,
            Error::SignatureInvalid => 401,
            Error::Expired => 401,
            Error::DuplicateKeyId(_) => 409,
            Error::NotFound(_) => 404,
            Error::RepositoryUnavailable(_) => 503,
            Error::BodyTooLarge { .. } => 413,
            Error::DerDecode { .. } => 400,
            _ => 500,
        }
    }

    /// The RFC 7807-ish `title` for problem-details bodies. Intentionally
    /// generic for the 401 branch (see module docs).
    pub fn title(&self) -> &'static str {
        match self.status_code() {
            400 => "Bad Request",
            401 => "Unauthorized",
            404 => "Not Found",
            409 => "Conflict",
            413 => "Payload Too Large",
            503 => "Service Unavailable",
            _ => "Internal Server Error",
        }
    }
}
