//! Key/credential stores (C9): the two narrow interfaces the pipeline
//! consumes, plus a default in-memory implementation backed by a loaded
//! PEM/PKCS#12 key pair (§4.9).

use rsa::RsaPublicKey;

use crate::pki::algorithm::SignatureAlgorithm;
use crate::pki::keypair::KeyPair;

/// A public key the pipeline will try when validating an inbound
/// signature, together with the DER certificate it came from (so the
/// pipeline can report which certificate matched, if any).
#[derive(Clone)]
pub struct SecurityKey {
    pub key_id: String,
    pub public_key: RsaPublicKey,
    pub certificate_der: Option<Vec<u8>>,
}

/// The credential the pipeline signs outbound responses with.
#[derive(Clone)]
pub struct SigningCredentials {
    pub key_id: String,
    pub algorithm: SignatureAlgorithm,
    pub key_pair: KeyPair,
    pub certificate_der: Vec<u8>,
}

/// Supplies the credential used to sign outbound responses (§4.9).
/// Absence means response signing is unavailable regardless of the
/// `response_signing` configuration flag.
pub trait SigningCredentialsSource: Send + Sync {
    fn signing_credentials(&self) -> Option<SigningCredentials>;
}

/// Supplies the set of public keys accepted for inbound signature
/// validation, used as the fallback when the request does not carry its
/// own certificate header (§4.8 step 3).
pub trait ValidationKeyStore: Send + Sync {
    fn validation_keys(&self) -> Vec<SecurityKey>;
}

/// A default in-memory implementation of both stores, wrapping one
/// signing credential and a fixed set of trusted validation keys.
#[derive(Default, Clone)]
pub struct InMemoryKeyStore {
    credentials: Option<SigningCredentials>,
    trusted: Vec<SecurityKey>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signing_credentials(mut self, credentials: SigningCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_trusted_key(mut self, key: SecurityKey) -> Self {
        self.trusted.push(key);
        self
    }
}

impl SigningCredentialsSource for InMemoryKeyStore {
    fn signing_credentials(&self) -> Option<SigningCredentials> {
        self.credentials.clone()
    }
}

impl ValidationKeyStore for InMemoryKeyStore {
    fn validation_keys(&self) -> Vec<SecurityKey> {
        self.trusted.clone()
    }
}
