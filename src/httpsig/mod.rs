//! HTTP message signing (C7–C9): the `Signature`/`Digest` header types, the
//! key/credential store interfaces, and the path-scoped validation/signing
//! pipeline built on top of them.

pub mod digest;
pub mod keystore;
pub mod pipeline;
pub mod signature;
