/*!
Cryptographic core for issuing PSD2-compliant X.509 qualified certificates
(QWAC/QSEAL) and for signing and verifying HTTP messages under the
draft-cavage HTTP-Signatures scheme.

Two subsystems make up the crate:

- [`pki`] — a minimal, self-contained certificate authority: key
  generation, a [`der`]/[`ext`] ASN.1 layer that assembles ETSI EN 319 412-5
  / TS 119 495 qualified-certificate extensions, and the [`pki::repository`]
  and [`pki::crl`] that persist and revoke issued certificates.
- [`httpsig`] — parsing and canonicalization of the `Signature`/`Digest`
  headers, and a transport-agnostic [`httpsig::pipeline`] a host wires into
  its own request/response handling.

Neither subsystem depends on an HTTP server framework, a SQL driver, or a
DI container (those are the host's job) — only a [`clock::Clock`] and a
[`pki::repository::CertificateRepository`] are required from the caller.

## Example

```no_run
use psd2_qcert::clock::{Clock, SystemClock};
use psd2_qcert::pki::manager::CertificateManager;
use std::sync::Arc;

let clock: Arc<dyn Clock> = Arc::new(SystemClock);
let manager = CertificateManager::new("bank.example.com", clock);
let (root_ca, _root_key) = manager.create_root_ca(2048).unwrap();
assert!(root_ca.is_ca);
```
*/

#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod der;
pub mod error;
pub mod ext;
pub mod httpsig;
pub mod pki;
pub mod subject;

pub use error::{Error, Result};
