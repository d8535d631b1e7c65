//! The validation core of an RPKI relying party.
//!
//! The _Resource Public Key Infrastructure_ (RPKI) allows the holders of
//! IP address prefixes and AS numbers to publish cryptographically signed
//! statements about these resources. A relying party downloads the
//! published objects and validates them against the trust anchors it is
//! configured with.
//!
//! This crate implements the two subsystems at the heart of that process:
//! parsing X.509 resource certificates with their RFC 3779 resource
//! extensions out of untrusted DER, and deciding whether an object's
//! resources are transitively covered by the chain of certificates above
//! it. Fetching objects, parsing the CMS envelopes of manifests and ROAs,
//! and producing router-facing output are all left to the embedding
//! application, as is verifying signatures. The parser is designed to run
//! in a separate, untrusted worker process; the certificate record it
//! produces can be shipped to the validator over a pipe in a
//! length-checked byte format.

pub mod brk;
pub mod cert;
pub mod crypto;
pub mod error;
pub mod oid;
pub mod resources;
pub mod roa;
pub mod uri;
pub mod validate;
pub mod x509;

mod ipc;
