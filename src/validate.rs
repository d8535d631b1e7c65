//! Chain validation of parsed RPKI objects.
//!
//! The validator owns an [`AuthTree`], an ordered map from subject key
//! identifier to accepted certificate. A newly parsed object names its
//! issuer through its AKI; validation locates that issuer and then walks
//! up the parent links until every resource the object asserts is covered
//! by a non-inheriting allocation, or until an ancestor definitively
//! refuses it. An ancestor that has nothing authoritative to say about a
//! resource, because its own set is absent or inherits, just sends the
//! walk one level further up. This is the RFC 3779 inherit semantics the
//! whole trust model depends on.
//!
//! Accepting an object is also what ties it to its trust anchor: the
//! validator stamps the `tal` identity and the `valid` flag onto a
//! certificate or ROA exactly once, on the success path.
//!
//! Every rejection is logged with the file name of the offending object,
//! followed by the chain of ancestors that was consulted.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use log::warn;
use crate::cert::{Cert, CertPurpose};
use crate::crypto::{DigestAlgorithm, KeyIdentifier};
use crate::resources::{AddressFamily, Addr, Asn, Coverage};
use crate::roa::Roa;


//------------ Auth ----------------------------------------------------------

/// An accepted certificate in the authority tree.
#[derive(Clone, Debug)]
pub struct Auth {
    /// The accepted certificate.
    cert: Cert,

    /// The SKI of the issuing certificate. `None` for a trust anchor.
    ///
    /// The edge is kept as a key rather than a reference; the tree is the
    /// sole owner of its nodes and resolves the edge on demand.
    parent: Option<KeyIdentifier>,

    /// The file the certificate came from, for diagnostics.
    file: String,
}

impl Auth {
    pub fn new(
        cert: Cert, parent: Option<KeyIdentifier>, file: String
    ) -> Self {
        Auth { cert, parent, file }
    }

    pub fn cert(&self) -> &Cert {
        &self.cert
    }

    pub fn parent(&self) -> Option<&KeyIdentifier> {
        self.parent.as_ref()
    }

    pub fn file(&self) -> &str {
        &self.file
    }
}


//------------ AuthTree ------------------------------------------------------

/// The tree of accepted certificate authorities, keyed by SKI.
///
/// Parent links form a forest whose roots are trust anchors. Entries are
/// never removed during a validation run; iteration order is the order of
/// the keys, keeping diagnostics deterministic.
#[derive(Clone, Debug, Default)]
pub struct AuthTree {
    nodes: BTreeMap<KeyIdentifier, Auth>,
}

impl AuthTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the authority whose certificate has the given SKI.
    pub fn find(&self, ski: &KeyIdentifier) -> Option<&Auth> {
        self.nodes.get(ski)
    }

    /// Inserts an authority, rejecting a duplicate SKI.
    pub fn insert(&mut self, auth: Auth) -> Result<(), DuplicateSki> {
        let ski = *auth.cert().ski();
        if self.nodes.contains_key(&ski) {
            return Err(DuplicateSki(ski))
        }
        self.nodes.insert(ski, auth);
        Ok(())
    }

    /// Returns an iterator over the authorities in SKI order.
    pub fn iter(&self) -> impl Iterator<Item = &Auth> + '_ {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the parent authority of the given authority.
    fn parent_of(&self, auth: &Auth) -> Option<&Auth> {
        auth.parent().and_then(|parent| self.find(parent))
    }
}


//------------ DuplicateSki --------------------------------------------------

/// An authority with this SKI is already present in the tree.
#[derive(Clone, Copy, Debug)]
pub struct DuplicateSki(KeyIdentifier);

impl fmt::Display for DuplicateSki {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "duplicate SKI {}", self.0)
    }
}

impl std::error::Error for DuplicateSki { }


//------------ Chain walks ---------------------------------------------------

/// Logs the chain of ancestors a rejected object inherited from.
fn tracewarn(tree: &AuthTree, start: &Auth) {
    let mut auth = Some(start);
    while let Some(current) = auth {
        warn!(" ...inheriting from: {}", current.file());
        auth = tree.parent_of(current);
    }
}

/// Walks up the chain trying to cover the AS numbers `min..=max`.
fn valid_as(tree: &AuthTree, start: &Auth, min: Asn, max: Asn) -> bool {
    let mut auth = Some(start);
    while let Some(current) = auth {
        match current.cert().asns().coverage(min, max) {
            Coverage::Covered => return true,
            Coverage::Refused => return false,
            Coverage::Indeterminate => { }
        }
        auth = tree.parent_of(current);
    }
    false
}

/// Walks up the chain trying to cover the addresses `min..=max` in `afi`.
fn valid_ip(
    tree: &AuthTree, start: &Auth,
    afi: AddressFamily, min: Addr, max: Addr,
) -> bool {
    let mut auth = Some(start);
    while let Some(current) = auth {
        match current.cert().ips().coverage(afi, min, max) {
            Coverage::Covered => return true,
            Coverage::Refused => return false,
            Coverage::Indeterminate => { }
        }
        auth = tree.parent_of(current);
    }
    false
}

/// Walks up the chain looking for a concrete allocation for `afi`.
///
/// An inheriting entry is satisfied by the nearest ancestor that holds a
/// non-inheriting set for the family; it fails only if no ancestor does.
fn valid_ip_inherit(
    tree: &AuthTree, start: &Auth, afi: AddressFamily
) -> bool {
    let mut auth = Some(start);
    while let Some(current) = auth {
        if current.cert().ips().has_concrete(afi) {
            return true
        }
        auth = tree.parent_of(current);
    }
    false
}


//------------ Validation entry points ---------------------------------------

/// Checks that `ski` is new and returns the parent named by `aki`.
pub fn valid_ski_aki<'a>(
    file: &str, tree: &'a AuthTree,
    ski: &KeyIdentifier, aki: &KeyIdentifier,
) -> Option<&'a Auth> {
    if tree.find(ski).is_some() {
        warn!("{}: RFC 6487: duplicate SKI", file);
        return None
    }
    let auth = tree.find(aki);
    if auth.is_none() {
        warn!("{}: RFC 6487: unknown AKI", file);
    }
    auth
}

/// Authenticates a trust anchor certificate against the tree.
///
/// A trust anchor's resources must not inherit, and its SKI must be
/// unique. On success the certificate is stamped with `tal`, the
/// identifier of the Trust Anchor Locator it came from, and marked
/// valid.
pub fn valid_ta(
    file: &str, tree: &AuthTree, cert: &mut Cert, tal: &str,
) -> bool {
    if cert.asns().has_inherit() {
        warn!(
            "{}: RFC 6487 (trust anchor): inheriting AS resources", file
        );
        return false
    }
    if cert.ips().has_inherit() {
        warn!(
            "{}: RFC 6487 (trust anchor): inheriting IP resources", file
        );
        return false
    }
    if tree.find(cert.ski()).is_some() {
        warn!("{}: RFC 6487: duplicate SKI", file);
        return false
    }
    cert.set_tal(tal.to_owned());
    cert.set_valid();
    true
}

/// Validates a non-TA certificate against the tree.
///
/// The issuer named by the AKI must exist, and every AS and IP resource
/// of the certificate must be covered by the chain starting there. On
/// success the certificate inherits the trust anchor identity of its
/// issuer and is marked valid.
pub fn valid_cert(file: &str, tree: &AuthTree, cert: &mut Cert) -> bool {
    let aki = match cert.aki() {
        Some(aki) => *aki,
        None => {
            warn!("{}: RFC 6487: missing AKI", file);
            return false
        }
    };
    let auth = match valid_ski_aki(file, tree, cert.ski(), &aki) {
        Some(auth) => auth,
        None => return false,
    };
    let tal = match auth.cert().tal() {
        Some(tal) => tal.to_owned(),
        None => {
            warn!("{}: authority missing trust anchor identity", file);
            return false
        }
    };

    for entry in cert.asns().iter() {
        match (entry.min(), entry.max()) {
            (Some(min), Some(max)) => {
                if valid_as(tree, auth, min, max) {
                    continue
                }
                warn!(
                    "{}: RFC 6487: uncovered AS: {}--{}",
                    file, min.into_u32(), max.into_u32()
                );
                tracewarn(tree, auth);
                return false
            }
            _ => {
                // BGPsec router certificates may not inherit.
                if cert.purpose() == CertPurpose::BgpsecRouter {
                    warn!(
                        "{}: RFC 8209: BGPsec router certificate \
                         may not inherit AS resources", file
                    );
                    return false
                }
            }
        }
    }

    for entry in cert.ips().iter() {
        let covered = match (entry.min(), entry.max()) {
            (Some(min), Some(max)) => {
                valid_ip(tree, auth, entry.afi(), min, max)
            }
            _ => valid_ip_inherit(tree, auth, entry.afi()),
        };
        if covered {
            continue
        }
        warn!(
            "{}: RFC 6487: uncovered IP: {}", file, entry.display()
        );
        tracewarn(tree, auth);
        return false
    }

    cert.set_tal(tal);
    cert.set_valid();
    true
}

/// Validates a ROA against the tree.
///
/// The issuer named by the AKI must exist and every prefix must be
/// covered by the chain. On success the ROA is stamped with the chain's
/// trust anchor identity.
pub fn valid_roa(file: &str, tree: &AuthTree, roa: &mut Roa) -> bool {
    let auth = match valid_ski_aki(file, tree, roa.ski(), roa.aki()) {
        Some(auth) => auth,
        None => return false,
    };
    let tal = match auth.cert().tal() {
        Some(tal) => tal.to_owned(),
        None => {
            warn!("{}: authority missing trust anchor identity", file);
            return false
        }
    };

    for prefix in roa.prefixes() {
        if valid_ip(tree, auth, prefix.afi(), prefix.min(), prefix.max()) {
            continue
        }
        warn!("{}: RFC 6482: uncovered IP: {}", file, prefix.display());
        tracewarn(tree, auth);
        return false
    }

    roa.set_tal(tal);
    true
}

/// Validates a file name listed on a manifest.
///
/// draft-ietf-sidrops-6486bis section 4.2.2: at least five characters
/// from `[A-Za-z0-9._-]`, exactly one dot, and one of the known object
/// extensions.
pub fn valid_filename(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.len() < 5 {
        return false
    }
    if !bytes.iter().all(|ch| {
        ch.is_ascii_alphanumeric()
            || *ch == b'-' || *ch == b'_' || *ch == b'.'
    }) {
        return false
    }
    if bytes.iter().filter(|ch| **ch == b'.').count() != 1 {
        return false
    }
    let ext = &name[name.len() - 4..];
    ext.eq_ignore_ascii_case(".cer")
        || ext.eq_ignore_ascii_case(".crl")
        || ext.eq_ignore_ascii_case(".gbr")
        || ext.eq_ignore_ascii_case(".roa")
}

/// Validates a file by verifying its SHA-256 hash.
///
/// Returns `false` if the file cannot be read or the hash differs.
///
/// # Panics
///
/// Handing in an expected hash that is not the SHA-256 digest size is a
/// contract violation by the caller and panics.
pub fn valid_filehash(path: impl AsRef<Path>, expected: &[u8]) -> bool {
    let algorithm = DigestAlgorithm::sha256();
    assert_eq!(expected.len(), algorithm.digest_len(), "bad hash size");
    match algorithm.digest_file(path) {
        Ok(digest) => digest.as_ref() == expected,
        Err(_) => false,
    }
}


//============ Tests =========================================================
