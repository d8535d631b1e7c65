//! BGPsec Router Keys.
//!
//! A validated BGPsec router certificate binds each AS number in its
//! resource set to the router's public key. The bindings are aggregated
//! into an ordered set so the output side can emit them deterministically
//! and duplicates collapse onto the entry with the longest remaining
//! lifetime.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use log::warn;
use crate::cert::{Cert, CertPurpose};
use crate::crypto::KeyIdentifier;
use crate::resources::{AsEntry, Asn};
use crate::x509::Time;

/// The largest AS range expanded into individual router keys.
///
/// Ranges this size do not occur under real allocations; anything larger
/// is skipped rather than allowed to balloon the tree.
const MAX_RANGE_EXPANSION: u64 = 65536;


//------------ Brk -----------------------------------------------------------

/// One BGPsec Router Key binding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Brk {
    asid: Asn,
    ski: KeyIdentifier,
    pubkey: String,
    expires: Time,
    tal: String,
}

impl Brk {
    pub fn asid(&self) -> Asn {
        self.asid
    }

    pub fn ski(&self) -> &KeyIdentifier {
        &self.ski
    }

    /// The base64 encoded subject public key info of the router key.
    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }

    pub fn expires(&self) -> Time {
        self.expires
    }

    pub fn tal(&self) -> &str {
        &self.tal
    }
}


//------------ BrkTree -------------------------------------------------------

/// The set of router key bindings, ordered by `(asid, ski, pubkey)`.
#[derive(Clone, Debug, Default)]
pub struct BrkTree {
    brks: BTreeMap<(Asn, KeyIdentifier, String), (Time, String)>,
}

impl BrkTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.brks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brks.is_empty()
    }

    /// Returns an iterator over the bindings in key order.
    pub fn iter(&self) -> impl Iterator<Item = Brk> + '_ {
        self.brks.iter().map(|(key, value)| {
            Brk {
                asid: key.0,
                ski: key.1,
                pubkey: key.2.clone(),
                expires: value.0,
                tal: value.1.clone(),
            }
        })
    }

    /// Adds one binding for every AS number of a router certificate.
    ///
    /// The certificate must have been validated: it carries a public key
    /// and has been stamped with its trust anchor. If a binding for the
    /// same `(asid, ski, pubkey)` already exists, the one with the later
    /// expiry wins, together with its trust anchor identity.
    pub fn insert_cert(&mut self, cert: &Cert) {
        debug_assert_eq!(cert.purpose(), CertPurpose::BgpsecRouter);
        let (pubkey, tal) = match (cert.pubkey(), cert.tal()) {
            (Some(pubkey), Some(tal)) => (pubkey, tal),
            _ => {
                warn!("BGPsec router certificate without key or TAL");
                return
            }
        };

        for entry in cert.asns().iter() {
            match *entry {
                AsEntry::Id(id) => {
                    self.insert(id, cert, pubkey, tal);
                }
                AsEntry::Range(range) => {
                    let count = u64::from(
                        range.max().into_u32() - range.min().into_u32()
                    ) + 1;
                    if count > MAX_RANGE_EXPANSION {
                        warn!(
                            "AS range {}--{} too large for router key \
                             expansion",
                            range.min(), range.max()
                        );
                        continue
                    }
                    let min = range.min().into_u32();
                    let max = range.max().into_u32();
                    for asid in min..=max {
                        self.insert(
                            Asn::from_u32(asid), cert, pubkey, tal
                        );
                    }
                }
                AsEntry::Inherit => {
                    warn!("invalid AS identifier type");
                }
            }
        }
    }

    fn insert(&mut self, asid: Asn, cert: &Cert, pubkey: &str, tal: &str) {
        let key = (asid, *cert.ski(), pubkey.to_owned());
        match self.brks.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert((cert.expires(), tal.to_owned()));
            }
            Entry::Occupied(mut entry) => {
                if entry.get().0 < cert.expires() {
                    *entry.get_mut() = (cert.expires(), tal.to_owned());
                }
            }
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use crate::resources::AsRange;
    use crate::validate::{valid_cert, valid_ta, Auth, AuthTree};
    use super::*;

    fn ki(marker: u8) -> KeyIdentifier {
        KeyIdentifier::try_from([marker; 20].as_ref()).unwrap()
    }

    /// Builds a tree holding a trust anchor with a wide AS allocation.
    fn tree_with_ta(tal: &str) -> AuthTree {
        let mut tree = AuthTree::new();
        let mut ta = Cert::new(
            ki(9), CertPurpose::Ca, Time::utc(2040, 1, 1, 0, 0, 0)
        );
        ta.asns_mut().push(AsEntry::Range(AsRange::new(
            Asn::from_u32(1), Asn::from_u32(1 << 21)
        ))).unwrap();
        assert!(valid_ta("ta.cer", &tree, &mut ta, tal));
        tree.insert(Auth::new(ta, None, "ta.cer".into())).unwrap();
        tree
    }

    /// Builds a router certificate and validates it against the tree so
    /// it picks up the tree's trust anchor identity.
    fn validated_router_cert(
        tree: &AuthTree, expires: Time, entries: &[AsEntry],
    ) -> Cert {
        let mut cert = Cert::new(
            ki(1), CertPurpose::BgpsecRouter, expires
        );
        cert.set_aki(Some(ki(9)));
        cert.set_pubkey(Some("a2V5".into()));
        for entry in entries {
            cert.asns_mut().push(*entry).unwrap();
        }
        assert!(valid_cert("router.cer", tree, &mut cert));
        cert
    }

    #[test]
    fn expand_ids_and_ranges() {
        let tree = tree_with_ta("example");
        let cert = validated_router_cert(
            &tree, Time::utc(2030, 1, 1, 0, 0, 0),
            &[
                AsEntry::Id(Asn::from_u32(64500)),
                AsEntry::Range(AsRange::new(
                    Asn::from_u32(64502), Asn::from_u32(64504)
                )),
            ],
        );

        let mut brks = BrkTree::new();
        brks.insert_cert(&cert);
        assert_eq!(brks.len(), 4);
        let asids: Vec<u32> = brks.iter()
            .map(|brk| brk.asid().into_u32()).collect();
        assert_eq!(asids, [64500, 64502, 64503, 64504]);
        for brk in brks.iter() {
            assert_eq!(brk.pubkey(), "a2V5");
            assert_eq!(brk.tal(), "example");
            assert_eq!(brk.ski(), &ki(1));
        }
    }

    #[test]
    fn later_expiry_wins() {
        let early = Time::utc(2030, 1, 1, 0, 0, 0);
        let late = Time::utc(2031, 1, 1, 0, 0, 0);
        let entries = [AsEntry::Id(Asn::from_u32(64500))];

        // The same router key can surface under two trust anchors.
        let first = validated_router_cert(
            &tree_with_ta("example"), early, &entries
        );
        let second = validated_router_cert(
            &tree_with_ta("other"), late, &entries
        );

        let mut brks = BrkTree::new();
        brks.insert_cert(&first);
        brks.insert_cert(&second);
        assert_eq!(brks.len(), 1);
        let brk = brks.iter().next().unwrap();
        assert_eq!(brk.expires(), late);
        assert_eq!(brk.tal(), "other");

        // Inserting the earlier certificate again changes nothing.
        brks.insert_cert(&first);
        let brk = brks.iter().next().unwrap();
        assert_eq!(brk.expires(), late);
        assert_eq!(brk.tal(), "other");
    }

    #[test]
    fn oversized_range_skipped() {
        let tree = tree_with_ta("example");
        let cert = validated_router_cert(
            &tree, Time::utc(2030, 1, 1, 0, 0, 0),
            &[
                AsEntry::Range(AsRange::new(
                    Asn::from_u32(1), Asn::from_u32(1 << 20)
                )),
                AsEntry::Id(Asn::from_u32(64500 + (1 << 20))),
            ],
        );
        let mut brks = BrkTree::new();
        brks.insert_cert(&cert);
        assert_eq!(brks.len(), 1);
    }

    #[test]
    fn missing_key_or_tal_is_a_noop() {
        // A certificate that never went through validation carries
        // neither a key nor a trust anchor identity.
        let mut cert = Cert::new(
            ki(1), CertPurpose::BgpsecRouter, Time::utc(2030, 1, 1, 0, 0, 0)
        );
        cert.asns_mut().push(
            AsEntry::Id(Asn::from_u32(64500))
        ).unwrap();
        let mut brks = BrkTree::new();
        brks.insert_cert(&cert);
        assert!(brks.is_empty());
    }
}
