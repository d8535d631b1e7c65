//! Route Origin Authorization records.
//!
//! ROAs are CMS signed objects; decoding them is the job of a separate
//! parser outside this crate. What arrives here is the already extracted
//! payload: the key identifiers of the end-entity certificate, the origin
//! AS, and the authorized prefixes. The coverage validator consumes this
//! record and, on success, stamps it with the trust anchor it chains up
//! to.

use std::fmt;
use crate::crypto::KeyIdentifier;
use crate::resources::{AddressFamily, Addr, Asn, Prefix};
use crate::x509::Time;


//------------ RoaPrefix -----------------------------------------------------

/// One address prefix authorized by a ROA.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RoaPrefix {
    afi: AddressFamily,
    prefix: Prefix,

    /// The maximum length of more specific announcements, if the ROA
    /// allows any.
    max_length: Option<u8>,
}

impl RoaPrefix {
    pub fn new(
        afi: AddressFamily, prefix: Prefix, max_length: Option<u8>
    ) -> Self {
        RoaPrefix { afi, prefix, max_length }
    }

    pub fn afi(&self) -> AddressFamily {
        self.afi
    }

    pub fn prefix(&self) -> Prefix {
        self.prefix
    }

    pub fn max_length(&self) -> Option<u8> {
        self.max_length
    }

    /// The smallest address covered by the prefix.
    pub fn min(&self) -> Addr {
        self.prefix.min()
    }

    /// The largest address covered by the prefix.
    pub fn max(&self) -> Addr {
        self.prefix.max()
    }

    /// Returns an object displaying the prefix.
    pub fn display(&self) -> DisplayRoaPrefix {
        DisplayRoaPrefix(*self)
    }
}


//------------ DisplayRoaPrefix ----------------------------------------------

/// Helper type displaying a ROA prefix according to its address family.
pub struct DisplayRoaPrefix(RoaPrefix);

impl fmt::Display for DisplayRoaPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.afi {
            AddressFamily::Ipv4 => self.0.prefix.fmt_v4(f),
            AddressFamily::Ipv6 => self.0.prefix.fmt_v6(f),
        }
    }
}


//------------ Roa -----------------------------------------------------------

/// The payload of a Route Origin Authorization.
#[derive(Clone, Debug)]
pub struct Roa {
    /// The subject key identifier of the embedded EE certificate.
    ski: KeyIdentifier,

    /// The authority key identifier of the embedded EE certificate.
    aki: KeyIdentifier,

    /// The AS number authorized to originate the prefixes.
    asid: Asn,

    /// The authorized prefixes.
    prefixes: Vec<RoaPrefix>,

    /// The end of the validity period of the EE certificate.
    expires: Time,

    /// The trust anchor this ROA chains up to. Stamped by the validator.
    tal: Option<String>,
}

impl Roa {
    pub fn new(
        ski: KeyIdentifier, aki: KeyIdentifier, asid: Asn, expires: Time,
    ) -> Self {
        Roa {
            ski, aki, asid,
            prefixes: Vec::new(),
            expires,
            tal: None,
        }
    }

    pub fn push_prefix(&mut self, prefix: RoaPrefix) {
        self.prefixes.push(prefix)
    }

    pub fn ski(&self) -> &KeyIdentifier {
        &self.ski
    }

    pub fn aki(&self) -> &KeyIdentifier {
        &self.aki
    }

    pub fn asid(&self) -> Asn {
        self.asid
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &RoaPrefix> + '_ {
        self.prefixes.iter()
    }

    pub fn expires(&self) -> Time {
        self.expires
    }

    pub fn tal(&self) -> Option<&str> {
        self.tal.as_deref()
    }

    /// Stamps the trust anchor identity onto the ROA.
    ///
    /// Called by the validator once the chain has been verified.
    pub fn set_tal(&mut self, tal: String) {
        self.tal = Some(tal)
    }
}
