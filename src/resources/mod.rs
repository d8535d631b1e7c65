//! Resources contained in RPKI certificates.
//!
//! Resource certificates carry two kinds of Internet number resources
//! defined in RFC 3779: IP address blocks and AS number blocks. The
//! submodules implement the primitives for both kinds plus the per-entry
//! accumulators a certificate collects them into during parsing.

pub mod asres;
pub mod ipres;

pub use self::asres::{AsEntry, AsRange, AsResources, Asn};
pub use self::ipres::{
    AddressFamily, AddressRange, Addr, IpChoice, IpEntry, IpResources,
    Prefix,
};


//------------ Coverage ------------------------------------------------------

/// The result of testing a resource against one set in an authority chain.
///
/// Chain walking needs three answers, not two: a set can cover the
/// resource, it can refuse it outright, or it can have nothing
/// authoritative to say because it is absent or inherits itself. Only the
/// last answer sends the walk on to the next ancestor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coverage {
    /// The set covers the resource.
    Covered,

    /// The set is present, does not inherit, and does not cover the
    /// resource.
    Refused,

    /// The set has nothing authoritative to say about the resource.
    Indeterminate,
}
