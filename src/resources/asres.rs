//! Autonomous System identifier resources of RPKI certificates.
//!
//! The types herein are defined in RFC 3779 for use with certificates in
//! general. RFC 6487 specifies how to use them with RPKI certificates. In
//! particular, RDI values are not used in RPKI and are skipped over.
//!
//! A certificate collects its AS resources into an [`AsResources`] value.
//! Appending an entry enforces the structural invariants of RFC 3779
//! section 3.3: no overlapping identifiers and at most one inheritance
//! marker.

use std::fmt;
use std::str::FromStr;
use bcder::{decode, Tag};
use bcder::decode::{ContentError, DecodeError};
use super::Coverage;


//------------ Asn -----------------------------------------------------------

/// An AS number (ASN).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Asn(u32);

impl Asn {
    /// Creates an AS number from a `u32`.
    pub fn from_u32(value: u32) -> Self {
        Asn(value)
    }

    /// Converts an AS number into a `u32`.
    pub fn into_u32(self) -> u32 {
        self.0
    }

    /// Takes an AS number from the beginning of an encoded value.
    ///
    /// An INTEGER that does not fit into 32 bits is a malformed AS
    /// identifier per RFC 1930.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_u32().map(Asn)
    }

    /// Parses the content of an AS number value.
    pub fn parse_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        content.to_u32().map(Asn)
    }
}


//--- From and FromStr

impl From<u32> for Asn {
    fn from(id: u32) -> Self {
        Asn(id)
    }
}

impl From<Asn> for u32 {
    fn from(id: Asn) -> Self {
        id.0
    }
}

impl FromStr for Asn {
    type Err = ParseAsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = if s.len() > 2 && s[..2].eq_ignore_ascii_case("as") {
            &s[2..]
        } else {
            s
        };
        u32::from_str(s).map(Asn).map_err(|_| ParseAsnError)
    }
}


//--- Display

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}


//------------ ParseAsnError -------------------------------------------------

/// A string did not contain a valid AS number.
#[derive(Clone, Copy, Debug)]
pub struct ParseAsnError;

impl fmt::Display for ParseAsnError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid AS number")
    }
}

impl std::error::Error for ParseAsnError { }


//------------ AsRange -------------------------------------------------------

/// An inclusive range of AS numbers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AsRange {
    /// The smallest AS number that is part of the range.
    min: Asn,

    /// The largest AS number that is part of the range.
    max: Asn,
}

impl AsRange {
    /// Creates a new range from the smallest and largest number.
    pub fn new(min: Asn, max: Asn) -> Self {
        AsRange { min, max }
    }

    /// Returns the smallest AS number that is part of this range.
    pub fn min(self) -> Asn {
        self.min
    }

    /// Returns the largest AS number that is still part of this range.
    pub fn max(self) -> Asn {
        self.max
    }
}


//------------ AsEntry -------------------------------------------------------

/// One AS resource entry of a certificate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AsEntry {
    /// A single AS number.
    Id(Asn),

    /// A range of AS numbers.
    Range(AsRange),

    /// The AS resources are inherited from the issuer.
    Inherit,
}

impl AsEntry {
    /// Returns whether the entry is an inheritance marker.
    pub fn is_inherit(&self) -> bool {
        matches!(self, AsEntry::Inherit)
    }

    /// Returns the smallest covered AS number, if any.
    pub fn min(&self) -> Option<Asn> {
        match *self {
            AsEntry::Id(id) => Some(id),
            AsEntry::Range(range) => Some(range.min()),
            AsEntry::Inherit => None,
        }
    }

    /// Returns the largest covered AS number, if any.
    pub fn max(&self) -> Option<Asn> {
        match *self {
            AsEntry::Id(id) => Some(id),
            AsEntry::Range(range) => Some(range.max()),
            AsEntry::Inherit => None,
        }
    }
}


//------------ AsResources ---------------------------------------------------

/// The accumulated AS resources of a certificate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AsResources {
    entries: Vec<AsEntry>,
}

impl AsResources {
    /// Creates an empty set of resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, enforcing the RFC 3779 structural invariants.
    ///
    /// A second inheritance marker and any overlap with a previously
    /// appended entry are rejected.
    pub fn push(&mut self, entry: AsEntry) -> Result<(), ContentError> {
        if entry.is_inherit() {
            if self.entries.iter().any(AsEntry::is_inherit) {
                return Err(ContentError::from_static(
                    "RFC 3779 section 3.2.3.3: multiple inheritance"
                ))
            }
        }
        else if let (Some(min), Some(max)) = (entry.min(), entry.max()) {
            if self.entries.iter().any(|item| {
                match (item.min(), item.max()) {
                    (Some(imin), Some(imax)) => imin <= max && min <= imax,
                    _ => false,
                }
            }) {
                return Err(ContentError::from_static(
                    "RFC 3779 section 3.2.3.4: overlapping AS identifiers"
                ))
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &AsEntry> + '_ {
        self.entries.iter()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether any entry is an inheritance marker.
    pub fn has_inherit(&self) -> bool {
        self.entries.iter().any(AsEntry::is_inherit)
    }

    /// Tests whether this set covers the AS numbers `min..=max`.
    ///
    /// Returns [`Coverage::Indeterminate`] if the set holds no concrete
    /// entries, so the caller can consult the next certificate up the
    /// chain.
    pub fn coverage(&self, min: Asn, max: Asn) -> Coverage {
        let mut concrete = false;
        for item in &self.entries {
            if let (Some(imin), Some(imax)) = (item.min(), item.max()) {
                concrete = true;
                if imin <= min && imax >= max {
                    return Coverage::Covered
                }
            }
        }
        if concrete {
            Coverage::Refused
        }
        else {
            Coverage::Indeterminate
        }
    }
}

/// # Decoding
///
impl AsResources {
    /// Takes the content of an AS resources extension.
    ///
    /// ```text
    /// ASIdentifiers       ::= SEQUENCE {
    ///     asnum               [0] EXPLICIT ASIdentifierChoice OPTIONAL,
    ///     rdi                 [1] EXPLICIT ASIdentifierChoice OPTIONAL }
    ///
    /// ASIdentifierChoice  ::= CHOICE {
    ///     inherit              NULL,
    ///     asIdsOrRanges        SEQUENCE OF ASIdOrRange }
    ///
    /// ASIdOrRange         ::= CHOICE {
    ///     id                   ASId,
    ///     range                ASRange }
    ///
    /// ASRange             ::= SEQUENCE {
    ///     min                  ASId,
    ///     max                  ASId }
    /// ```
    ///
    /// The `rdi` element is not used in RPKI and skipped without
    /// inspection.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut res = AsResources::new();
        cons.take_sequence(|cons| {
            cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                Self::take_choice(cons, &mut res)
            })?;
            cons.take_opt_constructed_if(Tag::CTX_1, |cons| {
                cons.skip_all()
            })?;
            Ok(())
        })?;
        Ok(res)
    }

    /// Takes one `ASIdentifierChoice` and appends its entries.
    fn take_choice<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        res: &mut Self,
    ) -> Result<(), DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            if tag == Tag::NULL {
                content.to_null()?;
                res.push(AsEntry::Inherit).map_err(|err| {
                    content.content_err(err)
                })
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                while let Some(()) = cons.take_opt_value(|tag, content| {
                    if tag == Tag::INTEGER {
                        let id = Asn::parse_content(content)?;
                        if id.into_u32() == 0 {
                            return Err(content.content_err(
                                "RFC 3779 section 3.2.3.10: \
                                 AS identifier zero is reserved"
                            ))
                        }
                        res.push(AsEntry::Id(id)).map_err(|err| {
                            content.content_err(err)
                        })
                    }
                    else if tag == Tag::SEQUENCE {
                        let range = Self::take_range(content)?;
                        res.push(AsEntry::Range(range)).map_err(|err| {
                            content.content_err(err)
                        })
                    }
                    else {
                        Err(content.content_err(
                            "RFC 3779 section 3.2.3.5: invalid ASIdOrRange"
                        ))
                    }
                })? { }
                Ok(())
            }
            else {
                Err(content.content_err(
                    "RFC 3779 section 3.2.3.2: invalid ASIdentifierChoice"
                ))
            }
        })
    }

    /// Parses an `ASRange` from the content of its sequence.
    fn take_range<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<AsRange, DecodeError<S::Error>> {
        let cons = content.as_constructed()?;
        let min = Asn::take_from(cons)?;
        let max = Asn::take_from(cons)?;
        if max == min {
            return Err(cons.content_err(
                "RFC 3779 section 3.2.3.8: ASRange is singular"
            ))
        }
        if max < min {
            return Err(cons.content_err(
                "RFC 3779 section 3.2.3.8: ASRange is out of order"
            ))
        }
        Ok(AsRange::new(min, max))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::Mode;
    use super::*;

    fn decode_identifiers(der: &[u8]) -> Result<AsResources, String> {
        Mode::Der.decode(der, AsResources::take_from)
            .map_err(|err| err.to_string())
    }

    #[test]
    fn decode_id_and_range() {
        // asnum with AS64500 and the range AS64502 to AS64510.
        let res = decode_identifiers(
            b"\x30\x15\xa0\x13\x30\x11\x02\x03\x00\xfb\xf4\
              \x30\x0a\x02\x03\x00\xfb\xf6\x02\x03\x00\xfb\xfe"
        ).unwrap();
        assert_eq!(res.len(), 2);
        let mut iter = res.iter();
        assert_eq!(iter.next(), Some(&AsEntry::Id(Asn::from_u32(64500))));
        assert_eq!(
            iter.next(),
            Some(&AsEntry::Range(AsRange::new(
                Asn::from_u32(64502), Asn::from_u32(64510)
            )))
        );
    }

    #[test]
    fn decode_inherit() {
        let res = decode_identifiers(b"\x30\x04\xa0\x02\x05\x00").unwrap();
        assert_eq!(res.len(), 1);
        assert!(res.has_inherit());
    }

    #[test]
    fn decode_skips_rdi() {
        // Empty asnum list plus an rdi element carrying inherit.
        let res = decode_identifiers(
            b"\x30\x08\xa0\x02\x30\x00\xa1\x02\x05\x00"
        ).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn decode_rejects_as_zero() {
        assert!(decode_identifiers(
            b"\x30\x07\xa0\x05\x30\x03\x02\x01\x00"
        ).is_err());
    }

    #[test]
    fn decode_rejects_singular_range() {
        assert!(decode_identifiers(
            b"\x30\x0c\xa0\x0a\x30\x08\x30\x06\x02\x01\x05\x02\x01\x05"
        ).is_err());
    }

    #[test]
    fn decode_rejects_reversed_range() {
        assert!(decode_identifiers(
            b"\x30\x0c\xa0\x0a\x30\x08\x30\x06\x02\x01\x07\x02\x01\x05"
        ).is_err());
    }

    #[test]
    fn push_rejects_overlap() {
        let mut res = AsResources::new();
        res.push(AsEntry::Range(AsRange::new(
            Asn::from_u32(64500), Asn::from_u32(64510)
        ))).unwrap();
        assert!(res.push(AsEntry::Id(Asn::from_u32(64505))).is_err());
        res.push(AsEntry::Id(Asn::from_u32(64511))).unwrap();
    }

    #[test]
    fn push_rejects_second_inherit() {
        let mut res = AsResources::new();
        res.push(AsEntry::Inherit).unwrap();
        assert!(res.push(AsEntry::Inherit).is_err());
    }

    #[test]
    fn coverage_three_valued() {
        let mut res = AsResources::new();
        res.push(AsEntry::Range(AsRange::new(
            Asn::from_u32(64500), Asn::from_u32(64510)
        ))).unwrap();
        assert_eq!(
            res.coverage(Asn::from_u32(64500), Asn::from_u32(64505)),
            Coverage::Covered
        );
        assert_eq!(
            res.coverage(Asn::from_u32(64505), Asn::from_u32(64511)),
            Coverage::Refused
        );
        assert_eq!(
            AsResources::new().coverage(
                Asn::from_u32(64500), Asn::from_u32(64500)
            ),
            Coverage::Indeterminate
        );

        let mut inherit = AsResources::new();
        inherit.push(AsEntry::Inherit).unwrap();
        assert_eq!(
            inherit.coverage(Asn::from_u32(64500), Asn::from_u32(64500)),
            Coverage::Indeterminate
        );
    }

    #[test]
    fn asn_from_str() {
        assert_eq!(Asn::from_str("64500").unwrap(), Asn::from_u32(64500));
        assert_eq!(Asn::from_str("AS64500").unwrap(), Asn::from_u32(64500));
        assert!(Asn::from_str("ASX").is_err());
    }
}
