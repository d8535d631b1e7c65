//! IP address resources of RPKI certificates.
//!
//! The types herein are defined in RFC 3779 for use with certificates in
//! general. RFC 6487 specifies how to use them with RPKI certificates. In
//! particular, it prohibits the use of Subsequent AFI values for address
//! families, making them always 16 bit.
//!
//! A certificate collects its IP resources into an [`IpResources`] value,
//! one flat list of entries across both address families. Appending an
//! entry enforces the structural invariants of RFC 3779 section 2.2.3.6:
//! at most one inheritance marker per address family and no overlapping
//! address blocks. The ordering constraints of the RFC are deliberately
//! not enforced since validation works the same either way.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use bcder::{decode, BitString, OctetString, Tag};
use bcder::decode::{ContentError, DecodeError};
use super::Coverage;


//------------ AddressFamily -------------------------------------------------

/// The address family of an IP resources value.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddressFamily {
    /// IPv4, encoded as the two octet string `0x00 0x01`.
    Ipv4,

    /// IPv6, encoded as the two octet string `0x00 0x02`.
    Ipv6,
}

impl AddressFamily {
    /// Takes a single address family from the beginning of a value.
    ///
    /// A SAFI octet is not allowed in RPKI certificates and is treated as
    /// a malformed value.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let string = OctetString::take_from(cons)?;
        let mut octets = string.octets();
        let (first, second) = match (octets.next(), octets.next()) {
            (Some(first), Some(second)) => (first, second),
            _ => {
                return Err(cons.content_err(
                    "RFC 3779 section 2.2.3.3: invalid addressFamily"
                ))
            }
        };
        if octets.next().is_some() {
            return Err(cons.content_err(
                "RFC 3779 section 2.2.3.3: invalid addressFamily"
            ))
        }
        match (first, second) {
            (0, 1) => Ok(AddressFamily::Ipv4),
            (0, 2) => Ok(AddressFamily::Ipv6),
            _ => {
                Err(cons.content_err(
                    "RFC 3779 section 2.2.3.3: invalid addressFamily"
                ))
            }
        }
    }

    /// Returns the maximum prefix length for this family.
    pub fn max_addr_len(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}


//------------ Addr ----------------------------------------------------------

/// An address.
///
/// This can be both an IPv4 and IPv6 address. It keeps the address
/// internally as a 128 bit unsigned integer. IPv6 addresses are kept in
/// there in host byte order while IPv4 addresses are kept in the upper
/// four bytes. This makes it possible to count prefix lengths the same way
/// for both families, starting from the top of the raw integer, and makes
/// the ordering of `Addr` values the byte-wise ordering of the padded
/// address bytes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Addr(u128);

impl Addr {
    /// Creates a new address from 128 raw bits in host byte order.
    pub fn from_bits(bits: u128) -> Self {
        Addr(bits)
    }

    /// Creates a new address value for an IPv4 address.
    pub fn from_v4(addr: Ipv4Addr) -> Self {
        Addr::from_bits(u128::from(u32::from(addr)) << 96)
    }

    /// Creates a new address value for an IPv6 address.
    pub fn from_v6(addr: Ipv6Addr) -> Self {
        Addr::from_bits(u128::from(addr))
    }

    /// Returns the raw bits of the underlying integer.
    pub fn to_bits(self) -> u128 {
        self.0
    }

    /// Converts the address value into an IPv4 address.
    ///
    /// The method disregards the lower twelve bytes of the value.
    pub fn to_v4(self) -> Ipv4Addr {
        ((self.0 >> 96) as u32).into()
    }

    /// Converts the address value into an IPv6 address.
    pub fn to_v6(self) -> Ipv6Addr {
        self.0.into()
    }

    /// Returns a byte array for the address.
    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Creates an address from a byte array.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Addr(u128::from_be_bytes(bytes))
    }

    /// Returns an address with all but the first `prefix_len` bits cleared.
    pub fn to_min(self, prefix_len: u8) -> Self {
        if prefix_len >= 128 {
            self
        }
        else {
            Addr(self.0 & !(!0 >> u32::from(prefix_len)))
        }
    }

    /// Returns an address with all but the first `prefix_len` bits set.
    pub fn to_max(self, prefix_len: u8) -> Self {
        if prefix_len >= 128 {
            self
        }
        else {
            Addr(self.0 | (!0 >> u32::from(prefix_len)))
        }
    }

    /// Formats the address as an IPv4 address.
    pub fn fmt_v4(self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.to_v4(), f)
    }

    /// Formats the address as an IPv6 address.
    pub fn fmt_v6(self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.to_v6(), f)
    }

    /// Formats the address according to the given family.
    pub fn fmt_family(
        self, family: AddressFamily, f: &mut fmt::Formatter
    ) -> fmt::Result {
        match family {
            AddressFamily::Ipv4 => self.fmt_v4(f),
            AddressFamily::Ipv6 => self.fmt_v6(f),
        }
    }
}


//--- From

impl From<Ipv4Addr> for Addr {
    fn from(addr: Ipv4Addr) -> Addr {
        Addr::from_v4(addr)
    }
}

impl From<Ipv6Addr> for Addr {
    fn from(addr: Ipv6Addr) -> Addr {
        Addr::from_v6(addr)
    }
}

impl From<IpAddr> for Addr {
    fn from(addr: IpAddr) -> Addr {
        match addr {
            IpAddr::V4(addr) => Addr::from_v4(addr),
            IpAddr::V6(addr) => Addr::from_v6(addr),
        }
    }
}


//------------ Prefix --------------------------------------------------------

/// An IP address prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Prefix {
    /// The address of the prefix with all unused bits cleared.
    addr: Addr,

    /// The length of the prefix. Never more than 128.
    len: u8,
}

impl Prefix {
    /// Creates a new prefix from an address and a length.
    ///
    /// # Panics
    ///
    /// The function panics if `len` is larger than 128.
    pub fn new<A: Into<Addr>>(addr: A, len: u8) -> Self {
        assert!(len <= 128);
        Prefix {
            addr: addr.into().to_min(len),
            len,
        }
    }

    /// Creates a new prefix from its encoding as a BIT STRING.
    ///
    /// RFC 3779 section 2.2.3.8: a prefix is encoded in a bit string whose
    /// length of significant bits is the prefix length.
    pub fn from_bit_string(src: &BitString) -> Result<Self, ContentError> {
        if src.octet_len() > 16 {
            return Err(ContentError::from_static(
                "RFC 3779 section 2.2.3.8: invalid IPAddress"
            ))
        }
        let mut addr: u128 = 0;
        for octet in src.octets() {
            addr = (addr << 8) | u128::from(octet);
        }
        for _ in src.octet_len()..16 {
            addr <<= 8;
        }
        Ok(Self::new(Addr::from_bits(addr), src.bit_len() as u8))
    }

    /// Returns the raw address of the prefix.
    pub fn addr(self) -> Addr {
        self.addr
    }

    /// Returns the length of the prefix.
    pub fn addr_len(self) -> u8 {
        self.len
    }

    /// Returns the smallest address covered by the prefix.
    pub fn min(self) -> Addr {
        self.addr
    }

    /// Returns the largest address covered by the prefix.
    pub fn max(self) -> Addr {
        self.addr.to_max(self.len)
    }

    /// Formats the prefix as an IPv4 prefix.
    pub fn fmt_v4(self, f: &mut fmt::Formatter) -> fmt::Result {
        self.addr.fmt_v4(f)?;
        write!(f, "/{}", self.len)
    }

    /// Formats the prefix as an IPv6 prefix.
    pub fn fmt_v6(self, f: &mut fmt::Formatter) -> fmt::Result {
        self.addr.fmt_v6(f)?;
        write!(f, "/{}", self.len)
    }
}


//--- FromStr

impl FromStr for Prefix {
    type Err = ParsePrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = s.find('/').ok_or(ParsePrefixError)?;
        let addr = IpAddr::from_str(&s[..sep]).map_err(|_| ParsePrefixError)?;
        let len = u8::from_str(&s[sep + 1..]).map_err(|_| ParsePrefixError)?;
        let max_len = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if len > max_len {
            return Err(ParsePrefixError)
        }
        Ok(Prefix::new(addr, len))
    }
}


//------------ ParsePrefixError ----------------------------------------------

/// A string did not contain a valid prefix.
#[derive(Clone, Copy, Debug)]
pub struct ParsePrefixError;

impl fmt::Display for ParsePrefixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid IP address prefix")
    }
}

impl std::error::Error for ParsePrefixError { }


//------------ AddressRange --------------------------------------------------

/// An inclusive range of addresses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AddressRange {
    /// The smallest address of the range.
    min: Addr,

    /// The largest address of the range.
    max: Addr,
}

impl AddressRange {
    /// Creates a new range from the smallest and largest address.
    pub fn new(min: Addr, max: Addr) -> Self {
        AddressRange { min, max }
    }

    /// Returns the smallest address of the range.
    pub fn min(self) -> Addr {
        self.min
    }

    /// Returns the largest address of the range.
    pub fn max(self) -> Addr {
        self.max
    }
}


//------------ IpChoice ------------------------------------------------------

/// The payload of one IP resource entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IpChoice {
    /// An address prefix.
    Addr(Prefix),

    /// An explicit address range.
    Range(AddressRange),

    /// The resources of this family are inherited from the issuer.
    Inherit,
}


//------------ IpEntry -------------------------------------------------------

/// One IP resource entry of a certificate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IpEntry {
    afi: AddressFamily,
    choice: IpChoice,
}

impl IpEntry {
    /// Creates a prefix entry.
    pub fn addr(afi: AddressFamily, prefix: Prefix) -> Self {
        IpEntry { afi, choice: IpChoice::Addr(prefix) }
    }

    /// Creates a range entry.
    pub fn range(afi: AddressFamily, range: AddressRange) -> Self {
        IpEntry { afi, choice: IpChoice::Range(range) }
    }

    /// Creates an inheritance entry.
    pub fn inherit(afi: AddressFamily) -> Self {
        IpEntry { afi, choice: IpChoice::Inherit }
    }

    /// Returns the address family of the entry.
    pub fn afi(&self) -> AddressFamily {
        self.afi
    }

    /// Returns the payload of the entry.
    pub fn choice(&self) -> &IpChoice {
        &self.choice
    }

    /// Returns whether the entry is an inheritance marker.
    pub fn is_inherit(&self) -> bool {
        matches!(self.choice, IpChoice::Inherit)
    }

    /// Returns the smallest covered address, if any.
    pub fn min(&self) -> Option<Addr> {
        match self.choice {
            IpChoice::Addr(prefix) => Some(prefix.min()),
            IpChoice::Range(range) => Some(range.min()),
            IpChoice::Inherit => None,
        }
    }

    /// Returns the largest covered address, if any.
    pub fn max(&self) -> Option<Addr> {
        match self.choice {
            IpChoice::Addr(prefix) => Some(prefix.max()),
            IpChoice::Range(range) => Some(range.max()),
            IpChoice::Inherit => None,
        }
    }

    /// Returns an object displaying the entry.
    ///
    /// Concrete entries are shown as `min--max`, inheritance markers as
    /// `(inherit)`.
    pub fn display(&self) -> DisplayIpEntry {
        DisplayIpEntry(*self)
    }
}


//------------ DisplayIpEntry ------------------------------------------------

/// Helper type displaying an IP entry according to its address family.
pub struct DisplayIpEntry(IpEntry);

impl fmt::Display for DisplayIpEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.0.min(), self.0.max()) {
            (Some(min), Some(max)) => {
                min.fmt_family(self.0.afi, f)?;
                f.write_str("--")?;
                max.fmt_family(self.0.afi, f)
            }
            _ => f.write_str("(inherit)"),
        }
    }
}


//------------ IpResources ---------------------------------------------------

/// The accumulated IP resources of a certificate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IpResources {
    entries: Vec<IpEntry>,
}

impl IpResources {
    /// Creates an empty set of resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, enforcing the RFC 3779 structural invariants.
    ///
    /// An entry is rejected if it is a second inheritance marker for its
    /// address family, or if it overlaps a previously appended address
    /// block of the same family. Coalescing ranges are only warned against
    /// by the RFC and accepted here.
    pub fn push(&mut self, entry: IpEntry) -> Result<(), ContentError> {
        if entry.is_inherit() {
            if self.entries.iter().any(|item| {
                item.afi == entry.afi && item.is_inherit()
            }) {
                return Err(ContentError::from_static(
                    "RFC 3779 section 2.2.3.5: multiple inheritance"
                ))
            }
        }
        else if let (Some(min), Some(max)) = (entry.min(), entry.max()) {
            if self.entries.iter().any(|item| {
                item.afi == entry.afi && match (item.min(), item.max()) {
                    (Some(imin), Some(imax)) => imin <= max && min <= imax,
                    _ => false,
                }
            }) {
                return Err(ContentError::from_static(
                    "RFC 3779 section 2.2.3.6: overlapping IP addresses"
                ))
            }
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &IpEntry> + '_ {
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
        self.entries.iter().any(IpEntry::is_inherit)
    }

    /// Returns whether the set holds concrete entries for a family.
    pub fn has_concrete(&self, afi: AddressFamily) -> bool {
        self.entries.iter().any(|item| {
            item.afi == afi && !item.is_inherit()
        })
    }

    /// Tests whether this set covers the range `min..=max` in `afi`.
    ///
    /// Returns [`Coverage::Indeterminate`] if the set holds no concrete
    /// entries for the family, so the caller can consult the next
    /// certificate up the chain.
    pub fn coverage(
        &self, afi: AddressFamily, min: Addr, max: Addr
    ) -> Coverage {
        let mut concrete = false;
        for item in &self.entries {
            if item.afi != afi {
                continue
            }
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
impl IpResources {
    /// Takes the content of an IP address blocks extension.
    ///
    /// ```text
    /// IPAddrBlocks        ::= SEQUENCE OF IPAddressFamily
    ///
    /// IPAddressFamily     ::= SEQUENCE {
    ///     addressFamily        OCTET STRING (SIZE (2..3)),
    ///     ipAddressChoice      IPAddressChoice }
    ///
    /// IPAddressChoice     ::= CHOICE {
    ///     inherit              NULL,
    ///     addressesOrRanges    SEQUENCE OF IPAddressOrRange }
    ///
    /// IPAddressOrRange    ::= CHOICE {
    ///     addressPrefix        IPAddress,
    ///     addressRange         IPAddressRange }
    ///
    /// IPAddressRange      ::= SEQUENCE {
    ///     min                  IPAddress,
    ///     max                  IPAddress }
    /// ```
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut res = IpResources::new();
        cons.take_sequence(|cons| {
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let afi = AddressFamily::take_from(cons)?;
                Self::take_choice(cons, afi, &mut res)
            })? { }
            Ok(())
        })?;
        Ok(res)
    }

    /// Takes one `IPAddressChoice` and appends its entries.
    fn take_choice<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        afi: AddressFamily,
        res: &mut Self,
    ) -> Result<(), DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            if tag == Tag::NULL {
                content.to_null()?;
                res.push(IpEntry::inherit(afi)).map_err(|err| {
                    content.content_err(err)
                })
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                while let Some(()) = cons.take_opt_value(|tag, content| {
                    if tag == Tag::BIT_STRING {
                        let bits = BitString::from_content(content)?;
                        let prefix = Prefix::from_bit_string(&bits)
                            .map_err(|err| content.content_err(err))?;
                        if prefix.addr_len() > afi.max_addr_len() {
                            return Err(content.content_err(
                                "RFC 3779 section 2.2.3.8: \
                                 invalid IPAddress"
                            ))
                        }
                        res.push(IpEntry::addr(afi, prefix)).map_err(|err| {
                            content.content_err(err)
                        })
                    }
                    else if tag == Tag::SEQUENCE {
                        let range = Self::take_range(content, afi)?;
                        res.push(IpEntry::range(afi, range)).map_err(|err| {
                            content.content_err(err)
                        })
                    }
                    else {
                        Err(content.content_err(
                            "RFC 3779 section 2.2.3.7: \
                             invalid IPAddressOrRange"
                        ))
                    }
                })? { }
                Ok(())
            }
            else {
                Err(content.content_err(
                    "RFC 3779 section 2.2.3.4: invalid IPAddressChoice"
                ))
            }
        })
    }

    /// Parses an `IPAddressRange` from the content of its sequence.
    ///
    /// The endpoints are prefixes with the unstated bits of `min` taken as
    /// zero and those of `max` taken as one.
    fn take_range<S: decode::Source>(
        content: &mut decode::Content<S>,
        afi: AddressFamily,
    ) -> Result<AddressRange, DecodeError<S::Error>> {
        let cons = content.as_constructed()?;
        let mut endpoint = |max: bool| {
            let bits = BitString::take_from(cons)?;
            let prefix = Prefix::from_bit_string(&bits)
                .map_err(|err| cons.content_err(err))?;
            if prefix.addr_len() > afi.max_addr_len() {
                return Err(cons.content_err(
                    "RFC 3779 section 2.2.3.9: invalid IPAddressRange"
                ))
            }
            Ok(if max { prefix.max() } else { prefix.min() })
        };
        let min = endpoint(false)?;
        let max = endpoint(true)?;
        if min > max {
            return Err(cons.content_err(
                "RFC 3779 section 2.2.3.9: IP address range reversed"
            ))
        }
        Ok(AddressRange::new(min, max))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::Mode;
    use super::*;

    fn v4(s: &str) -> Addr {
        Addr::from(s.parse::<Ipv4Addr>().unwrap())
    }

    fn decode_blocks(der: &[u8]) -> Result<IpResources, String> {
        Mode::Der.decode(der, IpResources::take_from)
            .map_err(|err| err.to_string())
    }

    #[test]
    fn prefix_min_max() {
        let prefix = Prefix::from_str("10.0.0.0/8").unwrap();
        assert_eq!(prefix.min(), v4("10.0.0.0"));
        assert_eq!(prefix.max(), v4("10.255.255.255"));

        let prefix = Prefix::from_str("2001:db8::/32").unwrap();
        assert_eq!(
            prefix.min(),
            Addr::from("2001:db8::".parse::<Ipv6Addr>().unwrap())
        );
        assert_eq!(
            prefix.max(),
            Addr::from(
                "2001:db8:ffff:ffff:ffff:ffff:ffff:ffff"
                    .parse::<Ipv6Addr>().unwrap()
            )
        );
    }

    #[test]
    fn prefix_from_bit_string() {
        // BIT STRING of eight significant bits 0x0a: 10.0.0.0/8.
        let bits = Mode::Der.decode(
            b"\x03\x02\x00\x0a".as_ref(), BitString::take_from
        ).unwrap();
        let prefix = Prefix::from_bit_string(&bits).unwrap();
        assert_eq!(prefix.addr_len(), 8);
        assert_eq!(prefix.min(), v4("10.0.0.0"));
        assert_eq!(prefix.max(), v4("10.255.255.255"));
    }

    #[test]
    fn decode_prefix_block() {
        // IPv4, single prefix 10.0.0.0/8.
        let res = decode_blocks(
            b"\x30\x0c\x30\x0a\x04\x02\x00\x01\
              \x30\x04\x03\x02\x00\x0a"
        ).unwrap();
        assert_eq!(res.len(), 1);
        let entry = res.iter().next().unwrap();
        assert_eq!(entry.afi(), AddressFamily::Ipv4);
        assert_eq!(entry.min(), Some(v4("10.0.0.0")));
        assert_eq!(entry.max(), Some(v4("10.255.255.255")));
    }

    #[test]
    fn decode_range_block() {
        // IPv4, range 10.0.0.0 to 10.1.255.255: min is the bit string of
        // 10.0.0.0/8, max that of 10.0.0.0/15 with trailing ones.
        let res = decode_blocks(
            b"\x30\x13\x30\x11\x04\x02\x00\x01\
              \x30\x0b\x30\x09\x03\x02\x00\x0a\x03\x03\x01\x0a\x00"
        ).unwrap();
        assert_eq!(res.len(), 1);
        let entry = res.iter().next().unwrap();
        assert_eq!(entry.min(), Some(v4("10.0.0.0")));
        assert_eq!(entry.max(), Some(v4("10.1.255.255")));
    }

    #[test]
    fn decode_inherit_block() {
        // IPv6, inherit.
        let res = decode_blocks(
            b"\x30\x08\x30\x06\x04\x02\x00\x02\x05\x00"
        ).unwrap();
        assert_eq!(res.len(), 1);
        let entry = res.iter().next().unwrap();
        assert_eq!(entry.afi(), AddressFamily::Ipv6);
        assert!(entry.is_inherit());
    }

    #[test]
    fn decode_rejects_reversed_range() {
        // Range with min composed from 11/8 and max composed from 10/8,
        // i.e. 11.0.0.0 to 10.255.255.255.
        assert!(decode_blocks(
            b"\x30\x12\x30\x10\x04\x02\x00\x01\
              \x30\x0a\x30\x08\x03\x02\x00\x0b\x03\x02\x00\x0a"
        ).is_err());
    }

    #[test]
    fn decode_rejects_safi_octet() {
        assert!(decode_blocks(
            b"\x30\x09\x30\x07\x04\x03\x00\x01\x00\x05\x00"
        ).is_err());
    }

    #[test]
    fn decode_rejects_overlong_v4_prefix() {
        // 33 significant bits in an IPv4 family.
        assert!(decode_blocks(
            b"\x30\x10\x30\x0e\x04\x02\x00\x01\
              \x30\x08\x03\x06\x07\x0a\x00\x00\x00\x00"
        ).is_err());
    }

    #[test]
    fn push_rejects_overlap() {
        let mut res = IpResources::new();
        res.push(IpEntry::addr(
            AddressFamily::Ipv4, Prefix::from_str("10.0.0.0/8").unwrap()
        )).unwrap();
        assert!(res.push(IpEntry::addr(
            AddressFamily::Ipv4, Prefix::from_str("10.1.0.0/16").unwrap()
        )).is_err());
        // The same block in the other family is fine.
        res.push(IpEntry::addr(
            AddressFamily::Ipv6, Prefix::from_str("::/96").unwrap()
        )).unwrap();
    }

    #[test]
    fn push_rejects_second_inherit_per_family() {
        let mut res = IpResources::new();
        res.push(IpEntry::inherit(AddressFamily::Ipv4)).unwrap();
        assert!(res.push(IpEntry::inherit(AddressFamily::Ipv4)).is_err());
        res.push(IpEntry::inherit(AddressFamily::Ipv6)).unwrap();
    }

    #[test]
    fn coverage_three_valued() {
        let mut res = IpResources::new();
        res.push(IpEntry::addr(
            AddressFamily::Ipv4, Prefix::from_str("10.0.0.0/8").unwrap()
        )).unwrap();
        assert_eq!(
            res.coverage(
                AddressFamily::Ipv4, v4("10.1.0.0"), v4("10.1.255.255")
            ),
            Coverage::Covered
        );
        assert_eq!(
            res.coverage(
                AddressFamily::Ipv4, v4("11.0.0.0"), v4("11.255.255.255")
            ),
            Coverage::Refused
        );
        assert_eq!(
            res.coverage(
                AddressFamily::Ipv6,
                Addr::from_bits(0), Addr::from_bits(0)
            ),
            Coverage::Indeterminate
        );

        let mut inherit = IpResources::new();
        inherit.push(IpEntry::inherit(AddressFamily::Ipv4)).unwrap();
        assert_eq!(
            inherit.coverage(
                AddressFamily::Ipv4, v4("10.0.0.0"), v4("10.0.0.0")
            ),
            Coverage::Indeterminate
        );
    }

    #[test]
    fn display_entry() {
        let entry = IpEntry::addr(
            AddressFamily::Ipv4, Prefix::from_str("11.0.0.0/8").unwrap()
        );
        assert_eq!(
            entry.display().to_string(),
            "11.0.0.0--11.255.255.255"
        );
        assert_eq!(
            IpEntry::inherit(AddressFamily::Ipv4).display().to_string(),
            "(inherit)"
        );
    }
}
