//! URIs for RPKI repository objects.
//!
//! RPKI restricts the URIs it carries in certificates to a small, strictly
//! validated subset: rsync URIs for repository locations and HTTPS URIs for
//! RRDP notification files. This module provides a newtype for each.
//!
//! Validation follows RFC 6487 and RFC 8182 with the conservative reading a
//! relying party has to take against hostile input: only ASCII alphanumeric
//! and punctuation characters are allowed, the scheme must match
//! case-insensitively, and a URI that contains `/.` anywhere is thrown out
//! so it can never point outside the directory it claims to live in.

use std::{fmt, str};
use std::str::FromStr;
use bytes::Bytes;


//------------ Functions -----------------------------------------------------

/// Returns whether `uri` is an acceptable URI under the given scheme.
///
/// If `scheme` is `None`, any scheme is acceptable. The check is on raw
/// bytes so it can run before the URI is ever treated as text.
pub fn is_valid(uri: &[u8], scheme: Option<&str>) -> bool {
    if !uri.iter().all(|ch| {
        ch.is_ascii_alphanumeric() || ch.is_ascii_punctuation()
    }) {
        return false
    }
    if let Some(scheme) = scheme {
        if uri.len() < scheme.len()
            || !uri[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
        {
            return false
        }
    }

    // Neither files nor directories may start with a dot.
    !uri.windows(2).any(|window| window == b"/.")
}


//------------ Rsync ---------------------------------------------------------

/// An rsync URI.
///
/// The URI is kept in its textual form. Two URIs are equal if their text is
/// byte-for-byte identical.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rsync {
    uri: Bytes,
}

impl Rsync {
    /// The scheme prefix of an rsync URI.
    pub const SCHEME: &'static str = "rsync://";

    pub fn from_string(s: String) -> Result<Self, Error> {
        Self::from_bytes(Bytes::from(s))
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    pub fn from_bytes(bytes: Bytes) -> Result<Self, Error> {
        if !is_valid(&bytes, Some(Self::SCHEME)) {
            return Err(Error(()))
        }
        Ok(Rsync { uri: bytes })
    }

    /// Returns the URI as a string slice.
    pub fn as_str(&self) -> &str {
        // Validated to be ASCII-only on construction.
        unsafe { str::from_utf8_unchecked(self.uri.as_ref()) }
    }

    /// Returns the URI as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        self.uri.as_ref()
    }

    /// Returns whether the URI ends in `extension`, ASCII case-insensitively.
    pub fn ends_with(&self, extension: &str) -> bool {
        self.uri.len() >= extension.len()
            && self.uri[self.uri.len() - extension.len()..]
                .eq_ignore_ascii_case(extension.as_bytes())
    }

    /// Returns whether this URI is a byte-wise prefix of `other`.
    pub fn is_prefix_of(&self, other: &Rsync) -> bool {
        other.uri.starts_with(&self.uri)
    }
}


//--- FromStr and TryFrom

impl FromStr for Rsync {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl TryFrom<String> for Rsync {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_string(s)
    }
}


//--- AsRef

impl AsRef<[u8]> for Rsync {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<str> for Rsync {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}


//--- Display

impl fmt::Display for Rsync {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//--- Serialize and Deserialize

#[cfg(feature = "serde")]
impl serde::Serialize for Rsync {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rsync {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        Rsync::from_string(string).map_err(serde::de::Error::custom)
    }
}


//------------ Https ---------------------------------------------------------

/// An HTTPS URI.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Https {
    uri: Bytes,
}

impl Https {
    /// The scheme prefix of an HTTPS URI.
    pub const SCHEME: &'static str = "https://";

    pub fn from_string(s: String) -> Result<Self, Error> {
        Self::from_bytes(Bytes::from(s))
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, Error> {
        Self::from_bytes(Bytes::copy_from_slice(slice))
    }

    pub fn from_bytes(bytes: Bytes) -> Result<Self, Error> {
        if !is_valid(&bytes, Some(Self::SCHEME)) {
            return Err(Error(()))
        }
        Ok(Https { uri: bytes })
    }

    /// Returns the URI as a string slice.
    pub fn as_str(&self) -> &str {
        // Validated to be ASCII-only on construction.
        unsafe { str::from_utf8_unchecked(self.uri.as_ref()) }
    }

    /// Returns the URI as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        self.uri.as_ref()
    }
}


//--- FromStr and TryFrom

impl FromStr for Https {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

impl TryFrom<String> for Https {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_string(s)
    }
}


//--- AsRef

impl AsRef<[u8]> for Https {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<str> for Https {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}


//--- Display

impl fmt::Display for Https {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//--- Serialize and Deserialize

#[cfg(feature = "serde")]
impl serde::Serialize for Https {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Https {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        Https::from_string(string).map_err(serde::de::Error::custom)
    }
}


//------------ Error ---------------------------------------------------------

/// A URI failed validation.
#[derive(Clone, Copy, Debug)]
pub struct Error(());

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid URI")
    }
}

impl std::error::Error for Error { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn valid_uris() {
        assert!(is_valid(b"rsync://x/y.mft", Some("rsync://")));
        assert!(is_valid(b"RSYNC://x/y.mft", Some("rsync://")));
        assert!(is_valid(b"https://example.com/notify.xml", None));
    }

    #[test]
    fn dot_segments_rejected() {
        assert!(!is_valid(b"https://x/./y", Some("https://")));
        assert!(!is_valid(b"rsync://x/../y", Some("rsync://")));
        assert!(!is_valid(b"rsync://x/.hidden/y.mft", Some("rsync://")));
    }

    #[test]
    fn wrong_scheme_rejected() {
        assert!(!is_valid(b"http://x", Some("https://")));
        assert!(!is_valid(b"rsync://x", Some("https://")));
    }

    #[test]
    fn non_ascii_rejected() {
        assert!(!is_valid(b"rsync://x/y z", Some("rsync://")));
        assert!(!is_valid("rsync://x/\u{00fc}".as_bytes(), Some("rsync://")));
        assert!(!is_valid(b"rsync://x/\x07", Some("rsync://")));
    }

    #[test]
    fn rsync_prefix() {
        let repo = Rsync::from_str("rsync://host/module/").unwrap();
        let mft = Rsync::from_str("rsync://host/module/a.mft").unwrap();
        assert!(repo.is_prefix_of(&mft));
        assert!(!mft.is_prefix_of(&repo));
        assert!(mft.ends_with(".mft"));
        assert!(mft.ends_with(".MFT"));
        assert!(!repo.ends_with(".mft"));
    }
}
