//! Basic X.509 building blocks.
//!
//! This module provides the few pieces of plain X.509 the certificate
//! parser needs: the outer signed-data envelope and the time types used by
//! the validity field. Verifying the signature on the envelope is left to
//! the cryptographic library of the embedding application.

use std::{fmt, ops};
use bcder::{decode, Captured};
use bcder::Tag;
use bcder::decode::{ContentError, DecodeError, Source};
use chrono::{DateTime, LocalResult, TimeZone, Utc};


//------------ SignedData ----------------------------------------------------

/// The envelope of a signed X.509 structure.
///
/// A certificate is a sequence of the to-be-signed data, the signature
/// algorithm, and the signature value. Only the payload is of interest
/// here; signature checking is a non-goal of this crate, so algorithm and
/// value are skipped over after structural decoding.
#[derive(Clone, Debug)]
pub struct SignedData {
    /// The captured to-be-signed data.
    data: Captured,
}

impl SignedData {
    /// Parses the content of the outer certificate sequence.
    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let data = cons.capture_one()?;
        // signatureAlgorithm and signatureValue.
        cons.skip_all()?;
        Ok(SignedData { data })
    }

    /// Returns the captured to-be-signed data.
    pub fn data(&self) -> &Captured {
        &self.data
    }
}


//------------ Time ----------------------------------------------------------

/// A point in time, as it appears in certificate validity fields.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Self {
        match Utc.with_ymd_and_hms(year, month, day, hour, min, sec) {
            LocalResult::Single(dt) => Time(dt),
            _ => panic!("invalid date"),
        }
    }

    /// Returns the time as Unix seconds.
    pub fn timestamp(self) -> i64 {
        self.0.timestamp()
    }

    /// Creates a time from Unix seconds.
    pub fn from_timestamp(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Time)
    }

    /// Takes a time value from the beginning of an encoded value.
    ///
    /// RFC 5280 limits the encoding to `YYMMDDHHMMSSZ` for UTCTime and
    /// `YYYYMMDDHHMMSSZ` for GeneralizedTime.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(|tag, prim| {
            match tag {
                Tag::UTC_TIME => {
                    let year = read_two_char(prim)? as i32;
                    let year = if year >= 50 { year + 1900 }
                               else { year + 2000 };
                    let res = (
                        year,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                    );
                    if prim.take_u8()? != b'Z' {
                        return Err(prim.content_err("malformed time value"))
                    }
                    Self::from_parts(res).map_err(|err| prim.content_err(err))
                }
                Tag::GENERALIZED_TIME => {
                    let res = (
                        read_four_char(prim)? as i32,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                        read_two_char(prim)?,
                    );
                    if prim.take_u8()? != b'Z' {
                        return Err(prim.content_err("malformed time value"))
                    }
                    Self::from_parts(res).map_err(|err| prim.content_err(err))
                }
                _ => {
                    Err(prim.content_err("malformed time value"))
                }
            }
        })
    }

    fn from_parts(
        parts: (i32, u32, u32, u32, u32, u32)
    ) -> Result<Self, ContentError> {
        match Utc.with_ymd_and_hms(
            parts.0, parts.1, parts.2, parts.3, parts.4, parts.5
        ) {
            LocalResult::Single(dt) => Ok(Time(dt)),
            _ => Err(ContentError::from_static("malformed time value"))
        }
    }
}


//--- Deref and From

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}


//------------ Validity ------------------------------------------------------

/// The validity period of a certificate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    pub fn new(not_before: Time, not_after: Time) -> Self {
        Validity { not_before, not_after }
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Validity::new(
                Time::take_from(cons)?,
                Time::take_from(cons)?,
            ))
        })
    }
}


//------------ Helpers -------------------------------------------------------

fn read_two_char<S: decode::Source>(
    prim: &mut decode::Primitive<S>
) -> Result<u32, DecodeError<S::Error>> {
    let mut res = 0;
    for _ in 0..2 {
        let ch = prim.take_u8()?;
        if !ch.is_ascii_digit() {
            return Err(prim.content_err("malformed time value"))
        }
        res = res * 10 + u32::from(ch - b'0');
    }
    Ok(res)
}

fn read_four_char<S: decode::Source>(
    prim: &mut decode::Primitive<S>
) -> Result<u32, DecodeError<S::Error>> {
    Ok(read_two_char(prim)? * 100 + read_two_char(prim)?)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bcder::Mode;
    use super::*;

    #[test]
    fn decode_utc_time() {
        // UTCTime "260801120000Z"
        let der = b"\x17\x0d\x32\x36\x30\x38\x30\x31\x31\x32\x30\x30\x30\
                    \x30\x5a";
        let time = Mode::Der.decode(
            der.as_ref(), Time::take_from
        ).unwrap();
        assert_eq!(time, Time::utc(2026, 8, 1, 12, 0, 0));
    }

    #[test]
    fn decode_generalized_time() {
        // GeneralizedTime "20520801120000Z"
        let der = b"\x18\x0f\x32\x30\x35\x32\x30\x38\x30\x31\x31\x32\x30\
                    \x30\x30\x30\x5a";
        let time = Mode::Der.decode(
            der.as_ref(), Time::take_from
        ).unwrap();
        assert_eq!(time, Time::utc(2052, 8, 1, 12, 0, 0));
    }

    #[test]
    fn reject_truncated_time() {
        let der = b"\x17\x0c\x32\x36\x30\x38\x30\x31\x31\x32\x30\x30\x30\x30";
        assert!(Mode::Der.decode(der.as_ref(), Time::take_from).is_err());
    }

    #[test]
    fn timestamp_round_trip() {
        let time = Time::utc(2026, 8, 1, 12, 0, 0);
        assert_eq!(Time::from_timestamp(time.timestamp()), Some(time));
    }
}
