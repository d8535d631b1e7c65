//! Error types shared by the parser and validator.
//!
//! Three kinds of things can go wrong with an object: it can fail to decode
//! at all, it can violate the profile all by itself, or it can disagree with
//! reference material such as the TAL key it is supposed to match. The types
//! herein keep these cases apart while still funnelling everything into a
//! single [`ValidationError`] at the API surface.

use std::fmt;
use std::convert::Infallible;
use bcder::decode::{ContentError, DecodeError};


//------------ InspectionError -----------------------------------------------

/// An object violates the profile independently of any reference material.
#[derive(Debug)]
pub struct InspectionError {
    inner: ContentError,
}

impl InspectionError {
    pub fn new(err: impl Into<ContentError>) -> Self {
        InspectionError { inner: err.into() }
    }
}

impl From<ContentError> for InspectionError {
    fn from(err: ContentError) -> InspectionError {
        InspectionError { inner: err }
    }
}

impl From<InspectionError> for ContentError {
    fn from(err: InspectionError) -> Self {
        err.inner
    }
}

impl fmt::Display for InspectionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}


//------------ VerificationError ---------------------------------------------

/// An object disagrees with the reference material it was checked against.
#[derive(Debug)]
pub struct VerificationError {
    inner: ContentError,
}

impl VerificationError {
    pub fn new(err: impl Into<ContentError>) -> Self {
        VerificationError { inner: err.into() }
    }
}

impl From<ContentError> for VerificationError {
    fn from(err: ContentError) -> VerificationError {
        VerificationError { inner: err }
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.inner.fmt(f)
    }
}


//------------ ValidationError -----------------------------------------------

/// Any of the ways parsing or validating an object can fail.
#[derive(Debug)]
pub struct ValidationError {
    inner: ValidationErrorKind,
}

#[derive(Debug)]
enum ValidationErrorKind {
    Decoding(DecodeError<Infallible>),
    Inspection(InspectionError),
    Verification(VerificationError),
}

impl From<DecodeError<Infallible>> for ValidationError {
    fn from(err: DecodeError<Infallible>) -> ValidationError {
        ValidationError {
            inner: ValidationErrorKind::Decoding(err)
        }
    }
}

impl From<InspectionError> for ValidationError {
    fn from(err: InspectionError) -> ValidationError {
        ValidationError {
            inner: ValidationErrorKind::Inspection(err)
        }
    }
}

impl From<VerificationError> for ValidationError {
    fn from(err: VerificationError) -> ValidationError {
        ValidationError {
            inner: ValidationErrorKind::Verification(err)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.inner {
            ValidationErrorKind::Decoding(ref inner) => inner.fmt(f),
            ValidationErrorKind::Inspection(ref inner) => inner.fmt(f),
            ValidationErrorKind::Verification(ref inner) => inner.fmt(f),
        }
    }
}
