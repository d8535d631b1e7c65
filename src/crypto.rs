//! Key identifiers, public keys, and digests.
//!
//! The certificate parser needs three cryptographic helpers: the SHA-1
//! based key identifiers that tie certificates to their issuers, the
//! subject public key info needed to authenticate trust anchors and to
//! carry BGPsec router keys, and SHA-256 digesting for file hashes.
//! Actual signature verification lives outside this crate.

use std::{fmt, io, str};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use bcder::{decode, BitString, Captured, Oid, Tag};
use bcder::decode::DecodeError;
use ring::digest;
use crate::oid;

pub use ring::digest::Digest;


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// This is the SHA-1 hash over the public key's bits, as used by the
/// subject and authority key identifier extensions. The authority tree is
/// keyed by these values, hence the ordering.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct KeyIdentifier([u8; 20]);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifier's value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns an octet array with the hex representation of the identifier.
    pub fn into_hex(self) -> [u8; 40] {
        const DIGITS: &[u8] = b"0123456789ABCDEF";
        let mut res = [0u8; 40];
        for (ch, out) in self.0.iter().zip(res.chunks_mut(2)) {
            out[0] = DIGITS[usize::from(ch >> 4)];
            out[1] = DIGITS[usize::from(ch & 0x0f)];
        }
        res
    }

    /// Takes an encoded key identifier from a constructed value.
    ///
    /// ```text
    /// KeyIdentifier ::= OCTET STRING
    /// ```
    ///
    /// The content of the octet string needs to be a SHA-1 hash, so it must
    /// be exactly 20 octets long.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_value_if(Tag::OCTET_STRING, Self::from_content)
    }

    /// Parses an encoded key identifier from encoded content.
    pub fn from_content<S: decode::Source>(
        content: &mut decode::Content<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let octets = bcder::OctetString::from_content(content)?;
        if let Some(slice) = octets.as_slice() {
            Self::try_from(slice).map_err(|_| {
                content.content_err("invalid key identifier")
            })
        }
        else if octets.len() != 20 {
            Err(content.content_err("invalid key identifier"))
        }
        else {
            let mut res = KeyIdentifier(Default::default());
            let mut pos = 0;
            for slice in &octets {
                let end = pos + slice.len();
                res.0[pos..end].copy_from_slice(slice);
                pos = end;
            }
            Ok(res)
        }
    }
}


//--- TryFrom and FromStr

impl<'a> TryFrom<&'a [u8]> for KeyIdentifier {
    type Error = KeyIdentifierError;

    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        value.try_into().map(KeyIdentifier).map_err(|_| {
            KeyIdentifierError(())
        })
    }
}

impl str::FromStr for KeyIdentifier {
    type Err = KeyIdentifierError;

    /// Parses the 40-character hex representation of a key identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.as_bytes();
        if value.len() != 40 {
            return Err(KeyIdentifierError(()))
        }
        let mut res = [0u8; 20];
        for (out, chunk) in res.iter_mut().zip(value.chunks(2)) {
            let hi = char::from(chunk[0]).to_digit(16)
                .ok_or(KeyIdentifierError(()))?;
            let lo = char::from(chunk[1]).to_digit(16)
                .ok_or(KeyIdentifierError(()))?;
            *out = (hi as u8) << 4 | lo as u8;
        }
        Ok(KeyIdentifier(res))
    }
}


//--- AsRef

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}


//--- Display

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hex = self.into_hex();
        // into_hex only produces ASCII hex digits.
        f.write_str(unsafe { str::from_utf8_unchecked(&hex) })
    }
}


//------------ KeyIdentifierError --------------------------------------------

/// A value could not be converted into a key identifier.
#[derive(Clone, Copy, Debug)]
pub struct KeyIdentifierError(());

impl fmt::Display for KeyIdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid key identifier")
    }
}

impl std::error::Error for KeyIdentifierError { }


//------------ PublicKeyFormat -----------------------------------------------

/// The formats of public keys used in RPKI.
///
/// The two formats in use are RSA for everything inside the repository and
/// ECDSA P-256 for BGPsec router certificates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PublicKeyFormat {
    /// An RSA public key.
    Rsa,

    /// An ECDSA public key on the P-256 curve.
    EcdsaP256,
}

/// # ASN.1 Algorithm Identifiers
///
/// ```text
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// For RSA keys the algorithm is `rsaEncryption` with NULL parameters
/// which we generously also allow to be absent. For ECDSA keys it is
/// `ecPublicKey` with the `secp256r1` curve as parameter.
impl PublicKeyFormat {
    /// Returns whether the format is allowed for RPKI-internal certificates.
    pub fn allow_rpki_cert(self) -> bool {
        matches!(self, PublicKeyFormat::Rsa)
    }

    /// Returns whether the format is allowed for router certificates.
    pub fn allow_router_cert(self) -> bool {
        matches!(self, PublicKeyFormat::EcdsaP256)
    }

    /// Takes and returns an algorithm identifier.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the algorithm identifier from the content of its sequence.
    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let alg = Oid::take_from(cons)?;
        if alg == oid::RSA_ENCRYPTION {
            cons.take_opt_null()?;
            Ok(PublicKeyFormat::Rsa)
        }
        else if alg == oid::EC_PUBLIC_KEY {
            oid::SECP256R1.skip_if(cons)?;
            Ok(PublicKeyFormat::EcdsaP256)
        }
        else {
            Err(cons.content_err("invalid public key algorithm"))
        }
    }
}


//------------ PublicKey -----------------------------------------------------

/// A subject public key info.
///
/// Besides the parsed algorithm and key bits, the value keeps the captured
/// DER encoding of the entire structure. Trust anchor authentication
/// compares this capture against the TAL-provided key, and BGPsec router
/// keys travel onwards in exactly this form.
#[derive(Clone, Debug)]
pub struct PublicKey {
    algorithm: PublicKeyFormat,
    bits: BitString,
    info: Captured,
}

impl PublicKey {
    /// Returns the algorithm of the key.
    pub fn algorithm(&self) -> PublicKeyFormat {
        self.algorithm
    }

    /// Returns the raw bits of the key.
    pub fn bits(&self) -> &BitString {
        &self.bits
    }

    /// Returns the DER encoding of the full subject public key info.
    pub fn info_bytes(&self) -> &[u8] {
        self.info.as_slice()
    }

    /// Takes the subject public key info from a constructed value.
    ///
    /// ```text
    /// SubjectPublicKeyInfo ::= SEQUENCE {
    ///      algorithm          AlgorithmIdentifier,
    ///      subjectPublicKey   BIT STRING }
    /// ```
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let info = cons.capture_one()?;
        let (algorithm, bits) = info.clone().decode(|cons| {
            cons.take_sequence(|cons| {
                let algorithm = PublicKeyFormat::take_from(cons)?;
                let bits = BitString::take_from(cons)?;
                Ok((algorithm, bits))
            })
        }).map_err(DecodeError::convert)?;
        Ok(PublicKey { algorithm, bits, info })
    }
}


//--- PartialEq and Eq

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.info.as_slice() == other.info.as_slice()
    }
}

impl Eq for PublicKey { }


//------------ DigestAlgorithm -----------------------------------------------

/// The digest algorithm used by RPKI.
///
/// RFC 7935 limits RPKI to exactly one algorithm, SHA-256, so this is a
/// zero-sized struct for the time being.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DigestAlgorithm(());

impl DigestAlgorithm {
    /// Creates a value representing the SHA-256 algorithm.
    pub fn sha256() -> Self {
        DigestAlgorithm(())
    }

    /// Returns the digest size in octets for this algorithm.
    pub fn digest_len(self) -> usize {
        32
    }

    /// Returns the digest of `data` using this algorithm.
    pub fn digest(self, data: &[u8]) -> Digest {
        digest::digest(&digest::SHA256, data)
    }

    /// Calculates the digest of the content of a file.
    pub fn digest_file(
        self, path: impl AsRef<Path>
    ) -> Result<Digest, io::Error> {
        let mut file = File::open(path)?;
        let mut buf = [0u8; 8 * 1024];
        let mut ctx = self.start();
        loop {
            let read = file.read(&mut buf)?;
            if read == 0 {
                break;
            }
            ctx.update(&buf[..read]);
        }
        Ok(ctx.finish())
    }

    /// Returns a digest context for multi-step calculation of the digest.
    pub fn start(self) -> Context {
        Context(digest::Context::new(&digest::SHA256))
    }
}


//------------ Context -------------------------------------------------------

/// A digest context for incremental digest calculation.
#[derive(Clone)]
pub struct Context(digest::Context);

impl Context {
    /// Adds `data` to the digest.
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data)
    }

    /// Converts the context into the digest.
    pub fn finish(self) -> Digest {
        self.0.finish()
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use super::*;

    #[test]
    fn key_identifier_hex_round_trip() {
        let ki = KeyIdentifier::try_from(
            b"\x01\x23\x45\x67\x89\xab\xcd\xef\x01\x23\
              \x45\x67\x89\xab\xcd\xef\x01\x23\x45\x67".as_ref()
        ).unwrap();
        let hex = ki.to_string();
        assert_eq!(hex.len(), 40);
        assert_eq!(KeyIdentifier::from_str(&hex).unwrap(), ki);
        assert_eq!(
            KeyIdentifier::from_str(&hex.to_ascii_lowercase()).unwrap(), ki
        );
    }

    #[test]
    fn key_identifier_rejects_bad_input() {
        assert!(KeyIdentifier::try_from(b"short".as_ref()).is_err());
        assert!(KeyIdentifier::from_str("0123").is_err());
        assert!(KeyIdentifier::from_str(
            "zz234567890123456789012345678901234567890"
        ).is_err());
    }

    #[test]
    fn sha256_digest() {
        let alg = DigestAlgorithm::sha256();
        assert_eq!(alg.digest_len(), 32);
        // SHA-256 of the empty string.
        assert_eq!(
            alg.digest(b"").as_ref(),
            b"\xe3\xb0\xc4\x42\x98\xfc\x1c\x14\x9a\xfb\xf4\xc8\x99\x6f\xb9\
              \x24\x27\xae\x41\xe4\x64\x9b\x93\x4c\xa4\x95\x99\x1b\x78\x52\
              \xb8\x55"
        );
    }
}
