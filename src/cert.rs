//! Resource certificates.
//!
//! The certificates used in RPKI are called _resource certificates._ They
//! are defined in [RFC 6487] as a profile on regular Internet PKI
//! certificates, carrying the RFC 3779 resource extensions that the whole
//! trust model hangs off.
//!
//! This module implements the parsing half of the core: [`cert_parse`]
//! and [`ta_parse`] turn untrusted DER into a [`Cert`] record, with full
//! structural validation of the `sbgp-ipAddrBlock`,
//! `sbgp-autonomousSysNum`, and Subject Information Access extensions.
//! The record can then be shipped across the parser-to-validator pipe with
//! [`Cert::write`] and [`Cert::read`].
//!
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::io;
use std::io::{Read, Write};
use std::str::FromStr;
use bcder::{decode, Ia5String, Mode, OctetString, Oid, Tag};
use bcder::decode::DecodeError;
use bytes::Bytes;
use log::warn;
use crate::{ipc, oid, uri};
use crate::crypto::{KeyIdentifier, PublicKey};
use crate::error::{InspectionError, ValidationError, VerificationError};
use crate::resources::{
    AddressFamily, AddressRange, Addr, AsEntry, AsRange, AsResources, Asn,
    IpChoice, IpEntry, IpResources, Prefix,
};
use crate::x509::{SignedData, Time, Validity};


//------------ Parse functions -----------------------------------------------

/// Parses and structurally validates a resource certificate.
///
/// `file` is used for diagnostics only. On success the returned record
/// holds the original DER in its `x509` handle. Every failure is logged
/// with the file name before being returned.
pub fn cert_parse(file: &str, der: Bytes) -> Result<Cert, ValidationError> {
    Cert::parse_internal(file, der, false).map(|(cert, _)| cert)
}

/// Parses a trust anchor certificate and authenticates it against its TAL.
///
/// In addition to the rules applied by [`cert_parse`], the certificate is
/// held to the trust anchor profile: an AKI, if present, must equal the
/// SKI, and AIA and CRL distribution points must be absent. The DER
/// subject public key info must equal `tal_key`, the key pinned by the
/// Trust Anchor Locator.
pub fn ta_parse(
    file: &str, der: Bytes, tal_key: &[u8],
) -> Result<Cert, ValidationError> {
    let (cert, key) = Cert::parse_internal(file, der, true)?;
    if key.info_bytes() != tal_key {
        warn!(
            "{}: RFC 6487 (trust anchor): \
             pubkey does not match TAL pubkey", file
        );
        return Err(VerificationError::new(
            "trust anchor pubkey does not match TAL pubkey"
        ).into())
    }
    Ok(cert)
}


//------------ CertPurpose ---------------------------------------------------

/// What a certificate is for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CertPurpose {
    /// A CA certificate signing further objects in the repository.
    Ca,

    /// A BGPsec router certificate binding AS numbers to a router key.
    BgpsecRouter,
}


//------------ Cert ----------------------------------------------------------

/// A parsed resource certificate.
///
/// A value of this type is created by [`cert_parse`] or [`ta_parse`], or
/// read back off the parser-to-validator pipe via [`Cert::read`]. After
/// creation the record never changes except that the validator stamps
/// `tal` and `valid` once the certificate has been authenticated.
#[derive(Clone, Debug)]
pub struct Cert {
    /// Whether the validator has accepted the certificate.
    valid: bool,

    /// The end of the validity period.
    expires: Time,

    /// The purpose of the certificate.
    purpose: CertPurpose,

    /// The IP resources.
    ips: IpResources,

    /// The AS resources.
    asns: AsResources,

    /// The SIA manifest location. Present for every CA certificate.
    mft: Option<uri::Rsync>,

    /// The SIA RRDP notification file, if the CA publishes over RRDP.
    notify: Option<uri::Https>,

    /// The SIA repository publication point.
    repo: Option<uri::Rsync>,

    /// The CRL distribution point. Absent for a trust anchor.
    crl: Option<uri::Rsync>,

    /// The AIA location of the issuer certificate. Absent for a trust
    /// anchor.
    aia: Option<uri::Rsync>,

    /// The authority key identifier. Absent only for a trust anchor.
    aki: Option<KeyIdentifier>,

    /// The subject key identifier.
    ski: KeyIdentifier,

    /// The trust anchor this certificate chains up to. Stamped by the
    /// validator.
    tal: Option<String>,

    /// The base64 encoded subject public key info of a BGPsec router
    /// certificate.
    pubkey: Option<String>,

    /// The DER encoding of the whole certificate.
    ///
    /// Clones of the record share the underlying buffer. The handle does
    /// not travel across the pipe; a record produced by [`Cert::read`]
    /// has an empty handle.
    x509: Bytes,
}

/// # Creation
///
impl Cert {
    /// Creates a bare record, for use by external object builders.
    ///
    /// All optional fields start out absent and the resource sets empty.
    pub fn new(
        ski: KeyIdentifier, purpose: CertPurpose, expires: Time
    ) -> Self {
        Cert {
            valid: false,
            expires,
            purpose,
            ips: IpResources::new(),
            asns: AsResources::new(),
            mft: None,
            notify: None,
            repo: None,
            crl: None,
            aia: None,
            aki: None,
            ski,
            tal: None,
            pubkey: None,
            x509: Bytes::new(),
        }
    }

    pub fn set_aki(&mut self, aki: Option<KeyIdentifier>) {
        self.aki = aki
    }

    pub fn set_aia(&mut self, aia: Option<uri::Rsync>) {
        self.aia = aia
    }

    pub fn set_crl(&mut self, crl: Option<uri::Rsync>) {
        self.crl = crl
    }

    pub fn set_mft(&mut self, mft: Option<uri::Rsync>) {
        self.mft = mft
    }

    pub fn set_repo(&mut self, repo: Option<uri::Rsync>) {
        self.repo = repo
    }

    pub fn set_notify(&mut self, notify: Option<uri::Https>) {
        self.notify = notify
    }

    pub fn set_pubkey(&mut self, pubkey: Option<String>) {
        self.pubkey = pubkey
    }

    /// Returns a mutable reference to the IP resources.
    pub fn ips_mut(&mut self) -> &mut IpResources {
        &mut self.ips
    }

    /// Returns a mutable reference to the AS resources.
    pub fn asns_mut(&mut self) -> &mut AsResources {
        &mut self.asns
    }

    /// Stamps the trust anchor identity onto the certificate.
    ///
    /// Called by the validator once the certificate has been
    /// authenticated.
    pub fn set_tal(&mut self, tal: String) {
        self.tal = Some(tal)
    }

    /// Marks the certificate as accepted by the validator.
    pub fn set_valid(&mut self) {
        self.valid = true
    }
}

/// # Data Access
///
impl Cert {
    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn expires(&self) -> Time {
        self.expires
    }

    pub fn purpose(&self) -> CertPurpose {
        self.purpose
    }

    pub fn ips(&self) -> &IpResources {
        &self.ips
    }

    pub fn asns(&self) -> &AsResources {
        &self.asns
    }

    pub fn mft(&self) -> Option<&uri::Rsync> {
        self.mft.as_ref()
    }

    pub fn notify(&self) -> Option<&uri::Https> {
        self.notify.as_ref()
    }

    pub fn repo(&self) -> Option<&uri::Rsync> {
        self.repo.as_ref()
    }

    pub fn crl(&self) -> Option<&uri::Rsync> {
        self.crl.as_ref()
    }

    pub fn aia(&self) -> Option<&uri::Rsync> {
        self.aia.as_ref()
    }

    pub fn aki(&self) -> Option<&KeyIdentifier> {
        self.aki.as_ref()
    }

    pub fn ski(&self) -> &KeyIdentifier {
        &self.ski
    }

    pub fn tal(&self) -> Option<&str> {
        self.tal.as_deref()
    }

    pub fn pubkey(&self) -> Option<&str> {
        self.pubkey.as_deref()
    }

    /// Returns the DER encoding of the underlying certificate.
    pub fn x509(&self) -> &Bytes {
        &self.x509
    }
}

/// # Decoding
///
impl Cert {
    /// Parses a certificate, logging any failure under `file`.
    fn parse_internal(
        file: &str, der: Bytes, is_ta: bool,
    ) -> Result<(Self, PublicKey), ValidationError> {
        let tbs = match Mode::Der.decode(der.clone(), TbsCert::take_from) {
            Ok(tbs) => tbs,
            Err(err) => {
                warn!("{}: {}", file, err);
                return Err(err.into())
            }
        };
        match Self::from_tbs(tbs, der, is_ta) {
            Ok(res) => Ok(res),
            Err(err) => {
                warn!("{}: {}", file, err);
                Err(err.into())
            }
        }
    }

    /// Applies the post-extension rules of RFC 6487 and builds the record.
    fn from_tbs(
        tbs: TbsCert, der: Bytes, is_ta: bool,
    ) -> Result<(Self, PublicKey), InspectionError> {
        let purpose = if tbs.basic_ca == Some(true) {
            CertPurpose::Ca
        }
        else if tbs.router_eku == Some(true) {
            CertPurpose::BgpsecRouter
        }
        else {
            return Err(InspectionError::new(
                "RFC 6487: unknown certificate purpose"
            ))
        };

        let pubkey = match purpose {
            CertPurpose::Ca => {
                if !tbs.spki.algorithm().allow_rpki_cert() {
                    return Err(InspectionError::new(
                        "public key algorithm not allowed \
                         for RPKI CA certificates"
                    ))
                }
                if tbs.sia.is_none() {
                    return Err(InspectionError::new(
                        "RFC 6487 section 4.8.8: missing SIA"
                    ))
                }
                if tbs.ips.is_empty() && tbs.asns.is_empty() {
                    return Err(InspectionError::new(
                        "missing IP or AS resources"
                    ))
                }
                None
            }
            CertPurpose::BgpsecRouter => {
                if !tbs.spki.algorithm().allow_router_cert() {
                    return Err(InspectionError::new(
                        "RFC 8608: bad public key algorithm \
                         in BGPsec router certificate"
                    ))
                }
                if !tbs.ips.is_empty() {
                    return Err(InspectionError::new(
                        "unexpected IP resources in BGPsec cert"
                    ))
                }
                if tbs.sia.is_some() {
                    return Err(InspectionError::new(
                        "unexpected SIA extension in BGPsec cert"
                    ))
                }
                Some(base64::encode(tbs.spki.info_bytes()))
            }
        };

        let ski = match tbs.ski {
            Some(ski) => ski,
            None => {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.2: missing SKI"
                ))
            }
        };

        if is_ta {
            if let Some(aki) = tbs.aki {
                if aki != ski {
                    return Err(InspectionError::new(
                        "RFC 6487 section 8.4.2: trust anchor AKI, \
                         if specified, must match SKI"
                    ))
                }
            }
            if tbs.ca_issuer.is_some() {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.7: \
                     trust anchor must not have AIA"
                ))
            }
            if tbs.crl_uri.is_some() {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.2: \
                     trust anchor may not specify CRL resource"
                ))
            }
        }
        else {
            match tbs.aki {
                None => {
                    return Err(InspectionError::new(
                        "RFC 6487 section 8.4.2: \
                         non-trust anchor missing AKI"
                    ))
                }
                Some(aki) if aki == ski => {
                    return Err(InspectionError::new(
                        "RFC 6487 section 8.4.2: \
                         non-trust anchor AKI may not match SKI"
                    ))
                }
                _ => { }
            }
            if tbs.ca_issuer.is_none() {
                return Err(InspectionError::new(
                    "RFC 6487 section 8.4.7: \
                     non-trust anchor missing AIA"
                ))
            }
        }

        let (repo, mft, notify) = match tbs.sia {
            Some(sia) => (Some(sia.repo), Some(sia.mft), sia.notify),
            None => (None, None, None),
        };

        Ok((
            Cert {
                valid: false,
                expires: tbs.validity.not_after(),
                purpose,
                ips: tbs.ips,
                asns: tbs.asns,
                mft,
                notify,
                repo,
                crl: tbs.crl_uri,
                aia: tbs.ca_issuer,
                aki: tbs.aki,
                ski,
                tal: None,
                pubkey,
                x509: der,
            },
            tbs.spki,
        ))
    }
}

/// # Transfer over the parser-to-validator pipe
///
/// The record travels as a fixed-order byte stream: `valid`, `expires`,
/// `purpose`, the IP entries, the AS entries, and then the string fields
/// `mft`, `notify`, `repo`, `crl`, `aia`, `aki`, `ski`, `tal`, `pubkey`.
/// The reader sits on a trust boundary and re-validates everything it
/// takes off the pipe.
impl Cert {
    /// Writes the record onto the pipe.
    pub fn write<W: Write>(&self, target: &mut W) -> Result<(), io::Error> {
        ipc::write_u8(target, self.valid.into())?;
        ipc::write_i64(target, self.expires.timestamp())?;
        ipc::write_u8(target, match self.purpose {
            CertPurpose::Ca => 1,
            CertPurpose::BgpsecRouter => 2,
        })?;

        ipc::write_u32(target, self.ips.len() as u32)?;
        for entry in self.ips.iter() {
            ipc::write_u8(target, match entry.afi() {
                AddressFamily::Ipv4 => 1,
                AddressFamily::Ipv6 => 2,
            })?;
            match *entry.choice() {
                IpChoice::Addr(prefix) => {
                    ipc::write_u8(target, 0)?;
                    target.write_all(&prefix.min().to_bytes())?;
                    target.write_all(&prefix.max().to_bytes())?;
                    ipc::write_u8(target, prefix.addr_len())?;
                    target.write_all(&prefix.addr().to_bytes())?;
                }
                IpChoice::Range(range) => {
                    ipc::write_u8(target, 1)?;
                    target.write_all(&range.min().to_bytes())?;
                    target.write_all(&range.max().to_bytes())?;
                    target.write_all(&range.min().to_bytes())?;
                    target.write_all(&range.max().to_bytes())?;
                }
                IpChoice::Inherit => {
                    ipc::write_u8(target, 2)?;
                }
            }
        }

        ipc::write_u32(target, self.asns.len() as u32)?;
        for entry in self.asns.iter() {
            match *entry {
                AsEntry::Id(id) => {
                    ipc::write_u8(target, 0)?;
                    ipc::write_u32(target, id.into_u32())?;
                }
                AsEntry::Range(range) => {
                    ipc::write_u8(target, 1)?;
                    ipc::write_u32(target, range.min().into_u32())?;
                    ipc::write_u32(target, range.max().into_u32())?;
                }
                AsEntry::Inherit => {
                    ipc::write_u8(target, 2)?;
                }
            }
        }

        ipc::write_opt_bytes(
            target, self.mft.as_ref().map(uri::Rsync::as_slice)
        )?;
        ipc::write_opt_bytes(
            target, self.notify.as_ref().map(uri::Https::as_slice)
        )?;
        ipc::write_opt_bytes(
            target, self.repo.as_ref().map(uri::Rsync::as_slice)
        )?;
        ipc::write_opt_bytes(
            target, self.crl.as_ref().map(uri::Rsync::as_slice)
        )?;
        ipc::write_opt_bytes(
            target, self.aia.as_ref().map(uri::Rsync::as_slice)
        )?;
        match self.aki {
            Some(aki) => {
                let hex = aki.into_hex();
                ipc::write_opt_bytes(target, Some(hex.as_ref()))?
            }
            None => ipc::write_opt_bytes(target, None)?,
        }
        let hex = self.ski.into_hex();
        ipc::write_opt_bytes(target, Some(hex.as_ref()))?;
        ipc::write_opt_bytes(
            target, self.tal.as_deref().map(str::as_bytes)
        )?;
        ipc::write_opt_bytes(
            target, self.pubkey.as_deref().map(str::as_bytes)
        )?;
        Ok(())
    }

    /// Reads a record off the pipe.
    ///
    /// Every field is checked: counts and lengths are capped, URIs and
    /// key identifiers re-validated, the resource invariants re-imposed,
    /// and the record must carry an SKI as well as, unless it is a BGPsec
    /// router certificate, a manifest location.
    pub fn read<R: Read>(source: &mut R) -> Result<Self, io::Error> {
        let valid = match ipc::read_u8(source)? {
            0 => false,
            1 => true,
            _ => return Err(ipc::data_err("invalid validity flag")),
        };
        let expires = Time::from_timestamp(ipc::read_i64(source)?)
            .ok_or_else(|| ipc::data_err("invalid expiry time"))?;
        let purpose = match ipc::read_u8(source)? {
            1 => CertPurpose::Ca,
            2 => CertPurpose::BgpsecRouter,
            _ => return Err(ipc::data_err("invalid certificate purpose")),
        };

        let mut ips = IpResources::new();
        for _ in 0..ipc::read_count(source)? {
            let afi = match ipc::read_u8(source)? {
                1 => AddressFamily::Ipv4,
                2 => AddressFamily::Ipv6,
                _ => return Err(ipc::data_err("invalid address family")),
            };
            let entry = match ipc::read_u8(source)? {
                0 => {
                    let min = Addr::from_bytes(ipc::read_addr_bytes(source)?);
                    let max = Addr::from_bytes(ipc::read_addr_bytes(source)?);
                    let len = ipc::read_u8(source)?;
                    if len > afi.max_addr_len() {
                        return Err(ipc::data_err("invalid prefix length"))
                    }
                    let addr = Addr::from_bytes(
                        ipc::read_addr_bytes(source)?
                    );
                    let prefix = Prefix::new(addr, len);
                    if prefix.min() != min || prefix.max() != max {
                        return Err(ipc::data_err("inconsistent IP entry"))
                    }
                    IpEntry::addr(afi, prefix)
                }
                1 => {
                    let min = Addr::from_bytes(ipc::read_addr_bytes(source)?);
                    let max = Addr::from_bytes(ipc::read_addr_bytes(source)?);
                    let pmin = Addr::from_bytes(
                        ipc::read_addr_bytes(source)?
                    );
                    let pmax = Addr::from_bytes(
                        ipc::read_addr_bytes(source)?
                    );
                    if pmin != min || pmax != max || min > max {
                        return Err(ipc::data_err("inconsistent IP range"))
                    }
                    IpEntry::range(afi, AddressRange::new(min, max))
                }
                2 => IpEntry::inherit(afi),
                _ => return Err(ipc::data_err("invalid IP entry type")),
            };
            ips.push(entry).map_err(|_| {
                ipc::data_err("invalid IP resources")
            })?;
        }

        let mut asns = AsResources::new();
        for _ in 0..ipc::read_count(source)? {
            let entry = match ipc::read_u8(source)? {
                0 => AsEntry::Id(Asn::from_u32(ipc::read_u32(source)?)),
                1 => {
                    let min = Asn::from_u32(ipc::read_u32(source)?);
                    let max = Asn::from_u32(ipc::read_u32(source)?);
                    if min >= max {
                        return Err(ipc::data_err("invalid AS range"))
                    }
                    AsEntry::Range(AsRange::new(min, max))
                }
                2 => AsEntry::Inherit,
                _ => return Err(ipc::data_err("invalid AS entry type")),
            };
            asns.push(entry).map_err(|_| {
                ipc::data_err("invalid AS resources")
            })?;
        }

        let mft = read_opt_rsync(source)?;
        let notify = match ipc::read_opt_bytes(source)? {
            Some(bytes) => Some(
                uri::Https::from_bytes(bytes.into()).map_err(|_| {
                    ipc::data_err("invalid HTTPS URI")
                })?
            ),
            None => None,
        };
        let repo = read_opt_rsync(source)?;
        let crl = read_opt_rsync(source)?;
        let aia = read_opt_rsync(source)?;
        let aki = read_opt_key_identifier(source)?;
        let ski = read_opt_key_identifier(source)?
            .ok_or_else(|| ipc::data_err("missing SKI"))?;
        let tal = read_opt_string(source)?;
        let pubkey = read_opt_string(source)?;

        if mft.is_none() && purpose != CertPurpose::BgpsecRouter {
            return Err(ipc::data_err("missing manifest location"))
        }

        Ok(Cert {
            valid, expires, purpose, ips, asns, mft, notify, repo, crl,
            aia, aki, ski, tal, pubkey,
            x509: Bytes::new(),
        })
    }
}


//------------ Pipe helpers --------------------------------------------------

fn read_opt_rsync<R: Read>(
    source: &mut R
) -> Result<Option<uri::Rsync>, io::Error> {
    match ipc::read_opt_bytes(source)? {
        Some(bytes) => {
            uri::Rsync::from_bytes(bytes.into()).map(Some).map_err(|_| {
                ipc::data_err("invalid rsync URI")
            })
        }
        None => Ok(None),
    }
}

fn read_opt_key_identifier<R: Read>(
    source: &mut R
) -> Result<Option<KeyIdentifier>, io::Error> {
    match ipc::read_opt_bytes(source)? {
        Some(bytes) => {
            let hex = std::str::from_utf8(&bytes).map_err(|_| {
                ipc::data_err("invalid key identifier")
            })?;
            KeyIdentifier::from_str(hex).map(Some).map_err(|_| {
                ipc::data_err("invalid key identifier")
            })
        }
        None => Ok(None),
    }
}

fn read_opt_string<R: Read>(
    source: &mut R
) -> Result<Option<String>, io::Error> {
    match ipc::read_opt_bytes(source)? {
        Some(bytes) => {
            String::from_utf8(bytes).map(Some).map_err(|_| {
                ipc::data_err("invalid string")
            })
        }
        None => Ok(None),
    }
}


//------------ TbsCert -------------------------------------------------------

/// The raw content of the to-be-signed certificate.
///
/// This only keeps what the record needs; everything else is structurally
/// checked and skipped.
struct TbsCert {
    validity: Validity,
    spki: PublicKey,
    basic_ca: Option<bool>,
    router_eku: Option<bool>,
    ski: Option<KeyIdentifier>,
    aki: Option<KeyIdentifier>,
    crl_uri: Option<uri::Rsync>,
    ca_issuer: Option<uri::Rsync>,
    sia: Option<Sia>,
    ips: IpResources,
    asns: AsResources,
}

impl TbsCert {
    /// Takes a certificate from the beginning of a source.
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let signed_data = SignedData::from_constructed(cons)?;
            signed_data.data().clone().decode(
                Self::from_constructed
            ).map_err(DecodeError::convert)
        })
    }

    /// Parses the content of a TBSCertificate sequence.
    fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            // version [0] EXPLICIT Version -- extensions require v3,
            // which, confusingly, is 2.
            cons.take_constructed_if(Tag::CTX_0, |c| c.skip_u8_if(2))?;

            let _serial = cons.capture_one()?;
            let _signature = cons.capture_one()?;
            let _issuer = cons.capture_one()?;
            let validity = Validity::take_from(cons)?;
            let _subject = cons.capture_one()?;
            let spki = PublicKey::take_from(cons)?;

            // issuerUniqueID and subjectUniqueID must not be present in
            // resource certificates, so extensions are next.

            let mut basic_ca = None;
            let mut router_eku = None;
            let mut key_usage_seen = false;
            let mut policies_seen = false;
            let mut ski = None;
            let mut aki = None;
            let mut crl_uri = None;
            let mut ca_issuer = None;
            let mut sia = None;
            let mut ips = None;
            let mut asns = None;

            cons.take_constructed_if(Tag::CTX_3, |c| c.take_sequence(
                |cons| {
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        let id = Oid::take_from(cons)?;
                        let critical =
                            cons.take_opt_bool()?.unwrap_or(false);
                        let value = OctetString::take_from(cons)?;
                        Mode::Der.decode(value, |content| {
                            if id == oid::PE_IP_ADDR_BLOCK {
                                Self::take_ip_resources(content, &mut ips)
                            }
                            else if id == oid::PE_AUTONOMOUS_SYS_IDS {
                                Self::take_as_resources(content, &mut asns)
                            }
                            else if id == oid::PE_SUBJECT_INFO_ACCESS {
                                Self::take_subject_info_access(
                                    content, &mut sia
                                )
                            }
                            else if id == oid::CE_CRL_DISTRIBUTION_POINTS {
                                Self::take_crl_distribution_points(
                                    content, &mut crl_uri
                                )
                            }
                            else if id == oid::PE_AUTHORITY_INFO_ACCESS {
                                Self::take_authority_info_access(
                                    content, &mut ca_issuer
                                )
                            }
                            else if id == oid::CE_SUBJECT_KEY_IDENTIFIER {
                                Self::take_subject_key_identifier(
                                    content, &mut ski
                                )
                            }
                            else if id == oid::CE_AUTHORITY_KEY_IDENTIFIER {
                                Self::take_authority_key_identifier(
                                    content, &mut aki
                                )
                            }
                            else if id == oid::CE_EXTENDED_KEY_USAGE {
                                Self::take_extended_key_usage(
                                    content, &mut router_eku
                                )
                            }
                            else if id == oid::CE_BASIC_CONSTRAINTS {
                                Self::take_basic_constraints(
                                    content, &mut basic_ca
                                )
                            }
                            else if id == oid::CE_KEY_USAGE {
                                // Checked by the purpose helpers of the
                                // X.509 library; only dupes matter here.
                                if key_usage_seen {
                                    Err(content.content_err(
                                        "duplicate Key Usage extension"
                                    ))
                                }
                                else {
                                    key_usage_seen = true;
                                    content.skip_all()
                                }
                            }
                            else if id == oid::CE_CERTIFICATE_POLICIES {
                                if policies_seen {
                                    Err(content.content_err(
                                        "duplicate Certificate Policies \
                                         extension"
                                    ))
                                }
                                else {
                                    policies_seen = true;
                                    content.skip_all()
                                }
                            }
                            else if critical {
                                Err(content.content_err(
                                    "unexpected critical extension"
                                ))
                            }
                            else {
                                // RFC 5280 says we can ignore
                                // non-critical extensions we don't know.
                                content.skip_all()
                            }
                        }).map_err(DecodeError::convert)?;
                        Ok(())
                    })? { }
                    Ok(())
                }
            ))?;

            Ok(TbsCert {
                validity,
                spki,
                basic_ca,
                router_eku,
                ski,
                aki,
                crl_uri,
                ca_issuer,
                sia,
                ips: ips.unwrap_or_default(),
                asns: asns.unwrap_or_default(),
            })
        })
    }

    /// Parses the IP Resources extension.
    fn take_ip_resources<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        ips: &mut Option<IpResources>,
    ) -> Result<(), DecodeError<S::Error>> {
        if ips.is_some() {
            Err(cons.content_err("duplicate IP Resources extension"))
        }
        else {
            *ips = Some(IpResources::take_from(cons)?);
            Ok(())
        }
    }

    /// Parses the AS Resources extension.
    fn take_as_resources<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        asns: &mut Option<AsResources>,
    ) -> Result<(), DecodeError<S::Error>> {
        if asns.is_some() {
            Err(cons.content_err("duplicate AS Resources extension"))
        }
        else {
            *asns = Some(AsResources::take_from(cons)?);
            Ok(())
        }
    }

    /// Parses the Subject Information Access extension.
    fn take_subject_info_access<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        sia: &mut Option<Sia>,
    ) -> Result<(), DecodeError<S::Error>> {
        if sia.is_some() {
            Err(cons.content_err(
                "duplicate Subject Information Access extension"
            ))
        }
        else {
            *sia = Some(Sia::take_from(cons)?);
            Ok(())
        }
    }

    /// Parses the Basic Constraints extension.
    ///
    /// ```text
    /// BasicConstraints        ::= SEQUENCE {
    ///     cA                      BOOLEAN DEFAULT FALSE,
    ///     pathLenConstraint       INTEGER (0..MAX) OPTIONAL
    /// }
    /// ```
    ///
    /// The pathLenConstraint field must not be present.
    fn take_basic_constraints<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        basic_ca: &mut Option<bool>,
    ) -> Result<(), DecodeError<S::Error>> {
        if basic_ca.is_some() {
            Err(cons.content_err("duplicate Basic Constraints extension"))
        }
        else {
            cons.take_sequence(|cons| {
                *basic_ca = Some(cons.take_opt_bool()?.unwrap_or(false));
                if cons.take_opt_u64()?.is_some() {
                    Err(cons.content_err(
                        "pathLenConstraint in Basic Constraints extension"
                    ))
                }
                else {
                    Ok(())
                }
            })
        }
    }

    /// Parses the Subject Key Identifier extension.
    fn take_subject_key_identifier<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        ski: &mut Option<KeyIdentifier>,
    ) -> Result<(), DecodeError<S::Error>> {
        if ski.is_some() {
            Err(cons.content_err(
                "duplicate Subject Key Identifier extension"
            ))
        }
        else {
            *ski = Some(KeyIdentifier::take_from(cons)?);
            Ok(())
        }
    }

    /// Parses the Authority Key Identifier extension.
    ///
    /// RFC 6487 section 4.8.3 cuts the extension down to its `[0]` tagged
    /// keyIdentifier field; a certificate that also carries the issuer
    /// name or serial number fields is refused.
    fn take_authority_key_identifier<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        aki: &mut Option<KeyIdentifier>,
    ) -> Result<(), DecodeError<S::Error>> {
        if aki.is_some() {
            return Err(cons.content_err(
                "duplicate Authority Key Identifier extension"
            ))
        }
        let key = cons.take_sequence(|cons| {
            cons.take_value_if(Tag::CTX_0, KeyIdentifier::from_content)
        })?;
        *aki = Some(key);
        Ok(())
    }

    /// Parses the Extended Key Usage extension.
    ///
    /// All that matters here is whether `id-kp-bgpsec-router` is among
    /// the key purposes.
    fn take_extended_key_usage<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        router_eku: &mut Option<bool>,
    ) -> Result<(), DecodeError<S::Error>> {
        if router_eku.is_some() {
            Err(cons.content_err("duplicate Extended Key Usage extension"))
        }
        else {
            *router_eku = Some(cons.take_sequence(|cons| {
                let mut router = false;
                let mut empty = true;
                while let Some(id) = Oid::take_opt_from(cons)? {
                    if id == oid::KP_BGPSEC_ROUTER {
                        router = true;
                    }
                    empty = false;
                }
                if empty {
                    Err(cons.content_err(
                        "empty Extended Key Usage extension"
                    ))
                }
                else {
                    Ok(router)
                }
            })?);
            Ok(())
        }
    }

    /// Parses the CRL Distribution Points extension.
    ///
    /// RPKI certificates point at a single CRL. The extension therefore
    /// must hold exactly one DistributionPoint whose distributionPoint
    /// field is a fullName, and the rsync URI among those names becomes
    /// the CRL location.
    fn take_crl_distribution_points<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        crl_uri: &mut Option<uri::Rsync>,
    ) -> Result<(), DecodeError<S::Error>> {
        if crl_uri.is_some() {
            return Err(cons.content_err(
                "duplicate CRL Distribution Points extension"
            ))
        }
        let uri = cons.take_sequence(|cons| {
            cons.take_sequence(|cons| {
                // distributionPoint [0], carrying fullName [0].
                cons.take_constructed_if(Tag::CTX_0, |cons| {
                    cons.take_constructed_if(Tag::CTX_0, |cons| {
                        take_rsync_general_name(
                            cons,
                            "invalid CRL Distribution Points extension",
                        )
                    })
                })
            })
        })?;
        *crl_uri = Some(uri);
        Ok(())
    }

    /// Parses the Authority Information Access extension.
    ///
    /// The only access method allowed here is id-ad-caIssuers; its
    /// location names must include the rsync URI of the issuer
    /// certificate.
    fn take_authority_info_access<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        ca_issuer: &mut Option<uri::Rsync>,
    ) -> Result<(), DecodeError<S::Error>> {
        if ca_issuer.is_some() {
            return Err(cons.content_err(
                "duplicate Authority Information Access extension"
            ))
        }
        let uri = cons.take_sequence(|cons| {
            cons.take_sequence(|cons| {
                oid::AD_CA_ISSUERS.skip_if(cons)?;
                take_rsync_general_name(
                    cons,
                    "invalid Authority Information Access extension",
                )
            })
        })?;
        *ca_issuer = Some(uri);
        Ok(())
    }
}


//------------ Sia -----------------------------------------------------------

/// The Subject Information Access of a CA certificate.
///
/// RFC 6487 section 4.8.8 requires both the repository and manifest
/// locations, and each of the recognized access methods may appear at
/// most once. Unknown access methods are skipped. The repository URI must
/// be a byte-wise prefix of the manifest URI.
struct Sia {
    repo: uri::Rsync,
    mft: uri::Rsync,
    notify: Option<uri::Https>,
}

impl Sia {
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut repo = None;
        let mut mft = None;
        let mut notify = None;
        cons.take_sequence(|cons| {
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let id = Oid::take_from(cons)?;
                if id == oid::AD_CA_REPOSITORY {
                    if repo.is_some() {
                        return Err(cons.content_err(
                            "RFC 6487 section 4.8.8: SIA: \
                             CA repository already specified"
                        ))
                    }
                    repo = Some(take_access_uri(
                        cons, uri::Rsync::from_bytes,
                        "RFC 6487 section 4.8.8: bad CA repository URI",
                    )?);
                    Ok(())
                }
                else if id == oid::AD_RPKI_MANIFEST {
                    if mft.is_some() {
                        return Err(cons.content_err(
                            "RFC 6487 section 4.8.8: SIA: \
                             MFT location already specified"
                        ))
                    }
                    let uri = take_access_uri(
                        cons, uri::Rsync::from_bytes,
                        "RFC 6487 section 4.8.8: bad MFT location",
                    )?;
                    if !uri.ends_with(".mft") {
                        return Err(cons.content_err(
                            "RFC 6487 section 4.8.8: SIA: not an MFT file"
                        ))
                    }
                    mft = Some(uri);
                    Ok(())
                }
                else if id == oid::AD_RPKI_NOTIFY {
                    if notify.is_some() {
                        return Err(cons.content_err(
                            "RFC 6487 section 4.8.8: SIA: \
                             Notify location already specified"
                        ))
                    }
                    notify = Some(take_access_uri(
                        cons, uri::Https::from_bytes,
                        "RFC 8182 section 3.2: bad Notify URI",
                    )?);
                    Ok(())
                }
                else {
                    // Other access methods are of no interest here.
                    cons.skip_all()
                }
            })? { }
            Ok(())
        })?;
        let repo = repo.ok_or_else(|| {
            cons.content_err(
                "RFC 6487 section 4.8.8: SIA: missing caRepository"
            )
        })?;
        let mft = mft.ok_or_else(|| {
            cons.content_err(
                "RFC 6487 section 4.8.8: SIA: missing rpkiManifest"
            )
        })?;
        if !repo.is_prefix_of(&mft) {
            return Err(cons.content_err(
                "RFC 6487 section 4.8.8: SIA: conflicting URIs \
                 for caRepository and rpkiManifest"
            ))
        }
        Ok(Sia { repo, mft, notify })
    }
}


//------------ Helpers for Decoding ------------------------------------------

/// Parses the URI of an accessDescription.
///
/// ```text
/// AccessDescription  ::=  SEQUENCE {
///         accessMethod          OBJECT IDENTIFIER,
///         accessLocation        GeneralName  }
/// ```
///
/// The location must be a uniformResourceIdentifier general name that
/// passes the given URI constructor.
fn take_access_uri<S: decode::Source, F, T, E>(
    cons: &mut decode::Constructed<S>,
    op: F,
    error_msg: &'static str,
) -> Result<T, DecodeError<S::Error>>
where F: FnOnce(Bytes) -> Result<T, E> {
    cons.take_value_if(Tag::CTX_6, |content| {
        let uri = Ia5String::from_content(content)?;
        op(uri.into_bytes()).map_err(|_| content.content_err(error_msg))
    })
}

/// Picks the rsync URI out of the content of a GeneralNames sequence.
///
/// Both the AIA and CRL distribution point extensions boil down to a list
/// of uniformResourceIdentifier names of which exactly one must be a
/// well-formed rsync URI. Names holding URIs of other schemes are passed
/// over; a second rsync URI, or none at all, is an error.
fn take_rsync_general_name<S: decode::Source>(
    cons: &mut decode::Constructed<S>,
    error_msg: &'static str,
) -> Result<uri::Rsync, DecodeError<S::Error>> {
    let mut found = None;
    while let Some(()) = cons.take_opt_value_if(Tag::CTX_6, |content| {
        let name = Ia5String::from_content(content)?;
        match uri::Rsync::from_bytes(name.into_bytes()) {
            Ok(uri) => {
                if found.replace(uri).is_some() {
                    return Err(content.content_err(error_msg))
                }
                Ok(())
            }
            Err(_) => Ok(()),
        }
    })? { }
    found.ok_or_else(|| cons.content_err(error_msg))
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::io;
    use bcder::encode;
    use bcder::{BitString, Captured, ConstOid, Mode, Tag};
    use bcder::encode::PrimitiveContent;
    use super::*;

    //--- DER construction helpers, no signing involved.

    #[derive(Clone, Debug)]
    struct DerData(Bytes);

    impl DerData {
        fn build(values: impl encode::Values) -> Self {
            DerData(values.to_captured(Mode::Der).into_bytes())
        }
    }

    impl encode::Values for DerData {
        fn encoded_len(&self, _mode: Mode) -> usize {
            self.0.len()
        }

        fn write_encoded<W: io::Write>(
            &self, _mode: Mode, target: &mut W
        ) -> Result<(), io::Error> {
            target.write_all(&self.0)
        }
    }

    fn empty_name() -> DerData {
        DerData::build(encode::sequence(encode::Nothing))
    }

    fn rsa_alg() -> DerData {
        DerData::build(encode::sequence((
            oid::SHA256_WITH_RSA_ENCRYPTION.encode(), ().encode()
        )))
    }

    fn rsa_spki() -> DerData {
        DerData::build(encode::sequence((
            encode::sequence((oid::RSA_ENCRYPTION.encode(), ().encode())),
            BitString::new(
                0,
                Bytes::from_static(b"\x30\x06\x02\x01\x2a\x02\x01\x03")
            ).encode(),
        )))
    }

    fn ec_spki() -> DerData {
        DerData::build(encode::sequence((
            encode::sequence((
                oid::EC_PUBLIC_KEY.encode(), oid::SECP256R1.encode()
            )),
            BitString::new(0, Bytes::from_static(b"\x04\x01\x02")).encode(),
        )))
    }

    fn validity() -> DerData {
        DerData::build(encode::sequence((
            b"250101000000Z".encode_as(Tag::UTC_TIME),
            b"260801120000Z".encode_as(Tag::UTC_TIME),
        )))
    }

    fn ext(id: ConstOid, critical: bool, content: DerData) -> DerData {
        DerData::build(encode::sequence((
            id.encode(),
            if critical { Some(true.encode()) } else { None },
            OctetString::new(content.0).encode(),
        )))
    }

    fn basic_ca_ext() -> DerData {
        ext(
            oid::CE_BASIC_CONSTRAINTS, true,
            DerData::build(encode::sequence(true.encode()))
        )
    }

    fn ski_ext(ki: &'static [u8; 20]) -> DerData {
        ext(
            oid::CE_SUBJECT_KEY_IDENTIFIER, false,
            DerData::build(OctetString::encode_slice(ki.as_ref()))
        )
    }

    fn aki_ext(ki: &'static [u8; 20]) -> DerData {
        ext(
            oid::CE_AUTHORITY_KEY_IDENTIFIER, false,
            DerData::build(encode::sequence(
                ki.as_ref().encode_as(Tag::CTX_0)
            ))
        )
    }

    fn uri_name(uri: &'static str) -> DerData {
        DerData::build(
            OctetString::new(
                Bytes::from_static(uri.as_bytes())
            ).encode_as(Tag::CTX_6)
        )
    }

    fn sia_ext(
        repo: &'static str, mft: &'static str, notify: Option<&'static str>,
    ) -> DerData {
        ext(
            oid::PE_SUBJECT_INFO_ACCESS, false,
            DerData::build(encode::sequence((
                encode::sequence((
                    oid::AD_CA_REPOSITORY.encode(), uri_name(repo)
                )),
                encode::sequence((
                    oid::AD_RPKI_MANIFEST.encode(), uri_name(mft)
                )),
                notify.map(|notify| encode::sequence((
                    oid::AD_RPKI_NOTIFY.encode(), uri_name(notify)
                ))),
            )))
        )
    }

    fn aia_ext(uri: &'static str) -> DerData {
        ext(
            oid::PE_AUTHORITY_INFO_ACCESS, false,
            DerData::build(encode::sequence(encode::sequence((
                oid::AD_CA_ISSUERS.encode(), uri_name(uri)
            ))))
        )
    }

    fn crl_ext(uri: &'static str) -> DerData {
        ext(
            oid::CE_CRL_DISTRIBUTION_POINTS, false,
            DerData::build(encode::sequence(encode::sequence(
                encode::sequence_as(Tag::CTX_0,
                    encode::sequence_as(Tag::CTX_0, uri_name(uri))
                )
            )))
        )
    }

    fn router_eku_ext() -> DerData {
        ext(
            oid::CE_EXTENDED_KEY_USAGE, false,
            DerData::build(encode::sequence(oid::KP_BGPSEC_ROUTER.encode()))
        )
    }

    fn ip_ext_v4(bits: &'static [u8]) -> DerData {
        ext(
            oid::PE_IP_ADDR_BLOCK, true,
            DerData::build(encode::sequence(encode::sequence((
                OctetString::encode_slice(b"\x00\x01"),
                encode::sequence(bits.encode_as(Tag::BIT_STRING)),
            ))))
        )
    }

    fn as_ext(ids: &[u32]) -> DerData {
        ext(
            oid::PE_AUTONOMOUS_SYS_IDS, true,
            DerData::build(encode::sequence(
                encode::sequence_as(Tag::CTX_0, encode::sequence(
                    encode::iter(ids.iter().map(|id| id.encode()))
                ))
            ))
        )
    }

    fn cert_der(spki: DerData, exts: &[DerData]) -> Bytes {
        let tbs = DerData::build(encode::sequence((
            encode::sequence_as(Tag::CTX_0, 2u8.encode()),
            12u8.encode(),
            rsa_alg(),
            empty_name(),
            validity(),
            empty_name(),
            spki,
            encode::sequence_as(
                Tag::CTX_3, encode::sequence(encode::iter(exts.iter()))
            ),
        )));
        Captured::from_values(Mode::Der, encode::sequence((
            tbs,
            rsa_alg(),
            BitString::new(0, Bytes::from_static(b"\x2a")).encode(),
        ))).into_bytes()
    }

    const TA_KI: &[u8; 20] = b"aaaaaaaaaaaaaaaaaaaa";
    const CA_KI: &[u8; 20] = b"bbbbbbbbbbbbbbbbbbbb";
    const EE_KI: &[u8; 20] = b"cccccccccccccccccccc";

    fn ta_cert() -> (Bytes, Bytes) {
        let spki = rsa_spki();
        let key = spki.0.clone();
        let der = cert_der(spki, &[
            basic_ca_ext(),
            ski_ext(TA_KI),
            sia_ext(
                "rsync://example.com/repo/",
                "rsync://example.com/repo/x.mft",
                Some("https://example.com/notify.xml"),
            ),
            ip_ext_v4(b"\x00\x0a"),
            as_ext(&[64500]),
        ]);
        (der, key)
    }

    fn ca_cert() -> Bytes {
        cert_der(rsa_spki(), &[
            basic_ca_ext(),
            ski_ext(CA_KI),
            aki_ext(TA_KI),
            aia_ext("rsync://example.com/repo/ta.cer"),
            crl_ext("rsync://example.com/repo/ta.crl"),
            sia_ext(
                "rsync://example.com/repo/ca/",
                "rsync://example.com/repo/ca/ca.mft",
                None,
            ),
            ip_ext_v4(b"\x00\x0a\x01"),
            as_ext(&[64500]),
        ])
    }

    fn router_cert() -> Bytes {
        cert_der(ec_spki(), &[
            ski_ext(EE_KI),
            aki_ext(CA_KI),
            aia_ext("rsync://example.com/repo/ca.cer"),
            crl_ext("rsync://example.com/repo/ca/ca.crl"),
            router_eku_ext(),
            as_ext(&[64500]),
        ])
    }

    //--- The actual tests.

    #[test]
    fn parse_ta() {
        let (der, key) = ta_cert();
        let cert = ta_parse("ta.cer", der, &key).unwrap();
        assert_eq!(
            cert.ski(),
            &KeyIdentifier::try_from(TA_KI.as_ref()).unwrap()
        );
        assert_eq!(cert.aki(), None);
        assert_eq!(cert.purpose(), CertPurpose::Ca);
        assert_eq!(cert.expires(), Time::utc(2026, 8, 1, 12, 0, 0));
        assert_eq!(
            cert.mft().unwrap().as_str(),
            "rsync://example.com/repo/x.mft"
        );
        assert_eq!(
            cert.repo().unwrap().as_str(), "rsync://example.com/repo/"
        );
        assert_eq!(
            cert.notify().unwrap().as_str(),
            "https://example.com/notify.xml"
        );
        assert_eq!(cert.aia(), None);
        assert_eq!(cert.crl(), None);
        assert_eq!(cert.ips().len(), 1);
        assert_eq!(cert.asns().len(), 1);
        assert_eq!(cert.pubkey(), None);
        assert!(!cert.valid());
        assert!(!cert.x509().is_empty());
    }

    #[test]
    fn ta_rejects_wrong_tal_key() {
        let (der, _) = ta_cert();
        assert!(ta_parse("ta.cer", der, &ec_spki().0).is_err());
    }

    #[test]
    fn parse_ca() {
        let cert = cert_parse("ca.cer", ca_cert()).unwrap();
        assert_eq!(cert.purpose(), CertPurpose::Ca);
        assert_eq!(
            cert.aki(),
            Some(&KeyIdentifier::try_from(TA_KI.as_ref()).unwrap())
        );
        assert_eq!(
            cert.aia().unwrap().as_str(),
            "rsync://example.com/repo/ta.cer"
        );
        assert_eq!(
            cert.crl().unwrap().as_str(),
            "rsync://example.com/repo/ta.crl"
        );
        let entry = cert.ips().iter().next().unwrap();
        assert_eq!(
            entry.display().to_string(), "10.1.0.0--10.1.255.255"
        );
    }

    #[test]
    fn parse_router() {
        let cert = cert_parse("router.cer", router_cert()).unwrap();
        assert_eq!(cert.purpose(), CertPurpose::BgpsecRouter);
        assert_eq!(
            cert.pubkey(), Some(base64::encode(&ec_spki().0).as_str())
        );
        assert!(cert.ips().is_empty());
        assert_eq!(cert.mft(), None);
    }

    #[test]
    fn ta_must_not_carry_aia() {
        let spki = rsa_spki();
        let key = spki.0.clone();
        let der = cert_der(spki, &[
            basic_ca_ext(),
            ski_ext(TA_KI),
            aia_ext("rsync://example.com/repo/ta.cer"),
            sia_ext(
                "rsync://example.com/repo/",
                "rsync://example.com/repo/x.mft",
                None,
            ),
            ip_ext_v4(b"\x00\x0a"),
        ]);
        assert!(ta_parse("ta.cer", der, &key).is_err());
    }

    #[test]
    fn non_ta_needs_aki_and_aia() {
        // The TA profile cert fails the plain parse entry point.
        let (der, _) = ta_cert();
        assert!(cert_parse("ca.cer", der).is_err());
    }

    #[test]
    fn ca_needs_sia() {
        let der = cert_der(rsa_spki(), &[
            basic_ca_ext(),
            ski_ext(CA_KI),
            aki_ext(TA_KI),
            aia_ext("rsync://example.com/repo/ta.cer"),
            ip_ext_v4(b"\x00\x0a"),
        ]);
        assert!(cert_parse("ca.cer", der).is_err());
    }

    #[test]
    fn ca_needs_resources() {
        let der = cert_der(rsa_spki(), &[
            basic_ca_ext(),
            ski_ext(CA_KI),
            aki_ext(TA_KI),
            aia_ext("rsync://example.com/repo/ta.cer"),
            sia_ext(
                "rsync://example.com/repo/",
                "rsync://example.com/repo/x.mft",
                None,
            ),
        ]);
        assert!(cert_parse("ca.cer", der).is_err());
    }

    #[test]
    fn sia_repo_must_prefix_mft() {
        let der = cert_der(rsa_spki(), &[
            basic_ca_ext(),
            ski_ext(CA_KI),
            aki_ext(TA_KI),
            aia_ext("rsync://example.com/repo/ta.cer"),
            sia_ext(
                "rsync://example.com/repo/",
                "rsync://other.example.com/x.mft",
                None,
            ),
            ip_ext_v4(b"\x00\x0a"),
        ]);
        assert!(cert_parse("ca.cer", der).is_err());
    }

    #[test]
    fn router_must_not_carry_sia_or_ips() {
        let der = cert_der(ec_spki(), &[
            ski_ext(EE_KI),
            aki_ext(CA_KI),
            aia_ext("rsync://example.com/repo/ca.cer"),
            router_eku_ext(),
            sia_ext(
                "rsync://example.com/repo/",
                "rsync://example.com/repo/x.mft",
                None,
            ),
            as_ext(&[64500]),
        ]);
        assert!(cert_parse("router.cer", der).is_err());

        let der = cert_der(ec_spki(), &[
            ski_ext(EE_KI),
            aki_ext(CA_KI),
            aia_ext("rsync://example.com/repo/ca.cer"),
            router_eku_ext(),
            ip_ext_v4(b"\x00\x0a"),
            as_ext(&[64500]),
        ]);
        assert!(cert_parse("router.cer", der).is_err());
    }

    #[test]
    fn duplicate_extension_rejected() {
        let der = cert_der(rsa_spki(), &[
            basic_ca_ext(),
            ski_ext(TA_KI),
            ski_ext(TA_KI),
            sia_ext(
                "rsync://example.com/repo/",
                "rsync://example.com/repo/x.mft",
                None,
            ),
            ip_ext_v4(b"\x00\x0a"),
        ]);
        assert!(cert_parse("dup.cer", der).is_err());
    }

    #[test]
    fn unknown_critical_extension_rejected() {
        let der = cert_der(rsa_spki(), &[
            basic_ca_ext(),
            ski_ext(TA_KI),
            ext(
                oid::AD_CA_ISSUERS, // not an extension OID
                true,
                DerData::build(encode::sequence(encode::Nothing)),
            ),
            sia_ext(
                "rsync://example.com/repo/",
                "rsync://example.com/repo/x.mft",
                None,
            ),
            ip_ext_v4(b"\x00\x0a"),
        ]);
        assert!(cert_parse("crit.cer", der).is_err());
    }

    #[test]
    fn pipe_round_trip() {
        let (der, key) = ta_cert();
        let mut cert = ta_parse("ta.cer", der, &key).unwrap();
        let tree = crate::validate::AuthTree::new();
        assert!(crate::validate::valid_ta(
            "ta.cer", &tree, &mut cert, "example"
        ));

        let mut buf = Vec::new();
        cert.write(&mut buf).unwrap();
        let read = Cert::read(&mut buf.as_slice()).unwrap();

        assert_eq!(read.valid(), cert.valid());
        assert_eq!(read.expires(), cert.expires());
        assert_eq!(read.purpose(), cert.purpose());
        assert_eq!(read.ips(), cert.ips());
        assert_eq!(read.asns(), cert.asns());
        assert_eq!(read.mft(), cert.mft());
        assert_eq!(read.notify(), cert.notify());
        assert_eq!(read.repo(), cert.repo());
        assert_eq!(read.crl(), cert.crl());
        assert_eq!(read.aia(), cert.aia());
        assert_eq!(read.aki(), cert.aki());
        assert_eq!(read.ski(), cert.ski());
        assert_eq!(read.tal(), cert.tal());
        assert_eq!(read.pubkey(), cert.pubkey());
    }

    #[test]
    fn pipe_round_trip_router() {
        let cert = cert_parse("router.cer", router_cert()).unwrap();
        let mut buf = Vec::new();
        cert.write(&mut buf).unwrap();
        let read = Cert::read(&mut buf.as_slice()).unwrap();
        assert_eq!(read.purpose(), CertPurpose::BgpsecRouter);
        assert_eq!(read.pubkey(), cert.pubkey());
        assert_eq!(read.mft(), None);
    }

    #[test]
    fn pipe_read_requires_manifest_for_ca() {
        let ki = KeyIdentifier::try_from(TA_KI.as_ref()).unwrap();
        let cert = Cert::new(ki, CertPurpose::Ca, Time::now());
        let mut buf = Vec::new();
        cert.write(&mut buf).unwrap();
        assert!(Cert::read(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn pipe_read_rejects_garbage() {
        assert!(Cert::read(&mut b"\x07".as_ref()).is_err());
        assert!(Cert::read(&mut [0u8; 64].as_ref()).is_err());
    }
}
