//! Length-checked primitives for the parser-to-validator pipe.
//!
//! The parser worker runs untrusted; the byte stream it hands to the
//! validator is a trust boundary. Nothing read here may be used to size an
//! allocation before it has been checked against a hard cap, and every
//! malformed field turns into an `InvalidData` error so the validator can
//! drop the object and carry on.

use std::io;
use std::io::{Read, Write};

/// The longest string accepted on the read side.
pub const MAX_STRING_LEN: u32 = 4096;

/// The largest resource entry count accepted on the read side.
pub const MAX_ENTRY_COUNT: u32 = 1 << 20;

pub fn data_err(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

pub fn write_u8<W: Write>(target: &mut W, value: u8) -> Result<(), io::Error> {
    target.write_all(&[value])
}

pub fn write_u32<W: Write>(
    target: &mut W, value: u32
) -> Result<(), io::Error> {
    target.write_all(&value.to_be_bytes())
}

pub fn write_i64<W: Write>(
    target: &mut W, value: i64
) -> Result<(), io::Error> {
    target.write_all(&value.to_be_bytes())
}

/// Writes an optional, length-prefixed string.
///
/// Absent strings travel as length zero, the convention the reader relies
/// on throughout.
pub fn write_opt_bytes<W: Write>(
    target: &mut W, value: Option<&[u8]>
) -> Result<(), io::Error> {
    match value {
        Some(value) => {
            if value.len() > MAX_STRING_LEN as usize {
                return Err(data_err("string too long for pipe"))
            }
            write_u32(target, value.len() as u32)?;
            target.write_all(value)
        }
        None => write_u32(target, 0)
    }
}

pub fn read_u8<R: Read>(source: &mut R) -> Result<u8, io::Error> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u32<R: Read>(source: &mut R) -> Result<u32, io::Error> {
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

pub fn read_i64<R: Read>(source: &mut R) -> Result<i64, io::Error> {
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

pub fn read_addr_bytes<R: Read>(
    source: &mut R
) -> Result<[u8; 16], io::Error> {
    let mut buf = [0u8; 16];
    source.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads a resource entry count, bounded by [`MAX_ENTRY_COUNT`].
pub fn read_count<R: Read>(source: &mut R) -> Result<u32, io::Error> {
    let count = read_u32(source)?;
    if count > MAX_ENTRY_COUNT {
        return Err(data_err("entry count too large"))
    }
    Ok(count)
}

/// Reads an optional, length-prefixed string.
pub fn read_opt_bytes<R: Read>(
    source: &mut R
) -> Result<Option<Vec<u8>>, io::Error> {
    let len = read_u32(source)?;
    if len == 0 {
        return Ok(None)
    }
    if len > MAX_STRING_LEN {
        return Err(data_err("string too long"))
    }
    let mut buf = vec![0u8; len as usize];
    source.read_exact(&mut buf)?;
    Ok(Some(buf))
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn opt_bytes_round_trip() {
        let mut buf = Vec::new();
        write_opt_bytes(&mut buf, Some(b"hello")).unwrap();
        write_opt_bytes(&mut buf, None).unwrap();
        let mut source = buf.as_slice();
        assert_eq!(
            read_opt_bytes(&mut source).unwrap().as_deref(),
            Some(b"hello".as_ref())
        );
        assert_eq!(read_opt_bytes(&mut source).unwrap(), None);
    }

    #[test]
    fn oversized_string_rejected() {
        let mut buf = Vec::new();
        write_u32(&mut buf, MAX_STRING_LEN + 1).unwrap();
        buf.extend_from_slice(&[0u8; 16]);
        assert!(read_opt_bytes(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn oversized_count_rejected() {
        let mut buf = Vec::new();
        write_u32(&mut buf, MAX_ENTRY_COUNT + 1).unwrap();
        assert!(read_count(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn truncated_input_rejected() {
        assert!(read_u32(&mut b"\x00\x00".as_ref()).is_err());
        let mut buf = Vec::new();
        write_u32(&mut buf, 5).unwrap();
        buf.extend_from_slice(b"ab");
        assert!(read_opt_bytes(&mut buf.as_slice()).is_err());
    }
}
