//! Variable-length integer codec (C1) and the length-prefixed UTF-16 string
//! codec built on top of it.
//!
//! A non-negative integer is written 7 payload bits per byte, low-order bits
//! first; the high bit of every byte but the last is set. Reading stops at
//! the first byte whose high bit is clear. This is the same shape as the
//! "multibyte" integers in the container this crate's callers consume.

use std::io::{Read, Write};

use crate::error::{CoreError, CoreResult};

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7f;
const PAYLOAD_BITS: u32 = 7;

/// Writes `value` as a self-delimiting multibyte integer.
pub fn write_uint<W: Write>(w: &mut W, value: u32) -> CoreResult<()> {
    let mut v = value;
    loop {
        let byte = (v & u32::from(PAYLOAD_MASK)) as u8;
        v >>= PAYLOAD_BITS;
        if v == 0 {
            w.write_all(&[byte])?;
            return Ok(());
        }
        w.write_all(&[byte | CONTINUATION])?;
    }
}

/// Reads a multibyte integer written by [`write_uint`].
///
/// Fails with [`CoreError::Truncated`] on EOF mid-integer, or
/// [`CoreError::VarintOverflow`] if the decoded value would not fit in
/// `u32` (more than 5 continuation groups carrying non-zero high bits).
pub fn read_uint<R: Read>(r: &mut R) -> CoreResult<u32> {
    let mut result: u32 = 0;
    let mut shift: u32 = 0;
    let mut at: u64 = 0;
    loop {
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte).map_err(|_| CoreError::Truncated { needed: 1, at })?;
        at += 1;
        let payload = u32::from(byte[0] & PAYLOAD_MASK);
        if shift >= 32 || (shift == 28 && payload > 0x0f) {
            #[cfg(feature = "trace")]
            log::debug!("varint overflow at offset {at}");
            return Err(CoreError::VarintOverflow);
        }
        result |= payload << shift;
        if byte[0] & CONTINUATION == 0 {
            return Ok(result);
        }
        shift += PAYLOAD_BITS;
    }
}

/// Writes `s` as a length-prefixed sequence of UTF-16 code units, each code
/// unit itself encoded with [`write_uint`] (matching the wire format
/// described in the container spec).
pub fn write_u16string<W: Write>(w: &mut W, s: &str) -> CoreResult<()> {
    let units: Vec<u16> = s.encode_utf16().collect();
    write_uint(w, units.len() as u32)?;
    for unit in units {
        write_uint(w, u32::from(unit))?;
    }
    Ok(())
}

/// Reads a string written by [`write_u16string`].
pub fn read_u16string<R: Read>(r: &mut R) -> CoreResult<String> {
    let len = read_uint(r)? as usize;
    let mut units = Vec::with_capacity(len);
    for _ in 0..len {
        let v = read_uint(r)?;
        if v > u32::from(u16::MAX) {
            return Err(CoreError::InvalidUtf16);
        }
        units.push(v as u16);
    }
    String::from_utf16(&units).map_err(|_| CoreError::InvalidUtf16)
}
