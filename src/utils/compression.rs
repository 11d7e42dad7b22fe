//! Writers for the compressed integer encodings of ECMA-335 II.23.2.
//!
//! These are the inverse of [`crate::Parser::read_compressed_uint`],
//! [`crate::Parser::read_compressed_int`] and [`crate::Parser::read_compressed_token`]. The
//! shortest valid encoding is always produced, so a translated token or a reduced parameter
//! count may occupy fewer bytes than the value it replaces.

use crate::{
    metadata::{tables::CodedIndexType, token::Token},
    Error, Result,
};

/// Largest value representable by a compressed unsigned integer
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Number of bytes the compressed encoding of `value` occupies
#[must_use]
pub fn compressed_uint_size(value: u32) -> usize {
    if value <= 0x7F {
        1
    } else if value <= 0x3FFF {
        2
    } else {
        4
    }
}

/// Append the compressed encoding of `value` to `buffer`
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match compressed_uint_size(value) {
        1 => buffer.push(value as u8),
        2 => buffer.extend_from_slice(&[0x80 | (value >> 8) as u8, value as u8]),
        _ => {
            if value > MAX_COMPRESSED_UINT {
                return Err(Error::InvalidArgument(format!(
                    "0x{:x} exceeds the compressed integer range",
                    value
                )));
            }
            buffer.extend_from_slice(&[
                0xC0 | (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            ]);
        }
    }

    Ok(())
}

/// Append the compressed signed encoding of `value` to `buffer`
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] if `value` lies outside the 29-bit signed range.
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    let sign = u32::from(value < 0);
    let rotated = (value as u32) << 1;

    if (-0x40..=0x3F).contains(&value) {
        buffer.push(((rotated & 0x7F) | sign) as u8);
    } else if (-0x2000..=0x1FFF).contains(&value) {
        let encoded = (rotated & 0x3FFF) | sign;
        buffer.extend_from_slice(&[0x80 | (encoded >> 8) as u8, encoded as u8]);
    } else if (-0x1000_0000..=0x0FFF_FFFF).contains(&value) {
        let encoded = (rotated & 0x1FFF_FFFF) | sign;
        buffer.extend_from_slice(&[
            0xC0 | (encoded >> 24) as u8,
            (encoded >> 16) as u8,
            (encoded >> 8) as u8,
            encoded as u8,
        ]);
    } else {
        return Err(Error::InvalidArgument(format!(
            "{} exceeds the compressed signed integer range",
            value
        )));
    }

    Ok(())
}

/// Append `token` as a compressed `TypeDefOrRef` coded index
///
/// # Errors
/// Returns [`crate::Error::InvalidArgument`] if the token is not a `TypeDef`, `TypeRef` or
/// `TypeSpec`.
pub fn write_compressed_token(token: Token, buffer: &mut Vec<u8>) -> Result<()> {
    let coded_index = CodedIndexType::TypeDefOrRef.encode(token)?;
    write_compressed_uint(coded_index, buffer)
}
