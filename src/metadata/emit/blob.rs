//! Custom-attribute blob encoding.
//!
//! Implements the ECMA-335 §II.23.3 `CustomAttrib` binary format for the
//! attribute records this crate emits: a `0x0001` prolog, the fixed arguments
//! in constructor-parameter order, and a named-argument count of zero (this
//! crate never emits named arguments).
//!
//! Fixed-argument encodings:
//! - `bool` / `byte` - one byte
//! - `int32` - four bytes little-endian
//! - string - compressed length prefix + UTF-8 bytes, `0xFF` for null
//! - SZ arrays - `u32` little-endian element count, then the elements
//!
//! The compressed length prefix is the §II.23.2 packed unsigned integer
//! (1, 2, or 4 bytes depending on magnitude, capped at `0x1FFF_FFFF`).

use crate::Result;

/// The two-byte prolog every custom-attribute blob starts with.
pub const CA_PROLOG: u16 = 0x0001;

/// Marker byte for a null string argument.
pub const CA_NULL_STRING: u8 = 0xFF;

/// A fixed constructor argument of an emitted attribute record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaValue {
    /// A `bool` argument
    Bool(bool),
    /// A `byte` argument
    Byte(u8),
    /// An `int32` argument (also used for enum-typed arguments)
    Int32(i32),
    /// A string argument, `None` for null
    Str(Option<String>),
    /// A `byte[]` argument
    ByteArray(Vec<u8>),
    /// A `string[]` argument with possibly-null elements
    StringArray(Vec<Option<String>>),
}

/// Writes a §II.23.2 compressed unsigned integer.
///
/// # Errors
///
/// Returns an error for values above `0x1FFF_FFFF`, which the format cannot
/// represent.
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match value {
        0..=0x7F => buffer.push(value as u8),
        0x80..=0x3FFF => {
            buffer.push(0x80 | (value >> 8) as u8);
            buffer.push((value & 0xFF) as u8);
        }
        0x4000..=0x1FFF_FFFF => {
            buffer.push(0xC0 | (value >> 24) as u8);
            buffer.push(((value >> 16) & 0xFF) as u8);
            buffer.push(((value >> 8) & 0xFF) as u8);
            buffer.push((value & 0xFF) as u8);
        }
        _ => {
            return Err(malformed_error!(
                "Value 0x{:08X} exceeds the compressed integer range",
                value
            ))
        }
    }
    Ok(())
}

/// Writes a `SerString`: compressed UTF-8 length plus bytes, `0xFF` for null.
fn write_ser_string(value: Option<&str>, buffer: &mut Vec<u8>) -> Result<()> {
    match value {
        None => buffer.push(CA_NULL_STRING),
        Some(text) => {
            let bytes = text.as_bytes();
            let length = u32::try_from(bytes.len())
                .map_err(|_| malformed_error!("String argument of {} bytes", bytes.len()))?;
            write_compressed_uint(length, buffer)?;
            buffer.extend_from_slice(bytes);
        }
    }
    Ok(())
}

fn write_value(value: &CaValue, buffer: &mut Vec<u8>) -> Result<()> {
    match value {
        CaValue::Bool(flag) => buffer.push(u8::from(*flag)),
        CaValue::Byte(byte) => buffer.push(*byte),
        CaValue::Int32(number) => buffer.extend_from_slice(&number.to_le_bytes()),
        CaValue::Str(text) => write_ser_string(text.as_deref(), buffer)?,
        CaValue::ByteArray(bytes) => {
            let count = u32::try_from(bytes.len())
                .map_err(|_| malformed_error!("Byte array of {} elements", bytes.len()))?;
            buffer.extend_from_slice(&count.to_le_bytes());
            buffer.extend_from_slice(bytes);
        }
        CaValue::StringArray(strings) => {
            let count = u32::try_from(strings.len())
                .map_err(|_| malformed_error!("String array of {} elements", strings.len()))?;
            buffer.extend_from_slice(&count.to_le_bytes());
            for element in strings {
                write_ser_string(element.as_deref(), buffer)?;
            }
        }
    }
    Ok(())
}

/// Encodes a complete custom-attribute blob for the given fixed arguments.
///
/// # Arguments
///
/// * `args` - Fixed arguments in constructor-parameter order, empty for a
///   parameterless constructor
///
/// # Errors
///
/// Returns an error when a string or array argument exceeds the format's
/// length limits.
pub fn encode_attribute_blob(args: &[CaValue]) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(8);
    buffer.extend_from_slice(&CA_PROLOG.to_le_bytes());
    for value in args {
        write_value(value, &mut buffer)?;
    }
    // named-argument count; this crate never writes named arguments
    buffer.extend_from_slice(&0u16.to_le_bytes());
    Ok(buffer)
}
