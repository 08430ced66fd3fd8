use std::io::{Read, Seek};

use crate::byte_reader::ByteReader;
use crate::error::Result;

/// Reads the config format's variable-length unsigned integer.
///
/// One byte `b0` if its high bit is clear; otherwise a second byte `b1`
/// follows and the value is `b0 + (b1 - 1) * 128` (note `b0` contributes
/// its full value, high bit included).
pub fn read_varint<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<u32> {
    let b0 = reader.read_u8()?;
    let mut number = b0 as i32;
    if b0 & 0x80 != 0 {
        let extra = reader.read_u8()?;
        number += (extra as i32 - 1) * 0x80;
    }
    Ok(number as u32)
}
