use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{OfpError, Result};

/// Maximum length of a NUL-terminated string this crate will buffer before
/// giving up. Matches the historical `tmp[10240]` stack buffer.
pub const MAX_INLINE_STRING: usize = 10 * 1024;

/// A positional little-endian reader over any `Read + Seek` stream.
///
/// Mirrors the teacher's `BufReaderExtension` trait, generalized from
/// `BufReader<File>` to an arbitrary reader since both decoders in this
/// crate operate on an in-memory `Cursor<Vec<u8>>`.
pub struct ByteReader<R> {
    inner: R,
}

impl<R: Read + Seek> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        ByteReader { inner }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        map_eof(self.inner.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        map_eof(self.inner.read_u16::<LittleEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        map_eof(self.inner.read_u32::<LittleEndian>())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        map_eof(self.inner.read_i32::<LittleEndian>())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        map_eof(self.inner.read_f32::<LittleEndian>())
    }

    /// Like [`Self::read_u8`] but maps a clean end-of-stream to `Ok(None)`
    /// instead of an error, for formats that terminate on plain EOF.
    pub fn read_u8_opt(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        map_eof(self.inner.read_exact(buf))
    }

    /// Reads bytes up to (and consuming) the next `0x00`, bounded by
    /// [`MAX_INLINE_STRING`].
    pub fn read_cstring(&mut self) -> Result<Vec<u8>> {
        let start = self.tell()?;
        let mut out = Vec::new();
        loop {
            if out.len() >= MAX_INLINE_STRING {
                return Err(OfpError::MalformedString {
                    offset: start,
                    reason: "string exceeds maximum inline length",
                });
            }
            let byte = self.read_u8()?;
            if byte == 0 {
                return Ok(out);
            }
            out.push(byte);
        }
    }

    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::Current(0))?)
    }

    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Distinguishes a clean end-of-stream from other I/O failures, per the
/// stream contract (end-of-stream during any read is `UnexpectedEof`, not
/// a generic transport error).
fn map_eof<T>(result: std::io::Result<T>) -> Result<T> {
    result.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            OfpError::UnexpectedEof
        } else {
            OfpError::Io(e)
        }
    })
}
