use std::collections::HashMap;
use std::io::{Read, Seek};
use std::rc::Rc;

use crate::byte_reader::ByteReader;
use crate::error::Result;
use crate::varint::read_varint;

/// Session-local, grow-only id -> string memoization for the config format.
///
/// Grounded on `StringStream`/`BlobStream` from the teacher, both of which
/// are `HashMap<u32, _>` pools populated while scanning a stream; unlike
/// those (which parse an entire heap up front) this pool fills lazily: the
/// first reference to an id is followed inline by its bytes, later
/// references are bare ids.
pub struct StringPool {
    strings: HashMap<u32, Rc<[u8]>>,
}

impl StringPool {
    pub fn new() -> Self {
        StringPool {
            strings: HashMap::new(),
        }
    }

    /// Reads a pooled string: a VarInt id, followed (on first occurrence)
    /// by its NUL-terminated bytes.
    pub fn read_indexed<R: Read + Seek>(&mut self, reader: &mut ByteReader<R>) -> Result<Rc<[u8]>> {
        let id = read_varint(reader)?;
        if let Some(existing) = self.strings.get(&id) {
            log::trace!("string pool hit for id {id}");
            return Ok(existing.clone());
        }
        log::trace!("string pool miss for id {id}, reading inline body");
        let bytes: Rc<[u8]> = reader.read_cstring()?.into();
        self.strings.insert(id, bytes.clone());
        Ok(bytes)
    }

    /// Reads a NUL-terminated string with no pool interaction.
    pub fn read_inline<R: Read + Seek>(&self, reader: &mut ByteReader<R>) -> Result<Vec<u8>> {
        reader.read_cstring()
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}
