use std::io::{Read, Seek};

use crate::byte_reader::ByteReader;
use crate::error::Result;

use super::entry::{PboArchive, PboEntry};

/// Parses a PBO table of contents: a sequence of headers terminated by an
/// empty filename following at least one real entry, optionally preceded
/// by a "product" pseudo-header.
///
/// Grounded directly on `original_source/pbo_read.c`'s `read_pbo`/
/// `read_entry`: a header is read unconditionally (filename, then either
/// the product's two extra strings or the five integer fields); the
/// caller only decides afterwards whether the entry it just read is the
/// terminator, and only treats an empty filename as the terminator once
/// at least one entry (`tail` in the source) has already been read — an
/// empty filename as the very first header is instead a pathological
/// entry.
pub struct PboTocReader;

impl PboTocReader {
    /// Reads the full table of contents starting at the reader's current
    /// position (ordinarily the start of the stream).
    pub fn read<R: Read + Seek>(reader: &mut ByteReader<R>) -> Result<PboArchive> {
        let mut entries = Vec::new();
        let mut data_offset: u64 = 0;

        loop {
            let filename = String::from_utf8_lossy(&reader.read_cstring()?).into_owned();

            if filename.eq_ignore_ascii_case("product") {
                let version = reader.read_cstring()?;
                let data = reader.read_cstring()?;
                log::debug!(
                    "product pseudo-header: version={:?} data={:?}",
                    String::from_utf8_lossy(&version),
                    String::from_utf8_lossy(&data)
                );
                continue;
            }

            let pack_method = reader.read_u32()?;
            let real_size = reader.read_u32()?;
            let reserved = reader.read_u32()?;
            let timestamp = reader.read_u32()?;
            let stored_size = reader.read_u32()?;

            if filename.is_empty() && !entries.is_empty() {
                log::debug!("TOC terminator reached after {} entries", entries.len());
                break;
            }

            entries.push(PboEntry {
                filename,
                pack_method,
                real_size,
                reserved,
                timestamp,
                data_offset,
                stored_size,
            });
            data_offset += stored_size as u64;
        }

        let data_region_start = reader.tell()?;
        Ok(PboArchive {
            entries,
            data_region_start,
        })
    }
}
