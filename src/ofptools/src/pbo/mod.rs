mod entry;
mod toc;
mod unpacker;
mod writer;

pub use entry::{PboArchive, PboEntry};
pub use toc::PboTocReader;
pub use unpacker::{ChecksumMode, PboUnpacker, UnpackedEntry};
pub use writer::{ArchiveWriter, FsWriter};

use std::io::{Read, Seek};

use crate::byte_reader::ByteReader;
use crate::error::Result;

/// Drives a full archive extraction: parses the table of contents, then
/// seeks to and unpacks each entry's data, handing the result to a
/// [`ArchiveWriter`].
///
/// Grounded on `original_source/pbo_read.c`'s `main()`, which skips
/// entries with an empty or `"product"` filename and otherwise writes
/// every entry's decoded bytes under the output directory.
pub struct PboDecoder {
    pub checksum_mode: ChecksumMode,
    pub strict_checksum: bool,
}

impl PboDecoder {
    pub fn new(checksum_mode: ChecksumMode) -> Self {
        PboDecoder {
            checksum_mode,
            strict_checksum: false,
        }
    }

    /// When set, a checksum mismatch aborts extraction with
    /// `OfpError::ChecksumMismatch` instead of only logging a warning.
    pub fn with_strict_checksum(mut self, strict: bool) -> Self {
        self.strict_checksum = strict;
        self
    }

    pub fn extract_all<R: Read + Seek>(
        &self,
        reader: &mut ByteReader<R>,
        writer: &mut dyn ArchiveWriter,
    ) -> Result<PboArchive> {
        reader.seek(0)?;
        let archive = PboTocReader::read(reader)?;

        for entry in &archive.entries {
            if entry.filename.is_empty() || entry.filename.eq_ignore_ascii_case("product") {
                continue;
            }

            reader.seek(archive.data_region_start + entry.data_offset)?;
            let mut stored = vec![0u8; entry.stored_size as usize];
            reader.read_exact(&mut stored)?;

            let bytes = if entry.is_stored() {
                stored
            } else {
                let unpacked = PboUnpacker::unpack(
                    &stored,
                    entry.real_size as usize,
                    self.checksum_mode,
                    self.strict_checksum,
                )?;
                unpacked.bytes
            };

            writer.write_entry(&entry.filename, &bytes)?;
        }

        Ok(archive)
    }
}

impl Default for PboDecoder {
    fn default() -> Self {
        Self::new(ChecksumMode::default())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct RecordingWriter {
        written: Vec<(String, Vec<u8>)>,
    }

    impl ArchiveWriter for RecordingWriter {
        fn write_entry(&mut self, logical_path: &str, bytes: &[u8]) -> Result<()> {
            self.written.push((logical_path.to_string(), bytes.to_vec()));
            Ok(())
        }
    }

    fn toc_header(name: &str, pack_method: u32, real_size: u32, stored_size: u32) -> Vec<u8> {
        let mut h = Vec::new();
        h.extend_from_slice(name.as_bytes());
        h.push(0);
        h.extend_from_slice(&pack_method.to_le_bytes());
        h.extend_from_slice(&real_size.to_le_bytes());
        h.extend_from_slice(&0u32.to_le_bytes());
        h.extend_from_slice(&0u32.to_le_bytes());
        h.extend_from_slice(&stored_size.to_le_bytes());
        h
    }

    #[test]
    fn extracts_a_single_stored_entry() {
        let mut bytes = toc_header("file.txt", 0, 0, 5);
        bytes.extend_from_slice(&toc_header("", 0, 0, 0));
        bytes.extend_from_slice(b"hello");
        let mut reader = ByteReader::new(Cursor::new(bytes));
        let mut writer = RecordingWriter { written: vec![] };
        let decoder = PboDecoder::default();
        decoder.extract_all(&mut reader, &mut writer).unwrap();
        assert_eq!(writer.written, vec![("file.txt".to_string(), b"hello".to_vec())]);
    }
}
