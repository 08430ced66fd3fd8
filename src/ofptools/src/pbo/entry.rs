/// One entry in a PBO archive's table of contents.
///
/// Grounded on `metadata/headers.rs`'s fixed-field-struct idiom, adapted
/// to the PBO TOC record's six little-endian fields (five on wire, plus
/// the derived `data_offset`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PboEntry {
    pub filename: String,
    pub pack_method: u32,
    pub real_size: u32,
    pub reserved: u32,
    pub timestamp: u32,
    pub stored_size: u32,
    pub data_offset: u64,
}

impl PboEntry {
    /// `real_size == 0` marks a verbatim, uncompressed entry.
    pub fn is_stored(&self) -> bool {
        self.real_size == 0
    }
}

/// A fully parsed table of contents: ordered entries plus where their
/// data region begins in the archive stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PboArchive {
    pub entries: Vec<PboEntry>,
    pub data_region_start: u64,
}
