use thiserror::Error;

/// Every fatal condition the two decoders can raise.
///
/// `ChecksumMismatch` is the one variant the drivers may choose to treat as
/// a warning instead of a hard failure (see [`crate::pbo::ChecksumMode`]).
#[derive(Debug, Error)]
pub enum OfpError {
    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("malformed string at offset {offset}: {reason}")]
    MalformedString { offset: u64, reason: &'static str },

    #[error("unknown config entry tag 0x{tag:02x}")]
    UnknownEntryTag { tag: u8 },

    #[error("unknown scalar kind 0x{kind:02x}")]
    UnknownScalarKind { kind: u8 },

    #[error("unknown array element kind 0x{kind:02x}")]
    UnknownArrayKind { kind: u8 },

    #[error("corrupt back-reference: rpos {rpos} exceeds current output size {size}")]
    CorruptBackref { rpos: i64, size: usize },

    #[error("compressed stream truncated: produced {produced} of {expected} bytes")]
    TruncatedCompressedStream { produced: usize, expected: usize },

    #[error("checksum mismatch: computed 0x{computed:08x}, stored 0x{stored:08x}")]
    ChecksumMismatch { computed: u32, stored: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OfpError>;
