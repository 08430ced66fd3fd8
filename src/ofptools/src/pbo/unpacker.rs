use crate::error::{OfpError, Result};

/// Which checksum window to use when verifying a decompressed entry.
///
/// `original_source/pbo_read.c`'s `unpack_data` verifies
/// `output[0..=size]` where `size` is a stale snapshot of the output
/// length taken before the final token was applied — one token's worth of
/// trailing bytes end up outside the checksummed range. It's unclear
/// whether real archives were produced to match that quirk or whether
/// it's simply a bug, so both behaviors are available; `InclusiveExtraByte`
/// matches the historical tool and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumMode {
    InclusiveExtraByte,
    Exact,
}

impl Default for ChecksumMode {
    fn default() -> Self {
        ChecksumMode::InclusiveExtraByte
    }
}

/// Outcome of decompressing one PBO entry.
#[derive(Debug, Clone)]
pub struct UnpackedEntry {
    pub bytes: Vec<u8>,
    /// `false` when the trailing checksum didn't match; the bytes are
    /// still returned, since a mismatch is a warning, not a fatal error.
    pub checksum_matched: bool,
}

/// Decompresses a single PBO entry's stored bytes.
///
/// Grounded on `original_source/pbo_read.c`'s `unpack_data`: flag-byte
/// driven literal/back-reference tokens, with back-reference handling
/// branched in the exact priority order that source uses (all-negative,
/// then out-of-bounds, then non-overlapping-or-straddling, then
/// overlapping run extension).
pub struct PboUnpacker;

impl PboUnpacker {
    /// Decompresses `stored` into `real_size` bytes, verifying the trailing
    /// checksum under `mode`. A mismatch is a warning unless `strict` is
    /// set, in which case it is reported as `Err(OfpError::ChecksumMismatch)`.
    pub fn unpack(
        stored: &[u8],
        real_size: usize,
        mode: ChecksumMode,
        strict: bool,
    ) -> Result<UnpackedEntry> {
        if stored.len() < 4 {
            return Err(OfpError::TruncatedCompressedStream {
                produced: 0,
                expected: real_size,
            });
        }
        let payload_len = stored.len() - 4;
        let stored_checksum = u32::from_le_bytes(stored[payload_len..].try_into().unwrap());

        let mut output = Vec::with_capacity(real_size);
        let mut offset = 0usize;
        let mut last_size_snapshot = 0usize;

        while offset < payload_len {
            let flags = stored[offset];
            offset += 1;

            let mut bit: u16 = 1;
            while bit < 256 && offset < payload_len {
                last_size_snapshot = output.len();
                if flags as u16 & bit != 0 {
                    output.push(stored[offset]);
                    offset += 1;
                } else {
                    if offset + 1 >= stored.len() {
                        return Err(OfpError::TruncatedCompressedStream {
                            produced: output.len(),
                            expected: real_size,
                        });
                    }
                    let b1 = stored[offset] as i64;
                    let b2 = stored[offset + 1] as i64;
                    offset += 2;
                    let rpos = output.len() as i64 - b1 - 256 * (b2 / 16);
                    let rlen = b2 - 16 * (b2 / 16) + 3;
                    Self::apply_backref(&mut output, rpos, rlen)?;
                }
                bit <<= 1;
            }
        }

        if output.len() != real_size {
            return Err(OfpError::TruncatedCompressedStream {
                produced: output.len(),
                expected: real_size,
            });
        }

        let checksum_window: &[u8] = match mode {
            ChecksumMode::Exact => &output,
            ChecksumMode::InclusiveExtraByte => {
                let end = (last_size_snapshot + 1).min(output.len());
                &output[..end]
            }
        };
        let computed = checksum(checksum_window);
        let checksum_matched = computed == stored_checksum;
        if !checksum_matched {
            if strict {
                return Err(OfpError::ChecksumMismatch {
                    computed,
                    stored: stored_checksum,
                });
            }
            log::warn!(
                "checksum mismatch: computed 0x{computed:08x}, stored 0x{stored_checksum:08x}"
            );
        }

        Ok(UnpackedEntry {
            bytes: output,
            checksum_matched,
        })
    }

    /// Applies one back-reference token to the growing output buffer,
    /// following the priority order in `unpack_data`: an entirely
    /// negative source range pads with spaces, a source position past the
    /// current output is a corrupt stream, a straddling or wholly-past
    /// range copies (padding the negative prefix with spaces first), and
    /// everything else is an overlapping run that must be copied in
    /// chunks to pick up bytes it has itself just written — padding any
    /// remaining negative prefix first, and rejecting a zero-length chunk
    /// (`rpos` pointing exactly at the current end) as corrupt rather than
    /// spinning forever, matching `unpack_data`'s own "Chunk is 0" check.
    fn apply_backref(output: &mut Vec<u8>, rpos: i64, rlen: i64) -> Result<()> {
        let size = output.len() as i64;

        if rpos + rlen < 0 {
            output.resize(output.len() + rlen as usize, b' ');
            return Ok(());
        }

        if rpos > size {
            return Err(OfpError::CorruptBackref {
                rpos,
                size: output.len(),
            });
        }

        let mut rpos = rpos;
        let mut rlen = rlen;

        if rpos + rlen <= size {
            while rpos < 0 {
                output.push(b' ');
                rlen -= 1;
                rpos += 1;
            }
            let start = rpos as usize;
            for i in 0..rlen as usize {
                output.push(output[start + i]);
            }
            return Ok(());
        }

        // Overlapping run: the source range extends into bytes this very
        // token is writing, so copy in chunks that only ever read
        // already-written output. A still-negative `rpos` is padded with
        // spaces first, same as the non-overlapping branch above.
        while rpos < 0 {
            output.push(b' ');
            rlen -= 1;
            rpos += 1;
        }
        let start = rpos as usize;
        let mut chunk = output.len() - start;
        if chunk == 0 {
            return Err(OfpError::CorruptBackref {
                rpos,
                size: output.len(),
            });
        }
        while rlen > 0 {
            if chunk as i64 > rlen {
                chunk = rlen as usize;
            }
            for i in 0..chunk {
                output.push(output[start + i]);
            }
            rlen -= chunk as i64;
        }
        Ok(())
    }
}

fn checksum(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(mut payload: Vec<u8>, checksum_window: &[u8]) -> Vec<u8> {
        let sum = checksum(checksum_window);
        payload.extend_from_slice(&sum.to_le_bytes());
        payload
    }

    #[test]
    fn all_negative_backref_pads_with_spaces() {
        // flag byte: bit0 set (literal 'A'), bit1 clear (backref)
        let mut payload = vec![0b0000_0001u8, b'A', 0xFF, 0x30];
        // rpos = 1 - 255 - 3*256 = -1022, rlen = 0 + 3 = 3 -> all negative
        let expected_output = {
            let mut v = vec![b'A'];
            v.extend_from_slice(b"   ");
            v
        };
        payload = with_checksum(payload, &expected_output);
        let result = PboUnpacker::unpack(&payload, 4, ChecksumMode::Exact, false).unwrap();
        assert_eq!(result.bytes, expected_output);
        assert!(result.checksum_matched);
    }

    #[test]
    fn overlapping_run_extends_trailing_byte() {
        // Produce 3 literal bytes "ABC" then a backref with rpos = size -
        // 1 (pointing at the just-written 'C') and rlen = 5, which must
        // extend the output with 5 further copies of 'C'.
        // flags: bits 0,1,2 set (literals), bit 3 clear (backref)
        let mut payload = vec![0b0000_0111u8, b'A', b'B', b'C'];
        // rpos = size(3) - b1 - 256*(b2/16) = 2  =>  b1 + 256*(b2/16) = 1
        // choose b2/16 = 0, b1 = 1; rlen = b2 - 16*(b2/16) + 3 = 5 => b2 = 2
        payload.push(1); // b1
        payload.push(2); // b2
        let mut expected_output = b"ABC".to_vec();
        expected_output.extend(std::iter::repeat(b'C').take(5));
        let real_size = expected_output.len();
        payload = with_checksum(payload, &expected_output);
        let result = PboUnpacker::unpack(&payload, real_size, ChecksumMode::Exact, false).unwrap();
        assert_eq!(result.bytes, expected_output);
    }

    #[test]
    fn overlapping_run_pads_negative_prefix_before_extending() {
        // Two literals "AB" then a backref with rpos = -2, rlen = 5: the
        // source range starts before the output even begins but still
        // extends past its end, so the negative prefix must be padded
        // with spaces before the chunked copy runs (not cast straight to
        // `usize` and indexed, which would panic).
        // flags: bits 0,1 set (literals), bit 2 clear (backref)
        let mut payload = vec![0b0000_0011u8, b'A', b'B'];
        // rpos = size(2) - b1 - 256*(b2/16) = -2  =>  b1 + 256*(b2/16) = 4
        // choose b2/16 = 0, b1 = 4; rlen = b2 - 16*(b2/16) + 3 = 5 => b2 = 2
        payload.push(4); // b1
        payload.push(2); // b2
        let mut expected_output = b"AB".to_vec();
        expected_output.extend_from_slice(b"  "); // padding for rpos = -2
        expected_output.extend_from_slice(b"AB "); // chunked copy of output[0..3]
        let real_size = expected_output.len();
        payload = with_checksum(payload, &expected_output);
        let result = PboUnpacker::unpack(&payload, real_size, ChecksumMode::Exact, false).unwrap();
        assert_eq!(result.bytes, expected_output);
    }

    #[test]
    fn overlapping_run_with_zero_chunk_is_an_error() {
        // A backref right at the very start of output (rpos = size = 0)
        // makes the overlapping branch's chunk length 0; the decoder must
        // reject this rather than loop forever failing to make progress.
        // flags: bit 0 clear (backref is the very first token)
        let mut payload = vec![0b0000_0000u8];
        payload.push(0); // b1 = 0
        payload.push(0); // b2 = 0  =>  rlen = 3, rpos = 0 - 0 - 0 = 0
        payload = with_checksum(payload, b"");
        let err = PboUnpacker::unpack(&payload, 3, ChecksumMode::Exact, false).unwrap_err();
        assert!(matches!(
            err,
            OfpError::CorruptBackref { rpos: 0, size: 0 }
        ));
    }

    #[test]
    fn corrupt_backref_into_unwritten_future_is_an_error() {
        // rpos = size - b1 - 256*(b2/16) can never legitimately exceed
        // size (b1 and b2/16 are non-negative), so this guards a state
        // the wire format cannot produce; exercise it directly.
        let mut output = vec![b'X'];
        let err = PboUnpacker::apply_backref(&mut output, 5, 3).unwrap_err();
        assert!(matches!(
            err,
            OfpError::CorruptBackref { rpos: 5, size: 1 }
        ));
    }

    #[test]
    fn truncated_stream_reports_short_output() {
        // A payload that ends before real_size bytes have been produced.
        let mut payload = vec![0b0000_0001u8, b'A'];
        payload = with_checksum(payload, b"A");
        let err = PboUnpacker::unpack(&payload, 10, ChecksumMode::Exact, false).unwrap_err();
        assert!(matches!(
            err,
            OfpError::TruncatedCompressedStream {
                produced: 1,
                expected: 10
            }
        ));
    }

    #[test]
    fn checksum_mismatch_is_reported_but_not_fatal() {
        let mut payload = vec![0b0000_0001u8, b'A'];
        payload.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        let result = PboUnpacker::unpack(&payload, 1, ChecksumMode::Exact, false).unwrap();
        assert_eq!(result.bytes, b"A");
        assert!(!result.checksum_matched);
    }

    #[test]
    fn checksum_mismatch_is_fatal_in_strict_mode() {
        let mut payload = vec![0b0000_0001u8, b'A'];
        payload.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        let err = PboUnpacker::unpack(&payload, 1, ChecksumMode::Exact, true).unwrap_err();
        assert!(matches!(err, OfpError::ChecksumMismatch { stored: 0xDEADBEEF, .. }));
    }
}
