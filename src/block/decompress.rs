//! LZ4 block decompression — the token-stream interpreter.
//!
//! The decoder is a small state machine:
//!
//! ```text
//! ReadToken → CopyLiteral → (end | ReadOffset → CopyMatch) → ReadToken
//! ```
//!
//! looping until the declared input or output length is exhausted.  The
//! block carries no explicit end marker: the terminal sequence is
//! literal-only, recognized by the input being consumed exactly after a
//! literal copy.
//!
//! This is the security boundary of the crate.  Every computed read and
//! write position is bounds-checked before use; malformed or truncated
//! input yields [`Lz4BlockError::CorruptStream`] — never a silent clamp,
//! never a panic.

use std::io::Read;

use tracing::{debug, trace};

use super::copy::{copy_forward, copy_overlapping, fill_from_reader};
use super::compress::max_compressed_length;
use super::types::{read_u16_le, MINMATCH, ML_BITS, ML_MASK, RUN_MASK};
use crate::error::{Lz4BlockError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Decode outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Why a decode attempt stopped short.
///
/// `OutputFull` is kept separate from `Corrupt` because
/// [`decompress_to_vec`] treats it as "retry with a larger buffer" while
/// the fixed-destination entry points report it as a corrupt stream (a
/// write position outside the declared bounds).
enum DecodeFailure {
    Corrupt { at: usize, reason: &'static str },
    OutputFull { at: usize },
}

impl DecodeFailure {
    fn into_error(self) -> Lz4BlockError {
        let (offset, reason) = match self {
            DecodeFailure::Corrupt { at, reason } => (at, reason),
            DecodeFailure::OutputFull { at } => (at, "copy exceeds declared output bounds"),
        };
        debug!(offset, reason, "rejecting corrupt block stream");
        Lz4BlockError::CorruptStream { offset, reason }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Core state machine
// ─────────────────────────────────────────────────────────────────────────────

/// Read the 255-chained extension bytes of an oversized length field.
fn read_length_extension(src: &[u8], ip: &mut usize) -> core::result::Result<usize, DecodeFailure> {
    let mut total = 0usize;
    loop {
        if *ip >= src.len() {
            return Err(DecodeFailure::Corrupt {
                at: *ip,
                reason: "truncated length extension",
            });
        }
        let byte = src[*ip];
        *ip += 1;
        total += byte as usize;
        if byte != 255 {
            return Ok(total);
        }
    }
}

/// Interpret the token stream in `src`, reconstructing output into `dst`.
///
/// With `stop_at_capacity`, `dst.len()` is the declared output length and
/// decoding ends as soon as it is reached; otherwise `dst.len()` is only a
/// capacity bound and decoding ends on input exhaustion.
///
/// Returns the number of bytes produced.
fn decode_block(
    src: &[u8],
    dst: &mut [u8],
    stop_at_capacity: bool,
) -> core::result::Result<usize, DecodeFailure> {
    if src.is_empty() {
        return Err(DecodeFailure::Corrupt {
            at: 0,
            reason: "empty compressed stream",
        });
    }

    let mut ip = 0usize;
    let mut op = 0usize;

    loop {
        if stop_at_capacity && op == dst.len() {
            return Ok(op);
        }

        // ── ReadToken ─────────────────────────────────────────────────────────
        if ip >= src.len() {
            return Err(DecodeFailure::Corrupt {
                at: ip,
                reason: "missing token byte",
            });
        }
        let token = src[ip];
        ip += 1;

        let mut lit_len = (token >> ML_BITS) as usize;
        if lit_len == RUN_MASK {
            lit_len += read_length_extension(src, &mut ip)?;
        }

        // ── CopyLiteral ───────────────────────────────────────────────────────
        if lit_len > src.len() - ip {
            return Err(DecodeFailure::Corrupt {
                at: ip,
                reason: "literal run past end of input",
            });
        }
        if lit_len > dst.len() - op {
            return Err(DecodeFailure::OutputFull { at: ip });
        }
        copy_forward(&mut dst[op..op + lit_len], &src[ip..ip + lit_len]);
        ip += lit_len;
        op += lit_len;

        // ── End detection ─────────────────────────────────────────────────────
        // Input consumed exactly after a literal copy: terminal sequence.
        if ip == src.len() {
            return Ok(op);
        }

        // ── ReadOffset ────────────────────────────────────────────────────────
        if src.len() - ip < 2 {
            return Err(DecodeFailure::Corrupt {
                at: ip,
                reason: "truncated match offset",
            });
        }
        let offset = read_u16_le(src, ip) as usize;
        ip += 2;
        if offset == 0 {
            return Err(DecodeFailure::Corrupt {
                at: ip - 2,
                reason: "zero match offset",
            });
        }
        if offset > op {
            return Err(DecodeFailure::Corrupt {
                at: ip - 2,
                reason: "match offset reaches before output start",
            });
        }

        let mut match_len = (token & ML_MASK as u8) as usize;
        if match_len == ML_MASK {
            match_len += read_length_extension(src, &mut ip)?;
        }
        let match_len = match_len + MINMATCH;

        // ── CopyMatch ─────────────────────────────────────────────────────────
        // The offset may be smaller than the copy length: a self-referential
        // repeating copy, handled by the overlap-aware primitive.
        if match_len > dst.len() - op {
            return Err(DecodeFailure::OutputFull { at: ip });
        }
        copy_overlapping(dst, op, offset, match_len);
        op += match_len;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Decompress a block into `dst`, whose length is an upper bound on the
/// output size.  Returns the number of bytes produced.
///
/// Use this when the exact uncompressed size is not known but a safe upper
/// bound is.  An explicit compressed-length parameter is plain slicing:
/// `decompress_into(&compressed[..compressed_len], dst)`.
pub fn decompress_into(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let n = decode_block(src, dst, false).map_err(DecodeFailure::into_error)?;
    trace!(compressed_len = src.len(), output_len = n, "block decompressed");
    Ok(n)
}

/// Decompress a block whose exact uncompressed size is known:
/// `dst.len()` bytes.  Decoding stops once the output is full.
///
/// Producing fewer bytes than declared is a [`Lz4BlockError::SizeMismatch`].
pub fn decompress_known_size(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let n = decode_block(src, dst, true).map_err(DecodeFailure::into_error)?;
    if n != dst.len() {
        return Err(Lz4BlockError::SizeMismatch {
            expected: dst.len(),
            actual: n,
        });
    }
    trace!(compressed_len = src.len(), output_len = n, "block decompressed");
    Ok(n)
}

/// Decompress a block of unknown output size into a fresh vector.
///
/// The output buffer starts at a small multiple of the compressed length
/// and grows geometrically until the block fits; the transform is
/// deterministic, so retrying is sound, and a finite stream decodes to a
/// finite length, so the loop terminates.
pub fn decompress_to_vec(src: &[u8]) -> Result<Vec<u8>> {
    let mut capacity = src.len().saturating_mul(4).max(64);
    loop {
        let mut dst = vec![0u8; capacity];
        match decode_block(src, &mut dst, false) {
            Ok(n) => {
                dst.truncate(n);
                trace!(
                    compressed_len = src.len(),
                    output_len = n,
                    "block decompressed"
                );
                return Ok(dst);
            }
            Err(DecodeFailure::OutputFull { .. }) => {
                capacity = capacity.saturating_mul(2);
            }
            Err(failure) => return Err(failure.into_error()),
        }
    }
}

/// Decompress from a reader into a destination of known output length.
///
/// Reads the compressed stream into an internal buffer bounded by
/// [`max_compressed_length`]`(dst.len())` — a longer stream cannot be a
/// valid block for that output length and is rejected — then decodes as a
/// known-size block.
pub fn decompress_from_reader<R: Read>(reader: &mut R, dst: &mut [u8]) -> Result<usize> {
    let mut buf = vec![0u8; max_compressed_length(dst.len())];
    let n = fill_from_reader(reader, &mut buf)?;

    if n == buf.len() {
        // The buffer filled completely: valid only if the stream ends here.
        let mut probe = [0u8; 1];
        loop {
            match reader.read(&mut probe) {
                Ok(0) => break,
                Ok(_) => {
                    return Err(Lz4BlockError::CorruptStream {
                        offset: n,
                        reason: "compressed stream longer than any valid block for this output",
                    })
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    decompress_known_size(&buf[..n], dst)
}
