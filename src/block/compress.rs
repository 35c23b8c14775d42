//! LZ4 block compression — bounded-array and streaming-sink modes.
//!
//! One greedy hash-based encoder drives both public modes; they differ only
//! in the [`Sink`] their output flows through:
//!
//! | Mode            | Entry point                               | Overflow signal      |
//! |-----------------|-------------------------------------------|----------------------|
//! | bounded array   | [`Lz4Compressor::compress_into`]          | `0` sentinel         |
//! | auto-sized      | [`Lz4Compressor::compress_to_vec`]        | cannot overflow      |
//! | streaming sink  | [`Lz4Compressor::compress_to_writer`]     | `Lz4BlockError::Io`  |
//!
//! Each compressed sequence is a literal run followed by a match
//! (2-byte little-endian offset + length); the block's terminal sequence is
//! literal-only and is recognized by the decoder through exact input
//! exhaustion rather than an explicit end marker.
//!
//! Running out of destination space in bounded mode is **not** an error:
//! `compress_into` returns `0` and the caller stores the payload
//! uncompressed.  The sentinel is unambiguous because every successful
//! compression, even of empty input, produces at least one token byte.

use std::io::Write;

use tracing::{debug, trace};

use super::copy::{copy_forward, drain_to_writer};
use super::types::{
    read_u16_le, read_u32_le, HashIndex, DEFAULT_COMPRESSION_LEVEL, LASTLITERALS, MAX_COMPRESSION_LEVEL,
    MAX_DISTANCE, MFLIMIT, MINLENGTH, MINMATCH, MIN_COMPRESSION_LEVEL, ML_BITS, ML_MASK, RUN_MASK,
    SKIP_STRENGTH,
};
use crate::error::{Lz4BlockError, Result};

/// Match-extension comparison granularity.
const STEPSIZE: usize = 4;

/// Maps an isolated least-significant bit of a 4-byte XOR to the index of
/// the first differing byte (little-endian), via De Bruijn multiplication.
static FIRST_DIFF_BYTE: [usize; 32] = [
    0, 0, 3, 0, 3, 1, 3, 0, 3, 2, 2, 1, 3, 2, 0, 1, 3, 3, 1, 2, 2, 2, 2, 0, 3, 1, 2, 0, 1, 0, 1, 1,
];

// ─────────────────────────────────────────────────────────────────────────────
// Worst-case bound
// ─────────────────────────────────────────────────────────────────────────────

/// Destination capacity guaranteed to hold the compressed form of any input
/// of `input_len` bytes, incompressible input included.
///
/// A destination of at least this size makes [`Lz4Compressor::compress_into`]
/// infallible.
#[inline]
pub fn max_compressed_length(input_len: usize) -> usize {
    input_len + input_len / 255 + 16
}

// ─────────────────────────────────────────────────────────────────────────────
// Output sinks
// ─────────────────────────────────────────────────────────────────────────────

/// Destination abstraction the encoder writes through.
///
/// The compression core is written once against this trait; the bounded and
/// streaming modes plug in their own implementation and error type.
pub(crate) trait Sink {
    type Error;

    /// Append raw encoded bytes.
    fn push(&mut self, bytes: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Hook invoked after the final byte of each completed sequence.
    fn end_sequence(&mut self) -> core::result::Result<(), Self::Error>;

    /// Total bytes accepted so far.
    fn written(&self) -> usize;
}

/// Marker error: the bounded destination ran out of space.
pub(crate) struct CapacityOverflow;

/// Bounded-array sink: exact capacity check on every push.
struct SliceSink<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl Sink for SliceSink<'_> {
    type Error = CapacityOverflow;

    #[inline]
    fn push(&mut self, bytes: &[u8]) -> core::result::Result<(), CapacityOverflow> {
        let end = self.pos + bytes.len();
        if end > self.dst.len() {
            return Err(CapacityOverflow);
        }
        copy_forward(&mut self.dst[self.pos..end], bytes);
        self.pos = end;
        Ok(())
    }

    #[inline]
    fn end_sequence(&mut self) -> core::result::Result<(), CapacityOverflow> {
        Ok(())
    }

    fn written(&self) -> usize {
        self.pos
    }
}

/// Streaming sink: batches sequence bytes in a scratch buffer of
/// [`MAX_DISTANCE`] bytes, flushed once per completed sequence.
///
/// The scratch size is a batching boundary, not a correctness bound: a push
/// that would overflow it triggers an early flush, and a push larger than
/// the scratch itself bypasses it entirely.
struct WriterSink<'a, W: Write> {
    writer: &'a mut W,
    scratch: Vec<u8>,
    written: usize,
}

impl<'a, W: Write> WriterSink<'a, W> {
    fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            scratch: Vec::with_capacity(MAX_DISTANCE),
            written: 0,
        }
    }

    fn flush_scratch(&mut self) -> std::io::Result<()> {
        if !self.scratch.is_empty() {
            drain_to_writer(self.writer, &self.scratch)?;
            self.written += self.scratch.len();
            self.scratch.clear();
        }
        Ok(())
    }
}

impl<W: Write> Sink for WriterSink<'_, W> {
    type Error = std::io::Error;

    fn push(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        if self.scratch.len() + bytes.len() > MAX_DISTANCE {
            self.flush_scratch()?;
        }
        if bytes.len() > MAX_DISTANCE {
            drain_to_writer(self.writer, bytes)?;
            self.written += bytes.len();
        } else {
            self.scratch.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn end_sequence(&mut self) -> std::io::Result<()> {
        self.flush_scratch()
    }

    fn written(&self) -> usize {
        self.written
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token encoder
// ─────────────────────────────────────────────────────────────────────────────

/// Emit the 255-chained extension bytes for a length remainder.
fn push_extension<S: Sink>(sink: &mut S, mut remainder: usize) -> core::result::Result<(), S::Error> {
    while remainder >= 255 {
        sink.push(&[255])?;
        remainder -= 255;
    }
    sink.push(&[remainder as u8])
}

/// Serialize one complete sequence: token byte, literal-length extension,
/// literal bytes, then — unless this is the block's terminal sequence —
/// the 2-byte little-endian offset and match-length extension.
///
/// `m` carries `(offset, extension)` where `extension` is the match length
/// beyond the implied [`MINMATCH`].
fn write_sequence<S: Sink>(
    sink: &mut S,
    literals: &[u8],
    m: Option<(u16, usize)>,
) -> core::result::Result<(), S::Error> {
    let lit_len = literals.len();
    let lit_code = lit_len.min(RUN_MASK);
    let match_code = match m {
        Some((_, ext)) => ext.min(ML_MASK),
        None => 0,
    };

    sink.push(&[((lit_code << ML_BITS) | match_code) as u8])?;
    if lit_len >= RUN_MASK {
        push_extension(sink, lit_len - RUN_MASK)?;
    }
    sink.push(literals)?;

    if let Some((offset, ext)) = m {
        sink.push(&offset.to_le_bytes())?;
        if ext >= ML_MASK {
            push_extension(sink, ext - ML_MASK)?;
        }
    }
    sink.end_sequence()
}

// ─────────────────────────────────────────────────────────────────────────────
// Match extension
// ─────────────────────────────────────────────────────────────────────────────

/// Count how many bytes beyond the verified [`MINMATCH`] prefix still match,
/// comparing `pos` against the earlier `mpos` and never reading past `limit`.
///
/// Compares 4 bytes at a time via XOR; the first differing byte is located
/// through [`FIRST_DIFF_BYTE`], then the final stretch is compared at 2-byte
/// and 1-byte granularity.
#[inline]
fn count_match(src: &[u8], mut pos: usize, mut mpos: usize, limit: usize) -> usize {
    let start = pos;

    while pos + STEPSIZE <= limit {
        let diff = read_u32_le(src, mpos) ^ read_u32_le(src, pos);
        if diff == 0 {
            pos += STEPSIZE;
            mpos += STEPSIZE;
            continue;
        }
        let isolated = diff & diff.wrapping_neg();
        pos += FIRST_DIFF_BYTE[(isolated.wrapping_mul(0x077C_B531) >> 27) as usize];
        return pos - start;
    }

    if pos + 2 <= limit && read_u16_le(src, mpos) == read_u16_le(src, pos) {
        pos += 2;
        mpos += 2;
    }
    if pos < limit && src[mpos] == src[pos] {
        pos += 1;
    }
    pos - start
}

// ─────────────────────────────────────────────────────────────────────────────
// Block compressor
// ─────────────────────────────────────────────────────────────────────────────

/// LZ4 block compressor.
///
/// Owns the hash index, which is allocated once and reused across calls
/// (its contents are reset at the start of every call, so no state leaks
/// between payloads).  `&mut self` on every compression method makes
/// concurrent use of one instance unrepresentable; use one instance per
/// thread.
#[derive(Debug)]
pub struct Lz4Compressor {
    index: HashIndex,
    level: u32,
}

impl Lz4Compressor {
    /// Compressor at the default level ([`DEFAULT_COMPRESSION_LEVEL`]).
    pub fn new() -> Self {
        Self {
            index: HashIndex::new(DEFAULT_COMPRESSION_LEVEL),
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Compressor with a `2^level`-entry hash index.
    ///
    /// Rejects levels outside
    /// [[`MIN_COMPRESSION_LEVEL`], [`MAX_COMPRESSION_LEVEL`]] eagerly: the
    /// table's byte size must stay a multiple of 16, and oversized tables
    /// buy nothing a 65535-byte window can use.
    pub fn with_level(level: u32) -> Result<Self> {
        if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&level) {
            return Err(Lz4BlockError::Configuration(format!(
                "compression level {level} outside supported range \
                 {MIN_COMPRESSION_LEVEL}..={MAX_COMPRESSION_LEVEL}"
            )));
        }
        Ok(Self {
            index: HashIndex::new(level),
            level,
        })
    }

    /// The configured compression level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Compress `src` into a freshly allocated, exactly-sized vector.
    pub fn compress_to_vec(&mut self, src: &[u8]) -> Vec<u8> {
        let mut dst = vec![0u8; max_compressed_length(src.len())];
        let n = self.compress_into(src, &mut dst);
        debug_assert!(n > 0, "bound-sized destination cannot overflow");
        dst.truncate(n);
        dst
    }

    /// Compress `src` into `dst`, returning the compressed length, or `0`
    /// when the encoded form would exceed `dst.len()`.
    ///
    /// The zero return is a normal outcome, not a fault: check it and fall
    /// back to storing `src` uncompressed.  A `dst` of at least
    /// [`max_compressed_length`]`(src.len())` never returns `0`.  On a zero
    /// return the contents of `dst` are unspecified.
    ///
    /// Sub-range compression is plain slicing:
    /// `compress_into(&src[off..off + n], &mut dst[dst_off..])`.
    pub fn compress_into(&mut self, src: &[u8], dst: &mut [u8]) -> usize {
        let mut sink = SliceSink { dst, pos: 0 };
        match self.compress_core(src, &mut sink) {
            Ok(()) => {
                let n = sink.written();
                trace!(input_len = src.len(), compressed_len = n, "block compressed");
                n
            }
            Err(CapacityOverflow) => {
                debug!(
                    input_len = src.len(),
                    capacity = sink.dst.len(),
                    "destination too small, returning zero sentinel"
                );
                0
            }
        }
    }

    /// Compress `src` into `writer`, returning the number of bytes written.
    ///
    /// Encoded bytes are batched in a scratch buffer of [`MAX_DISTANCE`]
    /// bytes and handed to the writer once per completed sequence.
    pub fn compress_to_writer<W: Write>(&mut self, src: &[u8], writer: &mut W) -> Result<usize> {
        let mut sink = WriterSink::new(writer);
        self.compress_core(src, &mut sink)?;
        let n = sink.written();
        trace!(input_len = src.len(), compressed_len = n, "block streamed");
        Ok(n)
    }

    /// The greedy match-find / encode loop, shared by every output mode.
    ///
    /// Walks the input with a scan cursor `ip` and a pending-literal anchor.
    /// The probe loop advances `ip` with an exponentially growing step on
    /// repeated match failure; an accepted candidate is extended backward
    /// (catch-up) and forward, encoded, and the scan resumes with an
    /// immediate re-test at the match's end that can emit zero-literal
    /// sequences without re-entering the probe loop.
    fn compress_core<S: Sink>(
        &mut self,
        src: &[u8],
        sink: &mut S,
    ) -> core::result::Result<(), S::Error> {
        self.index.reset();

        let len = src.len();
        if len < MINLENGTH {
            return write_sequence(sink, src, None);
        }

        // Last position at which a match may still start, and the hard limit
        // for match extension (the final LASTLITERALS bytes stay literal).
        let mflimit = len - MFLIMIT;
        let matchlimit = len - LASTLITERALS;

        let mut anchor = 0usize;
        self.index.insert(src, 0);
        let mut ip = 1usize;
        let mut forward_h = self.index.hash_at(src, ip);

        loop {
            // ── Find a match ─────────────────────────────────────────────────
            let mut attempts = (1u32 << SKIP_STRENGTH) + 3;
            let mut forward_ip = ip;
            let mut cand = loop {
                let h = forward_h;
                let step = (attempts >> SKIP_STRENGTH) as usize;
                attempts += 1;
                ip = forward_ip;
                forward_ip = ip + step;

                if forward_ip > mflimit {
                    // Too close to the end for another match: the remainder
                    // becomes the block's terminal literal run.
                    return write_sequence(sink, &src[anchor..], None);
                }

                let candidate = self.index.get(h);
                self.index.put(h, ip);
                forward_h = self.index.hash_at(src, forward_ip);

                if let Some(c) = candidate {
                    if c < ip && ip - c <= MAX_DISTANCE && read_u32_le(src, c) == read_u32_le(src, ip)
                    {
                        break c;
                    }
                }
            };

            // ── Catch up ─────────────────────────────────────────────────────
            // Extend the match backward while the preceding bytes agree and
            // the cursor has not crossed the anchor; recovers the precision
            // the hash granularity gave up.
            while ip > anchor && cand > 0 && src[ip - 1] == src[cand - 1] {
                ip -= 1;
                cand -= 1;
            }

            // ── Encode sequences ─────────────────────────────────────────────
            loop {
                let offset = (ip - cand) as u16;
                let ext = count_match(src, ip + MINMATCH, cand + MINMATCH, matchlimit);
                write_sequence(sink, &src[anchor..ip], Some((offset, ext)))?;
                ip += MINMATCH + ext;
                anchor = ip;

                if ip > mflimit {
                    return write_sequence(sink, &src[anchor..], None);
                }

                self.index.insert(src, ip - 2);

                // Immediate re-test at the match's end: a hit here encodes a
                // zero-literal sequence without another probe scan.
                let h = self.index.hash_at(src, ip);
                let candidate = self.index.get(h);
                self.index.put(h, ip);
                if let Some(c) = candidate {
                    if c < ip && ip - c <= MAX_DISTANCE && read_u32_le(src, c) == read_u32_le(src, ip)
                    {
                        cand = c;
                        continue;
                    }
                }

                forward_h = self.index.hash_at(src, ip + 1);
                ip += 1;
                break;
            }
        }
    }
}

impl Default for Lz4Compressor {
    fn default() -> Self {
        Self::new()
    }
}
