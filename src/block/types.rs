//! LZ4 block constants, little-endian helpers, and the hash index.
//!
//! The constants here pin down the block format itself (token layout,
//! minimum match length, window size) together with the fixed tuning
//! parameters of the greedy encoder.  See the [LZ4 block format
//! specification] for the authoritative description of the on-wire layout.
//!
//! [LZ4 block format specification]: https://github.com/lz4/lz4/blob/dev/doc/lz4_Block_format.md

// ─────────────────────────────────────────────────────────────────────────────
// Format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum match length encoded in an LZ4 block.
pub const MINMATCH: usize = 4;

/// Granularity of the fast copy loops.
pub const COPYLENGTH: usize = 8;

/// Maximum back-reference distance representable by the 2-byte offset field.
pub const MAX_DISTANCE: usize = 65_535;

/// The last bytes of the input are always emitted as literals; matches never
/// extend into this tail.
pub const LASTLITERALS: usize = 5;

/// Minimum distance from the input's end at which a new match may start.
pub const MFLIMIT: usize = COPYLENGTH + MINMATCH;

/// Inputs shorter than this skip match-finding entirely and are emitted as a
/// single literal run.
pub const MINLENGTH: usize = MFLIMIT + 1;

/// Bits of the token byte holding the match-length code.
pub const ML_BITS: u32 = 4;
/// Maximum match-length code storable in the token byte.
pub const ML_MASK: usize = (1 << ML_BITS) - 1;
/// Maximum literal-run code storable in the token byte.
pub const RUN_MASK: usize = (1 << (8 - ML_BITS)) - 1;

// ─────────────────────────────────────────────────────────────────────────────
// Encoder tuning constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default compression level: log2 of the hash-table entry count.
///
/// Raising the level improves ratio at the cost of table memory
/// (`2^level` pointer-width entries); lowering it shrinks the table and
/// typically speeds things up through cache effects.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 12;

/// Smallest accepted compression level (16-entry table).
pub const MIN_COMPRESSION_LEVEL: u32 = 4;

/// Largest accepted compression level (1 Mi-entry table).
pub const MAX_COMPRESSION_LEVEL: u32 = 20;

/// Controls how aggressively the match finder skips ahead on data that keeps
/// failing to match: the probe step grows once every `2^SKIP_STRENGTH`
/// attempts, bounding worst-case cost on incompressible input.
pub const SKIP_STRENGTH: u32 = 6;

/// Knuth multiplicative hash constant over the 4-byte prefix.
pub const HASH_MULTIPLIER: u32 = 2_654_435_761;

// ─────────────────────────────────────────────────────────────────────────────
// Little-endian helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read the 4-byte little-endian value at `pos`.
///
/// Callers guarantee `pos + 4 <= buf.len()`.
#[inline(always)]
pub(crate) fn read_u32_le(buf: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes(buf[pos..pos + 4].try_into().unwrap())
}

/// Read the 2-byte little-endian value at `pos`.
///
/// Callers guarantee `pos + 2 <= buf.len()`.
#[inline(always)]
pub(crate) fn read_u16_le(buf: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes(buf[pos..pos + 2].try_into().unwrap())
}

// ─────────────────────────────────────────────────────────────────────────────
// Hash index
// ─────────────────────────────────────────────────────────────────────────────

/// Slot value meaning "no position recorded yet".
const UNSEEN: usize = usize::MAX;

/// Maps a hash of a 4-byte input prefix to the most recent position that
/// produced it.
///
/// The table holds `2^level` pointer-width slots.  Collisions overwrite
/// silently — only the newest producer of a hash survives, which keeps
/// lookup O(1) at the cost of an approximate (not exhaustive) search.
/// Stale entries are never deleted; the match finder validates every
/// candidate against the window and the actual input bytes.
#[derive(Debug)]
pub(crate) struct HashIndex {
    slots: Box<[usize]>,
    shift: u32,
}

impl HashIndex {
    /// Allocate a table of `2^level` slots, all unseen.
    ///
    /// Level validation happens at the compressor boundary; by the time this
    /// runs, `level` lies within [[`MIN_COMPRESSION_LEVEL`], [`MAX_COMPRESSION_LEVEL`]].
    pub(crate) fn new(level: u32) -> Self {
        Self {
            slots: vec![UNSEEN; 1usize << level].into_boxed_slice(),
            shift: 32 - level,
        }
    }

    /// Forget all recorded positions.  Called at the start of every
    /// compression run; table state never crosses a call boundary.
    pub(crate) fn reset(&mut self) {
        self.slots.fill(UNSEEN);
    }

    /// Hash a 4-byte little-endian prefix value, keeping the top bits.
    #[inline(always)]
    pub(crate) fn hash(&self, sequence: u32) -> u32 {
        sequence.wrapping_mul(HASH_MULTIPLIER) >> self.shift
    }

    /// Hash the 4 bytes at `pos`.
    #[inline(always)]
    pub(crate) fn hash_at(&self, src: &[u8], pos: usize) -> u32 {
        self.hash(read_u32_le(src, pos))
    }

    /// Most recent position recorded under `h`, if any.
    #[inline(always)]
    pub(crate) fn get(&self, h: u32) -> Option<usize> {
        let slot = self.slots[h as usize];
        (slot != UNSEEN).then_some(slot)
    }

    /// Record `pos` under `h`, displacing any previous occupant.
    #[inline(always)]
    pub(crate) fn put(&mut self, h: u32, pos: usize) {
        self.slots[h as usize] = pos;
    }

    /// Hash the 4 bytes at `pos` and record `pos` under that hash.
    #[inline(always)]
    pub(crate) fn insert(&mut self, src: &[u8], pos: usize) {
        let h = self.hash_at(src, pos);
        self.put(h, pos);
    }
}
