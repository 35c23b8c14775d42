//! LZ4 block compression and decompression.
//!
//! The block format is a header-less stream of tokens; it carries no
//! magic number, checksum, or content size, so the caller is responsible
//! for knowing (or bounding) the uncompressed size at decode time.

pub mod compress;
pub(crate) mod copy;
pub mod decompress;
pub mod types;

// Re-export the public API at the module level.
pub use compress::{max_compressed_length, Lz4Compressor};
pub use decompress::{
    decompress_from_reader, decompress_into, decompress_known_size, decompress_to_vec,
};
pub use types::{
    DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, MAX_DISTANCE, MINMATCH,
    MIN_COMPRESSION_LEVEL,
};
