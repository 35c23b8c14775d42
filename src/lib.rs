//! LZ4 block-format compression and decompression.
//!
//! A fast byte-oriented LZ77-family codec producing header-less,
//! self-contained token streams.  The crate covers the block format only:
//! no frame container, no checksums, no dictionaries — callers that need
//! framing keep the uncompressed length (or an upper bound on it) on the
//! side.
//!
//! # Example
//!
//! ```
//! use lz4_block::{decompress_to_vec, max_compressed_length, Lz4Compressor};
//!
//! let payload = b"round and round and round and round it goes".repeat(8);
//!
//! let mut compressor = Lz4Compressor::new();
//! let compressed = compressor.compress_to_vec(&payload);
//! assert!(compressed.len() < payload.len());
//!
//! let restored = decompress_to_vec(&compressed).unwrap();
//! assert_eq!(restored, payload);
//!
//! // Bounded mode: 0 means "does not fit" — store the payload raw instead.
//! let mut dst = vec![0u8; max_compressed_length(payload.len())];
//! let n = compressor.compress_into(&payload, &mut dst);
//! assert!(n > 0 && n == compressed.len());
//! ```

pub mod block;
pub mod error;

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use block::compress::{max_compressed_length, Lz4Compressor};
pub use block::decompress::{
    decompress_from_reader, decompress_into, decompress_known_size, decompress_to_vec,
};
pub use block::types::{
    DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL, MAX_DISTANCE, MIN_COMPRESSION_LEVEL,
};
pub use error::{Lz4BlockError, Result};
