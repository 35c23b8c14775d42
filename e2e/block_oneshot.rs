//! E2E Test Suite 01: Block One-Shot API
//!
//! Validates the byte-array compression and decompression surface:
//! - Lz4Compressor::compress_to_vec / compress_into
//! - max_compressed_length
//! - decompress_into / decompress_known_size / decompress_to_vec
//!
//! Covers round-trips across the interesting size classes (empty, below the
//! match threshold, exactly at it, repetitive, incompressible) plus the
//! bounded-destination sentinel contract.

extern crate lz4_block;

use lz4_block::{
    decompress_into, decompress_known_size, decompress_to_vec, max_compressed_length,
    Lz4Compressor,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

fn roundtrip(original: &[u8]) -> Vec<u8> {
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(original);
    let mut decompressed = vec![0u8; original.len()];
    let produced =
        decompress_known_size(&compressed, &mut decompressed).expect("decompression should succeed");
    assert_eq!(produced, original.len());
    assert_eq!(&decompressed[..], original);
    compressed
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: round-trip — typical repetitive data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_typical_data() {
    let original = b"The quick brown fox jumps over the lazy dog. ".repeat(20);
    let compressed = roundtrip(&original);
    assert!(
        compressed.len() < original.len(),
        "compressed size {} should be less than original {}",
        compressed.len(),
        original.len()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: round-trip — incompressible data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_incompressible_data() {
    let original = random_bytes(1000, 0xBADC0DE);
    let compressed = roundtrip(&original);
    // May expand, but never past the documented bound.
    assert!(compressed.len() <= max_compressed_length(original.len()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: empty input
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_input_roundtrip() {
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&[]);

    // A single zero token byte: empty literal run, no match.
    assert_eq!(compressed, vec![0u8]);

    let mut dst = [0u8; 8];
    let produced = decompress_into(&compressed, &mut dst).expect("empty block should decode");
    assert_eq!(produced, 0);

    let auto = decompress_to_vec(&compressed).expect("empty block should decode");
    assert!(auto.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: inputs below the match threshold are a single literal run
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_short_inputs_emit_single_literal_run() {
    // Below MINLENGTH (13) match-finding is skipped entirely, so the block
    // is one token byte followed by the input verbatim.
    for len in 1..13usize {
        let original = vec![b'z'; len];
        let mut compressor = Lz4Compressor::new();
        let compressed = compressor.compress_to_vec(&original);

        assert_eq!(compressed.len(), 1 + len, "input of {len} bytes");
        assert_eq!(compressed[0], (len as u8) << 4);
        assert_eq!(&compressed[1..], &original[..]);

        let restored = decompress_to_vec(&compressed).expect("decode should succeed");
        assert_eq!(restored, original);
    }
}

#[test]
fn test_minlength_boundary_roundtrip() {
    // Exactly 13 bytes: matching is attempted but cannot fit a match plus
    // the trailing-literal tail, so the block is still a single run.
    let original = b"aaaaaaaaaaaaa".to_vec();
    assert_eq!(original.len(), 13);
    let compressed = roundtrip(&original);
    assert_eq!(compressed.len(), 14);

    // One byte past the boundary a match becomes possible.
    let original = vec![b'a'; 16];
    let compressed = roundtrip(&original);
    assert!(compressed.len() < original.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Scenario A — repeated sentence compresses strictly smaller
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_repeated_sentence_compresses() {
    let sentence = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
        tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis \
        nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis \
        aute irure dolor in reprehenderit in voluptate velit esse. ";
    assert!(sentence.len() >= 280);
    let original = sentence.repeat(8).into_bytes();
    assert!(original.len() >= 2240);

    let compressed = roundtrip(&original);
    assert!(
        compressed.len() < original.len(),
        "highly repetitive text must shrink: {} vs {}",
        compressed.len(),
        original.len()
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: Scenario B — tiny random input may expand but round-trips
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_tiny_random_input_roundtrip() {
    let original = random_bytes(10, 42);
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    // Expansion is acceptable here; exactness of the round-trip is not.
    assert_eq!(compressed.len(), 11);

    let mut dst = [0u8; 10];
    let produced = decompress_known_size(&compressed, &mut dst).expect("decode should succeed");
    assert_eq!(produced, 10);
    assert_eq!(&dst[..], &original[..]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 7: max_compressed_length is always sufficient
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_max_compressed_length_is_adequate() {
    for &size in &[0usize, 1, 10, 100, 1000, 10_000, 100_000] {
        let original = random_bytes(size, size as u64 + 7);
        let mut dst = vec![0u8; max_compressed_length(size)];
        let mut compressor = Lz4Compressor::new();

        let n = compressor.compress_into(&original, &mut dst);
        assert!(n > 0, "bound-sized destination must never overflow ({size})");
        assert!(n <= dst.len());

        let restored = decompress_to_vec(&dst[..n]).expect("decode should succeed");
        assert_eq!(restored, original);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 8: bounded safety — small destinations yield the zero sentinel
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bounded_destination_sentinel() {
    let original = random_bytes(1000, 99);
    let mut compressor = Lz4Compressor::new();

    // Incompressible input cannot fit into a fraction of itself.
    let mut small = vec![0u8; 100];
    assert_eq!(compressor.compress_into(&original, &mut small), 0);

    // Zero-capacity destination cannot even hold the terminal token.
    let mut empty: [u8; 0] = [];
    assert_eq!(compressor.compress_into(&original, &mut empty), 0);
    assert_eq!(compressor.compress_into(&[], &mut empty), 0);

    // Every destination size either fits the result or signals 0 — and a
    // nonzero result always decodes back to the input.
    let repetitive = b"abcdabcdabcdabcd-abcdabcdabcdabcd".repeat(30);
    for cap in (0..max_compressed_length(repetitive.len())).step_by(37) {
        let mut dst = vec![0u8; cap];
        let n = compressor.compress_into(&repetitive, &mut dst);
        if n == 0 {
            continue;
        }
        assert!(n <= cap);
        let restored = decompress_to_vec(&dst[..n]).expect("decode should succeed");
        assert_eq!(restored, repetitive);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 9: sub-range compression is plain slicing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_subrange_compression_via_slicing() {
    let buffer = b"prefix-prefix-prefix|the interesting middle part, the interesting \
        middle part, the interesting middle part|suffix"
        .to_vec();
    let (off, count) = (21, 75);
    let section = &buffer[off..off + count];

    let mut dst = vec![0u8; 64 + max_compressed_length(count)];
    let dst_off = 64;
    let mut compressor = Lz4Compressor::new();
    let n = compressor.compress_into(section, &mut dst[dst_off..]);
    assert!(n > 0);

    let mut restored = vec![0u8; count];
    decompress_known_size(&dst[dst_off..dst_off + n], &mut restored)
        .expect("decode should succeed");
    assert_eq!(&restored[..], section);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 10: auto-sized and bounded modes agree byte for byte
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_to_vec_matches_compress_into() {
    let original = b"agreement, agreement, agreement, and more agreement".repeat(12);
    let mut compressor = Lz4Compressor::new();

    let auto = compressor.compress_to_vec(&original);
    let mut dst = vec![0u8; max_compressed_length(original.len())];
    let n = compressor.compress_into(&original, &mut dst);

    assert_eq!(&dst[..n], &auto[..]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 11: one instance across many payloads — no state leaks
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_instance_reuse_is_deterministic() {
    let a = b"first payload first payload first payload first payload".repeat(10);
    let b = random_bytes(4096, 0x5EED);

    let mut compressor = Lz4Compressor::new();
    let first = compressor.compress_to_vec(&a);
    let other = compressor.compress_to_vec(&b);
    let again = compressor.compress_to_vec(&a);

    // The hash index is reset per call, so a repeat of the same payload
    // produces the identical stream regardless of what ran in between.
    assert_eq!(first, again);

    assert_eq!(decompress_to_vec(&first).unwrap(), a);
    assert_eq!(decompress_to_vec(&other).unwrap(), b);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 12: non-default compression levels round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_alternate_levels_roundtrip() {
    let original = b"levels, levels, levels, levels, levels, levels, levels".repeat(40);

    for level in [4u32, 10, 14] {
        let mut compressor = Lz4Compressor::with_level(level).expect("level is in range");
        assert_eq!(compressor.level(), level);

        let compressed = compressor.compress_to_vec(&original);
        assert!(compressed.len() < original.len());
        assert_eq!(decompress_to_vec(&compressed).unwrap(), original);
    }
}
