//! E2E Test Suite 04: Error Handling
//!
//! Exercises every failure class:
//! - CorruptStream for malformed/truncated token streams (never a panic,
//!   never silent clamping)
//! - SizeMismatch for known-size decodes that come up short
//! - Configuration for out-of-range compression levels (raised eagerly)
//! - Io propagation through the reader-backed variant

extern crate lz4_block;

use std::io::{self, Cursor, Read};

use lz4_block::{
    decompress_from_reader, decompress_into, decompress_known_size, decompress_to_vec,
    max_compressed_length, Lz4BlockError, Lz4Compressor,
};

fn assert_corrupt<T: std::fmt::Debug>(result: lz4_block::Result<T>) {
    match result {
        Err(Lz4BlockError::CorruptStream { .. }) => {}
        other => panic!("expected CorruptStream, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: corrupt stream matrix
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_compressed_stream_is_corrupt() {
    let mut dst = [0u8; 16];
    assert_corrupt(decompress_into(&[], &mut dst));
    assert_corrupt(decompress_to_vec(&[]));
}

#[test]
fn test_literal_run_past_end_of_input() {
    // Token declares 1 literal but the stream ends immediately after it.
    let mut dst = [0u8; 16];
    assert_corrupt(decompress_into(&[0x10], &mut dst));

    // Extended declaration (15 + 5 = 20 literals) with only 2 bytes present.
    assert_corrupt(decompress_into(&[0xF0, 0x05, b'a', b'b'], &mut dst));
}

#[test]
fn test_truncated_length_extension() {
    let mut dst = [0u8; 16];
    // Literal code 15 with no extension byte at all.
    assert_corrupt(decompress_into(&[0xF0], &mut dst));
    // Extension chain cut off mid-way (0xFF promises another byte).
    assert_corrupt(decompress_into(&[0xF0, 0xFF], &mut dst));
}

#[test]
fn test_truncated_match_offset() {
    // One literal, then a single offset byte where two are required.
    let mut dst = [0u8; 16];
    assert_corrupt(decompress_into(&[0x10, b'a', 0x05], &mut dst));
}

#[test]
fn test_zero_match_offset() {
    let mut dst = [0u8; 16];
    assert_corrupt(decompress_into(&[0x10, b'a', 0x00, 0x00, 0x00], &mut dst));
}

#[test]
fn test_offset_before_output_start() {
    // Offset 5 with only 1 byte of output produced so far.
    let mut dst = [0u8; 16];
    assert_corrupt(decompress_into(&[0x10, b'a', 0x05, 0x00, 0x00], &mut dst));
}

#[test]
fn test_match_exceeding_output_capacity() {
    let original = vec![b'r'; 100];
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    // The stream decodes to 100 bytes; declaring 50 must fail loudly.
    let mut dst = [0u8; 50];
    assert_corrupt(decompress_into(&compressed, &mut dst));
    assert_corrupt(decompress_known_size(&compressed, &mut dst));
}

#[test]
fn test_corrupt_stream_never_partially_trusted() {
    // decompress_to_vec must report corruption, not loop growing forever.
    assert_corrupt(decompress_to_vec(&[0x10, b'a', 0x00, 0x00]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: known-size shortfall
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_known_size_shortfall_is_mismatch() {
    let original = vec![b's'; 100];
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    let mut dst = [0u8; 150];
    match decompress_known_size(&compressed, &mut dst) {
        Err(Lz4BlockError::SizeMismatch { expected, actual }) => {
            assert_eq!(expected, 150);
            assert_eq!(actual, 100);
        }
        other => panic!("expected SizeMismatch, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: configuration errors are eager
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_out_of_range_levels_rejected() {
    for level in [0u32, 1, 3, 21, 32] {
        match Lz4Compressor::with_level(level) {
            Err(Lz4BlockError::Configuration(reason)) => {
                assert!(reason.contains("level"), "unhelpful message: {reason}");
            }
            other => panic!("level {level} should be rejected, got {other:?}"),
        }
    }
}

#[test]
fn test_boundary_levels_accepted() {
    for level in [4u32, 12, 20] {
        let compressor = Lz4Compressor::with_level(level).expect("level is in range");
        assert_eq!(compressor.level(), level);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: reader-backed decompression
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_reader_roundtrip() {
    let original = b"read me back, read me back, read me back, read me back".repeat(20);
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    let mut dst = vec![0u8; original.len()];
    let produced = decompress_from_reader(&mut Cursor::new(&compressed), &mut dst)
        .expect("decode should succeed");
    assert_eq!(produced, original.len());
    assert_eq!(dst, original);
}

#[test]
fn test_reader_stream_longer_than_any_valid_block() {
    // A stream longer than max_compressed_length(dst.len()) cannot be a
    // valid block for that output size.
    let mut dst = vec![0u8; 100];
    let garbage = vec![0xAAu8; max_compressed_length(100) + 50];
    assert_corrupt(decompress_from_reader(&mut Cursor::new(&garbage), &mut dst));
}

#[test]
fn test_reader_short_stream_fails() {
    let original = b"short stream short stream short stream short stream!".repeat(10);
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    // Drop the tail of the compressed stream: the decode cannot reach the
    // declared output length.
    let truncated = &compressed[..compressed.len() / 2];
    let mut dst = vec![0u8; original.len()];
    let result = decompress_from_reader(&mut Cursor::new(truncated), &mut dst);
    assert!(
        matches!(
            result,
            Err(Lz4BlockError::CorruptStream { .. }) | Err(Lz4BlockError::SizeMismatch { .. })
        ),
        "truncated stream must not decode: {result:?}"
    );
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reader gave up"))
    }
}

#[test]
fn test_reader_io_error_propagates() {
    let mut dst = vec![0u8; 64];
    let result = decompress_from_reader(&mut FailingReader, &mut dst);
    assert!(matches!(result, Err(Lz4BlockError::Io(_))));
}
