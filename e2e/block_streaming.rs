//! E2E Test Suite 03: Streaming-Sink Compression
//!
//! Validates Lz4Compressor::compress_to_writer:
//! - round-trips through an in-memory writer
//! - byte-for-byte agreement with the bounded-array path on identical input
//!   (both paths share one encoder core and reset the hash index per call)
//! - scratch-buffer batching on payloads larger than the 65535-byte window
//! - writer failure propagation

extern crate lz4_block;

use std::io::{self, Write};

use lz4_block::{
    decompress_known_size, decompress_to_vec, max_compressed_length, Lz4BlockError, Lz4Compressor,
};

/// Payload with no repeated 4-byte window (see suite 02 for the layout);
/// forces a single literal run of the full input length.
fn no_match_payload(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 3);
    let mut k = 0u32;
    while out.len() < len {
        out.push(0x80 | ((k >> 14) & 0x7F) as u8);
        out.push(((k >> 7) & 0x7F) as u8);
        out.push((k & 0x7F) as u8);
        k += 1;
    }
    out.truncate(len);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: writer round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_writer_roundtrip() {
    let original = b"stream me, stream me, stream me, stream me again. ".repeat(40);

    let mut compressor = Lz4Compressor::new();
    let mut sink: Vec<u8> = Vec::new();
    let written = compressor
        .compress_to_writer(&original, &mut sink)
        .expect("in-memory writer cannot fail");

    assert_eq!(written, sink.len());
    assert!(written < original.len());

    let mut restored = vec![0u8; original.len()];
    decompress_known_size(&sink, &mut restored).expect("decode should succeed");
    assert_eq!(restored, original);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: bounded and streaming paths agree byte for byte
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_paths_agree_on_identical_input() {
    let payloads: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"tiny".to_vec(),
        b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_vec(),
        b"alternating payload alternating payload alternating payload".repeat(25),
        no_match_payload(3000),
    ];

    for payload in &payloads {
        let mut compressor = Lz4Compressor::new();

        let mut bounded = vec![0u8; max_compressed_length(payload.len())];
        let n = compressor.compress_into(payload, &mut bounded);
        assert!(n > 0);

        let mut streamed: Vec<u8> = Vec::new();
        let written = compressor
            .compress_to_writer(payload, &mut streamed)
            .expect("in-memory writer cannot fail");

        assert_eq!(
            &bounded[..n],
            &streamed[..],
            "paths diverged on payload of {} bytes",
            payload.len()
        );
        assert_eq!(n, written);
    }
}

#[test]
fn test_paths_agree_under_interleaved_reuse() {
    // One instance, alternating modes and payloads: the per-call index reset
    // means history cannot bleed into either path.
    let a = b"payload A payload A payload A payload A".repeat(30);
    let b = no_match_payload(2048);

    let mut compressor = Lz4Compressor::new();

    let first = compressor.compress_to_vec(&a);
    let mut streamed_b: Vec<u8> = Vec::new();
    compressor
        .compress_to_writer(&b, &mut streamed_b)
        .expect("in-memory writer cannot fail");
    let mut streamed_a: Vec<u8> = Vec::new();
    compressor
        .compress_to_writer(&a, &mut streamed_a)
        .expect("in-memory writer cannot fail");
    let second = compressor.compress_to_vec(&a);

    assert_eq!(first, streamed_a);
    assert_eq!(first, second);
    assert_eq!(decompress_to_vec(&streamed_b).unwrap(), b);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: payloads around and beyond the scratch-buffer size
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_literal_run_larger_than_scratch() {
    // A 200 KB matchless payload produces one literal run far larger than
    // the 65535-byte scratch, exercising the direct-write bypass.
    let original = no_match_payload(200_000);

    let mut compressor = Lz4Compressor::new();
    let mut sink: Vec<u8> = Vec::new();
    let written = compressor
        .compress_to_writer(&original, &mut sink)
        .expect("in-memory writer cannot fail");
    assert_eq!(written, sink.len());

    let mut restored = vec![0u8; original.len()];
    decompress_known_size(&sink, &mut restored).expect("decode should succeed");
    assert_eq!(restored, original);
}

#[test]
fn test_large_repetitive_payload_streams() {
    let original = b"many sequences flow through the scratch buffer here. ".repeat(6000);
    assert!(original.len() > 300_000);

    let mut compressor = Lz4Compressor::new();
    let mut sink: Vec<u8> = Vec::new();
    compressor
        .compress_to_writer(&original, &mut sink)
        .expect("in-memory writer cannot fail");
    assert!(sink.len() < original.len() / 4);

    let mut restored = vec![0u8; original.len()];
    decompress_known_size(&sink, &mut restored).expect("decode should succeed");
    assert_eq!(restored, original);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: empty payload through the writer
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_payload_streams_single_token() {
    let mut compressor = Lz4Compressor::new();
    let mut sink: Vec<u8> = Vec::new();
    let written = compressor
        .compress_to_writer(&[], &mut sink)
        .expect("in-memory writer cannot fail");

    assert_eq!(written, 1);
    assert_eq!(sink, vec![0u8]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: writer failure propagates as an I/O error
// ─────────────────────────────────────────────────────────────────────────────

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink rejected write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_writer_failure_propagates() {
    let original = b"this will never arrive, this will never arrive".repeat(10);

    let mut compressor = Lz4Compressor::new();
    let result = compressor.compress_to_writer(&original, &mut FailingWriter);

    assert!(matches!(result, Err(Lz4BlockError::Io(_))));
}
