//! E2E Test Suite 02: Token-Stream Format
//!
//! Pins down the on-wire token layout rather than just round-trip behaviour:
//! - every emitted match offset lies in [1, 65535] and inside the window
//! - length-extension encoding for literal runs of exactly 15 / 270 / 65535
//!   bytes, verified byte for byte
//! - self-overlapping match copies (offset smaller than the copy length)
//! - hand-built streams decoded against expected output

extern crate lz4_block;

use lz4_block::{decompress_into, decompress_known_size, decompress_to_vec, Lz4Compressor};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Payload in which every 4-byte window is globally unique, so the encoder
/// can never find a match and must emit one literal run.
///
/// Built from 3-byte groups tagged by their high bits (0x80, 0x00, 0x00)
/// carrying a 21-bit counter: any 4 consecutive bytes pin down both the
/// group phase and the counter value.
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

/// A match parsed from a compressed stream.
struct ParsedMatch {
    out_pos: usize,
    offset: usize,
    match_len: usize,
}

/// Reference token-stream walker: decodes `stream` the slow way, recording
/// every match it encounters.  Panics on any malformed structure, so it
/// doubles as a layout check for encoder output.
fn walk(stream: &[u8]) -> (Vec<u8>, Vec<ParsedMatch>) {
    let mut out = Vec::new();
    let mut matches = Vec::new();
    let mut ip = 0usize;

    fn read_extension(stream: &[u8], ip: &mut usize) -> usize {
        let mut total = 0;
        loop {
            let b = stream[*ip];
            *ip += 1;
            total += b as usize;
            if b != 255 {
                return total;
            }
        }
    }

    loop {
        let token = stream[ip];
        ip += 1;

        let mut lit_len = (token >> 4) as usize;
        if lit_len == 15 {
            lit_len += read_extension(stream, &mut ip);
        }
        out.extend_from_slice(&stream[ip..ip + lit_len]);
        ip += lit_len;

        if ip == stream.len() {
            return (out, matches);
        }

        let offset = u16::from_le_bytes([stream[ip], stream[ip + 1]]) as usize;
        ip += 2;

        let mut match_len = (token & 0x0F) as usize;
        if match_len == 15 {
            match_len += read_extension(stream, &mut ip);
        }
        match_len += 4;

        matches.push(ParsedMatch {
            out_pos: out.len(),
            offset,
            match_len,
        });

        // Byte-by-byte so self-overlapping references replicate correctly.
        let start = out.len() - offset;
        for i in 0..match_len {
            let b = out[start + i];
            out.push(b);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: every emitted offset is in [1, 65535] and inside the window
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_emitted_offsets_stay_in_window() {
    let phrase = b"offsets must stay within the sliding window; offsets must not escape. ";
    let original = phrase.repeat(1500); // ≈ 106 KB, larger than the window

    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    let (reconstructed, matches) = walk(&compressed);
    assert_eq!(reconstructed, original);
    assert!(!matches.is_empty(), "repetitive input must produce matches");

    for m in &matches {
        assert!(m.offset >= 1, "offset below 1 at out_pos {}", m.out_pos);
        assert!(m.offset <= 65_535, "offset beyond window at {}", m.out_pos);
        assert!(m.offset <= m.out_pos, "offset reaches before output start");
        assert!(m.match_len >= 4, "match shorter than MINMATCH");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: literal-run length extension — exactly 15, 270, 65535 bytes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_literal_run_extension_15() {
    let original = no_match_payload(15);
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    // 15 is the first value needing the extension: code 15, remainder 0.
    assert_eq!(compressed.len(), 1 + 1 + 15);
    assert_eq!(compressed[0], 0xF0);
    assert_eq!(compressed[1], 0);
    assert_eq!(&compressed[2..], &original[..]);

    assert_eq!(decompress_to_vec(&compressed).unwrap(), original);
}

#[test]
fn test_literal_run_extension_270() {
    let original = no_match_payload(270);
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    // 270 - 15 = 255: one full 255 byte, then a zero terminal byte.
    assert_eq!(compressed.len(), 1 + 2 + 270);
    assert_eq!(compressed[0], 0xF0);
    assert_eq!(compressed[1], 255);
    assert_eq!(compressed[2], 0);
    assert_eq!(&compressed[3..], &original[..]);

    assert_eq!(decompress_to_vec(&compressed).unwrap(), original);
}

#[test]
fn test_literal_run_extension_65535() {
    let original = no_match_payload(65_535);
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    // 65535 - 15 = 65520 = 256 × 255 + 240.
    assert_eq!(compressed.len(), 1 + 257 + 65_535);
    assert_eq!(compressed[0], 0xF0);
    assert!(compressed[1..257].iter().all(|&b| b == 255));
    assert_eq!(compressed[257], 240);
    assert_eq!(&compressed[258..], &original[..]);

    let mut dst = vec![0u8; 65_535];
    let produced = decompress_known_size(&compressed, &mut dst).unwrap();
    assert_eq!(produced, 65_535);
    assert_eq!(dst, original);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: self-overlapping copy — run of identical bytes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_overlapping_copy_roundtrip() {
    // 20 identical bytes force a match with offset 1 and length > offset:
    // the decoder must replicate bytes it has only just produced.
    let original = vec![b'x'; 20];
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);
    assert!(compressed.len() < original.len());

    let (reconstructed, matches) = walk(&compressed);
    assert_eq!(reconstructed, original);
    assert!(
        matches.iter().any(|m| m.offset == 1 && m.match_len > 1),
        "a uniform run should encode as a self-overlapping match"
    );

    assert_eq!(decompress_to_vec(&compressed).unwrap(), original);
}

#[test]
fn test_overlapping_copy_handbuilt_stream() {
    // lit 1 ("Z"), then a match at offset 1 with code 15 + extension 11:
    // match length 15 + 11 + 4 = 30, then a terminal literal ("Q").
    let stream = [0x1F, b'Z', 0x01, 0x00, 0x0B, 0x10, b'Q'];

    let mut dst = vec![0u8; 64];
    let produced = decompress_into(&stream, &mut dst).expect("stream is well formed");
    assert_eq!(produced, 32);

    let mut expected = vec![b'Z'; 31];
    expected.push(b'Q');
    assert_eq!(&dst[..produced], &expected[..]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: hand-built streams — decoder against fixed layouts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_handbuilt_match_length_extension() {
    // One sequence: 4 literals "abcd", offset 4, match code 15 extended by
    // 255 + 45 → match length 15 + 300 + 4 = 319; then a terminal literal "e".
    let mut stream = vec![0x4F, b'a', b'b', b'c', b'd'];
    stream.extend_from_slice(&[0x04, 0x00, 0xFF, 0x2D]);
    stream.extend_from_slice(&[0x10, b'e']);

    let mut dst = vec![0u8; 400];
    let produced = decompress_into(&stream, &mut dst).expect("stream is well formed");
    assert_eq!(produced, 4 + 319 + 1);

    // The match replicates "abcd" cyclically for 319 bytes.
    for i in 0..319 {
        assert_eq!(dst[4 + i], b"abcd"[i % 4], "mismatch at match byte {i}");
    }
    assert_eq!(dst[produced - 1], b'e');
}

#[test]
fn test_handbuilt_literal_length_extension_decode() {
    // Terminal-only block with a 270-byte literal run spelled out by hand.
    let mut stream = vec![0xF0, 0xFF, 0x00];
    let payload = no_match_payload(270);
    stream.extend_from_slice(&payload);

    let mut dst = vec![0u8; 270];
    let produced = decompress_known_size(&stream, &mut dst).unwrap();
    assert_eq!(produced, 270);
    assert_eq!(dst, payload);
}

#[test]
fn test_handbuilt_zero_literal_sequences() {
    // "acac" with a minimal match at offset 4, then a zero-literal sequence
    // (match length 6 at offset 2), then terminal "tail".
    let mut stream = vec![0x40, b'a', b'c', b'a', b'c', 0x04, 0x00];
    stream.extend_from_slice(&[0x02, 0x02, 0x00]); // lit 0, match 6 @ 2
    stream.extend_from_slice(&[0x40, b't', b'a', b'i', b'l']);

    let mut dst = vec![0u8; 64];
    let produced = decompress_into(&stream, &mut dst).expect("stream is well formed");

    // "acac" + "acac" + 6 bytes repeating the 2-byte pattern + "tail"
    let expected = b"acacacacacacactail";
    assert_eq!(produced, expected.len());
    assert_eq!(&dst[..produced], &expected[..]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: incompressible payload stays a single literal run
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_matchless_payload_is_pure_literals() {
    let original = no_match_payload(5000);
    let mut compressor = Lz4Compressor::new();
    let compressed = compressor.compress_to_vec(&original);

    let (reconstructed, matches) = walk(&compressed);
    assert_eq!(reconstructed, original);
    assert!(matches.is_empty(), "no 4-byte window repeats, so no matches");

    // token + extension bytes + the payload verbatim
    let extension_bytes = (5000 - 15) / 255 + 1;
    assert_eq!(compressed.len(), 1 + extension_bytes + 5000);
}
