//! Criterion benchmarks for the LZ4 block codec.
//!
//! Run with:
//!   cargo bench --bench block

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lz4_block::{decompress_known_size, max_compressed_length, Lz4Compressor};

mod corpus {
    include!("corpus.rs");
}

fn bench_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("block");

    for &size in &[65_536usize, 262_144] {
        let compressible = corpus::compressible_data(size);
        let incompressible = corpus::incompressible_data(size, 0xC0FFEE);
        let bound = max_compressed_length(size);

        // ── compress_into, compressible input ─────────────────────────────────
        {
            let mut compressor = Lz4Compressor::new();
            let mut dst = vec![0u8; bound];
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new("compress_into/text", size),
                &compressible,
                |b, data| b.iter(|| compressor.compress_into(data, &mut dst)),
            );
        }

        // ── compress_into, incompressible input ───────────────────────────────
        {
            let mut compressor = Lz4Compressor::new();
            let mut dst = vec![0u8; bound];
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new("compress_into/random", size),
                &incompressible,
                |b, data| b.iter(|| compressor.compress_into(data, &mut dst)),
            );
        }

        // ── compress_to_writer ────────────────────────────────────────────────
        {
            let mut compressor = Lz4Compressor::new();
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new("compress_to_writer/text", size),
                &compressible,
                |b, data| {
                    b.iter(|| {
                        let mut sink = Vec::with_capacity(bound);
                        compressor.compress_to_writer(data, &mut sink).unwrap()
                    })
                },
            );
        }

        // ── decompress_known_size ─────────────────────────────────────────────
        {
            let mut compressor = Lz4Compressor::new();
            let compressed = compressor.compress_to_vec(&compressible);
            let mut dst = vec![0u8; size];

            // Throughput in decompressed bytes, the quantity that matters.
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new("decompress_known_size/text", size),
                &compressed,
                |b, data| b.iter(|| decompress_known_size(data, &mut dst).unwrap()),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_block);
criterion_main!(benches);
