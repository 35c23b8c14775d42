//! Synthetic benchmark payload generators.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Compressible synthetic data: a Latin-like filler phrase repeated to
/// exactly `size` bytes, so throughput numbers reflect the codec rather
/// than the data source.
pub fn compressible_data(size: usize) -> Vec<u8> {
    const FILLER: &[u8] = b"Sed ut perspiciatis unde omnis iste natus error sit voluptatem \
        accusantium doloremque laudantium, totam rem aperiam, eaque ipsa quae ab illo \
        inventore veritatis et quasi architecto beatae vitae dicta sunt explicabo. \
        Nemo enim ipsam voluptatem quia voluptas sit aspernatur aut odit aut fugit. ";

    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let take = (size - out.len()).min(FILLER.len());
        out.extend_from_slice(&FILLER[..take]);
    }
    out
}

/// Incompressible synthetic data: seeded uniform random bytes.
pub fn incompressible_data(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.gen()).collect()
}
