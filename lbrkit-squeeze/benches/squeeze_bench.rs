//! Performance benchmarks for lbrkit-squeeze
//!
//! Evaluates encode/decode speed and ratio across data patterns typical
//! of CP/M library members (text, binaries, long runs).

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lbrkit_squeeze::{squeeze, unsqueeze};
use std::hint::black_box;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Uniform data - one long run (best case for the RLE layer)
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// Random data - no patterns (worst case)
    pub fn random(size: usize) -> Vec<u8> {
        // Simple PRNG for reproducible random data
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Text-like data - the typical squeezed member
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog.\r\n\
                     Pack my box with five dozen liquor jugs.\r\n";
        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let remaining = size - data.len();
            let chunk_size = remaining.min(text.len());
            data.extend_from_slice(&text[..chunk_size]);
        }
        data
    }
}

/// Member sizes typical of sector-addressed libraries
mod member_sizes {
    /// Small member: 4KB (32 sectors)
    pub const SMALL: usize = 4 * 1024;

    /// Medium member: 32KB
    pub const MEDIUM: usize = 32 * 1024;

    /// Large member: 128KB
    pub const LARGE: usize = 128 * 1024;
}

fn bench_encode_speed(c: &mut Criterion) {
    let mut group = c.benchmark_group("squeeze_encode");

    let sizes = [
        ("small_4KB", member_sizes::SMALL),
        ("medium_32KB", member_sizes::MEDIUM),
        ("large_128KB", member_sizes::LARGE),
    ];

    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", test_data::uniform as PatternGenerator),
        ("random", test_data::random as PatternGenerator),
        ("text", test_data::text_like as PatternGenerator),
    ];

    for (size_name, size) in sizes {
        for (pattern_name, generator) in patterns {
            let data = generator(size);
            let id = format!("{}/{}", size_name, pattern_name);

            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::from_parameter(&id), &data, |b, data| {
                b.iter(|| {
                    let packed = squeeze("bench.dat", black_box(data)).unwrap();
                    black_box(packed);
                });
            });
        }
    }

    group.finish();
}

fn bench_decode_speed(c: &mut Criterion) {
    let mut group = c.benchmark_group("squeeze_decode");

    let sizes = [
        ("small_4KB", member_sizes::SMALL),
        ("medium_32KB", member_sizes::MEDIUM),
        ("large_128KB", member_sizes::LARGE),
    ];

    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", test_data::uniform as PatternGenerator),
        ("random", test_data::random as PatternGenerator),
        ("text", test_data::text_like as PatternGenerator),
    ];

    for (size_name, size) in sizes {
        for (pattern_name, generator) in patterns {
            let original = generator(size);
            let packed = squeeze("bench.dat", &original).unwrap();
            let id = format!("{}/{}", size_name, pattern_name);

            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(BenchmarkId::from_parameter(&id), &packed, |b, packed| {
                b.iter(|| {
                    let out = unsqueeze(black_box(packed)).unwrap();
                    black_box(out);
                });
            });
        }
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("squeeze_roundtrip");

    let data = test_data::text_like(member_sizes::MEDIUM);
    group.throughput(Throughput::Bytes(member_sizes::MEDIUM as u64));
    group.bench_with_input(
        BenchmarkId::from_parameter("medium_32KB/text"),
        &data,
        |b, data| {
            b.iter(|| {
                let packed = squeeze("bench.dat", black_box(data)).unwrap();
                let out = unsqueeze(&packed).unwrap();
                black_box(out);
            });
        },
    );

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_speed,
    bench_decode_speed,
    bench_roundtrip,
);
criterion_main!(benches);
