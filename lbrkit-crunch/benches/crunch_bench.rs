//! Benchmarks for the crunch codec.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use lbrkit_crunch::{crunch, uncrunch};

type PatternGenerator = fn(usize) -> Vec<u8>;

mod test_data {
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    pub fn random(size: usize) -> Vec<u8> {
        let mut state = 0x1234_5678_9ABC_DEF0u64;
        (0..size)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                (state >> 33) as u8
            })
            .collect()
    }

    pub fn text_like(size: usize) -> Vec<u8> {
        let line = b"REM CP/M BASIC PROGRAM LINE WITH SOME REPEATED WORDS\r\n";
        line.iter().copied().cycle().take(size).collect()
    }
}

mod member_sizes {
    pub const SMALL: usize = 4 * 1024;
    pub const MEDIUM: usize = 32 * 1024;
    pub const LARGE: usize = 128 * 1024;
}

fn bench_encode_speed(c: &mut Criterion) {
    let mut group = c.benchmark_group("crunch_encode");
    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", test_data::uniform),
        ("random", test_data::random),
        ("text", test_data::text_like),
    ];

    for size in [member_sizes::SMALL, member_sizes::MEDIUM, member_sizes::LARGE] {
        for (name, generator) in patterns {
            let data = generator(size);
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{name}_{size}")),
                &data,
                |b, data| {
                    b.iter(|| crunch("bench.dat", black_box(data)).expect("encode"));
                },
            );
        }
    }
    group.finish();
}

fn bench_decode_speed(c: &mut Criterion) {
    let mut group = c.benchmark_group("crunch_decode");
    let patterns: [(&str, PatternGenerator); 3] = [
        ("uniform", test_data::uniform),
        ("random", test_data::random),
        ("text", test_data::text_like),
    ];

    for size in [member_sizes::SMALL, member_sizes::MEDIUM, member_sizes::LARGE] {
        for (name, generator) in patterns {
            let data = generator(size);
            let packed = crunch("bench.dat", &data).expect("encode");
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{name}_{size}")),
                &packed,
                |b, packed| {
                    b.iter(|| uncrunch(black_box(packed)).expect("decode"));
                },
            );
        }
    }
    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let data = test_data::text_like(member_sizes::MEDIUM);
    c.bench_function("crunch_roundtrip_text_32k", |b| {
        b.iter(|| {
            let packed = crunch("bench.dat", black_box(&data)).expect("encode");
            uncrunch(black_box(&packed)).expect("decode")
        });
    });
}

criterion_group!(benches, bench_encode_speed, bench_decode_speed, bench_roundtrip);
criterion_main!(benches);
