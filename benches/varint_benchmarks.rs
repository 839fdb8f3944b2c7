use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use msglib::protocol::varint::{
    read_uvarint, read_varint, uvarint_size, write_uvarint, write_varint, zigzag_encode,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn encoding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("uvarint_encoding");

    // Граничные значения для каждого размера varint
    let test_cases = vec![
        ("1_byte", 127u64),
        ("2_bytes", 16_383),
        ("3_bytes", 2_097_151),
        ("5_bytes", u64::from(u32::MAX)),
        ("10_bytes", u64::MAX),
    ];

    for (name, value) in test_cases {
        group.bench_with_input(
            BenchmarkId::new("write_uvarint", name),
            &value,
            |b, &value| {
                let mut buf = Vec::with_capacity(10);
                b.iter(|| {
                    buf.clear();
                    write_uvarint(black_box(&mut buf), black_box(value)).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn decoding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("uvarint_decoding");

    let test_cases = vec![
        ("1_byte", 127u64),
        ("3_bytes", 2_097_151),
        ("10_bytes", u64::MAX),
    ];

    for (name, value) in test_cases {
        let mut encoded = Vec::new();
        write_uvarint(&mut encoded, value).unwrap();
        group.bench_with_input(
            BenchmarkId::new("read_uvarint", name),
            &encoded,
            |b, buf| {
                b.iter(|| {
                    let mut input = black_box(buf.as_slice());
                    black_box(read_uvarint(&mut input).unwrap());
                });
            },
        );
    }

    group.finish();
}

fn zigzag_benchmark(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);
    let values: Vec<i64> = (0..1024).map(|_| rng.gen_range(-1_000_000..1_000_000)).collect();

    let mut encoded = Vec::new();
    for &v in &values {
        write_varint(&mut encoded, v).unwrap();
    }

    c.bench_function("zigzag write 1024 signed", |b| {
        let mut buf = Vec::with_capacity(encoded.len());
        b.iter(|| {
            buf.clear();
            for &v in &values {
                write_varint(&mut buf, black_box(v)).unwrap();
            }
        });
    });

    c.bench_function("zigzag read 1024 signed", |b| {
        b.iter(|| {
            let mut input = black_box(encoded.as_slice());
            for _ in 0..values.len() {
                black_box(read_varint(&mut input).unwrap());
            }
        });
    });

    c.bench_function("uvarint_size 1024", |b| {
        b.iter(|| {
            values
                .iter()
                .map(|&v| uvarint_size(zigzag_encode(black_box(v))))
                .sum::<usize>()
        });
    });
}

criterion_group!(
    benches,
    encoding_benchmark,
    decoding_benchmark,
    zigzag_benchmark
);
criterion_main!(benches);
