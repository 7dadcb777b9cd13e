use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use raidfile::parity::write_parity_parallel;
use raidfile::{combine, detect, generate, Block, ChecksumArtifact, GroupWidth, StripeGeometry};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::hint::black_box;
use std::io::{self, Cursor};

fn random_data(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(0x5EED).fill_bytes(&mut data);
    data
}

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");

    for width in [2usize, 4, 8, 16] {
        let blocks: Vec<Block> = (0..width)
            .map(|i| Block::from_prefix(&random_data(1024 + i)[i..]))
            .collect();
        group.throughput(Throughput::Bytes((width * 1024) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &blocks, |b, blocks| {
            b.iter(|| black_box(combine(blocks)))
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let size = 16 * 1024 * 1024;
    let data = random_data(size);
    let mut group = c.benchmark_group("generate_16MB");
    group.throughput(Throughput::Bytes(size as u64));
    group.sample_size(10);

    for width in [3usize, 8] {
        let geometry = StripeGeometry::new(size as u64, GroupWidth::new(width).unwrap());
        group.bench_with_input(BenchmarkId::new("sequential", width), &geometry, |b, g| {
            b.iter(|| black_box(generate(&mut Cursor::new(&data), g).unwrap()))
        });
    }

    // The parallel path reads through its own file handles
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bench.bin");
    std::fs::write(&path, &data).unwrap();
    for width in [3usize, 8] {
        let geometry = StripeGeometry::new(size as u64, GroupWidth::new(width).unwrap());
        group.bench_with_input(BenchmarkId::new("parallel", width), &geometry, |b, g| {
            b.iter(|| black_box(write_parity_parallel(&path, g, &mut io::sink()).unwrap()))
        });
    }

    group.finish();
}

fn bench_detect(c: &mut Criterion) {
    let size = 16 * 1024 * 1024;
    let data = random_data(size);
    let checksums = ChecksumArtifact::compute(&mut Cursor::new(&data)).unwrap();

    let mut group = c.benchmark_group("detect_16MB");
    group.throughput(Throughput::Bytes(size as u64));
    group.sample_size(10);
    group.bench_function("intact", |b| {
        b.iter(|| black_box(detect(&mut Cursor::new(&data), &checksums).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_combine, bench_generate, bench_detect);
criterion_main!(benches);
