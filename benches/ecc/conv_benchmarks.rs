use convfec::ecc::{encode_to_vec, ConvCodec, ConvScheme};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_message(len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(len as u64);
    (0..len).map(|_| rng.gen()).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("conv_encode");
    let msg = random_message(1024);
    group.throughput(Throughput::Bytes(msg.len() as u64));

    for scheme in ConvScheme::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(scheme), &msg, |b, msg| {
            b.iter(|| encode_to_vec(scheme, black_box(msg)))
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("conv_decode");

    for scheme in [ConvScheme::V27, ConvScheme::V29, ConvScheme::V39] {
        for len in [64usize, 1024] {
            let msg = random_message(len);
            let encoded = encode_to_vec(scheme, &msg);
            let mut codec = ConvCodec::new(scheme);
            let mut out = vec![0u8; len];

            group.throughput(Throughput::Bytes(len as u64));
            group.bench_with_input(
                BenchmarkId::new(scheme.name(), len),
                &encoded,
                |b, encoded| b.iter(|| codec.decode(black_box(encoded), &mut out).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_decode_v615(c: &mut Criterion) {
    let mut group = c.benchmark_group("conv_decode_v615");
    group.sample_size(10);

    let msg = random_message(16);
    let encoded = encode_to_vec(ConvScheme::V615, &msg);
    let mut codec = ConvCodec::new(ConvScheme::V615);
    let mut out = vec![0u8; msg.len()];

    group.bench_function("16", |b| {
        b.iter(|| codec.decode(black_box(&encoded), &mut out).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_decode_v615);
criterion_main!(benches);
