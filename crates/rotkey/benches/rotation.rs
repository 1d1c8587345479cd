use criterion::{criterion_group, criterion_main, Criterion};
use rotkey::bgv::keys::{FastRotationKey, RotationKeySet};
use rotkey::bgv::{self, BgvParametersBuilder, Ciphertext, Encoding, Plaintext, SecretKey};
use rotkey_traits::{FheEncoder, FheEncrypter};
use rand::thread_rng;
use std::time::Duration;

fn bench_rotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotation");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    let mut rng = thread_rng();
    for degree in [1024, 4096] {
        let par = BgvParametersBuilder::new()
            .set_degree(degree)
            .set_plaintext_modulus(65537)
            .set_moduli_sizes(&[62, 62, 62])
            .build_arc()
            .unwrap();
        let sk = SecretKey::random(&par, &mut rng).unwrap();

        group.bench_function(format!("keygen/{degree}"), |b| {
            b.iter(|| RotationKeySet::generate(&par, &sk, &mut thread_rng()).unwrap());
        });

        group.bench_function(format!("fast_keygen/{degree}"), |b| {
            b.iter(|| FastRotationKey::generate(&sk, par.max_level()).unwrap());
        });

        let keys = RotationKeySet::generate(&par, &sk, &mut rng).unwrap();
        let values = (0..degree as u64).collect::<Vec<_>>();
        let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &par).unwrap();
        let batch = (0..8)
            .map(|_| sk.try_encrypt(&pt, &mut rng).unwrap())
            .collect::<Vec<Ciphertext>>();

        group.bench_function(format!("roll/{degree}/1"), |b| {
            b.iter(|| bgv::roll(&keys, &batch[..1], 1).unwrap());
        });

        group.bench_function(format!("roll/{degree}/8"), |b| {
            b.iter(|| bgv::roll(&keys, &batch, -3).unwrap());
        });

        let blobs = FastRotationKey::generate(&sk, par.max_level())
            .unwrap()
            .serialize();
        group.bench_function(format!("fast_key_decode/{degree}"), |b| {
            b.iter(|| {
                let key = FastRotationKey::deserialize_shallow(&blobs).unwrap();
                key.lazy_decode(&par.ctx()[0]).unwrap();
                key
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rotation);
criterion_main!(benches);
