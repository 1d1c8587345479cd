use proptest::prelude::*;
use rand::thread_rng;
use rotkey::bgv::keys::{
    FastRotationKey, KeyVariant, LeveledRotationKeys, RotationConfig, RotationKeySet,
};
use rotkey::bgv::{
    self, BgvParameters, BgvParametersBuilder, Ciphertext, Encoding, Plaintext, SecretKey,
};
use rotkey_traits::{
    DeserializeParametrized, FheDecoder, FheDecrypter, FheEncoder, FheEncrypter, Serialize,
};
use std::{error::Error, sync::Arc};

fn parameters(degree: usize, num_moduli: usize) -> Result<Arc<BgvParameters>, Box<dyn Error>> {
    Ok(BgvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(1153)
        .set_moduli_sizes(&vec![62; num_moduli])
        .build_arc()?)
}

fn decrypt(sk: &SecretKey, ct: &Ciphertext) -> Result<Vec<u64>, Box<dyn Error>> {
    Ok(Vec::<u64>::try_decode(&sk.try_decrypt(ct)?, Encoding::simd())?)
}

fn rolled(values: &[u64], shift: i64) -> Vec<u64> {
    let row_size = values.len() / 2;
    values
        .chunks(row_size)
        .flat_map(|row| {
            let mut row = row.to_vec();
            row.rotate_right(shift.rem_euclid(row_size as i64) as usize);
            row
        })
        .collect()
}

#[test]
fn rotate_serialized_ciphertexts() -> Result<(), Box<dyn Error>> {
    let mut rng = thread_rng();
    let par = parameters(32, 2)?;
    let sk = SecretKey::random(&par, &mut rng)?;
    let keys = RotationKeySet::generate(&par, &sk, &mut rng)?;

    let values = (0..32u64).map(|i| i * 7).collect::<Vec<_>>();
    let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &par)?;
    let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng)?;

    let received = Ciphertext::from_bytes(&ct.to_bytes(), &par)?;
    let rotated = bgv::roll(&keys, &[received], 5)?;
    let received = Ciphertext::from_bytes(&rotated[0].to_bytes(), &par)?;
    assert_eq!(decrypt(&sk, &received)?, rolled(&values, 5));
    Ok(())
}

#[test]
fn rotate_at_lower_level() -> Result<(), Box<dyn Error>> {
    let mut rng = thread_rng();
    let par = parameters(16, 3)?;
    let sk = SecretKey::random(&par, &mut rng)?;
    let keys =
        LeveledRotationKeys::generate(&par, &sk, &[], &RotationConfig::default(), &mut rng)?;
    assert_eq!(keys.levels().collect::<Vec<_>>(), vec![1, 2, 3]);

    let values = (0..16u64).collect::<Vec<_>>();
    let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &par)?;
    let ct = sk.try_encrypt_at_level(&pt, 1, &mut rng)?;

    // Keys of another level do not apply.
    assert!(bgv::roll(keys.get(3)?, &[ct.clone()], 1).is_err());

    let rotated = keys.roll(&[ct], -6)?;
    assert_eq!(rotated[0].level(), 1);
    assert_eq!(decrypt(&sk, &rotated[0])?, rolled(&values, -6));
    Ok(())
}

#[test]
fn transfer_fast_rotation_key() -> Result<(), Box<dyn Error>> {
    let mut rng = thread_rng();
    let par = parameters(16, 2)?;
    let sk = SecretKey::random(&par, &mut rng)?;

    let sent = KeyVariant::from(FastRotationKey::generate(&sk, par.max_level())?);
    let blobs = sent.encode()?;

    let mut received = KeyVariant::from(FastRotationKey::default());
    received.decode(&blobs)?;
    let KeyVariant::FastRotationKey(key) = &received else {
        panic!("unexpected variant {}", received.type_name());
    };
    assert!(!key.is_decoded());
    key.lazy_decode(par.ctx_at_level(par.max_level())?)?;
    assert!(key.is_decoded());
    assert_eq!(key.len(), 3);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn rotations_compose(
        a in -3i64..=3,
        b in -3i64..=3,
        values in proptest::collection::vec(0u64..1153, 8),
    ) {
        let mut rng = thread_rng();
        let par = parameters(8, 1).unwrap();
        let sk = SecretKey::random(&par, &mut rng).unwrap();
        let keys = RotationKeySet::generate(&par, &sk, &mut rng).unwrap();

        let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &par).unwrap();
        let ct: Ciphertext = sk.try_encrypt(&pt, &mut rng).unwrap();
        let rotated = bgv::roll(&keys, &bgv::roll(&keys, &[ct], a).unwrap(), b).unwrap();
        prop_assert_eq!(decrypt(&sk, &rotated[0]).unwrap(), rolled(&values, a + b));
    }
}
