// Rotation of encrypted slots with Galois keys in the BGV encryption scheme.
//
// Encrypts the slots `0..N`, rotates them homomorphically by a user-provided
// shift, and checks the decrypted result against the rotation in the clear.

use std::{env, error::Error, process::exit, time::Instant};

use console::style;
use rand::thread_rng;
use rotkey::bgv::{
    self, keys::RotationKeySet, BgvParametersBuilder, Encoding, Plaintext, SecretKey,
};
use rotkey_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn print_notice_and_exit(error: Option<String>) {
    println!(
        "{} Rotation of the slots of a BGV ciphertext",
        style("  overview:").magenta().bold()
    );
    println!(
        "{} rotate [-h] [--help] [--degree=<value>] [--shift=<value>]",
        style("     usage:").magenta().bold()
    );
    println!(
        "{} {} must be a power of two of at least 8, and |{}| < {} / 2",
        style("constraints:").magenta().bold(),
        style("degree").blue(),
        style("shift").blue(),
        style("degree").blue(),
    );
    if let Some(error) = error {
        println!("{} {}", style("     error:").red().bold(), error);
    }
    exit(0);
}

fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let plaintext_modulus: u64 = 65537;
    let moduli_sizes = [62, 62, 62];

    let args: Vec<String> = env::args().skip(1).collect();
    if args.contains(&"-h".to_string()) || args.contains(&"--help".to_string()) {
        print_notice_and_exit(None)
    }

    let mut degree = 1024;
    let mut shift: i64 = 1;
    for arg in &args {
        if let Some(value) = arg.strip_prefix("--degree=") {
            match value.parse::<usize>() {
                Ok(d) => degree = d,
                Err(_) => print_notice_and_exit(Some("Invalid `--degree` argument".to_string())),
            }
        } else if let Some(value) = arg.strip_prefix("--shift=") {
            match value.parse::<i64>() {
                Ok(s) => shift = s,
                Err(_) => print_notice_and_exit(Some("Invalid `--shift` argument".to_string())),
            }
        } else {
            print_notice_and_exit(Some(format!("Unrecognized argument: {arg}")))
        }
    }

    println!("# Galois rotation");
    println!("\tdegree = {degree}");
    println!("\tplaintext_modulus = {plaintext_modulus}");
    println!("\tshift = {shift}");

    let mut rng = thread_rng();
    let par = BgvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli_sizes(&moduli_sizes)
        .build_arc()?;
    let sk = SecretKey::random(&par, &mut rng)?;

    let now = Instant::now();
    let keys = RotationKeySet::generate(&par, &sk, &mut rng)?;
    println!("⏱  {} keys generated in {:?}", keys.len(), now.elapsed());

    let values = (0..degree as u64).collect::<Vec<_>>();
    let pt = Plaintext::try_encode(&values[..], Encoding::simd(), &par)?;
    let ct = sk.try_encrypt(&pt, &mut rng)?;

    let now = Instant::now();
    let rotated = bgv::roll(&keys, &[ct], shift)?;
    println!("⏱  rotation in {:?}", now.elapsed());

    let slots = Vec::<u64>::try_decode(&sk.try_decrypt(&rotated[0])?, Encoding::simd())?;
    let row_size = degree / 2;
    let expected = values
        .chunks(row_size)
        .flat_map(|row| {
            let mut row = row.to_vec();
            if shift >= 0 {
                row.rotate_right(shift as usize);
            } else {
                row.rotate_left(shift.unsigned_abs() as usize);
            }
            row
        })
        .collect::<Vec<_>>();

    println!("\tfirst slots = {:?}", &slots[..row_size.min(8)]);
    println!("\tnoise = {} bits", sk.measure_noise(&rotated[0])?);
    if slots != expected {
        println!("{}", style("rotation mismatch").red().bold());
        exit(1);
    }
    println!("{}", style("rotation verified").green().bold());
    Ok(())
}
