use std::io::Write;

use log::debug;
use rand::rngs::OsRng;
use rsa::{
    pkcs1::EncodeRsaPrivateKey,
    pkcs8::{EncodePublicKey, LineEnding},
    RsaPrivateKey, RsaPublicKey,
};

#[cfg(test)]
use mockall::automock;

use crate::error::{EncodeError, KeyGenerationError};

/// Smallest modulus size accepted for a signing key.
pub const MIN_KEY_BITS: usize = 2048;

/// Largest modulus size `rsa` accepts when loading a public key back.
pub const MAX_KEY_BITS: usize = 4096;

pub const DEFAULT_KEY_BITS: usize = 2048;

/// Source of fresh RSA key pairs.
#[cfg_attr(test, automock)]
pub trait KeyGenerator {
    fn generate(&self, bits: usize) -> Result<RsaPrivateKey, KeyGenerationError>;
}

/// Generates keys from the operating system's random number generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRngKeyGenerator;

impl KeyGenerator for OsRngKeyGenerator {
    fn generate(&self, bits: usize) -> Result<RsaPrivateKey, KeyGenerationError> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
            return Err(KeyGenerationError::UnsupportedKeySize(bits));
        }
        RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| KeyGenerationError::GenerationFailed(e.to_string()))
    }
}

/// Write `key` as a PEM encoded SubjectPublicKeyInfo (`PUBLIC KEY`).
pub fn write_public_key(sink: &mut impl Write, key: &RsaPublicKey) -> Result<(), EncodeError> {
    let pem = key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| EncodeError::Encoding(e.to_string()))?;
    sink.write_all(pem.as_bytes())?;
    debug!("Wrote {} bytes of public key PEM", pem.len());
    Ok(())
}

/// Write `key` as a PEM encoded PKCS#1 structure (`RSA PRIVATE KEY`).
///
/// The PKCS#1 container is part of the file format: consumers of the
/// private key file may rely on the `RSA PRIVATE KEY` header.
pub fn write_private_key(sink: &mut impl Write, key: &RsaPrivateKey) -> Result<(), EncodeError> {
    let pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| EncodeError::Encoding(e.to_string()))?;
    sink.write_all(pem.as_bytes())?;
    Ok(())
}
