use std::path::Path;

use lazy_static::lazy_static;
use oidc_trust_anchor::{
    error::KeyGenerationError,
    keypair::KeyGenerator,
    setup::{self, SetupArtifacts, SetupConfiguration},
};
use rsa::RsaPrivateKey;
use serde_json::Value;
use tempfile::TempDir;

pub const DEFAULT_ISSUER: &str = "https://oidc.example.com/cluster";

lazy_static! {
    pub static ref PRIVATE_KEY: RsaPrivateKey =
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
    pub static ref ANOTHER_PRIVATE_KEY: RsaPrivateKey =
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
}

/// Hands out the shared test key instead of generating a new one.
pub struct FixedKeyGenerator;

impl KeyGenerator for FixedKeyGenerator {
    fn generate(&self, _bits: usize) -> Result<RsaPrivateKey, KeyGenerationError> {
        Ok(PRIVATE_KEY.clone())
    }
}

pub fn write_artifacts(issuer: &str) -> (TempDir, SetupArtifacts) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = SetupConfiguration::builder()
        .issuer(issuer)
        .output_dir(dir.path())
        .build()
        .expect("Invalid configuration");
    let artifacts = setup::run(&config, &FixedKeyGenerator).expect("Failed to write artifacts");
    (dir, artifacts)
}

pub fn read_json(path: &Path) -> Value {
    let content = std::fs::read(path).expect("Failed to read artifact");
    serde_json::from_slice(&content).expect("Artifact is not valid JSON")
}
