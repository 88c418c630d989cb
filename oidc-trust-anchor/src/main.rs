use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use oidc_trust_anchor::{
    keypair::{OsRngKeyGenerator, DEFAULT_KEY_BITS},
    setup::{self, SetupArtifacts, SetupConfiguration, DEFAULT_OUTPUT_DIR},
};

/// Generate the signing key pair, JWKS and discovery document of an OIDC trust anchor
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Issuer URL the discovery document is published under
    #[arg(long, required_unless_present = "placeholder_issuer")]
    issuer: Option<String>,

    /// Write a discovery document without issuer, to be completed later
    #[arg(long, conflicts_with = "issuer")]
    placeholder_issuer: bool,

    /// Value of authorization_endpoint in the discovery document
    #[arg(long)]
    authorization_endpoint: Option<String>,

    /// Directory the artifacts are written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// RSA modulus size in bits
    #[arg(long, default_value_t = DEFAULT_KEY_BITS)]
    key_bits: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(args) {
        Ok(artifacts) => {
            info!("Published key id: {}", artifacts.key_id);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<SetupArtifacts, Box<dyn Error>> {
    let mut builder = SetupConfiguration::builder()
        .output_dir(args.output_dir)
        .key_bits(args.key_bits)
        .allow_placeholder_issuer(args.placeholder_issuer);
    if let Some(issuer) = args.issuer {
        builder = builder.issuer(issuer);
    }
    if let Some(authorization_endpoint) = args.authorization_endpoint {
        builder = builder.authorization_endpoint(authorization_endpoint);
    }
    let config = builder.build()?;
    Ok(setup::run(&config, &OsRngKeyGenerator)?)
}
