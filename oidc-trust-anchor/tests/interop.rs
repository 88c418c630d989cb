use std::{
    fs,
    time::{SystemTime, UNIX_EPOCH},
};

use jsonwebtoken::{
    decode, decode_header, encode,
    errors::ErrorKind,
    jwk::{AlgorithmParameters, JwkSet, KeyAlgorithm, PublicKeyUse},
    Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rsa::pkcs1::EncodeRsaPrivateKey;
use serde_json::{json, Value};

use crate::common::{read_json, write_artifacts, ANOTHER_PRIVATE_KEY, DEFAULT_ISSUER};

pub mod common;

fn token(encoding_key: &EncodingKey, kid: &str) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_owned());
    encode(
        &header,
        &json!({
            "iss": DEFAULT_ISSUER,
            "sub": "system:serviceaccount:default:my-app",
            "exp": exp
        }),
        encoding_key,
    )
    .unwrap()
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_issuer(&[DEFAULT_ISSUER]);
    validation
}

fn published_jwks(path: &std::path::Path) -> JwkSet {
    serde_json::from_slice(&fs::read(path).unwrap()).expect("Not a valid JWK set")
}

#[test]
fn jwks_parses_as_jwk_set() {
    let (_dir, artifacts) = write_artifacts(DEFAULT_ISSUER);
    let jwks = published_jwks(&artifacts.jwks);

    assert_eq!(jwks.keys.len(), 1);
    let jwk = &jwks.keys[0];
    assert_eq!(jwk.common.key_id.as_deref(), Some(artifacts.key_id.as_str()));
    assert!(matches!(
        jwk.common.public_key_use,
        Some(PublicKeyUse::Signature)
    ));
    assert!(matches!(jwk.common.key_algorithm, Some(KeyAlgorithm::RS256)));
    assert!(matches!(jwk.algorithm, AlgorithmParameters::RSA(_)));
}

#[test]
fn token_signed_with_private_key_verifies_against_jwks() {
    let (_dir, artifacts) = write_artifacts(DEFAULT_ISSUER);
    let encoding_key = EncodingKey::from_rsa_pem(&fs::read(&artifacts.private_key).unwrap())
        .expect("Private key is not a valid RSA PEM");
    let token = token(&encoding_key, &artifacts.key_id);

    let header = decode_header(&token).unwrap();
    let jwks = published_jwks(&artifacts.jwks);
    let jwk = jwks.find(&header.kid.unwrap()).expect("Unknown kid");
    let decoding_key = DecodingKey::from_jwk(jwk).unwrap();

    let claims = decode::<Value>(&token, &decoding_key, &validation())
        .unwrap()
        .claims;
    assert_eq!(claims["sub"], "system:serviceaccount:default:my-app");
}

#[test]
fn token_verifies_against_public_key_pem() {
    let (_dir, artifacts) = write_artifacts(DEFAULT_ISSUER);
    let encoding_key = EncodingKey::from_rsa_pem(&fs::read(&artifacts.private_key).unwrap())
        .unwrap();
    let token = token(&encoding_key, &artifacts.key_id);

    let decoding_key = DecodingKey::from_rsa_pem(&fs::read(&artifacts.public_key).unwrap())
        .expect("Public key is not a valid RSA PEM");
    assert!(decode::<Value>(&token, &decoding_key, &validation()).is_ok());
}

#[test]
fn token_from_another_key_is_rejected() {
    let (_dir, artifacts) = write_artifacts(DEFAULT_ISSUER);
    let another_encoding_key =
        EncodingKey::from_rsa_der(ANOTHER_PRIVATE_KEY.to_pkcs1_der().unwrap().as_bytes());
    let token = token(&another_encoding_key, &artifacts.key_id);

    let jwks = published_jwks(&artifacts.jwks);
    let decoding_key = DecodingKey::from_jwk(&jwks.keys[0]).unwrap();

    let result = decode::<Value>(&token, &decoding_key, &validation());
    assert_eq!(
        result.unwrap_err().into_kind(),
        ErrorKind::InvalidSignature
    );
}

#[test]
fn discovery_points_at_published_jwks() {
    let (_dir, artifacts) = write_artifacts(DEFAULT_ISSUER);
    let discovery = read_json(&artifacts.discovery);

    assert_eq!(discovery["issuer"], DEFAULT_ISSUER);
    assert_eq!(
        discovery["jwks_uri"],
        "https://oidc.example.com/cluster/jwks.json"
    );
    assert_eq!(discovery["response_types_supported"], json!(["id_token"]));
    assert_eq!(discovery["subject_types_supported"], json!(["public"]));
    assert_eq!(
        discovery["id_token_signing_alg_values_supported"],
        json!(["RS256"])
    );
    assert_eq!(discovery["claims_supported"], json!(["sub", "iss"]));
}

#[test]
fn repeated_runs_publish_the_same_kid_for_the_same_key() {
    let (_first_dir, first) = write_artifacts(DEFAULT_ISSUER);
    let (_second_dir, second) = write_artifacts(DEFAULT_ISSUER);

    assert_eq!(first.key_id, second.key_id);
    assert_eq!(read_json(&first.jwks), read_json(&second.jwks));
}
