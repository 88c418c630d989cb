use base64::{
    alphabet,
    engine::{self, general_purpose},
    Engine,
};
use rsa::{pkcs8::EncodePublicKey, traits::PublicKeyParts, BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::EncodeError;

pub const KEY_TYPE_RSA: &str = "RSA";
pub const KEY_USE_SIGNATURE: &str = "sig";
pub const ALGORITHM_RS256: &str = "RS256";

/// base64url without padding (RFC 7515, section 2).
pub(crate) const BASE64_URL: engine::GeneralPurpose =
    engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);

/// A single RSA signature verification key (RFC 7517, RFC 7518 section 6.3).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub use_: String,
    pub alg: String,
    pub kid: String,
    pub n: String,
    pub e: String,
}

impl Jwk {
    /// Encode `public_key` as an RS256 signing JWK.
    ///
    /// `n` and `e` carry the unsigned big-endian bytes of the modulus and
    /// public exponent without any leading zero octet. The `kid` is
    /// derived from the key itself, see [key_id].
    pub fn from_public_key(public_key: &RsaPublicKey) -> Result<Self, EncodeError> {
        Ok(Jwk {
            kty: KEY_TYPE_RSA.to_owned(),
            use_: KEY_USE_SIGNATURE.to_owned(),
            alg: ALGORITHM_RS256.to_owned(),
            kid: key_id(public_key)?,
            n: encode_unsigned(public_key.n())?,
            e: encode_unsigned(public_key.e())?,
        })
    }

    /// Decode the key material of this JWK back into an [RsaPublicKey].
    pub fn to_public_key(&self) -> Result<RsaPublicKey, EncodeError> {
        if self.kty != KEY_TYPE_RSA {
            return Err(EncodeError::Encoding(format!(
                "Unsupported key type: {}",
                self.kty
            )));
        }
        let n = decode_unsigned(&self.n)?;
        let e = decode_unsigned(&self.e)?;
        RsaPublicKey::new(n, e).map_err(|e| EncodeError::Encoding(e.to_string()))
    }
}

/// Key identifier of `public_key`.
///
/// SHA-256 over the DER encoded SubjectPublicKeyInfo, base64url encoded.
pub fn key_id(public_key: &RsaPublicKey) -> Result<String, EncodeError> {
    let der = public_key
        .to_public_key_der()
        .map_err(|e| EncodeError::Encoding(e.to_string()))?;
    Ok(BASE64_URL.encode(Sha256::digest(der.as_bytes())))
}

fn encode_unsigned(value: &BigUint) -> Result<String, EncodeError> {
    let bytes = value.to_bytes_be();
    let bytes = strip_leading_zeros(&bytes);
    if bytes.is_empty() {
        return Err(EncodeError::Encoding(
            "RSA key parameter must not be zero".to_owned(),
        ));
    }
    Ok(BASE64_URL.encode(bytes))
}

fn decode_unsigned(value: &str) -> Result<BigUint, EncodeError> {
    let bytes = BASE64_URL
        .decode(value)
        .map_err(|e| EncodeError::Encoding(e.to_string()))?;
    match bytes.first() {
        None | Some(0) => Err(EncodeError::Encoding(format!(
            "Not a minimal unsigned integer: {}",
            value
        ))),
        Some(_) => Ok(BigUint::from_bytes_be(&bytes)),
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
