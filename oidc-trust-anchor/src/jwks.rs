use std::io::Write;

use log::debug;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};

use crate::{error::EncodeError, jwk::Jwk};

/// JWK Set document (RFC 7517, section 5), keys in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    pub fn from_public_keys(keys: &[RsaPublicKey]) -> Result<Self, EncodeError> {
        if keys.is_empty() {
            return Err(EncodeError::Encoding(
                "A JWK set requires at least one key".to_owned(),
            ));
        }
        let keys = keys
            .iter()
            .map(Jwk::from_public_key)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(JwkSet { keys })
    }

    /// Serialize and write the whole set to `sink`.
    ///
    /// Serialization completes before the first byte is written.
    pub fn write_to(&self, sink: &mut impl Write) -> Result<(), EncodeError> {
        let mut json =
            serde_json::to_vec_pretty(self).map_err(|e| EncodeError::Encoding(e.to_string()))?;
        json.push(b'\n');
        sink.write_all(&json)?;
        Ok(())
    }
}

/// Encode `keys` as a JWK set and write it to `sink` as JSON.
pub fn write_jwks(sink: &mut impl Write, keys: &[RsaPublicKey]) -> Result<JwkSet, EncodeError> {
    let jwks = JwkSet::from_public_keys(keys)?;
    jwks.write_to(sink)?;
    debug!(
        "Wrote JWK set with key ids: {:?}",
        jwks.keys.iter().map(|jwk| &jwk.kid).collect::<Vec<_>>()
    );
    Ok(jwks)
}
