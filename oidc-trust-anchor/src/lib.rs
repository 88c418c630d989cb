#![doc = include_str!("../README.md")]

/// PEM serialization of the signing key pair, and the [KeyGenerator](crate::keypair::KeyGenerator)
/// seam used to create it.
///
/// The public key is written as a SubjectPublicKeyInfo (`PUBLIC KEY`),
/// the private key as PKCS#1 (`RSA PRIVATE KEY`).
pub mod keypair;

/// Conversion of an RSA public key into a JSON Web Key.
///
/// # Example
///
/// ```
/// use oidc_trust_anchor::jwk::Jwk;
/// use rsa::RsaPrivateKey;
///
/// let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
/// let jwk = Jwk::from_public_key(&private_key.to_public_key()).unwrap();
///
/// assert_eq!(jwk.kty, "RSA");
/// assert_eq!(jwk.alg, "RS256");
/// assert_eq!(jwk.to_public_key().unwrap(), private_key.to_public_key());
/// ```
pub mod jwk;

/// [JwkSet](crate::jwks::JwkSet) is the document relying parties fetch
/// in order to verify tokens signed by the trust anchor.
pub mod jwks;

/// OpenID Connect discovery document.
///
/// # Example
///
/// ```
/// use oidc_trust_anchor::discovery::write_discovery;
///
/// let mut sink = Vec::new();
/// let document = write_discovery(&mut sink, "https://oidc.example.com").unwrap();
///
/// assert_eq!(document.jwks_uri, "https://oidc.example.com/jwks.json");
/// ```
pub mod discovery;

/// Writes every artifact of a trust anchor to disk.
///
/// Configured through [SetupConfiguration](crate::setup::SetupConfiguration).
pub mod setup;

pub mod error;

#[cfg(test)]
mod test_support;
