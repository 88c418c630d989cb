use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::{error::EncodeError, jwk::ALGORITHM_RS256};

/// Path of the JWK set relative to the issuer.
pub const JWKS_PATH: &str = "/jwks.json";

/// `jwks_uri` published when no issuer is known yet.
///
/// Placeholder documents are meant to be rewritten once the hosting URL of
/// the issuer is known; relying parties cannot use them as is.
pub const JWKS_URI_PLACEHOLDER: &str = JWKS_PATH;

/// OpenID Provider Metadata (OpenID Connect Discovery 1.0, section 3).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub jwks_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    pub response_types_supported: Vec<String>,
    pub subject_types_supported: Vec<String>,
    pub id_token_signing_alg_values_supported: Vec<String>,
    pub claims_supported: Vec<String>,
}

impl DiscoveryDocument {
    pub fn builder(issuer: impl Into<String>) -> DiscoveryDocumentBuilder {
        DiscoveryDocumentBuilder::new(issuer.into())
    }

    /// Serialize and write the document to `sink`.
    pub fn write_to(&self, sink: &mut impl Write) -> Result<(), EncodeError> {
        let mut json =
            serde_json::to_vec_pretty(self).map_err(|e| EncodeError::Encoding(e.to_string()))?;
        json.push(b'\n');
        sink.write_all(&json)?;
        Ok(())
    }
}

pub struct DiscoveryDocumentBuilder {
    issuer: String,
    authorization_endpoint: Option<String>,
    claims_supported: Option<Vec<String>>,
}

impl DiscoveryDocumentBuilder {
    fn new(issuer: String) -> Self {
        DiscoveryDocumentBuilder {
            issuer,
            authorization_endpoint: None,
            claims_supported: None,
        }
    }

    /// Set the authorization_endpoint.
    ///
    /// Providers that only publish keys usually point this at a URN such as
    /// `urn:kubernetes:programmatic_authorization`.
    /// Omitted from the document unless set.
    pub fn authorization_endpoint(mut self, authorization_endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(authorization_endpoint.into());
        self
    }

    /// Set the advertised claims.
    ///
    /// Default value is `["sub", "iss"]`.
    pub fn claims_supported(mut self, claims: &[impl ToString]) -> Self {
        self.claims_supported = Some(claims.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn build(self) -> DiscoveryDocument {
        DiscoveryDocument {
            jwks_uri: jwks_uri(&self.issuer),
            issuer: self.issuer,
            authorization_endpoint: self.authorization_endpoint,
            response_types_supported: vec!["id_token".to_owned()],
            subject_types_supported: vec!["public".to_owned()],
            id_token_signing_alg_values_supported: vec![ALGORITHM_RS256.to_owned()],
            claims_supported: self
                .claims_supported
                .unwrap_or_else(|| vec!["sub".to_owned(), "iss".to_owned()]),
        }
    }
}

/// `jwks_uri` for `issuer`, or [JWKS_URI_PLACEHOLDER] if `issuer` is empty.
pub fn jwks_uri(issuer: &str) -> String {
    if issuer.is_empty() {
        JWKS_URI_PLACEHOLDER.to_owned()
    } else {
        format!("{}{}", issuer, JWKS_PATH)
    }
}

/// Build the default discovery document for `issuer` and write it to `sink`.
pub fn write_discovery(sink: &mut impl Write, issuer: &str) -> Result<DiscoveryDocument, EncodeError> {
    let document = DiscoveryDocument::builder(issuer).build();
    document.write_to(sink)?;
    Ok(document)
}
