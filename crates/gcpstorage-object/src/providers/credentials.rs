//! Google service-account key material.

use std::fmt;

use serde::Deserialize;

use crate::types::Error;

/// Default OAuth2 token endpoint for service-account assertions.
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Label used for credential errors.
const LABEL: &str = "credentials";

/// A parsed service-account JSON key.
///
/// The source JSON document is retained because the object-store client
/// consumes the key in its serialized form.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Key type, always `service_account`.
    #[serde(rename = "type")]
    pub key_type: String,
    /// Owning project, if present.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Identifier of the signing key.
    pub private_key_id: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Service-account email, used as the assertion issuer.
    pub client_email: String,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Skip OAuth entirely (fake storage servers only).
    #[serde(default)]
    pub disable_oauth: bool,
    #[serde(skip)]
    raw: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse a service-account key from its JSON document.
    ///
    /// Malformed JSON, missing fields or a key type other than
    /// `service_account` are reported as `unauthenticated` errors.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let json = json.trim();
        if json.is_empty() {
            return Err(Error::unauthenticated("credentials are empty", LABEL));
        }

        let mut key: Self = serde_json::from_str(json).map_err(|e| {
            Error::unauthenticated(format!("malformed service-account key: {e}"), LABEL)
                .with_source(e)
        })?;

        if key.key_type != "service_account" {
            return Err(Error::unauthenticated(
                format!("unsupported credential type '{}'", key.key_type),
                LABEL,
            ));
        }

        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(Error::unauthenticated(
                "service-account key lacks client_email or private_key",
                LABEL,
            ));
        }

        key.raw = json.to_string();
        Ok(key)
    }

    /// The key as a JSON document, optionally pointing the storage client at
    /// a custom base URL.
    pub fn to_json(&self, gcs_base_url: Option<&str>) -> Result<String, Error> {
        let Some(base_url) = gcs_base_url else {
            return Ok(self.raw.clone());
        };

        let mut value: serde_json::Value = serde_json::from_str(&self.raw)
            .map_err(|e| Error::unauthenticated(e.to_string(), LABEL).with_source(e))?;
        if let Some(object) = value.as_object_mut() {
            object.insert("gcs_base_url".to_string(), base_url.into());
        }

        Ok(value.to_string())
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
