//! Object uploads with an initial ACL through the GCS JSON API.

use std::time::Duration;

use bytes::Bytes;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use object_store::PutMode;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use url::Url;

use super::{AclGrant, AclWriter};
use crate::TRACING_TARGET;
use crate::client::PutOutput;
use crate::providers::ServiceAccountKey;
use crate::types::{Error, ErrorKind};

/// OAuth2 scope required to set object ACLs.
const FULL_CONTROL_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.full_control";

/// Grant type for the service-account JWT bearer flow.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion.
const ASSERTION_TTL_SECS: i64 = 3600;

/// Content type used when the caller gives none.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const LABEL: &str = "gcs-acl";

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct ObjectAccessControl<'a> {
    entity: &'a str,
    role: &'a str,
}

/// Metadata part of a multipart upload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    acl: Vec<ObjectAccessControl<'a>>,
}

#[derive(Deserialize)]
struct InsertedObject {
    #[serde(default)]
    etag: Option<String>,
    #[serde(default)]
    generation: Option<String>,
}

/// Uploads objects with their ACL using
/// `POST /upload/storage/v1/b/{bucket}/o?uploadType=multipart`.
///
/// The metadata part carries the `acl` array, so content and grants are
/// committed by a single request. An access token is requested on first use
/// and kept for the lifetime of the client.
pub struct GcsAclClient {
    http: Client,
    base_url: Url,
    bucket: String,
    key: ServiceAccountKey,
    token: OnceCell<String>,
}

impl std::fmt::Debug for GcsAclClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsAclClient")
            .field("base_url", &self.base_url.as_str())
            .field("bucket", &self.bucket)
            .field("client_email", &self.key.client_email)
            .finish_non_exhaustive()
    }
}

impl GcsAclClient {
    /// Creates a client for `bucket` at `endpoint`.
    pub fn new(
        bucket: &str,
        key: ServiceAccountKey,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(endpoint).map_err(|e| {
            Error::connection(format!("invalid endpoint '{endpoint}': {e}"), LABEL, false)
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::connection(
                format!("endpoint '{endpoint}' cannot be a base URL"),
                LABEL,
                false,
            ));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gcpstorage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::connection(e.to_string(), LABEL, false).with_source(e))?;

        Ok(Self {
            http,
            base_url,
            bucket: bucket.to_string(),
            key,
            token: OnceCell::new(),
        })
    }

    /// Upload URL for `mode`. Create-only writes send `ifGenerationMatch=0`.
    fn upload_url(&self, mode: &PutMode) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["upload", "storage", "v1", "b", self.bucket.as_str(), "o"]);
        }

        let generation = match mode {
            PutMode::Overwrite => None,
            PutMode::Create => Some("0"),
            PutMode::Update(version) => match version.version.as_deref() {
                Some(generation) => Some(generation),
                None => {
                    return Err(Error::new(
                        ErrorKind::Precondition,
                        "conditional update requires a generation",
                        LABEL,
                    ));
                }
            },
        };

        url.query_pairs_mut().append_pair("uploadType", "multipart");
        if let Some(generation) = generation {
            url.query_pairs_mut()
                .append_pair("ifGenerationMatch", generation);
        }
        Ok(url)
    }

    /// Signs the RS256 assertion exchanged for an access token.
    fn sign_assertion(&self) -> Result<String, Error> {
        let now = jiff::Timestamp::now().as_second();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: FULL_CONTROL_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key.private_key_id.clone());

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| Error::unauthenticated(format!("invalid private key: {e}"), LABEL))?;

        jsonwebtoken::encode(&header, &claims, &signing_key)
            .map_err(|e| Error::unauthenticated(format!("cannot sign assertion: {e}"), LABEL))
    }

    async fn fetch_token(&self) -> Result<String, Error> {
        let assertion = self.sign_assertion()?;

        tracing::debug!(
            target: TRACING_TARGET,
            client_email = %self.key.client_email,
            token_uri = %self.key.token_uri,
            "requesting access token"
        );

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::unauthenticated(
                format!("token exchange rejected with status {status}"),
                LABEL,
            ));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn access_token(&self) -> Result<Option<&str>, Error> {
        if self.key.disable_oauth {
            return Ok(None);
        }

        let token = self.token.get_or_try_init(|| self.fetch_token()).await?;
        Ok(Some(token.as_str()))
    }
}

#[async_trait::async_trait]
impl AclWriter for GcsAclClient {
    #[tracing::instrument(
        name = "acl.put",
        skip(self, data, mode, content_type, grants),
        fields(size = data.len(), grants = grants.len())
    )]
    async fn put_with_acl(
        &self,
        object: &str,
        data: Bytes,
        mode: PutMode,
        content_type: Option<&str>,
        grants: &[AclGrant],
    ) -> Result<PutOutput, Error> {
        let url = self.upload_url(&mode)?;
        let metadata = ObjectResource {
            name: object,
            content_type,
            acl: grants
                .iter()
                .map(|grant| ObjectAccessControl {
                    entity: grant.entity.as_str(),
                    role: grant.role.as_ref(),
                })
                .collect(),
        };
        let metadata = serde_json::to_vec(&metadata).map_err(|e| {
            Error::invalid_data(format!("cannot encode object metadata: {e}"), LABEL)
        })?;

        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        let (boundary, body) = multipart_related(&metadata, content_type, &data);

        let token = self.access_token().await?;
        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let conflict = response.status() == StatusCode::PRECONDITION_FAILED;
        if conflict && matches!(mode, PutMode::Create) {
            return Err(Error::new(
                ErrorKind::AlreadyExists,
                format!("object '{object}' already exists"),
                LABEL,
            ));
        }

        let inserted: InsertedObject = response.error_for_status()?.json().await?;

        tracing::debug!(
            target: TRACING_TARGET,
            object,
            generation = ?inserted.generation,
            "object written with acl"
        );

        Ok(PutOutput {
            e_tag: inserted.etag,
            generation: inserted.generation,
        })
    }
}

/// Encodes a `multipart/related` body of the JSON metadata followed by the
/// media. Returns the boundary and the body.
fn multipart_related(metadata: &[u8], content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = (0u32..)
        .map(|n| format!("gcpstorage-{n:016x}"))
        .find(|b| !contains(data, b.as_bytes()) && !contains(metadata, b.as_bytes()))
        .unwrap_or_default();

    let mut body = Vec::with_capacity(metadata.len() + data.len() + 256);
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(metadata);
    body.extend_from_slice(
        format!("\r\n--{boundary}\r\nContent-Type: {content_type}\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (boundary, body)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
