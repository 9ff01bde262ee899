//! Depot REST API client.
//!
//! Low-level request/response glue for the depot backend. The adapter
//! depends only on the [`DepotClient`] call surface, not on the transport
//! detail behind it.

use async_trait::async_trait;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use url::Url;

use portage_common::{Error, Result};

use crate::streams::DownloadResponse;

/// Characters percent-encoded inside path segments ('/' stays literal).
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%');

/// Response header carrying the id of a stored entry.
const FILE_ID_HEADER: &str = "x-depot-file-id";

/// Native listing entry returned by the depot API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotEntry {
    /// Stable file id; doubles as the upload correlation id.
    pub file_id: String,
    pub name: String,
    pub dir: bool,
    #[serde(default)]
    pub size: Option<String>,
    /// Etag exactly as sent, surrounding quotes included.
    #[serde(default)]
    pub etag: Option<String>,
    /// RFC-1123 modification timestamp.
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Algorithm name to hex digest, only what the backend computed.
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
}

/// One entry of a file's native version history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepotVersion {
    pub etag: String,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub hashes: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    entries: Vec<DepotEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    versions: Vec<DepotVersion>,
}

/// Minimal call surface the depot adapter depends on.
#[async_trait]
pub trait DepotClient: Send + Sync {
    /// Stat one path; `None` when the backend definitively reports 404.
    async fn entry(&self, path: &str) -> Result<Option<DepotEntry>>;

    /// List the children of a folder path.
    async fn list(&self, path: &str) -> Result<Vec<DepotEntry>>;

    /// Ranged content fetch. The response status is reported verbatim;
    /// the adapter decides which codes are acceptable.
    async fn fetch(
        &self,
        path: &str,
        revision: Option<&str>,
        range: Option<(u64, u64)>,
    ) -> Result<DownloadResponse>;

    /// Store content with a known length, returning the file id of the
    /// stored entry.
    async fn store(&self, path: &str, content: File, size: u64) -> Result<String>;

    /// Remove the entry at `path`.
    async fn remove(&self, path: &str) -> Result<()>;

    /// Move an entry to a new path within the depot.
    async fn relocate(&self, from: &str, to: &str) -> Result<()>;

    /// Native version history for a file id, newest first.
    async fn versions(&self, file_id: &str) -> Result<Vec<DepotVersion>>;
}

/// HTTP implementation of [`DepotClient`].
pub struct HttpDepotClient {
    base: Url,
    token: String,
    http: Client,
}

impl HttpDepotClient {
    /// # Errors
    /// - `Error::InvalidSettings` when the base URL does not parse
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::InvalidSettings(format!("invalid depot base URL: {}", e)))?;
        let http = Client::builder()
            .user_agent("Portage/0.1")
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base,
            token: token.to_string(),
            http,
        })
    }

    fn file_url(&self, path: &str) -> String {
        format!(
            "{}/api/files{}",
            self.base.as_str().trim_end_matches('/'),
            utf8_percent_encode(path, PATH_ENCODE_SET),
        )
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    async fn json_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::Network(format!("failed to parse depot response: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Network(format!(
                "depot API error: {} - {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl DepotClient for HttpDepotClient {
    async fn entry(&self, path: &str) -> Result<Option<DepotEntry>> {
        let response = self
            .http
            .get(self.file_url(path))
            .header(header::AUTHORIZATION, self.auth())
            .query(&[("meta", "1")])
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to stat {}: {}", path, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.json_response(response).await.map(Some)
    }

    async fn list(&self, path: &str) -> Result<Vec<DepotEntry>> {
        let response = self
            .http
            .get(self.file_url(path))
            .header(header::AUTHORIZATION, self.auth())
            .query(&[("list", "1")])
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to list {}: {}", path, e)))?;

        let listing: ListResponse = self.json_response(response).await?;
        Ok(listing.entries)
    }

    async fn fetch(
        &self,
        path: &str,
        revision: Option<&str>,
        range: Option<(u64, u64)>,
    ) -> Result<DownloadResponse> {
        let mut request = self
            .http
            .get(self.file_url(path))
            .header(header::AUTHORIZATION, self.auth());

        if let Some(revision) = revision {
            request = request.query(&[("revision", revision)]);
        }
        if let Some((start, end)) = range {
            request = request.header(header::RANGE, format!("bytes={}-{}", start, end));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to fetch {}: {}", path, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|result| result.map_err(|e| Error::Network(format!("stream read error: {}", e))));

        Ok(DownloadResponse {
            status,
            body: Box::pin(body),
        })
    }

    async fn store(&self, path: &str, content: File, size: u64) -> Result<String> {
        let response = self
            .http
            .put(self.file_url(path))
            .header(header::AUTHORIZATION, self.auth())
            .header(header::CONTENT_LENGTH, size)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(reqwest::Body::wrap_stream(ReaderStream::new(content)))
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to store {}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "depot store failed: {} - {}",
                status, body
            )));
        }

        response
            .headers()
            .get(FILE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Network(format!(
                    "depot store response for {} missing {} header",
                    path, FILE_ID_HEADER
                ))
            })
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.file_url(path))
            .header(header::AUTHORIZATION, self.auth())
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to delete {}: {}", path, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                provider: "depot".to_string(),
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "depot delete failed: {} - {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn relocate(&self, from: &str, to: &str) -> Result<()> {
        let response = self
            .http
            .post(self.file_url(from))
            .header(header::AUTHORIZATION, self.auth())
            .json(&serde_json::json!({ "action": "move", "destination": to }))
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to move {}: {}", from, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "depot move failed: {} - {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn versions(&self, file_id: &str) -> Result<Vec<DepotVersion>> {
        let url = format!(
            "{}/api/versions/{}",
            self.base.as_str().trim_end_matches('/'),
            file_id
        );
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, self.auth())
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to list versions of {}: {}", file_id, e)))?;

        let versions: VersionsResponse = self.json_response(response).await?;
        Ok(versions.versions)
    }
}
