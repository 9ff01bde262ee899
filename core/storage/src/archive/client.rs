//! Archive deposit API client.
//!
//! Low-level glue for a SWORD-style deposit archive: a tree of
//! collections holding immutable items. The adapter depends only on the
//! [`ArchiveClient`] call surface.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use url::Url;

use portage_common::{Error, Result};

use crate::streams::DownloadResponse;

/// One collection (container) in the archive tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveCollection {
    pub id: String,
    pub title: String,
    /// Absent for the archive's top-level collection.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Canonical locator URL for the collection.
    pub about: String,
}

/// One deposited item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveItem {
    pub title: String,
    /// Canonical locator URL; carries the item id (the upload
    /// correlation id).
    pub about: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    /// Version token, quoted as sent.
    #[serde(default)]
    pub etag: Option<String>,
    /// RFC-1123 modification timestamp.
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    /// The archive tracks at most an md5 digest per deposit.
    #[serde(default)]
    pub md5: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionsResponse {
    collections: Vec<ArchiveCollection>,
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    items: Vec<ArchiveItem>,
}

/// Extract the item id from an item locator URL.
///
/// The id is carried either as an `item_id` query parameter or as the
/// last path segment.
pub fn item_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "item_id") {
        return Some(id.into_owned());
    }
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(str::to_string)
}

/// Derive the deposit locator used for deletion from an item's canonical
/// URL, replacing its query with the repository action form.
pub fn deposit_locator(about: &str, item_id: &str) -> Result<String> {
    let mut url = Url::parse(about)
        .map_err(|e| Error::Serialization(format!("invalid item URL {}: {}", about, e)))?;
    url.set_query(Some(&format!("action=repository_uri&item_id={}", item_id)));
    Ok(url.to_string())
}

/// Minimal call surface the archive adapter depends on.
#[async_trait]
pub trait ArchiveClient: Send + Sync {
    /// Fetch every collection in the archive.
    async fn collections(&self) -> Result<Vec<ArchiveCollection>>;

    /// Fetch the items of one collection, optionally filtered by state
    /// (`"draft"`, `"published"`). Order is stable for unchanged backend
    /// state.
    async fn items(&self, collection_id: &str, state: Option<&str>) -> Result<Vec<ArchiveItem>>;

    /// Deposit content into a collection with a known length, returning
    /// the new item's locator URL.
    async fn post_item(&self, collection_id: &str, content: File, size: u64) -> Result<String>;

    /// Delete an item via its deposit locator.
    async fn delete_item(&self, locator: &str) -> Result<()>;

    /// Re-parent a collection.
    async fn update_relation(&self, collection_id: &str, parent_id: &str) -> Result<()>;

    /// Ranged item content fetch; status reported verbatim.
    async fn fetch_item(
        &self,
        item_id: &str,
        range: Option<(u64, u64)>,
    ) -> Result<DownloadResponse>;
}

/// HTTP implementation of [`ArchiveClient`].
pub struct HttpArchiveClient {
    base: Url,
    token: String,
    http: Client,
}

impl HttpArchiveClient {
    /// # Errors
    /// - `Error::InvalidSettings` when the base URL does not parse
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::InvalidSettings(format!("invalid archive base URL: {}", e)))?;
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

    fn api_url(&self, suffix: &str) -> String {
        format!("{}/api/{}", self.base.as_str().trim_end_matches('/'), suffix)
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
                .map_err(|e| Error::Network(format!("failed to parse archive response: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Network(format!(
                "archive API error: {} - {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl ArchiveClient for HttpArchiveClient {
    async fn collections(&self) -> Result<Vec<ArchiveCollection>> {
        let response = self
            .http
            .get(self.api_url("collections"))
            .header(header::AUTHORIZATION, self.auth())
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to fetch collections: {}", e)))?;

        let collections: CollectionsResponse = self.json_response(response).await?;
        Ok(collections.collections)
    }

    async fn items(&self, collection_id: &str, state: Option<&str>) -> Result<Vec<ArchiveItem>> {
        let mut request = self
            .http
            .get(self.api_url(&format!("collections/{}/items", collection_id)))
            .header(header::AUTHORIZATION, self.auth());
        if let Some(state) = state {
            request = request.query(&[("state", state)]);
        }

        let response = request.send().await.map_err(|e| {
            Error::Network(format!(
                "failed to fetch items of collection {}: {}",
                collection_id, e
            ))
        })?;

        let items: ItemsResponse = self.json_response(response).await?;
        Ok(items.items)
    }

    async fn post_item(&self, collection_id: &str, content: File, size: u64) -> Result<String> {
        let response = self
            .http
            .post(self.api_url(&format!("collections/{}/items", collection_id)))
            .header(header::AUTHORIZATION, self.auth())
            .header(header::CONTENT_LENGTH, size)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(reqwest::Body::wrap_stream(ReaderStream::new(content)))
            .send()
            .await
            .map_err(|e| {
                Error::Network(format!(
                    "failed to deposit into collection {}: {}",
                    collection_id, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "archive deposit failed: {} - {}",
                status, body
            )));
        }

        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Network("archive deposit response missing Location header".to_string())
            })
    }

    async fn delete_item(&self, locator: &str) -> Result<()> {
        let response = self
            .http
            .delete(locator)
            .header(header::AUTHORIZATION, self.auth())
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to delete {}: {}", locator, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                provider: "archive".to_string(),
                path: locator.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "archive delete failed: {} - {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn update_relation(&self, collection_id: &str, parent_id: &str) -> Result<()> {
        let response = self
            .http
            .put(self.api_url(&format!("collections/{}", collection_id)))
            .header(header::AUTHORIZATION, self.auth())
            .json(&serde_json::json!({ "parent": parent_id }))
            .send()
            .await
            .map_err(|e| {
                Error::Network(format!(
                    "failed to re-parent collection {}: {}",
                    collection_id, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "archive relation update failed: {} - {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn fetch_item(
        &self,
        item_id: &str,
        range: Option<(u64, u64)>,
    ) -> Result<DownloadResponse> {
        let mut request = self
            .http
            .get(self.api_url(&format!("items/{}/content", item_id)))
            .header(header::AUTHORIZATION, self.auth());
        if let Some((start, end)) = range {
            request = request.header(header::RANGE, format!("bytes={}-{}", start, end));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(format!("failed to fetch item {}: {}", item_id, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(|result| result.map_err(|e| Error::Network(format!("stream read error: {}", e))));

        Ok(DownloadResponse {
            status,
            body: Box::pin(body),
        })
    }
}
