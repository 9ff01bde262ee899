//! Archive storage provider implementation.
//!
//! The archive is a SWORD-style deposit backend: a tree of collections
//! holding immutable items. Items carry their stable id in the path
//! (`…/item{id}`), only collections can be re-parented, and there is no
//! native version API — revisions degrade to scanning the listing across
//! item states.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use portage_common::{Error, ResourcePath, Result};

use crate::metadata::{version_from_etag, EntryMetadata, RevisionMetadata};
use crate::provider::{Listing, StorageProvider};
use crate::streams::{spool_to_tempfile, ByteStream};

use super::client::{deposit_locator, item_id_from_url, ArchiveClient, HttpArchiveClient};
use super::metadata::{file_metadata, folder_metadata};

pub const NAME: &str = "archive";

/// Prefix of the trailing path segment naming a deposited item.
const ITEM_PREFIX: &str = "item";

/// Archive provider settings, supplied as an opaque, pre-validated
/// mapping. `collection_id` names the root collection this provider is
/// scoped to.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSettings {
    pub base_url: String,
    pub token: String,
    pub collection_id: String,
}

/// Archive storage provider.
pub struct ArchiveProvider {
    client: Arc<dyn ArchiveClient>,
    root_id: String,
}

impl ArchiveProvider {
    /// Create a provider from a settings mapping.
    ///
    /// # Errors
    /// - `Error::InvalidSettings` when the mapping does not fit
    ///   [`ArchiveSettings`]
    pub fn from_settings(settings: Value) -> Result<Self> {
        let settings: ArchiveSettings = serde_json::from_value(settings)
            .map_err(|e| Error::InvalidSettings(format!("invalid archive settings: {}", e)))?;
        let client = HttpArchiveClient::new(&settings.base_url, &settings.token)?;
        Ok(Self::with_client(Arc::new(client), settings.collection_id))
    }

    /// Create a provider over an arbitrary client shim.
    pub fn with_client(client: Arc<dyn ArchiveClient>, root_id: impl Into<String>) -> Self {
        Self {
            client,
            root_id: root_id.into(),
        }
    }

    fn not_found(&self, path: &ResourcePath) -> Error {
        Error::NotFound {
            provider: NAME.to_string(),
            path: path.materialized(),
        }
    }

    /// The collection id a folder-shaped path addresses.
    ///
    /// # Errors
    /// - `Error::Metadata { code: 404 }` for file-shaped paths — the
    ///   archive only lists containers
    fn collection_id_of_dir(&self, path: &ResourcePath) -> Result<String> {
        if path.is_root() {
            return Ok(self.root_id.clone());
        }
        match path.name() {
            Some(name) if path.is_dir() => Ok(name.to_string()),
            _ => Err(Error::Metadata {
                provider: NAME.to_string(),
                message: format!("unsupported path shape: {}", path.materialized()),
                code: 404,
            }),
        }
    }

    /// The collection a file-shaped path deposits into or lives in.
    fn parent_collection_of_file(&self, path: &ResourcePath) -> String {
        let segments = path.segments();
        if segments.len() >= 2 {
            segments[segments.len() - 2].clone()
        } else {
            self.root_id.clone()
        }
    }

    /// Map the caller-facing version selector onto the item-state filter.
    fn state_filter(version: Option<&str>) -> Option<&'static str> {
        match version {
            Some("latest") => Some("draft"),
            Some("latest-published") => Some("published"),
            _ => None,
        }
    }
}

#[async_trait]
impl StorageProvider for ArchiveProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn can_duplicate_names(&self) -> bool {
        false
    }

    async fn validate_path(&self, raw: &str, revision: Option<&str>) -> Result<ResourcePath> {
        // No resolve-by-path lookup: existence is checked lazily by the
        // operation that uses the path. The item id, when present, is
        // carried by the trailing segment itself.
        let path = ResourcePath::parse(raw)?.with_revision(revision.map(str::to_string));

        if path.is_file() {
            if let Some(id) = path
                .name()
                .and_then(|n| n.strip_prefix(ITEM_PREFIX))
                .filter(|id| !id.is_empty())
            {
                let id = id.to_string();
                return Ok(path.with_identifier(id));
            }
        }
        Ok(path)
    }

    async fn revalidate_path(
        &self,
        base: &ResourcePath,
        segment: &str,
        folder: bool,
        revision: Option<&str>,
    ) -> Result<ResourcePath> {
        let revision = revision.or(base.revision()).map(str::to_string);
        Ok(base.child(segment, folder)?.with_revision(revision))
    }

    async fn metadata(&self, path: &ResourcePath, version: Option<&str>) -> Result<Listing> {
        let version = version.or(path.revision());
        let parent = self.collection_id_of_dir(path)?;

        let collections = self.client.collections().await?;
        let collection = collections
            .iter()
            .find(|c| c.id == parent)
            .ok_or_else(|| self.not_found(path))?;

        let subcollections: Vec<_> = collections
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(parent.as_str()))
            .collect();
        // Some archives surface child collections as link items too;
        // those are already listed as folders.
        let collection_urls: HashSet<&str> =
            subcollections.iter().map(|c| c.about.as_str()).collect();

        let mut children: Vec<EntryMetadata> = subcollections
            .iter()
            .map(|c| EntryMetadata::Folder(folder_metadata(c, &collections, &self.root_id)))
            .collect();

        let items = self
            .client
            .items(&parent, Self::state_filter(version))
            .await?;
        for item in items
            .iter()
            .filter(|item| !collection_urls.contains(item.about.as_str()))
        {
            children.push(EntryMetadata::File(file_metadata(
                item,
                collection,
                &collections,
                &self.root_id,
            )?));
        }

        Ok(Listing::Children(children))
    }

    async fn download(
        &self,
        path: &ResourcePath,
        _revision: Option<&str>,
        range: Option<(u64, u64)>,
    ) -> Result<ByteStream> {
        let Some(item_id) = path.identifier() else {
            return Err(self.not_found(path));
        };

        let response = self.client.fetch_item(item_id, range).await?;
        if response.status != 200 && response.status != 206 {
            return Err(Error::Download {
                provider: NAME.to_string(),
                path: path.materialized(),
                status: response.status,
            });
        }
        Ok(response.body)
    }

    async fn upload(
        &self,
        stream: ByteStream,
        path: &ResourcePath,
    ) -> Result<(EntryMetadata, bool)> {
        // Deposits need a known content length up front.
        let (spool, size) = spool_to_tempfile(stream).await?;

        let insert_id = self.parent_collection_of_file(path);
        let item_url = self.client.post_item(&insert_id, spool, size).await?;
        let posted_id = item_id_from_url(&item_url).ok_or_else(|| {
            Error::Serialization(format!("deposit locator carries no id: {}", item_url))
        })?;

        // Re-fetch and correlate on the posted item id, never the name:
        // a concurrent deposit of the same name must not be matched.
        let collections = self.client.collections().await?;
        let collection = collections
            .iter()
            .find(|c| c.id == insert_id)
            .ok_or_else(|| self.not_found(path))?;
        let items = self.client.items(&insert_id, None).await?;
        let matched = items
            .iter()
            .find(|item| item_id_from_url(&item.about).as_deref() == Some(posted_id.as_str()))
            .ok_or_else(|| Error::UploadConsistency {
                provider: NAME.to_string(),
                path: path.materialized(),
                correlation_id: posted_id.clone(),
            })?;

        info!(path = %path, item_id = %posted_id, size, "deposited");
        let meta = file_metadata(matched, collection, &collections, &self.root_id)?;
        // Items are immutable; every accepted deposit is a new entry.
        Ok((EntryMetadata::File(meta), true))
    }

    async fn delete(&self, path: &ResourcePath) -> Result<()> {
        // Only item-shaped paths are deletable; anything else is a
        // caller bug.
        let name = path.name().unwrap_or_default();
        assert!(
            path.is_file() && name.starts_with(ITEM_PREFIX),
            "delete expects an item-shaped path, got {:?}",
            path.materialized(),
        );
        let item_id = &name[ITEM_PREFIX.len()..];

        let parent = self.parent_collection_of_file(path);
        let items = self.client.items(&parent, None).await?;
        let item = items
            .iter()
            .find(|item| item_id_from_url(&item.about).as_deref() == Some(item_id))
            .ok_or_else(|| self.not_found(path))?;

        let locator = deposit_locator(&item.about, item_id)?;
        info!(title = %item.title, locator = %locator, "delete");
        self.client.delete_item(&locator).await
    }

    fn can_intra_move(&self, dest: &dyn StorageProvider, path: &ResourcePath) -> bool {
        debug!(dest = dest.name(), path = %path, "can_intra_move");
        // Only whole collections can be re-parented.
        dest.name() == NAME && path.is_dir()
    }

    async fn intra_move(
        &self,
        dest: &dyn StorageProvider,
        src: &ResourcePath,
        dest_path: &ResourcePath,
    ) -> Result<(EntryMetadata, bool)> {
        if !self.can_intra_move(dest, src) {
            return Err(Error::UnsupportedOperation {
                provider: NAME.to_string(),
                operation: "intra_move",
                path: src.materialized(),
            });
        }

        let src_id = self.collection_id_of_dir(src)?;
        let dest_id = self.collection_id_of_dir(dest_path)?;

        info!(src = %src_id, dest = %dest_id, "re-parenting collection");
        self.client.update_relation(&src_id, &dest_id).await?;

        // Build fresh metadata from a re-fetched tree; the pre-move view
        // is stale after a structural change.
        let collections = self.client.collections().await?;
        let moved = collections
            .iter()
            .find(|c| c.id == src_id)
            .ok_or_else(|| self.not_found(src))?;

        Ok((
            EntryMetadata::Folder(folder_metadata(moved, &collections, &self.root_id)),
            true,
        ))
    }

    async fn revisions(&self, path: &ResourcePath) -> Result<Vec<RevisionMetadata>> {
        let Some(item_id) = path.identifier() else {
            return Err(self.not_found(path));
        };

        let parent = self.parent_collection_of_file(path);
        let collections = self.client.collections().await?;
        let collection = collections
            .iter()
            .find(|c| c.id == parent)
            .ok_or_else(|| self.not_found(path))?;

        // No native version API: every listed state of the item counts
        // as one revision, in listing order.
        let items = self.client.items(&parent, None).await?;
        let mut revisions = Vec::new();
        for item in items
            .iter()
            .filter(|item| item_id_from_url(&item.about).as_deref() == Some(item_id))
        {
            let meta = file_metadata(item, collection, &collections, &self.root_id)?;
            let version = meta
                .etag
                .as_deref()
                .map(version_from_etag)
                .unwrap_or_else(|| item_id.to_string());
            revisions.push(RevisionMetadata::from_metadata(NAME, &version, &meta));
        }
        Ok(revisions)
    }
}
