//! Depot storage provider implementation.
//!
//! The depot is a path-addressed cloud file store with stable file ids,
//! quoted etags, RFC-1123 timestamps, per-file hash sets and a native
//! version-history endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use portage_common::{Error, ResourcePath, Result};

use crate::metadata::{
    rfc1123_to_utc, version_from_etag, EntryMetadata, Extra, RevisionMetadata,
    REVISION_IDENTIFIER,
};
use crate::provider::{Listing, StorageProvider};
use crate::streams::{spool_to_tempfile, ByteStream};

use super::client::{DepotClient, HttpDepotClient};
use super::metadata::{child_metadata, file_metadata, folder_metadata};

pub const NAME: &str = "depot";

/// Depot provider settings, supplied as an opaque, pre-validated mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct DepotSettings {
    pub base_url: String,
    pub token: String,
}

/// Depot storage provider.
pub struct DepotProvider {
    client: Arc<dyn DepotClient>,
}

impl DepotProvider {
    /// Create a provider from a settings mapping.
    ///
    /// # Errors
    /// - `Error::InvalidSettings` when the mapping does not fit
    ///   [`DepotSettings`]
    pub fn from_settings(settings: Value) -> Result<Self> {
        let settings: DepotSettings = serde_json::from_value(settings)
            .map_err(|e| Error::InvalidSettings(format!("invalid depot settings: {}", e)))?;
        let client = HttpDepotClient::new(&settings.base_url, &settings.token)?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create a provider over an arbitrary client shim.
    pub fn with_client(client: Arc<dyn DepotClient>) -> Self {
        Self { client }
    }

    fn not_found(&self, path: &ResourcePath) -> Error {
        Error::NotFound {
            provider: NAME.to_string(),
            path: path.materialized(),
        }
    }
}

#[async_trait]
impl StorageProvider for DepotProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn validate_path(&self, raw: &str, revision: Option<&str>) -> Result<ResourcePath> {
        let path = ResourcePath::parse(raw)?.with_revision(revision.map(str::to_string));
        if path.is_root() {
            return Ok(path);
        }

        // The depot resolves by path, so a 404 here is definitive.
        match self.client.entry(&path.materialized()).await? {
            Some(entry) => {
                if entry.dir != path.is_dir() {
                    return Err(Error::Metadata {
                        provider: NAME.to_string(),
                        message: format!(
                            "{} exists but is a {}",
                            path.materialized(),
                            if entry.dir { "folder" } else { "file" },
                        ),
                        code: 404,
                    });
                }
                Ok(path.with_identifier(entry.file_id))
            }
            None => Err(self.not_found(&path)),
        }
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

        if path.is_dir() {
            let entries = self.client.list(&path.materialized()).await?;
            let children = entries
                .iter()
                .map(|entry| child_metadata(entry, path))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Listing::Children(children));
        }

        let entry = self
            .client
            .entry(&path.materialized())
            .await?
            .ok_or_else(|| self.not_found(path))?;
        let mut meta = file_metadata(&entry, path);

        if let Some(version) = version {
            let history = self.client.versions(&entry.file_id).await?;
            let matched = history
                .into_iter()
                .find(|v| version_from_etag(&v.etag) == version)
                .ok_or_else(|| self.not_found(path))?;

            // Historical state: only what the version record carries is
            // known; everything else stays absent.
            meta.etag = Some(matched.etag);
            meta.modified_utc = matched.modified.as_deref().and_then(rfc1123_to_utc);
            meta.modified = matched.modified;
            meta.size = None;
            meta.extra = Extra::with_hashes(matched.hashes);
        }

        Ok(Listing::File(Box::new(meta)))
    }

    async fn download(
        &self,
        path: &ResourcePath,
        revision: Option<&str>,
        range: Option<(u64, u64)>,
    ) -> Result<ByteStream> {
        // The depot's fetch surface is path-addressed: the resolved
        // identifier proves the path went through validation and keys
        // the version-history endpoint, while content fetches stay
        // keyed by the materialized path.
        if path.identifier().is_none() {
            return Err(self.not_found(path));
        }

        let revision = revision.or(path.revision());
        let response = self
            .client
            .fetch(&path.materialized(), revision, range)
            .await?;

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
        // The depot needs a content length up front; the stream does not
        // pre-declare its size, so spool it to a temporary file first.
        let (spool, size) = spool_to_tempfile(stream).await?;

        let existed = self.client.entry(&path.materialized()).await?.is_some();
        let file_id = self.client.store(&path.materialized(), spool, size).await?;

        // Re-query the listing and match the correlation id, never the
        // name: concurrent uploads of the same name race.
        let parent = path.parent().unwrap_or_else(ResourcePath::root);
        let entries = self.client.list(&parent.materialized()).await?;
        let matched = entries
            .iter()
            .find(|entry| entry.file_id == file_id)
            .ok_or_else(|| Error::UploadConsistency {
                provider: NAME.to_string(),
                path: path.materialized(),
                correlation_id: file_id.clone(),
            })?;

        info!(path = %path, file_id = %file_id, size, "uploaded");
        Ok((child_metadata(matched, &parent)?, !existed))
    }

    async fn delete(&self, path: &ResourcePath) -> Result<()> {
        // Deleting the provider root is a caller bug.
        assert!(!path.is_root(), "delete called on the provider root");

        info!(path = %path, "delete");
        self.client.remove(&path.materialized()).await
    }

    fn can_intra_move(&self, dest: &dyn StorageProvider, path: &ResourcePath) -> bool {
        debug!(dest = dest.name(), path = %path, "can_intra_move");
        dest.name() == NAME
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

        let existed = self.client.entry(&dest_path.materialized()).await?.is_some();

        info!(src = %src, dest = %dest_path, "intra_move");
        self.client
            .relocate(&src.materialized(), &dest_path.materialized())
            .await?;

        // Never reuse pre-move metadata; staleness after a structural
        // change is unsafe to assume away.
        let entry = self
            .client
            .entry(&dest_path.materialized())
            .await?
            .ok_or_else(|| self.not_found(dest_path))?;

        let meta = if entry.dir {
            EntryMetadata::Folder(folder_metadata(&entry, dest_path))
        } else {
            EntryMetadata::File(file_metadata(&entry, dest_path))
        };
        Ok((meta, !existed))
    }

    async fn revisions(&self, path: &ResourcePath) -> Result<Vec<RevisionMetadata>> {
        let Some(file_id) = path.identifier() else {
            return Err(self.not_found(path));
        };

        let history = self.client.versions(file_id).await?;
        if !history.is_empty() {
            return Ok(history
                .into_iter()
                .map(|v| RevisionMetadata {
                    provider: NAME.to_string(),
                    version_identifier: REVISION_IDENTIFIER.to_string(),
                    version: version_from_etag(&v.etag),
                    modified_utc: v.modified.as_deref().and_then(rfc1123_to_utc),
                    modified: v.modified,
                    extra: Extra::with_hashes(v.hashes),
                })
                .collect());
        }

        // No native history recorded yet: the current file state is the
        // only known revision.
        let entry = self
            .client
            .entry(&path.materialized())
            .await?
            .ok_or_else(|| self.not_found(path))?;
        let meta = file_metadata(&entry, path);
        let version = meta
            .etag
            .as_deref()
            .map(version_from_etag)
            .unwrap_or_else(|| entry.file_id.clone());

        Ok(vec![RevisionMetadata::from_metadata(NAME, &version, &meta)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depot::client::{DepotEntry, DepotVersion};
    use crate::streams::{self, DownloadResponse};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;
    use tokio::fs::File;
    use tokio::io::AsyncReadExt;

    const MODIFIED: &str = "Sun, 10 Jul 2016 23:28:31 GMT";
    const ETAG: &str = "\"a3c411808d58977a9ecd7485b5b7958e\"";

    /// In-memory depot keyed by materialized path.
    #[derive(Default)]
    struct FakeDepotClient {
        entries: Mutex<BTreeMap<String, DepotEntry>>,
        contents: Mutex<BTreeMap<String, Vec<u8>>>,
        versions: Mutex<BTreeMap<String, Vec<DepotVersion>>>,
        next_id: AtomicU64,
        // Simulates backend indexing lag: store succeeds but the entry
        // never shows up in listings.
        drop_stored_entries: AtomicBool,
    }

    impl FakeDepotClient {
        fn seed(&self, path: &str, entry: DepotEntry) {
            self.entries.lock().unwrap().insert(path.to_string(), entry);
        }

        fn seed_content(&self, path: &str, content: &[u8]) {
            self.contents
                .lock()
                .unwrap()
                .insert(path.to_string(), content.to_vec());
        }

        fn seed_versions(&self, file_id: &str, versions: Vec<DepotVersion>) {
            self.versions
                .lock()
                .unwrap()
                .insert(file_id.to_string(), versions);
        }

        fn parent_of(key: &str) -> String {
            let trimmed = key.trim_end_matches('/');
            match trimmed.rfind('/') {
                Some(idx) => key[..idx + 1].to_string(),
                None => "/".to_string(),
            }
        }
    }

    #[async_trait]
    impl DepotClient for FakeDepotClient {
        async fn entry(&self, path: &str) -> Result<Option<DepotEntry>> {
            let entries = self.entries.lock().unwrap();
            // A real stat resolves the path regardless of a trailing
            // separator; kind checking is the adapter's job.
            Ok(entries
                .get(path)
                .or_else(|| entries.get(&format!("{}/", path.trim_end_matches('/'))))
                .cloned())
        }

        async fn list(&self, path: &str) -> Result<Vec<DepotEntry>> {
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .iter()
                .filter(|(key, _)| key.as_str() != path && Self::parent_of(key) == path)
                .map(|(_, entry)| entry.clone())
                .collect())
        }

        async fn fetch(
            &self,
            path: &str,
            _revision: Option<&str>,
            range: Option<(u64, u64)>,
        ) -> Result<DownloadResponse> {
            let contents = self.contents.lock().unwrap();
            let Some(data) = contents.get(path) else {
                return Ok(DownloadResponse {
                    status: 404,
                    body: streams::from_bytes(Vec::new()),
                });
            };
            match range {
                Some((start, end)) => {
                    let end = (end as usize + 1).min(data.len());
                    Ok(DownloadResponse {
                        status: 206,
                        body: streams::from_bytes(data[start as usize..end].to_vec()),
                    })
                }
                None => Ok(DownloadResponse {
                    status: 200,
                    body: streams::from_bytes(data.clone()),
                }),
            }
        }

        async fn store(&self, path: &str, mut content: File, size: u64) -> Result<String> {
            let mut data = Vec::new();
            content.read_to_end(&mut data).await?;
            assert_eq!(data.len() as u64, size);

            let id = format!("fid{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            if !self.drop_stored_entries.load(Ordering::SeqCst) {
                let name = path.trim_end_matches('/').rsplit('/').next().unwrap();
                self.seed(
                    path,
                    DepotEntry {
                        file_id: id.clone(),
                        name: name.to_string(),
                        dir: false,
                        size: Some(data.len().to_string()),
                        etag: Some(format!("\"etag-{}\"", id)),
                        modified: Some(MODIFIED.to_string()),
                        created: None,
                        content_type: Some("application/octet-stream".to_string()),
                        hashes: BTreeMap::new(),
                    },
                );
                self.seed_content(path, &data);
            }
            Ok(id)
        }

        async fn remove(&self, path: &str) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| Error::NotFound {
                    provider: NAME.to_string(),
                    path: path.to_string(),
                })
        }

        async fn relocate(&self, from: &str, to: &str) -> Result<()> {
            let mut entries = self.entries.lock().unwrap();
            let mut entry = entries.remove(from).ok_or_else(|| Error::NotFound {
                provider: NAME.to_string(),
                path: from.to_string(),
            })?;
            entry.name = to.trim_end_matches('/').rsplit('/').next().unwrap().to_string();
            entries.insert(to.to_string(), entry);
            Ok(())
        }

        async fn versions(&self, file_id: &str) -> Result<Vec<DepotVersion>> {
            Ok(self
                .versions
                .lock()
                .unwrap()
                .get(file_id)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn dissertation_hashes() -> BTreeMap<String, String> {
        let mut hashes = BTreeMap::new();
        hashes.insert(
            "md5".to_string(),
            "ee0558f500468642243e29dc914832e9".to_string(),
        );
        hashes.insert(
            "sha256".to_string(),
            "c9b2543ae9c0a94579fa899dde770af9538d93ce6c58948c86c0a6d8f5d1b014".to_string(),
        );
        hashes.insert(
            "sha512".to_string(),
            "45e0920b6d7850fbaf028a1ee1241154a7641f3ee325efb3fe483d86dba5c170\
             a4b1075d7e7fd2ae0c321def6022f3aa2b59e0c1dc5213bf1c50690f5cf0b688"
                .to_string(),
        );
        hashes
    }

    fn seeded_client() -> Arc<FakeDepotClient> {
        let client = Arc::new(FakeDepotClient::default());
        client.seed(
            "/Documents/",
            DepotEntry {
                file_id: "100".to_string(),
                name: "Documents".to_string(),
                dir: true,
                size: None,
                etag: Some("\"57688dd3584b0\"".to_string()),
                modified: None,
                created: None,
                content_type: None,
                hashes: BTreeMap::new(),
            },
        );
        client.seed(
            "/Documents/dissertation.aux",
            DepotEntry {
                file_id: "7923".to_string(),
                name: "dissertation.aux".to_string(),
                dir: false,
                size: Some("3011".to_string()),
                etag: Some(ETAG.to_string()),
                modified: Some(MODIFIED.to_string()),
                created: None,
                content_type: Some("application/octet-stream".to_string()),
                hashes: dissertation_hashes(),
            },
        );
        client
    }

    fn provider(client: Arc<FakeDepotClient>) -> DepotProvider {
        DepotProvider::with_client(client)
    }

    #[tokio::test]
    async fn test_validate_path_attaches_identifier() {
        let provider = provider(seeded_client());
        let path = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();
        assert_eq!(path.identifier(), Some("7923"));
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn test_validate_path_missing_is_not_found() {
        let provider = provider(seeded_client());
        let err = provider.validate_path("/nope.txt", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validate_path_kind_mismatch() {
        let provider = provider(seeded_client());
        // "/Documents" names a folder; the file shape is unsupported.
        let err = provider.validate_path("/Documents", None).await.unwrap_err();
        assert!(matches!(err, Error::Metadata { code: 404, .. }));
    }

    #[tokio::test]
    async fn test_revalidate_path_inherits_revision() {
        let provider = provider(seeded_client());
        let base = ResourcePath::parse("/Documents/")
            .unwrap()
            .with_revision(Some("latest".to_string()));

        let child = provider
            .revalidate_path(&base, "new.txt", false, None)
            .await
            .unwrap();
        assert_eq!(child.materialized(), "/Documents/new.txt");
        assert_eq!(child.revision(), Some("latest"));

        let pinned = provider
            .revalidate_path(&base, "new.txt", false, Some("v2"))
            .await
            .unwrap();
        assert_eq!(pinned.revision(), Some("v2"));
    }

    #[tokio::test]
    async fn test_folder_listing_end_to_end() {
        let provider = provider(seeded_client());
        let folder = provider.validate_path("/Documents/", None).await.unwrap();

        let listing = provider.metadata(&folder, None).await.unwrap();
        let children = listing.as_children().unwrap();
        assert_eq!(children.len(), 1);

        let EntryMetadata::File(file) = &children[0] else {
            panic!("expected a file entry");
        };
        assert_eq!(file.name, "dissertation.aux");
        assert_eq!(file.size.as_deref(), Some("3011"));
        assert_eq!(file.etag.as_deref(), Some(ETAG));
        assert_eq!(
            file.modified_utc.as_deref(),
            Some("2016-07-10T23:28:31+00:00")
        );
        assert_eq!(file.extra.hashes, dissertation_hashes());

        let links = file.json_api_links("http://localhost:7777", "guid0");
        let url = "http://localhost:7777/v1/resources/guid0/providers/depot/Documents/dissertation.aux";
        assert_eq!(links["delete"], url);
        assert_eq!(links["download"], url);
        assert_eq!(links["move"], url);
        assert_eq!(links["upload"], format!("{}?kind=file", url));
        assert_eq!(links.len(), 4);
    }

    #[tokio::test]
    async fn test_file_metadata_with_version_filter() {
        let client = seeded_client();
        client.seed_versions(
            "7923",
            vec![
                DepotVersion {
                    etag: ETAG.to_string(),
                    modified: Some(MODIFIED.to_string()),
                    hashes: dissertation_hashes(),
                },
                DepotVersion {
                    etag: "\"older\"".to_string(),
                    modified: Some("Sat, 09 Jul 2016 10:00:00 GMT".to_string()),
                    hashes: BTreeMap::new(),
                },
            ],
        );
        let provider = provider(client);
        let path = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();

        let listing = provider.metadata(&path, Some("older")).await.unwrap();
        let file = listing.as_file().unwrap();
        assert_eq!(file.etag.as_deref(), Some("\"older\""));
        assert_eq!(file.size, None);
        assert!(file.extra.is_empty());

        let err = provider.metadata(&path, Some("ghost")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_download_requires_identifier() {
        let provider = provider(seeded_client());
        let unresolved = ResourcePath::parse("/Documents/dissertation.aux").unwrap();
        let err = provider.download(&unresolved, None, None).await.err().unwrap();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_download_ranged() {
        let client = seeded_client();
        client.seed_content("/Documents/dissertation.aux", b"0123456789");
        let provider = provider(client);
        let path = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();

        let body = provider.download(&path, None, Some((2, 5))).await.unwrap();
        assert_eq!(streams::collect(body).await.unwrap(), b"2345");
    }

    #[tokio::test]
    async fn test_download_fetches_by_path_not_identifier() {
        let client = seeded_client();
        client.seed_content("/Documents/dissertation.aux", b"content");
        let provider = provider(client);

        // The identifier gates the call; the fetch itself is keyed by
        // the materialized path.
        let path = ResourcePath::parse("/Documents/dissertation.aux")
            .unwrap()
            .with_identifier("stale-id");
        let body = provider.download(&path, None, None).await.unwrap();
        assert_eq!(streams::collect(body).await.unwrap(), b"content");
    }

    #[tokio::test]
    async fn test_download_surfaces_bad_status() {
        let client = seeded_client();
        // No content seeded: the fake reports 404 on fetch.
        let provider = provider(client);
        let path = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();

        let err = provider.download(&path, None, None).await.err().unwrap();
        assert!(matches!(err, Error::Download { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_upload_correlates_by_file_id() {
        let client = seeded_client();
        let provider = provider(client.clone());
        let parent = provider.validate_path("/Documents/", None).await.unwrap();
        let path = provider
            .revalidate_path(&parent, "thesis.pdf", false, None)
            .await
            .unwrap();

        let (first, created_first) = provider
            .upload(streams::from_bytes(b"draft one".to_vec()), &path)
            .await
            .unwrap();
        let (second, created_second) = provider
            .upload(streams::from_bytes(b"draft two, longer".to_vec()), &path)
            .await
            .unwrap();

        assert!(created_first);
        assert!(!created_second);

        // Each call resolves the entry actually created for that call.
        let EntryMetadata::File(first) = first else {
            panic!("expected file metadata")
        };
        let EntryMetadata::File(second) = second else {
            panic!("expected file metadata")
        };
        assert_eq!(first.size.as_deref(), Some("9"));
        assert_eq!(second.size.as_deref(), Some("17"));
        assert_ne!(first.etag, second.etag);
    }

    #[tokio::test]
    async fn test_upload_consistency_fault() {
        let client = seeded_client();
        client.drop_stored_entries.store(true, Ordering::SeqCst);
        let provider = provider(client);
        let path = ResourcePath::parse("/Documents/ghost.txt").unwrap();

        let err = provider
            .upload(streams::from_bytes(b"data".to_vec()), &path)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UploadConsistency { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let client = seeded_client();
        let provider = provider(client.clone());
        let path = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();

        provider.delete(&path).await.unwrap();
        assert!(client
            .entry("/Documents/dissertation.aux")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    #[should_panic(expected = "provider root")]
    async fn test_delete_root_is_a_contract_violation() {
        let provider = provider(seeded_client());
        let _ = provider.delete(&ResourcePath::root()).await;
    }

    #[tokio::test]
    async fn test_intra_move_returns_fresh_metadata() {
        let client = seeded_client();
        let provider = provider(client);
        let src = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();
        let dest_path = ResourcePath::parse("/Documents/final.aux").unwrap();

        assert!(provider.can_intra_move(&provider, &src));
        let (meta, created) = provider
            .intra_move(&provider, &src, &dest_path)
            .await
            .unwrap();

        assert!(created);
        let EntryMetadata::File(file) = meta else {
            panic!("expected file metadata")
        };
        assert_eq!(file.name, "final.aux");
        assert_eq!(file.materialized_path, "/Documents/final.aux");
    }

    #[tokio::test]
    async fn test_revisions_native_history() {
        let client = seeded_client();
        client.seed_versions(
            "7923",
            vec![
                DepotVersion {
                    etag: ETAG.to_string(),
                    modified: Some(MODIFIED.to_string()),
                    hashes: dissertation_hashes(),
                },
                DepotVersion {
                    etag: "\"older\"".to_string(),
                    modified: Some("Sat, 09 Jul 2016 10:00:00 GMT".to_string()),
                    hashes: BTreeMap::new(),
                },
            ],
        );
        let provider = provider(client);
        let path = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();

        let revisions = provider.revisions(&path).await.unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[0].version, "a3c411808d58977a9ecd7485b5b7958e");
        assert_eq!(revisions[0].version_identifier, "revision");
        assert_eq!(revisions[1].version, "older");
        assert!(revisions[1].extra.is_empty());
    }

    #[tokio::test]
    async fn test_revisions_degrades_to_current_state() {
        let provider = provider(seeded_client());
        let path = provider
            .validate_path("/Documents/dissertation.aux", None)
            .await
            .unwrap();

        let revisions = provider.revisions(&path).await.unwrap();
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].version, "a3c411808d58977a9ecd7485b5b7958e");
        assert_eq!(revisions[0].modified.as_deref(), Some(MODIFIED));
        assert_eq!(revisions[0].extra.hashes, dissertation_hashes());
    }
}
