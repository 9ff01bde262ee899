//! Storage provider trait definition.

use async_trait::async_trait;

use portage_common::{Error, ResourcePath, Result};

use crate::metadata::{EntryMetadata, FileMetadata, RevisionMetadata};
use crate::streams::ByteStream;

/// Result of a metadata request: a single file, or a folder's children.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    File(Box<FileMetadata>),
    Children(Vec<EntryMetadata>),
}

impl Listing {
    /// The file metadata, when the request addressed a file.
    pub fn as_file(&self) -> Option<&FileMetadata> {
        match self {
            Listing::File(file) => Some(file),
            Listing::Children(_) => None,
        }
    }

    /// The child entries, when the request addressed a folder.
    pub fn as_children(&self) -> Option<&[EntryMetadata]> {
        match self {
            Listing::File(_) => None,
            Listing::Children(children) => Some(children),
        }
    }
}

/// Uniform asynchronous contract every backend adapter implements.
///
/// Every operation that touches the network or disk is a suspension
/// point. No operation spawns parallel workers internally; concurrency
/// comes from running many independent logical requests under a shared
/// scheduler. No cross-request ordering is guaranteed: concurrent uploads
/// to the same destination name race, and are disambiguated by the
/// backend-native correlation id, never by submission order.
///
/// Deletes and moves are not transactional. Abandoning an in-flight call
/// does not roll back already-issued backend mutations or partial spool
/// writes; spool buffers themselves are released via RAII.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// The backend name (e.g. "depot", "archive").
    fn name(&self) -> &'static str;

    /// Whether a file and folder may share a name within one container.
    fn can_duplicate_names(&self) -> bool {
        true
    }

    /// Validate an untrusted raw path.
    ///
    /// Accepts only absolute paths and rejects traversal outside the
    /// backend namespace. Backends with a resolve-by-path lookup attach
    /// the native identifier; otherwise the identifier stays absent and
    /// is resolved lazily by later operations.
    ///
    /// # Errors
    /// - `Error::InvalidPath` for malformed input
    /// - `Error::NotFound` only when the backend definitively proves the
    ///   path does not exist
    async fn validate_path(&self, raw: &str, revision: Option<&str>) -> Result<ResourcePath>;

    /// Derive a child path from an already-known parent without a network
    /// round-trip, inheriting the parent's revision marker when no
    /// revision is supplied.
    async fn revalidate_path(
        &self,
        base: &ResourcePath,
        segment: &str,
        folder: bool,
        revision: Option<&str>,
    ) -> Result<ResourcePath>;

    /// Fetch metadata: a listing for folders, a single entry for files.
    ///
    /// `version` selects among backend-specific states; when absent it
    /// falls back to the path's own revision marker, then to "current".
    ///
    /// # Errors
    /// - `Error::Metadata { code: 404, .. }` for unsupported path shapes
    /// - `Error::NotFound` when the resource does not exist
    async fn metadata(&self, path: &ResourcePath, version: Option<&str>) -> Result<Listing>;

    /// Issue a ranged content fetch and return a lazy byte stream.
    ///
    /// The stream produces bytes on demand, forward-only, and is not
    /// restartable once partially consumed.
    ///
    /// # Errors
    /// - `Error::NotFound` when `path.identifier()` is absent
    /// - `Error::Download` for non-(200, 206) responses
    async fn download(
        &self,
        path: &ResourcePath,
        revision: Option<&str>,
        range: Option<(u64, u64)>,
    ) -> Result<ByteStream>;

    /// Consume the entire input stream and store it at `path`.
    ///
    /// Backends that require a known content length spool the stream to a
    /// temporary buffer first. After the backend accepts the content, the
    /// adapter re-queries the listing and matches the backend-native
    /// correlation id (never the name, since concurrent uploads of the
    /// same name race). Returns the fresh metadata and whether the
    /// destination was newly created.
    ///
    /// # Errors
    /// - `Error::UploadConsistency` when no matching entry is found after
    ///   the backend accepted the content
    async fn upload(
        &self,
        stream: ByteStream,
        path: &ResourcePath,
    ) -> Result<(EntryMetadata, bool)>;

    /// Delete the resource at `path`.
    ///
    /// # Panics
    /// Asserts that the path shape matches the backend's
    /// deletable-resource convention; a mismatch is a caller bug, not a
    /// recoverable condition.
    async fn delete(&self, path: &ResourcePath) -> Result<()>;

    /// Whether `path` can be moved to `dest` without leaving the backend.
    ///
    /// Backends that only support moving whole containers encode that
    /// restriction here.
    fn can_intra_move(&self, _dest: &dyn StorageProvider, _path: &ResourcePath) -> bool {
        false
    }

    /// Move `src` under `dest_path` within the same backend and return
    /// fresh metadata reflecting the new position.
    ///
    /// Implementations re-fetch backend state after the move rather than
    /// mutating stale metadata in place.
    ///
    /// # Errors
    /// - `Error::UnsupportedOperation` when the backend cannot move this
    ///   path shape
    async fn intra_move(
        &self,
        _dest: &dyn StorageProvider,
        src: &ResourcePath,
        _dest_path: &ResourcePath,
    ) -> Result<(EntryMetadata, bool)> {
        Err(Error::UnsupportedOperation {
            provider: self.name().to_string(),
            operation: "intra_move",
            path: src.materialized(),
        })
    }

    /// List historical versions of a file, newest first.
    ///
    /// Backends without native version history degrade to scanning the
    /// current listing for entries matching the path's identifier. The
    /// returned order is stable for repeated calls against unchanged
    /// backend state.
    async fn revisions(&self, path: &ResourcePath) -> Result<Vec<RevisionMetadata>>;
}
