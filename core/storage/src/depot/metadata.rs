//! Depot listing entries mapped onto the canonical metadata model.

use portage_common::{ResourcePath, Result};

use crate::metadata::{
    rfc1123_to_utc, EntryMetadata, Extra, FileMetadata, FolderMetadata, DIR_CONTENT_TYPE,
};

use super::client::DepotEntry;
use super::provider::NAME;

/// Build file metadata from one native listing entry.
///
/// Every attribute the depot did not supply stays absent; timestamps are
/// kept verbatim with a derived ISO-8601 UTC rendering alongside.
pub(crate) fn file_metadata(entry: &DepotEntry, path: &ResourcePath) -> FileMetadata {
    FileMetadata {
        provider: NAME.to_string(),
        name: entry.name.clone(),
        path: path.materialized(),
        materialized_path: path.materialized(),
        size: entry.size.clone(),
        etag: entry.etag.clone(),
        modified: entry.modified.clone(),
        modified_utc: entry.modified.as_deref().and_then(rfc1123_to_utc),
        created_utc: entry.created.as_deref().and_then(rfc1123_to_utc),
        content_type: entry.content_type.clone(),
        extra: Extra::with_hashes(entry.hashes.clone()),
    }
}

pub(crate) fn folder_metadata(entry: &DepotEntry, path: &ResourcePath) -> FolderMetadata {
    FolderMetadata {
        provider: NAME.to_string(),
        name: entry.name.clone(),
        path: path.materialized(),
        materialized_path: path.materialized(),
        etag: entry.etag.clone(),
        modified: entry.modified.clone(),
        modified_utc: entry.modified.as_deref().and_then(rfc1123_to_utc),
        content_type: Some(DIR_CONTENT_TYPE.to_string()),
        extra: Extra::default(),
    }
}

/// Build the tagged metadata for one child of `parent`.
pub(crate) fn child_metadata(entry: &DepotEntry, parent: &ResourcePath) -> Result<EntryMetadata> {
    let path = parent.child(&entry.name, entry.dir)?;
    Ok(if entry.dir {
        EntryMetadata::Folder(folder_metadata(entry, &path))
    } else {
        EntryMetadata::File(file_metadata(entry, &path))
    })
}
