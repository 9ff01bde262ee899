//! Archive collections and items mapped onto the canonical metadata
//! model.
//!
//! Collections are addressed by id in the backend-facing path and by
//! title in the materialized path; both are derived by walking the
//! collection tree up to (but not including) the configured root.

use std::collections::BTreeMap;

use portage_common::{Error, Result};

use crate::metadata::{rfc1123_to_utc, Extra, FileMetadata, FolderMetadata};

use super::client::{item_id_from_url, ArchiveCollection, ArchiveItem};
use super::provider::NAME;

/// The ancestry of `collection` below the root, top-most first,
/// including `collection` itself. The configured root maps to the
/// provider root and contributes no segment.
fn ancestry<'a>(
    collection: &'a ArchiveCollection,
    all: &'a [ArchiveCollection],
    root_id: &str,
) -> Vec<&'a ArchiveCollection> {
    if collection.id == root_id {
        return Vec::new();
    }
    let mut chain = vec![collection];
    let mut parent = collection.parent_id.as_deref();
    while let Some(pid) = parent {
        if pid == root_id {
            break;
        }
        match all.iter().find(|c| c.id == pid) {
            Some(p) => {
                chain.push(p);
                parent = p.parent_id.as_deref();
            }
            // Orphaned branch; treat the highest known ancestor as
            // hanging off the root.
            None => break,
        }
    }
    chain.reverse();
    chain
}

fn folder_paths(
    collection: &ArchiveCollection,
    all: &[ArchiveCollection],
    root_id: &str,
) -> (String, String) {
    let chain = ancestry(collection, all, root_id);
    if chain.is_empty() {
        return ("/".to_string(), "/".to_string());
    }
    let ids: Vec<&str> = chain.iter().map(|c| c.id.as_str()).collect();
    let titles: Vec<&str> = chain.iter().map(|c| c.title.as_str()).collect();
    (
        format!("/{}/", ids.join("/")),
        format!("/{}/", titles.join("/")),
    )
}

/// Build folder metadata for one collection.
pub(crate) fn folder_metadata(
    collection: &ArchiveCollection,
    all: &[ArchiveCollection],
    root_id: &str,
) -> FolderMetadata {
    let (path, materialized_path) = folder_paths(collection, all, root_id);
    FolderMetadata {
        provider: NAME.to_string(),
        name: collection.title.clone(),
        path,
        materialized_path,
        etag: None,
        modified: None,
        modified_utc: None,
        content_type: None,
        extra: Extra::default(),
    }
}

/// Build file metadata for one item of `collection`.
///
/// # Errors
/// - `Error::Serialization` when the item locator carries no parseable id
pub(crate) fn file_metadata(
    item: &ArchiveItem,
    collection: &ArchiveCollection,
    all: &[ArchiveCollection],
    root_id: &str,
) -> Result<FileMetadata> {
    let item_id = item_id_from_url(&item.about).ok_or_else(|| {
        Error::Serialization(format!("item locator carries no id: {}", item.about))
    })?;
    let (folder_path, folder_materialized) = folder_paths(collection, all, root_id);

    let mut hashes = BTreeMap::new();
    if let Some(md5) = &item.md5 {
        hashes.insert("md5".to_string(), md5.clone());
    }

    Ok(FileMetadata {
        provider: NAME.to_string(),
        name: item.title.clone(),
        path: format!("{}item{}", folder_path, item_id),
        materialized_path: format!("{}{}", folder_materialized, item.title),
        size: item.size.clone(),
        etag: item.etag.clone(),
        modified: item.modified.clone(),
        modified_utc: item.modified.as_deref().and_then(rfc1123_to_utc),
        created_utc: None,
        content_type: item.content_type.clone(),
        extra: Extra::with_hashes(hashes),
    })
}
