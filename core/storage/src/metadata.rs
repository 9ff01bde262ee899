//! Canonical metadata model shared by every backend adapter.
//!
//! Each adapter constructs these entities fresh from one native listing
//! entry plus shared context; nothing here is cached across calls. Every
//! attribute a backend did not supply stays `None` — callers must treat
//! absence as "unknown", never as zero or empty.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Directory-marker MIME type used by backends that report one.
pub const DIR_CONTENT_TYPE: &str = "httpd/unix-directory";

/// Version-scheme name for etag-derived revisions.
pub const REVISION_IDENTIFIER: &str = "revision";

/// Backend-supplied auxiliary attributes.
///
/// Carries at minimum a `hashes` mapping of algorithm name to hex digest,
/// present only when the backend supplies digests. An absent hash set
/// serializes to an empty mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hashes: BTreeMap<String, String>,
}

impl Extra {
    pub fn with_hashes(hashes: BTreeMap<String, String>) -> Self {
        Self { hashes }
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    fn to_value(&self) -> Value {
        if self.hashes.is_empty() {
            json!({})
        } else {
            json!({ "hashes": self.hashes })
        }
    }
}

/// Canonical description of one file version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Backend name (e.g. "depot").
    pub provider: String,
    pub name: String,
    /// Backend-facing path (may be id-based for id-addressed backends).
    pub path: String,
    /// Human-facing path with the file/folder convention applied.
    pub materialized_path: String,
    /// Size in bytes as reported by the backend, verbatim.
    pub size: Option<String>,
    /// Freshness/version token, quoted exactly as the backend sent it.
    pub etag: Option<String>,
    /// RFC-1123 modification timestamp, verbatim.
    pub modified: Option<String>,
    /// ISO-8601 UTC rendering of `modified`.
    pub modified_utc: Option<String>,
    pub created_utc: Option<String>,
    pub content_type: Option<String>,
    pub extra: Extra,
}

impl FileMetadata {
    /// Flat wire form.
    pub fn serialized(&self) -> Value {
        json!({
            "provider": self.provider,
            "kind": "file",
            "name": self.name,
            "path": self.path,
            "materialized": self.materialized_path,
            "size": self.size,
            "etag": self.etag,
            "modified": self.modified,
            "modified_utc": self.modified_utc,
            "created_utc": self.created_utc,
            "contentType": self.content_type,
            "extra": self.extra.to_value(),
        })
    }

    /// Action-URL set for this file, keyed by action name.
    pub fn json_api_links(&self, api_base: &str, resource: &str) -> BTreeMap<String, String> {
        action_links(
            Kind::File,
            api_base,
            &self.provider,
            resource,
            &self.materialized_path,
        )
    }

    /// Resource-linked wire form.
    pub fn json_api_serialized(&self, api_base: &str, resource: &str) -> Value {
        json!({
            "type": "files",
            "id": format!("{}{}", self.provider, self.path),
            "attributes": self.serialized(),
            "links": self.json_api_links(api_base, resource),
        })
    }
}

/// Canonical description of one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMetadata {
    pub provider: String,
    pub name: String,
    pub path: String,
    pub materialized_path: String,
    pub etag: Option<String>,
    pub modified: Option<String>,
    pub modified_utc: Option<String>,
    /// Directory-marker MIME type, where the backend reports one.
    pub content_type: Option<String>,
    pub extra: Extra,
}

impl FolderMetadata {
    pub fn serialized(&self) -> Value {
        json!({
            "provider": self.provider,
            "kind": "folder",
            "name": self.name,
            "path": self.path,
            "materialized": self.materialized_path,
            "size": Value::Null,
            "etag": self.etag,
            "modified": self.modified,
            "modified_utc": self.modified_utc,
            "contentType": self.content_type,
            "extra": self.extra.to_value(),
        })
    }

    pub fn json_api_links(&self, api_base: &str, resource: &str) -> BTreeMap<String, String> {
        action_links(
            Kind::Folder,
            api_base,
            &self.provider,
            resource,
            &self.materialized_path,
        )
    }

    pub fn json_api_serialized(&self, api_base: &str, resource: &str) -> Value {
        json!({
            "type": "files",
            "id": format!("{}{}", self.provider, self.path),
            "attributes": self.serialized(),
            "links": self.json_api_links(api_base, resource),
        })
    }
}

/// Tagged file-or-folder metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryMetadata {
    File(FileMetadata),
    Folder(FolderMetadata),
}

impl EntryMetadata {
    pub fn kind(&self) -> &'static str {
        match self {
            EntryMetadata::File(_) => "file",
            EntryMetadata::Folder(_) => "folder",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntryMetadata::File(f) => &f.name,
            EntryMetadata::Folder(f) => &f.name,
        }
    }

    pub fn materialized_path(&self) -> &str {
        match self {
            EntryMetadata::File(f) => &f.materialized_path,
            EntryMetadata::Folder(f) => &f.materialized_path,
        }
    }

    pub fn serialized(&self) -> Value {
        match self {
            EntryMetadata::File(f) => f.serialized(),
            EntryMetadata::Folder(f) => f.serialized(),
        }
    }

    pub fn json_api_serialized(&self, api_base: &str, resource: &str) -> Value {
        match self {
            EntryMetadata::File(f) => f.json_api_serialized(api_base, resource),
            EntryMetadata::Folder(f) => f.json_api_serialized(api_base, resource),
        }
    }
}

/// One historical version of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMetadata {
    pub provider: String,
    /// Name of the versioning scheme (e.g. `"revision"`).
    pub version_identifier: String,
    /// The version token itself.
    pub version: String,
    pub modified: Option<String>,
    pub modified_utc: Option<String>,
    pub extra: Extra,
}

impl RevisionMetadata {
    /// Build a revision from current file metadata, stamping the supplied
    /// version token.
    ///
    /// Used when a backend has no native revision list and the current
    /// file state is the only known "revision": modified timestamps and
    /// the hash set are copied exactly from `metadata`.
    pub fn from_metadata(provider: &str, version: &str, metadata: &FileMetadata) -> Self {
        Self {
            provider: provider.to_string(),
            version_identifier: REVISION_IDENTIFIER.to_string(),
            version: version.to_string(),
            modified: metadata.modified.clone(),
            modified_utc: metadata.modified_utc.clone(),
            extra: metadata.extra.clone(),
        }
    }

    /// Flat wire form: `{version, versionIdentifier, modified,
    /// modified_utc, extra}`.
    pub fn serialized(&self) -> Value {
        json!({
            "version": self.version,
            "versionIdentifier": self.version_identifier,
            "modified": self.modified,
            "modified_utc": self.modified_utc,
            "extra": self.extra.to_value(),
        })
    }

    /// Resource-linked wire form.
    pub fn json_api_serialized(&self) -> Value {
        json!({
            "type": "file_versions",
            "id": self.version,
            "attributes": self.serialized(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    File,
    Folder,
}

/// Derive the canonical action-URL set for one resource.
///
/// A pure function of (kind, api base, provider name, resource handle,
/// materialized path). Every URL shares the single base template
/// `{api_base}/v1/resources/{resource}/providers/{provider}{materialized}`.
fn action_links(
    kind: Kind,
    api_base: &str,
    provider: &str,
    resource: &str,
    materialized_path: &str,
) -> BTreeMap<String, String> {
    let entity = format!(
        "{}/v1/resources/{}/providers/{}{}",
        api_base.trim_end_matches('/'),
        resource,
        provider,
        materialized_path,
    );

    let mut links = BTreeMap::new();
    links.insert("delete".to_string(), entity.clone());
    links.insert("move".to_string(), entity.clone());
    links.insert("upload".to_string(), format!("{}?kind=file", entity));
    match kind {
        Kind::File => {
            links.insert("download".to_string(), entity);
        }
        Kind::Folder => {
            links.insert("new_folder".to_string(), format!("{}?kind=folder", entity));
        }
    }
    links
}

/// Convert an RFC-1123 timestamp to ISO-8601 UTC
/// (`2016-07-10T23:28:31+00:00`), or `None` when it does not parse.
pub fn rfc1123_to_utc(value: &str) -> Option<String> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Strip surrounding quotes from an etag to produce a version token
/// (`"abc"` becomes `abc`).
pub fn version_from_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}
