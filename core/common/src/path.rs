//! Path model for resources within one provider's namespace.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A validated path identifying one resource inside a backend namespace.
///
/// A path carries an ordered segment list, a file/folder flag, an optional
/// backend-native identifier and an optional revision marker. Once an
/// identifier has been resolved it is authoritative over the path string
/// for subsequent operations on the same logical resource.
///
/// Values are immutable: [`ResourcePath::with_identifier`] and
/// [`ResourcePath::with_revision`] return annotated copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePath {
    segments: Vec<String>,
    is_dir: bool,
    identifier: Option<String>,
    revision: Option<String>,
}

impl ResourcePath {
    /// The root folder path (`/`).
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            is_dir: true,
            identifier: None,
            revision: None,
        }
    }

    /// Parse an untrusted raw path.
    ///
    /// Only absolute paths are accepted. A trailing separator marks a
    /// folder. Traversal segments (`.`, `..`) and empty interior segments
    /// are rejected so a path can never escape the backend namespace.
    ///
    /// # Errors
    /// - `Error::InvalidPath` for relative paths, traversal or bad segments
    pub fn parse(raw: &str) -> Result<Self> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(Error::InvalidPath(format!(
                "path must be absolute: {:?}",
                raw
            )));
        };

        if rest.is_empty() {
            return Ok(Self::root());
        }

        let is_dir = rest.ends_with('/');
        let trimmed = rest.trim_end_matches('/');
        if trimmed.is_empty() || rest.len() - trimmed.len() > 1 {
            return Err(Error::InvalidPath(format!(
                "path contains empty segments: {:?}",
                raw
            )));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            Self::check_segment(segment)?;
            segments.push(segment.to_string());
        }

        Ok(Self {
            segments,
            is_dir,
            identifier: None,
            revision: None,
        })
    }

    fn check_segment(segment: &str) -> Result<()> {
        if segment.is_empty() {
            return Err(Error::InvalidPath(
                "path contains empty segments".to_string(),
            ));
        }
        if segment == "." || segment == ".." {
            return Err(Error::InvalidPath(format!(
                "path traversal segment not allowed: {:?}",
                segment
            )));
        }
        if segment.contains('\\') {
            return Err(Error::InvalidPath(format!(
                "segment contains separator: {:?}",
                segment
            )));
        }
        Ok(())
    }

    /// True iff the segment list is empty.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this path denotes a folder.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Whether this path denotes a file.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }

    /// The trailing segment, absent for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// The path segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The parent folder path, absent for the root.
    ///
    /// The parent carries no identifier or revision; those belong to the
    /// resource they were resolved for.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self {
            segments,
            is_dir: true,
            identifier: None,
            revision: None,
        })
    }

    /// Derive a child path without a network round-trip.
    ///
    /// # Errors
    /// - `Error::InvalidPath` when `self` is not a folder or the segment
    ///   is not a valid single segment
    pub fn child(&self, name: &str, folder: bool) -> Result<Self> {
        if !self.is_dir {
            return Err(Error::InvalidPath(format!(
                "cannot derive a child of file path {:?}",
                self.materialized()
            )));
        }
        let name = name.trim_matches('/');
        Self::check_segment(name)?;
        if name.contains('/') {
            return Err(Error::InvalidPath(format!(
                "child segment contains separator: {:?}",
                name
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self {
            segments,
            is_dir: folder,
            identifier: None,
            revision: None,
        })
    }

    /// The human-facing path string with the trailing-separator
    /// convention applied: folders end with `/`, files do not.
    pub fn materialized(&self) -> String {
        if self.is_root() {
            return "/".to_string();
        }
        let mut out = format!("/{}", self.segments.join("/"));
        if self.is_dir {
            out.push('/');
        }
        out
    }

    /// The backend-native identifier, if resolved.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Attach a resolved backend-native identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// The revision marker, if any.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// Annotate the path with a revision marker (`None` clears it).
    pub fn with_revision(mut self, revision: Option<String>) -> Self {
        self.revision = revision;
        self
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.materialized())
    }
}
