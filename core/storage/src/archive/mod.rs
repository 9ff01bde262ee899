//! Archive backend: a SWORD-style deposit archive of collections and
//! immutable items.

pub mod client;
mod metadata;
pub mod provider;

pub use client::{ArchiveClient, ArchiveCollection, ArchiveItem, HttpArchiveClient};
pub use provider::{ArchiveProvider, ArchiveSettings};
