//! Unified storage access layer for Portage.
//!
//! This crate exposes one abstract, asynchronous provider interface over
//! heterogeneous remote storage backends, together with the canonical
//! metadata model and a provider registry for dynamic resolution.
//!
//! # Design Principles
//! - Provider isolation: backend-specific logic stays inside its adapter
//! - Async operations: every network or disk touch is a suspension point
//! - Streaming transfers: content moves through lazy byte streams
//! - Explicit absence: attributes a backend did not supply stay `None`
//!
//! Deletes and moves are not transactional: a caller that abandons an
//! in-flight operation may leave the backend in an intermediate state.

pub mod archive;
pub mod depot;
pub mod metadata;
pub mod provider;
pub mod registry;
pub mod streams;

pub use metadata::{EntryMetadata, Extra, FileMetadata, FolderMetadata, RevisionMetadata};
pub use provider::{Listing, StorageProvider};
pub use registry::{create_default_registry, ProviderFactory, ProviderRegistry};
pub use streams::{ByteStream, DownloadResponse};
