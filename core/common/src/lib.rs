//! Common types shared across Portage modules.
//!
//! This crate provides the error taxonomy and the path model that every
//! storage backend adapter builds on, ensuring consistent semantics for
//! "unknown vs. empty" and for path/identifier resolution.

pub mod error;
pub mod path;

pub use error::{Error, Result};
pub use path::ResourcePath;
