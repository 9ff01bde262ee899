//! Depot backend: a path-addressed cloud file store with stable file
//! ids and native version history.

pub mod client;
mod metadata;
pub mod provider;

pub use client::{DepotClient, DepotEntry, DepotVersion, HttpDepotClient};
pub use provider::{DepotProvider, DepotSettings};
