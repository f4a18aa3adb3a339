//! Geo Classification Module
//!
//! Maps a caller's network address to a coarse [`RegionClassification`] that
//! decides whether post-retrieval moderation applies.
//!
//! ## Implementations
//! - **`StaticRangeClassifier`**: hardcoded first-octet table, used when no
//!   range database is configured and in tests.
//! - **`RangeDbClassifier`**: sorted IPv4 range table loaded from a
//!   `start,end,region` file at start-up.
//!
//! [`GeoGate`] pairs a classifier with the rule for picking the caller's
//! address out of proxy headers.
//!
//! Both classifiers treat loopback and private addresses as restricted so local
//! development exercises the moderation path.

pub mod classifier;
pub mod gate;
pub mod types;

pub use classifier::{RangeDbClassifier, RegionClassifier, StaticRangeClassifier};
pub use gate::{resolve_client_ip, GeoGate};
pub use types::RegionClassification;

#[cfg(test)]
mod tests;
