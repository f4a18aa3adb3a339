//! Content Moderation Module
//!
//! Post-retrieval filter applied to search hits when the caller's region is
//! restricted. The blocklist is an explicit, read-only value handed to the
//! moderator at construction; there is no global list.
//!
//! Matching is plain, case-sensitive substring search:
//! - blocked **domains** are looked for in a hit's URL and title,
//! - blocked **keywords** are looked for in a hit's title and content.

pub mod blocklist;
pub mod moderator;

pub use blocklist::Blocklist;
pub use moderator::{ContentModerator, ModerationOutcome, WITHHELD_NOTICE};

#[cfg(test)]
mod tests;
