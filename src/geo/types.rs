use serde::{Deserialize, Serialize};

/// Per-request caller classification. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionClassification {
    /// Results must pass through the content moderator.
    Restricted,
    Other,
}

impl RegionClassification {
    pub fn is_restricted(self) -> bool {
        matches!(self, RegionClassification::Restricted)
    }
}
