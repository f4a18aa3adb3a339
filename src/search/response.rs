use super::types::{SearchResponse, SearchResult};
use crate::geo::RegionClassification;
use crate::moderation::{ContentModerator, WITHHELD_NOTICE};

/// Final step of a search: moderate the hits for restricted callers and
/// attach the withheld notice when anything was removed.
///
/// `total` keeps the backend's count; only the returned page shrinks.
pub fn shape_response(
    mut result: SearchResult,
    region: RegionClassification,
    moderator: &ContentModerator,
) -> SearchResponse {
    if !region.is_restricted() {
        return SearchResponse {
            result,
            filtered: false,
            message: None,
        };
    }

    let outcome = moderator.moderate(std::mem::take(&mut result.hits));
    let filtered = outcome.withheld_any();
    if filtered {
        tracing::info!("Withheld {} hits for restricted caller", outcome.removed);
    }
    result.hits = outcome.kept;

    SearchResponse {
        result,
        filtered,
        message: filtered.then(|| WITHHELD_NOTICE.to_string()),
    }
}
