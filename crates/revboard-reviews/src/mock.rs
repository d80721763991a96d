//! Embedded mock review source.
//!
//! Serves raw records from a JSON dataset compiled into the binary, using
//! the same [`RawReview`] wire type as the live client so the rest of the
//! pipeline cannot tell the sources apart. The dataset covers several
//! listings and channels, both review directions, unrated records, a
//! record with no explicit listing id, and pending/draft statuses.

use crate::types::RawReview;

const MOCK_REVIEWS_JSON: &str = include_str!("../data/mock_reviews.json");

/// In-memory stand-in for the upstream reviews endpoint.
pub struct MockReviewSource;

impl MockReviewSource {
    /// Lists the embedded raw review records, truncated to `limit` when
    /// given.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if the embedded dataset
    /// fails to parse. With a well-formed dataset this is unreachable.
    pub fn fetch_reviews(limit: Option<usize>) -> Result<Vec<RawReview>, serde_json::Error> {
        let mut reviews: Vec<RawReview> = serde_json::from_str(MOCK_REVIEWS_JSON)?;
        if let Some(limit) = limit {
            reviews.truncate(limit);
        }
        Ok(reviews)
    }
}
