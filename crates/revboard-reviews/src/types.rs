//! Wire and domain types for the review pipeline.
//!
//! [`RawReview`] models the untrusted record shape returned by the
//! upstream reviews endpoint (and mirrored by the mock source); everything
//! downstream of [`crate::normalize`] uses the trusted [`NormalizedReview`]
//! model. All wire shapes are camelCase to match the upstream API and the
//! dashboard consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Upstream wire shapes (untrusted)
// ---------------------------------------------------------------------------

/// Top-level envelope of the upstream reviews endpoint:
/// `{ "status": "success", "result": [ ... ] }`.
///
/// `status` is informational; success is keyed off the HTTP status and the
/// `result` array. A missing `result` deserializes as empty.
#[derive(Debug, Deserialize)]
pub struct ApiReviewsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Vec<RawReview>,
}

/// A category sub-rating as supplied by the upstream source, on the 0–10
/// scale. `rating` is optional on the wire even though most records carry it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawReviewCategory {
    pub category: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// An unvalidated review record as supplied by the upstream source.
///
/// `type`, `status`, and `submittedAt` are kept as strings here and
/// validated during normalization; every optional field defaults so a
/// sparse record still deserializes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    pub id: i64,
    #[serde(rename = "type")]
    pub review_type: String,
    pub status: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub public_review: Option<String>,
    #[serde(default)]
    pub private_review: Option<String>,
    #[serde(default)]
    pub review_category: Vec<RawReviewCategory>,
    pub submitted_at: String,
    pub guest_name: String,
    pub listing_name: String,
    #[serde(default)]
    pub listing_id: Option<i64>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub manager_response: Option<String>,
}

// ---------------------------------------------------------------------------
// Canonical review model (trusted)
// ---------------------------------------------------------------------------

/// Review direction: guest-authored about the stay, or host-authored about
/// the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewType {
    #[serde(rename = "guestToHost")]
    GuestToHost,
    #[serde(rename = "hostToGuest")]
    HostToGuest,
}

/// Moderation status of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Published,
    Pending,
    Draft,
}

/// A category score on both scales: the 0–10 value as supplied and the
/// derived 0–5 value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReviewCategory {
    pub category: String,
    pub rating10: Option<f64>,
    pub rating5: Option<f64>,
}

/// A validated, normalized review.
///
/// `listing_id` is always present: when the raw record omits it, a stable
/// hash of the listing name fills it in, so the same listing name groups
/// consistently across independent loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReview {
    pub id: i64,
    pub listing_id: i64,
    pub listing_name: String,
    pub guest_name: String,
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub status: ReviewStatus,
    pub submitted_at: DateTime<Utc>,
    /// UTC calendar date of `submitted_at`, `YYYY-MM-DD`.
    pub submitted_date: String,
    pub channel: String,
    pub rating5: Option<f64>,
    pub rating10: Option<f64>,
    pub public_comment: Option<String>,
    pub private_comment: Option<String>,
    pub manager_response: Option<String>,
    pub categories: Vec<NormalizedReviewCategory>,
    pub has_public_comment: bool,
    pub is_positive: bool,
}

// ---------------------------------------------------------------------------
// Listing summaries
// ---------------------------------------------------------------------------

/// Average rating per category label, on both scales.
///
/// Unlike the listing-level averages, these default to `0.0` (not null)
/// when a category has no rated samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCategoryAverage {
    pub category: String,
    pub rating10: f64,
    pub rating5: f64,
}

/// Review count and 0–5 average for one observed channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingChannelBreakdown {
    pub channel: String,
    pub count: usize,
    pub average_rating5: Option<f64>,
}

/// Review count for one direction. Both directions are always present,
/// zero-initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingTypeBreakdown {
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub count: usize,
}

/// Review count for one status. All three statuses are always present,
/// zero-initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingStatusBreakdown {
    pub status: ReviewStatus,
    pub count: usize,
}

/// Average 0–5 rating in the two most recent 30-day windows. Either side
/// is null when its window holds no rated reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingTrend {
    pub last30_days: Option<f64>,
    pub previous30_days: Option<f64>,
}

/// Aggregated statistics for one listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummary {
    pub listing_id: i64,
    pub listing_name: String,
    pub total_reviews: usize,
    pub published_reviews: usize,
    pub average_rating5: Option<f64>,
    pub average_rating10: Option<f64>,
    pub rating_trend: RatingTrend,
    pub category_averages: Vec<ListingCategoryAverage>,
    pub channel_breakdown: Vec<ListingChannelBreakdown>,
    pub type_breakdown: Vec<ListingTypeBreakdown>,
    pub status_breakdown: Vec<ListingStatusBreakdown>,
    pub latest_review_date: Option<String>,
    pub earliest_review_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// Where the raw rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Api,
    Mock,
}

/// Distinct filter values observed across the feed. Channels and
/// categories are sorted lexicographically; statuses and types keep
/// first-seen order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub channels: Vec<String>,
    pub categories: Vec<String>,
    pub statuses: Vec<ReviewStatus>,
    pub types: Vec<ReviewType>,
}

/// Portfolio-wide totals across every listing in the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_reviews: usize,
    pub average_rating5: Option<f64>,
    /// Fraction of reviews with status `published`, rounded to two
    /// decimals; `0.0` when the feed is empty.
    pub published_share: f64,
}

/// The full response payload: one load's worth of normalized reviews,
/// listing summaries, filter vocabularies, and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFeed {
    pub account_id: i64,
    pub source: FeedSource,
    pub generated_at: DateTime<Utc>,
    pub listings: Vec<ListingSummary>,
    pub reviews: Vec<NormalizedReview>,
    pub filters: FilterOptions,
    pub totals: PortfolioTotals,
}
