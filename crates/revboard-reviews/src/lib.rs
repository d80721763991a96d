//! Review ingestion and aggregation pipeline.
//!
//! Pulls raw guest/host review records from the property-management
//! upstream API (or the embedded mock source), normalizes them into the
//! canonical review model, and aggregates per-listing statistics into the
//! [`ReviewFeed`] envelope consumed by the dashboard and property pages.
//!
//! Data flows one direction: raw records → [`normalize`] → canonical
//! reviews → [`aggregate`] → listing summaries; [`load_reviews`]
//! orchestrates acquisition (live fetch with mock fallback) and wraps
//! everything into the response payload. Nothing is persisted; the feed
//! is recomputed in full on every load.

mod client;
mod error;
mod mock;
mod resolver;

pub mod aggregate;
pub mod normalize;
pub mod scale;
pub mod types;

pub use client::ReviewsClient;
pub use error::{FetchError, LoadError, NormalizeError};
pub use mock::MockReviewSource;
pub use resolver::{load_reviews, LoadOptions};
pub use types::{
    FeedSource, FilterOptions, ListingSummary, NormalizedReview, PortfolioTotals, RawReview,
    ReviewFeed, ReviewStatus, ReviewType,
};
