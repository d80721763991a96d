//! Source resolution and feed assembly.
//!
//! Decides whether review rows come from the live upstream API or the
//! embedded mock source, then runs acquisition → normalization →
//! aggregation and packages the [`ReviewFeed`] envelope.
//!
//! Fallback policy: a live fetch that fails (network, timeout, non-2xx)
//! is logged and replaced by the mock source; it never propagates to the
//! caller. A live fetch that succeeds with zero rows also falls back,
//! unless the caller explicitly disabled mock mode. Only configuration
//! problems (no API key, no usable account id, with mock mode refused)
//! are fatal.

use std::collections::BTreeSet;

use chrono::Utc;

use revboard_core::AppConfig;

use crate::aggregate::{average, build_aggregations, round2};
use crate::client::ReviewsClient;
use crate::error::LoadError;
use crate::mock::MockReviewSource;
use crate::normalize::normalize_batch;
use crate::types::{
    FeedSource, FilterOptions, NormalizedReview, PortfolioTotals, RawReview, ReviewFeed,
    ReviewStatus, ReviewType,
};

/// Deterministic placeholder credentials used when none are configured
/// and mock mode is allowed.
const PLACEHOLDER_API_KEY: &str = "mock-api-key";
const PLACEHOLDER_ACCOUNT_ID: i64 = 0;

/// Per-call overrides for [`load_reviews`].
///
/// `use_mock` is tri-state: `Some(true)` forces the mock source,
/// `Some(false)` refuses it (making configuration gaps and empty live
/// results fatal/visible), `None` defers to configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub limit: Option<usize>,
    pub use_mock: Option<bool>,
    pub api_key: Option<String>,
    pub account_id: Option<i64>,
}

/// The resolved provenance of one acquisition: which source actually
/// supplied the rows.
struct FetchOutcome {
    source: FeedSource,
    rows: Vec<RawReview>,
}

fn fetch_from_mock(limit: Option<usize>) -> Result<FetchOutcome, LoadError> {
    Ok(FetchOutcome {
        source: FeedSource::Mock,
        rows: MockReviewSource::fetch_reviews(limit)?,
    })
}

async fn fetch_live_or_fall_back(
    config: &AppConfig,
    api_key: &str,
    account_id: i64,
    limit: Option<usize>,
    mock_disabled: bool,
) -> Result<FetchOutcome, LoadError> {
    let client = match ReviewsClient::new(
        api_key,
        &config.upstream_base_url,
        config.upstream_timeout_secs,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "upstream client unavailable; falling back to mock reviews");
            return fetch_from_mock(limit);
        }
    };

    match client.fetch_reviews(account_id, limit).await {
        Ok(rows) if rows.is_empty() && !mock_disabled => {
            tracing::info!(account_id, "live fetch returned no reviews; using mock source");
            fetch_from_mock(limit)
        }
        Ok(rows) => Ok(FetchOutcome {
            source: FeedSource::Api,
            rows,
        }),
        Err(e) => {
            tracing::warn!(error = %e, account_id, "live fetch failed; falling back to mock reviews");
            fetch_from_mock(limit)
        }
    }
}

fn collect_filters(reviews: &[NormalizedReview]) -> FilterOptions {
    let mut channels = BTreeSet::new();
    let mut categories = BTreeSet::new();
    let mut statuses: Vec<ReviewStatus> = Vec::new();
    let mut types: Vec<ReviewType> = Vec::new();

    for review in reviews {
        channels.insert(review.channel.clone());
        for category in &review.categories {
            categories.insert(category.category.clone());
        }
        if !statuses.contains(&review.status) {
            statuses.push(review.status);
        }
        if !types.contains(&review.review_type) {
            types.push(review.review_type);
        }
    }

    FilterOptions {
        channels: channels.into_iter().collect(),
        categories: categories.into_iter().collect(),
        statuses,
        types,
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_totals(reviews: &[NormalizedReview]) -> PortfolioTotals {
    let ratings5: Vec<f64> = reviews.iter().filter_map(|r| r.rating5).collect();
    let published = reviews
        .iter()
        .filter(|r| r.status == ReviewStatus::Published)
        .count();

    PortfolioTotals {
        total_reviews: reviews.len(),
        average_rating5: average(&ratings5),
        published_share: if reviews.is_empty() {
            0.0
        } else {
            round2(published as f64 / reviews.len() as f64)
        },
    }
}

/// Loads, normalizes, and aggregates one account's reviews.
///
/// Credentials resolve from `options` first, then `config`. When either
/// the API key or the account id is unresolved and mock mode has not been
/// explicitly disabled, deterministic placeholder credentials are
/// substituted and the mock source is forced.
///
/// # Errors
///
/// - [`LoadError::MissingApiKey`] / [`LoadError::InvalidAccountId`] when
///   credentials are unusable and mock mode was refused.
/// - [`LoadError::MockData`] if the embedded dataset fails to parse.
pub async fn load_reviews(
    config: &AppConfig,
    options: LoadOptions,
) -> Result<ReviewFeed, LoadError> {
    let mut api_key = options.api_key.or_else(|| config.upstream_api_key.clone());
    let mut account_id = options.account_id.or(config.account_id);
    let mock_disabled = options.use_mock == Some(false);
    let mut use_mock = options.use_mock.unwrap_or(config.force_mock);

    if (api_key.is_none() || account_id.is_none()) && !mock_disabled {
        api_key = api_key.or_else(|| Some(PLACEHOLDER_API_KEY.to_string()));
        account_id = account_id.or(Some(PLACEHOLDER_ACCOUNT_ID));
        use_mock = true;
    }

    let api_key = api_key.ok_or(LoadError::MissingApiKey)?;
    let account_id = account_id.ok_or(LoadError::InvalidAccountId)?;

    let outcome = if use_mock {
        fetch_from_mock(options.limit)?
    } else {
        fetch_live_or_fall_back(config, &api_key, account_id, options.limit, mock_disabled).await?
    };

    let reviews = normalize_batch(&outcome.rows);
    let now = Utc::now();
    let listings = build_aggregations(&reviews, now);
    let filters = collect_filters(&reviews);
    let totals = compute_totals(&reviews);

    Ok(ReviewFeed {
        account_id,
        source: outcome.source,
        generated_at: now,
        listings,
        reviews,
        filters,
        totals,
    })
}
