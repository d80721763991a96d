//! Per-listing aggregation of normalized reviews.
//!
//! Numeric semantics: listing-level averages are `None` when no review in
//! the set carries a rating (never averaged over unrated reviews, never
//! substituted with 0), while per-category averages default to `0.0` when
//! a category has no rated samples. Trend windows are measured against a
//! caller-supplied "now" so tests can pin the clock.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::types::{
    ListingCategoryAverage, ListingChannelBreakdown, ListingStatusBreakdown, ListingSummary,
    ListingTypeBreakdown, NormalizedReview, RatingTrend, ReviewStatus, ReviewType,
};

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean rounded to one decimal, or `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    Some(round1(sum / values.len() as f64))
}

#[derive(Default)]
struct CategoryAccumulator {
    total10: f64,
    count10: usize,
    total5: f64,
    count5: usize,
}

#[allow(clippy::cast_precision_loss)]
fn compute_category_averages(reviews: &[&NormalizedReview]) -> Vec<ListingCategoryAverage> {
    let mut accumulators: BTreeMap<String, CategoryAccumulator> = BTreeMap::new();

    for review in reviews {
        for category in &review.categories {
            let entry = accumulators.entry(category.category.clone()).or_default();
            if let Some(r) = category.rating10 {
                entry.total10 += r;
                entry.count10 += 1;
            }
            if let Some(r) = category.rating5 {
                entry.total5 += r;
                entry.count5 += 1;
            }
        }
    }

    accumulators
        .into_iter()
        .map(|(category, acc)| ListingCategoryAverage {
            category,
            rating10: if acc.count10 == 0 {
                0.0
            } else {
                round1(acc.total10 / acc.count10 as f64)
            },
            rating5: if acc.count5 == 0 {
                0.0
            } else {
                round1(acc.total5 / acc.count5 as f64)
            },
        })
        .collect()
}

fn compute_channel_breakdown(reviews: &[&NormalizedReview]) -> Vec<ListingChannelBreakdown> {
    let mut channels: BTreeMap<String, (usize, Vec<f64>)> = BTreeMap::new();

    for review in reviews {
        let entry = channels.entry(review.channel.clone()).or_default();
        entry.0 += 1;
        if let Some(r) = review.rating5 {
            entry.1.push(r);
        }
    }

    channels
        .into_iter()
        .map(|(channel, (count, ratings))| ListingChannelBreakdown {
            channel,
            count,
            average_rating5: average(&ratings),
        })
        .collect()
}

fn compute_type_breakdown(reviews: &[&NormalizedReview]) -> Vec<ListingTypeBreakdown> {
    // Fixed universe: both directions always appear, zero counts included.
    [ReviewType::GuestToHost, ReviewType::HostToGuest]
        .into_iter()
        .map(|review_type| ListingTypeBreakdown {
            review_type,
            count: reviews.iter().filter(|r| r.review_type == review_type).count(),
        })
        .collect()
}

fn compute_status_breakdown(reviews: &[&NormalizedReview]) -> Vec<ListingStatusBreakdown> {
    [
        ReviewStatus::Published,
        ReviewStatus::Pending,
        ReviewStatus::Draft,
    ]
    .into_iter()
    .map(|status| ListingStatusBreakdown {
        status,
        count: reviews.iter().filter(|r| r.status == status).count(),
    })
    .collect()
}

fn compute_rating_trend(reviews: &[&NormalizedReview], now: DateTime<Utc>) -> RatingTrend {
    let last_cutoff = now - Duration::days(30);
    let previous_cutoff = now - Duration::days(60);

    let mut last30 = Vec::new();
    let mut previous30 = Vec::new();

    for review in reviews {
        let Some(rating) = review.rating5 else {
            continue;
        };
        if review.submitted_at >= last_cutoff {
            last30.push(rating);
        } else if review.submitted_at >= previous_cutoff {
            previous30.push(rating);
        }
    }

    RatingTrend {
        last30_days: average(&last30),
        previous30_days: average(&previous30),
    }
}

/// Computes the summary for one listing's reviews.
///
/// `now` anchors the 30-day trend windows; production callers pass
/// `Utc::now()`, tests pass a fixed instant.
#[must_use]
pub fn build_listing_summary(
    listing_id: i64,
    listing_name: &str,
    reviews: &[&NormalizedReview],
    now: DateTime<Utc>,
) -> ListingSummary {
    let published_reviews = reviews
        .iter()
        .filter(|r| r.status == ReviewStatus::Published)
        .count();

    let ratings5: Vec<f64> = reviews.iter().filter_map(|r| r.rating5).collect();
    let ratings10: Vec<f64> = reviews.iter().filter_map(|r| r.rating10).collect();

    let latest = reviews.iter().max_by_key(|r| r.submitted_at);
    let earliest = reviews.iter().min_by_key(|r| r.submitted_at);

    ListingSummary {
        listing_id,
        listing_name: listing_name.to_string(),
        total_reviews: reviews.len(),
        published_reviews,
        average_rating5: average(&ratings5),
        average_rating10: average(&ratings10),
        rating_trend: compute_rating_trend(reviews, now),
        category_averages: compute_category_averages(reviews),
        channel_breakdown: compute_channel_breakdown(reviews),
        type_breakdown: compute_type_breakdown(reviews),
        status_breakdown: compute_status_breakdown(reviews),
        latest_review_date: latest.map(|r| r.submitted_date.clone()),
        earliest_review_date: earliest.map(|r| r.submitted_date.clone()),
    }
}

/// Groups reviews by listing id and computes one summary per listing.
///
/// The first-seen review's listing name becomes the display name.
/// Summaries come out in ascending listing-id order; callers re-sort as
/// needed.
#[must_use]
pub fn build_aggregations(reviews: &[NormalizedReview], now: DateTime<Utc>) -> Vec<ListingSummary> {
    let mut groups: BTreeMap<i64, Vec<&NormalizedReview>> = BTreeMap::new();
    for review in reviews {
        groups.entry(review.listing_id).or_default().push(review);
    }

    groups
        .into_iter()
        .map(|(listing_id, group)| {
            let listing_name = group
                .first()
                .map_or_else(|| format!("Listing {listing_id}"), |r| r.listing_name.clone());
            build_listing_summary(listing_id, &listing_name, &group, now)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::NormalizedReviewCategory;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap()
    }

    fn review(
        id: i64,
        listing_id: i64,
        rating10: Option<f64>,
        status: ReviewStatus,
        submitted_at: &str,
    ) -> NormalizedReview {
        let submitted_at = DateTime::parse_from_rfc3339(submitted_at)
            .unwrap()
            .with_timezone(&Utc);
        let rating5 = crate::scale::to_five_scale(rating10);
        NormalizedReview {
            id,
            listing_id,
            listing_name: "Canal House Studio".to_string(),
            guest_name: "Guest".to_string(),
            review_type: ReviewType::GuestToHost,
            status,
            submitted_at,
            submitted_date: submitted_at.date_naive().to_string(),
            channel: "Airbnb".to_string(),
            rating5,
            rating10,
            public_comment: None,
            private_comment: None,
            manager_response: None,
            categories: Vec::new(),
            has_public_comment: false,
            is_positive: rating5.is_some_and(|r| r >= 4.0),
        }
    }

    #[test]
    fn round1_rounds_to_one_decimal() {
        assert_eq!(round1(4.25), 4.3);
        assert_eq!(round1(4.24), 4.2);
    }

    #[test]
    fn average_of_empty_is_none() {
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn average_rounds_mean() {
        assert_eq!(average(&[4.0, 4.5]), Some(4.3));
        assert_eq!(average(&[5.0]), Some(5.0));
    }

    #[test]
    fn summary_averages_are_none_without_rated_reviews() {
        let reviews = vec![
            review(1, 5501, None, ReviewStatus::Published, "2024-09-01T10:00:00Z"),
            review(2, 5501, None, ReviewStatus::Pending, "2024-09-02T10:00:00Z"),
        ];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        assert_eq!(summary.total_reviews, 2);
        assert_eq!(summary.published_reviews, 1);
        assert_eq!(summary.average_rating5, None);
        assert_eq!(summary.average_rating10, None);
    }

    #[test]
    fn summary_averages_cover_rated_reviews_only() {
        let reviews = vec![
            review(1, 5501, Some(8.0), ReviewStatus::Published, "2024-09-01T10:00:00Z"),
            review(2, 5501, Some(9.0), ReviewStatus::Published, "2024-09-02T10:00:00Z"),
            review(3, 5501, None, ReviewStatus::Published, "2024-09-03T10:00:00Z"),
        ];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        // Mean of 4.0 and 4.5; the unrated review does not contribute.
        assert_eq!(summary.average_rating5, Some(4.3));
        assert_eq!(summary.average_rating10, Some(8.5));
    }

    #[test]
    fn category_averages_default_to_zero_not_null() {
        let mut unrated = review(1, 5501, None, ReviewStatus::Published, "2024-09-01T10:00:00Z");
        unrated.categories = vec![NormalizedReviewCategory {
            category: "cleanliness".to_string(),
            rating10: None,
            rating5: None,
        }];
        let reviews = vec![unrated];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        assert_eq!(summary.category_averages.len(), 1);
        assert_eq!(summary.category_averages[0].rating10, 0.0);
        assert_eq!(summary.category_averages[0].rating5, 0.0);
    }

    #[test]
    fn category_averages_skip_reviews_missing_the_category() {
        let mut first = review(1, 5501, Some(8.0), ReviewStatus::Published, "2024-09-01T10:00:00Z");
        first.categories = vec![NormalizedReviewCategory {
            category: "cleanliness".to_string(),
            rating10: Some(10.0),
            rating5: Some(5.0),
        }];
        let second = review(2, 5501, Some(8.0), ReviewStatus::Published, "2024-09-02T10:00:00Z");
        let reviews = vec![first, second];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        // Only the review that carries the category contributes.
        assert_eq!(summary.category_averages[0].rating10, 10.0);
    }

    #[test]
    fn type_and_status_breakdowns_enumerate_fixed_universe() {
        let reviews = vec![review(
            1,
            5501,
            Some(8.0),
            ReviewStatus::Published,
            "2024-09-01T10:00:00Z",
        )];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());

        assert_eq!(summary.type_breakdown.len(), 2);
        assert_eq!(summary.type_breakdown[0].review_type, ReviewType::GuestToHost);
        assert_eq!(summary.type_breakdown[0].count, 1);
        assert_eq!(summary.type_breakdown[1].review_type, ReviewType::HostToGuest);
        assert_eq!(summary.type_breakdown[1].count, 0);

        assert_eq!(summary.status_breakdown.len(), 3);
        let draft = summary
            .status_breakdown
            .iter()
            .find(|b| b.status == ReviewStatus::Draft)
            .unwrap();
        assert_eq!(draft.count, 0);
    }

    #[test]
    fn channel_breakdown_lists_observed_channels_only() {
        let mut other = review(2, 5501, None, ReviewStatus::Published, "2024-09-02T10:00:00Z");
        other.channel = "Direct".to_string();
        let reviews = vec![
            review(1, 5501, Some(9.0), ReviewStatus::Published, "2024-09-01T10:00:00Z"),
            other,
        ];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        assert_eq!(summary.channel_breakdown.len(), 2);
        let airbnb = &summary.channel_breakdown[0];
        assert_eq!(airbnb.channel, "Airbnb");
        assert_eq!(airbnb.count, 1);
        assert_eq!(airbnb.average_rating5, Some(4.5));
        let direct = &summary.channel_breakdown[1];
        assert_eq!(direct.channel, "Direct");
        assert_eq!(direct.average_rating5, None);
    }

    #[test]
    fn trend_places_old_reviews_in_previous_window_only() {
        // 45 days before the fixed clock: outside last-30, inside previous-30.
        let reviews = vec![review(
            1,
            5501,
            Some(9.0),
            ReviewStatus::Published,
            "2024-08-17T12:00:00Z",
        )];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        assert_eq!(summary.rating_trend.last30_days, None);
        assert_eq!(summary.rating_trend.previous30_days, Some(4.5));
    }

    #[test]
    fn trend_splits_windows_at_thirty_days() {
        let reviews = vec![
            review(1, 5501, Some(10.0), ReviewStatus::Published, "2024-09-25T12:00:00Z"),
            review(2, 5501, Some(8.0), ReviewStatus::Published, "2024-08-20T12:00:00Z"),
            // 70 days back: outside both windows.
            review(3, 5501, Some(2.0), ReviewStatus::Published, "2024-07-23T12:00:00Z"),
        ];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        assert_eq!(summary.rating_trend.last30_days, Some(5.0));
        assert_eq!(summary.rating_trend.previous30_days, Some(4.0));
    }

    #[test]
    fn latest_and_earliest_dates_follow_submission_instants() {
        let reviews = vec![
            review(1, 5501, None, ReviewStatus::Published, "2024-09-05T10:00:00Z"),
            review(2, 5501, None, ReviewStatus::Published, "2024-09-20T10:00:00Z"),
            review(3, 5501, None, ReviewStatus::Published, "2024-08-30T10:00:00Z"),
        ];
        let refs: Vec<&NormalizedReview> = reviews.iter().collect();
        let summary = build_listing_summary(5501, "Canal House Studio", &refs, fixed_now());
        assert_eq!(summary.latest_review_date.as_deref(), Some("2024-09-20"));
        assert_eq!(summary.earliest_review_date.as_deref(), Some("2024-08-30"));
    }

    #[test]
    fn empty_group_yields_null_dates() {
        let summary = build_listing_summary(5501, "Canal House Studio", &[], fixed_now());
        assert_eq!(summary.total_reviews, 0);
        assert_eq!(summary.latest_review_date, None);
        assert_eq!(summary.earliest_review_date, None);
    }

    #[test]
    fn build_aggregations_groups_by_listing_id() {
        let reviews = vec![
            review(1, 5501, Some(8.0), ReviewStatus::Published, "2024-09-01T10:00:00Z"),
            review(2, 7702, Some(6.0), ReviewStatus::Published, "2024-09-02T10:00:00Z"),
            review(3, 5501, Some(10.0), ReviewStatus::Published, "2024-09-03T10:00:00Z"),
        ];
        let summaries = build_aggregations(&reviews, fixed_now());
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].listing_id, 5501);
        assert_eq!(summaries[0].total_reviews, 2);
        assert_eq!(summaries[1].listing_id, 7702);
        assert_eq!(summaries[1].total_reviews, 1);
    }
}
