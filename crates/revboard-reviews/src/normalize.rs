//! Normalization of raw upstream review records into the canonical model.
//!
//! [`normalize_review`] is a pure, all-or-nothing transform: a record that
//! fails required-field or enum validation produces a [`NormalizeError`]
//! and nothing else. [`normalize_batch`] applies the skip-and-log policy:
//! every valid record survives, every rejected one is logged with its id
//! and reason.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::NormalizeError;
use crate::scale::to_five_scale;
use crate::types::{
    NormalizedReview, NormalizedReviewCategory, RawReview, RawReviewCategory, ReviewStatus,
    ReviewType,
};

/// Derives a stable, non-negative listing id from a listing name.
///
/// FNV-1a over the UTF-8 bytes, masked to the non-negative `i64` range.
/// The aggregation engine relies on the same name always producing the
/// same id across independent loads, so this must never depend on
/// process-local state (which rules out `std::hash::DefaultHasher`, whose
/// output is not guaranteed stable across Rust releases).
#[must_use]
pub fn stable_listing_id(listing_name: &str) -> i64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in listing_name.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    #[allow(clippy::cast_possible_wrap)]
    let id = (hash & (i64::MAX as u64)) as i64;
    id
}

/// Parses an upstream submission timestamp.
///
/// Accepts strict RFC 3339 as well as the upstream's
/// `YYYY-MM-DD HH:MM:SS` form, where the single space stands in for the
/// `T` separator. Naive timestamps are taken as UTC.
fn parse_submitted_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let unified = raw.replacen(' ', "T", 1);
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&unified, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

fn parse_review_type(review_id: i64, raw: &str) -> Result<ReviewType, NormalizeError> {
    match raw {
        "guest-to-host" => Ok(ReviewType::GuestToHost),
        "host-to-guest" => Ok(ReviewType::HostToGuest),
        other => Err(NormalizeError::UnknownReviewType {
            review_id,
            value: other.to_string(),
        }),
    }
}

fn parse_status(review_id: i64, raw: &str) -> Result<ReviewStatus, NormalizeError> {
    match raw {
        "published" => Ok(ReviewStatus::Published),
        "pending" => Ok(ReviewStatus::Pending),
        "draft" => Ok(ReviewStatus::Draft),
        other => Err(NormalizeError::UnknownStatus {
            review_id,
            value: other.to_string(),
        }),
    }
}

fn normalize_category(category: &RawReviewCategory) -> NormalizedReviewCategory {
    NormalizedReviewCategory {
        category: category.category.clone(),
        rating10: category.rating,
        rating5: to_five_scale(category.rating),
    }
}

/// Maps one raw review record to the canonical review model.
///
/// # Errors
///
/// Returns [`NormalizeError`] when the listing name is blank, the
/// submission timestamp is missing or unparseable, or the direction or
/// status carries an unrecognized value.
pub fn normalize_review(review: &RawReview) -> Result<NormalizedReview, NormalizeError> {
    if review.listing_name.trim().is_empty() {
        return Err(NormalizeError::MissingField {
            review_id: review.id,
            field: "listingName",
        });
    }
    if review.submitted_at.trim().is_empty() {
        return Err(NormalizeError::MissingField {
            review_id: review.id,
            field: "submittedAt",
        });
    }

    let submitted_at = parse_submitted_at(&review.submitted_at).ok_or_else(|| {
        NormalizeError::UnparseableTimestamp {
            review_id: review.id,
            value: review.submitted_at.clone(),
        }
    })?;

    let review_type = parse_review_type(review.id, &review.review_type)?;
    let status = parse_status(review.id, &review.status)?;

    let listing_id = review
        .listing_id
        .unwrap_or_else(|| stable_listing_id(&review.listing_name));

    let rating10 = review.rating;
    let rating5 = to_five_scale(review.rating);

    let has_public_comment = review
        .public_review
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty());

    // Fallback sentiment heuristic: with no numeric rating, a public
    // comment counts as positive.
    let is_positive = rating5.map_or(has_public_comment, |r| r >= 4.0);

    Ok(NormalizedReview {
        id: review.id,
        listing_id,
        listing_name: review.listing_name.clone(),
        guest_name: review.guest_name.clone(),
        review_type,
        status,
        submitted_at,
        submitted_date: submitted_at.date_naive().to_string(),
        channel: review
            .channel_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        rating5,
        rating10,
        public_comment: review.public_review.clone(),
        private_comment: review.private_review.clone(),
        manager_response: review.manager_response.clone(),
        categories: review.review_category.iter().map(normalize_category).collect(),
        has_public_comment,
        is_positive,
    })
}

/// Normalizes a batch of raw records, skipping and logging malformed ones.
///
/// A single bad record must not blank the whole feed, so rejects are
/// dropped with a warning instead of failing the batch.
#[must_use]
pub fn normalize_batch(raw: &[RawReview]) -> Vec<NormalizedReview> {
    raw.iter()
        .filter_map(|record| match normalize_review(record) {
            Ok(normalized) => Some(normalized),
            Err(e) => {
                tracing::warn!(review_id = record.id, error = %e, "skipping malformed review record");
                None
            }
        })
        .collect()
}
