use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use revboard_reviews::{load_reviews, LoadOptions};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ReviewsQuery {
    pub limit: Option<usize>,
    pub mock: Option<bool>,
}

/// Returns the full review feed for the configured account.
///
/// `mock=true` forces the mock source; `mock=false` refuses it. The feed
/// is recomputed per request, so the response is marked uncacheable.
pub(super) async fn get_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReviewsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let options = LoadOptions {
        limit: query.limit,
        use_mock: query.mock,
        ..LoadOptions::default()
    };

    let feed = load_reviews(&state.config, options).await.map_err(|e| {
        tracing::error!(error = %e, "review feed load failed");
        ApiError::new(req_id.0, "reviews_load_failed", e.to_string())
    })?;

    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(feed),
    ))
}
