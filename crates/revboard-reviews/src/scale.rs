//! Rating scale conversion.

/// Converts a 0–10 rating to the 0–5 scale, rounded to one decimal place.
///
/// `None` passes through. Inputs outside 0–10 flow through the same
/// formula unclamped; callers own input validation.
#[must_use]
pub fn to_five_scale(rating10: Option<f64>) -> Option<f64> {
    rating10.map(|r| (r / 10.0 * 50.0).round() / 10.0)
}
