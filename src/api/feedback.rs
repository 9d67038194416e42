use serde::Serialize;

use crate::api::client::{ApiClient, ApiError};
use crate::api::pets::normalize_optional;

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackPayload {
    pub rating: u8,
    pub note: Option<String>,
}

/// Submit a 1–5 star rating with an optional note. The rating is validated
/// client-side before any request goes out.
pub fn submit_feedback(
    client: &ApiClient,
    rating: u8,
    note: &str,
    user_id: &str,
) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::Validation(
            "Please select a rating between 1 and 5 stars.".to_string(),
        ));
    }
    let payload = FeedbackPayload {
        rating,
        note: normalize_optional(note),
    };
    let _: serde_json::Value = client.post("/api/feedback", &payload, Some(user_id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_rating_is_rejected_before_any_request() {
        // Unroutable base address: reaching the network would fail loudly.
        let client = ApiClient::new("http://127.0.0.1:0").unwrap();
        for rating in [0u8, 6, 200] {
            let err = submit_feedback(&client, rating, "", "u1").unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "rating {rating}");
        }
    }

    #[test]
    fn note_is_nullable() {
        let payload = FeedbackPayload {
            rating: 5,
            note: normalize_optional("   "),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["rating"], 5);
        assert!(json["note"].is_null());
    }
}
