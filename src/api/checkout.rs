use serde::Deserialize;

use crate::api::client::{ApiClient, ApiError};

/// Query marker appended to the success URL so the web dashboard knows a
/// checkout just finished.
pub const CHECKOUT_SUCCESS_MARKER: &str = "checkout=success";

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
}

/// Create a Polar checkout session for the Pro upgrade. Returns the
/// hosted checkout URL the user opens in a browser; the subscription is
/// confirmed asynchronously by the provider's webhook, which is why the
/// caller polls `refresh` afterwards.
pub fn create_pro_checkout(
    client: &ApiClient,
    user_id: &str,
    web_origin: &str,
) -> Result<CheckoutSession, ApiError> {
    let origin = web_origin.trim_end_matches('/');
    let success_url = format!("{origin}/dashboard?{CHECKOUT_SUCCESS_MARKER}");
    let return_url = format!("{origin}/dashboard");
    let path = format!(
        "/api/polar/checkout?successUrl={}&returnUrl={}",
        urlencoding::encode(&success_url),
        urlencoding::encode(&return_url),
    );
    client.post_empty(&path, Some(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_urls_are_percent_encoded() {
        let origin = "https://pawlog.app";
        let success_url = format!("{origin}/dashboard?{CHECKOUT_SUCCESS_MARKER}");
        let encoded = urlencoding::encode(&success_url);
        assert_eq!(
            encoded,
            "https%3A%2F%2Fpawlog.app%2Fdashboard%3Fcheckout%3Dsuccess"
        );
    }
}
