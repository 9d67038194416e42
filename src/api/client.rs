use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::ShareToken;

/// Header carrying the caller's identity on authenticated endpoints.
pub const USER_ID_HEADER: &str = "X-User-Id";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-2xx response, already reduced to the single message the UI shows.
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Backend { status: 404, .. })
    }
}

/// Error payload shape used by the backend for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Reduce a failed response body to one message: `error`, then `message`,
/// then a generic fallback when the body is not decodable.
pub(crate) fn decode_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| format!("Request failed: {status}"))
}

/// Mint-endpoint response shape shared by all three token kinds.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: ShareToken,
}

/// Uniform request helper all domain accessors go through: fixed base
/// address, JSON bodies, identity propagation via [`USER_ID_HEADER`],
/// uniform error decoding. 204 decodes to the unit value.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn builder(&self, method: Method, path: &str, user_id: Option<&str>) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(id) = user_id {
            builder = builder.header(USER_ID_HEADER, id);
        }
        builder
    }

    fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: decode_error_message(status.as_u16(), &body),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(serde_json::from_str("null")?);
        }
        Ok(response.json()?)
    }

    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        user_id: Option<&str>,
    ) -> Result<T, ApiError> {
        self.execute(self.builder(Method::GET, path, user_id))
    }

    /// GET with response caching disabled, for views that must always
    /// reflect the latest server truth.
    pub(crate) fn get_no_store<T: DeserializeOwned>(
        &self,
        path: &str,
        user_id: Option<&str>,
    ) -> Result<T, ApiError> {
        self.execute(
            self.builder(Method::GET, path, user_id)
                .header(reqwest::header::CACHE_CONTROL, "no-store"),
        )
    }

    pub(crate) fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        user_id: Option<&str>,
    ) -> Result<T, ApiError> {
        self.execute(self.builder(Method::POST, path, user_id).json(body))
    }

    /// POST without a body (complete/share/checkout endpoints).
    pub(crate) fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        user_id: Option<&str>,
    ) -> Result<T, ApiError> {
        self.execute(self.builder(Method::POST, path, user_id))
    }

    pub(crate) fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        user_id: Option<&str>,
    ) -> Result<T, ApiError> {
        self.execute(self.builder(Method::PUT, path, user_id).json(body))
    }

    pub(crate) fn delete(&self, path: &str, user_id: Option<&str>) -> Result<(), ApiError> {
        // Body shape is irrelevant for deletes; 204 decodes to null.
        let _: serde_json::Value = self.execute(self.builder(Method::DELETE, path, user_id))?;
        Ok(())
    }

    /// GET against an absolute URL outside the backend (the OAuth
    /// userinfo endpoint), with an optional bearer token.
    pub(crate) fn get_external<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut builder = self.http.get(url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        self.execute(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_takes_precedence_over_message() {
        let body = r#"{"error": "Pet not found", "message": "ignored"}"#;
        assert_eq!(decode_error_message(404, body), "Pet not found");
    }

    #[test]
    fn message_field_is_the_fallback() {
        let body = r#"{"message": "Routine limit reached"}"#;
        assert_eq!(decode_error_message(403, body), "Routine limit reached");
    }

    #[test]
    fn undecodable_body_falls_back_to_status() {
        assert_eq!(decode_error_message(500, "<html>oops</html>"), "Request failed: 500");
        assert_eq!(decode_error_message(502, ""), "Request failed: 502");
        // A decodable body with neither field behaves the same.
        assert_eq!(decode_error_message(400, "{}"), "Request failed: 400");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("https://api.pawlog.app/").unwrap();
        assert_eq!(client.base_url(), "https://api.pawlog.app");
    }
}
