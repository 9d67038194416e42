use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::client::{ApiClient, ApiError, TokenResponse};
use crate::api::pets::normalize_optional;
use crate::models::{Log, ShareToken, SharedLogView};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPayload {
    pub pet_id: String,
    pub title: String,
    pub content: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl LogPayload {
    pub fn from_form(pet_id: &str, title: &str, content: &str, logged_at: DateTime<Utc>) -> Self {
        Self {
            pet_id: pet_id.to_string(),
            title: title.trim().to_string(),
            content: normalize_optional(content),
            logged_at,
        }
    }
}

pub fn get_logs(client: &ApiClient, pet_id: &str, user_id: &str) -> Result<Vec<Log>, ApiError> {
    client.get(&format!("/api/logs?petId={pet_id}"), Some(user_id))
}

pub fn get_log(client: &ApiClient, id: &str) -> Result<Log, ApiError> {
    client.get(&format!("/api/logs/{id}"), None)
}

pub fn create_log(client: &ApiClient, payload: &LogPayload, user_id: &str) -> Result<Log, ApiError> {
    client.post("/api/logs", payload, Some(user_id))
}

pub fn update_log(
    client: &ApiClient,
    id: &str,
    payload: &LogPayload,
    user_id: &str,
) -> Result<Log, ApiError> {
    client.put(&format!("/api/logs/{id}"), payload, Some(user_id))
}

pub fn delete_log(client: &ApiClient, id: &str, user_id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/api/logs/{id}"), Some(user_id))
}

/// Mint a read-only share token for one log. The token always reflects the
/// log's current content; there is no versioning.
pub fn share_log(client: &ApiClient, id: &str, user_id: &str) -> Result<ShareToken, ApiError> {
    let response: TokenResponse =
        client.post_empty(&format!("/api/logs/{id}/share"), Some(user_id))?;
    Ok(response.token)
}

/// Resolve a log share token without authentication.
pub fn get_shared_log(client: &ApiClient, token: &ShareToken) -> Result<SharedLogView, ApiError> {
    client.get(&format!("/api/share/{token}"), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_content_becomes_null() {
        let logged_at = "2026-08-05T10:00:00Z".parse().unwrap();
        let payload = LogPayload::from_form("p1", " Vet visit ", "  ", logged_at);
        assert_eq!(payload.title, "Vet visit");
        assert!(payload.content.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["content"].is_null());
        assert_eq!(json["loggedAt"], "2026-08-05T10:00:00Z");
    }
}
