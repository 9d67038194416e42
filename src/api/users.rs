use serde::Serialize;

use crate::api::client::{ApiClient, ApiError};
use crate::models::{GoogleProfile, Identity};

const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Upsert payload for `/api/createUser`, built from an OAuth profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub picture_url: Option<String>,
}

impl From<GoogleProfile> for CreateUserRequest {
    fn from(profile: GoogleProfile) -> Self {
        Self {
            google_id: profile.sub,
            email: profile.email,
            name: profile.name,
            picture_url: profile.picture,
        }
    }
}

/// Fetch the Google profile for an externally obtained access token.
pub fn fetch_google_profile(
    client: &ApiClient,
    access_token: &str,
) -> Result<GoogleProfile, ApiError> {
    client.get_external(USERINFO_URL, Some(access_token))
}

/// Exchange an OAuth profile for a backend identity (create-if-absent).
pub fn create_user(client: &ApiClient, request: &CreateUserRequest) -> Result<Identity, ApiError> {
    client.post("/api/createUser", request, None)
}

pub fn get_user(client: &ApiClient, id: &str) -> Result<Identity, ApiError> {
    // Identities may only read their own record; the caller is the subject
    client.get(&format!("/api/users/{id}"), Some(id))
}

/// Permanently delete the account and everything under it.
pub fn delete_user(client: &ApiClient, id: &str, user_id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/api/users/{id}"), Some(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_request_uses_backend_field_names() {
        let profile = GoogleProfile {
            sub: "google-123".to_string(),
            email: "rex@example.com".to_string(),
            name: "Rex Owner".to_string(),
            picture: Some("https://example.com/p.png".to_string()),
        };
        let request = CreateUserRequest::from(profile);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["googleId"], "google-123");
        assert_eq!(json["pictureUrl"], "https://example.com/p.png");
        assert!(json.get("sub").is_none());
    }
}
