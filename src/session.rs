use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::api::users::{self, CreateUserRequest};
use crate::api::{ApiClient, ApiError};
use crate::models::{GoogleProfile, Identity};
use crate::utils::{self, Profile};

/// File under the data directory holding the one persisted identity record.
const IDENTITY_FILE: &str = "identity.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("Failed to store identity: {0}")]
    Storage(String),
}

/// The current authenticated identity, if any. Passed explicitly to the
/// code that needs it; the identity file is read and written only here.
pub struct Session {
    storage_path: PathBuf,
    identity: Option<Identity>,
}

impl Session {
    /// Load the persisted identity from disk. Absent or malformed data
    /// yields an anonymous session; malformed data is discarded so the
    /// next start is clean.
    pub fn restore(storage_path: PathBuf) -> Self {
        let identity = match fs::read_to_string(&storage_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(identity) => Some(identity),
                Err(_) => {
                    let _ = fs::remove_file(&storage_path);
                    None
                }
            },
            Err(_) => None,
        };
        Self {
            storage_path,
            identity,
        }
    }

    /// Restore from the profile's default identity file location.
    pub fn restore_default(profile: Profile) -> Self {
        let path = Self::default_storage_path(profile);
        Self::restore(path)
    }

    /// Default identity file path for a profile, falling back to a
    /// relative path if the platform data directory cannot be determined.
    pub fn default_storage_path(profile: Profile) -> PathBuf {
        utils::get_data_dir(profile)
            .map(|dir| dir.join(IDENTITY_FILE))
            .unwrap_or_else(|| PathBuf::from(IDENTITY_FILE))
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Strict expiry check against the current wall clock, evaluated fresh
    /// on every call.
    pub fn is_pro_member(&self) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|i| i.is_pro_member(Utc::now().timestamp_millis()))
    }

    /// Exchange a user-supplied Google access token for a backend
    /// identity: fetch the userinfo profile, upsert via the backend,
    /// persist the result. On failure the session stays anonymous.
    pub fn sign_in_with_access_token(
        &mut self,
        client: &ApiClient,
        access_token: &str,
    ) -> Result<Identity, SessionError> {
        let profile = users::fetch_google_profile(client, access_token)?;
        self.sign_in_with_profile(client, profile)
    }

    /// Exchange an already-obtained OAuth profile for a backend identity
    /// (create-if-absent) and persist it.
    pub fn sign_in_with_profile(
        &mut self,
        client: &ApiClient,
        profile: GoogleProfile,
    ) -> Result<Identity, SessionError> {
        let identity = users::create_user(client, &CreateUserRequest::from(profile))?;
        self.store(identity.clone())?;
        Ok(identity)
    }

    /// Re-fetch the identity record and replace the cached copy; picks up
    /// asynchronous changes such as a completed subscription upgrade.
    /// No-op when anonymous; fetch failures leave the cache as-is.
    pub fn refresh(&mut self, client: &ApiClient) {
        let Some(id) = self.user_id().map(str::to_string) else {
            return;
        };
        if let Ok(identity) = users::get_user(client, &id) {
            let _ = self.store(identity);
        }
    }

    /// Clear the persisted identity. Server-side state is untouched.
    pub fn sign_out(&mut self) {
        self.identity = None;
        let _ = fs::remove_file(&self.storage_path);
    }

    fn store(&mut self, identity: Identity) -> Result<(), SessionError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&identity)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::write(&self.storage_path, json).map_err(|e| SessionError::Storage(e.to_string()))?;
        self.identity = Some(identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn identity_json() -> String {
        r#"{
            "id": "u1",
            "email": "a@example.com",
            "name": "Ada",
            "pictureUrl": null,
            "proMemberUntil": null
        }"#
        .to_string()
    }

    #[test]
    fn restore_missing_file_is_anonymous() {
        let dir = tempdir().unwrap();
        let session = Session::restore(dir.path().join(IDENTITY_FILE));
        assert!(!session.is_authenticated());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn restore_malformed_file_discards_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(IDENTITY_FILE);
        fs::write(&path, "not json {").unwrap();

        let session = Session::restore(path.clone());
        assert!(!session.is_authenticated());
        assert!(!path.exists(), "malformed data is removed, not kept");
    }

    #[test]
    fn restore_round_trips_a_persisted_identity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(IDENTITY_FILE);
        fs::write(&path, identity_json()).unwrap();

        let session = Session::restore(path);
        assert_eq!(session.user_id(), Some("u1"));
        assert_eq!(session.identity().unwrap().name, "Ada");
        // Free tier: null expiry is never pro.
        assert!(!session.is_pro_member());
    }

    #[test]
    fn sign_out_clears_only_the_local_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(IDENTITY_FILE);
        fs::write(&path, identity_json()).unwrap();

        let mut session = Session::restore(path.clone());
        assert!(session.is_authenticated());

        session.sign_out();
        assert!(!session.is_authenticated());
        assert!(!path.exists());
        // Signing out twice is harmless.
        session.sign_out();
    }

    #[test]
    fn refresh_with_no_identity_is_a_noop() {
        let dir = tempdir().unwrap();
        let mut session = Session::restore(dir.path().join(IDENTITY_FILE));
        let client = ApiClient::new("http://127.0.0.1:0").unwrap();
        session.refresh(&client);
        assert!(!session.is_authenticated());
    }
}
