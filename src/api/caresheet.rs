use crate::api::client::{ApiClient, ApiError};
use crate::models::{CareSheet, ShareToken};

/// Resolve a care-sheet token. Public endpoint, no identity header.
/// Caching is disabled so completion state is never served stale.
pub fn get_care_sheet(client: &ApiClient, token: &ShareToken) -> Result<CareSheet, ApiError> {
    client.get_no_store(&format!("/api/share/caresheet/{token}"), None)
}
