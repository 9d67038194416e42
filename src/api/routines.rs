use serde::Serialize;

use crate::api::client::{ApiClient, ApiError, TokenResponse};
use crate::api::pets::normalize_optional;
use crate::models::{RecurrenceType, Routine, ShareToken, SharedRoutineView};

/// Save payload whitelist for routine create/update. The backend accepts
/// exactly these fields; task type stays a display-only concern and is
/// never submitted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutinePayload {
    pub pet_id: String,
    pub name: String,
    pub description: Option<String>,
    pub recurrence_type: RecurrenceType,
    pub time_of_day: String,
    pub remind_me: bool,
    pub medicine: Option<String>,
    pub medicine_instructions: Option<String>,
}

impl RoutinePayload {
    /// Build a payload from form fields. Reminders are a pro entitlement:
    /// for free-tier identities `remind_me` is forced to false regardless
    /// of the form state.
    #[allow(clippy::too_many_arguments)]
    pub fn from_form(
        pet_id: &str,
        name: &str,
        description: &str,
        recurrence_type: RecurrenceType,
        time_of_day: &str,
        remind_me: bool,
        medicine: &str,
        medicine_instructions: &str,
        is_pro_member: bool,
    ) -> Self {
        Self {
            pet_id: pet_id.to_string(),
            name: name.trim().to_string(),
            description: normalize_optional(description),
            recurrence_type,
            time_of_day: time_of_day.trim().to_string(),
            remind_me: is_pro_member && remind_me,
            medicine: normalize_optional(medicine),
            medicine_instructions: normalize_optional(medicine_instructions),
        }
    }
}

pub fn get_routines(client: &ApiClient, pet_id: &str, user_id: &str) -> Result<Vec<Routine>, ApiError> {
    client.get(&format!("/api/routines?petId={pet_id}"), Some(user_id))
}

pub fn get_routine(client: &ApiClient, id: &str) -> Result<Routine, ApiError> {
    client.get(&format!("/api/routines/{id}"), None)
}

pub fn create_routine(
    client: &ApiClient,
    payload: &RoutinePayload,
    user_id: &str,
) -> Result<Routine, ApiError> {
    client.post("/api/routines", payload, Some(user_id))
}

pub fn update_routine(
    client: &ApiClient,
    id: &str,
    payload: &RoutinePayload,
) -> Result<Routine, ApiError> {
    client.put(&format!("/api/routines/{id}"), payload, None)
}

pub fn delete_routine(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/api/routines/{id}"), None)
}

/// Owner-path complete. The server stamps `lastCompletedAt` and recomputes
/// the period flag; the returned routine is merged into the cached list.
/// Completing an already-completed routine is not an error.
pub fn complete_routine(client: &ApiClient, id: &str) -> Result<Routine, ApiError> {
    client.post_empty(&format!("/api/routines/{id}/complete"), None)
}

/// Mint a share token granting read + complete on one routine.
pub fn share_routine(client: &ApiClient, id: &str) -> Result<ShareToken, ApiError> {
    let response: TokenResponse = client.post_empty(&format!("/api/routines/{id}/share"), None)?;
    Ok(response.token)
}

/// Resolve a routine share token. No identity header; an unknown token is
/// a not-found error.
pub fn get_shared_routine(client: &ApiClient, token: &ShareToken) -> Result<SharedRoutineView, ApiError> {
    client.get(&format!("/api/share/routine/{token}"), None)
}

/// Shared-path complete via a bearer token.
pub fn complete_shared_routine(
    client: &ApiClient,
    token: &ShareToken,
) -> Result<SharedRoutineView, ApiError> {
    client.post_empty(&format!("/api/share/routine/{token}/complete"), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(remind_me: bool, is_pro: bool) -> RoutinePayload {
        RoutinePayload::from_form(
            "p1",
            "Morning walk",
            "",
            RecurrenceType::Daily,
            "09:00",
            remind_me,
            "",
            "",
            is_pro,
        )
    }

    #[test]
    fn free_tier_remind_me_is_forced_off() {
        // The UI may have the box checked; the payload still says false.
        assert!(!payload(true, false).remind_me);
        assert!(payload(true, true).remind_me);
        assert!(!payload(false, true).remind_me);
    }

    #[test]
    fn payload_contains_only_whitelisted_fields() {
        let json = serde_json::to_value(payload(false, false)).unwrap();
        let object = json.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "description",
                "medicine",
                "medicineInstructions",
                "name",
                "petId",
                "recurrenceType",
                "remindMe",
                "timeOfDay",
            ]
        );
        assert!(json["description"].is_null());
        assert_eq!(json["recurrenceType"], "DAILY");
    }
}
