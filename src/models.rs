use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reminder delay choices offered by the backend, in minutes.
pub const REMIND_MINUTES_CHOICES: [u32; 7] = [5, 10, 15, 20, 30, 45, 60];

/// Opaque bearer capability granting access to a single shared resource.
///
/// Tokens are never parsed and never interchangeable with resource ids;
/// keeping them behind a newtype prevents an id from ending up in a URL
/// where a token is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    /// Pro subscription expiry as epoch milliseconds; null for free tier.
    #[serde(default)]
    pub pro_member_until: Option<i64>,
}

impl Identity {
    /// Pro iff the expiry is set and strictly in the future. Recomputed on
    /// every call; membership can lapse or renew without a fresh sign-in.
    pub fn is_pro_member(&self, now_ms: i64) -> bool {
        self.pro_member_until.is_some_and(|until| until > now_ms)
    }

    /// First word of the display name, for greetings.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }
}

/// Profile fields fetched from Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    pub fn label(self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Species::Dog => "🐕",
            Species::Cat => "🐈",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub breed: Option<String>,
    /// Calendar date as YYYY-MM-DD; some responses append a time suffix,
    /// so this stays a string and is prefix-parsed for display.
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub temperament: Option<String>,
    #[serde(default)]
    pub vet_name: Option<String>,
    #[serde(default)]
    pub vet_contact_number: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

impl Pet {
    /// Breed if set, otherwise the species label.
    pub fn breed_or_species(&self) -> String {
        match self.breed.as_deref().map(str::trim) {
            Some(breed) if !breed.is_empty() => breed.to_string(),
            _ => self.species.label().to_string(),
        }
    }

    pub fn has_emergency_info(&self) -> bool {
        self.vet_contact_number.is_some() || self.emergency_contact_number.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskType {
    Food,
    Walk,
    Medicine,
    Misc,
}

impl TaskType {
    pub fn icon(self) -> &'static str {
        match self {
            TaskType::Medicine => "💊",
            TaskType::Walk => "🦮",
            TaskType::Misc => "📋",
            TaskType::Food => "🥣",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskType::Food => "Food",
            TaskType::Walk => "Walk",
            TaskType::Medicine => "Medicine",
            TaskType::Misc => "Misc",
        }
    }
}

/// Display fallback when a routine carries no explicit task type.
/// Priority: explicit field, then a named medicine, then "walk" in the
/// name, defaulting to food. Never written back into a save payload.
pub fn infer_task_type(
    task_type: Option<TaskType>,
    medicine: Option<&str>,
    name: &str,
) -> TaskType {
    if let Some(explicit) = task_type {
        return explicit;
    }
    if medicine.map(str::trim).is_some_and(|m| !m.is_empty()) {
        return TaskType::Medicine;
    }
    if name.to_lowercase().contains("walk") {
        return TaskType::Walk;
    }
    TaskType::Food
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Custom,
}

impl RecurrenceType {
    pub fn label(self) -> &'static str {
        match self {
            RecurrenceType::Daily => "Daily",
            RecurrenceType::Weekly => "Weekly",
            RecurrenceType::Custom => "Does not repeat",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub pet_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    pub recurrence_type: RecurrenceType,
    /// Wall-clock time as HH:MM (tolerate HH:MM:SS from the backend).
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub remind_me: bool,
    #[serde(default)]
    pub remind_minutes_after: Option<u32>,
    #[serde(default)]
    pub medicine: Option<String>,
    #[serde(default)]
    pub medicine_instructions: Option<String>,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
    /// Server-derived; the client renders this as-is and never recomputes
    /// it from raw timestamps.
    #[serde(default)]
    pub is_completed_for_current_period: bool,
    #[serde(default)]
    pub share_token: Option<ShareToken>,
}

impl Routine {
    pub fn display_task_type(&self) -> TaskType {
        infer_task_type(self.task_type, self.medicine.as_deref(), &self.name)
    }

    /// Time of day trimmed to HH:MM for display.
    pub fn time_of_day_hhmm(&self) -> Option<&str> {
        self.time_of_day
            .as_deref()
            .map(|t| if t.len() > 5 { &t[..5] } else { t })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub id: String,
    pub pet_id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub logged_at: DateTime<Utc>,
    #[serde(default)]
    pub share_token: Option<ShareToken>,
}

/// Projection returned when resolving a log share token: the log plus its
/// pet's display name, nothing else.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedLogView {
    pub pet_name: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// Projection returned when resolving a routine share token: routine
/// fields flattened together with a pet summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedRoutineView {
    pub pet_name: String,
    #[serde(default)]
    pub species: Option<Species>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub vet_name: Option<String>,
    #[serde(default)]
    pub vet_contact_number: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub medicine: Option<String>,
    #[serde(default)]
    pub medicine_instructions: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed_for_current_period: bool,
}

impl SharedRoutineView {
    pub fn display_task_type(&self) -> TaskType {
        infer_task_type(self.task_type, self.medicine.as_deref(), &self.name)
    }

    pub fn time_of_day_hhmm(&self) -> Option<&str> {
        self.time_of_day
            .as_deref()
            .map(|t| if t.len() > 5 { &t[..5] } else { t })
    }
}

/// One routine inside a shared care sheet. Identified by its own embedded
/// completion token rather than a resource id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareSheetRoutine {
    pub share_token: ShareToken,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub medicine: Option<String>,
    #[serde(default)]
    pub medicine_instructions: Option<String>,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed_for_current_period: bool,
}

impl CareSheetRoutine {
    pub fn display_task_type(&self) -> TaskType {
        infer_task_type(self.task_type, self.medicine.as_deref(), &self.name)
    }

    pub fn time_of_day_hhmm(&self) -> Option<&str> {
        self.time_of_day
            .as_deref()
            .map(|t| if t.len() > 5 { &t[..5] } else { t })
    }
}

/// Aggregate read view behind a care-sheet token: pet identity, contacts,
/// allergies and all routines.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareSheet {
    pub pet_name: String,
    #[serde(default)]
    pub species: Option<Species>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub vet_name: Option<String>,
    #[serde(default)]
    pub vet_contact_number: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
    #[serde(default)]
    pub routines: Vec<CareSheetRoutine>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pro_membership_is_strictly_greater_than_now() {
        let mut identity = Identity {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: "Ada Lovelace".to_string(),
            picture_url: None,
            pro_member_until: None,
        };
        let now = 1_700_000_000_000;

        assert!(!identity.is_pro_member(now), "null expiry is never pro");

        identity.pro_member_until = Some(now);
        assert!(!identity.is_pro_member(now), "expiry == now is not pro");

        identity.pro_member_until = Some(now + 1);
        assert!(identity.is_pro_member(now));

        identity.pro_member_until = Some(now - 1);
        assert!(!identity.is_pro_member(now));
    }

    #[test]
    fn task_type_inference_priority() {
        // Explicit type wins over everything.
        assert_eq!(
            infer_task_type(Some(TaskType::Misc), Some("Heartworm pill"), "Evening walk"),
            TaskType::Misc
        );
        // Medicine beats a "walk" name.
        assert_eq!(
            infer_task_type(None, Some("Heartworm pill"), "Evening walk"),
            TaskType::Medicine
        );
        // Blank medicine does not count as medicine.
        assert_eq!(
            infer_task_type(None, Some("   "), "Evening Walk"),
            TaskType::Walk
        );
        assert_eq!(infer_task_type(None, None, "Breakfast"), TaskType::Food);
    }

    #[test]
    fn share_token_serializes_transparently() {
        let token = ShareToken::new("abc123");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc123\"");
        let parsed: ShareToken = serde_json::from_str("\"xyz\"").unwrap();
        assert_eq!(parsed.as_str(), "xyz");
    }

    #[test]
    fn routine_tolerates_seconds_in_time_of_day() {
        let routine = Routine {
            id: "r1".to_string(),
            pet_id: "p1".to_string(),
            name: "Breakfast".to_string(),
            description: None,
            task_type: None,
            recurrence_type: RecurrenceType::Daily,
            time_of_day: Some("09:00:00".to_string()),
            remind_me: false,
            remind_minutes_after: None,
            medicine: None,
            medicine_instructions: None,
            last_completed_at: None,
            is_completed_for_current_period: false,
            share_token: None,
        };
        assert_eq!(routine.time_of_day_hhmm(), Some("09:00"));
    }

    #[test]
    fn routine_deserializes_camel_case_wire_format() {
        let json = r#"{
            "id": "r1",
            "petId": "p1",
            "name": "Morning walk",
            "recurrenceType": "DAILY",
            "timeOfDay": "08:30",
            "isCompletedForCurrentPeriod": true,
            "lastCompletedAt": "2026-08-05T08:31:00Z",
            "shareToken": "tok-1"
        }"#;
        let routine: Routine = serde_json::from_str(json).unwrap();
        assert_eq!(routine.pet_id, "p1");
        assert_eq!(routine.recurrence_type, RecurrenceType::Daily);
        assert!(routine.is_completed_for_current_period);
        assert_eq!(routine.share_token.as_ref().unwrap().as_str(), "tok-1");
        assert_eq!(routine.display_task_type(), TaskType::Walk);
    }
}
