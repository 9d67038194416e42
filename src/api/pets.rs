use serde::Serialize;

use crate::api::client::{ApiClient, ApiError, TokenResponse};
use crate::models::{Pet, ShareToken, Species};

/// Trim a free-text field and map the empty string to null, so optional
/// fields round-trip as null rather than "".
pub fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Save payload for create/update. Optional fields serialize as explicit
/// nulls, matching the backend contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPayload {
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub notes: Option<String>,
    pub temperament: Option<String>,
    pub vet_name: Option<String>,
    pub vet_contact_number: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub allergies: Option<String>,
}

impl PetPayload {
    /// Build a payload from raw form fields, normalizing every optional
    /// field empty-string→null.
    #[allow(clippy::too_many_arguments)]
    pub fn from_form(
        name: &str,
        species: Species,
        breed: &str,
        birth_date: &str,
        notes: &str,
        temperament: &str,
        vet_name: &str,
        vet_contact_number: &str,
        emergency_contact_name: &str,
        emergency_contact_number: &str,
        allergies: &str,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            species,
            breed: normalize_optional(breed),
            birth_date: normalize_optional(birth_date),
            notes: normalize_optional(notes),
            temperament: normalize_optional(temperament),
            vet_name: normalize_optional(vet_name),
            vet_contact_number: normalize_optional(vet_contact_number),
            emergency_contact_name: normalize_optional(emergency_contact_name),
            emergency_contact_number: normalize_optional(emergency_contact_number),
            allergies: normalize_optional(allergies),
        }
    }
}

pub fn get_pets(client: &ApiClient, user_id: &str) -> Result<Vec<Pet>, ApiError> {
    client.get("/api/pets", Some(user_id))
}

pub fn get_pet(client: &ApiClient, id: &str, user_id: &str) -> Result<Pet, ApiError> {
    client.get(&format!("/api/pets/{id}"), Some(user_id))
}

pub fn create_pet(client: &ApiClient, payload: &PetPayload, user_id: &str) -> Result<Pet, ApiError> {
    client.post("/api/pets", payload, Some(user_id))
}

pub fn update_pet(
    client: &ApiClient,
    id: &str,
    payload: &PetPayload,
    user_id: &str,
) -> Result<Pet, ApiError> {
    client.put(&format!("/api/pets/{id}"), payload, Some(user_id))
}

/// Deletion cascades server-side to the pet's routines and logs.
pub fn delete_pet(client: &ApiClient, id: &str, user_id: &str) -> Result<(), ApiError> {
    client.delete(&format!("/api/pets/{id}"), Some(user_id))
}

/// Mint a care-sheet share token for a pet. The token grants unauthenticated
/// read access to the pet summary, contacts, allergies and all routines.
pub fn create_care_sheet_share(
    client: &ApiClient,
    pet_id: &str,
    user_id: &str,
) -> Result<ShareToken, ApiError> {
    let response: TokenResponse =
        client.post_empty(&format!("/api/pets/{pet_id}/care-sheet/share"), Some(user_id))?;
    Ok(response.token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_optional_fields_become_null() {
        let payload = PetPayload::from_form(
            "  Rex ", Species::Dog, "", "   ", "", "", "", "", "", "", "",
        );
        assert_eq!(payload.name, "Rex");
        assert!(payload.breed.is_none());
        assert!(payload.birth_date.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        // Explicit nulls on the wire, not omitted keys and not "".
        assert!(json["breed"].is_null());
        assert!(json["allergies"].is_null());
        assert_eq!(json["species"], "DOG");
    }

    #[test]
    fn filled_optional_fields_are_trimmed_and_kept() {
        let payload = PetPayload::from_form(
            "Misu",
            Species::Cat,
            " Siamese ",
            "2020-05-15",
            "",
            "shy",
            "Dr. Vet",
            "+1 555-123-4567",
            "Mom",
            "+1 555-987-6543",
            "Chicken",
        );
        assert_eq!(payload.breed.as_deref(), Some("Siamese"));
        assert_eq!(payload.birth_date.as_deref(), Some("2020-05-15"));
        assert_eq!(payload.emergency_contact_name.as_deref(), Some("Mom"));
    }
}
