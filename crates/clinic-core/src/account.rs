// Account and person domain types
//
// An Account is the login identity; a Person holds the profile data and is
// linked one-to-one to its Account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::role::Role;
use crate::specialty::EntityStatus;

/// Login identity as shown in user management
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub status: EntityStatus,
    /// Given name of the linked person, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Family name of the linked person, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile data of a person
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Person {
    pub id: Uuid,
    pub account_id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub national_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// Reference to the uploaded scan of the identity document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_document_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// "Family, Given" as used in listings
    pub fn sort_name(&self) -> String {
        format!("{}, {}", self.family_name, self.given_name)
    }
}

/// A person whose account has the patient role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Patient {
    pub account_id: Uuid,
    pub username: String,
    pub status: EntityStatus,
    pub person: Person,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(given: &str, family: &str) -> Person {
        let now = Utc::now();
        Person {
            id: Uuid::now_v7(),
            account_id: Uuid::now_v7(),
            given_name: given.to_string(),
            family_name: family.to_string(),
            national_id: "30111222".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            address: None,
            locality: None,
            id_document_photo: None,
            profile_photo: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sort_name() {
        assert_eq!(person("Ana", "Gomez").sort_name(), "Gomez, Ana");
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let json = serde_json::to_value(person("Ana", "Gomez")).unwrap();
        assert!(json.get("phone").is_none());
        assert!(json.get("profile_photo").is_none());
        assert_eq!(json["national_id"], "30111222");
    }
}
