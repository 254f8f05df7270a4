//! API request/response models for users.

use crate::db::models::users::User;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// User request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// Partial update payload: any subset of the mutable fields. Unrecognized
/// fields are silently ignored. For `age`, an explicit `null` clears the
/// stored value, while an absent key leaves it untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        with = "serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i32>)]
    pub age: Option<Option<i32>>,
}

impl UserUpdate {
    /// True when none of the recognized fields are present
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

// User response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
        }
    }
}

/// Response for a successful create: the generated id plus a message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreated {
    pub id: i32,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_update_payload() {
        let update: UserUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let update: UserUpdate = serde_json::from_value(json!({"nickname": "jd", "id": 7})).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_age_present_vs_null_vs_absent() {
        let update: UserUpdate = serde_json::from_value(json!({"age": 31})).unwrap();
        assert_eq!(update.age, Some(Some(31)));

        let update: UserUpdate = serde_json::from_value(json!({"age": null})).unwrap();
        assert_eq!(update.age, Some(None));

        let update: UserUpdate = serde_json::from_value(json!({"name": "Jo"})).unwrap();
        assert_eq!(update.age, None);
        assert!(!update.is_empty());
    }

    #[test]
    fn test_create_requires_name_and_email() {
        assert!(serde_json::from_value::<UserCreate>(json!({"email": "a@x.com"})).is_err());
        assert!(serde_json::from_value::<UserCreate>(json!({"name": "A"})).is_err());

        let create: UserCreate = serde_json::from_value(json!({"name": "A", "email": "a@x.com"})).unwrap();
        assert_eq!(create.age, None);
    }
}
