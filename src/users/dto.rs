use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::User;

/// Public part of a user returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub home_course: Option<String>,
    pub is_online: bool,
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            phone_number: u.phone_number,
            home_course: u.home_course,
            is_online: u.is_online,
            created_at: u.created_at,
        }
    }
}

/// Directory entry for browsing other players. Contact details stay private
/// to the profile owner.
#[derive(Debug, Serialize)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub home_course: Option<String>,
    pub is_online: bool,
}

impl From<User> for DirectoryUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            home_course: u.home_course,
            is_online: u.is_online,
        }
    }
}

/// Request body for PUT /me. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub home_course: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: "argon2-hash".into(),
            first_name: Some("Ada".into()),
            last_name: None,
            phone_number: Some("+15551234567".into()),
            home_course: Some("Pinehill".into()),
            is_online: true,
            last_seen: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn directory_entry_hides_contact_details() {
        let entry = DirectoryUser::from(user());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("phone_number").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ada");
        assert_eq!(json["home_course"], "Pinehill");
    }

    #[test]
    fn profile_keeps_email_but_never_the_hash() {
        let profile = PublicUser::from(user());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["phone_number"], "+15551234567");
        assert!(json.get("password_hash").is_none());
    }
}
