//! Registered user profile, the unit of the user store

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use super::User;

/// Platform-assigned user identifier
pub type UserId = String;

/// Full contents of the user store, keyed by user id
pub type UserDirectory = BTreeMap<UserId, UserProfile>;

/// Snapshot of a user's display attributes taken at first `/start`.
///
/// The `id` is the key of the store mapping and is not repeated inside the
/// stored record. Keys written by other tools sharing the file are kept in
/// `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip)]
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(deserialize_with = "deserialize_registration_date")]
    pub registration_date: NaiveDateTime,
    pub is_active: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Accepts naive ISO-8601 (`2024-05-01T12:30:00.123456`) as well as
/// RFC 3339 with an offset (`2024-05-01T12:30:00.000Z`)
fn deserialize_registration_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.naive_local()))
        .map_err(|e| serde::de::Error::custom(format!("invalid registration_date '{}': {}", raw, e)))
}

impl UserProfile {
    /// Build a fresh, active profile from the sender's platform attributes
    pub fn register(user: &User, registered_at: NaiveDateTime) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            registration_date: registered_at,
            is_active: true,
            extra: serde_json::Map::new(),
        }
    }

    pub fn full_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or_default();
        let last = self.last_name.as_deref().unwrap_or_default();
        format!("{} {}", first, last).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(12, 30, 0, 123456)
            .unwrap()
    }

    #[test]
    fn test_register_copies_sender() {
        let user = User::new("42")
            .with_username("anna_k")
            .with_name("Anna", Some("Karenina"));
        let profile = UserProfile::register(&user, at());

        assert_eq!(profile.id, "42");
        assert_eq!(profile.username.as_deref(), Some("anna_k"));
        assert_eq!(profile.full_name(), "Anna Karenina");
        assert!(profile.is_active);
        assert_eq!(profile.registration_date, at());
    }

    #[test]
    fn test_record_wire_format() {
        let user = User::new("42").with_name("Анна", None::<String>);
        let profile = UserProfile::register(&user, at());
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["first_name"], "Анна");
        assert!(json["last_name"].is_null());
        assert!(json["username"].is_null());
        assert_eq!(json["registration_date"], "2024-05-01T12:30:00.123456");
        assert_eq!(json["is_active"], true);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_parses_offset_timestamps() {
        let record = r#"{
            "username": null,
            "first_name": "Ivan",
            "last_name": null,
            "registration_date": "2024-05-01T12:30:00.000Z",
            "is_active": true
        }"#;
        let profile: UserProfile = serde_json::from_str(record).unwrap();
        assert_eq!(profile.registration_date, NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap());
    }

    #[test]
    fn test_rejects_non_date() {
        let record = r#"{"username": null, "first_name": null, "last_name": null,
            "registration_date": "yesterday", "is_active": true}"#;
        assert!(serde_json::from_str::<UserProfile>(record).is_err());
    }

    #[test]
    fn test_full_name_without_last_name() {
        let user = User::new("1").with_name("Anna", None::<String>);
        assert_eq!(UserProfile::register(&user, at()).full_name(), "Anna");
    }
}
