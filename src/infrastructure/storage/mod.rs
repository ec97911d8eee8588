//! File-based storage implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::traits::UserStore;
use crate::domain::entities::UserDirectory;
use crate::application::errors::StorageError;

/// JSON file-based user store.
///
/// The whole directory lives in one human-readable JSON object keyed by
/// user id. Writes go to a sibling temp file that is renamed over the
/// backing file.
pub struct JsonUserStore {
    path: PathBuf,
}

impl JsonUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "users.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn corrupt(&self, reason: impl ToString) -> StorageError {
        StorageError::Corrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn load(&self) -> Result<UserDirectory, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("User store {:?} not found, starting empty", self.path);
                return Ok(UserDirectory::new());
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(self.corrupt(e));
            }
            Err(e) => return Err(e.into()),
        };

        let mut users: UserDirectory = serde_json::from_str(&content)
            .map_err(|e| self.corrupt(e))?;

        for (id, profile) in users.iter_mut() {
            profile.id = id.clone();
        }

        Ok(users)
    }

    async fn save(&self, users: &UserDirectory) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(users)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        tracing::debug!("Saved {} users to {:?}", users.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{User, UserProfile};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn sample_directory() -> UserDirectory {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(9, 15, 0, 42)
            .unwrap();
        let anna = User::new("42")
            .with_username("anna_k")
            .with_name("Анна", Some("Каренина"));
        let bob = User::new("7").with_name("Bob", None::<String>);

        let mut users = UserDirectory::new();
        users.insert("42".to_string(), UserProfile::register(&anna, at));
        users.insert("7".to_string(), UserProfile::register(&bob, at));
        users
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonUserStore::new(dir.path().join("users.json"));

        let users = store.load().await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonUserStore::new(dir.path().join("users.json"));
        let users = sample_directory();

        store.save(&users).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, users);
        assert_eq!(loaded["42"].id, "42");
    }

    #[tokio::test]
    async fn test_file_is_indented_utf8_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        let store = JsonUserStore::new(&path);

        store.save(&sample_directory()).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();

        assert!(raw.starts_with("{\n  \"42\": {\n    \"username\": \"anna_k\""));
        assert!(raw.contains("\"first_name\": \"Анна\""));
        assert!(raw.contains("\"last_name\": null"));
        assert!(raw.contains("\"registration_date\": \"2024-05-01T09:15:00.000042\""));
        assert!(!dir.path().join("users.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_reads_externally_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{
  "123": {
    "username": null,
    "first_name": "Ivan",
    "last_name": null,
    "registration_date": "2024-01-31T23:59:59",
    "is_active": true
  }
}"#).unwrap();

        let users = JsonUserStore::new(&path).load().await.unwrap();
        let ivan = &users["123"];
        assert_eq!(ivan.id, "123");
        assert_eq!(ivan.first_name.as_deref(), Some("Ivan"));
        assert_eq!(ivan.registration_date.format("%d.%m.%Y").to_string(), "31.01.2024");
    }

    #[tokio::test]
    async fn test_reads_utc_offset_dates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{
  "5": {
    "username": "zed",
    "first_name": "Zed",
    "last_name": null,
    "registration_date": "2024-05-01T12:30:00.000Z",
    "is_active": true
  }
}"#).unwrap();

        let users = JsonUserStore::new(&path).load().await.unwrap();
        assert_eq!(users["5"].registration_date.format("%d.%m.%Y %H:%M").to_string(), "01.05.2024 12:30");
    }

    #[tokio::test]
    async fn test_extra_fields_survive_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"9": {"username": null, "first_name": null, "last_name": null,
            "registration_date": "2024-01-01T00:00:00", "is_active": false, "last_login": "x"}}"#).unwrap();
        let store = JsonUserStore::new(&path);

        let users = store.load().await.unwrap();
        assert_eq!(users["9"].extra["last_login"], "x");
        store.save(&users).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"last_login\": \"x\""));
    }

    #[tokio::test]
    async fn test_malformed_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonUserStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"42": {"username": "x"}}"#).unwrap();

        let err = JsonUserStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = JsonUserStore::new(dir.path().join("data").join("users.json"));

        store.save(&sample_directory()).await.unwrap();
        assert_eq!(store.load().await.unwrap().len(), 2);
    }
}
