//! User registration and profile lookup over a [`UserStore`]

use std::sync::Arc;
use chrono::{Local, NaiveDateTime, SubsecRound};
use tokio::sync::Mutex;

use crate::domain::entities::{User, UserProfile};
use crate::domain::traits::UserStore;
use crate::application::errors::StorageError;

/// Source of registration timestamps
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Outcome of a `/start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Profile was created and persisted by this call
    New(UserProfile),
    /// Profile already existed and was left untouched
    Returning(UserProfile),
}

#[cfg(test)]
impl Registration {
    pub fn profile(&self) -> &UserProfile {
        match self {
            Registration::New(p) | Registration::Returning(p) => p,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Registration::New(_))
    }
}

/// Service for registering users and reading their profiles
pub struct RegistrationService<S: UserStore> {
    store: Arc<S>,
    clock: Clock,
    // Held across load + insert + save so concurrent first registrations
    // of the same id cannot both observe "absent".
    write_lock: Mutex<()>,
}

impl<S: UserStore> RegistrationService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            // Stored dates carry at most microseconds
            clock: Arc::new(|| Local::now().naive_local().trunc_subsecs(6)),
            write_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register `user` unless already present
    pub async fn start(&self, user: &User) -> Result<Registration, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut users = self.store.load().await?;
        if let Some(existing) = users.get(&user.id) {
            tracing::debug!("User {} already registered", user.id);
            return Ok(Registration::Returning(existing.clone()));
        }

        let profile = UserProfile::register(user, (self.clock)());
        users.insert(user.id.clone(), profile.clone());
        self.store.save(&users).await?;

        tracing::info!("Registered new user {} ({})", user.id, user.display_name());
        Ok(Registration::New(profile))
    }

    /// Stored profile for `id`, if registered
    pub async fn profile(&self, id: &str) -> Result<Option<UserProfile>, StorageError> {
        let mut users = self.store.load().await?;
        Ok(users.remove(id))
    }

    /// Every registered profile ordered by id
    pub async fn users(&self) -> Result<Vec<UserProfile>, StorageError> {
        Ok(self.store.load().await?.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::JsonUserStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn fixed(h: u32) -> Clock {
        Arc::new(move || {
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap()
        })
    }

    fn service(dir: &TempDir) -> RegistrationService<JsonUserStore> {
        let store = Arc::new(JsonUserStore::new(dir.path().join("users.json")));
        RegistrationService::new(store).with_clock(fixed(10))
    }

    #[tokio::test]
    async fn test_start_registers_new_user() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let anna = User::new("42").with_name("Anna", None::<String>);

        let outcome = service.start(&anna).await.unwrap();
        assert!(outcome.is_new());

        let users = service.store().load().await.unwrap();
        assert_eq!(users.len(), 1);
        let stored = &users["42"];
        assert!(stored.is_active);
        assert_eq!(stored.first_name.as_deref(), Some("Anna"));
        assert_eq!(stored.registration_date, fixed(10)());
    }

    #[tokio::test]
    async fn test_start_twice_keeps_first_registration() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonUserStore::new(dir.path().join("users.json")));
        let anna = User::new("42").with_name("Anna", None::<String>);

        let first = RegistrationService::new(store.clone()).with_clock(fixed(10));
        first.start(&anna).await.unwrap();

        let renamed = User::new("42").with_name("Annette", None::<String>);
        let second = RegistrationService::new(store.clone()).with_clock(fixed(18));
        let outcome = second.start(&renamed).await.unwrap();

        assert!(!outcome.is_new());
        let users = store.load().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users["42"].registration_date, fixed(10)());
        assert_eq!(users["42"].first_name.as_deref(), Some("Anna"));
        assert_eq!(outcome.profile(), &users["42"]);
    }

    #[tokio::test]
    async fn test_default_clock_writes_microseconds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        let service = RegistrationService::new(Arc::new(JsonUserStore::new(&path)));
        service.start(&User::new("42")).await.unwrap();

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let date = raw["42"]["registration_date"].as_str().unwrap();
        let fraction = date.split_once('.').map(|(_, f)| f).unwrap_or("");
        assert!(fraction.len() <= 6, "too many fractional digits in {}", date);
        assert!(date.parse::<NaiveDateTime>().is_ok());
    }

    #[tokio::test]
    async fn test_start_keeps_unknown_fields_of_other_users() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{
  "1": {
    "username": "old",
    "first_name": "Old",
    "last_name": null,
    "registration_date": "2024-01-01T00:00:00",
    "is_active": true,
    "last_login": "2024-02-01T08:00:00"
  }
}"#).unwrap();

        let service = RegistrationService::new(Arc::new(JsonUserStore::new(&path))).with_clock(fixed(10));
        assert!(service.start(&User::new("2")).await.unwrap().is_new());

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["1"]["last_login"], "2024-02-01T08:00:00");
        assert!(raw["2"].get("last_login").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_first_start_registers_once() {
        let dir = TempDir::new().unwrap();
        let service = Arc::new(service(&dir));
        let anna = User::new("42").with_name("Anna", None::<String>);

        let (a, b) = tokio::join!(service.start(&anna), service.start(&anna));
        let outcomes = [a.unwrap(), b.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| o.is_new()).count(), 1);
        assert_eq!(service.users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_missing_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        assert!(service.profile("7").await.unwrap().is_none());
        assert!(!dir.path().join("users.json").exists());
    }

    #[tokio::test]
    async fn test_users_lists_all_profiles() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        service.start(&User::new("2")).await.unwrap();
        service.start(&User::new("1")).await.unwrap();

        let ids: Vec<String> = service.users().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
