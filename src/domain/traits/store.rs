use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::UserDirectory;

/// Persistence for the registered-user directory.
///
/// Implementations read and write the whole directory at once and do not
/// lock; callers that read-modify-write must serialise themselves.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load every profile; an absent backing file is an empty directory
    async fn load(&self) -> Result<UserDirectory, StorageError>;

    /// Replace the stored directory with `users`
    async fn save(&self, users: &UserDirectory) -> Result<(), StorageError>;
}
