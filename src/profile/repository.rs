//! Profile list persistence and management operations

use super::types::{generate_id, now_millis, Profile};
use super::validation::{ProfileDraft, ValidationError};
use crate::storage::{KeyValueStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Storage key holding the whole profile list
pub const PROFILES_KEY: &str = "profiles";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Profile not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Stored profiles are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Single source of truth for the profile list.
///
/// Every mutation reads the whole list, changes it and writes it back, so a
/// failure before the write leaves the stored list untouched.
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ProfileRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileRepository")
            .field("namespace", &self.store.namespace())
            .finish()
    }
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Load the stored list; an absent key is an empty list
    pub async fn load(&self) -> Result<Vec<Profile>, ProfileError> {
        match self.store.get(PROFILES_KEY).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn save(&self, profiles: &[Profile]) -> Result<(), ProfileError> {
        let value = serde_json::to_value(profiles)?;
        self.store.set(PROFILES_KEY, value).await?;
        debug!("Saved {} profile(s)", profiles.len());
        Ok(())
    }

    /// Profiles in display order: enabled first, otherwise stored order
    pub async fn list(&self) -> Result<Vec<Profile>, ProfileError> {
        let mut profiles = self.load().await?;
        profiles.sort_by_key(|p| !p.enabled);
        Ok(profiles)
    }

    pub async fn get(&self, id: &str) -> Result<Profile, ProfileError> {
        self.load()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))
    }

    /// Create an enabled profile from validated input
    pub async fn create(&self, draft: &ProfileDraft) -> Result<Profile, ProfileError> {
        let draft = draft.validate()?;
        let mut profiles = self.load().await?;

        let profile = Profile {
            id: generate_id(),
            name: draft.name,
            url_pattern: draft.url_pattern,
            headers: draft.headers,
            enabled: true,
            created_at: now_millis(),
        };
        profiles.push(profile.clone());
        self.save(&profiles).await?;

        info!("Created profile '{}' ({})", profile.name, profile.id);
        Ok(profile)
    }

    /// Replace name, pattern and headers; id, state and creation time are kept
    pub async fn update(&self, id: &str, draft: &ProfileDraft) -> Result<Profile, ProfileError> {
        let draft = draft.validate()?;
        let mut profiles = self.load().await?;

        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;
        profile.name = draft.name;
        profile.url_pattern = draft.url_pattern;
        profile.headers = draft.headers;
        let updated = profile.clone();

        self.save(&profiles).await?;
        info!("Updated profile '{}' ({})", updated.name, updated.id);
        Ok(updated)
    }

    /// Append a disabled copy of a profile
    pub async fn clone_profile(&self, id: &str) -> Result<Profile, ProfileError> {
        let mut profiles = self.load().await?;
        let source = profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;

        let copy = Profile {
            id: generate_id(),
            name: format!("{} (Copy)", source.name),
            url_pattern: source.url_pattern.clone(),
            headers: source.headers.clone(),
            enabled: false,
            created_at: now_millis(),
        };
        profiles.push(copy.clone());
        self.save(&profiles).await?;

        info!("Cloned profile {} into '{}' ({})", id, copy.name, copy.id);
        Ok(copy)
    }

    pub async fn delete(&self, id: &str) -> Result<Profile, ProfileError> {
        let mut profiles = self.load().await?;
        let index = profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;
        let removed = profiles.remove(index);

        self.save(&profiles).await?;
        info!("Deleted profile '{}' ({})", removed.name, removed.id);
        Ok(removed)
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<Profile, ProfileError> {
        let mut profiles = self.load().await?;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;
        profile.enabled = enabled;
        let toggled = profile.clone();

        self.save(&profiles).await?;
        info!(
            "Profile '{}' {}",
            toggled.name,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(toggled)
    }

    /// Append already-built profiles in one write
    pub async fn append(&self, new_profiles: Vec<Profile>) -> Result<usize, ProfileError> {
        let count = new_profiles.len();
        let mut profiles = self.load().await?;
        profiles.extend(new_profiles);
        self.save(&profiles).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{HeaderAction, HeaderRule};
    use crate::storage::MemoryStore;

    fn repository() -> ProfileRepository {
        ProfileRepository::new(Arc::new(MemoryStore::default()))
    }

    fn draft(name: &str) -> ProfileDraft {
        ProfileDraft::new(
            name,
            "example.com",
            vec![HeaderRule::new(HeaderAction::Add, "X-Test", "1")],
        )
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        assert!(repository().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_enables() {
        let repo = repository();
        let created = repo.create(&draft("Dev")).await.unwrap();

        assert!(!created.id.is_empty());
        assert!(created.enabled);
        assert!(created.created_at > 0);
        assert_eq!(repo.load().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_invalid_draft_mutates_nothing() {
        let repo = repository();
        repo.create(&draft("Dev")).await.unwrap();

        let result = repo.create(&ProfileDraft::new("", "a.com", vec![])).await;
        assert!(matches!(
            result,
            Err(ProfileError::Validation(ValidationError::EmptyName))
        ));
        assert_eq!(repo.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let repo = repository();
        let created = repo.create(&draft("Dev")).await.unwrap();
        repo.set_enabled(&created.id, false).await.unwrap();

        let prod = ProfileDraft::new(
            "Prod",
            "https://prod.example.com/",
            vec![HeaderRule::delete("Cookie")],
        );
        let updated = repo.update(&created.id, &prod).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(!updated.enabled);
        assert_eq!(updated.name, "Prod");
        assert_eq!(updated.headers, vec![HeaderRule::delete("Cookie")]);
    }

    #[tokio::test]
    async fn test_clone_is_disabled_copy() {
        let repo = repository();
        let created = repo.create(&draft("Dev")).await.unwrap();

        let copy = repo.clone_profile(&created.id).await.unwrap();
        assert_ne!(copy.id, created.id);
        assert_eq!(copy.name, "Dev (Copy)");
        assert_eq!(copy.headers, created.headers);
        assert!(!copy.enabled);
        assert_eq!(repo.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_and_not_found() {
        let repo = repository();
        let created = repo.create(&draft("Dev")).await.unwrap();

        repo.delete(&created.id).await.unwrap();
        assert!(repo.load().await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(&created.id).await,
            Err(ProfileError::NotFound(_))
        ));
        assert!(matches!(
            repo.set_enabled("missing", true).await,
            Err(ProfileError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_puts_enabled_first() {
        let repo = repository();
        let a = repo.create(&draft("A")).await.unwrap();
        repo.create(&draft("B")).await.unwrap();
        repo.create(&draft("C")).await.unwrap();
        repo.set_enabled(&a.id, false).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        // Stored order is untouched
        assert_eq!(repo.load().await.unwrap()[0].id, a.id);
    }
}
