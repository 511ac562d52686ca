//! Profile directory client
//!
//! User identity and profile storage live outside the core; the engine
//! only needs to resolve an owner's display name when assembling the full
//! auction projection.

use async_trait::async_trait;
use common::UserId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves user ids to display names
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// The display name for a user, if the directory knows one
    async fn display_name(&self, user: UserId) -> Option<String>;
}

/// In-process profile directory backed by a static map
///
/// Used by tests and the simulator in place of the real user service.
#[derive(Debug, Default)]
pub struct StaticProfileDirectory {
    names: Arc<RwLock<HashMap<UserId, String>>>,
}

impl StaticProfileDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self {
            names: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Builder-style registration of a profile
    pub fn with_profile(self, user: UserId, name: impl Into<String>) -> Self {
        self.names.write().insert(user, name.into());
        self
    }

    /// Register or replace a profile
    pub fn insert(&self, user: UserId, name: impl Into<String>) {
        self.names.write().insert(user, name.into());
    }
}

impl Clone for StaticProfileDirectory {
    fn clone(&self) -> Self {
        Self {
            names: Arc::clone(&self.names),
        }
    }
}

#[async_trait]
impl ProfileDirectory for StaticProfileDirectory {
    async fn display_name(&self, user: UserId) -> Option<String> {
        self.names.read().get(&user).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_lookup() {
        let alice = UserId::new();
        let directory = StaticProfileDirectory::new().with_profile(alice, "Alice");

        assert_eq!(directory.display_name(alice).await, Some("Alice".to_string()));
        assert_eq!(directory.display_name(UserId::new()).await, None);
    }
}
