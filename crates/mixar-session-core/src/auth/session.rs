use tracing::{debug, warn};

use crate::config::StorageKeys;
use crate::models::UserProfile;

use super::KeyValueStore;

/// Credentials and cached user profile, mirrored to a [`KeyValueStore`].
///
/// Every mutator updates memory and the store before returning. Store
/// failures are logged and otherwise ignored.
pub struct Session {
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    /// Restore whatever the store holds. Missing or undecodable entries
    /// come back as `None`.
    pub fn restore(store: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        let access_token = store.get(&keys.access_token).filter(|t| !t.is_empty());
        let refresh_token = store.get(&keys.refresh_token).filter(|t| !t.is_empty());
        let user = store.get(&keys.user).and_then(|raw| {
            serde_json::from_str::<UserProfile>(&raw)
                .inspect_err(|e| warn!(error = %e, "Ignoring undecodable stored user profile"))
                .ok()
        });

        debug!(
            has_access_token = access_token.is_some(),
            has_refresh_token = refresh_token.is_some(),
            has_user = user.is_some(),
            "Session restored"
        );

        Self {
            store,
            keys,
            access_token,
            refresh_token,
            user,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_superuser(&self) -> bool {
        self.user.as_ref().is_some_and(UserProfile::is_superuser)
    }

    /// Replace the access token; the refresh token only when one is given.
    /// Empty tokens count as absent.
    pub fn set_tokens(&mut self, access_token: String, refresh_token: Option<String>) {
        if access_token.is_empty() {
            self.evict(&self.keys.access_token);
            self.access_token = None;
        } else {
            self.persist(&self.keys.access_token, &access_token);
            self.access_token = Some(access_token);
        }

        if let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) {
            self.persist(&self.keys.refresh_token, &refresh_token);
            self.refresh_token = Some(refresh_token);
        }
    }

    pub fn set_user(&mut self, user: UserProfile) {
        match serde_json::to_string(&user) {
            Ok(raw) => self.persist(&self.keys.user, &raw),
            Err(e) => warn!(error = %e, "Failed to serialize user profile"),
        }
        self.user = Some(user);
    }

    /// Drop all credentials and the cached user, in memory and in the store.
    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.user = None;
        for key in [&self.keys.access_token, &self.keys.refresh_token, &self.keys.user] {
            self.evict(key);
        }
    }

    fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key = key, error = %e, "Failed to evict session entry");
        }
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key = key, error = %e, "Failed to persist session entry");
        }
    }
}
