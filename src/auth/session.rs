use anyhow::Result;
use tracing::{debug, warn};

use crate::api::ApiClient;

use super::store::{StoredTokens, TokenStore};

/// Session state: the in-memory mirror of the token store.
///
/// Constructed explicitly and handed to whoever needs it; hydrates from the
/// store at startup and writes through on every mutation. The user counts as
/// authenticated exactly while an access token is present.
pub struct Session {
    store: Box<dyn TokenStore>,
    tokens: StoredTokens,
}

impl Session {
    /// Create a session hydrated from the given store. A store that fails to
    /// load yields an empty (logged-out) session rather than an error.
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        let tokens = match store.load() {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Failed to load stored tokens, starting logged out");
                StoredTokens::default()
            }
        };
        Self { store, tokens }
    }

    /// Persist the full token triple and mark the session authenticated.
    pub fn login(&mut self, username: &str, access: &str, refresh: &str) -> Result<()> {
        self.tokens = StoredTokens {
            access_token: Some(access.to_string()),
            refresh_token: Some(refresh.to_string()),
            username: Some(username.to_string()),
        };
        self.store.save(&self.tokens)
    }

    /// Clear all session state, in memory and in the store. Idempotent.
    pub fn logout(&mut self) {
        self.tokens = StoredTokens::default();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear token store");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.tokens.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.tokens.refresh_token.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.tokens.username.as_deref()
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Exactly one network call, no retry or backoff. On success the new
    /// access token is persisted and `true` is returned; on any failure
    /// (missing refresh token, transport error, non-success response) the
    /// session is fully logged out and `false` is returned.
    pub async fn refresh_access_token(&mut self, api: &ApiClient) -> bool {
        let refresh = match self.tokens.refresh_token.clone() {
            Some(t) => t,
            None => {
                debug!("No refresh token stored, logging out");
                self.logout();
                return false;
            }
        };

        match api.refresh(&refresh).await {
            Ok(access) => {
                self.tokens.access_token = Some(access);
                if let Err(e) = self.store.save(&self.tokens) {
                    warn!(error = %e, "Failed to persist refreshed access token");
                }
                debug!("Access token refreshed");
                true
            }
            Err(e) => {
                debug!(error = %e, "Token refresh failed, logging out");
                self.logout();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStore;

    fn session() -> Session {
        Session::new(Box::new(MemoryTokenStore::default()))
    }

    #[test]
    fn test_login_marks_authenticated() {
        let mut s = session();
        assert!(!s.is_authenticated());

        s.login("lando", "acc-1", "ref-1").unwrap();
        assert!(s.is_authenticated());
        assert_eq!(s.access_token(), Some("acc-1"));
        assert_eq!(s.refresh_token(), Some("ref-1"));
        assert_eq!(s.username(), Some("lando"));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut s = session();
        s.login("lando", "acc-1", "ref-1").unwrap();

        s.logout();
        assert!(!s.is_authenticated());
        assert!(s.access_token().is_none());

        // A second logout leaves the session cleared with no error
        s.logout();
        assert!(!s.is_authenticated());
        assert!(s.refresh_token().is_none());
        assert!(s.username().is_none());
    }

    #[test]
    fn test_hydrates_from_store() {
        let store = MemoryTokenStore::default();
        store
            .save(&StoredTokens {
                access_token: Some("acc".to_string()),
                refresh_token: Some("ref".to_string()),
                username: Some("oscar".to_string()),
            })
            .unwrap();

        let s = Session::new(Box::new(store));
        assert!(s.is_authenticated());
        assert_eq!(s.username(), Some("oscar"));
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_logs_out() {
        let mut s = session();
        // Access token only; the refresh contract fails closed
        s.login("lando", "acc-1", "ref-1").unwrap();
        s.tokens.refresh_token = None;

        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert!(!s.refresh_access_token(&api).await);
        assert!(!s.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_network_failure_logs_out() {
        let mut s = session();
        s.login("lando", "acc-1", "ref-1").unwrap();

        // Port 9 (discard) refuses connections; the single attempt fails
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert!(!s.refresh_access_token(&api).await);
        assert!(!s.is_authenticated());
        assert!(s.refresh_token().is_none());
    }
}
