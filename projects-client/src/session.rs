use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

/// Token material for the current authenticated session.
///
/// Replaced wholesale on login/refresh, never partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionToken {
    pub access_token: String,
    /// Absent means the token carries no known expiry
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    pub fn new<S: Into<String>>(access_token: S, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if at <= Utc::now())
    }
}

/// Source of bearer credentials for outbound API calls.
///
/// Retrieval is async because an implementation may need a network round
/// trip to the STS to refresh. Returning `None` means the call goes out
/// without a credential; the server is the authority on validity.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// Explicitly owned holder of the session's token.
///
/// A single writer replaces the value atomically on login/refresh and clears
/// it on logout; readers take a snapshot copy, so they observe either the
/// old or the new complete value, never a partial one. Clones share the same
/// cell.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<SessionToken>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current token, if any
    pub fn get(&self) -> Option<SessionToken> {
        self.inner.read().expect("session lock poisoned").clone()
    }

    /// Replace the session token wholesale (login or refresh)
    pub fn replace(&self, token: SessionToken) {
        *self.inner.write().expect("session lock poisoned") = Some(token);
    }

    /// Drop the session token (logout)
    pub fn clear(&self) {
        *self.inner.write().expect("session lock poisoned") = None;
    }
}

#[async_trait]
impl TokenProvider for SessionStore {
    async fn access_token(&self) -> Option<String> {
        self.get()
            .filter(|token| !token.is_expired())
            .map(|token| token.access_token)
    }
}
