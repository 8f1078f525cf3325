/*
[INPUT]:  Auth sessions issued by the token/signup endpoints
[OUTPUT]: Token retrieval, principal identity and expiration status
[POS]:    Auth layer - session lifecycle management
[UPDATE]: When adding session persistence or changing storage strategy
*/

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{AuthSession, UserId};

/// Seconds before the real expiry at which a session counts as expired.
const EXPIRY_SKEW_SECONDS: i64 = 30;

/// Stored session with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: UserId,
    pub email: Option<String>,
}

impl SessionData {
    pub fn from_auth_session(session: &AuthSession) -> Self {
        let expires_at = session
            .expires_at
            .and_then(|epoch| DateTime::<Utc>::from_timestamp(epoch, 0))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(session.expires_in as i64));

        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at,
            user_id: session.user.id,
            email: session.user.email.clone(),
        }
    }
}

/// Thread-safe holder of the signed-in principal's session
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    data: Arc<RwLock<Option<SessionData>>>,
}

impl SessionManager {
    /// Create a new empty session holder
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a session returned by the auth API
    pub fn set_session(&self, session: &AuthSession) {
        self.set(SessionData::from_auth_session(session));
    }

    pub fn set(&self, data: SessionData) {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(data);
    }

    /// Get the current access token if available
    pub fn access_token(&self) -> Option<String> {
        self.read(|data| data.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(|data| data.refresh_token.clone())
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.read(|data| data.user_id)
    }

    pub fn is_signed_in(&self) -> bool {
        self.read(|_| ()).is_some()
    }

    /// Check if the session is missing or about to expire
    pub fn is_expired(&self) -> bool {
        self.read(|data| Utc::now() + Duration::seconds(EXPIRY_SKEW_SECONDS) >= data.expires_at)
            .unwrap_or(true)
    }

    /// Get session data if available
    pub fn session_data(&self) -> Option<SessionData> {
        self.read(Clone::clone)
    }

    /// Clear the stored session
    pub fn clear(&self) {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    fn read<T>(&self, f: impl FnOnce(&SessionData) -> T) -> Option<T> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(f)
    }
}
