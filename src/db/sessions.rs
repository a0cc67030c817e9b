use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display, str::FromStr, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::AppResult, models::UserId};

/// Longest session lifetime accepted, 30 days
pub const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Opaque bearer token handed out at login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub Uuid);

impl SessionToken {
    /// Creates a new random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Tracks which user a login token belongs to
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a session for the user and returns its token
    async fn create(&self, user_id: UserId) -> AppResult<SessionToken>;

    /// The user owning an unexpired token
    async fn resolve(&self, token: &SessionToken) -> AppResult<Option<UserId>>;

    /// Ends the session; unknown tokens are ignored
    async fn revoke(&self, token: &SessionToken) -> AppResult<()>;
}

/// Process-local sessions, lost on restart
#[derive(Clone)]
pub struct InMemorySessions {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<SessionToken, (UserId, DateTime<Utc>)>>>,
}

impl InMemorySessions {
    /// TTLs above [`MAX_SESSION_TTL_SECS`] are clamped to it
    pub fn new(ttl_secs: u64) -> Self {
        let ttl_secs = ttl_secs.min(MAX_SESSION_TTL_SECS) as i64;
        Self {
            ttl: Duration::seconds(ttl_secs),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessions {
    async fn create(&self, user_id: UserId) -> AppResult<SessionToken> {
        let token = SessionToken::generate();
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        // Drop every expired entry, not just tokens that are presented again
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Expired sessions purged");
        }

        sessions.insert(token, (user_id, now + self.ttl));
        Ok(token)
    }

    async fn resolve(&self, token: &SessionToken) -> AppResult<Option<UserId>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get(token).copied() {
            Some((user_id, expires_at)) if expires_at > now => Ok(Some(user_id)),
            Some(_) => {
                sessions.remove(token);
                tracing::debug!(token = %token, "Expired session dropped");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &SessionToken) -> AppResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
