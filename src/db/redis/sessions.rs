use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::db::sessions::{SessionStore, SessionToken, MAX_SESSION_TTL_SECS};
use crate::error::AppResult;
use crate::models::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Session(SessionToken),
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKey::Session(token) => write!(f, "session:{}", token),
        }
    }
}

/// Creates a Redis client for session storage
///
/// Connections are multiplexed per call, so the client itself is cheap to clone.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Sessions kept in Redis so they survive restarts and are shared between instances
#[derive(Clone)]
pub struct RedisSessions {
    redis_client: Client,
    ttl_secs: u64,
}

impl RedisSessions {
    /// `SET EX` rejects a zero expiry, so the TTL is kept within 1..=[`MAX_SESSION_TTL_SECS`]
    pub fn new(redis_client: Client, ttl_secs: u64) -> Self {
        Self {
            redis_client,
            ttl_secs: ttl_secs.clamp(1, MAX_SESSION_TTL_SECS),
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessions {
    async fn create(&self, user_id: UserId) -> AppResult<SessionToken> {
        let token = SessionToken::generate();
        let key = SessionKey::Session(token);

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .set_ex(format!("{}", key), user_id, self.ttl_secs)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Redis set failed");
                e
            })?;

        tracing::debug!(user_id, ttl = self.ttl_secs, "Session stored");

        Ok(token)
    }

    async fn resolve(&self, token: &SessionToken) -> AppResult<Option<UserId>> {
        let key = SessionKey::Session(*token);
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let user_id: Option<UserId> = conn.get(format!("{}", key)).await?;
        Ok(user_id)
    }

    async fn revoke(&self, token: &SessionToken) -> AppResult<()> {
        let key = SessionKey::Session(*token);
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(format!("{}", key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_session_key_display() {
        let token = SessionToken(Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap());
        let key = SessionKey::Session(token);
        assert_eq!(
            format!("{}", key),
            "session:67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    #[test]
    fn test_ttl_kept_within_redis_bounds() {
        let client = create_redis_client("redis://localhost:6379").unwrap();
        assert_eq!(RedisSessions::new(client.clone(), 0).ttl_secs, 1);
        assert_eq!(
            RedisSessions::new(client.clone(), u64::MAX).ttl_secs,
            MAX_SESSION_TTL_SECS
        );
        assert_eq!(RedisSessions::new(client, 60).ttl_secs, 60);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn test_session_lifecycle_against_redis() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = create_redis_client(&redis_url).unwrap();
        let sessions = RedisSessions::new(client, 60);

        let token = sessions.create(11).await.unwrap();
        assert_eq!(sessions.resolve(&token).await.unwrap(), Some(11));

        sessions.revoke(&token).await.unwrap();
        assert_eq!(sessions.resolve(&token).await.unwrap(), None);
    }
}
