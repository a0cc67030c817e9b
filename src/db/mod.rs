pub mod memory;
pub mod postgres;
pub mod redis;
pub mod sessions;
pub mod store;

pub use self::memory::InMemoryStore;
pub use self::postgres::{create_pool, run_migrations, PgStore};
pub use self::redis::{create_redis_client, RedisSessions};
pub use self::sessions::{InMemorySessions, SessionStore, SessionToken};
pub use self::store::RatingsStore;

#[cfg(test)]
pub use self::store::MockRatingsStore;
