pub mod sessions;

pub use sessions::create_redis_client;
pub use sessions::RedisSessions;
pub use sessions::SessionKey;
