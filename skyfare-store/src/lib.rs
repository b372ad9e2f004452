pub mod app_config;
pub mod redis_cache;

pub use app_config::AppConfig;
pub use redis_cache::RedisCache;
