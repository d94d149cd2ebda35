//! Session store implementations - Redis and in-memory.

mod memory;

pub use memory::InMemorySessionStore;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisSessionConfig, RedisSessionStore};
