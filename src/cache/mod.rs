//! Cache Module
//!
//! Cache-aside acceleration for search results and the auxiliary hot-query
//! ranking. The key-value store itself is an external collaborator behind
//! [`CacheStore`].
//!
//! ## Architecture
//! - **Reads** are synchronous from the request's point of view and bounded by
//!   a short timeout. Any failure is logged and treated as a miss.
//! - **Writes** never block a request. They are queued on the
//!   [`WriteBackQueue`], drained by a single background worker, and failures
//!   are logged and discarded. The queue drains on shutdown.
//! - Concurrent misses for the same key are not deduplicated: each one
//!   fetches from the backend and queues its own write, last write wins.
//!
//! ## Submodules
//! - **`store`**: `CacheStore` trait and the in-process `MemoryStore`.
//! - **`redis_store`**: `CacheStore` over a shared Redis connection manager.
//! - **`write_back`**: bounded fire-and-forget write queue.
//! - **`aside`**: the get-or-fetch orchestrator.

pub mod aside;
pub mod redis_store;
pub mod store;
pub mod write_back;

pub use aside::CacheAside;
pub use redis_store::RedisStore;
pub use store::{CacheStore, MemoryStore, SWEEP_EVERY_WRITES};
pub use write_back::{WriteBackJob, WriteBackQueue, WriteBackStats};

/// Sorted set holding query popularity counts.
pub const HOT_QUERIES_SET: &str = "hot_queries";
