//! lfukit: bounded in-memory LFU cache with eviction-factor batched eviction.
//!
//! The cache keys entries in a hash index and tracks access frequency in a
//! fixed table of frequency deques; see [`policy::lfu`] for the algorithm and
//! [`ds`] for the building blocks.

pub mod ds;
pub mod error;
pub mod policy;

pub use error::ConfigError;
#[cfg(feature = "concurrency")]
pub use policy::lfu::ConcurrentLfuCache;
pub use policy::lfu::LfuCache;
