//! Adapters for the domain ports.

pub mod in_memory;
#[cfg(feature = "kafka")]
pub mod kafka;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
