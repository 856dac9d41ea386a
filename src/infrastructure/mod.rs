//! Adapters behind the domain ports.

pub mod channel_presenter;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod scripted;
pub mod simulated;
