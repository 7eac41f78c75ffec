//! Infrastructure adapters: the in-process event bus, receipt stores, and the
//! simulated payment gateway.

pub mod event_bus;
pub mod gateway;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
