//! Client side of the filter analytics log.
//!
//! Resolves stable user/device identity from a local key-value store,
//! classifies the device, and emits log events without ever failing the
//! caller.

pub mod config;
pub mod device;
pub mod emitter;
pub mod http_sink;
pub mod identity;
pub mod storage;

pub use config::*;
pub use device::DeviceClass;
pub use emitter::EventEmitter;
pub use http_sink::HttpLogSink;
pub use identity::{IdentityProvider, IdentityStore};
pub use storage::{KeyValueStore, MemoryStorage, SledStorage};
