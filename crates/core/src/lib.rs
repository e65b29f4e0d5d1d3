//! Core types, schemas, and aggregation contracts for the filter analytics log.

pub mod error;
pub mod events;
pub mod limits;
pub mod memory;
pub mod period;
pub mod store;
pub mod views;

pub use error::{Error, Result};
pub use events::*;
pub use memory::MemoryLogStore;
pub use period::Period;
pub use store::*;
pub use views::*;
