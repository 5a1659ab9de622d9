//! Store adapters implementing every persistence port.
//!
//! - [`memory`]: thread-safe in-process store for tests and embedding
//! - [`postgres`]: Diesel-backed `PostgreSQL` store

pub mod memory;
pub mod postgres;
