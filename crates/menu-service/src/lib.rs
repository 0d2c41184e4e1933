//! HTTP surface of the restaurant menu service.
//!
//! The binary in `main.rs` wires these together; integration tests drive
//! [`server::build_router`] directly.

pub mod apis;
pub mod factory_registry;
pub mod server;
