//! Common types module for the restaurant menu service.
//!
//! This module defines the entities, request/response shapes and events
//! shared by every crate of the menu service. Keeping them in one place
//! ensures storage, engine and HTTP layers agree on the wire format.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Branches and their tables.
pub mod branch;
/// Menu taxonomy: categories, items, food types and materials.
pub mod catalog;
/// Event types broadcast to kitchen and status displays.
pub mod events;
/// Menu languages.
pub mod language;
/// Orders, order lines and their statuses.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Secret string type that never leaks into logs.
pub mod secret_string;
/// The flat restaurant settings record.
pub mod settings;
/// Storage namespaces.
pub mod storage;
/// Staff accounts and roles.
pub mod user;
/// Utility functions for formatting and timestamps.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;
/// Read models served to displays, the public menu and the dashboard.
pub mod views;

// Re-export all types for convenient access
pub use api::*;
pub use branch::*;
pub use catalog::*;
pub use events::*;
pub use language::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use settings::*;
pub use storage::*;
pub use user::*;
pub use utils::{current_timestamp, resolve_text, truncate_id};
pub use validation::*;
pub use views::*;
