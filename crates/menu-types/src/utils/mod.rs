//! Utility functions shared across the menu service.

pub mod formatting;
pub mod helpers;
pub mod text;

pub use formatting::truncate_id;
pub use helpers::current_timestamp;
pub use text::resolve_text;
