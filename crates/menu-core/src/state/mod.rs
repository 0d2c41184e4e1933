//! State management for orders.

pub mod order;

pub use order::{ItemChange, OrderStateError, OrderStateMachine, OrderTransition};
