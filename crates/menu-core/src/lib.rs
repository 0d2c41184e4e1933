//! Core engine of the restaurant menu service.
//!
//! The engine owns storage, the order state machine and the event bus, and
//! exposes one handler per area of the back office (branches, catalog,
//! languages, users, settings, orders) plus the read views behind the
//! kitchen display, the order status screen, the public menu and the
//! dashboard.

pub mod builder;
pub mod engine;
pub mod handlers;
pub mod state;
pub mod views;

pub use builder::{BuilderError, MenuBuilder, MenuFactories};
pub use engine::{event_bus::EventBus, EngineError, MenuEngine};
pub use handlers::HandlerError;
pub use state::{OrderStateError, OrderStateMachine};
