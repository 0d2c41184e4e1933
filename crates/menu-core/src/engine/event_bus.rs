//! Broadcast channel carrying [`MenuEvent`]s from handlers to subscribers.
//!
//! The SSE endpoints and the engine's own logging loop each hold a
//! receiver. Slow subscribers lag and skip events rather than blocking
//! publishers.

use menu_types::MenuEvent;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<MenuEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<MenuEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event. Having no subscribers is not an error.
	pub fn publish(&self, event: MenuEvent) {
		if self.sender.send(event).is_err() {
			tracing::trace!("Event published with no active subscribers");
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(1000)
	}
}
