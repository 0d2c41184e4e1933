//! Event types broadcast by the menu engine.
//!
//! Events flow through the engine's event bus. The kitchen display and the
//! order status screen subscribe to them over Server-Sent Events instead of
//! polling, and public menus refresh when the catalog or settings change.

use crate::{ItemStatus, Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all engine events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "snake_case")]
pub enum MenuEvent {
	Order(OrderEvent),
	Catalog(CatalogEvent),
	Settings(SettingsEvent),
}

/// Events from the order lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
	/// A new order reached the kitchen.
	Created { order: Order },
	/// One line moved along the kitchen workflow.
	ItemStatusChanged {
		order_id: String,
		number: u64,
		item_id: String,
		from: ItemStatus,
		to: ItemStatus,
	},
	/// The derived order-level status changed.
	StatusChanged {
		order_id: String,
		number: u64,
		from: OrderStatus,
		to: OrderStatus,
	},
	/// The order was removed from storage.
	Deleted { order_id: String, number: u64 },
}

impl OrderEvent {
	/// Name used for the SSE `event:` field.
	pub fn name(&self) -> &'static str {
		match self {
			OrderEvent::Created { .. } => "created",
			OrderEvent::ItemStatusChanged { .. } => "item_status_changed",
			OrderEvent::StatusChanged { .. } => "status_changed",
			OrderEvent::Deleted { .. } => "deleted",
		}
	}

	pub fn order_id(&self) -> &str {
		match self {
			OrderEvent::Created { order } => &order.id,
			OrderEvent::ItemStatusChanged { order_id, .. }
			| OrderEvent::StatusChanged { order_id, .. }
			| OrderEvent::Deleted { order_id, .. } => order_id,
		}
	}
}

/// Kinds of catalog records, used in change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogEntity {
	Branch,
	Table,
	Category,
	Item,
	FoodType,
	Material,
	Language,
}

/// Change of any record that feeds the public menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
	Upserted { entity: CatalogEntity, id: String },
	Deleted { entity: CatalogEntity, id: String },
}

/// Settings changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsEvent {
	Updated,
	Reset,
}
