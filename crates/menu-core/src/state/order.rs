//! Order state machine.
//!
//! Order lines move strictly forward, one step at a time:
//! `pending -> preparing -> ready -> served`. The order status is derived
//! from the lines after every change. Cancellation is the only direct
//! order-level transition and is terminal.
//!
//! Every mutation is a read-modify-write of the stored order performed
//! while holding one async lock, so concurrent kitchen taps never lose an
//! update and order numbers are never handed out twice.

use menu_storage::{StorageError, StorageService};
use menu_types::{current_timestamp, ItemStatus, Order, OrderStatus, StorageKey};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

const ORDER_NUMBER_COUNTER: &str = "order_number";

#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition { from: String, to: String },
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	#[error("Order item not found: {0}")]
	ItemNotFound(String),
}

impl From<StorageError> for OrderStateError {
	fn from(err: StorageError) -> Self {
		OrderStateError::Storage(err.to_string())
	}
}

/// One line that changed status during a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
	pub item_id: String,
	pub from: ItemStatus,
	pub to: ItemStatus,
}

/// Result of a mutation: the stored order and what changed.
#[derive(Debug, Clone)]
pub struct OrderTransition {
	pub order: Order,
	pub previous_status: OrderStatus,
	pub item_changes: Vec<ItemChange>,
}

impl OrderTransition {
	pub fn status_changed(&self) -> bool {
		self.previous_status != self.order.status
	}
}

static ITEM_TRANSITIONS: Lazy<HashMap<ItemStatus, HashSet<ItemStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(ItemStatus::Pending, HashSet::from([ItemStatus::Preparing]));
	m.insert(ItemStatus::Preparing, HashSet::from([ItemStatus::Ready]));
	m.insert(ItemStatus::Ready, HashSet::from([ItemStatus::Served]));
	m.insert(ItemStatus::Served, HashSet::new()); // terminal
	m
});

pub struct OrderStateMachine {
	storage: Arc<StorageService>,
	lock: Mutex<()>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			lock: Mutex::new(()),
		}
	}

	/// Checks a single-step line transition against the transition table.
	pub fn is_valid_transition(from: ItemStatus, to: ItemStatus) -> bool {
		ITEM_TRANSITIONS
			.get(&from)
			.is_some_and(|allowed| allowed.contains(&to))
	}

	pub async fn get(&self, order_id: &str) -> Result<Order, OrderStateError> {
		self.load(order_id).await
	}

	/// Stores a new order, stamping it with the next order number.
	///
	/// `build` receives the number and returns the order to persist; its
	/// status is derived from the lines before storing.
	pub async fn create<F>(&self, build: F) -> Result<Order, OrderStateError>
	where
		F: FnOnce(u64) -> Order,
	{
		let _guard = self.lock.lock().await;

		let number = self.next_order_number().await?;
		let mut order = build(number);
		order.refresh_status();

		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;
		Ok(order)
	}

	/// Moves one line a single step forward.
	pub async fn transition_item(
		&self,
		order_id: &str,
		item_id: &str,
		to: ItemStatus,
	) -> Result<OrderTransition, OrderStateError> {
		self.mutate(order_id, |order| {
			let item = order
				.items
				.iter_mut()
				.find(|item| item.id == item_id)
				.ok_or_else(|| OrderStateError::ItemNotFound(item_id.to_string()))?;

			if !Self::is_valid_transition(item.status, to) {
				return Err(OrderStateError::InvalidTransition {
					from: item.status.to_string(),
					to: to.to_string(),
				});
			}

			let change = ItemChange {
				item_id: item.id.clone(),
				from: item.status,
				to,
			};
			item.status = to;
			Ok(vec![change])
		})
		.await
	}

	/// Moves every line forward to `target`, stepping through each
	/// intermediate status. Lines already at `target` are left alone; a line
	/// past `target` rejects the whole call.
	pub async fn transition_order(
		&self,
		order_id: &str,
		target: ItemStatus,
	) -> Result<OrderTransition, OrderStateError> {
		self.mutate(order_id, |order| {
			if let Some(ahead) = order.items.iter().find(|item| item.status > target) {
				return Err(OrderStateError::InvalidTransition {
					from: ahead.status.to_string(),
					to: target.to_string(),
				});
			}

			let mut changes = Vec::new();
			for item in order.items.iter_mut().filter(|item| item.status < target) {
				let from = item.status;
				while item.status != target {
					let next = item
						.status
						.next()
						.filter(|next| Self::is_valid_transition(item.status, *next))
						.ok_or_else(|| OrderStateError::InvalidTransition {
							from: item.status.to_string(),
							to: target.to_string(),
						})?;
					item.status = next;
				}
				changes.push(ItemChange {
					item_id: item.id.clone(),
					from,
					to: target,
				});
			}
			Ok(changes)
		})
		.await
	}

	/// Cancels an order that has not been served yet.
	pub async fn cancel(&self, order_id: &str) -> Result<OrderTransition, OrderStateError> {
		let _guard = self.lock.lock().await;

		let mut order = self.load(order_id).await?;
		if matches!(order.status, OrderStatus::Served | OrderStatus::Cancelled) {
			return Err(OrderStateError::InvalidTransition {
				from: order.status.to_string(),
				to: OrderStatus::Cancelled.to_string(),
			});
		}

		let previous_status = order.status;
		order.status = OrderStatus::Cancelled;
		order.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;

		Ok(OrderTransition {
			order,
			previous_status,
			item_changes: Vec::new(),
		})
	}

	pub async fn delete(&self, order_id: &str) -> Result<Order, OrderStateError> {
		let _guard = self.lock.lock().await;

		let order = self.load(order_id).await?;
		self.storage
			.remove(StorageKey::Orders.as_str(), order_id)
			.await?;
		Ok(order)
	}

	/// Applies `change` to the stored order under the lock, then re-derives
	/// the order status and persists the result.
	async fn mutate<F>(&self, order_id: &str, change: F) -> Result<OrderTransition, OrderStateError>
	where
		F: FnOnce(&mut Order) -> Result<Vec<ItemChange>, OrderStateError>,
	{
		let _guard = self.lock.lock().await;

		let mut order = self.load(order_id).await?;
		if order.status == OrderStatus::Cancelled {
			return Err(OrderStateError::InvalidTransition {
				from: OrderStatus::Cancelled.to_string(),
				to: "any".to_string(),
			});
		}

		let previous_status = order.status;
		let item_changes = change(&mut order)?;
		if item_changes.is_empty() {
			return Ok(OrderTransition {
				order,
				previous_status,
				item_changes,
			});
		}

		order.refresh_status();
		order.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Orders.as_str(), &order.id, &order)
			.await?;

		Ok(OrderTransition {
			order,
			previous_status,
			item_changes,
		})
	}

	async fn load(&self, order_id: &str) -> Result<Order, OrderStateError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| match e {
				StorageError::NotFound => OrderStateError::OrderNotFound(order_id.to_string()),
				other => other.into(),
			})
	}

	/// Must be called with the lock held.
	async fn next_order_number(&self) -> Result<u64, OrderStateError> {
		let current: u64 = match self
			.storage
			.retrieve(StorageKey::Counters.as_str(), ORDER_NUMBER_COUNTER)
			.await
		{
			Ok(value) => value,
			Err(StorageError::NotFound) => 0,
			Err(e) => return Err(e.into()),
		};
		let next = current + 1;
		self.storage
			.store(StorageKey::Counters.as_str(), ORDER_NUMBER_COUNTER, &next)
			.await?;
		Ok(next)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use menu_storage::implementations::memory::MemoryStorage;
	use menu_types::OrderItem;
	use rust_decimal::Decimal;

	fn machine() -> OrderStateMachine {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		OrderStateMachine::new(storage)
	}

	fn draft(number: u64, lines: usize) -> Order {
		let items = (0..lines)
			.map(|i| OrderItem {
				id: format!("line-{}", i),
				menu_item_id: format!("item-{}", i),
				name: "Soup".into(),
				quantity: 1,
				unit_price: Decimal::new(500, 2),
				notes: None,
				status: ItemStatus::Pending,
			})
			.collect();
		Order {
			id: format!("order-{}", number),
			number,
			branch_id: None,
			table_id: None,
			customer_name: None,
			notes: None,
			items,
			status: OrderStatus::Pending,
			subtotal: Decimal::ZERO,
			tax: Decimal::ZERO,
			total: Decimal::ZERO,
			created_at: 0,
			updated_at: 0,
		}
	}

	#[tokio::test]
	async fn test_order_numbers_are_sequential() {
		let machine = machine();
		let first = machine.create(|n| draft(n, 1)).await.unwrap();
		let second = machine.create(|n| draft(n, 1)).await.unwrap();
		assert_eq!(first.number, 1);
		assert_eq!(second.number, 2);
	}

	#[tokio::test]
	async fn test_item_moves_forward_one_step() {
		let machine = machine();
		let order = machine.create(|n| draft(n, 2)).await.unwrap();

		let result = machine
			.transition_item(&order.id, "line-0", ItemStatus::Preparing)
			.await
			.unwrap();
		assert_eq!(result.order.status, OrderStatus::Preparing);
		assert!(result.status_changed());
		assert_eq!(
			result.item_changes,
			vec![ItemChange {
				item_id: "line-0".into(),
				from: ItemStatus::Pending,
				to: ItemStatus::Preparing,
			}]
		);
	}

	#[tokio::test]
	async fn test_skipping_or_going_back_is_rejected() {
		let machine = machine();
		let order = machine.create(|n| draft(n, 1)).await.unwrap();

		let skip = machine
			.transition_item(&order.id, "line-0", ItemStatus::Ready)
			.await;
		assert!(matches!(skip, Err(OrderStateError::InvalidTransition { .. })));

		machine
			.transition_item(&order.id, "line-0", ItemStatus::Preparing)
			.await
			.unwrap();
		let back = machine
			.transition_item(&order.id, "line-0", ItemStatus::Pending)
			.await;
		assert!(matches!(back, Err(OrderStateError::InvalidTransition { .. })));

		let same = machine
			.transition_item(&order.id, "line-0", ItemStatus::Preparing)
			.await;
		assert!(matches!(same, Err(OrderStateError::InvalidTransition { .. })));
	}

	#[tokio::test]
	async fn test_order_ready_only_when_every_item_ready() {
		let machine = machine();
		let order = machine.create(|n| draft(n, 2)).await.unwrap();

		machine
			.transition_order(&order.id, ItemStatus::Preparing)
			.await
			.unwrap();
		let one_ready = machine
			.transition_item(&order.id, "line-0", ItemStatus::Ready)
			.await
			.unwrap();
		assert_eq!(one_ready.order.status, OrderStatus::Preparing);

		let both_ready = machine
			.transition_item(&order.id, "line-1", ItemStatus::Ready)
			.await
			.unwrap();
		assert_eq!(both_ready.order.status, OrderStatus::Ready);
	}

	#[tokio::test]
	async fn test_transition_order_steps_through_intermediate_states() {
		let machine = machine();
		let order = machine.create(|n| draft(n, 2)).await.unwrap();
		machine
			.transition_item(&order.id, "line-0", ItemStatus::Preparing)
			.await
			.unwrap();

		let result = machine
			.transition_order(&order.id, ItemStatus::Ready)
			.await
			.unwrap();
		assert_eq!(result.order.status, OrderStatus::Ready);
		assert_eq!(result.item_changes.len(), 2);
		assert_eq!(result.item_changes[1].from, ItemStatus::Pending);

		let backwards = machine
			.transition_order(&order.id, ItemStatus::Preparing)
			.await;
		assert!(matches!(backwards, Err(OrderStateError::InvalidTransition { .. })));

		let noop = machine
			.transition_order(&order.id, ItemStatus::Ready)
			.await
			.unwrap();
		assert!(noop.item_changes.is_empty());
		assert!(!noop.status_changed());
	}

	#[tokio::test]
	async fn test_cancel_rules() {
		let machine = machine();
		let order = machine.create(|n| draft(n, 1)).await.unwrap();

		let cancelled = machine.cancel(&order.id).await.unwrap();
		assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
		assert_eq!(cancelled.previous_status, OrderStatus::Pending);

		assert!(machine.cancel(&order.id).await.is_err());
		let after = machine
			.transition_item(&order.id, "line-0", ItemStatus::Preparing)
			.await;
		assert!(matches!(after, Err(OrderStateError::InvalidTransition { .. })));

		let served = machine.create(|n| draft(n, 1)).await.unwrap();
		machine
			.transition_order(&served.id, ItemStatus::Served)
			.await
			.unwrap();
		assert!(machine.cancel(&served.id).await.is_err());
	}

	#[tokio::test]
	async fn test_missing_order_and_item() {
		let machine = machine();
		assert!(matches!(
			machine.get("nope").await,
			Err(OrderStateError::OrderNotFound(_))
		));

		let order = machine.create(|n| draft(n, 1)).await.unwrap();
		assert!(matches!(
			machine
				.transition_item(&order.id, "nope", ItemStatus::Preparing)
				.await,
			Err(OrderStateError::ItemNotFound(_))
		));

		machine.delete(&order.id).await.unwrap();
		assert!(matches!(
			machine.delete(&order.id).await,
			Err(OrderStateError::OrderNotFound(_))
		));
	}

	#[tokio::test]
	async fn test_concurrent_transitions_do_not_lose_updates() {
		let machine = Arc::new(machine());
		let order = machine.create(|n| draft(n, 8)).await.unwrap();

		let tasks: Vec<_> = (0..8)
			.map(|i| {
				let machine = machine.clone();
				let order_id = order.id.clone();
				tokio::spawn(async move {
					machine
						.transition_item(&order_id, &format!("line-{}", i), ItemStatus::Preparing)
						.await
				})
			})
			.collect();
		for task in tasks {
			task.await.unwrap().unwrap();
		}

		let stored = machine.get(&order.id).await.unwrap();
		assert!(stored
			.items
			.iter()
			.all(|item| item.status == ItemStatus::Preparing));
	}
}
