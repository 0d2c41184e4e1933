//! Order placement and the kitchen workflow.
//!
//! Placement checks the cart against the catalog and the table, snapshots
//! names and prices, and hands the order to the [`OrderStateMachine`].
//! Every status change is published on the event bus for the displays.

use super::{load, new_id, settings::SettingsHandler, HandlerError};
use crate::engine::event_bus::EventBus;
use crate::state::{OrderStateMachine, OrderTransition};
use menu_config::OrdersConfig;
use menu_storage::StorageService;
use menu_types::{
	current_timestamp, resolve_text, truncate_id, Branch, CreateOrderRequest, ItemStatus,
	MenuEvent, MenuItem, Order, OrderEvent, OrderItem, OrderQuery, OrderStatus, PublicOrderStatus,
	StorageKey, Table,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use validator::Validate;

pub struct OrderHandler {
	storage: Arc<StorageService>,
	state_machine: Arc<OrderStateMachine>,
	settings: Arc<SettingsHandler>,
	event_bus: EventBus,
	limits: OrdersConfig,
}

impl OrderHandler {
	pub fn new(
		storage: Arc<StorageService>,
		state_machine: Arc<OrderStateMachine>,
		settings: Arc<SettingsHandler>,
		event_bus: EventBus,
		limits: OrdersConfig,
	) -> Self {
		Self {
			storage,
			state_machine,
			settings,
			event_bus,
			limits,
		}
	}

	/// Places an order on behalf of staff.
	pub async fn create(&self, request: CreateOrderRequest) -> Result<Order, HandlerError> {
		request.validate()?;
		self.check_limits(&request)?;

		let settings = self.settings.get().await?;
		let (branch_id, table_id) = self
			.resolve_location(request.branch_id.as_deref(), request.table_id.as_deref())
			.await?;

		let mut items = Vec::with_capacity(request.items.len());
		for line in &request.items {
			let menu_item = self.available_item(&line.menu_item_id).await?;
			let name = resolve_text(
				&menu_item.name,
				&settings.default_language,
				&settings.default_language,
			)
			.unwrap_or(&menu_item.id)
			.to_string();

			items.push(OrderItem {
				id: new_id(),
				menu_item_id: menu_item.id,
				name,
				quantity: line.quantity,
				unit_price: menu_item.price,
				notes: line.notes.clone(),
				status: ItemStatus::Pending,
			});
		}

		// Totals are settled before a number is drawn.
		let now = current_timestamp();
		let mut draft = Order {
			id: new_id(),
			number: 0,
			branch_id,
			table_id,
			customer_name: request.customer_name,
			notes: request.notes,
			items,
			status: OrderStatus::Pending,
			subtotal: Decimal::ZERO,
			tax: Decimal::ZERO,
			total: Decimal::ZERO,
			created_at: now,
			updated_at: now,
		};
		draft.recalculate_totals(settings.tax_rate)?;

		let order = self
			.state_machine
			.create(move |number| Order { number, ..draft })
			.await?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			number = order.number,
			lines = order.items.len(),
			total = %order.total,
			"Order created"
		);
		self.event_bus.publish(MenuEvent::Order(OrderEvent::Created {
			order: order.clone(),
		}));
		Ok(order)
	}

	/// Places an order from the public menu, if ordering is enabled.
	pub async fn create_public(&self, request: CreateOrderRequest) -> Result<Order, HandlerError> {
		if !self.settings.get().await?.enable_ordering {
			return Err(HandlerError::Disabled("online ordering is disabled".into()));
		}
		self.create(request).await
	}

	pub async fn get(&self, id: &str) -> Result<Order, HandlerError> {
		Ok(self.state_machine.get(id).await?)
	}

	/// Orders matching the query, newest first.
	pub async fn list(&self, query: &OrderQuery) -> Result<Vec<Order>, HandlerError> {
		let mut orders = self.all().await?;
		orders.retain(|order| {
			query.status.is_none_or(|status| order.status == status)
				&& query
					.branch_id
					.as_deref()
					.is_none_or(|branch| order.branch_id.as_deref() == Some(branch))
		});
		orders.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| b.number.cmp(&a.number))
		});
		Ok(orders)
	}

	/// Every stored order, unsorted.
	pub async fn all(&self) -> Result<Vec<Order>, HandlerError> {
		Ok(self.storage.list(StorageKey::Orders.as_str()).await?)
	}

	pub async fn delete(&self, id: &str) -> Result<(), HandlerError> {
		let order = self.state_machine.delete(id).await?;
		tracing::info!(order_id = %truncate_id(&order.id), number = order.number, "Order deleted");
		self.event_bus.publish(MenuEvent::Order(OrderEvent::Deleted {
			order_id: order.id,
			number: order.number,
		}));
		Ok(())
	}

	pub async fn transition_item(
		&self,
		order_id: &str,
		item_id: &str,
		status: ItemStatus,
	) -> Result<Order, HandlerError> {
		let transition = self
			.state_machine
			.transition_item(order_id, item_id, status)
			.await?;
		Ok(self.publish_transition(transition))
	}

	pub async fn transition_order(
		&self,
		order_id: &str,
		status: ItemStatus,
	) -> Result<Order, HandlerError> {
		let transition = self
			.state_machine
			.transition_order(order_id, status)
			.await?;
		Ok(self.publish_transition(transition))
	}

	pub async fn cancel(&self, order_id: &str) -> Result<Order, HandlerError> {
		let transition = self.state_machine.cancel(order_id).await?;
		Ok(self.publish_transition(transition))
	}

	/// What a customer may see about their order.
	pub async fn public_status(&self, id: &str) -> Result<PublicOrderStatus, HandlerError> {
		Ok(self.get(id).await?.into())
	}

	fn check_limits(&self, request: &CreateOrderRequest) -> Result<(), HandlerError> {
		if request.items.len() > self.limits.max_items_per_order {
			return Err(HandlerError::Validation(format!(
				"an order may have at most {} lines, got {}",
				self.limits.max_items_per_order,
				request.items.len()
			)));
		}
		if let Some(line) = request
			.items
			.iter()
			.find(|line| line.quantity > self.limits.max_quantity_per_item)
		{
			return Err(HandlerError::Validation(format!(
				"quantity {} of '{}' exceeds the limit of {}",
				line.quantity, line.menu_item_id, self.limits.max_quantity_per_item
			)));
		}
		Ok(())
	}

	/// Checks the table and branch of a new order. The branch is taken from
	/// the table when the request omits it.
	async fn resolve_location(
		&self,
		branch_id: Option<&str>,
		table_id: Option<&str>,
	) -> Result<(Option<String>, Option<String>), HandlerError> {
		let Some(table_id) = table_id else {
			if let Some(branch_id) = branch_id {
				self.referenced::<Branch>(StorageKey::Branches, "branch", branch_id)
					.await?;
			}
			return Ok((branch_id.map(str::to_string), None));
		};

		let table: Table = self
			.referenced(StorageKey::Tables, "table", table_id)
			.await?;
		if !table.is_active {
			return Err(HandlerError::Unprocessable(format!(
				"table '{}' is not active",
				table.number
			)));
		}
		if let Some(branch_id) = branch_id {
			if branch_id != table.branch_id {
				return Err(HandlerError::Unprocessable(format!(
					"table '{}' does not belong to branch '{}'",
					table.number, branch_id
				)));
			}
		}
		Ok((Some(table.branch_id), Some(table.id)))
	}

	async fn available_item(&self, id: &str) -> Result<MenuItem, HandlerError> {
		let item: MenuItem = self.referenced(StorageKey::Items, "menu item", id).await?;
		if !item.is_available {
			return Err(HandlerError::Unprocessable(format!(
				"menu item '{}' is not available",
				id
			)));
		}
		Ok(item)
	}

	/// Loads a record named in the request body; a miss is unprocessable
	/// rather than a 404 of the order route itself.
	async fn referenced<T: serde::de::DeserializeOwned>(
		&self,
		namespace: StorageKey,
		label: &'static str,
		id: &str,
	) -> Result<T, HandlerError> {
		load(&self.storage, namespace.as_str(), label, id)
			.await
			.map_err(|e| match e {
				HandlerError::NotFound { .. } => {
					HandlerError::Unprocessable(format!("{} '{}' does not exist", label, id))
				}
				other => other,
			})
	}

	fn publish_transition(&self, transition: OrderTransition) -> Order {
		let status_changed = transition.status_changed();
		let OrderTransition {
			order,
			previous_status,
			item_changes,
		} = transition;

		for change in item_changes {
			self.event_bus
				.publish(MenuEvent::Order(OrderEvent::ItemStatusChanged {
					order_id: order.id.clone(),
					number: order.number,
					item_id: change.item_id,
					from: change.from,
					to: change.to,
				}));
		}

		if status_changed {
			tracing::info!(
				order_id = %truncate_id(&order.id),
				number = order.number,
				from = %previous_status,
				to = %order.status,
				"Order status changed"
			);
			self.event_bus.publish(MenuEvent::Order(OrderEvent::StatusChanged {
				order_id: order.id.clone(),
				number: order.number,
				from: previous_status,
				to: order.status,
			}));
		}
		order
	}
}
