//! Kitchen display, order status screen, public menu and dashboard.
//!
//! Loads the records each screen needs and hands them to the pure builders
//! in [`crate::views`].

use super::{load, order::OrderHandler, settings::SettingsHandler, HandlerError};
use crate::views::{self, MenuSource};
use menu_storage::StorageService;
use menu_types::{
	current_timestamp, Branch, DashboardSummary, EntityCounts, KitchenTicket, MenuQuery,
	PublicMenu, StatusScreen, StorageKey, Table,
};
use std::sync::Arc;

pub struct DisplayHandler {
	storage: Arc<StorageService>,
	settings: Arc<SettingsHandler>,
	orders: Arc<OrderHandler>,
}

impl DisplayHandler {
	pub fn new(
		storage: Arc<StorageService>,
		settings: Arc<SettingsHandler>,
		orders: Arc<OrderHandler>,
	) -> Self {
		Self {
			storage,
			settings,
			orders,
		}
	}

	pub async fn kitchen_tickets(
		&self,
		branch_id: Option<&str>,
	) -> Result<Vec<KitchenTicket>, HandlerError> {
		if !self.settings.get().await?.enable_kitchen_display {
			return Err(HandlerError::Disabled("the kitchen display is disabled".into()));
		}

		let orders = self.orders.all().await?;
		let tables = views::index_tables(self.tables().await?);
		Ok(views::kitchen_tickets(
			&orders,
			&tables,
			branch_id,
			current_timestamp(),
		))
	}

	pub async fn status_screen(&self, branch_id: Option<&str>) -> Result<StatusScreen, HandlerError> {
		let settings = self.settings.get().await?;
		if !settings.enable_order_status_screen {
			return Err(HandlerError::Disabled(
				"the order status screen is disabled".into(),
			));
		}

		let orders = self.orders.all().await?;
		let tables = views::index_tables(self.tables().await?);
		Ok(views::status_screen(
			&orders,
			&tables,
			branch_id,
			current_timestamp(),
			settings.status_screen_ready_seconds,
		))
	}

	/// The public menu. A branch, when given, must exist and be active.
	pub async fn public_menu(&self, query: &MenuQuery) -> Result<PublicMenu, HandlerError> {
		let branch = match query.branch_id.as_deref() {
			Some(id) => {
				let branch: Branch =
					load(&self.storage, StorageKey::Branches.as_str(), "Branch", id).await?;
				if !branch.is_active {
					return Err(HandlerError::NotFound {
						entity: "Branch",
						id: id.to_string(),
					});
				}
				Some(branch)
			}
			None => None,
		};

		let source = MenuSource {
			settings: self.settings.get().await?,
			languages: self.storage.list(StorageKey::Languages.as_str()).await?,
			categories: self.storage.list(StorageKey::Categories.as_str()).await?,
			items: self.storage.list(StorageKey::Items.as_str()).await?,
			food_types: self.storage.list(StorageKey::FoodTypes.as_str()).await?,
			materials: self.storage.list(StorageKey::Materials.as_str()).await?,
			branch,
		};
		Ok(views::build_public_menu(source, query.lang.as_deref()))
	}

	pub async fn dashboard(&self) -> Result<DashboardSummary, HandlerError> {
		let counts = EntityCounts {
			branches: self.count(StorageKey::Branches).await?,
			tables: self.count(StorageKey::Tables).await?,
			categories: self.count(StorageKey::Categories).await?,
			items: self.count(StorageKey::Items).await?,
			users: self.count(StorageKey::Users).await?,
			languages: self.count(StorageKey::Languages).await?,
		};
		let orders = self.orders.all().await?;
		Ok(views::summarize(counts, &orders, chrono::Utc::now())?)
	}

	async fn tables(&self) -> Result<Vec<Table>, HandlerError> {
		Ok(self.storage.list(StorageKey::Tables.as_str()).await?)
	}

	async fn count(&self, namespace: StorageKey) -> Result<usize, HandlerError> {
		Ok(self.storage.count(namespace.as_str()).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::handlers::test_support::{bus, storage};
	use crate::state::OrderStateMachine;
	use menu_config::OrdersConfig;
	use menu_types::{CreateOrderRequest, ItemStatus, LocalizedText, MenuItem, OrderLineRequest};
	use rust_decimal::Decimal;

	struct Fixture {
		display: DisplayHandler,
		orders: Arc<OrderHandler>,
		settings: Arc<SettingsHandler>,
		storage: Arc<StorageService>,
	}

	async fn fixture() -> Fixture {
		let storage = storage();
		let bus = bus();
		let settings = Arc::new(SettingsHandler::new(storage.clone(), bus.clone(), 1024));
		let orders = Arc::new(OrderHandler::new(
			storage.clone(),
			Arc::new(OrderStateMachine::new(storage.clone())),
			settings.clone(),
			bus,
			OrdersConfig::default(),
		));
		let item = MenuItem {
			id: "soup".into(),
			category_id: "c".into(),
			name: LocalizedText::from([("en".to_string(), "Soup".to_string())]),
			description: LocalizedText::new(),
			price: Decimal::new(500, 2),
			image_url: None,
			food_type_ids: vec![],
			material_ids: vec![],
			calories: None,
			preparation_minutes: None,
			is_available: true,
			is_featured: false,
			sort_order: 0,
			created_at: 0,
			updated_at: 0,
		};
		storage
			.store(StorageKey::Items.as_str(), &item.id, &item)
			.await
			.unwrap();

		Fixture {
			display: DisplayHandler::new(storage.clone(), settings.clone(), orders.clone()),
			orders,
			settings,
			storage,
		}
	}

	fn cart() -> CreateOrderRequest {
		CreateOrderRequest {
			branch_id: None,
			table_id: None,
			customer_name: None,
			notes: None,
			items: vec![OrderLineRequest {
				menu_item_id: "soup".into(),
				quantity: 2,
				notes: None,
			}],
		}
	}

	#[tokio::test]
	async fn test_kitchen_and_status_screen_follow_orders() {
		let f = fixture().await;
		let order = f.orders.create(cart()).await.unwrap();

		let tickets = f.display.kitchen_tickets(None).await.unwrap();
		assert_eq!(tickets.len(), 1);
		assert_eq!(tickets[0].number, order.number);

		f.orders
			.transition_order(&order.id, ItemStatus::Ready)
			.await
			.unwrap();
		let screen = f.display.status_screen(None).await.unwrap();
		assert!(screen.preparing.is_empty());
		assert_eq!(screen.ready[0].number, order.number);

		f.orders
			.transition_order(&order.id, ItemStatus::Served)
			.await
			.unwrap();
		assert!(f.display.kitchen_tickets(None).await.unwrap().is_empty());
		assert_eq!(f.display.status_screen(None).await.unwrap(), StatusScreen::default());
	}

	#[tokio::test]
	async fn test_displays_can_be_disabled() {
		let f = fixture().await;
		f.settings
			.update(serde_json::json!({
				"enable_kitchen_display": false,
				"enable_order_status_screen": false
			}))
			.await
			.unwrap();

		assert!(matches!(
			f.display.kitchen_tickets(None).await,
			Err(HandlerError::Disabled(_))
		));
		assert!(matches!(
			f.display.status_screen(None).await,
			Err(HandlerError::Disabled(_))
		));
	}

	#[tokio::test]
	async fn test_public_menu_rejects_inactive_branch() {
		let f = fixture().await;
		let closed = Branch {
			id: "b1".into(),
			name: "Old Town".into(),
			address: None,
			phone: None,
			is_active: false,
			created_at: 0,
			updated_at: 0,
		};
		f.storage
			.store(StorageKey::Branches.as_str(), &closed.id, &closed)
			.await
			.unwrap();

		let query = MenuQuery {
			lang: None,
			branch_id: Some("b1".into()),
		};
		assert!(matches!(
			f.display.public_menu(&query).await,
			Err(HandlerError::NotFound { .. })
		));
		let menu = f.display.public_menu(&MenuQuery::default()).await.unwrap();
		assert_eq!(menu.language, "en");
		assert!(menu.branch.is_none());
	}

	#[tokio::test]
	async fn test_dashboard_counts() {
		let f = fixture().await;
		f.orders.create(cart()).await.unwrap();

		let summary = f.display.dashboard().await.unwrap();
		assert_eq!(summary.counts.items, 1);
		assert_eq!(summary.active_orders, 1);
		assert_eq!(summary.orders_today, 1);
		assert_eq!(summary.revenue_today, Decimal::new(1000, 2));
		assert_eq!(summary.top_items[0].quantity, 2);
	}
}
