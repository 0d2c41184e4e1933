//! Read models served to the displays, the public menu and the dashboard.

use crate::{
	Branch, ItemStatus, Order, OrderItem, OrderStatus, Permission, QrDotStyle, QrErrorCorrection,
	Role, Table, TextDirection,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One order as shown on the kitchen display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenTicket {
	pub order_id: String,
	pub number: u64,
	pub status: OrderStatus,
	pub branch_id: Option<String>,
	pub table_id: Option<String>,
	/// Table label, resolved for display.
	pub table_number: Option<String>,
	pub customer_name: Option<String>,
	pub notes: Option<String>,
	pub items: Vec<OrderItem>,
	pub created_at: u64,
	/// Seconds since the order was placed.
	pub age_seconds: u64,
}

/// Entry of the customer-facing order status screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusScreenEntry {
	pub number: u64,
	pub table_number: Option<String>,
	pub updated_at: u64,
}

/// The order status screen: numbers in progress and numbers to collect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusScreen {
	/// Orders that are pending or being prepared, oldest first.
	pub preparing: Vec<StatusScreenEntry>,
	/// Orders ready for pickup or serving, most recently ready first.
	pub ready: Vec<StatusScreenEntry>,
}

/// QR rendering hints derived from settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrStyle {
	pub foreground_color: String,
	pub background_color: String,
	pub size: u32,
	pub margin: u32,
	pub error_correction: QrErrorCorrection,
	pub dot_style: QrDotStyle,
	pub logo_url: Option<String>,
}

/// Public menu link of a table plus the styling for its QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuLink {
	pub table_id: String,
	pub branch_id: String,
	pub url: String,
	pub qr: QrStyle,
}

/// What a customer sees after scanning a table QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLanding {
	pub table: Table,
	pub branch: Branch,
}

/// Branding and toggles exposed to the public menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicRestaurant {
	pub name: String,
	pub description: String,
	pub logo_url: Option<String>,
	pub primary_color: String,
	pub accent_color: String,
	pub currency: String,
	pub currency_symbol: String,
	pub contact_phone: Option<String>,
	pub contact_email: Option<String>,
	pub contact_address: Option<String>,
	pub opening_hours: Option<String>,
	pub footer_text: String,
	pub show_images: bool,
	pub show_descriptions: bool,
	pub show_allergens: bool,
	pub show_food_types: bool,
	pub show_calories: bool,
	pub enable_ordering: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicLanguage {
	pub code: String,
	pub name: String,
	pub native_name: Option<String>,
	pub direction: TextDirection,
	pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicFoodType {
	pub id: String,
	pub name: String,
	pub icon: Option<String>,
	pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicMaterial {
	pub id: String,
	pub name: String,
	pub is_allergen: bool,
}

/// An item resolved into one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicMenuItem {
	pub id: String,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Omitted when prices are hidden in settings.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub price: Option<Decimal>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	pub food_types: Vec<PublicFoodType>,
	pub materials: Vec<PublicMaterial>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub calories: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub preparation_minutes: Option<u32>,
	pub is_featured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicCategory {
	pub id: String,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	pub items: Vec<PublicMenuItem>,
}

/// The whole public menu in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicMenu {
	/// Language the text was resolved to.
	pub language: String,
	pub direction: TextDirection,
	pub languages: Vec<PublicLanguage>,
	pub restaurant: PublicRestaurant,
	/// Branch the menu was opened for, when scanned from a table.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub branch: Option<Branch>,
	pub categories: Vec<PublicCategory>,
}

/// Customer-facing order tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicOrderStatus {
	pub id: String,
	pub number: u64,
	pub status: OrderStatus,
	pub items: Vec<PublicOrderLine>,
	pub total: Decimal,
	pub created_at: u64,
	pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicOrderLine {
	pub name: String,
	pub quantity: u32,
	pub status: ItemStatus,
}

impl From<Order> for PublicOrderStatus {
	fn from(order: Order) -> Self {
		Self {
			id: order.id,
			number: order.number,
			status: order.status,
			items: order
				.items
				.into_iter()
				.map(|item| PublicOrderLine {
					name: item.name,
					quantity: item.quantity,
					status: item.status,
				})
				.collect(),
			total: order.total,
			created_at: order.created_at,
			updated_at: order.updated_at,
		}
	}
}

/// Role with its permission set, for the users admin page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleInfo {
	pub role: Role,
	pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCounts {
	pub branches: usize,
	pub tables: usize,
	pub categories: usize,
	pub items: usize,
	pub users: usize,
	pub languages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopItem {
	pub menu_item_id: String,
	pub name: String,
	pub quantity: u64,
}

/// Summary numbers behind the admin dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
	pub counts: EntityCounts,
	pub active_orders: usize,
	pub orders_today: usize,
	pub revenue_today: Decimal,
	pub orders_by_status: BTreeMap<String, usize>,
	pub top_items: Vec<TopItem>,
}
