//! Order types for the kitchen workflow.
//!
//! Each order line moves through `pending -> preparing -> ready -> served`.
//! The order-level status is never set directly (except for cancellation);
//! it is derived from the line statuses by [`Order::derive_status`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Status of a single order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
	Pending,
	Preparing,
	Ready,
	Served,
}

impl ItemStatus {
	/// The next step in the kitchen workflow, if any.
	pub fn next(&self) -> Option<ItemStatus> {
		match self {
			ItemStatus::Pending => Some(ItemStatus::Preparing),
			ItemStatus::Preparing => Some(ItemStatus::Ready),
			ItemStatus::Ready => Some(ItemStatus::Served),
			ItemStatus::Served => None,
		}
	}
}

impl fmt::Display for ItemStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ItemStatus::Pending => "pending",
			ItemStatus::Preparing => "preparing",
			ItemStatus::Ready => "ready",
			ItemStatus::Served => "served",
		};
		f.write_str(name)
	}
}

/// Aggregated status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
	Pending,
	Preparing,
	Ready,
	Served,
	Cancelled,
}

impl OrderStatus {
	/// Orders the kitchen still has to deal with.
	pub fn is_active(&self) -> bool {
		matches!(
			self,
			OrderStatus::Pending | OrderStatus::Preparing | OrderStatus::Ready
		)
	}

	pub fn all() -> [OrderStatus; 5] {
		[
			OrderStatus::Pending,
			OrderStatus::Preparing,
			OrderStatus::Ready,
			OrderStatus::Served,
			OrderStatus::Cancelled,
		]
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::Served => "served",
			OrderStatus::Cancelled => "cancelled",
		};
		f.write_str(name)
	}
}

impl std::str::FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all()
			.into_iter()
			.find(|status| status.to_string() == s)
			.ok_or_else(|| format!("unknown order status '{}'", s))
	}
}

/// One line of an order.
///
/// Name and price are snapshots taken when the order was placed, so later
/// menu edits do not rewrite past orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
	pub id: String,
	pub menu_item_id: String,
	pub name: String,
	pub quantity: u32,
	pub unit_price: Decimal,
	#[serde(default)]
	pub notes: Option<String>,
	pub status: ItemStatus,
}

impl OrderItem {
	/// `None` when the product does not fit in a `Decimal`.
	pub fn line_total(&self) -> Option<Decimal> {
		self.unit_price.checked_mul(Decimal::from(self.quantity))
	}
}

/// Order totals that do not fit in a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("order total is out of range")]
pub struct TotalsOverflow;

/// A customer order, optionally tied to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	pub id: String,
	/// Short sequential number shown on the order status screen.
	pub number: u64,
	#[serde(default)]
	pub branch_id: Option<String>,
	#[serde(default)]
	pub table_id: Option<String>,
	#[serde(default)]
	pub customer_name: Option<String>,
	#[serde(default)]
	pub notes: Option<String>,
	pub items: Vec<OrderItem>,
	pub status: OrderStatus,
	pub subtotal: Decimal,
	pub tax: Decimal,
	pub total: Decimal,
	pub created_at: u64,
	pub updated_at: u64,
}

impl Order {
	/// Derives the order-level status from line statuses.
	///
	/// `Ready` iff every line is ready, `Served` iff every line is served,
	/// `Preparing` iff at least one line is preparing (and the order is not
	/// uniformly ready or served); everything else is `Pending`.
	pub fn derive_status(items: &[OrderItem]) -> OrderStatus {
		if items.is_empty() {
			return OrderStatus::Pending;
		}

		let all = |status: ItemStatus| items.iter().all(|item| item.status == status);
		if all(ItemStatus::Served) {
			OrderStatus::Served
		} else if all(ItemStatus::Ready) {
			OrderStatus::Ready
		} else if items.iter().any(|item| item.status == ItemStatus::Preparing) {
			OrderStatus::Preparing
		} else {
			OrderStatus::Pending
		}
	}

	/// Recomputes `status` from the lines. Cancelled orders stay cancelled.
	pub fn refresh_status(&mut self) {
		if self.status != OrderStatus::Cancelled {
			self.status = Self::derive_status(&self.items);
		}
	}

	/// Recomputes subtotal, tax and total for the given tax rate (percent).
	/// On overflow the previous totals are left untouched.
	pub fn recalculate_totals(&mut self, tax_rate: Decimal) -> Result<(), TotalsOverflow> {
		let subtotal = self
			.items
			.iter()
			.try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
			.ok_or(TotalsOverflow)?;
		let tax = subtotal
			.checked_mul(tax_rate)
			.and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
			.ok_or(TotalsOverflow)?
			.round_dp(2);
		let total = subtotal.checked_add(tax).ok_or(TotalsOverflow)?;

		self.subtotal = subtotal;
		self.tax = tax;
		self.total = total;
		Ok(())
	}

	pub fn item(&self, item_id: &str) -> Option<&OrderItem> {
		self.items.iter().find(|item| item.id == item_id)
	}
}
