//! Read models computed from stored records.
//!
//! Everything here is a pure function of its inputs (including the clock),
//! so the display handlers stay thin and the rules are testable directly.

pub mod dashboard;
pub mod kitchen;
pub mod menu;
pub mod status_screen;

pub use dashboard::summarize;
pub use kitchen::kitchen_tickets;
pub use menu::{build_public_menu, MenuSource};
pub use status_screen::status_screen;

use menu_types::{Order, Table};
use std::collections::HashMap;

/// Tables indexed by id, for resolving the label printed on tickets.
pub type TableIndex = HashMap<String, Table>;

pub fn index_tables(tables: Vec<Table>) -> TableIndex {
	tables
		.into_iter()
		.map(|table| (table.id.clone(), table))
		.collect()
}

fn table_number(tables: &TableIndex, order: &Order) -> Option<String> {
	order
		.table_id
		.as_ref()
		.and_then(|id| tables.get(id))
		.map(|table| table.number.clone())
}

fn in_branch(order: &Order, branch_id: Option<&str>) -> bool {
	branch_id.is_none_or(|branch| order.branch_id.as_deref() == Some(branch))
}

#[cfg(test)]
pub(crate) mod fixtures {
	use menu_types::{ItemStatus, Order, OrderItem, OrderStatus, Table};
	use rust_decimal::Decimal;

	pub fn order(number: u64, statuses: &[ItemStatus], created_at: u64) -> Order {
		let items: Vec<OrderItem> = statuses
			.iter()
			.enumerate()
			.map(|(i, status)| OrderItem {
				id: format!("{}-{}", number, i),
				menu_item_id: format!("item-{}", i),
				name: format!("Item {}", i),
				quantity: 1,
				unit_price: Decimal::new(500, 2),
				notes: None,
				status: *status,
			})
			.collect();
		let mut order = Order {
			id: format!("order-{}", number),
			number,
			branch_id: Some("b1".into()),
			table_id: Some("t1".into()),
			customer_name: None,
			notes: None,
			items,
			status: OrderStatus::Pending,
			subtotal: Decimal::ZERO,
			tax: Decimal::ZERO,
			total: Decimal::ZERO,
			created_at,
			updated_at: created_at,
		};
		order.refresh_status();
		order.recalculate_totals(Decimal::ZERO).unwrap();
		order
	}

	pub fn table(id: &str, number: &str) -> Table {
		Table {
			id: id.into(),
			branch_id: "b1".into(),
			number: number.into(),
			capacity: 2,
			is_active: true,
			created_at: 0,
			updated_at: 0,
		}
	}
}
