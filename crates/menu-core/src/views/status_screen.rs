//! Order status screen columns.

use super::{in_branch, table_number, TableIndex};
use menu_types::{Order, OrderStatus, StatusScreen, StatusScreenEntry};

/// Splits active orders into the "preparing" and "ready" columns.
///
/// Pending orders show as preparing. A ready order stays on screen for
/// `ready_seconds` after it became ready; `0` keeps it until served.
pub fn status_screen(
	orders: &[Order],
	tables: &TableIndex,
	branch_id: Option<&str>,
	now: u64,
	ready_seconds: u64,
) -> StatusScreen {
	let entry = |order: &Order| StatusScreenEntry {
		number: order.number,
		table_number: table_number(tables, order),
		updated_at: order.updated_at,
	};

	let mut preparing: Vec<&Order> = Vec::new();
	let mut ready: Vec<&Order> = Vec::new();
	for order in orders.iter().filter(|order| in_branch(order, branch_id)) {
		match order.status {
			OrderStatus::Pending | OrderStatus::Preparing => preparing.push(order),
			OrderStatus::Ready => {
				// Ready is the last status change, so updated_at is the ready time.
				let expired =
					ready_seconds > 0 && now.saturating_sub(order.updated_at) > ready_seconds;
				if !expired {
					ready.push(order);
				}
			}
			OrderStatus::Served | OrderStatus::Cancelled => {}
		}
	}

	preparing.sort_by_key(|order| (order.created_at, order.number));
	ready.sort_by(|a, b| {
		b.updated_at
			.cmp(&a.updated_at)
			.then_with(|| b.number.cmp(&a.number))
	});

	StatusScreen {
		preparing: preparing.into_iter().map(entry).collect(),
		ready: ready.into_iter().map(entry).collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::views::fixtures::order;
	use menu_types::ItemStatus::*;

	fn numbers(entries: &[StatusScreenEntry]) -> Vec<u64> {
		entries.iter().map(|e| e.number).collect()
	}

	#[test]
	fn test_columns() {
		let orders = vec![
			order(1, &[Pending], 100),
			order(2, &[Preparing, Ready], 90),
			order(3, &[Ready, Ready], 80),
			order(4, &[Served], 70),
			order(5, &[Ready, Served], 60),
		];
		let screen = status_screen(&orders, &TableIndex::new(), None, 120, 600);
		assert_eq!(numbers(&screen.preparing), vec![5, 2, 1]);
		assert_eq!(numbers(&screen.ready), vec![3]);
	}

	#[test]
	fn test_ready_orders_expire() {
		let mut fresh = order(1, &[Ready], 0);
		fresh.updated_at = 950;
		let mut stale = order(2, &[Ready], 0);
		stale.updated_at = 100;
		let orders = vec![fresh, stale];

		let screen = status_screen(&orders, &TableIndex::new(), None, 1000, 600);
		assert_eq!(numbers(&screen.ready), vec![1]);

		let kept = status_screen(&orders, &TableIndex::new(), None, 1000, 0);
		assert_eq!(numbers(&kept.ready), vec![1, 2]);
	}
}
