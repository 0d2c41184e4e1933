//! Kitchen display tickets.

use super::{in_branch, table_number, TableIndex};
use menu_types::{KitchenTicket, Order};

/// Active orders as kitchen tickets, oldest first.
pub fn kitchen_tickets(
	orders: &[Order],
	tables: &TableIndex,
	branch_id: Option<&str>,
	now: u64,
) -> Vec<KitchenTicket> {
	let mut active: Vec<&Order> = orders
		.iter()
		.filter(|order| order.status.is_active() && in_branch(order, branch_id))
		.collect();
	active.sort_by_key(|order| (order.created_at, order.number));

	active
		.into_iter()
		.map(|order| KitchenTicket {
			order_id: order.id.clone(),
			number: order.number,
			status: order.status,
			branch_id: order.branch_id.clone(),
			table_id: order.table_id.clone(),
			table_number: table_number(tables, order),
			customer_name: order.customer_name.clone(),
			notes: order.notes.clone(),
			items: order.items.clone(),
			created_at: order.created_at,
			age_seconds: now.saturating_sub(order.created_at),
		})
		.collect()
}
