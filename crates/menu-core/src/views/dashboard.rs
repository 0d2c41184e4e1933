//! Dashboard summary numbers.

use chrono::{DateTime, Utc};
use menu_types::{DashboardSummary, EntityCounts, Order, OrderStatus, TopItem, TotalsOverflow};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

const TOP_ITEMS: usize = 5;

/// Summarizes orders for the dashboard.
///
/// "Today" is the UTC calendar day of `now`. Cancelled orders count towards
/// the per-status breakdown only. Fails when today's revenue does not fit
/// in a `Decimal`.
pub fn summarize(
	counts: EntityCounts,
	orders: &[Order],
	now: DateTime<Utc>,
) -> Result<DashboardSummary, TotalsOverflow> {
	let today = now.date_naive();
	let placed_today = |order: &Order| {
		i64::try_from(order.created_at)
			.ok()
			.and_then(|secs| DateTime::from_timestamp(secs, 0))
			.is_some_and(|created| created.date_naive() == today)
	};

	let mut orders_by_status: BTreeMap<String, usize> = OrderStatus::all()
		.into_iter()
		.map(|status| (status.to_string(), 0))
		.collect();
	let mut orders_today = 0;
	let mut revenue_today = Decimal::ZERO;
	let mut active_orders = 0;
	let mut sold: HashMap<&str, TopItem> = HashMap::new();

	for order in orders {
		*orders_by_status.entry(order.status.to_string()).or_default() += 1;
		if order.status == OrderStatus::Cancelled {
			continue;
		}
		if order.status.is_active() {
			active_orders += 1;
		}
		if placed_today(order) {
			orders_today += 1;
			revenue_today = revenue_today
				.checked_add(order.total)
				.ok_or(TotalsOverflow)?;
		}
		for item in &order.items {
			sold.entry(item.menu_item_id.as_str())
				.or_insert_with(|| TopItem {
					menu_item_id: item.menu_item_id.clone(),
					name: item.name.clone(),
					quantity: 0,
				})
				.quantity += u64::from(item.quantity);
		}
	}

	let mut top_items: Vec<TopItem> = sold.into_values().collect();
	top_items.sort_by(|a, b| {
		b.quantity
			.cmp(&a.quantity)
			.then_with(|| a.name.cmp(&b.name))
	});
	top_items.truncate(TOP_ITEMS);

	Ok(DashboardSummary {
		counts,
		active_orders,
		orders_today,
		revenue_today,
		orders_by_status,
		top_items,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::views::fixtures::order;
	use menu_types::ItemStatus::*;

	#[test]
	fn test_today_is_utc_and_excludes_cancelled() {
		let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
		let today = 1_700_000_000 - 60;
		let yesterday = 1_700_000_000 - 86_400;

		let mut cancelled = order(3, &[Pending], today);
		cancelled.status = OrderStatus::Cancelled;
		let orders = vec![
			order(1, &[Pending, Ready], today),
			order(2, &[Served], yesterday),
			cancelled,
		];

		let summary = summarize(EntityCounts::default(), &orders, now).unwrap();
		assert_eq!(summary.orders_today, 1);
		assert_eq!(summary.revenue_today, Decimal::new(1000, 2));
		assert_eq!(summary.active_orders, 1);
		assert_eq!(summary.orders_by_status["cancelled"], 1);
		assert_eq!(summary.orders_by_status["served"], 1);
		assert_eq!(summary.orders_by_status["ready"], 0);
	}

	#[test]
	fn test_top_items_limited_to_five() {
		let mut orders = Vec::new();
		for n in 0..7u64 {
			let mut o = order(n, &[Pending], 0);
			o.items[0].menu_item_id = format!("dish-{}", n);
			o.items[0].name = format!("Dish {}", n);
			o.items[0].quantity = n as u32 + 1;
			orders.push(o);
		}

		let summary = summarize(EntityCounts::default(), &orders, Utc::now()).unwrap();
		assert_eq!(summary.top_items.len(), 5);
		assert_eq!(summary.top_items[0].menu_item_id, "dish-6");
		assert_eq!(summary.top_items[0].quantity, 7);
		assert_eq!(summary.top_items[4].menu_item_id, "dish-2");
	}

	#[test]
	fn test_revenue_overflow_is_an_error() {
		let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
		let mut orders = vec![
			order(1, &[Pending], 1_700_000_000),
			order(2, &[Pending], 1_700_000_000),
		];
		for o in &mut orders {
			o.total = Decimal::MAX;
		}

		assert_eq!(
			summarize(EntityCounts::default(), &orders, now),
			Err(TotalsOverflow)
		);
	}
}
