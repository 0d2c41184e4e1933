//! Kitchen display, order status screen and dashboard.
//!
//! Both displays have a snapshot endpoint and a Server-Sent Events stream.
//! Clients render the snapshot, then apply or refetch on each event.

use super::{api_error, ApiResult};
use crate::server::AppState;
use axum::{
	extract::{Query, State},
	http::{HeaderMap, HeaderValue},
	response::{
		sse::{Event, KeepAlive, Sse},
		IntoResponse, Json, Response,
	},
};
use futures::{Stream, StreamExt};
use menu_core::HandlerError;
use menu_types::{
	BranchFilter, DashboardSummary, KitchenTicket, MenuEvent, OrderEvent, OrderStatus,
	StatusScreen,
};
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

/// Sent when a subscriber fell behind the bus; clients refetch the snapshot.
const RESYNC_EVENT: &str = "resync";

/// Active orders for the kitchen, oldest first.
pub async fn kitchen(
	State(state): State<AppState>,
	Query(filter): Query<BranchFilter>,
) -> ApiResult<Json<Vec<KitchenTicket>>> {
	let tickets = state
		.engine
		.displays()
		.kitchen_tickets(filter.branch_id.as_deref())
		.await
		.map_err(api_error)?;
	Ok(Json(tickets))
}

pub async fn status_screen(
	State(state): State<AppState>,
	Query(filter): Query<BranchFilter>,
) -> ApiResult<Json<StatusScreen>> {
	let screen = state
		.engine
		.displays()
		.status_screen(filter.branch_id.as_deref())
		.await
		.map_err(api_error)?;
	Ok(Json(screen))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
	let summary = state
		.engine
		.displays()
		.dashboard()
		.await
		.map_err(api_error)?;
	Ok(Json(summary))
}

/// Every order event, with full payloads.
pub async fn kitchen_stream(State(state): State<AppState>) -> ApiResult<Response> {
	let settings = state.engine.settings().get().await.map_err(api_error)?;
	if !settings.enable_kitchen_display {
		return Err(api_error(HandlerError::Disabled(
			"the kitchen display is disabled".into(),
		)));
	}

	let rx = state.engine.event_bus().subscribe();
	tracing::debug!("Kitchen display subscribed");
	Ok(sse_response(order_events(rx, |event| {
		serde_json::to_string(&event).ok()
	})))
}

/// Order number and status changes only. Item details stay off the
/// customer-facing screen.
pub async fn status_screen_stream(State(state): State<AppState>) -> ApiResult<Response> {
	let settings = state.engine.settings().get().await.map_err(api_error)?;
	if !settings.enable_order_status_screen {
		return Err(api_error(HandlerError::Disabled(
			"the order status screen is disabled".into(),
		)));
	}

	let rx = state.engine.event_bus().subscribe();
	tracing::debug!("Order status screen subscribed");
	Ok(sse_response(order_events(rx, |event| {
		screen_update(&event).and_then(|update| serde_json::to_string(&update).ok())
	})))
}

/// Minimal payload pushed to the order status screen.
#[derive(Debug, Serialize)]
struct ScreenUpdate {
	number: u64,
	/// `None` once the order is gone.
	status: Option<OrderStatus>,
}

fn screen_update(event: &OrderEvent) -> Option<ScreenUpdate> {
	match event {
		OrderEvent::Created { order } => Some(ScreenUpdate {
			number: order.number,
			status: Some(order.status),
		}),
		OrderEvent::StatusChanged { number, to, .. } => Some(ScreenUpdate {
			number: *number,
			status: Some(*to),
		}),
		OrderEvent::Deleted { number, .. } => Some(ScreenUpdate {
			number: *number,
			status: None,
		}),
		OrderEvent::ItemStatusChanged { .. } => None,
	}
}

fn sse_response<S>(events: S) -> Response
where
	S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
	let mut headers = HeaderMap::new();
	headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
	headers.insert("Connection", HeaderValue::from_static("keep-alive"));

	(headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

/// Order events from the bus, rendered by `render`. Events it declines are
/// skipped; a lagged receiver gets a `resync` event.
fn order_events<F>(
	rx: broadcast::Receiver<MenuEvent>,
	render: F,
) -> impl Stream<Item = Result<Event, Infallible>>
where
	F: Fn(OrderEvent) -> Option<String> + Clone + Send + 'static,
{
	BroadcastStream::new(rx).filter_map(move |msg| {
		let render = render.clone();
		async move {
			let (name, data) = frame(msg, &render)?;
			Some(Ok(Event::default().event(name).data(data)))
		}
	})
}

/// SSE event name and data for one message off the bus.
fn frame<F>(
	msg: Result<MenuEvent, BroadcastStreamRecvError>,
	render: &F,
) -> Option<(&'static str, String)>
where
	F: Fn(OrderEvent) -> Option<String>,
{
	match msg {
		Ok(MenuEvent::Order(event)) => {
			let name = event.name();
			Some((name, render(event)?))
		}
		Ok(_) => None,
		Err(BroadcastStreamRecvError::Lagged(skipped)) => {
			tracing::warn!(skipped, "Display stream lagged, requesting resync");
			Some((
				RESYNC_EVENT,
				serde_json::json!({ "skipped": skipped }).to_string(),
			))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use menu_types::ItemStatus;

	fn deleted(number: u64) -> MenuEvent {
		MenuEvent::Order(OrderEvent::Deleted {
			order_id: format!("o{}", number),
			number,
		})
	}

	#[test]
	fn test_frame_names_and_resync() {
		let render = |event: OrderEvent| serde_json::to_string(&event).ok();

		let (name, _) = frame(Ok(deleted(3)), &render).unwrap();
		assert_eq!(name, "deleted");
		assert!(frame(Ok(deleted(3)), &|_: OrderEvent| None::<String>).is_none());

		let (name, data) = frame(Err(BroadcastStreamRecvError::Lagged(4)), &render).unwrap();
		assert_eq!(name, RESYNC_EVENT);
		assert_eq!(data, r#"{"skipped":4}"#);
	}

	#[tokio::test]
	async fn test_lagged_subscriber_is_told_to_resync() {
		let (tx, rx) = broadcast::channel(1);
		for number in 1..=3 {
			tx.send(deleted(number)).unwrap();
		}
		drop(tx);

		// Every order event is declined, so only the resync comes through.
		let events: Vec<_> = order_events(rx, |_| None).collect().await;
		assert_eq!(events.len(), 1);
	}

	#[test]
	fn test_screen_update_skips_item_changes() {
		let item = OrderEvent::ItemStatusChanged {
			order_id: "o1".into(),
			number: 7,
			item_id: "i1".into(),
			from: ItemStatus::Pending,
			to: ItemStatus::Preparing,
		};
		assert!(screen_update(&item).is_none());

		let status = OrderEvent::StatusChanged {
			order_id: "o1".into(),
			number: 7,
			from: OrderStatus::Preparing,
			to: OrderStatus::Ready,
		};
		let update = screen_update(&status).unwrap();
		assert_eq!(update.number, 7);
		assert_eq!(update.status, Some(OrderStatus::Ready));

		let deleted = OrderEvent::Deleted {
			order_id: "o1".into(),
			number: 7,
		};
		let json = serde_json::to_value(screen_update(&deleted).unwrap()).unwrap();
		assert_eq!(json, serde_json::json!({ "number": 7, "status": null }));
	}
}
