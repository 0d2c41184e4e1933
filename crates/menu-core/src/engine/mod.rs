//! Core menu engine that ties storage, handlers and the event bus together.
//!
//! The HTTP layer talks to the engine through its handler accessors. The
//! engine's own run loop performs periodic storage maintenance and logs
//! every event published on the bus until shutdown.

pub mod event_bus;
pub mod lifecycle;

use crate::handlers::{
	BranchHandler, CatalogHandler, DisplayHandler, LanguageHandler, OrderHandler,
	SettingsHandler, UserHandler,
};
use crate::state::OrderStateMachine;
use menu_config::Config;
use menu_storage::StorageService;
use menu_types::{truncate_id, CatalogEvent, MenuEvent, OrderEvent};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Service error: {0}")]
	Service(String),
	#[error("Handler error: {0}")]
	Handler(String),
}

/// Main menu engine.
#[derive(Clone)]
pub struct MenuEngine {
	pub(crate) config: Config,
	pub(crate) storage: Arc<StorageService>,
	pub(crate) event_bus: event_bus::EventBus,
	pub(crate) settings_handler: Arc<SettingsHandler>,
	pub(crate) language_handler: Arc<LanguageHandler>,
	pub(crate) user_handler: Arc<UserHandler>,
	pub(crate) branch_handler: Arc<BranchHandler>,
	pub(crate) catalog_handler: Arc<CatalogHandler>,
	pub(crate) order_handler: Arc<OrderHandler>,
	pub(crate) display_handler: Arc<DisplayHandler>,
}

impl MenuEngine {
	/// Creates a new engine on top of the given storage.
	pub fn new(config: Config, storage: Arc<StorageService>, event_bus: event_bus::EventBus) -> Self {
		let max_image_bytes = config.api.clone().unwrap_or_default().max_image_bytes;
		let state_machine = Arc::new(OrderStateMachine::new(storage.clone()));

		let settings_handler = Arc::new(SettingsHandler::new(
			storage.clone(),
			event_bus.clone(),
			max_image_bytes,
		));
		let language_handler = Arc::new(LanguageHandler::new(
			storage.clone(),
			settings_handler.clone(),
			event_bus.clone(),
		));
		let user_handler = Arc::new(UserHandler::new(storage.clone()));
		let branch_handler = Arc::new(BranchHandler::new(
			storage.clone(),
			settings_handler.clone(),
			event_bus.clone(),
		));
		let catalog_handler = Arc::new(CatalogHandler::new(
			storage.clone(),
			event_bus.clone(),
			max_image_bytes,
		));
		let order_handler = Arc::new(OrderHandler::new(
			storage.clone(),
			state_machine,
			settings_handler.clone(),
			event_bus.clone(),
			config.orders.clone(),
		));
		let display_handler = Arc::new(DisplayHandler::new(
			storage.clone(),
			settings_handler.clone(),
			order_handler.clone(),
		));

		Self {
			config,
			storage,
			event_bus,
			settings_handler,
			language_handler,
			user_handler,
			branch_handler,
			catalog_handler,
			order_handler,
			display_handler,
		}
	}

	/// Main loop: periodic storage cleanup and event logging until Ctrl+C.
	pub async fn run(&self) -> Result<(), EngineError> {
		let mut event_receiver = self.event_bus.subscribe();

		let storage = self.storage.clone();
		let cleanup_interval = tokio::time::interval(Duration::from_secs(
			self.config.storage.cleanup_interval_seconds,
		));
		let cleanup_handle = tokio::spawn(async move {
			let mut interval = cleanup_interval;
			loop {
				interval.tick().await;
				match storage.cleanup_expired().await {
					Ok(count) if count > 0 => {
						tracing::debug!("Storage cleanup: removed {} expired entries", count);
					}
					Err(e) => {
						tracing::warn!("Storage cleanup failed: {}", e);
					}
					_ => {}
				}
			}
		});

		loop {
			tokio::select! {
				event = event_receiver.recv() => {
					match event {
						Ok(event) => log_event(&event),
						Err(RecvError::Lagged(skipped)) => {
							tracing::warn!(skipped, "Event logger lagged behind the bus");
						}
						Err(RecvError::Closed) => break,
					}
				}

				_ = tokio::signal::ctrl_c() => {
					break;
				}
			}
		}

		cleanup_handle.abort();
		Ok(())
	}

	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	pub fn settings(&self) -> &Arc<SettingsHandler> {
		&self.settings_handler
	}

	pub fn languages(&self) -> &Arc<LanguageHandler> {
		&self.language_handler
	}

	pub fn users(&self) -> &Arc<UserHandler> {
		&self.user_handler
	}

	pub fn branches(&self) -> &Arc<BranchHandler> {
		&self.branch_handler
	}

	pub fn catalog(&self) -> &Arc<CatalogHandler> {
		&self.catalog_handler
	}

	pub fn orders(&self) -> &Arc<OrderHandler> {
		&self.order_handler
	}

	pub fn displays(&self) -> &Arc<DisplayHandler> {
		&self.display_handler
	}
}

fn log_event(event: &MenuEvent) {
	match event {
		MenuEvent::Order(OrderEvent::StatusChanged {
			order_id,
			number,
			from,
			to,
		}) => {
			tracing::debug!(order_id = %truncate_id(order_id), number, %from, %to, "Order status event");
		}
		MenuEvent::Order(order_event) => {
			tracing::debug!(
				order_id = %truncate_id(order_event.order_id()),
				event = order_event.name(),
				"Order event"
			);
		}
		MenuEvent::Catalog(CatalogEvent::Upserted { entity, id })
		| MenuEvent::Catalog(CatalogEvent::Deleted { entity, id }) => {
			tracing::debug!(?entity, id = %id, "Catalog event");
		}
		MenuEvent::Settings(settings_event) => {
			tracing::debug!(?settings_event, "Settings event");
		}
	}
}
