//! Branches and their tables.

use super::{load, new_id, settings::SettingsHandler, HandlerError};
use crate::engine::event_bus::EventBus;
use menu_storage::StorageService;
use menu_types::{
	current_timestamp, Branch, BranchRequest, CatalogEntity, CatalogEvent, MenuEvent, MenuLink,
	QrStyle, StorageKey, Table, TableLanding, TableRequest,
};
use std::sync::Arc;
use validator::Validate;

pub struct BranchHandler {
	storage: Arc<StorageService>,
	settings: Arc<SettingsHandler>,
	event_bus: EventBus,
}

impl BranchHandler {
	pub fn new(
		storage: Arc<StorageService>,
		settings: Arc<SettingsHandler>,
		event_bus: EventBus,
	) -> Self {
		Self {
			storage,
			settings,
			event_bus,
		}
	}

	pub async fn list_branches(&self) -> Result<Vec<Branch>, HandlerError> {
		let mut branches: Vec<Branch> = self.storage.list(StorageKey::Branches.as_str()).await?;
		branches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
		Ok(branches)
	}

	pub async fn get_branch(&self, id: &str) -> Result<Branch, HandlerError> {
		load(&self.storage, StorageKey::Branches.as_str(), "Branch", id).await
	}

	pub async fn create_branch(&self, request: BranchRequest) -> Result<Branch, HandlerError> {
		request.validate()?;

		let now = current_timestamp();
		let branch = Branch {
			id: new_id(),
			name: request.name.trim().to_string(),
			address: request.address,
			phone: request.phone,
			is_active: request.is_active,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Branches.as_str(), &branch.id, &branch)
			.await?;

		tracing::info!(branch_id = %branch.id, name = %branch.name, "Branch created");
		self.publish(CatalogEntity::Branch, &branch.id, false);
		Ok(branch)
	}

	pub async fn update_branch(
		&self,
		id: &str,
		request: BranchRequest,
	) -> Result<Branch, HandlerError> {
		request.validate()?;

		let mut branch = self.get_branch(id).await?;
		branch.name = request.name.trim().to_string();
		branch.address = request.address;
		branch.phone = request.phone;
		branch.is_active = request.is_active;
		branch.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Branches.as_str(), id, &branch)
			.await?;

		self.publish(CatalogEntity::Branch, id, false);
		Ok(branch)
	}

	/// Deletes a branch together with all of its tables.
	pub async fn delete_branch(&self, id: &str) -> Result<(), HandlerError> {
		let branch = self.get_branch(id).await?;

		let tables = self.list_tables(Some(id)).await?;
		for table in &tables {
			self.storage
				.remove(StorageKey::Tables.as_str(), &table.id)
				.await?;
			self.publish(CatalogEntity::Table, &table.id, true);
		}
		self.storage
			.remove(StorageKey::Branches.as_str(), id)
			.await?;

		tracing::info!(
			branch_id = %id,
			name = %branch.name,
			tables = tables.len(),
			"Branch deleted with its tables"
		);
		self.publish(CatalogEntity::Branch, id, true);
		Ok(())
	}

	/// Tables ordered by branch, then number.
	pub async fn list_tables(&self, branch_id: Option<&str>) -> Result<Vec<Table>, HandlerError> {
		let mut tables: Vec<Table> = self.storage.list(StorageKey::Tables.as_str()).await?;
		if let Some(branch_id) = branch_id {
			tables.retain(|t| t.branch_id == branch_id);
		}
		tables.sort_by(|a, b| {
			a.branch_id
				.cmp(&b.branch_id)
				.then_with(|| natural_key(&a.number).cmp(&natural_key(&b.number)))
		});
		Ok(tables)
	}

	pub async fn get_table(&self, id: &str) -> Result<Table, HandlerError> {
		load(&self.storage, StorageKey::Tables.as_str(), "Table", id).await
	}

	pub async fn create_table(&self, request: TableRequest) -> Result<Table, HandlerError> {
		request.validate()?;
		self.ensure_table_placement(&request, None).await?;

		let now = current_timestamp();
		let table = Table {
			id: new_id(),
			branch_id: request.branch_id,
			number: request.number.trim().to_string(),
			capacity: request.capacity,
			is_active: request.is_active,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Tables.as_str(), &table.id, &table)
			.await?;

		tracing::info!(table_id = %table.id, branch_id = %table.branch_id, number = %table.number, "Table created");
		self.publish(CatalogEntity::Table, &table.id, false);
		Ok(table)
	}

	pub async fn update_table(&self, id: &str, request: TableRequest) -> Result<Table, HandlerError> {
		request.validate()?;

		let mut table = self.get_table(id).await?;
		self.ensure_table_placement(&request, Some(id)).await?;

		table.branch_id = request.branch_id;
		table.number = request.number.trim().to_string();
		table.capacity = request.capacity;
		table.is_active = request.is_active;
		table.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Tables.as_str(), id, &table)
			.await?;

		self.publish(CatalogEntity::Table, id, false);
		Ok(table)
	}

	pub async fn delete_table(&self, id: &str) -> Result<(), HandlerError> {
		self.get_table(id).await?;
		self.storage.remove(StorageKey::Tables.as_str(), id).await?;
		self.publish(CatalogEntity::Table, id, true);
		Ok(())
	}

	/// Public menu URL of a table plus the QR styling from settings.
	pub async fn menu_link(&self, table_id: &str) -> Result<MenuLink, HandlerError> {
		let table = self.get_table(table_id).await?;
		let settings = self.settings.get().await?;

		let url = format!(
			"{}?branch={}&table={}",
			settings.public_menu_base_url.trim_end_matches('/'),
			table.branch_id,
			table.id
		);
		let qr = QrStyle {
			foreground_color: settings.qr_foreground_color,
			background_color: settings.qr_background_color,
			size: settings.qr_size,
			margin: settings.qr_margin,
			error_correction: settings.qr_error_correction,
			dot_style: settings.qr_dot_style,
			logo_url: settings.logo_url.filter(|_| settings.qr_include_logo),
		};

		Ok(MenuLink {
			table_id: table.id,
			branch_id: table.branch_id,
			url,
			qr,
		})
	}

	/// What a customer sees after scanning a table's QR code. Inactive
	/// tables and branches are reported as missing.
	pub async fn table_landing(&self, table_id: &str) -> Result<TableLanding, HandlerError> {
		let table = self.get_table(table_id).await?;
		let branch = self.get_branch(&table.branch_id).await?;
		if !table.is_active || !branch.is_active {
			return Err(HandlerError::NotFound {
				entity: "Table",
				id: table_id.to_string(),
			});
		}
		Ok(TableLanding { table, branch })
	}

	/// Branch must exist and the number must be free within it.
	async fn ensure_table_placement(
		&self,
		request: &TableRequest,
		table_id: Option<&str>,
	) -> Result<(), HandlerError> {
		if !self
			.storage
			.exists(StorageKey::Branches.as_str(), &request.branch_id)
			.await?
		{
			return Err(HandlerError::Unprocessable(format!(
				"branch '{}' does not exist",
				request.branch_id
			)));
		}

		let number = request.number.trim();
		let taken = self
			.list_tables(Some(&request.branch_id))
			.await?
			.into_iter()
			.any(|t| Some(t.id.as_str()) != table_id && t.number.eq_ignore_ascii_case(number));
		if taken {
			return Err(HandlerError::Conflict(format!(
				"table '{}' already exists in this branch",
				number
			)));
		}
		Ok(())
	}

	fn publish(&self, entity: CatalogEntity, id: &str, deleted: bool) {
		let id = id.to_string();
		let event = if deleted {
			CatalogEvent::Deleted { entity, id }
		} else {
			CatalogEvent::Upserted { entity, id }
		};
		self.event_bus.publish(MenuEvent::Catalog(event));
	}
}

/// Sorts "2" before "10" while keeping labels like "A1" stable.
fn natural_key(number: &str) -> (u64, String) {
	(number.parse().unwrap_or(u64::MAX), number.to_string())
}
