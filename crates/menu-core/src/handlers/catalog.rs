//! Menu catalog: categories, items, food types and materials.
//!
//! Items reference a category plus any number of food types and materials.
//! A category cannot be deleted while it still has items; deleting a food
//! type or material detaches it from every item instead.

use super::{check_image_size, load, new_id, HandlerError};
use crate::engine::event_bus::EventBus;
use menu_storage::StorageService;
use menu_types::{
	current_timestamp, CatalogEntity, CatalogEvent, Category, CategoryRequest, FoodType,
	FoodTypeRequest, Material, MaterialRequest, MenuEvent, MenuItem, MenuItemRequest, StorageKey,
};
use std::sync::Arc;
use validator::Validate;

pub struct CatalogHandler {
	storage: Arc<StorageService>,
	event_bus: EventBus,
	max_image_bytes: usize,
}

impl CatalogHandler {
	pub fn new(storage: Arc<StorageService>, event_bus: EventBus, max_image_bytes: usize) -> Self {
		Self {
			storage,
			event_bus,
			max_image_bytes,
		}
	}

	// Categories

	/// Categories by sort order.
	pub async fn list_categories(&self) -> Result<Vec<Category>, HandlerError> {
		let mut categories: Vec<Category> =
			self.storage.list(StorageKey::Categories.as_str()).await?;
		categories.sort_by(|a, b| {
			a.sort_order
				.cmp(&b.sort_order)
				.then_with(|| a.created_at.cmp(&b.created_at))
				.then_with(|| a.id.cmp(&b.id))
		});
		Ok(categories)
	}

	pub async fn get_category(&self, id: &str) -> Result<Category, HandlerError> {
		load(&self.storage, StorageKey::Categories.as_str(), "Category", id).await
	}

	pub async fn create_category(&self, request: CategoryRequest) -> Result<Category, HandlerError> {
		request.validate()?;
		check_image_size(request.image_url.as_deref(), self.max_image_bytes)?;

		let now = current_timestamp();
		let category = Category {
			id: new_id(),
			name: request.name,
			description: request.description,
			image_url: request.image_url,
			sort_order: request.sort_order,
			is_active: request.is_active,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Categories.as_str(), &category.id, &category)
			.await?;

		tracing::info!(category_id = %category.id, "Category created");
		self.publish(CatalogEntity::Category, &category.id, false);
		Ok(category)
	}

	pub async fn update_category(
		&self,
		id: &str,
		request: CategoryRequest,
	) -> Result<Category, HandlerError> {
		request.validate()?;
		check_image_size(request.image_url.as_deref(), self.max_image_bytes)?;

		let mut category = self.get_category(id).await?;
		category.name = request.name;
		category.description = request.description;
		category.image_url = request.image_url;
		category.sort_order = request.sort_order;
		category.is_active = request.is_active;
		category.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Categories.as_str(), id, &category)
			.await?;

		self.publish(CatalogEntity::Category, id, false);
		Ok(category)
	}

	pub async fn delete_category(&self, id: &str) -> Result<(), HandlerError> {
		self.get_category(id).await?;

		let item_count = self.list_items(Some(id)).await?.len();
		if item_count > 0 {
			return Err(HandlerError::Conflict(format!(
				"category still has {} item(s); move or delete them first",
				item_count
			)));
		}

		self.storage
			.remove(StorageKey::Categories.as_str(), id)
			.await?;
		tracing::info!(category_id = %id, "Category deleted");
		self.publish(CatalogEntity::Category, id, true);
		Ok(())
	}

	// Items

	/// Items by sort order, optionally limited to one category.
	pub async fn list_items(&self, category_id: Option<&str>) -> Result<Vec<MenuItem>, HandlerError> {
		let mut items: Vec<MenuItem> = self.storage.list(StorageKey::Items.as_str()).await?;
		if let Some(category_id) = category_id {
			items.retain(|item| item.category_id == category_id);
		}
		items.sort_by(|a, b| {
			a.sort_order
				.cmp(&b.sort_order)
				.then_with(|| a.created_at.cmp(&b.created_at))
				.then_with(|| a.id.cmp(&b.id))
		});
		Ok(items)
	}

	pub async fn get_item(&self, id: &str) -> Result<MenuItem, HandlerError> {
		load(&self.storage, StorageKey::Items.as_str(), "Menu item", id).await
	}

	pub async fn create_item(&self, request: MenuItemRequest) -> Result<MenuItem, HandlerError> {
		request.validate()?;
		self.ensure_item_references(&request).await?;

		let now = current_timestamp();
		let item = MenuItem {
			id: new_id(),
			category_id: request.category_id,
			name: request.name,
			description: request.description,
			price: request.price,
			image_url: request.image_url,
			food_type_ids: dedup(request.food_type_ids),
			material_ids: dedup(request.material_ids),
			calories: request.calories,
			preparation_minutes: request.preparation_minutes,
			is_available: request.is_available,
			is_featured: request.is_featured,
			sort_order: request.sort_order,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Items.as_str(), &item.id, &item)
			.await?;

		tracing::info!(item_id = %item.id, category_id = %item.category_id, price = %item.price, "Menu item created");
		self.publish(CatalogEntity::Item, &item.id, false);
		Ok(item)
	}

	pub async fn update_item(
		&self,
		id: &str,
		request: MenuItemRequest,
	) -> Result<MenuItem, HandlerError> {
		request.validate()?;

		let mut item = self.get_item(id).await?;
		self.ensure_item_references(&request).await?;

		item.category_id = request.category_id;
		item.name = request.name;
		item.description = request.description;
		item.price = request.price;
		item.image_url = request.image_url;
		item.food_type_ids = dedup(request.food_type_ids);
		item.material_ids = dedup(request.material_ids);
		item.calories = request.calories;
		item.preparation_minutes = request.preparation_minutes;
		item.is_available = request.is_available;
		item.is_featured = request.is_featured;
		item.sort_order = request.sort_order;
		item.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Items.as_str(), id, &item)
			.await?;

		self.publish(CatalogEntity::Item, id, false);
		Ok(item)
	}

	/// Past orders keep their own name and price snapshots, so items can be
	/// deleted freely.
	pub async fn delete_item(&self, id: &str) -> Result<(), HandlerError> {
		self.get_item(id).await?;
		self.storage.remove(StorageKey::Items.as_str(), id).await?;
		tracing::info!(item_id = %id, "Menu item deleted");
		self.publish(CatalogEntity::Item, id, true);
		Ok(())
	}

	// Food types

	pub async fn list_food_types(&self) -> Result<Vec<FoodType>, HandlerError> {
		let mut food_types: Vec<FoodType> =
			self.storage.list(StorageKey::FoodTypes.as_str()).await?;
		food_types.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
		Ok(food_types)
	}

	pub async fn get_food_type(&self, id: &str) -> Result<FoodType, HandlerError> {
		load(&self.storage, StorageKey::FoodTypes.as_str(), "Food type", id).await
	}

	pub async fn create_food_type(&self, request: FoodTypeRequest) -> Result<FoodType, HandlerError> {
		request.validate()?;

		let now = current_timestamp();
		let food_type = FoodType {
			id: new_id(),
			name: request.name,
			icon: request.icon,
			color: request.color,
			sort_order: request.sort_order,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::FoodTypes.as_str(), &food_type.id, &food_type)
			.await?;

		self.publish(CatalogEntity::FoodType, &food_type.id, false);
		Ok(food_type)
	}

	pub async fn update_food_type(
		&self,
		id: &str,
		request: FoodTypeRequest,
	) -> Result<FoodType, HandlerError> {
		request.validate()?;

		let mut food_type = self.get_food_type(id).await?;
		food_type.name = request.name;
		food_type.icon = request.icon;
		food_type.color = request.color;
		food_type.sort_order = request.sort_order;
		food_type.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::FoodTypes.as_str(), id, &food_type)
			.await?;

		self.publish(CatalogEntity::FoodType, id, false);
		Ok(food_type)
	}

	pub async fn delete_food_type(&self, id: &str) -> Result<(), HandlerError> {
		self.get_food_type(id).await?;
		let detached = self
			.detach_from_items(|item| &mut item.food_type_ids, id)
			.await?;
		self.storage
			.remove(StorageKey::FoodTypes.as_str(), id)
			.await?;

		tracing::info!(food_type_id = %id, detached, "Food type deleted");
		self.publish(CatalogEntity::FoodType, id, true);
		Ok(())
	}

	// Materials

	pub async fn list_materials(&self) -> Result<Vec<Material>, HandlerError> {
		let mut materials: Vec<Material> = self.storage.list(StorageKey::Materials.as_str()).await?;
		materials.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
		Ok(materials)
	}

	pub async fn get_material(&self, id: &str) -> Result<Material, HandlerError> {
		load(&self.storage, StorageKey::Materials.as_str(), "Material", id).await
	}

	pub async fn create_material(&self, request: MaterialRequest) -> Result<Material, HandlerError> {
		request.validate()?;

		let now = current_timestamp();
		let material = Material {
			id: new_id(),
			name: request.name,
			is_allergen: request.is_allergen,
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Materials.as_str(), &material.id, &material)
			.await?;

		self.publish(CatalogEntity::Material, &material.id, false);
		Ok(material)
	}

	pub async fn update_material(
		&self,
		id: &str,
		request: MaterialRequest,
	) -> Result<Material, HandlerError> {
		request.validate()?;

		let mut material = self.get_material(id).await?;
		material.name = request.name;
		material.is_allergen = request.is_allergen;
		material.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Materials.as_str(), id, &material)
			.await?;

		self.publish(CatalogEntity::Material, id, false);
		Ok(material)
	}

	pub async fn delete_material(&self, id: &str) -> Result<(), HandlerError> {
		self.get_material(id).await?;
		let detached = self
			.detach_from_items(|item| &mut item.material_ids, id)
			.await?;
		self.storage
			.remove(StorageKey::Materials.as_str(), id)
			.await?;

		tracing::info!(material_id = %id, detached, "Material deleted");
		self.publish(CatalogEntity::Material, id, true);
		Ok(())
	}

	async fn ensure_item_references(&self, request: &MenuItemRequest) -> Result<(), HandlerError> {
		check_image_size(request.image_url.as_deref(), self.max_image_bytes)?;

		let references = std::iter::once((StorageKey::Categories, "category", &request.category_id))
			.chain(
				request
					.food_type_ids
					.iter()
					.map(|id| (StorageKey::FoodTypes, "food type", id)),
			)
			.chain(
				request
					.material_ids
					.iter()
					.map(|id| (StorageKey::Materials, "material", id)),
			);

		for (namespace, label, id) in references {
			if !self.storage.exists(namespace.as_str(), id).await? {
				return Err(HandlerError::Unprocessable(format!(
					"{} '{}' does not exist",
					label, id
				)));
			}
		}
		Ok(())
	}

	/// Removes `id` from the list selected by `field` on every item.
	/// Returns the number of items changed.
	async fn detach_from_items<F>(&self, field: F, id: &str) -> Result<usize, HandlerError>
	where
		F: Fn(&mut MenuItem) -> &mut Vec<String>,
	{
		let now = current_timestamp();
		let mut changed = 0;
		for mut item in self.list_items(None).await? {
			let ids = field(&mut item);
			let before = ids.len();
			ids.retain(|existing| existing != id);
			if ids.len() == before {
				continue;
			}
			item.updated_at = now;
			self.storage
				.update(StorageKey::Items.as_str(), &item.id, &item)
				.await?;
			self.publish(CatalogEntity::Item, &item.id, false);
			changed += 1;
		}
		Ok(changed)
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

fn dedup(ids: Vec<String>) -> Vec<String> {
	let mut unique = Vec::with_capacity(ids.len());
	for id in ids {
		if !unique.contains(&id) {
			unique.push(id);
		}
	}
	unique
}
