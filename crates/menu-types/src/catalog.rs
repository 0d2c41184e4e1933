//! Menu taxonomy: categories, items, food types and materials.
//!
//! Names and descriptions are multi-language maps keyed by language code,
//! so one record serves every language the restaurant enables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Translations keyed by language code (`"en" -> "Soup"`).
pub type LocalizedText = BTreeMap<String, String>;

/// A menu section such as "Starters" or "Drinks".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
	pub id: String,
	pub name: LocalizedText,
	#[serde(default)]
	pub description: LocalizedText,
	#[serde(default)]
	pub image_url: Option<String>,
	#[serde(default)]
	pub sort_order: i32,
	pub is_active: bool,
	pub created_at: u64,
	pub updated_at: u64,
}

/// A product on the menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
	pub id: String,
	pub category_id: String,
	pub name: LocalizedText,
	#[serde(default)]
	pub description: LocalizedText,
	pub price: Decimal,
	#[serde(default)]
	pub image_url: Option<String>,
	/// Food types (vegan, spicy, ...) this item is tagged with.
	#[serde(default)]
	pub food_type_ids: Vec<String>,
	/// Materials (ingredients, allergens) this item contains.
	#[serde(default)]
	pub material_ids: Vec<String>,
	#[serde(default)]
	pub calories: Option<u32>,
	#[serde(default)]
	pub preparation_minutes: Option<u32>,
	pub is_available: bool,
	#[serde(default)]
	pub is_featured: bool,
	#[serde(default)]
	pub sort_order: i32,
	pub created_at: u64,
	pub updated_at: u64,
}

/// Dietary tag such as "Vegetarian" or "Spicy".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodType {
	pub id: String,
	pub name: LocalizedText,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub sort_order: i32,
	pub created_at: u64,
	pub updated_at: u64,
}

/// Ingredient an item is made of; allergens are flagged for the public menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
	pub id: String,
	pub name: LocalizedText,
	#[serde(default)]
	pub is_allergen: bool,
	pub created_at: u64,
	pub updated_at: u64,
}
