//! The public, customer-facing menu.

use menu_types::{
	resolve_text, Branch, Category, FoodType, Language, LocalizedText, Material, MenuItem,
	PublicCategory, PublicFoodType, PublicLanguage, PublicMaterial, PublicMenu, PublicMenuItem,
	PublicRestaurant, Settings, TextDirection,
};
use std::collections::HashMap;

/// Everything the public menu is assembled from.
pub struct MenuSource {
	pub settings: Settings,
	pub languages: Vec<Language>,
	pub categories: Vec<Category>,
	pub items: Vec<MenuItem>,
	pub food_types: Vec<FoodType>,
	pub materials: Vec<Material>,
	pub branch: Option<Branch>,
}

/// Resolves the menu into one language.
///
/// The requested language is used when it is active; otherwise the default
/// language. Each text falls back to the default language and then to any
/// translation. Settings toggles decide which optional fields are shown.
pub fn build_public_menu(source: MenuSource, requested: Option<&str>) -> PublicMenu {
	let MenuSource {
		settings,
		mut languages,
		mut categories,
		mut items,
		food_types,
		materials,
		branch,
	} = source;

	languages.retain(|language| language.is_active);
	languages.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.code.cmp(&b.code)));

	let default_code = languages
		.iter()
		.find(|language| language.is_default)
		.map(|language| language.code.clone())
		.unwrap_or_else(|| settings.default_language.clone());
	let language = requested
		.and_then(|code| {
			languages
				.iter()
				.find(|language| language.code.eq_ignore_ascii_case(code))
		})
		.map(|language| language.code.clone())
		.unwrap_or_else(|| default_code.clone());
	let direction = languages
		.iter()
		.find(|l| l.code == language)
		.map(|l| l.direction)
		.unwrap_or(TextDirection::Ltr);

	let text = |value: &LocalizedText| {
		resolve_text(value, &language, &default_code)
			.unwrap_or_default()
			.to_string()
	};
	let optional_text = |value: &LocalizedText| {
		resolve_text(value, &language, &default_code).map(str::to_string)
	};

	let food_types: HashMap<&str, PublicFoodType> = food_types
		.iter()
		.map(|food_type| {
			(
				food_type.id.as_str(),
				PublicFoodType {
					id: food_type.id.clone(),
					name: text(&food_type.name),
					icon: food_type.icon.clone(),
					color: food_type.color.clone(),
				},
			)
		})
		.collect();
	let materials: HashMap<&str, PublicMaterial> = materials
		.iter()
		.map(|material| {
			(
				material.id.as_str(),
				PublicMaterial {
					id: material.id.clone(),
					name: text(&material.name),
					is_allergen: material.is_allergen,
				},
			)
		})
		.collect();

	items.retain(|item| item.is_available);
	items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));

	let public_item = |item: &MenuItem| PublicMenuItem {
		id: item.id.clone(),
		name: text(&item.name),
		description: optional_text(&item.description).filter(|_| settings.show_descriptions),
		price: Some(item.price).filter(|_| settings.show_prices),
		image_url: item.image_url.clone().filter(|_| settings.show_images),
		food_types: if settings.show_food_types {
			item.food_type_ids
				.iter()
				.filter_map(|id| food_types.get(id.as_str()).cloned())
				.collect()
		} else {
			Vec::new()
		},
		materials: if settings.show_allergens {
			item.material_ids
				.iter()
				.filter_map(|id| materials.get(id.as_str()).cloned())
				.collect()
		} else {
			Vec::new()
		},
		calories: item.calories.filter(|_| settings.show_calories),
		preparation_minutes: item.preparation_minutes,
		is_featured: item.is_featured,
	};

	categories.retain(|category| category.is_active);
	categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
	let categories = categories
		.iter()
		.map(|category| PublicCategory {
			id: category.id.clone(),
			name: text(&category.name),
			description: optional_text(&category.description)
				.filter(|_| settings.show_descriptions),
			image_url: category.image_url.clone().filter(|_| settings.show_images),
			items: items
				.iter()
				.filter(|item| item.category_id == category.id)
				.map(&public_item)
				.collect(),
		})
		.collect();

	let languages = languages
		.into_iter()
		.map(|language| PublicLanguage {
			code: language.code,
			name: language.name,
			native_name: language.native_name,
			direction: language.direction,
			is_default: language.is_default,
		})
		.collect();

	PublicMenu {
		language,
		direction,
		languages,
		restaurant: restaurant(&settings),
		branch,
		categories,
	}
}

fn restaurant(settings: &Settings) -> PublicRestaurant {
	PublicRestaurant {
		name: settings.restaurant_name.clone(),
		description: settings.restaurant_description.clone(),
		logo_url: settings.logo_url.clone(),
		primary_color: settings.primary_color.clone(),
		accent_color: settings.accent_color.clone(),
		currency: settings.currency.clone(),
		currency_symbol: settings.currency_symbol.clone(),
		contact_phone: settings.contact_phone.clone(),
		contact_email: settings.contact_email.clone(),
		contact_address: settings.contact_address.clone(),
		opening_hours: settings.opening_hours.clone(),
		footer_text: settings.footer_text.clone(),
		show_images: settings.show_images,
		show_descriptions: settings.show_descriptions,
		show_allergens: settings.show_allergens,
		show_food_types: settings.show_food_types,
		show_calories: settings.show_calories,
		enable_ordering: settings.enable_ordering,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;

	fn text(pairs: &[(&str, &str)]) -> LocalizedText {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	fn language(code: &str, is_default: bool, is_active: bool) -> Language {
		Language {
			code: code.into(),
			name: code.to_uppercase(),
			native_name: None,
			direction: if code == "ar" {
				TextDirection::Rtl
			} else {
				TextDirection::Ltr
			},
			is_default,
			is_active,
			sort_order: 0,
			created_at: 0,
			updated_at: 0,
		}
	}

	fn category(id: &str, sort_order: i32, is_active: bool) -> Category {
		Category {
			id: id.into(),
			name: text(&[("en", id), ("ar", "قسم")]),
			description: text(&[("en", "desc")]),
			image_url: None,
			sort_order,
			is_active,
			created_at: 0,
			updated_at: 0,
		}
	}

	fn item(id: &str, category_id: &str, is_available: bool) -> MenuItem {
		MenuItem {
			id: id.into(),
			category_id: category_id.into(),
			name: text(&[("en", "Soup")]),
			description: LocalizedText::new(),
			price: Decimal::new(450, 2),
			image_url: Some("https://cdn.example.com/soup.jpg".into()),
			food_type_ids: vec!["vegan".into()],
			material_ids: vec!["nuts".into()],
			calories: Some(320),
			preparation_minutes: Some(10),
			is_available,
			is_featured: false,
			sort_order: 0,
			created_at: 0,
			updated_at: 0,
		}
	}

	fn source(settings: Settings) -> MenuSource {
		MenuSource {
			settings,
			languages: vec![
				language("en", true, true),
				language("ar", false, true),
				language("fr", false, false),
			],
			categories: vec![
				category("mains", 2, true),
				category("starters", 1, true),
				category("hidden", 0, false),
			],
			items: vec![item("soup", "starters", true), item("gone", "starters", false)],
			food_types: vec![FoodType {
				id: "vegan".into(),
				name: text(&[("en", "Vegan")]),
				icon: None,
				color: None,
				sort_order: 0,
				created_at: 0,
				updated_at: 0,
			}],
			materials: vec![Material {
				id: "nuts".into(),
				name: text(&[("en", "Nuts")]),
				is_allergen: true,
				created_at: 0,
				updated_at: 0,
			}],
			branch: None,
		}
	}

	#[test]
	fn test_requested_language_with_fallback() {
		let menu = build_public_menu(source(Settings::default()), Some("ar"));
		assert_eq!(menu.language, "ar");
		assert_eq!(menu.direction, TextDirection::Rtl);
		assert_eq!(menu.categories[0].name, "قسم");
		// Missing Arabic item name falls back to the default language.
		assert_eq!(menu.categories[0].items[0].name, "Soup");
		assert_eq!(menu.languages.len(), 2);
	}

	#[test]
	fn test_unknown_or_inactive_language_uses_default() {
		let menu = build_public_menu(source(Settings::default()), Some("fr"));
		assert_eq!(menu.language, "en");
		let menu = build_public_menu(source(Settings::default()), None);
		assert_eq!(menu.language, "en");
	}

	#[test]
	fn test_active_categories_and_available_items() {
		let menu = build_public_menu(source(Settings::default()), None);
		let ids: Vec<_> = menu.categories.iter().map(|c| c.id.as_str()).collect();
		assert_eq!(ids, vec!["starters", "mains"]);
		assert_eq!(menu.categories[0].items.len(), 1);
		assert!(menu.categories[1].items.is_empty());

		let soup = &menu.categories[0].items[0];
		assert_eq!(soup.price, Some(Decimal::new(450, 2)));
		assert_eq!(soup.food_types[0].name, "Vegan");
		assert!(soup.materials[0].is_allergen);
		assert_eq!(soup.calories, None);
	}

	#[test]
	fn test_toggles_hide_fields() {
		let settings = Settings {
			show_prices: false,
			show_images: false,
			show_food_types: false,
			show_allergens: false,
			show_calories: true,
			..Settings::default()
		};
		let menu = build_public_menu(source(settings), None);
		let soup = &menu.categories[0].items[0];
		assert_eq!(soup.price, None);
		assert_eq!(soup.image_url, None);
		assert!(soup.food_types.is_empty());
		assert!(soup.materials.is_empty());
		assert_eq!(soup.calories, Some(320));

		let json = serde_json::to_value(soup).unwrap();
		assert!(json.get("price").is_none());
	}
}
