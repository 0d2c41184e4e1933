//! Storage namespaces for the menu service.

use std::str::FromStr;

/// Storage namespaces for the persisted collections.
///
/// Every record is stored under `"{namespace}:{id}"`, so the namespace also
/// selects the per-collection TTL in backends that support expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	Users,
	Branches,
	Tables,
	Categories,
	Items,
	FoodTypes,
	Materials,
	Languages,
	Orders,
	Settings,
	/// Monotonic counters such as the next order number.
	Counters,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Users => "users",
			StorageKey::Branches => "branches",
			StorageKey::Tables => "tables",
			StorageKey::Categories => "categories",
			StorageKey::Items => "items",
			StorageKey::FoodTypes => "food_types",
			StorageKey::Materials => "materials",
			StorageKey::Languages => "languages",
			StorageKey::Orders => "orders",
			StorageKey::Settings => "settings",
			StorageKey::Counters => "counters",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Users,
			Self::Branches,
			Self::Tables,
			Self::Categories,
			Self::Items,
			Self::FoodTypes,
			Self::Materials,
			Self::Languages,
			Self::Orders,
			Self::Settings,
			Self::Counters,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all().find(|key| key.as_str() == s).ok_or(())
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
