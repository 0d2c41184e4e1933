//! In-memory storage backend.
//!
//! Nothing survives a restart. Useful for tests, demos and single-instance
//! development setups. TTLs are honored so it behaves like the persistent
//! backends.

use crate::{namespace_ttl, ttls_from_config, StorageError, StorageInterface};
use async_trait::async_trait;
use menu_types::{ConfigSchema, Field, FieldType, Schema, StorageKey, ValidationError};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
	value: Vec<u8>,
	expires_at: Option<Instant>,
}

impl Entry {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|at| now >= at)
	}
}

pub struct MemoryStorage {
	store: RwLock<HashMap<String, Entry>>,
	ttls: HashMap<StorageKey, Duration>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::with_ttls(HashMap::new())
	}

	pub fn with_ttls(ttls: HashMap<StorageKey, Duration>) -> Self {
		Self {
			store: RwLock::new(HashMap::new()),
			ttls,
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		match store.get(key) {
			Some(entry) if !entry.is_expired(Instant::now()) => Ok(entry.value.clone()),
			_ => Err(StorageError::NotFound),
		}
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let ttl = ttl
			.filter(|t| !t.is_zero())
			.or_else(|| namespace_ttl(&self.ttls, key));
		let entry = Entry {
			value,
			expires_at: ttl.map(|t| Instant::now() + t),
		};
		self.store.write().await.insert(key.to_string(), entry);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.store.write().await.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store
			.get(key)
			.is_some_and(|entry| !entry.is_expired(Instant::now())))
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let now = Instant::now();
		let store = self.store.read().await;
		Ok(store
			.iter()
			.filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired(now))
			.map(|(key, _)| key.clone())
			.collect())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		let now = Instant::now();
		let mut store = self.store.write().await;
		let before = store.len();
		store.retain(|_, entry| !entry.is_expired(now));
		Ok(before - store.len())
	}
}

/// Accepts only `ttl_{namespace}` keys.
pub struct MemoryStorageSchema;

pub(crate) fn ttl_fields() -> Vec<Field> {
	StorageKey::all()
		.map(|sk| {
			Field::new(
				format!("ttl_{}", sk.as_str()),
				FieldType::Integer {
					min: Some(0),
					max: None,
				},
			)
		})
		.collect()
}

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], ttl_fields()).validate(config)
	}
}

pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	MemoryStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;
	Ok(Box::new(MemoryStorage::with_ttls(ttls_from_config(config))))
}

pub struct Registry;

impl menu_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}
