//! File-based storage backend.
//!
//! Each record lives in `{storage_path}/{namespace}/{id}.bin`: a fixed
//! 64-byte header carrying the expiry, followed by the JSON payload. Writes
//! go to a temporary file and are renamed into place. The backend holds an
//! exclusive lock on `{storage_path}/.lock` so two service instances never
//! share one directory.

use crate::{namespace_ttl, split_key, ttls_from_config, StorageError, StorageInterface};
use async_trait::async_trait;
use fs2::FileExt;
use menu_types::{
	current_timestamp, ConfigSchema, Field, FieldType, Schema, StorageKey, ValidationError,
};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Record header.
///
/// Layout (64 bytes):
/// - `[0..4]`: magic `MENU`
/// - `[4..6]`: format version, u16 LE
/// - `[6..14]`: expiry as unix seconds, u64 LE, 0 = never
/// - `[14..64]`: zero padding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordHeader {
	expires_at: u64,
}

impl RecordHeader {
	const MAGIC: &'static [u8; 4] = b"MENU";
	const VERSION: u16 = 1;
	const SIZE: usize = 64;

	fn with_ttl(ttl: Option<Duration>) -> Self {
		let expires_at = ttl
			.filter(|t| !t.is_zero())
			.map(|t| current_timestamp().saturating_add(t.as_secs().max(1)))
			.unwrap_or(0);
		Self { expires_at }
	}

	fn encode(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(Self::MAGIC);
		bytes[4..6].copy_from_slice(&Self::VERSION.to_le_bytes());
		bytes[6..14].copy_from_slice(&self.expires_at.to_le_bytes());
		bytes
	}

	fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE || &bytes[0..4] != Self::MAGIC {
			return Err(StorageError::Backend("Corrupt record header".into()));
		}
		let version = u16::from_le_bytes([bytes[4], bytes[5]]);
		if version > Self::VERSION {
			return Err(StorageError::Backend(format!(
				"Unsupported record version: {}",
				version
			)));
		}
		let mut expires = [0u8; 8];
		expires.copy_from_slice(&bytes[6..14]);
		Ok(Self {
			expires_at: u64::from_le_bytes(expires),
		})
	}

	fn is_expired(&self, now: u64) -> bool {
		self.expires_at != 0 && now >= self.expires_at
	}
}

pub struct FileStorage {
	base_path: PathBuf,
	ttls: HashMap<StorageKey, Duration>,
	/// Held for the lifetime of the backend; the lock is released on drop.
	_lock: File,
}

impl FileStorage {
	/// Opens (creating if needed) a storage directory and locks it.
	pub fn open(
		base_path: impl Into<PathBuf>,
		ttls: HashMap<StorageKey, Duration>,
	) -> Result<Self, StorageError> {
		let base_path = base_path.into();
		std::fs::create_dir_all(&base_path).map_err(|e| {
			StorageError::Backend(format!("Cannot create {}: {}", base_path.display(), e))
		})?;

		let lock = File::create(base_path.join(".lock"))
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		lock.try_lock_exclusive().map_err(|_| {
			StorageError::Backend(format!(
				"Storage directory {} is locked by another process",
				base_path.display()
			))
		})?;

		Ok(Self {
			base_path,
			ttls,
			_lock: lock,
		})
	}

	fn record_path(&self, key: &str) -> PathBuf {
		let (namespace, id) = split_key(key);
		let namespace = if namespace.is_empty() {
			"default"
		} else {
			namespace
		};
		self.base_path
			.join(sanitize(namespace))
			.join(format!("{}.bin", sanitize(id)))
	}

	async fn read_record(&self, path: &Path) -> Result<Option<(RecordHeader, Vec<u8>)>, StorageError> {
		let data = match fs::read(path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};
		let header = RecordHeader::decode(&data)?;
		Ok(Some((header, data)))
	}

	/// Namespace directories currently on disk.
	async fn namespaces(&self) -> Result<Vec<String>, StorageError> {
		let mut dirs = Vec::new();
		let mut entries = fs::read_dir(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let is_dir = entry
				.file_type()
				.await
				.map(|t| t.is_dir())
				.unwrap_or(false);
			if is_dir {
				if let Some(name) = entry.file_name().to_str() {
					dirs.push(name.to_string());
				}
			}
		}
		Ok(dirs)
	}

	/// Record files of one namespace as `(id, path)`.
	async fn records(&self, namespace: &str) -> Result<Vec<(String, PathBuf)>, StorageError> {
		let dir = self.base_path.join(namespace);
		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut records = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension().and_then(|e| e.to_str()) != Some("bin") {
				continue;
			}
			if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
				records.push((id.to_string(), path.clone()));
			}
		}
		Ok(records)
	}
}

/// Keeps ids inside their namespace directory.
fn sanitize(part: &str) -> String {
	part.chars()
		.map(|c| match c {
			'/' | '\\' | ':' | '\0' => '_',
			c => c,
		})
		.collect::<String>()
		.replace("..", "__")
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		match self.read_record(&self.record_path(key)).await? {
			Some((header, data)) if !header.is_expired(current_timestamp()) => {
				Ok(data[RecordHeader::SIZE..].to_vec())
			}
			_ => Err(StorageError::NotFound),
		}
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let path = self.record_path(key);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let ttl = ttl
			.filter(|t| !t.is_zero())
			.or_else(|| namespace_ttl(&self.ttls, key));
		let mut data = Vec::with_capacity(RecordHeader::SIZE + value.len());
		data.extend_from_slice(&RecordHeader::with_ttl(ttl).encode());
		data.extend_from_slice(&value);

		// Unique per write so concurrent writers never share a temp file.
		let temp_path = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
		fs::write(&temp_path, data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		match fs::remove_file(self.record_path(key)).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(matches!(
			self.read_record(&self.record_path(key)).await?,
			Some((header, _)) if !header.is_expired(current_timestamp())
		))
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let namespaces = match split_key(prefix) {
			("", _) => self.namespaces().await?,
			(namespace, _) => vec![sanitize(namespace)],
		};

		let now = current_timestamp();
		let mut keys = Vec::new();
		for namespace in namespaces {
			for (id, path) in self.records(&namespace).await? {
				let key = format!("{}:{}", namespace, id);
				if !key.starts_with(prefix) {
					continue;
				}
				match self.read_record(&path).await {
					Ok(Some((header, _))) if !header.is_expired(now) => keys.push(key),
					Ok(_) => {}
					Err(e) => tracing::warn!("Skipping unreadable record {:?}: {}", path, e),
				}
			}
		}
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		let now = current_timestamp();
		let mut removed = 0;
		for namespace in self.namespaces().await? {
			for (_, path) in self.records(&namespace).await? {
				let expired = matches!(
					self.read_record(&path).await,
					Ok(Some((header, _))) if header.is_expired(now)
				);
				if !expired {
					continue;
				}
				match fs::remove_file(&path).await {
					Ok(()) => removed += 1,
					Err(e) => tracing::warn!("Failed to remove expired record {:?}: {}", path, e),
				}
			}
		}
		Ok(removed)
	}
}

/// Accepts `storage_path` plus `ttl_{namespace}` keys.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let mut optional = vec![Field::new("storage_path", FieldType::String)];
		optional.extend(super::memory::ttl_fields());
		Schema::new(vec![], optional).validate(config)
	}
}

/// Builds a file backend.
///
/// - `storage_path`: base directory (default `./data/storage`)
/// - `ttl_{namespace}`: seconds before records of that namespace expire
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage");

	Ok(Box::new(FileStorage::open(
		storage_path,
		ttls_from_config(config),
	)?))
}

pub struct Registry;

impl menu_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn open(dir: &TempDir) -> FileStorage {
		FileStorage::open(dir.path(), HashMap::new()).unwrap()
	}

	#[tokio::test]
	async fn test_records_live_in_namespace_directories() {
		let dir = TempDir::new().unwrap();
		let storage = open(&dir);

		storage
			.set_bytes("items:abc", b"{}".to_vec(), None)
			.await
			.unwrap();
		assert!(dir.path().join("items").join("abc.bin").exists());
		assert_eq!(storage.get_bytes("items:abc").await.unwrap(), b"{}".to_vec());

		storage.delete("items:abc").await.unwrap();
		assert!(!storage.exists("items:abc").await.unwrap());
		storage.delete("items:abc").await.unwrap();
	}

	#[tokio::test]
	async fn test_concurrent_writes_to_one_key() {
		let dir = TempDir::new().unwrap();
		let storage = std::sync::Arc::new(open(&dir));

		let writers: Vec<_> = (0..16u8)
			.map(|n| {
				let storage = storage.clone();
				tokio::spawn(async move {
					storage.set_bytes("orders:1", vec![n; 64], None).await
				})
			})
			.collect();
		for writer in writers {
			writer.await.unwrap().unwrap();
		}

		let value = storage.get_bytes("orders:1").await.unwrap();
		assert_eq!(value.len(), 64);
		assert!(value.iter().all(|b| *b == value[0]));
		assert_eq!(storage.list_keys("").await.unwrap(), vec!["orders:1"]);

		let leftovers = std::fs::read_dir(dir.path().join("orders"))
			.unwrap()
			.filter(|entry| {
				entry
					.as_ref()
					.unwrap()
					.path()
					.extension()
					.is_some_and(|ext| ext == "tmp")
			})
			.count();
		assert_eq!(leftovers, 0);
	}

	#[tokio::test]
	async fn test_list_keys() {
		let dir = TempDir::new().unwrap();
		let storage = open(&dir);
		for key in ["orders:1", "orders:2", "tables:9"] {
			storage.set_bytes(key, vec![1], None).await.unwrap();
		}

		let mut keys = storage.list_keys("orders:").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["orders:1", "orders:2"]);

		let mut all = storage.list_keys("").await.unwrap();
		all.sort();
		assert_eq!(all, vec!["orders:1", "orders:2", "tables:9"]);
	}

	#[tokio::test]
	async fn test_ids_cannot_escape_namespace() {
		let dir = TempDir::new().unwrap();
		let storage = open(&dir);
		storage
			.set_bytes("items:../../etc", vec![1], None)
			.await
			.unwrap();
		assert!(dir.path().join("items").join("______etc.bin").exists());
	}

	#[tokio::test]
	async fn test_expiry_and_cleanup() {
		let dir = TempDir::new().unwrap();
		let storage = open(&dir);

		// Write an already expired record directly.
		let path = storage.record_path("orders:old");
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		let mut data = RecordHeader { expires_at: 1 }.encode().to_vec();
		data.extend_from_slice(b"{}");
		std::fs::write(&path, data).unwrap();

		storage
			.set_bytes("orders:new", vec![1], Some(Duration::from_secs(3600)))
			.await
			.unwrap();

		assert!(matches!(
			storage.get_bytes("orders:old").await,
			Err(StorageError::NotFound)
		));
		assert_eq!(storage.list_keys("orders:").await.unwrap(), vec!["orders:new"]);
		assert_eq!(storage.cleanup_expired().await.unwrap(), 1);
		assert!(!path.exists());
		assert!(storage.exists("orders:new").await.unwrap());
	}

	#[tokio::test]
	async fn test_persists_across_reopen() {
		let dir = TempDir::new().unwrap();
		{
			let storage = open(&dir);
			storage
				.set_bytes("settings:current", b"{\"a\":1}".to_vec(), None)
				.await
				.unwrap();
		}
		let storage = open(&dir);
		assert_eq!(
			storage.get_bytes("settings:current").await.unwrap(),
			b"{\"a\":1}".to_vec()
		);
	}

	#[test]
	fn test_directory_lock_is_exclusive() {
		let dir = TempDir::new().unwrap();
		let _first = open(&dir);
		let second = FileStorage::open(dir.path(), HashMap::new());
		assert!(matches!(second, Err(StorageError::Backend(_))));
	}

	#[test]
	fn test_header_roundtrip_and_corruption() {
		let header = RecordHeader { expires_at: 42 };
		assert_eq!(RecordHeader::decode(&header.encode()).unwrap(), header);
		assert!(RecordHeader::decode(b"short").is_err());
		assert!(RecordHeader::decode(&[0u8; 64]).is_err());
	}
}
