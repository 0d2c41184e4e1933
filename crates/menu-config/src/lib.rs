//! Configuration module for the restaurant menu service.
//!
//! Configuration is loaded from TOML files. String values may reference
//! environment variables as `${VAR}` or `${VAR:-default}`, and a file may
//! pull other files in with `include = ["storage.toml"]`.
//!
//! ## Modular Configuration Support
//!
//! Each top-level section must be unique across all included files.

mod loader;

use menu_types::SecretString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub use loader::ConfigLoader;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only, not the echoed input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the menu service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this service instance.
	pub service: ServiceConfig,
	/// Storage backends.
	pub storage: StorageConfig,
	/// HTTP API server.
	pub api: Option<ApiConfig>,
	/// Limits applied when orders are placed.
	#[serde(default)]
	pub orders: OrdersConfig,
	/// Records seeded into empty storage on first start.
	#[serde(default)]
	pub bootstrap: BootstrapConfig,
}

/// Identity of this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Identifier used in logs.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
	/// Interval in seconds for cleaning up expired storage entries.
	#[serde(default = "default_cleanup_interval")]
	pub cleanup_interval_seconds: u64,
}

fn default_cleanup_interval() -> u64 {
	3600
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Maximum request body size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
	/// Maximum size of an inline `data:image` upload, in bytes of URL text.
	#[serde(default = "default_max_image_bytes")]
	pub max_image_bytes: usize,
	pub cors: Option<CorsConfig>,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			host: default_api_host(),
			port: default_api_port(),
			timeout_seconds: default_api_timeout(),
			max_request_size: default_max_request_size(),
			max_image_bytes: default_max_image_bytes(),
			cors: None,
		}
	}
}

/// CORS configuration. Without it the API is permissive, which suits the
/// admin panel and public menu being served from another origin in development.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
	pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	30
}

fn default_max_request_size() -> usize {
	4 * 1024 * 1024 // 4MB, images arrive inline
}

fn default_max_image_bytes() -> usize {
	2 * 1024 * 1024
}

/// Limits applied when orders are placed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrdersConfig {
	#[serde(default = "default_max_items_per_order")]
	pub max_items_per_order: usize,
	#[serde(default = "default_max_quantity_per_item")]
	pub max_quantity_per_item: u32,
}

impl Default for OrdersConfig {
	fn default() -> Self {
		Self {
			max_items_per_order: default_max_items_per_order(),
			max_quantity_per_item: default_max_quantity_per_item(),
		}
	}
}

fn default_max_items_per_order() -> usize {
	50
}

fn default_max_quantity_per_item() -> u32 {
	99
}

/// Records seeded into empty storage on first start.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BootstrapConfig {
	/// Language created when no language exists yet.
	#[serde(default)]
	pub default_language: LanguageSeed,
	/// Administrator created when no user exists yet.
	pub admin: Option<AdminSeed>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LanguageSeed {
	pub code: String,
	pub name: String,
	pub native_name: Option<String>,
}

impl Default for LanguageSeed {
	fn default() -> Self {
		Self {
			code: "en".to_string(),
			name: "English".to_string(),
			native_name: Some("English".to_string()),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminSeed {
	pub username: String,
	pub password: SecretString,
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of VAR_NAME, or with the default in
/// `${VAR_NAME:-default}` when the variable is unset.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures<'_>| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| var_name.to_string());
				String::new()
			}
		}
	});

	match missing {
		Some(var_name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path.display())))?;

		ConfigLoader::new(base_dir).load_config(file_name).await
	}

	/// Returns the API configuration when the server is enabled.
	pub fn enabled_api(&self) -> Option<&ApiConfig> {
		self.api.as_ref().filter(|api| api.enabled)
	}

	/// Validates cross-field constraints serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}
		if !(1..=86400).contains(&self.storage.cleanup_interval_seconds) {
			return Err(ConfigError::Validation(
				"Storage cleanup_interval_seconds must be within 1..=86400".into(),
			));
		}

		if let Some(api) = self.enabled_api() {
			if api.port == 0 {
				return Err(ConfigError::Validation("API port cannot be 0".into()));
			}
			if api.timeout_seconds == 0 {
				return Err(ConfigError::Validation(
					"API timeout_seconds must be greater than 0".into(),
				));
			}
			if api.max_image_bytes > api.max_request_size {
				return Err(ConfigError::Validation(format!(
					"API max_image_bytes ({}) cannot exceed max_request_size ({})",
					api.max_image_bytes, api.max_request_size
				)));
			}
		}

		if self.orders.max_items_per_order == 0 || self.orders.max_items_per_order > 1000 {
			return Err(ConfigError::Validation(
				"orders.max_items_per_order must be within 1..=1000".into(),
			));
		}
		if self.orders.max_quantity_per_item == 0 || self.orders.max_quantity_per_item > 1000 {
			return Err(ConfigError::Validation(
				"orders.max_quantity_per_item must be within 1..=1000".into(),
			));
		}

		if self.bootstrap.default_language.code.trim().is_empty() {
			return Err(ConfigError::Validation(
				"bootstrap.default_language.code cannot be empty".into(),
			));
		}
		if let Some(admin) = &self.bootstrap.admin {
			if admin.username.trim().len() < 3 {
				return Err(ConfigError::Validation(
					"bootstrap.admin.username must be at least 3 characters".into(),
				));
			}
			if admin.password.len() < 6 {
				return Err(ConfigError::Validation(
					"bootstrap.admin.password must be at least 6 characters".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment variables and validating.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
