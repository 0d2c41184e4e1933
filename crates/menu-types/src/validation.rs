//! Configuration validation utilities for backend configuration tables.
//!
//! Backends receive their configuration as raw TOML values. A [`Schema`]
//! describes the expected keys and their types so that misconfigured
//! backends fail at startup with a precise message.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// A required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// A field has the wrong TOML type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: &'static str,
		actual: String,
	},
	/// A key that the schema does not know about.
	#[error("Unknown field: {0}")]
	UnknownField(String),
}

/// Expected type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// An integer with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
	/// An array whose elements all have the inner type.
	Array(Box<FieldType>),
}

impl FieldType {
	fn name(&self) -> &'static str {
		match self {
			FieldType::String => "string",
			FieldType::Integer { .. } => "integer",
			FieldType::Boolean => "boolean",
			FieldType::Array(_) => "array",
		}
	}

	fn check(&self, field: &str, value: &toml::Value) -> Result<(), ValidationError> {
		let mismatch = || ValidationError::TypeMismatch {
			field: field.to_string(),
			expected: self.name(),
			actual: value.type_str().to_string(),
		};

		match self {
			FieldType::String => value.as_str().map(|_| ()).ok_or_else(mismatch),
			FieldType::Boolean => value.as_bool().map(|_| ()).ok_or_else(mismatch),
			FieldType::Integer { min, max } => {
				let number = value.as_integer().ok_or_else(mismatch)?;
				if min.is_some_and(|min| number < min) || max.is_some_and(|max| number > max) {
					return Err(ValidationError::InvalidValue {
						field: field.to_string(),
						message: format!(
							"{} is outside the allowed range {}..={}",
							number,
							min.map_or("".to_string(), |v| v.to_string()),
							max.map_or("".to_string(), |v| v.to_string()),
						),
					});
				}
				Ok(())
			},
			FieldType::Array(inner) => {
				let items = value.as_array().ok_or_else(mismatch)?;
				items
					.iter()
					.enumerate()
					.try_for_each(|(i, item)| inner.check(&format!("{}[{}]", field, i), item))
			},
		}
	}
}

/// Custom check run after the type check succeeds.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named field in a [`Schema`].
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Attaches a custom validator returning an error message on failure.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn validate(&self, value: &toml::Value) -> Result<(), ValidationError> {
		self.field_type.check(&self.name, value)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Validation schema for one backend configuration table.
///
/// Keys that are neither required nor optional are rejected, which catches
/// typos such as `storage_pth`.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML table against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table",
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.validate(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.validate(value)?;
			}
		}

		if let Some(unknown) = table.keys().find(|key| {
			!self
				.required
				.iter()
				.chain(&self.optional)
				.any(|field| &field.name == *key)
		}) {
			return Err(ValidationError::UnknownField(unknown.clone()));
		}

		Ok(())
	}
}

/// A configuration schema that can validate backend TOML values.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(
			vec![Field::new("database_url", FieldType::String).with_validator(|v| {
				match v.as_str() {
					Some(url) if url.starts_with("postgres") => Ok(()),
					_ => Err("must be a postgres URL".into()),
				}
			})],
			vec![
				Field::new(
					"max_connections",
					FieldType::Integer {
						min: Some(1),
						max: Some(64),
					},
				),
				Field::new("tags", FieldType::Array(Box::new(FieldType::String))),
			],
		)
	}

	fn parse(s: &str) -> toml::Value {
		toml::from_str(s).unwrap()
	}

	#[test]
	fn test_valid_config_passes() {
		let config = parse("database_url = \"postgres://localhost/menu\"\nmax_connections = 4");
		assert!(schema().validate(&config).is_ok());
	}

	#[test]
	fn test_missing_and_unknown_fields() {
		let missing = schema().validate(&parse("max_connections = 4"));
		assert!(matches!(missing, Err(ValidationError::MissingField(f)) if f == "database_url"));

		let unknown = schema().validate(&parse(
			"database_url = \"postgres://x\"\nmax_conections = 4",
		));
		assert!(matches!(unknown, Err(ValidationError::UnknownField(f)) if f == "max_conections"));
	}

	#[test]
	fn test_range_type_and_custom_checks() {
		let out_of_range =
			schema().validate(&parse("database_url = \"postgres://x\"\nmax_connections = 0"));
		assert!(matches!(out_of_range, Err(ValidationError::InvalidValue { .. })));

		let bad_element =
			schema().validate(&parse("database_url = \"postgres://x\"\ntags = [\"a\", 1]"));
		assert!(
			matches!(bad_element, Err(ValidationError::TypeMismatch { field, .. }) if field == "tags[1]")
		);

		let bad_url = schema().validate(&parse("database_url = \"mysql://x\""));
		assert!(bad_url.unwrap_err().to_string().contains("postgres URL"));
	}
}
