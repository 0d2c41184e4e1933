//! Menu languages.

use serde::{Deserialize, Serialize};

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
	#[default]
	Ltr,
	Rtl,
}

/// A language the menu can be displayed in. Identified by its code.
///
/// Exactly one language is the default; its translations are the fallback
/// whenever a requested translation is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
	/// ISO-style code, e.g. "en" or "pt-BR".
	pub code: String,
	pub name: String,
	#[serde(default)]
	pub native_name: Option<String>,
	#[serde(default)]
	pub direction: TextDirection,
	pub is_default: bool,
	pub is_active: bool,
	#[serde(default)]
	pub sort_order: i32,
	pub created_at: u64,
	pub updated_at: u64,
}
