//! Restaurant branches and the tables they own.

use serde::{Deserialize, Serialize};

/// A restaurant location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub address: Option<String>,
	#[serde(default)]
	pub phone: Option<String>,
	pub is_active: bool,
	pub created_at: u64,
	pub updated_at: u64,
}

/// A table inside a branch. Customers reach the menu by scanning its QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
	pub id: String,
	pub branch_id: String,
	/// Label shown to staff and printed next to the QR code, e.g. "12" or "Terrace 3".
	pub number: String,
	pub capacity: u32,
	pub is_active: bool,
	pub created_at: u64,
	pub updated_at: u64,
}
