//! Staff accounts and roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
	ManageMenu,
	ManageBranches,
	ManageUsers,
	ManageLanguages,
	ManageSettings,
	ManageOrders,
	ViewKitchen,
	ViewDashboard,
}

/// Staff role. Each role carries a fixed permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Admin,
	Manager,
	Waiter,
	Kitchen,
}

impl Role {
	pub fn all() -> [Role; 4] {
		[Role::Admin, Role::Manager, Role::Waiter, Role::Kitchen]
	}

	pub fn permissions(&self) -> &'static [Permission] {
		use Permission::*;
		match self {
			Role::Admin => &[
				ManageMenu,
				ManageBranches,
				ManageUsers,
				ManageLanguages,
				ManageSettings,
				ManageOrders,
				ViewKitchen,
				ViewDashboard,
			],
			Role::Manager => &[
				ManageMenu,
				ManageBranches,
				ManageLanguages,
				ManageOrders,
				ViewKitchen,
				ViewDashboard,
			],
			Role::Waiter => &[ManageOrders, ViewKitchen],
			Role::Kitchen => &[ViewKitchen],
		}
	}

	pub fn has_permission(&self, permission: Permission) -> bool {
		self.permissions().contains(&permission)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Role::Admin => "admin",
			Role::Manager => "manager",
			Role::Waiter => "waiter",
			Role::Kitchen => "kitchen",
		};
		f.write_str(name)
	}
}

/// A staff account as persisted, including its password hash.
///
/// Never serialize this type into an HTTP response; use [`UserView`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	pub id: String,
	pub username: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub full_name: Option<String>,
	pub role: Role,
	pub is_active: bool,
	/// `salt$hex(sha3_256(salt || password))`.
	pub password_hash: String,
	pub created_at: u64,
	pub updated_at: u64,
}

/// Public projection of a [`User`] without credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
	pub id: String,
	pub username: String,
	pub email: Option<String>,
	pub full_name: Option<String>,
	pub role: Role,
	pub permissions: Vec<Permission>,
	pub is_active: bool,
	pub created_at: u64,
	pub updated_at: u64,
}

impl From<&User> for UserView {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.clone(),
			username: user.username.clone(),
			email: user.email.clone(),
			full_name: user.full_name.clone(),
			role: user.role,
			permissions: user.role.permissions().to_vec(),
			is_active: user.is_active,
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}
