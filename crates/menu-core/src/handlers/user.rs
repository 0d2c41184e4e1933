//! Staff accounts, roles and login.
//!
//! Passwords are stored as `salt$hex(sha3_256(salt || password))`. The
//! service always keeps at least one active administrator.

use super::{load, new_id, HandlerError};
use menu_storage::StorageService;
use menu_types::{
	current_timestamp, CreateUserRequest, LoginRequest, Role, RoleInfo, SecretString, StorageKey,
	UpdateUserRequest, User, UserView,
};
use sha3::{Digest, Sha3_256};
use std::sync::Arc;
use validator::Validate;

const ENTITY: &str = "User";

fn hash_with_salt(salt: &str, password: &SecretString) -> String {
	let mut hasher = Sha3_256::new();
	hasher.update(salt.as_bytes());
	password.with_exposed(|secret| hasher.update(secret.as_bytes()));
	hex::encode(hasher.finalize())
}

pub(crate) fn hash_password(password: &SecretString) -> String {
	let salt = uuid::Uuid::new_v4().simple().to_string();
	format!("{}${}", salt, hash_with_salt(&salt, password))
}

pub(crate) fn verify_password(stored: &str, password: &SecretString) -> bool {
	let Some((salt, hash)) = stored.split_once('$') else {
		return false;
	};
	match (hex::decode(hash), hex::decode(hash_with_salt(salt, password))) {
		(Ok(expected), Ok(actual)) => constant_time_eq(&expected, &actual),
		_ => false,
	}
}

/// Compares without an early exit on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	a.len() == b.len()
		&& a
			.iter()
			.zip(b)
			.fold(0u8, |diff, (x, y)| diff | (x ^ y))
			== 0
}

pub struct UserHandler {
	storage: Arc<StorageService>,
}

impl UserHandler {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Every role with its fixed permission set.
	pub fn roles(&self) -> Vec<RoleInfo> {
		Role::all()
			.into_iter()
			.map(|role| RoleInfo {
				role,
				permissions: role.permissions().to_vec(),
			})
			.collect()
	}

	pub async fn list(&self) -> Result<Vec<UserView>, HandlerError> {
		let mut users = self.all().await?;
		users.sort_by(|a, b| a.username.cmp(&b.username));
		Ok(users.iter().map(UserView::from).collect())
	}

	pub async fn get(&self, id: &str) -> Result<UserView, HandlerError> {
		Ok(UserView::from(&self.load(id).await?))
	}

	pub async fn count(&self) -> Result<usize, HandlerError> {
		Ok(self.all().await?.len())
	}

	pub async fn create(&self, request: CreateUserRequest) -> Result<UserView, HandlerError> {
		request.validate()?;

		let username = request.username.trim().to_string();
		if self.find_by_username(&username).await?.is_some() {
			return Err(HandlerError::Conflict(format!(
				"username '{}' is already taken",
				username
			)));
		}

		let now = current_timestamp();
		let user = User {
			id: new_id(),
			username,
			email: request.email,
			full_name: request.full_name,
			role: request.role,
			is_active: request.is_active,
			password_hash: hash_password(&request.password),
			created_at: now,
			updated_at: now,
		};
		self.storage
			.store(StorageKey::Users.as_str(), &user.id, &user)
			.await?;

		tracing::info!(user = %user.username, role = %user.role, "User created");
		Ok(UserView::from(&user))
	}

	pub async fn update(
		&self,
		id: &str,
		request: UpdateUserRequest,
	) -> Result<UserView, HandlerError> {
		request.validate()?;

		let mut user = self.load(id).await?;
		let loses_admin = request.role != Role::Admin || !request.is_active;
		if loses_admin {
			self.ensure_not_last_admin(&user).await?;
		}

		user.email = request.email;
		user.full_name = request.full_name;
		user.role = request.role;
		user.is_active = request.is_active;
		if let Some(password) = &request.password {
			user.password_hash = hash_password(password);
		}
		user.updated_at = current_timestamp();
		self.storage
			.update(StorageKey::Users.as_str(), &user.id, &user)
			.await?;

		Ok(UserView::from(&user))
	}

	pub async fn delete(&self, id: &str) -> Result<(), HandlerError> {
		let user = self.load(id).await?;
		self.ensure_not_last_admin(&user).await?;
		self.storage.remove(StorageKey::Users.as_str(), id).await?;
		tracing::info!(user = %user.username, "User deleted");
		Ok(())
	}

	/// Verifies credentials of an active account.
	pub async fn login(&self, request: LoginRequest) -> Result<UserView, HandlerError> {
		request.validate()?;

		let user = self
			.find_by_username(request.username.trim())
			.await?
			.filter(|user| user.is_active)
			.filter(|user| verify_password(&user.password_hash, &request.password));

		match user {
			Some(user) => {
				tracing::info!(user = %user.username, "Login succeeded");
				Ok(UserView::from(&user))
			}
			None => {
				tracing::warn!(user = %request.username, "Login failed");
				Err(HandlerError::InvalidCredentials)
			}
		}
	}

	async fn ensure_not_last_admin(&self, user: &User) -> Result<(), HandlerError> {
		if user.role != Role::Admin || !user.is_active {
			return Ok(());
		}
		let other_admins = self
			.all()
			.await?
			.into_iter()
			.filter(|other| other.id != user.id && other.role == Role::Admin && other.is_active)
			.count();
		if other_admins == 0 {
			return Err(HandlerError::Conflict(
				"the last active administrator cannot be removed, demoted or deactivated".into(),
			));
		}
		Ok(())
	}

	async fn find_by_username(&self, username: &str) -> Result<Option<User>, HandlerError> {
		Ok(self
			.all()
			.await?
			.into_iter()
			.find(|user| user.username.eq_ignore_ascii_case(username)))
	}

	async fn all(&self) -> Result<Vec<User>, HandlerError> {
		Ok(self.storage.list(StorageKey::Users.as_str()).await?)
	}

	async fn load(&self, id: &str) -> Result<User, HandlerError> {
		load(&self.storage, StorageKey::Users.as_str(), ENTITY, id).await
	}
}
