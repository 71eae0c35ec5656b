//! Registration and token endpoints.
//!
//! These are the only public paths; everything else sits behind the
//! auth middleware. Token semantics: `token/` exchanges credentials for
//! an access/refresh pair, `token/refresh/` exchanges a refresh token
//! for a fresh access token, `token/verify/` answers `{}` for any token
//! that still verifies.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::auth::{JwtAuth, PasswordHasher};
use crate::error::{Error, Result};
use crate::http::{Handler, Request, Response};
use crate::serializers::{
	LoginSerializer, RefreshSerializer, RegisterSerializer, VerifySerializer, validate_payload,
};
use crate::store;
use crate::views::method_not_allowed;

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

pub struct RegisterView {
	pool: SqlitePool,
	hasher: Arc<dyn PasswordHasher>,
}

impl RegisterView {
	pub fn new(pool: SqlitePool, hasher: Arc<dyn PasswordHasher>) -> Self {
		Self { pool, hasher }
	}
}

#[async_trait]
impl Handler for RegisterView {
	async fn handle(&self, request: Request) -> Result<Response> {
		if request.method != hyper::Method::POST {
			return Err(method_not_allowed(&request.method));
		}

		let payload: RegisterSerializer = request.json()?;
		validate_payload(&payload)?;
		if payload.password != payload.password_confirm {
			return Err(Error::Validation("Passwords do not match.".to_string()));
		}

		let password_hash = self.hasher.hash(&payload.password)?;
		let account =
			store::accounts::create(&self.pool, &payload.username, &payload.email, &password_hash)
				.await?;

		tracing::info!(username = %account.username, "account registered");
		Response::created().with_json(&account)
	}
}

pub struct TokenObtainView {
	pool: SqlitePool,
	jwt: Arc<JwtAuth>,
	hasher: Arc<dyn PasswordHasher>,
}

impl TokenObtainView {
	pub fn new(pool: SqlitePool, jwt: Arc<JwtAuth>, hasher: Arc<dyn PasswordHasher>) -> Self {
		Self { pool, jwt, hasher }
	}
}

#[async_trait]
impl Handler for TokenObtainView {
	async fn handle(&self, request: Request) -> Result<Response> {
		if request.method != hyper::Method::POST {
			return Err(method_not_allowed(&request.method));
		}

		let payload: LoginSerializer = request.json()?;

		// Unknown username and wrong password answer identically.
		let account = store::accounts::find_by_username(&self.pool, &payload.username)
			.await?
			.ok_or_else(|| Error::Authentication(BAD_CREDENTIALS.to_string()))?;
		if !self.hasher.verify(&payload.password, &account.password_hash)? {
			return Err(Error::Authentication(BAD_CREDENTIALS.to_string()));
		}

		let pair = self.jwt.issue_pair(account.id, &account.username)?;
		Response::ok().with_json(&pair)
	}
}

pub struct TokenRefreshView {
	jwt: Arc<JwtAuth>,
}

impl TokenRefreshView {
	pub fn new(jwt: Arc<JwtAuth>) -> Self {
		Self { jwt }
	}
}

#[async_trait]
impl Handler for TokenRefreshView {
	async fn handle(&self, request: Request) -> Result<Response> {
		if request.method != hyper::Method::POST {
			return Err(method_not_allowed(&request.method));
		}

		let payload: RefreshSerializer = request.json()?;
		let access = self.jwt.refresh_access(&payload.refresh)?;
		Response::ok().with_json(&serde_json::json!({ "access": access }))
	}
}

pub struct TokenVerifyView {
	jwt: Arc<JwtAuth>,
}

impl TokenVerifyView {
	pub fn new(jwt: Arc<JwtAuth>) -> Self {
		Self { jwt }
	}
}

#[async_trait]
impl Handler for TokenVerifyView {
	async fn handle(&self, request: Request) -> Result<Response> {
		if request.method != hyper::Method::POST {
			return Err(method_not_allowed(&request.method));
		}

		let payload: VerifySerializer = request.json()?;
		self.jwt.verify(&payload.token)?;
		Response::ok().with_json(&serde_json::json!({}))
	}
}
