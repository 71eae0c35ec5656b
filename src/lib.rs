//! Multi-tenant project planning service.
//!
//! planboard exposes a JSON HTTP API for research project plans. Every
//! account owns a set of projects, a project is broken into work
//! packages, and each work package carries tasks, deliverables and a
//! per-member monthly budget. Team members are a shared pool attached
//! to work packages and tasks by id.
//!
//! [`build_app`] assembles the router and middleware into a single
//! [`Handler`](http::Handler); [`server::HttpServer`] puts that handler
//! on a socket.
//!
//! # Examples
//!
//! ```rust,no_run
//! use planboard::conf::Settings;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let pool = planboard::store::connect(&settings.database_url).await?;
//! let app = planboard::build_app(pool, &settings);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod budget;
pub mod conf;
pub mod error;
pub mod http;
pub mod middleware;
pub mod models;
pub mod router;
pub mod scope;
pub mod serializers;
pub mod server;
pub mod store;
pub mod urls;
pub mod validators;
pub mod views;

pub use error::{Error, Result};

use std::sync::Arc;

use chrono::Duration;
use sqlx::SqlitePool;

use crate::auth::{Argon2Hasher, JwtAuth, PasswordHasher};
use crate::conf::Settings;
use crate::http::{Handler, MiddlewareChain};
use crate::middleware::{AuthMiddleware, CorsMiddleware, LoggingMiddleware};

/// Assembles the application handler: URL router wrapped in middleware.
///
/// Middleware run outside-in in registration order, so every request is
/// logged first, CORS preflights are answered before authentication,
/// and anything else must present a bearer token before it reaches a
/// view.
pub fn build_app(pool: SqlitePool, settings: &Settings) -> Arc<dyn Handler> {
	let jwt = Arc::new(JwtAuth::new(
		settings.secret_key.as_bytes(),
		Duration::minutes(settings.access_token_minutes),
		Duration::minutes(settings.refresh_token_minutes),
	));
	let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

	let router = urls::build_router(pool, jwt.clone(), hasher);

	let chain = MiddlewareChain::new(Arc::new(router))
		.with_middleware(Arc::new(LoggingMiddleware::new()))
		.with_middleware(Arc::new(CorsMiddleware::permissive()))
		.with_middleware(Arc::new(AuthMiddleware::new(jwt)));

	Arc::new(chain)
}
