//! Shared harness for the HTTP integration tests.
//!
//! Each suite talks to the assembled middleware chain through
//! [`TestApp::send`], the same entry point the hyper service calls,
//! backed by a fresh in-memory SQLite database per test.

#![allow(dead_code)]

use std::sync::Arc;

use hyper::{Method, StatusCode};
use serde_json::{Value, json};

use planboard::conf::Settings;
use planboard::http::{Handler, Request, Response};
use planboard::{build_app, store};

pub struct TestApp {
	pub handler: Arc<dyn Handler>,
	pub pool: sqlx::SqlitePool,
}

fn test_settings(database_url: &str) -> Settings {
	Settings {
		host: "127.0.0.1".to_string(),
		port: 0,
		database_url: database_url.to_string(),
		secret_key: "integration-test-secret".to_string(),
		access_token_minutes: 30,
		refresh_token_minutes: 1440,
		log_filter: "warn".to_string(),
	}
}

/// Builds the application against a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
	spawn_app_with("sqlite::memory:").await
}

/// Builds the application against the given database URL.
pub async fn spawn_app_with(database_url: &str) -> TestApp {
	let pool = store::connect(database_url)
		.await
		.expect("test database should open");
	let handler = build_app(pool.clone(), &test_settings(database_url));
	TestApp { handler, pool }
}

impl TestApp {
	/// Sends one request through the full middleware chain and decodes
	/// the response body as JSON (`Value::Null` when empty).
	pub async fn send(
		&self,
		method: Method,
		path: &str,
		token: Option<&str>,
		project: Option<i64>,
		body: Option<&Value>,
	) -> (StatusCode, Value) {
		let mut builder = Request::builder().method(method).uri(path);
		if let Some(token) = token {
			builder = builder.header("authorization", &format!("Bearer {}", token));
		}
		if let Some(project) = project {
			builder = builder.header("x-project-id", &project.to_string());
		}
		if let Some(body) = body {
			builder = builder
				.header("content-type", "application/json")
				.body(body.to_string());
		}
		let request = builder.build().expect("request should build");

		// Mirror the server loop: handler errors become error responses.
		let response = match self.handler.handle(request).await {
			Ok(response) => response,
			Err(err) => Response::from(err),
		};

		let value = if response.body.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&response.body).expect("response body should be JSON")
		};
		(response.status, value)
	}

	/// Sends a GET with a raw `X-Project-Id` header value, bypassing the
	/// numeric scope argument of [`TestApp::send`].
	pub async fn get_with_raw_scope(
		&self,
		path: &str,
		token: &str,
		scope: &str,
	) -> (StatusCode, Value) {
		let request = Request::builder()
			.method(Method::GET)
			.uri(path)
			.header("authorization", &format!("Bearer {}", token))
			.header("x-project-id", scope)
			.build()
			.expect("request should build");

		let response = match self.handler.handle(request).await {
			Ok(response) => response,
			Err(err) => Response::from(err),
		};
		let value = if response.body.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&response.body).expect("response body should be JSON")
		};
		(response.status, value)
	}

	/// Sends a POST whose body is not valid JSON.
	pub async fn post_raw(&self, path: &str, token: &str, body: &str) -> (StatusCode, Value) {
		let request = Request::builder()
			.method(Method::POST)
			.uri(path)
			.header("authorization", &format!("Bearer {}", token))
			.header("content-type", "application/json")
			.body(body.to_string())
			.build()
			.expect("request should build");

		let response = match self.handler.handle(request).await {
			Ok(response) => response,
			Err(err) => Response::from(err),
		};
		let value = if response.body.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&response.body).expect("response body should be JSON")
		};
		(response.status, value)
	}

	pub async fn post_anon(&self, path: &str, body: &Value) -> (StatusCode, Value) {
		self.send(Method::POST, path, None, None, Some(body)).await
	}

	pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
		self.send(Method::GET, path, Some(token), None, None).await
	}

	pub async fn post(&self, path: &str, token: &str, body: &Value) -> (StatusCode, Value) {
		self.send(Method::POST, path, Some(token), None, Some(body))
			.await
	}

	pub async fn put(&self, path: &str, token: &str, body: &Value) -> (StatusCode, Value) {
		self.send(Method::PUT, path, Some(token), None, Some(body))
			.await
	}

	pub async fn patch(&self, path: &str, token: &str, body: &Value) -> (StatusCode, Value) {
		self.send(Method::PATCH, path, Some(token), None, Some(body))
			.await
	}

	pub async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
		self.send(Method::DELETE, path, Some(token), None, None).await
	}

	pub async fn get_scoped(&self, path: &str, token: &str, project: i64) -> (StatusCode, Value) {
		self.send(Method::GET, path, Some(token), Some(project), None)
			.await
	}

	pub async fn post_scoped(
		&self,
		path: &str,
		token: &str,
		project: i64,
		body: &Value,
	) -> (StatusCode, Value) {
		self.send(Method::POST, path, Some(token), Some(project), Some(body))
			.await
	}

	pub async fn put_scoped(
		&self,
		path: &str,
		token: &str,
		project: i64,
		body: &Value,
	) -> (StatusCode, Value) {
		self.send(Method::PUT, path, Some(token), Some(project), Some(body))
			.await
	}

	pub async fn patch_scoped(
		&self,
		path: &str,
		token: &str,
		project: i64,
		body: &Value,
	) -> (StatusCode, Value) {
		self.send(Method::PATCH, path, Some(token), Some(project), Some(body))
			.await
	}

	pub async fn delete_scoped(
		&self,
		path: &str,
		token: &str,
		project: i64,
	) -> (StatusCode, Value) {
		self.send(Method::DELETE, path, Some(token), Some(project), None)
			.await
	}

	/// Registers an account and logs it in, returning an access token.
	pub async fn register_and_login(&self, username: &str) -> String {
		let password = "s3cretpass";
		let (status, body) = self
			.post_anon(
				"/api/register/",
				&json!({
					"username": username,
					"email": format!("{}@example.com", username),
					"password": password,
					"password_confirm": password
				}),
			)
			.await;
		assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

		let (status, body) = self
			.post_anon(
				"/api/token/",
				&json!({"username": username, "password": password}),
			)
			.await;
		assert_eq!(status, StatusCode::OK, "login failed: {}", body);
		body["access"].as_str().expect("access token").to_string()
	}

	/// Creates a project owned by the token's account, returning its id.
	pub async fn create_project(&self, token: &str, name: &str) -> i64 {
		let (status, body) = self
			.post(
				"/api/project/",
				token,
				&json!({"name": name, "start_date": "2026-01-01"}),
			)
			.await;
		assert_eq!(status, StatusCode::CREATED, "project create failed: {}", body);
		body["id"].as_i64().expect("project id")
	}

	/// Creates a shared team member, returning its id.
	pub async fn create_member(&self, token: &str, name: &str, wage: &str) -> i64 {
		let (status, body) = self
			.post("/api/users/", token, &json!({"name": name, "wage": wage}))
			.await;
		assert_eq!(status, StatusCode::CREATED, "member create failed: {}", body);
		body["id"].as_i64().expect("member id")
	}

	/// Creates a work package in the given project, returning its id.
	pub async fn create_work_package(
		&self,
		token: &str,
		project: i64,
		name: &str,
		start_week: i64,
		end_week: i64,
		users: &[i64],
	) -> i64 {
		let (status, body) = self
			.post_scoped(
				"/api/workpackages/",
				token,
				project,
				&json!({
					"name": name,
					"start_week": start_week,
					"end_week": end_week,
					"users": users
				}),
			)
			.await;
		assert_eq!(
			status,
			StatusCode::CREATED,
			"work package create failed: {}",
			body
		);
		body["id"].as_i64().expect("work package id")
	}
}
