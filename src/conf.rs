//! Runtime configuration loaded from environment variables.
//!
//! All variables share the `PLANBOARD_` prefix and every one of them
//! has a development default, so a bare `planboard` invocation starts a
//! working server against a local SQLite file.

use std::env;

/// Environment variable reader with prefix support
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Optional prefix for environment variables (e.g., "PLANBOARD_")
	pub prefix: Option<String>,
}

impl Env {
	pub fn new() -> Self {
		Self { prefix: None }
	}

	/// Set a prefix for all environment variable lookups
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	fn get_key_name(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{}{}", prefix, key),
			None => key.to_string(),
		}
	}

	/// Read a string value from environment
	pub fn str(&self, key: &str) -> Result<String, EnvError> {
		self.str_with_default(key, None)
	}

	/// Read a string value with a default
	pub fn str_with_default(&self, key: &str, default: Option<&str>) -> Result<String, EnvError> {
		let full_key = self.get_key_name(key);
		validate_env_var_name(&full_key)?;

		match env::var(&full_key) {
			Ok(val) => Ok(val),
			Err(_) => match default {
				Some(d) => Ok(d.to_string()),
				None => Err(EnvError::MissingVariable(full_key)),
			},
		}
	}

	/// Read an integer value from environment
	pub fn int(&self, key: &str) -> Result<i64, EnvError> {
		self.int_with_default(key, None)
	}

	/// Read an integer value with a default
	pub fn int_with_default(&self, key: &str, default: Option<i64>) -> Result<i64, EnvError> {
		let full_key = self.get_key_name(key);
		validate_env_var_name(&full_key)?;

		match env::var(&full_key) {
			Ok(val) => val.parse::<i64>().map_err(|e| EnvError::ParseError {
				key: full_key,
				value_len: val.len(),
				error: e.to_string(),
			}),
			Err(_) => match default {
				Some(d) => Ok(d),
				None => Err(EnvError::MissingVariable(full_key)),
			},
		}
	}
}

/// Validates an environment variable name.
///
/// Rejects names that are empty, contain control characters, or contain
/// the `=` character (which is used as the key-value separator).
pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	if name.is_empty() {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not be empty".to_string(),
		});
	}

	if let Some(pos) = name.find(|c: char| c.is_control()) {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: format!(
				"environment variable name contains control character at position {}",
				pos
			),
		});
	}

	if name.contains('=') {
		return Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: "environment variable name must not contain '='".to_string(),
		});
	}

	Ok(())
}

/// Environment variable errors
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Missing environment variable: {0}")]
	MissingVariable(String),

	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		/// Length of the original value (stored instead of the raw value to prevent secret leakage)
		value_len: usize,
		error: String,
	},

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}

/// The default signing secret, only acceptable for local development.
pub const DEV_SECRET_KEY: &str = "insecure-dev-secret-change-me";

/// Application settings
#[derive(Debug, Clone)]
pub struct Settings {
	pub host: String,
	pub port: u16,
	pub database_url: String,
	pub secret_key: String,
	pub access_token_minutes: i64,
	pub refresh_token_minutes: i64,
	pub log_filter: String,
}

impl Settings {
	/// Loads settings from `PLANBOARD_`-prefixed environment variables.
	///
	/// # Errors
	///
	/// Returns an error if a variable is present but cannot be parsed.
	pub fn from_env() -> Result<Self, EnvError> {
		let env = Env::new().with_prefix("PLANBOARD_");

		let port = env.int_with_default("PORT", Some(8000))?;
		let port = u16::try_from(port).map_err(|_| EnvError::ParseError {
			key: "PLANBOARD_PORT".to_string(),
			value_len: port.to_string().len(),
			error: "port must fit in u16".to_string(),
		})?;

		Ok(Self {
			host: env.str_with_default("HOST", Some("127.0.0.1"))?,
			port,
			database_url: env
				.str_with_default("DATABASE_URL", Some("sqlite:planboard.db?mode=rwc"))?,
			secret_key: env.str_with_default("SECRET_KEY", Some(DEV_SECRET_KEY))?,
			access_token_minutes: env.int_with_default("ACCESS_TOKEN_MINUTES", Some(30))?,
			refresh_token_minutes: env.int_with_default("REFRESH_TOKEN_MINUTES", Some(1440))?,
			log_filter: env.str_with_default("LOG", Some("info"))?,
		})
	}

	/// The `host:port` string the server binds to.
	pub fn bind_addr(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}
