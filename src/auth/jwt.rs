//! JWT issuance and verification.
//!
//! Accounts authenticate once with username/password and receive a pair
//! of HS256 tokens: a short-lived access token presented on every API
//! request and a longer-lived refresh token used to obtain new access
//! tokens. The `token_type` claim keeps the two roles apart so a refresh
//! token can never be used to call the API directly.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

const INVALID_TOKEN: &str = "Token is invalid or expired";

/// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
	pub sub: String, // Subject (account ID)
	pub exp: i64,    // Expiration time
	pub iat: i64,    // Issued at
	pub username: String,
	pub token_type: String,
}

impl Claims {
	/// Creates new claims for the given account and lifetime.
	///
	/// # Examples
	///
	/// ```
	/// use planboard::auth::jwt::{Claims, TOKEN_TYPE_ACCESS};
	/// use chrono::Duration;
	///
	/// let claims = Claims::new(
	///     "7".to_string(),
	///     "ada".to_string(),
	///     TOKEN_TYPE_ACCESS,
	///     Duration::minutes(30),
	/// );
	///
	/// assert_eq!(claims.sub, "7");
	/// assert!(claims.exp > claims.iat);
	/// ```
	pub fn new(
		account_id: String,
		username: String,
		token_type: impl Into<String>,
		expires_in: Duration,
	) -> Self {
		let now = Utc::now();
		Self {
			sub: account_id,
			username,
			iat: now.timestamp(),
			exp: (now + expires_in).timestamp(),
			token_type: token_type.into(),
		}
	}

	pub fn is_expired(&self) -> bool {
		Utc::now().timestamp() > self.exp
	}
}

/// An access/refresh token pair issued at login.
#[derive(Debug, Serialize)]
pub struct TokenPair {
	pub access: String,
	pub refresh: String,
}

/// JWT Authentication handler
pub struct JwtAuth {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	access_lifetime: Duration,
	refresh_lifetime: Duration,
}

impl JwtAuth {
	pub fn new(secret: &[u8], access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			validation: Validation::default(),
			access_lifetime,
			refresh_lifetime,
		}
	}

	/// Encodes claims into a token string.
	///
	/// # Errors
	///
	/// Returns an authentication error if signing fails.
	pub fn encode(&self, claims: &Claims) -> Result<String> {
		encode(&Header::default(), claims, &self.encoding_key)
			.map_err(|e| Error::Authentication(e.to_string()))
	}

	/// Decodes a token string into claims.
	///
	/// # Errors
	///
	/// Returns an authentication error if the signature or expiry is invalid.
	pub fn decode(&self, token: &str) -> Result<Claims> {
		decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|_| Error::Authentication(INVALID_TOKEN.to_string()))
	}

	/// Issues a fresh access/refresh pair for an account.
	///
	/// # Errors
	///
	/// Returns an authentication error if signing fails.
	pub fn issue_pair(&self, account_id: i64, username: &str) -> Result<TokenPair> {
		let access = self.encode(&Claims::new(
			account_id.to_string(),
			username.to_string(),
			TOKEN_TYPE_ACCESS,
			self.access_lifetime,
		))?;
		let refresh = self.encode(&Claims::new(
			account_id.to_string(),
			username.to_string(),
			TOKEN_TYPE_REFRESH,
			self.refresh_lifetime,
		))?;

		Ok(TokenPair { access, refresh })
	}

	/// Exchanges a valid refresh token for a new access token.
	///
	/// # Errors
	///
	/// Returns an authentication error if the token is invalid, expired,
	/// or not a refresh token.
	pub fn refresh_access(&self, refresh_token: &str) -> Result<String> {
		let claims = self.verify(refresh_token)?;

		if claims.token_type != TOKEN_TYPE_REFRESH {
			return Err(Error::Authentication(INVALID_TOKEN.to_string()));
		}

		self.encode(&Claims::new(
			claims.sub,
			claims.username,
			TOKEN_TYPE_ACCESS,
			self.access_lifetime,
		))
	}

	/// Verifies a token of any type and returns its claims.
	///
	/// # Errors
	///
	/// Returns an authentication error if the token is invalid or expired.
	pub fn verify(&self, token: &str) -> Result<Claims> {
		let claims = self.decode(token)?;

		if claims.is_expired() {
			return Err(Error::Authentication(INVALID_TOKEN.to_string()));
		}

		Ok(claims)
	}

	/// Verifies an access token, rejecting refresh tokens.
	///
	/// # Errors
	///
	/// Returns an authentication error if the token is invalid, expired,
	/// or not an access token.
	pub fn verify_access(&self, token: &str) -> Result<Claims> {
		let claims = self.verify(token)?;

		if claims.token_type != TOKEN_TYPE_ACCESS {
			return Err(Error::Authentication(INVALID_TOKEN.to_string()));
		}

		Ok(claims)
	}
}
