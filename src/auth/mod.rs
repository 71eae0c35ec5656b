//! Account authentication: JWT issuance/verification and password hashing.

pub mod hasher;
pub mod jwt;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use jwt::{Claims, JwtAuth, TokenPair};

/// Identity attached to a request once its access token has been verified.
///
/// Stored in the request extensions by the auth middleware and read back
/// by the views.
#[derive(Debug, Clone)]
pub struct AuthContext {
	pub account_id: i64,
	pub username: String,
}
