use crate::error::{Error, Result};

/// Password hasher trait
///
/// Implement this trait to swap in a different hashing algorithm.
///
/// # Examples
///
/// ```
/// use planboard::auth::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let hash = hasher.hash("my_secure_password").unwrap();
///
/// assert!(hasher.verify("my_secure_password", &hash).unwrap());
/// assert!(!hasher.verify("wrong_password", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
	/// Hashes a password
	///
	/// # Errors
	///
	/// Returns an error if hashing fails.
	fn hash(&self, password: &str) -> Result<String>;

	/// Verifies a password against a hash
	///
	/// Returns `Ok(true)` if the password matches, `Ok(false)` if it
	/// doesn't.
	///
	/// # Errors
	///
	/// Returns an error if the stored hash cannot be parsed.
	fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id password hasher
///
/// Argon2id resists both GPU-based and side-channel attacks and is the
/// only algorithm new password hashes are created with.
pub struct Argon2Hasher;

impl Argon2Hasher {
	pub fn new() -> Self {
		Self
	}
}

impl Default for Argon2Hasher {
	fn default() -> Self {
		Self::new()
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> Result<String> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHasher as _, SaltString},
		};
		use rand::RngCore;

		// OsRng-backed randomness for the salt
		let mut rng = rand::thread_rng();
		let mut salt_bytes = [0u8; 16];
		rng.fill_bytes(&mut salt_bytes);

		let salt = SaltString::encode_b64(&salt_bytes)
			.map_err(|e| Error::Authentication(e.to_string()))?;

		let argon2 = Argon2::default();

		argon2
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| Error::Authentication(e.to_string()))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHash, PasswordVerifier},
		};

		let parsed_hash =
			PasswordHash::new(hash).map_err(|e| Error::Authentication(e.to_string()))?;

		Ok(Argon2::default()
			.verify_password(password.as_bytes(), &parsed_hash)
			.is_ok())
	}
}
