use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Type-keyed request state.
///
/// Middleware inserts values (the authenticated caller, for example) and
/// handlers read them back by type. Cloning an `Extensions` clones the
/// handle, not the map, so middleware and handler see the same state.
///
/// # Examples
///
/// ```
/// use planboard::http::Extensions;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct RequestId(u64);
///
/// let extensions = Extensions::new();
/// extensions.insert(RequestId(7));
/// assert_eq!(extensions.get::<RequestId>(), Some(RequestId(7)));
/// assert!(extensions.contains::<RequestId>());
/// ```
#[derive(Clone, Default)]
pub struct Extensions {
	map: Arc<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Extensions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a value, replacing any previous value of the same type
	pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
		if let Ok(mut map) = self.map.lock() {
			map.insert(TypeId::of::<T>(), Box::new(value));
		}
	}

	/// Get a clone of the stored value of type `T`, if present
	pub fn get<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
		self.map
			.lock()
			.ok()
			.and_then(|map| map.get(&TypeId::of::<T>()).and_then(|v| v.downcast_ref::<T>().cloned()))
	}

	/// Whether a value of type `T` is stored
	pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
		self.map
			.lock()
			.map(|map| map.contains_key(&TypeId::of::<T>()))
			.unwrap_or(false)
	}

	/// Remove the stored value of type `T`, returning it if present
	pub fn remove<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
		self.map
			.lock()
			.ok()
			.and_then(|mut map| map.remove(&TypeId::of::<T>()).and_then(|v| v.downcast_ref::<T>().cloned()))
	}
}

impl std::fmt::Debug for Extensions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let len = self.map.lock().map(|map| map.len()).unwrap_or(0);
		f.debug_struct("Extensions").field("len", &len).finish()
	}
}
