//! Auto-type resolution: mapping type hints from the stream to concrete readers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::bind::hash::fnv64;
use crate::bind::{Features, ObjectReader, Shape};

/// Name prefixes refused by every new registry.
pub const DEFAULT_DENY_PREFIXES: &[&str] = &["std::", "core::", "alloc::", "java.", "javax.", "sun.", "com.sun."];

/// Policy refusal raised by a [`TypeResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
	/// Name or hash is on the deny list.
	#[error("type {type_name} is denied")]
	NotAllowed {
		/// Type name or hash label.
		type_name: String,
	},
	/// Resolved shape has no storage layout.
	#[error("type {type_name} is not instantiable")]
	NotInstantiable {
		/// Resolved type name.
		type_name: String,
	},
	/// Resolved shape is not assignable to the declared one.
	#[error("type {type_name} is not assignable to {expected}")]
	NotAssignable {
		/// Resolved type name.
		type_name: String,
		/// Declared type name.
		expected: String,
	},
}

/// Maps a decoded type identifier to a reader, applying security policy.
pub trait TypeResolver: Send + Sync {
	/// Fast path by type hash. `Ok(None)` is a soft miss.
	fn resolve_hash(&self, hash: u64, expected: Option<&Shape>, features: Features) -> Result<Option<Arc<ObjectReader>>, ResolveError>;

	/// Slow path by type name, with the declared shape as hint. `Ok(None)` is a soft miss.
	fn resolve_name(&self, name: &str, expected: Option<&Shape>, features: Features) -> Result<Option<Arc<ObjectReader>>, ResolveError>;
}

/// Outcome of a type hint for one decode call.
#[derive(Debug, Clone)]
pub enum Resolution {
	/// No reader is known for the hint; decoding continues with the declared reader.
	Unresolved,
	/// The hint names the declared shape.
	SameShape,
	/// A different shape; its reader takes over the decode.
	Delegate(Arc<ObjectReader>),
}

#[derive(Debug, Clone, Default)]
struct State {
	readers: HashMap<u64, Arc<ObjectReader>>,
	deny_prefixes: Vec<Box<str>>,
	deny_hashes: HashSet<u64>,
}

impl State {
	fn is_denied(&self, name: &str) -> bool {
		self.deny_hashes.contains(&fnv64(name)) || self.deny_prefixes.iter().any(|prefix| name.starts_with(prefix.as_ref()))
	}
}

/// Allow/deny registry used as the default [`TypeResolver`].
///
/// Lookups read an immutable snapshot; every change publishes a new one, so readers never block
/// each other and see a registration as soon as it returns.
#[derive(Debug)]
pub struct AutoTypeRegistry {
	state: RwLock<Arc<State>>,
}

impl Default for AutoTypeRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl AutoTypeRegistry {
	/// Registry with the default deny prefixes and no allowed types.
	pub fn new() -> Self {
		let state = State {
			deny_prefixes: DEFAULT_DENY_PREFIXES.iter().map(|prefix| Box::from(*prefix)).collect(),
			..State::default()
		};
		Self {
			state: RwLock::new(Arc::new(state)),
		}
	}

	fn snapshot(&self) -> Arc<State> {
		Arc::clone(&self.state.read())
	}

	fn publish(&self, update: impl FnOnce(&mut State)) {
		let mut guard = self.state.write();
		let mut next = State::clone(&guard);
		update(&mut next);
		*guard = Arc::new(next);
	}

	/// Allow `reader`'s shape to be named by type hints.
	pub fn register(&self, reader: Arc<ObjectReader>) -> Result<(), ResolveError> {
		let type_name = reader.shape().type_name().to_string();
		let mut result = Ok(());
		self.publish(|state| {
			if state.is_denied(&type_name) {
				result = Err(ResolveError::NotAllowed { type_name: type_name.clone() });
				return;
			}
			state.readers.insert(reader.shape().type_hash(), reader);
		});
		match &result {
			Ok(()) => tracing::debug!(type_name = %type_name, "auto type registered"),
			Err(_) => tracing::debug!(type_name = %type_name, "auto type registration denied"),
		}
		result
	}

	/// Deny every type whose name starts with `prefix`; matching registrations are dropped.
	pub fn deny_prefix(&self, prefix: &str) {
		self.publish(|state| {
			state.deny_prefixes.push(Box::from(prefix));
			state.readers.retain(|_, reader| !reader.shape().type_name().starts_with(prefix));
		});
		tracing::debug!(prefix, "auto type prefix denied");
	}

	/// Deny one exact type name; a matching registration is dropped.
	pub fn deny_name(&self, name: &str) {
		let hash = fnv64(name);
		self.publish(|state| {
			state.deny_hashes.insert(hash);
			state.readers.remove(&hash);
		});
		tracing::debug!(name, "auto type name denied");
	}

	/// Apply a deny entry: names ending in `.` or `::` are prefixes, others exact names.
	pub fn deny(&self, entry: &str) {
		if entry.ends_with('.') || entry.ends_with("::") {
			self.deny_prefix(entry);
		} else {
			self.deny_name(entry);
		}
	}

	/// Registered reader for an exact type name, without policy checks.
	pub fn reader(&self, type_name: &str) -> Option<Arc<ObjectReader>> {
		self.snapshot().readers.get(&fnv64(type_name)).cloned()
	}

	/// Number of registered shapes.
	pub fn len(&self) -> usize {
		self.snapshot().readers.len()
	}

	/// Return whether no shape is registered.
	pub fn is_empty(&self) -> bool {
		self.snapshot().readers.is_empty()
	}

	fn check(reader: &Arc<ObjectReader>, expected: Option<&Shape>) -> Result<Option<Arc<ObjectReader>>, ResolveError> {
		let shape = reader.shape();
		if !shape.has_layout() {
			return Err(ResolveError::NotInstantiable {
				type_name: shape.type_name().to_string(),
			});
		}
		if let Some(expected) = expected
			&& !shape.is_assignable_to(expected)
		{
			return Err(ResolveError::NotAssignable {
				type_name: shape.type_name().to_string(),
				expected: expected.type_name().to_string(),
			});
		}
		Ok(Some(Arc::clone(reader)))
	}
}

impl TypeResolver for AutoTypeRegistry {
	fn resolve_hash(&self, hash: u64, expected: Option<&Shape>, _features: Features) -> Result<Option<Arc<ObjectReader>>, ResolveError> {
		let state = self.snapshot();
		if state.deny_hashes.contains(&hash) {
			return Err(ResolveError::NotAllowed {
				type_name: format!("#{hash:016x}"),
			});
		}
		match state.readers.get(&hash) {
			Some(reader) => Self::check(reader, expected),
			None => Ok(None),
		}
	}

	fn resolve_name(&self, name: &str, expected: Option<&Shape>, _features: Features) -> Result<Option<Arc<ObjectReader>>, ResolveError> {
		let state = self.snapshot();
		if state.is_denied(name) {
			return Err(ResolveError::NotAllowed { type_name: name.to_owned() });
		}
		match state.readers.get(&fnv64(name)) {
			Some(reader) => Self::check(reader, expected),
			None => Ok(None),
		}
	}
}
