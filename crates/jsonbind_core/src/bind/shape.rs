use std::sync::Arc;

use crate::bind::hash::fnv64;

/// Target type descriptor shared by a reader and the auto-type registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
	type_name: Arc<str>,
	type_hash: u64,
	supertypes: Vec<Arc<str>>,
	serializable: bool,
	has_layout: bool,
}

impl Shape {
	/// Describe a concrete, serializable shape.
	pub fn new(type_name: impl Into<Arc<str>>) -> Self {
		let type_name = type_name.into();
		Self {
			type_hash: fnv64(&type_name),
			type_name,
			supertypes: Vec::new(),
			serializable: true,
			has_layout: true,
		}
	}

	/// Declare a supertype this shape may stand in for.
	pub fn with_supertype(mut self, name: impl Into<Arc<str>>) -> Self {
		self.supertypes.push(name.into());
		self
	}

	/// Forbid decoding this shape.
	pub fn non_serializable(mut self) -> Self {
		self.serializable = false;
		self
	}

	/// Mark the shape abstract: it has no storage layout of its own.
	pub fn without_layout(mut self) -> Self {
		self.has_layout = false;
		self
	}

	/// Declared type name.
	pub fn type_name(&self) -> &Arc<str> {
		&self.type_name
	}

	/// Precomputed hash of the type name.
	pub fn type_hash(&self) -> u64 {
		self.type_hash
	}

	/// Declared supertype names.
	pub fn supertypes(&self) -> &[Arc<str>] {
		&self.supertypes
	}

	/// Return whether decoding is permitted.
	pub fn is_serializable(&self) -> bool {
		self.serializable
	}

	/// Return whether raw allocation is possible.
	pub fn has_layout(&self) -> bool {
		self.has_layout
	}

	/// Return whether a value of this shape may be used where `other` is declared.
	pub fn is_assignable_to(&self, other: &Shape) -> bool {
		self.type_hash == other.type_hash || self.supertypes.iter().any(|name| name.as_ref() == other.type_name.as_ref())
	}
}

#[cfg(test)]
mod tests {
	use super::Shape;

	#[test]
	fn subtype_is_assignable_to_declared_supertype() {
		let base = Shape::new("demo.Shape").without_layout();
		let circle = Shape::new("demo.Circle").with_supertype("demo.Shape");
		let point = Shape::new("demo.Point");

		assert!(circle.is_assignable_to(&base));
		assert!(circle.is_assignable_to(&circle));
		assert!(!point.is_assignable_to(&base));
		assert!(!base.is_assignable_to(&circle));
		assert!(!base.has_layout());
	}
}
