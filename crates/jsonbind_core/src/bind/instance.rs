use std::sync::Arc;

use crate::bind::{Features, FieldBinding, FieldValue, ObjectValue, Value};

/// Object under construction for one decode call.
///
/// A slot is `None` until it has been assigned. [`Instance::finish`] replaces any remaining
/// `None` with the binding's zero value, so a partially initialized object is never observable.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
	slots: Vec<Option<Value>>,
}

impl Instance {
	/// Instance populated by a creator; missing trailing slots stay uninitialized.
	pub fn from_created(mut values: Vec<Value>, len: usize) -> Self {
		values.truncate(len);
		let mut slots: Vec<Option<Value>> = values.into_iter().map(Some).collect();
		slots.resize(len, None);
		Self { slots }
	}

	/// Raw allocation: every slot uninitialized.
	pub fn allocate(len: usize) -> Self {
		Self { slots: vec![None; len] }
	}

	/// Intermediate storage handed to a build function; not an instance of the shape itself.
	pub fn deferred(len: usize) -> Self {
		Self::allocate(len)
	}

	/// Number of slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Return whether the shape has no slots.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Assign a slot; out-of-range slots are ignored.
	pub fn set(&mut self, slot: usize, value: Value) {
		if let Some(target) = self.slots.get_mut(slot) {
			*target = Some(value);
		}
	}

	/// Assigned value of a slot.
	pub fn get(&self, slot: usize) -> Option<&Value> {
		self.slots.get(slot).and_then(Option::as_ref)
	}

	/// Mutable assigned value of a slot.
	pub fn get_mut(&mut self, slot: usize) -> Option<&mut Value> {
		self.slots.get_mut(slot).and_then(Option::as_mut)
	}

	/// Move a slot's value out, leaving it uninitialized.
	pub fn take(&mut self, slot: usize) -> Option<Value> {
		self.slots.get_mut(slot).and_then(Option::take)
	}

	/// Convert into the shape's object, filling uninitialized slots with zero values.
	pub fn finish(self, type_name: &Arc<str>, bindings: &[FieldBinding], features: Features) -> ObjectValue {
		let fields = bindings
			.iter()
			.zip(self.slots)
			.map(|(binding, slot)| FieldValue {
				name: Arc::clone(binding.name()),
				value: slot.unwrap_or_else(|| binding.zero_value(features)),
			})
			.collect();
		ObjectValue {
			type_name: Arc::clone(type_name),
			fields,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::Instance;
	use crate::bind::{Features, FieldBinding, FieldKind, Value};

	#[test]
	fn finish_fills_zero_values() {
		let bindings = [FieldBinding::new("a", FieldKind::Int), FieldBinding::new("s", FieldKind::String)];
		let mut instance = Instance::allocate(2);
		instance.set(1, Value::String("x".into()));
		let object = instance.finish(&Arc::from("demo.T"), &bindings, Features::NONE);
		assert_eq!(object.get("a"), Some(&Value::I64(0)));
		assert_eq!(object.get("s"), Some(&Value::String("x".into())));
	}

	#[test]
	fn created_values_are_fitted_to_slot_count() {
		let short = Instance::from_created(vec![Value::I64(1)], 3);
		assert_eq!(short.len(), 3);
		assert_eq!(short.get(0), Some(&Value::I64(1)));
		assert_eq!(short.get(2), None);

		let long = Instance::from_created(vec![Value::I64(1), Value::I64(2)], 1);
		assert_eq!(long.len(), 1);
	}
}
