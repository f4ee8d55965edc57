use std::sync::Arc;

use thiserror::Error;

use crate::bind::Value;

/// Rejection raised by a [`SchemaValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation: {message}")]
pub struct SchemaViolation {
	/// Human-readable reason.
	pub message: String,
}

impl SchemaViolation {
	/// Violation with the given message.
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

/// Post-construction check run on every value a reader returns.
pub trait SchemaValidator: Send + Sync {
	/// Accept `value` or explain why it is invalid.
	fn assert_validate(&self, value: &Value) -> Result<(), SchemaViolation>;
}

/// Built-in validator: required fields and inclusive numeric ranges.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
	required: Vec<Arc<str>>,
	ranges: Vec<(Arc<str>, f64, f64)>,
}

impl ObjectSchema {
	/// Empty schema that accepts any object.
	pub fn new() -> Self {
		Self::default()
	}

	/// Require `name` to be present and non-null.
	pub fn required(mut self, name: impl Into<Arc<str>>) -> Self {
		self.required.push(name.into());
		self
	}

	/// Require numeric field `name`, when non-null, to lie within `min..=max`.
	pub fn range(mut self, name: impl Into<Arc<str>>, min: f64, max: f64) -> Self {
		self.ranges.push((name.into(), min, max));
		self
	}
}

fn lookup<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
	match value {
		Value::Object(object) => object.get(name),
		Value::Map(_) => value.map_get(name),
		_ => None,
	}
}

impl SchemaValidator for ObjectSchema {
	fn assert_validate(&self, value: &Value) -> Result<(), SchemaViolation> {
		if !matches!(value, Value::Object(_) | Value::Map(_)) {
			return Err(SchemaViolation::new(format!("expect object, but {}", value.kind())));
		}
		for name in &self.required {
			if lookup(value, name).is_none_or(Value::is_null) {
				return Err(SchemaViolation::new(format!("required property {name} is missing")));
			}
		}
		for (name, min, max) in &self.ranges {
			let Some(field) = lookup(value, name).filter(|field| !field.is_null()) else {
				continue;
			};
			let Some(number) = field.as_f64() else {
				return Err(SchemaViolation::new(format!("property {name} expect number, but {}", field.kind())));
			};
			if number < *min || number > *max {
				return Err(SchemaViolation::new(format!("property {name} value {number} not in range [{min}, {max}]")));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{ObjectSchema, SchemaValidator};
	use crate::bind::Value;

	fn sample(age: Value) -> Value {
		Value::Map(vec![("name".into(), Value::String("ada".into())), ("age".into(), age)])
	}

	#[test]
	fn required_and_range_pass() {
		let schema = ObjectSchema::new().required("name").range("age", 0.0, 150.0);
		schema.assert_validate(&sample(Value::I64(36))).expect("valid sample");
		schema.assert_validate(&sample(Value::Null)).expect("null skips range");
	}

	#[test]
	fn violations_are_reported() {
		let schema = ObjectSchema::new().required("email").range("age", 0.0, 150.0);
		let missing = schema.assert_validate(&sample(Value::I64(1))).expect_err("missing field");
		assert!(missing.message.contains("email"));

		let schema = ObjectSchema::new().range("age", 0.0, 150.0);
		let out_of_range = schema.assert_validate(&sample(Value::I64(200))).expect_err("out of range");
		assert!(out_of_range.message.contains("not in range"));
		assert!(schema.assert_validate(&Value::I64(1)).is_err());
	}
}
