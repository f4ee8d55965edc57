use std::sync::Arc;

/// Runtime value produced by decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Explicit null marker.
	Null,
	/// Boolean scalar.
	Bool(bool),
	/// Signed integer scalar.
	I64(i64),
	/// Floating point scalar.
	F64(f64),
	/// UTF-8 string.
	String(Box<str>),
	/// Opaque byte payload.
	Bytes(Vec<u8>),
	/// Sequence of values.
	Array(Vec<Value>),
	/// Untyped object with entries in stream order.
	Map(Vec<(Box<str>, Value)>),
	/// Shape-bound object.
	Object(ObjectValue),
}

/// Shape-bound object with every declared field present.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectValue {
	/// Shape type name.
	pub type_name: Arc<str>,
	/// Field values in declaration order.
	pub fields: Vec<FieldValue>,
}

/// Named object field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
	/// Declared field name.
	pub name: Arc<str>,
	/// Field payload.
	pub value: Value,
}

impl Value {
	/// Stable lowercase kind label.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::I64(_) => "int",
			Self::F64(_) => "float",
			Self::String(_) => "string",
			Self::Bytes(_) => "bytes",
			Self::Array(_) => "array",
			Self::Map(_) => "map",
			Self::Object(_) => "object",
		}
	}

	/// Return whether this is `Null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Integer payload, if any.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::I64(value) => Some(*value),
			_ => None,
		}
	}

	/// Float payload, widening integers.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::F64(value) => Some(*value),
			Self::I64(value) => Some(*value as f64),
			_ => None,
		}
	}

	/// String payload, if any.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Object payload, if any.
	pub fn as_object(&self) -> Option<&ObjectValue> {
		match self {
			Self::Object(value) => Some(value),
			_ => None,
		}
	}

	/// Look up a map entry by key.
	pub fn map_get(&self, key: &str) -> Option<&Value> {
		match self {
			Self::Map(entries) => entries.iter().find(|(name, _)| name.as_ref() == key).map(|(_, value)| value),
			_ => None,
		}
	}
}

impl ObjectValue {
	/// Look up a field value by declared name.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|field| field.name.as_ref() == name).map(|field| &field.value)
	}

	/// Replace a field value by position.
	pub fn set(&mut self, index: usize, value: Value) {
		if let Some(field) = self.fields.get_mut(index) {
			field.value = value;
		}
	}
}

impl From<ObjectValue> for Value {
	fn from(value: ObjectValue) -> Self {
		Self::Object(value)
	}
}
