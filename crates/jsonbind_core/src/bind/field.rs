use std::fmt;
use std::sync::Arc;

use crate::bind::hash::{fnv64, fnv64_lcase};
use crate::bind::{ArrayLen, Features, Instance, Marker, ObjectReader, Result, Token, TokenCursor, Value};

/// Value kind of one field; decides how a value is consumed and what its zero value is.
#[derive(Clone)]
pub enum FieldKind {
	/// Boolean.
	Bool,
	/// Signed integer.
	Int,
	/// Floating point.
	Float,
	/// UTF-8 string.
	String,
	/// Byte payload.
	Bytes,
	/// Any value, decoded without a shape.
	Any,
	/// Untyped object collected as ordered entries.
	Map,
	/// Homogeneous list.
	List(Box<FieldKind>),
	/// Nested object decoded by its own reader.
	Object(Arc<ObjectReader>),
}

impl FieldKind {
	/// Stable kind label.
	pub fn label(&self) -> String {
		match self {
			Self::Bool => "bool".to_owned(),
			Self::Int => "int".to_owned(),
			Self::Float => "float".to_owned(),
			Self::String => "string".to_owned(),
			Self::Bytes => "bytes".to_owned(),
			Self::Any => "any".to_owned(),
			Self::Map => "map".to_owned(),
			Self::List(item) => format!("list<{}>", item.label()),
			Self::Object(reader) => format!("object<{}>", reader.shape().type_name()),
		}
	}

	/// Value stored for a field that was never assigned.
	pub fn zero_value(&self, features: Features) -> Value {
		match self {
			Self::Bool => Value::Bool(false),
			Self::Int => Value::I64(0),
			Self::Float => Value::F64(0.0),
			Self::String if features.contains(Features::INIT_STRING_FIELD_AS_EMPTY) => Value::String("".into()),
			_ => Value::Null,
		}
	}

	/// Read one value of this kind; `None` leaves the target untouched.
	///
	/// `jsonb` selects the framing nested objects are entered with.
	fn read(&self, cursor: &mut dyn TokenCursor, features: Features, jsonb: bool) -> Result<Option<Value>> {
		let value = match self {
			Self::Bool => return Ok(cursor.read_bool()?.map(Value::Bool)),
			Self::Int => return Ok(cursor.read_i64()?.map(Value::I64)),
			Self::Float => return Ok(cursor.read_f64()?.map(Value::F64)),
			Self::String => match cursor.read_string()? {
				Some(text) if features.contains(Features::TRIM_STRING) => Value::String(text.trim().into()),
				Some(text) => Value::String(text.into_boxed_str()),
				None => Value::Null,
			},
			Self::Bytes => cursor.read_bytes()?.map_or(Value::Null, Value::Bytes),
			Self::Any => cursor.read_any()?,
			Self::Map => match cursor.token() {
				Token::Null | Token::ObjectStart => cursor.read_any()?,
				_ => return Err(cursor.type_mismatch("map")),
			},
			Self::List(item) => {
				if cursor.next_if_null()? {
					Value::Null
				} else {
					read_list(item, cursor, features, jsonb)?
				}
			}
			Self::Object(reader) => {
				if jsonb {
					reader.read_jsonb_object(cursor, Features::NONE)?
				} else {
					reader.read_object(cursor, Features::NONE)?
				}
			}
		};
		Ok(Some(value))
	}
}

impl fmt::Debug for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label())
	}
}

fn read_list(item: &FieldKind, cursor: &mut dyn TokenCursor, features: Features, jsonb: bool) -> Result<Value> {
	let len = cursor.start_array()?;
	cursor.enter_level()?;
	let result = read_list_items(item, cursor, features, jsonb, len);
	cursor.leave_level();
	result
}

fn read_list_items(item: &FieldKind, cursor: &mut dyn TokenCursor, features: Features, jsonb: bool, len: ArrayLen) -> Result<Value> {
	let mut items = Vec::new();
	match len {
		ArrayLen::Counted(count) => {
			items.reserve(count.min(1024));
			for _ in 0..count {
				items.push(item.read(cursor, features, jsonb)?.unwrap_or(Value::Null));
			}
		}
		ArrayLen::Delimited => {
			while !cursor.next_if_match(Marker::ArrayEnd)? {
				if cursor.is_end() {
					return Err(cursor.framing_error("]"));
				}
				items.push(item.read(cursor, features, jsonb)?.unwrap_or(Value::Null));
			}
		}
	}
	Ok(Value::Array(items))
}

/// Per-member decode contract: name identities, default, kind and slot.
#[derive(Debug, Clone)]
pub struct FieldBinding {
	name: Arc<str>,
	exact_hash: u64,
	lower_hash: u64,
	kind: FieldKind,
	default: Option<Value>,
	unwrapped: bool,
	slot: usize,
}

impl FieldBinding {
	/// Binding for member `name`; both hashes are computed here once.
	pub fn new(name: impl Into<Arc<str>>, kind: FieldKind) -> Self {
		let name = name.into();
		Self {
			exact_hash: fnv64(&name),
			lower_hash: fnv64_lcase(&name),
			name,
			kind,
			default: None,
			unwrapped: false,
			slot: 0,
		}
	}

	/// Attach a default applied before any field is read.
	pub fn with_default(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}

	/// Mark this binding as the sink for unknown sibling fields.
	pub fn unwrapped(mut self) -> Self {
		self.unwrapped = true;
		self
	}

	/// Declared member name.
	pub fn name(&self) -> &Arc<str> {
		&self.name
	}

	/// Exact-case name hash.
	pub fn exact_hash(&self) -> u64 {
		self.exact_hash
	}

	/// Smart-match name hash.
	pub fn lower_hash(&self) -> u64 {
		self.lower_hash
	}

	/// Value kind.
	pub fn kind(&self) -> &FieldKind {
		&self.kind
	}

	/// Declared default, if any.
	pub fn default_value(&self) -> Option<&Value> {
		self.default.as_ref()
	}

	/// Return whether this binding absorbs unknown fields.
	pub fn is_unwrapped(&self) -> bool {
		self.unwrapped
	}

	/// Slot index inside the instance.
	pub fn slot(&self) -> usize {
		self.slot
	}

	pub(crate) fn set_slot(&mut self, slot: usize) {
		self.slot = slot;
	}

	/// Zero value for this binding under `features`.
	pub fn zero_value(&self, features: Features) -> Value {
		self.kind.zero_value(features)
	}

	/// Consume one JSON text value into the bound slot.
	pub fn read_field_value(&self, cursor: &mut dyn TokenCursor, instance: &mut Instance, features: Features) -> Result<()> {
		if let Some(value) = self.kind.read(cursor, features, false)? {
			instance.set(self.slot, value);
		}
		Ok(())
	}

	/// Consume one JSONB value into the bound slot.
	pub fn read_field_value_jsonb(&self, cursor: &mut dyn TokenCursor, instance: &mut Instance, features: Features) -> Result<()> {
		if let Some(value) = self.kind.read(cursor, features, true)? {
			instance.set(self.slot, value);
		}
		Ok(())
	}

	/// Store the declared default without consuming input.
	pub fn accept_default_value(&self, instance: &mut Instance) {
		if let Some(value) = &self.default {
			instance.set(self.slot, value.clone());
		}
	}

	/// Route the value of an unknown key (the cursor's last field name) into this binding.
	pub fn absorb_extra(&self, cursor: &mut dyn TokenCursor, instance: &mut Instance, features: Features) -> Result<()> {
		match &self.kind {
			FieldKind::Map => {
				let name: Box<str> = cursor.field_name().into();
				let value = cursor.read_any()?;
				match instance.get_mut(self.slot) {
					Some(Value::Map(entries)) => entries.push((name, value)),
					_ => instance.set(self.slot, Value::Map(vec![(name, value)])),
				}
				Ok(())
			}
			FieldKind::Object(reader) => {
				let hash = fnv64(cursor.field_name());
				let target = reader.field_reader(hash).or_else(|| {
					let smart = features.contains(Features::SUPPORT_SMART_MATCH) || reader.features().contains(Features::SUPPORT_SMART_MATCH);
					smart.then(|| reader.field_reader_lcase(cursor.name_hash_lcase())).flatten()
				});
				let Some(target) = target else {
					return cursor.skip_value();
				};
				let jsonb = cursor.is_jsonb();
				let Some(value) = target.kind.read(cursor, features, jsonb)? else {
					return Ok(());
				};
				let mut embedded = match instance.take(self.slot) {
					Some(Value::Object(object)) => object,
					_ => reader.zero_object(features),
				};
				embedded.set(target.slot, value);
				instance.set(self.slot, Value::Object(embedded));
				Ok(())
			}
			_ => cursor.skip_value(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{FieldBinding, FieldKind};
	use crate::bind::{DecodeContext, Features, Instance, JsonCursor, Value, fnv64, fnv64_lcase};

	#[test]
	fn hashes_are_computed_at_creation() {
		let binding = FieldBinding::new("userName", FieldKind::String);
		assert_eq!(binding.exact_hash(), fnv64("userName"));
		assert_eq!(binding.lower_hash(), fnv64_lcase("user_name"));
	}

	#[test]
	fn null_keeps_primitive_slot() {
		let binding = FieldBinding::new("a", FieldKind::Int).with_default(Value::I64(7));
		let mut instance = Instance::allocate(1);
		binding.accept_default_value(&mut instance);
		let mut cursor = JsonCursor::new("null", DecodeContext::default());
		binding.read_field_value(&mut cursor, &mut instance, Features::NONE).expect("null reads");
		assert_eq!(instance.get(0), Some(&Value::I64(7)));
	}

	#[test]
	fn null_clears_reference_slot() {
		let binding = FieldBinding::new("s", FieldKind::String).with_default(Value::String("x".into()));
		let mut instance = Instance::allocate(1);
		binding.accept_default_value(&mut instance);
		let mut cursor = JsonCursor::new("null", DecodeContext::default());
		binding.read_field_value(&mut cursor, &mut instance, Features::NONE).expect("null reads");
		assert_eq!(instance.get(0), Some(&Value::Null));
	}

	#[test]
	fn trim_string_applies() {
		let binding = FieldBinding::new("s", FieldKind::String);
		let mut instance = Instance::allocate(1);
		let mut cursor = JsonCursor::new("\"  padded \"", DecodeContext::default());
		binding.read_field_value(&mut cursor, &mut instance, Features::TRIM_STRING).expect("string reads");
		assert_eq!(instance.get(0), Some(&Value::String("padded".into())));
	}

	#[test]
	fn list_of_ints_keeps_nulls_as_null() {
		let binding = FieldBinding::new("xs", FieldKind::List(Box::new(FieldKind::Int)));
		let mut instance = Instance::allocate(1);
		let mut cursor = JsonCursor::new("[1, null, \"3\"]", DecodeContext::default());
		binding.read_field_value(&mut cursor, &mut instance, Features::NONE).expect("list reads");
		assert_eq!(instance.get(0), Some(&Value::Array(vec![Value::I64(1), Value::Null, Value::I64(3)])));
	}

	#[test]
	fn map_rejects_scalars() {
		let binding = FieldBinding::new("m", FieldKind::Map);
		let mut instance = Instance::allocate(1);
		let mut cursor = JsonCursor::new("12", DecodeContext::default());
		assert!(binding.read_field_value(&mut cursor, &mut instance, Features::NONE).is_err());
	}

	#[test]
	fn zero_values_follow_kind_and_features() {
		assert_eq!(FieldKind::Bool.zero_value(Features::NONE), Value::Bool(false));
		assert_eq!(FieldKind::Float.zero_value(Features::NONE), Value::F64(0.0));
		assert_eq!(FieldKind::String.zero_value(Features::NONE), Value::Null);
		assert_eq!(FieldKind::String.zero_value(Features::INIT_STRING_FIELD_AS_EMPTY), Value::String("".into()));
		assert_eq!(FieldKind::Map.zero_value(Features::INIT_STRING_FIELD_AS_EMPTY), Value::Null);
	}
}
