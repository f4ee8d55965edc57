use crate::bind::jsonb::constants::*;
use crate::bind::{ObjectValue, Value};

/// Low-level JSONB value writer.
///
/// Emits markers and primitives only; callers are responsible for pairing object and array
/// framing correctly.
#[derive(Debug, Default)]
pub struct JsonbWriter {
	buf: Vec<u8>,
}

impl JsonbWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Bytes written so far.
	pub fn as_bytes(&self) -> &[u8] {
		&self.buf
	}

	/// Finish and return the written bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}

	/// Write a null.
	pub fn write_null(&mut self) {
		self.buf.push(BC_NULL);
	}

	/// Write a boolean.
	pub fn write_bool(&mut self, value: bool) {
		self.buf.push(if value { BC_TRUE } else { BC_FALSE });
	}

	/// Write an integer using the shortest form.
	pub fn write_i64(&mut self, value: i64) {
		match i32::try_from(value) {
			Ok(small) => self.write_i32(small),
			Err(_) => {
				self.buf.push(BC_INT64);
				self.buf.extend_from_slice(&value.to_be_bytes());
			}
		}
	}

	/// Write an int32 using the shortest form.
	pub fn write_i32(&mut self, value: i32) {
		if (INT32_NUM_MIN..=INT32_NUM_MAX).contains(&value) {
			self.buf.push(value as i8 as u8);
		} else if (-2048..=2047).contains(&value) {
			self.buf.push((i32::from(BC_INT32_BYTE_ZERO) + (value >> 8)) as u8);
			self.buf.push(value as u8);
		} else if (-262_144..=262_143).contains(&value) {
			self.buf.push((i32::from(BC_INT32_SHORT_ZERO) + (value >> 16)) as u8);
			self.buf.extend_from_slice(&(value as u16).to_be_bytes());
		} else {
			self.buf.push(BC_INT32);
			self.buf.extend_from_slice(&value.to_be_bytes());
		}
	}

	/// Write a double.
	pub fn write_f64(&mut self, value: f64) {
		if value.to_bits() == 0.0_f64.to_bits() {
			self.buf.push(BC_DOUBLE_NUM_0);
		} else if value == 1.0 {
			self.buf.push(BC_DOUBLE_NUM_1);
		} else {
			self.buf.push(BC_DOUBLE);
			self.buf.extend_from_slice(&value.to_be_bytes());
		}
	}

	/// Write a string (also used for object keys).
	pub fn write_str(&mut self, value: &str) {
		let len = value.len();
		if value.is_ascii() {
			if len <= STR_ASCII_FIX_MAX_LEN {
				self.buf.push(BC_STR_ASCII_FIX_MIN + len as u8);
			} else {
				self.buf.push(BC_STR_ASCII);
				self.write_len(len);
			}
		} else {
			self.buf.push(BC_STR_UTF8);
			self.write_len(len);
		}
		self.buf.extend_from_slice(value.as_bytes());
	}

	/// Write a binary payload.
	pub fn write_bytes(&mut self, value: &[u8]) {
		self.buf.push(BC_BINARY);
		self.write_len(value.len());
		self.buf.extend_from_slice(value);
	}

	/// Write a typed-value prefix; the next value carries this type name.
	pub fn write_type_name(&mut self, type_name: &str) {
		self.buf.push(BC_TYPED_ANY);
		self.write_str(type_name);
	}

	/// Write an object start marker.
	pub fn start_object(&mut self) {
		self.buf.push(BC_OBJECT);
	}

	/// Write an object end marker.
	pub fn end_object(&mut self) {
		self.buf.push(BC_OBJECT_END);
	}

	/// Write an array header for `count` elements.
	pub fn start_array(&mut self, count: usize) {
		if count <= ARRAY_FIX_MAX_LEN {
			self.buf.push(BC_ARRAY_FIX_0 + count as u8);
		} else {
			self.buf.push(BC_ARRAY);
			self.write_len(count);
		}
	}

	/// Write any value; objects are written in keyed form.
	pub fn write_value(&mut self, value: &Value) {
		match value {
			Value::Null => self.write_null(),
			Value::Bool(value) => self.write_bool(*value),
			Value::I64(value) => self.write_i64(*value),
			Value::F64(value) => self.write_f64(*value),
			Value::String(value) => self.write_str(value),
			Value::Bytes(value) => self.write_bytes(value),
			Value::Array(items) => {
				self.start_array(items.len());
				for item in items {
					self.write_value(item);
				}
			}
			Value::Map(entries) => {
				self.start_object();
				for (key, item) in entries {
					self.write_str(key);
					self.write_value(item);
				}
				self.end_object();
			}
			Value::Object(object) => {
				self.start_object();
				for field in &object.fields {
					self.write_str(&field.name);
					self.write_value(&field.value);
				}
				self.end_object();
			}
		}
	}

	/// Write an object positionally, fields in declaration order.
	pub fn write_array_mapping(&mut self, object: &ObjectValue) {
		self.start_array(object.fields.len());
		for field in &object.fields {
			self.write_value(&field.value);
		}
	}

	fn write_len(&mut self, len: usize) {
		self.write_i32(i32::try_from(len).unwrap_or(i32::MAX));
	}
}
