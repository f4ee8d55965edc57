use crate::bind::bytes::ByteCursor;
use crate::bind::hash::{NameHasher, fnv64};
use crate::bind::jsonb::constants::*;
use crate::bind::{ArrayLen, BindError, DecodeContext, Marker, Result, Token, TokenCursor, Value};

/// Token cursor over JSONB bytes.
pub struct JsonbCursor<'a> {
	bytes: ByteCursor<'a>,
	context: DecodeContext,
	name: String,
	name_lcase: u64,
	string: String,
	level: u32,
}

impl<'a> JsonbCursor<'a> {
	/// Create a cursor at the start of `bytes`.
	pub fn new(bytes: &'a [u8], context: DecodeContext) -> Self {
		Self {
			bytes: ByteCursor::new(bytes),
			context,
			name: String::new(),
			name_lcase: 0,
			string: String::new(),
			level: 0,
		}
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.peek()
	}

	fn syntax(&self, message: &str) -> BindError {
		BindError::Syntax {
			at: self.bytes.pos(),
			detail: self.info(message),
		}
	}

	fn read_int32_value(&mut self) -> Result<i32> {
		let at = self.bytes.pos();
		let marker = self.bytes.read_u8()?;
		match marker {
			byte if is_int32_num(byte) => Ok(i32::from(byte as i8)),
			BC_INT32_BYTE_MIN..=BC_INT32_BYTE_MAX => {
				let low = i32::from(self.bytes.read_u8()?);
				Ok(((i32::from(marker) - i32::from(BC_INT32_BYTE_ZERO)) << 8) + low)
			}
			BC_INT32_SHORT_MIN..=BC_INT32_SHORT_MAX => {
				let low = i32::from(self.bytes.read_u16_be()?);
				Ok(((i32::from(marker) - i32::from(BC_INT32_SHORT_ZERO)) << 16) + low)
			}
			BC_INT32 => self.bytes.read_i32_be(),
			other => Err(BindError::Syntax {
				at,
				detail: format!("expect int32 length, but marker 0x{other:02x}, offset {at}"),
			}),
		}
	}

	fn read_len(&mut self) -> Result<usize> {
		let len = self.read_int32_value()?;
		usize::try_from(len).map_err(|_| self.syntax(&format!("negative length {len}")))
	}

	fn read_number(&mut self) -> Result<Value> {
		let Some(marker) = self.peek() else {
			return Err(self.type_mismatch("number"));
		};
		match marker {
			BC_INT64 => {
				self.bytes.bump();
				Ok(Value::I64(self.bytes.read_i64_be()?))
			}
			BC_DOUBLE => {
				self.bytes.bump();
				Ok(Value::F64(self.bytes.read_f64_be()?))
			}
			BC_DOUBLE_NUM_0 => {
				self.bytes.bump();
				Ok(Value::F64(0.0))
			}
			BC_DOUBLE_NUM_1 => {
				self.bytes.bump();
				Ok(Value::F64(1.0))
			}
			_ => Ok(Value::I64(i64::from(self.read_int32_value()?))),
		}
	}

	fn read_str(&mut self) -> Result<String> {
		let at = self.bytes.pos();
		let marker = self.bytes.read_u8()?;
		let len = match marker {
			BC_STR_ASCII_FIX_MIN..=BC_STR_ASCII_FIX_MAX => usize::from(marker - BC_STR_ASCII_FIX_MIN),
			BC_STR_ASCII | BC_STR_UTF8 => self.read_len()?,
			other => {
				return Err(BindError::TypeMismatch {
					expected: "string",
					found: format!("marker 0x{other:02x}"),
					at,
					detail: format!("read string error, offset {at}"),
				});
			}
		};
		let raw = self.bytes.read_exact(len)?;
		match std::str::from_utf8(raw) {
			Ok(text) => Ok(text.to_owned()),
			Err(_) => Err(BindError::Syntax {
				at,
				detail: format!("invalid utf-8 string, offset {at}"),
			}),
		}
	}

	fn skip_container_value(&mut self) -> Result<()> {
		self.enter_level()?;
		let result = self.skip_container_body();
		self.leave_level();
		result
	}

	fn skip_container_body(&mut self) -> Result<()> {
		if self.next_if_match(Marker::ObjectStart)? {
			while !self.next_if_match(Marker::ObjectEnd)? {
				self.skip_value()?;
				self.skip_value()?;
			}
			return Ok(());
		}
		let ArrayLen::Counted(count) = self.start_array()? else {
			return Ok(());
		};
		for _ in 0..count {
			self.skip_value()?;
		}
		Ok(())
	}

	fn read_container_any(&mut self) -> Result<Value> {
		self.enter_level()?;
		let result = self.read_container_body();
		self.leave_level();
		result
	}

	fn read_container_body(&mut self) -> Result<Value> {
		if self.next_if_match(Marker::ObjectStart)? {
			let mut entries = Vec::new();
			while !self.next_if_match(Marker::ObjectEnd)? {
				let key = match self.token() {
					Token::Null => {
						self.bytes.bump();
						None
					}
					Token::Number => Some(self.read_number_text()?),
					_ => Some(self.read_str()?),
				};
				let value = self.read_any()?;
				if let Some(key) = key {
					entries.push((key.into_boxed_str(), value));
				}
			}
			return Ok(Value::Map(entries));
		}
		let ArrayLen::Counted(count) = self.start_array()? else {
			return Ok(Value::Array(Vec::new()));
		};
		let mut items = Vec::with_capacity(count.min(1024));
		for _ in 0..count {
			items.push(self.read_any()?);
		}
		Ok(Value::Array(items))
	}

	fn read_number_text(&mut self) -> Result<String> {
		Ok(match self.read_number()? {
			Value::I64(value) => value.to_string(),
			Value::F64(value) => value.to_string(),
			_ => String::new(),
		})
	}
}

impl TokenCursor for JsonbCursor<'_> {
	fn is_jsonb(&self) -> bool {
		true
	}

	fn context(&self) -> &DecodeContext {
		&self.context
	}

	fn token(&self) -> Token {
		let Some(byte) = self.peek() else {
			return Token::Eof;
		};
		match byte {
			BC_OBJECT => Token::ObjectStart,
			BC_OBJECT_END => Token::ObjectEnd,
			BC_NULL => Token::Null,
			BC_TRUE | BC_FALSE => Token::Bool,
			BC_TYPED_ANY => Token::TypeMarker,
			BC_BINARY => Token::Binary,
			byte if is_array(byte) => Token::ArrayStart,
			byte if is_string(byte) => Token::String,
			byte if is_number(byte) => Token::Number,
			other => Token::Invalid(other),
		}
	}

	fn offset(&self) -> usize {
		self.bytes.pos()
	}

	fn next_if_match(&mut self, marker: Marker) -> Result<bool> {
		let expected = match marker {
			Marker::ObjectStart => BC_OBJECT,
			Marker::ObjectEnd => BC_OBJECT_END,
			Marker::ArrayEnd | Marker::Comma => return Ok(false),
		};
		if self.peek() == Some(expected) {
			self.bytes.bump();
			return Ok(true);
		}
		Ok(false)
	}

	fn next_if_null(&mut self) -> Result<bool> {
		if self.peek() == Some(BC_NULL) {
			self.bytes.bump();
			return Ok(true);
		}
		Ok(false)
	}

	fn start_array(&mut self) -> Result<ArrayLen> {
		match self.peek() {
			Some(byte @ BC_ARRAY_FIX_0..=BC_ARRAY_FIX_MAX) => {
				self.bytes.bump();
				Ok(ArrayLen::Counted(usize::from(byte - BC_ARRAY_FIX_0)))
			}
			Some(BC_ARRAY) => {
				self.bytes.bump();
				Ok(ArrayLen::Counted(self.read_len()?))
			}
			_ => Err(self.framing_error("array")),
		}
	}

	fn read_field_name_hash(&mut self) -> Result<u64> {
		let name = match self.token() {
			Token::String => self.read_str()?,
			Token::Number => self.read_number_text()?,
			Token::Null => {
				self.bytes.bump();
				self.skip_value()?;
				self.name.clear();
				self.name_lcase = 0;
				return Ok(0);
			}
			_ => return Err(self.type_mismatch("field name")),
		};
		let mut hasher = NameHasher::default();
		hasher.push_str(&name);
		let (exact, lcase) = hasher.finish();
		self.name = name;
		self.name_lcase = lcase;
		Ok(exact)
	}

	fn name_hash_lcase(&self) -> u64 {
		self.name_lcase
	}

	fn field_name(&self) -> &str {
		&self.name
	}

	fn read_type_hash(&mut self) -> Result<u64> {
		self.string = self.read_str()?;
		Ok(fnv64(&self.string))
	}

	fn string(&self) -> &str {
		&self.string
	}

	fn next_if_type_marker(&mut self) -> Result<Option<u64>> {
		if self.peek() != Some(BC_TYPED_ANY) {
			return Ok(None);
		}
		self.bytes.bump();
		self.read_type_hash().map(Some)
	}

	fn read_bool(&mut self) -> Result<Option<bool>> {
		match self.token() {
			Token::Null => {
				self.bytes.bump();
				Ok(None)
			}
			Token::Bool => {
				let value = self.peek() == Some(BC_TRUE);
				self.bytes.bump();
				Ok(Some(value))
			}
			Token::Number => match self.read_number()? {
				Value::I64(value) => Ok(Some(value != 0)),
				Value::F64(value) => Ok(Some(value != 0.0)),
				_ => Err(self.type_mismatch("bool")),
			},
			Token::String => {
				let at = self.bytes.pos();
				let text = self.read_str()?;
				match text.trim() {
					"true" => Ok(Some(true)),
					"false" => Ok(Some(false)),
					"" => Ok(None),
					other => Err(BindError::TypeMismatch {
						expected: "bool",
						found: format!("string {other:?}"),
						at,
						detail: format!("read bool error, offset {at}"),
					}),
				}
			}
			_ => Err(self.type_mismatch("bool")),
		}
	}

	fn read_i64(&mut self) -> Result<Option<i64>> {
		match self.token() {
			Token::Null => {
				self.bytes.bump();
				Ok(None)
			}
			Token::Number => {
				let at = self.offset();
				match self.read_number()? {
					Value::I64(value) => Ok(Some(value)),
					Value::F64(value) => f64_to_i64(value).map(Some).ok_or_else(|| int_out_of_range(value, at)),
					_ => Err(self.type_mismatch("int")),
				}
			}
			Token::Bool => {
				let value = self.peek() == Some(BC_TRUE);
				self.bytes.bump();
				Ok(Some(i64::from(value)))
			}
			Token::String => {
				let at = self.bytes.pos();
				let text = self.read_str()?;
				parse_i64_text(&text, at)
			}
			_ => Err(self.type_mismatch("int")),
		}
	}

	fn read_f64(&mut self) -> Result<Option<f64>> {
		match self.token() {
			Token::Null => {
				self.bytes.bump();
				Ok(None)
			}
			Token::Number => match self.read_number()? {
				Value::I64(value) => Ok(Some(value as f64)),
				Value::F64(value) => Ok(Some(value)),
				_ => Err(self.type_mismatch("float")),
			},
			Token::String => {
				let at = self.bytes.pos();
				let text = self.read_str()?;
				parse_f64_text(&text, at)
			}
			_ => Err(self.type_mismatch("float")),
		}
	}

	fn read_string(&mut self) -> Result<Option<String>> {
		match self.token() {
			Token::Null => {
				self.bytes.bump();
				Ok(None)
			}
			Token::String => self.read_str().map(Some),
			Token::Number => self.read_number_text().map(Some),
			Token::Bool => {
				let value = self.peek() == Some(BC_TRUE);
				self.bytes.bump();
				Ok(Some(value.to_string()))
			}
			_ => Err(self.type_mismatch("string")),
		}
	}

	fn read_bytes(&mut self) -> Result<Option<Vec<u8>>> {
		match self.token() {
			Token::Null => {
				self.bytes.bump();
				Ok(None)
			}
			Token::Binary => {
				self.bytes.bump();
				let len = self.read_len()?;
				Ok(Some(self.bytes.read_exact(len)?.to_vec()))
			}
			Token::String => self.read_str().map(|text| Some(text.into_bytes())),
			_ => Err(self.type_mismatch("bytes")),
		}
	}

	fn read_any(&mut self) -> Result<Value> {
		match self.token() {
			Token::Null => {
				self.bytes.bump();
				Ok(Value::Null)
			}
			Token::Bool => {
				let value = self.peek() == Some(BC_TRUE);
				self.bytes.bump();
				Ok(Value::Bool(value))
			}
			Token::Number => self.read_number(),
			Token::String => Ok(Value::String(self.read_str()?.into_boxed_str())),
			Token::Binary => Ok(self.read_bytes()?.map(Value::Bytes).unwrap_or(Value::Null)),
			Token::TypeMarker => {
				self.bytes.bump();
				self.read_type_hash()?;
				self.read_any()
			}
			Token::ObjectStart | Token::ArrayStart => self.read_container_any(),
			Token::Eof => Err(BindError::UnexpectedEof {
				at: self.bytes.pos(),
				need: 1,
				rem: 0,
			}),
			_ => Err(self.syntax("illegal value marker")),
		}
	}

	fn skip_value(&mut self) -> Result<()> {
		match self.token() {
			Token::Null | Token::Bool => {
				self.bytes.bump();
				Ok(())
			}
			Token::Number => self.read_number().map(|_| ()),
			Token::String => self.read_str().map(|_| ()),
			Token::Binary => self.read_bytes().map(|_| ()),
			Token::TypeMarker => {
				self.bytes.bump();
				self.read_str()?;
				self.skip_value()
			}
			Token::ObjectStart | Token::ArrayStart => self.skip_container_value(),
			Token::Eof => Err(BindError::UnexpectedEof {
				at: self.bytes.pos(),
				need: 1,
				rem: 0,
			}),
			_ => Err(self.syntax("illegal value marker")),
		}
	}

	fn enter_level(&mut self) -> Result<()> {
		if self.level >= self.context.max_level {
			return Err(BindError::DepthExceeded {
				max_level: self.context.max_level,
				at: self.bytes.pos(),
			});
		}
		self.level += 1;
		Ok(())
	}

	fn leave_level(&mut self) {
		self.level = self.level.saturating_sub(1);
	}
}

pub(crate) fn parse_i64_text(text: &str, at: usize) -> Result<Option<i64>> {
	let trimmed = text.trim();
	if trimmed.is_empty() || trimmed == "null" {
		return Ok(None);
	}
	if let Ok(value) = trimmed.parse::<i64>() {
		return Ok(Some(value));
	}
	match trimmed.parse::<f64>() {
		Ok(value) => f64_to_i64(value).map(Some).ok_or_else(|| int_out_of_range(value, at)),
		Err(_) => Err(BindError::TypeMismatch {
			expected: "int",
			found: format!("string {trimmed:?}"),
			at,
			detail: format!("read int error, offset {at}"),
		}),
	}
}

/// Integer part of a float; `None` when it is not finite or falls outside `i64`.
pub(crate) fn f64_to_i64(value: f64) -> Option<i64> {
	const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
	let truncated = value.trunc();
	(truncated >= -TWO_POW_63 && truncated < TWO_POW_63).then_some(truncated as i64)
}

pub(crate) fn int_out_of_range(value: f64, at: usize) -> BindError {
	BindError::TypeMismatch {
		expected: "int",
		found: format!("number {value}"),
		at,
		detail: format!("read int error, offset {at}, {value} out of range"),
	}
}

pub(crate) fn parse_f64_text(text: &str, at: usize) -> Result<Option<f64>> {
	let trimmed = text.trim();
	if trimmed.is_empty() || trimmed == "null" {
		return Ok(None);
	}
	trimmed.parse::<f64>().map(Some).map_err(|_| BindError::TypeMismatch {
		expected: "float",
		found: format!("string {trimmed:?}"),
		at,
		detail: format!("read float error, offset {at}"),
	})
}
