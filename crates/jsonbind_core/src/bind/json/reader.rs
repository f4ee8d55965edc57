use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::bind::hash::{NameHasher, fnv64};
use crate::bind::jsonb::reader::{f64_to_i64, int_out_of_range, parse_f64_text, parse_i64_text};
use crate::bind::{ArrayLen, BindError, DecodeContext, Marker, Result, Token, TokenCursor, Value};

/// Token cursor over UTF-8 JSON text.
///
/// The cursor always rests on a non-whitespace byte. Reading a value also consumes the
/// separator that follows it, so callers never see commas between elements.
pub struct JsonCursor<'a> {
	text: &'a str,
	pos: usize,
	context: DecodeContext,
	name: String,
	name_lcase: u64,
	string: String,
	level: u32,
	depth: u32,
}

/// Scanned number literal.
struct NumberText<'a> {
	text: &'a str,
	is_float: bool,
}

impl<'a> JsonCursor<'a> {
	/// Create a cursor at the first token of `text`.
	pub fn new(text: &'a str, context: DecodeContext) -> Self {
		let mut cursor = Self {
			text,
			pos: text.strip_prefix('\u{feff}').map_or(0, |_| 3),
			context,
			name: String::new(),
			name_lcase: 0,
			string: String::new(),
			level: 0,
			depth: 0,
		};
		cursor.skip_whitespace();
		cursor
	}

	fn bytes(&self) -> &'a [u8] {
		self.text.as_bytes()
	}

	fn peek(&self) -> Option<u8> {
		self.bytes().get(self.pos).copied()
	}

	fn skip_whitespace(&mut self) {
		while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
			self.pos += 1;
		}
	}

	/// Step past the separator after a value.
	///
	/// Inside brackets a value must be followed by `,` and another value, or by the closing
	/// bracket. At the top level nothing is consumed.
	fn end_value(&mut self) -> Result<()> {
		self.skip_whitespace();
		if self.depth == 0 {
			return Ok(());
		}
		match self.peek() {
			Some(b',') => {
				self.pos += 1;
				self.skip_whitespace();
				if matches!(self.peek(), Some(b'}' | b']')) {
					return Err(self.syntax("expect value after ','"));
				}
				Ok(())
			}
			Some(b'}' | b']') | None => Ok(()),
			Some(_) => Err(self.syntax("expect ',' or closing bracket")),
		}
	}

	fn syntax(&self, message: &str) -> BindError {
		BindError::Syntax {
			at: self.pos,
			detail: self.info(message),
		}
	}

	fn eof(&self) -> BindError {
		BindError::UnexpectedEof {
			at: self.pos,
			need: 1,
			rem: 0,
		}
	}

	fn next_if_literal(&mut self, literal: &str) -> Result<bool> {
		if self.bytes()[self.pos..].starts_with(literal.as_bytes()) {
			let end = self.pos + literal.len();
			if !matches!(self.bytes().get(end), Some(b) if b.is_ascii_alphanumeric() || *b == b'_') {
				self.pos = end;
				self.end_value()?;
				return Ok(true);
			}
		}
		Ok(false)
	}

	fn read_literal_bool(&mut self) -> Result<bool> {
		if self.next_if_literal("true")? {
			return Ok(true);
		}
		if self.next_if_literal("false")? {
			return Ok(false);
		}
		Err(self.syntax("illegal literal"))
	}

	fn scan_number(&mut self) -> Result<NumberText<'a>> {
		let bytes = self.bytes();
		let start = self.pos;
		let mut end = start;
		let mut is_float = false;
		if bytes.get(end) == Some(&b'-') {
			end += 1;
		}
		let digits_start = end;
		while bytes.get(end).is_some_and(u8::is_ascii_digit) {
			end += 1;
		}
		if end == digits_start {
			return Err(self.syntax("illegal number"));
		}
		if bytes.get(end) == Some(&b'.') {
			is_float = true;
			end += 1;
			while bytes.get(end).is_some_and(u8::is_ascii_digit) {
				end += 1;
			}
		}
		if matches!(bytes.get(end), Some(b'e' | b'E')) {
			is_float = true;
			end += 1;
			if matches!(bytes.get(end), Some(b'+' | b'-')) {
				end += 1;
			}
			let exp_start = end;
			while bytes.get(end).is_some_and(u8::is_ascii_digit) {
				end += 1;
			}
			if end == exp_start {
				return Err(self.syntax("illegal number exponent"));
			}
		}
		self.pos = end;
		self.end_value()?;
		Ok(NumberText {
			text: &self.text[start..end],
			is_float,
		})
	}

	fn read_number(&mut self) -> Result<Value> {
		let at = self.pos;
		let number = self.scan_number()?;
		if !number.is_float {
			if let Ok(value) = number.text.parse::<i64>() {
				return Ok(Value::I64(value));
			}
		}
		number.text.parse::<f64>().map(Value::F64).map_err(|_| BindError::Syntax {
			at,
			detail: format!("illegal number {}, offset {at}", number.text),
		})
	}

	/// Read a quoted string and leave the cursor on the byte after the closing quote.
	fn read_quoted(&mut self) -> Result<String> {
		if self.peek() != Some(b'"') {
			return Err(self.type_mismatch("string"));
		}
		self.pos += 1;
		let mut out = String::new();
		let mut run_start = self.pos;
		loop {
			let Some(byte) = self.peek() else {
				return Err(self.eof());
			};
			match byte {
				b'"' => {
					out.push_str(&self.text[run_start..self.pos]);
					self.pos += 1;
					return Ok(out);
				}
				b'\\' => {
					out.push_str(&self.text[run_start..self.pos]);
					self.pos += 1;
					let ch = self.read_escape()?;
					out.push(ch);
					run_start = self.pos;
				}
				0x00..=0x1f => return Err(self.syntax("control character in string")),
				_ => self.pos += 1,
			}
		}
	}

	fn read_escape(&mut self) -> Result<char> {
		let Some(byte) = self.peek() else {
			return Err(self.eof());
		};
		self.pos += 1;
		Ok(match byte {
			b'"' => '"',
			b'\\' => '\\',
			b'/' => '/',
			b'b' => '\u{8}',
			b'f' => '\u{c}',
			b'n' => '\n',
			b'r' => '\r',
			b't' => '\t',
			b'u' => {
				let high = self.read_hex4()?;
				if (0xd800..0xdc00).contains(&high) {
					if !self.bytes()[self.pos..].starts_with(b"\\u") {
						return Err(self.syntax("unpaired surrogate"));
					}
					self.pos += 2;
					let low = self.read_hex4()?;
					if !(0xdc00..0xe000).contains(&low) {
						return Err(self.syntax("unpaired surrogate"));
					}
					let code = 0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00);
					char::from_u32(code).ok_or_else(|| self.syntax("illegal unicode escape"))?
				} else {
					char::from_u32(high).ok_or_else(|| self.syntax("illegal unicode escape"))?
				}
			}
			_ => return Err(self.syntax("illegal escape")),
		})
	}

	fn read_hex4(&mut self) -> Result<u32> {
		let Some(digits) = self.text.get(self.pos..self.pos + 4) else {
			return Err(self.eof());
		};
		let value = u32::from_str_radix(digits, 16).map_err(|_| self.syntax("illegal unicode escape"))?;
		self.pos += 4;
		Ok(value)
	}

	fn read_str(&mut self) -> Result<String> {
		let value = self.read_quoted()?;
		self.end_value()?;
		Ok(value)
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
				if self.is_end() {
					return Err(self.eof());
				}
				let key = self.read_key()?;
				entries.push((key.into_boxed_str(), self.read_any()?));
			}
			return Ok(Value::Map(entries));
		}
		self.start_array()?;
		let mut items = Vec::new();
		while !self.next_if_match(Marker::ArrayEnd)? {
			if self.is_end() {
				return Err(self.eof());
			}
			items.push(self.read_any()?);
		}
		Ok(Value::Array(items))
	}

	fn read_key(&mut self) -> Result<String> {
		let key = self.read_quoted()?;
		self.skip_whitespace();
		if self.peek() != Some(b':') {
			return Err(self.syntax("expect ':'"));
		}
		self.pos += 1;
		self.skip_whitespace();
		Ok(key)
	}

	fn read_number_as_text(&mut self) -> Result<String> {
		Ok(self.scan_number()?.text.to_owned())
	}
}

impl TokenCursor for JsonCursor<'_> {
	fn is_jsonb(&self) -> bool {
		false
	}

	fn context(&self) -> &DecodeContext {
		&self.context
	}

	fn token(&self) -> Token {
		let Some(byte) = self.peek() else {
			return Token::Eof;
		};
		match byte {
			b'{' => Token::ObjectStart,
			b'}' => Token::ObjectEnd,
			b'[' => Token::ArrayStart,
			b']' => Token::ArrayEnd,
			b'"' => Token::String,
			b'-' | b'0'..=b'9' => Token::Number,
			b't' | b'f' => Token::Bool,
			b'n' => Token::Null,
			other => Token::Invalid(other),
		}
	}

	fn offset(&self) -> usize {
		self.pos
	}

	fn next_if_match(&mut self, marker: Marker) -> Result<bool> {
		let (expected, ends_value) = match marker {
			Marker::ObjectStart => (b'{', false),
			Marker::ObjectEnd => (b'}', true),
			Marker::ArrayEnd => (b']', true),
			Marker::Comma => (b',', false),
		};
		if self.peek() != Some(expected) {
			return Ok(false);
		}
		self.pos += 1;
		match marker {
			Marker::ObjectStart => self.depth += 1,
			Marker::ObjectEnd | Marker::ArrayEnd => self.depth = self.depth.saturating_sub(1),
			Marker::Comma => {}
		}
		if ends_value {
			self.end_value()?;
		} else {
			self.skip_whitespace();
		}
		Ok(true)
	}

	fn next_if_null(&mut self) -> Result<bool> {
		self.next_if_literal("null")
	}

	fn start_array(&mut self) -> Result<ArrayLen> {
		if self.peek() != Some(b'[') {
			return Err(self.framing_error("array"));
		}
		self.pos += 1;
		self.depth += 1;
		self.skip_whitespace();
		Ok(ArrayLen::Delimited)
	}

	fn read_field_name_hash(&mut self) -> Result<u64> {
		let name = self.read_key()?;
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
		Ok(None)
	}

	fn read_bool(&mut self) -> Result<Option<bool>> {
		match self.token() {
			Token::Null if self.next_if_null()? => Ok(None),
			Token::Bool => self.read_literal_bool().map(Some),
			Token::Number => match self.read_number()? {
				Value::I64(value) => Ok(Some(value != 0)),
				Value::F64(value) => Ok(Some(value != 0.0)),
				_ => Err(self.type_mismatch("bool")),
			},
			Token::String => {
				let at = self.pos;
				let text = self.read_str()?;
				match text.trim() {
					"true" => Ok(Some(true)),
					"false" => Ok(Some(false)),
					"" | "null" => Ok(None),
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
			Token::Null if self.next_if_null()? => Ok(None),
			Token::Number => {
				let at = self.pos;
				match self.read_number()? {
					Value::I64(value) => Ok(Some(value)),
					Value::F64(value) => f64_to_i64(value).map(Some).ok_or_else(|| int_out_of_range(value, at)),
					_ => Err(self.type_mismatch("int")),
				}
			}
			Token::Bool => self.read_literal_bool().map(|value| Some(i64::from(value))),
			Token::String => {
				let at = self.pos;
				let text = self.read_str()?;
				parse_i64_text(&text, at)
			}
			_ => Err(self.type_mismatch("int")),
		}
	}

	fn read_f64(&mut self) -> Result<Option<f64>> {
		match self.token() {
			Token::Null if self.next_if_null()? => Ok(None),
			Token::Number => match self.read_number()? {
				Value::I64(value) => Ok(Some(value as f64)),
				Value::F64(value) => Ok(Some(value)),
				_ => Err(self.type_mismatch("float")),
			},
			Token::String => {
				let at = self.pos;
				let text = self.read_str()?;
				parse_f64_text(&text, at)
			}
			_ => Err(self.type_mismatch("float")),
		}
	}

	fn read_string(&mut self) -> Result<Option<String>> {
		match self.token() {
			Token::Null if self.next_if_null()? => Ok(None),
			Token::String => self.read_str().map(Some),
			Token::Number => self.read_number_as_text().map(Some),
			Token::Bool => self.read_literal_bool().map(|value| Some(value.to_string())),
			_ => Err(self.type_mismatch("string")),
		}
	}

	fn read_bytes(&mut self) -> Result<Option<Vec<u8>>> {
		match self.token() {
			Token::Null if self.next_if_null()? => Ok(None),
			Token::String => {
				let at = self.pos;
				let text = self.read_str()?;
				STANDARD.decode(text.trim()).map(Some).map_err(|err| BindError::TypeMismatch {
					expected: "bytes",
					found: "string".to_owned(),
					at,
					detail: format!("read bytes error, offset {at}, {err}"),
				})
			}
			Token::ArrayStart => {
				let at = self.pos;
				let Value::Array(items) = self.read_container_any()? else {
					return Err(self.type_mismatch("bytes"));
				};
				items
					.iter()
					.map(|item| item.as_i64().and_then(|value| u8::try_from(value).ok()))
					.collect::<Option<Vec<u8>>>()
					.map(Some)
					.ok_or_else(|| BindError::TypeMismatch {
						expected: "bytes",
						found: "array".to_owned(),
						at,
						detail: format!("read bytes error, offset {at}, element out of byte range"),
					})
			}
			_ => Err(self.type_mismatch("bytes")),
		}
	}

	fn read_any(&mut self) -> Result<Value> {
		match self.token() {
			Token::Null if self.next_if_null()? => Ok(Value::Null),
			Token::Bool => self.read_literal_bool().map(Value::Bool),
			Token::Number => self.read_number(),
			Token::String => Ok(Value::String(self.read_str()?.into_boxed_str())),
			Token::ObjectStart | Token::ArrayStart => self.read_container_any(),
			Token::Eof => Err(self.eof()),
			_ => Err(self.syntax("illegal value")),
		}
	}

	fn skip_value(&mut self) -> Result<()> {
		match self.token() {
			Token::ObjectStart | Token::ArrayStart => {
				self.enter_level()?;
				let result = self.skip_container_body();
				self.leave_level();
				result
			}
			_ => self.read_any().map(|_| ()),
		}
	}

	fn enter_level(&mut self) -> Result<()> {
		if self.level >= self.context.max_level {
			return Err(BindError::DepthExceeded {
				max_level: self.context.max_level,
				at: self.pos,
			});
		}
		self.level += 1;
		Ok(())
	}

	fn leave_level(&mut self) {
		self.level = self.level.saturating_sub(1);
	}
}

impl JsonCursor<'_> {
	fn skip_container_body(&mut self) -> Result<()> {
		if self.next_if_match(Marker::ObjectStart)? {
			while !self.next_if_match(Marker::ObjectEnd)? {
				if self.is_end() {
					return Err(self.eof());
				}
				self.read_key()?;
				self.skip_value()?;
			}
			return Ok(());
		}
		self.start_array()?;
		while !self.next_if_match(Marker::ArrayEnd)? {
			if self.is_end() {
				return Err(self.eof());
			}
			self.skip_value()?;
		}
		Ok(())
	}
}
