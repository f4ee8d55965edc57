use crate::bind::{BindError, DecodeContext, Features, Result, Value};

/// Kind of the token at the cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
	/// `{` or the binary object marker.
	ObjectStart,
	/// `}` or the binary object-end marker.
	ObjectEnd,
	/// `[` or a binary array header.
	ArrayStart,
	/// `]` (text only).
	ArrayEnd,
	/// String scalar.
	String,
	/// Numeric scalar.
	Number,
	/// `true` / `false`.
	Bool,
	/// Null literal.
	Null,
	/// Binary payload (JSONB only).
	Binary,
	/// Typed-value prefix carrying a type name (JSONB only).
	TypeMarker,
	/// Input exhausted.
	Eof,
	/// Byte that starts no known token.
	Invalid(u8),
}

impl Token {
	/// Human-readable token label for diagnostics.
	pub fn describe(self) -> String {
		match self {
			Self::ObjectStart => "object start".to_owned(),
			Self::ObjectEnd => "object end".to_owned(),
			Self::ArrayStart => "array start".to_owned(),
			Self::ArrayEnd => "array end".to_owned(),
			Self::String => "string".to_owned(),
			Self::Number => "number".to_owned(),
			Self::Bool => "bool".to_owned(),
			Self::Null => "null".to_owned(),
			Self::Binary => "binary".to_owned(),
			Self::TypeMarker => "typed marker".to_owned(),
			Self::Eof => "eof".to_owned(),
			Self::Invalid(byte) => format!("invalid byte 0x{byte:02x}"),
		}
	}
}

/// Framing marker the engine may conditionally consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
	/// Object start.
	ObjectStart,
	/// Object end.
	ObjectEnd,
	/// Array end; binary arrays are counted and never match.
	ArrayEnd,
	/// Value separator; binary framing never matches.
	Comma,
}

/// Array framing reported by [`TokenCursor::start_array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLen {
	/// Binary framing: declared element count.
	Counted(usize),
	/// Text framing: elements run until `]`.
	Delimited,
}

/// Stream position supplier consumed by object readers.
///
/// Implementations own the tokenizer state and the stream context. After a value has been
/// consumed the cursor is positioned on the next token, with any value separator consumed.
pub trait TokenCursor {
	/// Return whether this is binary (JSONB) framing.
	fn is_jsonb(&self) -> bool;

	/// Stream context (features, resolver, limits).
	fn context(&self) -> &DecodeContext;

	/// Kind of the current token.
	fn token(&self) -> Token;

	/// Byte offset of the current token.
	fn offset(&self) -> usize;

	/// Return whether no tokens remain.
	fn is_end(&self) -> bool {
		self.token() == Token::Eof
	}

	/// Return whether the current token starts an array.
	fn is_array(&self) -> bool {
		self.token() == Token::ArrayStart
	}

	/// Merge call-level features with the stream context.
	fn features(&self, features: Features) -> Features {
		self.context().features | features
	}

	/// Consume `marker` when it is the current token.
	fn next_if_match(&mut self, marker: Marker) -> Result<bool>;

	/// Consume a null literal when it is the current token.
	fn next_if_null(&mut self) -> Result<bool>;

	/// Consume an array start and report its framing.
	fn start_array(&mut self) -> Result<ArrayLen>;

	/// Read an object key and return its exact hash.
	///
	/// Returns `0` for a key that carries no name; the paired value has then already been
	/// discarded.
	fn read_field_name_hash(&mut self) -> Result<u64>;

	/// Smart-match hash of the last key read.
	fn name_hash_lcase(&self) -> u64;

	/// Text of the last key read.
	fn field_name(&self) -> &str;

	/// Read a type name value and return its hash; the text is kept for [`Self::string`].
	fn read_type_hash(&mut self) -> Result<u64>;

	/// Text of the last type name read.
	fn string(&self) -> &str;

	/// Consume a typed-value prefix and return the type hash; text framing has none.
	fn next_if_type_marker(&mut self) -> Result<Option<u64>>;

	/// Read a boolean; `None` for null.
	fn read_bool(&mut self) -> Result<Option<bool>>;

	/// Read an integer; `None` for null.
	fn read_i64(&mut self) -> Result<Option<i64>>;

	/// Read a float; `None` for null.
	fn read_f64(&mut self) -> Result<Option<f64>>;

	/// Read a string; `None` for null.
	fn read_string(&mut self) -> Result<Option<String>>;

	/// Read a byte payload; `None` for null.
	fn read_bytes(&mut self) -> Result<Option<Vec<u8>>>;

	/// Read any value without a shape.
	fn read_any(&mut self) -> Result<Value>;

	/// Consume the current value including nested structure.
	fn skip_value(&mut self) -> Result<()>;

	/// Enter one nesting level.
	fn enter_level(&mut self) -> Result<()>;

	/// Leave one nesting level.
	fn leave_level(&mut self);

	/// Attach position information to a message.
	fn info(&self, message: &str) -> String {
		format!("{message}, offset {}, token {}", self.offset(), self.token().describe())
	}

	/// Error for a shape that must not be decoded.
	fn error_on_non_serializable(&self, type_name: &str) -> BindError {
		BindError::NotSerializable {
			type_name: type_name.to_owned(),
			at: self.offset(),
			detail: self.info("not support none serializable class"),
		}
	}

	/// Error for missing framing at the current position.
	fn framing_error(&self, expected: &'static str) -> BindError {
		BindError::Framing {
			expected,
			found: self.token().describe(),
			at: self.offset(),
			detail: self.info(&format!("expect {expected}")),
		}
	}

	/// Error for a value that cannot be read as `expected`.
	fn type_mismatch(&self, expected: &'static str) -> BindError {
		BindError::TypeMismatch {
			expected,
			found: self.token().describe(),
			at: self.offset(),
			detail: self.info(&format!("read {expected} error")),
		}
	}
}
