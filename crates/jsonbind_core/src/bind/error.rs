use thiserror::Error;

use crate::bind::SchemaViolation;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BindError>;

/// Error raised by a build function while finalizing an object.
pub type BuildFailure = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while building readers and decoding JSON / JSONB input.
#[derive(Debug, Error)]
pub enum BindError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Malformed input that no token can be read from.
	#[error("syntax error: {detail}")]
	Syntax {
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Shape is explicitly disallowed from being decoded.
	#[error("not serializable: {type_name}, {detail}")]
	NotSerializable {
		/// Shape type name.
		type_name: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Expected object or array framing was not found.
	#[error("expect {expected}, but {found}: {detail}")]
	Framing {
		/// Expected framing token.
		expected: &'static str,
		/// Token actually found.
		found: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Raw allocation without a creator failed.
	#[error("unsafe allocation failed for {type_name}: {detail}")]
	UnsafeAllocation {
		/// Shape type name.
		type_name: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// No creator, no raw allocation and no build function were available.
	#[error("create instance error for {type_name}: {detail}")]
	CreateInstance {
		/// Shape type name.
		type_name: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Build function rejected the intermediate object.
	#[error("build object error for {type_name}: {detail}")]
	Build {
		/// Shape type name.
		type_name: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
		/// Original build failure.
		#[source]
		source: BuildFailure,
	},
	/// Schema hook rejected the finished object.
	#[error(transparent)]
	Schema(#[from] SchemaViolation),
	/// Auto-type security policy refused a type hint.
	#[error("auto type not allowed: {type_name} ({reason}), {detail}")]
	TypeNotAllowed {
		/// Type name or hash label from the stream.
		type_name: String,
		/// Policy reason.
		reason: &'static str,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Auto-type resolved to a shape not assignable to the declared one.
	#[error("auto type {type_name} is not assignable to {expected}, {detail}")]
	AutoTypeMismatch {
		/// Resolved type name.
		type_name: String,
		/// Declared type name.
		expected: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Unknown field while strict unknown-field rejection is enabled.
	#[error("unknown field {field} on {type_name}, {detail}")]
	UnknownField {
		/// Field name from the stream.
		field: String,
		/// Shape type name.
		type_name: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Value token cannot be converted to the requested kind.
	#[error("type mismatch: expected {expected}, got {found}, {detail}")]
	TypeMismatch {
		/// Expected logical value kind.
		expected: &'static str,
		/// Token actually found.
		found: String,
		/// Cursor offset of the failure.
		at: usize,
		/// Cursor diagnostic.
		detail: String,
	},
	/// Nesting exceeded the configured level limit.
	#[error("nesting depth exceeded (max={max_level}) at offset {at}")]
	DepthExceeded {
		/// Configured level ceiling.
		max_level: u32,
		/// Cursor offset of the failure.
		at: usize,
	},
	/// Input continued after the decoded value.
	#[error("input not end at offset {at}")]
	TrailingInput {
		/// Offset of the first unread token.
		at: usize,
	},
	/// Two bindings of one shape share the same name hash.
	#[error("duplicate field {field} on {type_name}")]
	DuplicateField {
		/// Shape type name.
		type_name: String,
		/// Offending field name.
		field: String,
	},
	/// Feature name could not be parsed.
	#[error("invalid feature: {name}")]
	InvalidFeature {
		/// User-provided feature name.
		name: String,
	},
	/// Requested shape was not defined.
	#[error("shape not found: {name}")]
	ShapeNotFound {
		/// Requested shape type name.
		name: String,
	},
	/// Shape definition file was rejected.
	#[error("invalid shape file: {detail}")]
	InvalidShapeFile {
		/// Rejection reason.
		detail: String,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
}

impl BindError {
	/// Return the cursor offset carried by decode-time errors.
	pub fn offset(&self) -> Option<usize> {
		match self {
			Self::UnexpectedEof { at, .. }
			| Self::Syntax { at, .. }
			| Self::NotSerializable { at, .. }
			| Self::Framing { at, .. }
			| Self::UnsafeAllocation { at, .. }
			| Self::CreateInstance { at, .. }
			| Self::Build { at, .. }
			| Self::TypeNotAllowed { at, .. }
			| Self::AutoTypeMismatch { at, .. }
			| Self::UnknownField { at, .. }
			| Self::TypeMismatch { at, .. }
			| Self::DepthExceeded { at, .. }
			| Self::TrailingInput { at } => Some(*at),
			_ => None,
		}
	}
}
