mod bytes;
mod context;
mod cursor;
mod decode;
mod error;
mod feature;
mod field;
mod hash;
mod instance;
mod json;
mod jsonb;
mod reader;
mod resolve;
mod schema;
mod shape;
mod source;
mod value;

/// Stream-level decode configuration.
pub use context::DecodeContext;
/// Token cursor contract shared by both wire formats.
pub use cursor::{ArrayLen, Marker, Token, TokenCursor};
/// Top-level decode entry points.
pub use decode::{decode_json, decode_jsonb, decode_source};
/// Error and result aliases.
pub use error::{BindError, BuildFailure, Result};
/// Decode feature bitmask.
pub use feature::Features;
/// Field bindings and value kinds.
pub use field::{FieldBinding, FieldKind};
/// Name hashing used for field and type dispatch.
pub use hash::{HASH_TYPE, NameHasher, fnv64, fnv64_lcase};
/// Object under construction.
pub use instance::Instance;
/// JSON text cursor.
pub use json::JsonCursor;
/// JSONB cursor and writer.
pub use jsonb::{JsonbCursor, JsonbWriter};
/// Object-binding reader and its builder.
pub use reader::{BuildFn, CreatorFn, ObjectReader, ObjectReaderBuilder};
/// Auto-type resolution policy and registry.
pub use resolve::{AutoTypeRegistry, DEFAULT_DENY_PREFIXES, Resolution, ResolveError, TypeResolver};
/// Post-construction validation hook.
pub use schema::{ObjectSchema, SchemaValidator, SchemaViolation};
/// Shape descriptor.
pub use shape::Shape;
/// Input loading, compression and encoding detection.
pub use source::{Compression, Encoding, Source, ZSTD_MAGIC, decode_bytes};
/// Decoded runtime value types.
pub use value::{FieldValue, ObjectValue, Value};
