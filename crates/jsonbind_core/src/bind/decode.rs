use crate::bind::{BindError, DecodeContext, Encoding, Features, JsonCursor, JsonbCursor, ObjectReader, Result, Source, TokenCursor, Value};

/// Decode one value of `reader`'s shape from complete JSON text.
pub fn decode_json(reader: &ObjectReader, bytes: &[u8], context: DecodeContext) -> Result<Value> {
	let text = std::str::from_utf8(bytes).map_err(|err| BindError::Syntax {
		at: err.valid_up_to(),
		detail: format!("invalid utf-8 input, offset {}", err.valid_up_to()),
	})?;
	let mut cursor = JsonCursor::new(text, context);
	let value = reader.read_object(&mut cursor, Features::NONE)?;
	ensure_end(&cursor)?;
	Ok(value)
}

/// Decode one value of `reader`'s shape from complete JSONB bytes.
pub fn decode_jsonb(reader: &ObjectReader, bytes: &[u8], context: DecodeContext) -> Result<Value> {
	let mut cursor = JsonbCursor::new(bytes, context);
	let value = reader.read_jsonb_object(&mut cursor, Features::NONE)?;
	ensure_end(&cursor)?;
	Ok(value)
}

/// Decode a loaded input using its encoding.
pub fn decode_source(reader: &ObjectReader, source: &Source, context: DecodeContext) -> Result<Value> {
	tracing::debug!(
		type_name = %reader.shape().type_name(),
		encoding = source.encoding.as_str(),
		compression = source.compression.as_str(),
		len = source.bytes().len(),
		"decoding source"
	);
	match source.encoding {
		Encoding::Json => decode_json(reader, source.bytes(), context),
		Encoding::Jsonb => decode_jsonb(reader, source.bytes(), context),
	}
}

fn ensure_end(cursor: &dyn TokenCursor) -> Result<()> {
	if cursor.is_end() {
		return Ok(());
	}
	Err(BindError::TrailingInput { at: cursor.offset() })
}
