use std::fs;
use std::path::PathBuf;

use jsonbind::bind::{BindError, DecodeContext, Encoding, JsonCursor, JsonbWriter, Result, Source, TokenCursor};

#[derive(clap::Args)]
pub struct Args {
	pub input: PathBuf,
	#[arg(long)]
	pub out: PathBuf,
	#[arg(long)]
	pub type_name: Option<String>,
	#[arg(long)]
	pub zstd: bool,
}

/// Convert a JSON text document into JSONB.
pub fn run(args: Args) -> Result<()> {
	let Args { input, out, type_name, zstd } = args;

	let source = Source::open(&input)?;
	if source.encoding != Encoding::Json {
		return Err(BindError::Syntax {
			at: 0,
			detail: format!("{} is not json text", input.display()),
		});
	}
	let bytes = encode_json(source.bytes(), type_name.as_deref())?;
	let payload = if zstd { zstd::stream::encode_all(bytes.as_slice(), 3)? } else { bytes };
	fs::write(&out, &payload)?;

	println!("input: {}", input.display());
	println!("out: {}", out.display());
	println!("compression: {}", if zstd { "zstd" } else { "none" });
	println!("bytes: {}", payload.len());
	Ok(())
}

/// Re-encode one JSON value as JSONB, keeping key order.
pub(crate) fn encode_json(text: &[u8], type_name: Option<&str>) -> Result<Vec<u8>> {
	let text = std::str::from_utf8(text).map_err(|err| BindError::Syntax {
		at: err.valid_up_to(),
		detail: format!("invalid utf-8 input, offset {}", err.valid_up_to()),
	})?;
	let mut cursor = JsonCursor::new(text, DecodeContext::default());
	let value = cursor.read_any()?;
	if !cursor.is_end() {
		return Err(BindError::TrailingInput { at: cursor.offset() });
	}

	let mut writer = JsonbWriter::new();
	if let Some(type_name) = type_name {
		writer.write_type_name(type_name);
	}
	writer.write_value(&value);
	Ok(writer.into_bytes())
}

#[cfg(test)]
mod tests {
	use jsonbind::bind::{BindError, DecodeContext, JsonbCursor, TokenCursor, Value, fnv64};

	use super::encode_json;

	#[test]
	fn keeps_key_order_and_type_prefix() {
		let bytes = encode_json(br#"{"b": 1, "a": [true, null]}"#, Some("demo.T")).expect("encodes");
		let mut cursor = JsonbCursor::new(&bytes, DecodeContext::default());
		assert_eq!(cursor.next_if_type_marker().expect("marker reads"), Some(fnv64("demo.T")));
		let value = cursor.read_any().expect("value reads");
		assert_eq!(
			value,
			Value::Map(vec![("b".into(), Value::I64(1)), ("a".into(), Value::Array(vec![Value::Bool(true), Value::Null]))])
		);
	}

	#[test]
	fn trailing_text_is_rejected() {
		let err = encode_json(b"{} []", None).expect_err("trailing input");
		assert!(matches!(err, BindError::TrailingInput { at: 3 }));
	}
}
