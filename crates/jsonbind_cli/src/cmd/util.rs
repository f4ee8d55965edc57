use jsonbind::bind::{Result, Value};
use serde::Serialize;

/// Print a payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) -> Result<()> {
	let text = serde_json::to_string_pretty(payload).map_err(std::io::Error::from)?;
	println!("{text}");
	Ok(())
}

/// Render a name hash as fixed-width hex.
pub(crate) fn hash_hex(hash: u64) -> String {
	format!("0x{hash:016x}")
}

/// Convert a decoded value into JSON; objects carry their type under `@type`.
pub(crate) fn value_json(value: &Value) -> serde_json::Value {
	match value {
		Value::Null => serde_json::Value::Null,
		Value::Bool(v) => serde_json::Value::Bool(*v),
		Value::I64(v) => serde_json::Value::from(*v),
		Value::F64(v) => serde_json::Number::from_f64(*v).map_or(serde_json::Value::Null, serde_json::Value::Number),
		Value::String(v) => serde_json::Value::String(v.to_string()),
		Value::Bytes(v) => serde_json::Value::Array(v.iter().map(|byte| serde_json::Value::from(*byte)).collect()),
		Value::Array(items) => serde_json::Value::Array(items.iter().map(value_json).collect()),
		Value::Map(entries) => serde_json::Value::Object(entries.iter().map(|(key, item)| (key.to_string(), value_json(item))).collect()),
		Value::Object(object) => {
			let mut out = serde_json::Map::new();
			out.insert("@type".to_owned(), serde_json::Value::String(object.type_name.to_string()));
			for field in &object.fields {
				out.insert(field.name.to_string(), value_json(&field.value));
			}
			serde_json::Value::Object(out)
		}
	}
}

#[cfg(test)]
mod tests {
	use jsonbind::bind::{FieldValue, ObjectValue, Value};

	use super::{hash_hex, value_json};

	#[test]
	fn objects_render_with_type_key() {
		let value = Value::Object(ObjectValue {
			type_name: "demo.Point".into(),
			fields: vec![
				FieldValue {
					name: "x".into(),
					value: Value::I64(1),
				},
				FieldValue {
					name: "ratio".into(),
					value: Value::F64(f64::NAN),
				},
			],
		});
		let json = value_json(&value);
		assert_eq!(json["@type"], "demo.Point");
		assert_eq!(json["x"], 1);
		assert!(json["ratio"].is_null());
	}

	#[test]
	fn hashes_render_fixed_width() {
		assert_eq!(hash_hex(0xab), "0x00000000000000ab");
	}
}
